//! Row and column addressing through cumulative row offsets.

use crate::error::{LightError, Result};
use crate::layout::Layout;
use crate::pixels::PixelBuffer;

use super::{Key, Resolved, Strategy, mismatch};

/// Addresses lights as `(row, column)`, where column counts along the row in
/// wiring order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIndexing {
    layout: Layout,
}

impl RowIndexing {
    pub fn new(layout: Layout) -> Self {
        RowIndexing { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Flat index of `(row, column)`, failing with the violated bound.
    pub fn locate(&self, row: usize, column: usize) -> Result<usize> {
        let Some(&count) = self.layout.rows().get(row) else {
            return Err(LightError::OutOfRange {
                key: format!("row {row}"),
                bound: self.layout.row_count(),
            });
        };
        self.layout
            .flat_index(row, column)
            .ok_or_else(|| LightError::OutOfRange {
                key: format!("row {row} column {column}"),
                bound: count,
            })
    }
}

impl Strategy for RowIndexing {
    fn name(&self) -> &'static str {
        "row"
    }

    /// Out-of-range cells are a miss here; [`Strategy::set`] reports them.
    fn get(&mut self, key: &Key) -> Result<Resolved> {
        match *key {
            Key::Row { row, column } => Ok(self
                .layout
                .flat_index(row, column)
                .map_or(Resolved::Miss, Resolved::Light)),
            _ => Err(mismatch(self.name(), key)),
        }
    }

    fn set<P: PixelBuffer>(&mut self, pixels: &mut P, key: &Key, color: P::Color) -> Result<usize> {
        match *key {
            Key::Row { row, column } => {
                let index = self.locate(row, column)?;
                Ok(Resolved::Light(index).write_to(pixels, color))
            }
            _ => Err(mismatch(self.name(), key)),
        }
    }
}
