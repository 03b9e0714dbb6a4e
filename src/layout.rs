//! Row layouts describing how a light strip is strung across the ceiling.

use serde::{Deserialize, Serialize};

use crate::error::{LightError, Result};

/// Row arrangement of the basement ceiling strip, bottom row first.
pub const CEILING_ROW_ARRANGEMENT: [usize; 7] = [29, 29, 32, 29, 32, 28, 20];

/// Ordered light counts per row, read bottom to top.
///
/// Every row holds at least one light and there is at least one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Layout {
    rows: Vec<usize>,
    /// Flat index of the first light in each row.
    offsets: Vec<usize>,
}

impl Layout {
    pub fn new(rows: impl Into<Vec<usize>>) -> Result<Self> {
        let rows = rows.into();
        if rows.is_empty() {
            return Err(LightError::EmptyLayout);
        }
        if let Some((row, &count)) = rows.iter().enumerate().find(|&(_, &count)| count == 0) {
            return Err(LightError::InvalidRow { row, count });
        }
        Ok(Layout::from_checked_rows(rows))
    }

    fn from_checked_rows(rows: Vec<usize>) -> Self {
        let offsets = rows
            .iter()
            .scan(0, |total, &count| {
                let start = *total;
                *total += count;
                Some(start)
            })
            .collect();
        Layout { rows, offsets }
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn light_count(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0) + self.rows.last().copied().unwrap_or(0)
    }

    pub fn longest_row(&self) -> usize {
        self.rows.iter().copied().max().unwrap_or(0)
    }

    /// Flat index of the first light in `row`.
    pub fn row_offset(&self, row: usize) -> Option<usize> {
        self.offsets.get(row).copied()
    }

    /// Flat index of `column` within `row`, or `None` when either is out of range.
    pub fn flat_index(&self, row: usize, column: usize) -> Option<usize> {
        let count = *self.rows.get(row)?;
        (column < count).then(|| self.offsets[row] + column)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::from_checked_rows(CEILING_ROW_ARRANGEMENT.to_vec())
    }
}

impl TryFrom<Vec<usize>> for Layout {
    type Error = LightError;

    fn try_from(rows: Vec<usize>) -> Result<Self> {
        Layout::new(rows)
    }
}

impl From<Layout> for Vec<usize> {
    fn from(layout: Layout) -> Self {
        layout.rows
    }
}
