//! Discrete grid cells snapped to the nearest light.

use crate::error::{LightError, Result};
use crate::space::SharedSpace;

use super::{Key, Resolved, Strategy, check_radius, mismatch};

/// Addresses lights by `(column, row)` cell of a regular grid laid over the
/// unit square. Each cell resolves to the light nearest its centre, or misses
/// when no light lies within the search range.
#[derive(Debug, Clone)]
pub struct CartesianIndexing {
    space: SharedSpace,
    columns: usize,
    rows: usize,
    search_range: f64,
}

impl CartesianIndexing {
    /// Grid of `longest row` x `row count` cells over `space`'s layout.
    pub fn new(space: SharedSpace, search_range: f64) -> Result<Self> {
        let (columns, rows) = space
            .layout()
            .map_or((1, 1), |layout| (layout.longest_row(), layout.row_count()));
        CartesianIndexing::with_resolution(space, columns, rows, search_range)
    }

    pub fn with_resolution(
        space: SharedSpace,
        columns: usize,
        rows: usize,
        search_range: f64,
    ) -> Result<Self> {
        if columns == 0 || rows == 0 {
            return Err(LightError::InvalidParameter(format!(
                "cartesian resolution must be positive, got {columns}x{rows}"
            )));
        }
        Ok(CartesianIndexing {
            space,
            columns,
            rows,
            search_range: check_radius("search range", search_range)?,
        })
    }

    pub fn space(&self) -> &SharedSpace {
        &self.space
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    pub fn search_range(&self) -> f64 {
        self.search_range
    }

    /// Centre of `(column, row)` in unit-square coordinates.
    pub fn cell_center(&self, column: usize, row: usize) -> Result<(f64, f64)> {
        if column >= self.columns {
            return Err(LightError::OutOfRange {
                key: format!("column {column}"),
                bound: self.columns,
            });
        }
        if row >= self.rows {
            return Err(LightError::OutOfRange {
                key: format!("row {row}"),
                bound: self.rows,
            });
        }
        Ok((
            (column as f64 + 0.5) / self.columns as f64,
            (row as f64 + 0.5) / self.rows as f64,
        ))
    }
}

impl Strategy for CartesianIndexing {
    fn name(&self) -> &'static str {
        "cartesian"
    }

    fn get(&mut self, key: &Key) -> Result<Resolved> {
        let Key::Cell { column, row } = *key else {
            return Err(mismatch(self.name(), key));
        };
        let (x, y) = self.cell_center(column, row)?;
        let nearest = self.space.lock().nearest_index(x, y, self.search_range);
        Ok(nearest.map_or(Resolved::Miss, Resolved::Light))
    }

    fn prepare_to_send(&mut self) {
        self.space.lock().detach();
    }
}
