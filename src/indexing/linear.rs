//! Raw wiring-order indexing over a circular strip.

use crate::error::Result;

use super::{Key, Resolved, Strategy, mismatch};

/// Addresses lights by wiring index, wrapping around the strip length in both
/// directions so `-1` is the last light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearIndexing {
    len: usize,
}

impl LinearIndexing {
    pub fn new(len: usize) -> Self {
        LinearIndexing { len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wrapped index, or `None` on an empty strip.
    pub fn wrap(&self, index: i64) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        Some(index.rem_euclid(self.len as i64) as usize)
    }
}

impl Strategy for LinearIndexing {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn get(&mut self, key: &Key) -> Result<Resolved> {
        match *key {
            Key::Index(index) => Ok(self.wrap(index).map_or(Resolved::Miss, Resolved::Light)),
            _ => Err(mismatch(self.name(), key)),
        }
    }
}
