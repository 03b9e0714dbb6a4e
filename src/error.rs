//! Error types for layout mapping, key resolution and configuration.

use thiserror::Error;

/// Errors surfaced by the light-positioning core.
///
/// A query that finds nothing is not an error; see [`crate::Resolved::Miss`].
#[derive(Debug, Error)]
pub enum LightError {
    /// A layout with no rows was supplied where a mapping is required.
    #[error("layout has no rows")]
    EmptyLayout,

    /// A row with no lights.
    #[error("layout row {row} has {count} lights, rows must hold at least one")]
    InvalidRow { row: usize, count: usize },

    /// A key outside the strategy's addressable bounds.
    #[error("key {key} is out of range (bound {bound})")]
    OutOfRange { key: String, bound: usize },

    /// The active strategy does not understand the shape of this key.
    #[error("{strategy} indexing cannot resolve key {key}")]
    KeyMismatch { strategy: &'static str, key: String },

    /// A radius, resolution or origin outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for the crate.
pub type Result<T> = std::result::Result<T, LightError>;
