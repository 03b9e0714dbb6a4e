//! Estimated 2D positions for addressable lights strung in zig-zag rows,
//! with spatial lookups fast enough to drive real-time animations.
//!
//! - [`geometry`]: zig-zag position estimate, distances, circle masks
//! - [`space`]: the spatial index ([`LedSpace`]) with its query cache and
//!   detach/reattach lifecycle
//! - [`indexing`]: strategies translating keys into light indices
//! - [`ceiling`]: owner of a pixel strip and one active strategy

pub mod ceiling;
pub mod config;
pub mod error;
pub mod geometry;
pub mod indexing;
pub mod layout;
pub mod pixels;
pub mod space;

#[cfg(test)]
mod tests;

// Re-export public API
pub use ceiling::Ceiling;
pub use config::{CeilingConfig, NUMBER_LIGHTS};
pub use error::{LightError, Result};
pub use geometry::{Light, circle_mask, circle_polygon, distance, zigzag_map};
pub use indexing::{
    CartesianIndexing, FloatCartesianIndexing, FloatPolarIndexing, Indexing, Key, LinearIndexing,
    PolarIndexing, Resolved, RowIndexing, Strategy,
};
pub use layout::{CEILING_ROW_ARRANGEMENT, Layout};
pub use pixels::{MemoryPixels, PixelBuffer};
pub use space::{CacheStats, DEFAULT_MAX_DISTANCE, LedSpace, SharedSpace, SpaceSnapshot};
