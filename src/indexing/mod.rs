//! Translators from application-level keys to concrete light indices.
//!
//! Every strategy implements [`Strategy`]; [`Indexing`] is the closed family
//! an owner swaps between at runtime.

pub mod cartesian;
pub mod float_cartesian;
pub mod float_polar;
pub mod linear;
pub mod polar;
pub mod row;

use std::fmt;

use crate::error::{LightError, Result};
use crate::layout::Layout;
use crate::pixels::PixelBuffer;
use crate::space::SharedSpace;

pub use cartesian::CartesianIndexing;
pub use float_cartesian::FloatCartesianIndexing;
pub use float_polar::FloatPolarIndexing;
pub use linear::LinearIndexing;
pub use polar::PolarIndexing;
pub use row::RowIndexing;

/// Application-level lookup key. Each strategy understands one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Key {
    /// Raw wiring index; negative values count back from the end.
    Index(i64),
    /// Row and column within the row's wiring order.
    Row { row: usize, column: usize },
    /// Discrete cartesian grid cell.
    Cell { column: usize, row: usize },
    /// Discrete polar cell: angle step and radius step around an origin.
    Polar { angle: usize, radius: usize },
    /// Continuous point in the unit square.
    Point { x: f64, y: f64 },
    /// Continuous polar coordinate: `theta` in radians, `radius` in square units.
    Angle { theta: f64, radius: f64 },
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Key::Index(index) => write!(f, "[{index}]"),
            Key::Row { row, column } => write!(f, "row {row} column {column}"),
            Key::Cell { column, row } => write!(f, "cell ({column}, {row})"),
            Key::Polar { angle, radius } => write!(f, "polar step ({angle}, {radius})"),
            Key::Point { x, y } => write!(f, "point ({x}, {y})"),
            Key::Angle { theta, radius } => write!(f, "angle {theta} radius {radius}"),
        }
    }
}

/// Outcome of resolving a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// No light within tolerance.
    Miss,
    Light(usize),
    /// Every light inside an effect radius, ordered by index. Never empty.
    Lights(Vec<usize>),
}

impl Resolved {
    /// `Lights` for a non-empty set, `Miss` otherwise.
    pub fn from_set(indices: Vec<usize>) -> Self {
        if indices.is_empty() {
            Resolved::Miss
        } else {
            Resolved::Lights(indices)
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Resolved::Miss)
    }

    pub fn indices(&self) -> &[usize] {
        match self {
            Resolved::Miss => &[],
            Resolved::Light(index) => std::slice::from_ref(index),
            Resolved::Lights(indices) => indices,
        }
    }

    /// Write `color` to every resolved light. Returns how many pixels were written.
    pub fn write_to<P: PixelBuffer>(&self, pixels: &mut P, color: P::Color) -> usize {
        let mut written = 0;
        for &index in self.indices() {
            if index < pixels.len() {
                pixels.set(index, color);
                written += 1;
            } else {
                log::warn!("light {index} is past the end of a {} pixel strip", pixels.len());
            }
        }
        written
    }
}

/// Uniform get/set over one way of addressing lights.
pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Resolve `key` to zero, one or several lights.
    fn get(&mut self, key: &Key) -> Result<Resolved>;

    /// Set every light `key` resolves to. Returns how many pixels were written.
    fn set<P: PixelBuffer>(&mut self, pixels: &mut P, key: &Key, color: P::Color) -> Result<usize>
    where
        Self: Sized,
    {
        Ok(self.get(key)?.write_to(pixels, color))
    }

    /// Drop structure that should not cross a transfer boundary.
    fn prepare_to_send(&mut self) {}
}

/// The strategy an owner currently addresses lights with.
#[derive(Debug, Clone)]
pub enum Indexing {
    Linear(LinearIndexing),
    Row(RowIndexing),
    Cartesian(CartesianIndexing),
    Polar(PolarIndexing),
    FloatCartesian(FloatCartesianIndexing),
    FloatPolar(FloatPolarIndexing),
}

impl Indexing {
    /// Spatial index backing this strategy, if it uses one.
    pub fn space(&self) -> Option<&SharedSpace> {
        match self {
            Indexing::Linear(_) | Indexing::Row(_) => None,
            Indexing::Cartesian(s) => Some(s.space()),
            Indexing::Polar(s) => Some(s.space()),
            Indexing::FloatCartesian(s) => Some(s.space()),
            Indexing::FloatPolar(s) => Some(s.space()),
        }
    }

    /// Row layout when row indexing is active.
    pub fn rows(&self) -> Option<&Layout> {
        match self {
            Indexing::Row(row) => Some(row.layout()),
            _ => None,
        }
    }
}

impl Strategy for Indexing {
    fn name(&self) -> &'static str {
        match self {
            Indexing::Linear(s) => s.name(),
            Indexing::Row(s) => s.name(),
            Indexing::Cartesian(s) => s.name(),
            Indexing::Polar(s) => s.name(),
            Indexing::FloatCartesian(s) => s.name(),
            Indexing::FloatPolar(s) => s.name(),
        }
    }

    fn get(&mut self, key: &Key) -> Result<Resolved> {
        match self {
            Indexing::Linear(s) => s.get(key),
            Indexing::Row(s) => s.get(key),
            Indexing::Cartesian(s) => s.get(key),
            Indexing::Polar(s) => s.get(key),
            Indexing::FloatCartesian(s) => s.get(key),
            Indexing::FloatPolar(s) => s.get(key),
        }
    }

    fn set<P: PixelBuffer>(&mut self, pixels: &mut P, key: &Key, color: P::Color) -> Result<usize> {
        match self {
            Indexing::Linear(s) => s.set(pixels, key, color),
            Indexing::Row(s) => s.set(pixels, key, color),
            Indexing::Cartesian(s) => s.set(pixels, key, color),
            Indexing::Polar(s) => s.set(pixels, key, color),
            Indexing::FloatCartesian(s) => s.set(pixels, key, color),
            Indexing::FloatPolar(s) => s.set(pixels, key, color),
        }
    }

    fn prepare_to_send(&mut self) {
        match self {
            Indexing::Linear(s) => s.prepare_to_send(),
            Indexing::Row(s) => s.prepare_to_send(),
            Indexing::Cartesian(s) => s.prepare_to_send(),
            Indexing::Polar(s) => s.prepare_to_send(),
            Indexing::FloatCartesian(s) => s.prepare_to_send(),
            Indexing::FloatPolar(s) => s.prepare_to_send(),
        }
    }
}

macro_rules! impl_from_strategy {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Indexing {
                fn from(strategy: $ty) -> Self {
                    Indexing::$variant(strategy)
                }
            }
        )*
    };
}

impl_from_strategy! {
    Linear => LinearIndexing,
    Row => RowIndexing,
    Cartesian => CartesianIndexing,
    Polar => PolarIndexing,
    FloatCartesian => FloatCartesianIndexing,
    FloatPolar => FloatPolarIndexing,
}

/// Error for a key shape the strategy does not understand.
pub(crate) fn mismatch(strategy: &'static str, key: &Key) -> LightError {
    LightError::KeyMismatch {
        strategy,
        key: key.to_string(),
    }
}

/// Check a search or effect radius lies in `(0, 1]`.
pub(crate) fn check_radius(name: &str, radius: f64) -> Result<f64> {
    if radius > 0.0 && radius <= 1.0 {
        Ok(radius)
    } else {
        Err(LightError::InvalidParameter(format!(
            "{name} must be in (0, 1], got {radius}"
        )))
    }
}

/// Check an origin point is finite.
pub(crate) fn check_origin(origin: (f64, f64)) -> Result<(f64, f64)> {
    if origin.0.is_finite() && origin.1.is_finite() {
        Ok(origin)
    } else {
        Err(LightError::InvalidParameter(format!(
            "origin must be finite, got {origin:?}"
        )))
    }
}
