//! Pure geometry over the unit square: lights, distances, the zig-zag
//! position estimate and polygon masks for circular queries.

use std::f64::consts::TAU;
use std::fmt;

use geo::BoundingRect;
use geo_types::{LineString, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// A single addressable light with its estimated position in the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    x: f64,
    y: f64,
    index: usize,
}

impl Light {
    pub fn new(x: f64, y: f64, index: usize) -> Self {
        Light { x, y, index }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Position in wiring order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_tuple(&self) -> (f64, f64, usize) {
        (self.x, self.y, self.index)
    }

    /// Euclidean distance from this light to `(x, y)`.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        distance(self.x, self.y, x, y)
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LED(x: {}, y: {}, index: {})", self.x, self.y, self.index)
    }
}

/// Axis-aligned box, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Bounds { min_x, min_y, max_x, max_y }
    }

    /// Box of `width` x `height` centered on `(x, y)`.
    pub fn centered(x: f64, y: f64, width: f64, height: f64) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Bounds::new(x - half_w, y - half_h, x + half_w, y + half_h)
    }

    /// Smallest box holding every vertex of `polygon`; `None` when it has none.
    pub fn of_polygon(polygon: &Polygon<f64>) -> Option<Self> {
        polygon.bounding_rect().map(Bounds::from)
    }

    /// Inclusive on every edge, with no slack.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        let (min, max) = (rect.min(), rect.max());
        Bounds::new(min.x, min.y, max.x, max.y)
    }
}

/// Standard Euclidean distance.
#[inline]
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (x2 - x1).hypot(y2 - y1)
}

/// Estimate the position of every light in a zig-zag wired layout.
///
/// Row 0 is the bottom row, nearest the data connection. Each row climbs
/// diagonally towards the next one, alternating direction:
///
/// ```text
///         ----->
/// 3 ------
///  <-----
///        ----- 2
///         ---->
/// 1 ------
///  <-----
///        ----- 0
/// ```
///
/// Even rows run right to left, odd rows left to right. Lights are assumed to
/// be equally spaced, and indices follow wiring order starting at 0.
pub fn zigzag_map(layout: &Layout) -> Vec<Light> {
    let rows = layout.rows();
    let row_height = if rows.len() == 1 {
        1.0
    } else {
        1.0 / rows.len() as f64
    };

    let mut lights = Vec::with_capacity(layout.light_count());
    for (row, &count) in rows.iter().enumerate() {
        let count = count as f64;
        let base_y = row as f64 * row_height;
        for ordinal in 0..count as usize {
            let progress = ordinal as f64 / count;
            let x = if row % 2 == 0 {
                1.0 - (ordinal as f64 + 1.0) / count
            } else {
                progress
            };
            let y = base_y + progress * row_height;
            lights.push(Light::new(x, y, lights.len()));
        }
    }
    lights
}

/// Polygon approximating the circle of `radius` around `(center_x, center_y)`.
///
/// Samples `point_count` equally spaced angles over `[0, 2π)` in increasing
/// order.
pub fn circle_mask(center_x: f64, center_y: f64, radius: f64, point_count: usize) -> Vec<(f64, f64)> {
    let step = TAU / point_count as f64;
    (0..point_count)
        .map(|i| {
            let theta = i as f64 * step;
            (center_x + theta.cos() * radius, center_y + theta.sin() * radius)
        })
        .collect()
}

/// [`circle_mask`] as a closed polygon, ready for `geo::Contains`.
pub fn circle_polygon(center_x: f64, center_y: f64, radius: f64, point_count: usize) -> Polygon<f64> {
    let ring = LineString::from(circle_mask(center_x, center_y, radius, point_count));
    Polygon::new(ring, Vec::new())
}

/// Point at `radius` from `origin` along angle `theta` (radians, counter-clockwise from +x).
#[inline]
pub fn polar_to_cartesian(origin: (f64, f64), theta: f64, radius: f64) -> (f64, f64) {
    (origin.0 + theta.cos() * radius, origin.1 + theta.sin() * radius)
}

/// Distance from `origin` to the farthest corner of the unit square.
pub fn reach_from(origin: (f64, f64)) -> f64 {
    [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
        .iter()
        .map(|&(cx, cy)| distance(origin.0, origin.1, cx, cy))
        .fold(0.0, f64::max)
}
