//! Discrete angle/radius steps around an origin, snapped to the nearest light.

use std::f64::consts::TAU;

use crate::error::{LightError, Result};
use crate::geometry::{polar_to_cartesian, reach_from};
use crate::space::SharedSpace;

use super::{Key, Resolved, Strategy, check_origin, check_radius, mismatch};

/// Angle steps in a full turn by default (one per degree).
pub const DEFAULT_ANGLE_STEPS: usize = 360;
/// Radius steps from the origin to the farthest corner by default.
pub const DEFAULT_RADIUS_STEPS: usize = 100;

/// Addresses lights by `(angle step, radius step)` around `origin`.
///
/// Angle steps wrap around the full turn. Radius step `radius_steps` reaches
/// the farthest corner of the unit square, so every light is addressable from
/// any origin.
#[derive(Debug, Clone)]
pub struct PolarIndexing {
    space: SharedSpace,
    origin: (f64, f64),
    angle_steps: usize,
    radius_steps: usize,
    reach: f64,
    search_range: f64,
}

impl PolarIndexing {
    pub fn new(space: SharedSpace, origin: (f64, f64), search_range: f64) -> Result<Self> {
        PolarIndexing::with_resolution(
            space,
            origin,
            DEFAULT_ANGLE_STEPS,
            DEFAULT_RADIUS_STEPS,
            search_range,
        )
    }

    pub fn with_resolution(
        space: SharedSpace,
        origin: (f64, f64),
        angle_steps: usize,
        radius_steps: usize,
        search_range: f64,
    ) -> Result<Self> {
        if angle_steps == 0 || radius_steps == 0 {
            return Err(LightError::InvalidParameter(format!(
                "polar resolution must be positive, got {angle_steps}x{radius_steps}"
            )));
        }
        let origin = check_origin(origin)?;
        Ok(PolarIndexing {
            space,
            origin,
            angle_steps,
            radius_steps,
            reach: reach_from(origin),
            search_range: check_radius("search range", search_range)?,
        })
    }

    pub fn space(&self) -> &SharedSpace {
        &self.space
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.angle_steps, self.radius_steps)
    }

    /// Unit-square point for `(angle, radius)` steps.
    pub fn step_to_point(&self, angle: usize, radius: usize) -> Result<(f64, f64)> {
        if radius > self.radius_steps {
            return Err(LightError::OutOfRange {
                key: format!("radius step {radius}"),
                bound: self.radius_steps,
            });
        }
        let theta = (angle % self.angle_steps) as f64 * TAU / self.angle_steps as f64;
        let distance = radius as f64 / self.radius_steps as f64 * self.reach;
        Ok(polar_to_cartesian(self.origin, theta, distance))
    }
}

impl Strategy for PolarIndexing {
    fn name(&self) -> &'static str {
        "polar"
    }

    fn get(&mut self, key: &Key) -> Result<Resolved> {
        let Key::Polar { angle, radius } = *key else {
            return Err(mismatch(self.name(), key));
        };
        let (x, y) = self.step_to_point(angle, radius)?;
        let nearest = self.space.lock().nearest_index(x, y, self.search_range);
        Ok(nearest.map_or(Resolved::Miss, Resolved::Light))
    }

    fn prepare_to_send(&mut self) {
        self.space.lock().detach();
    }
}
