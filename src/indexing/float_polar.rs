//! Continuous angle/radius around an origin, resolved to every light within an
//! effect radius.

use crate::error::Result;
use crate::geometry::polar_to_cartesian;
use crate::space::SharedSpace;

use super::{Key, Resolved, Strategy, check_origin, check_radius, mismatch};

/// Addresses lights by `(theta, radius)` around `origin`, with `theta` in
/// radians counter-clockwise from +x.
#[derive(Debug, Clone)]
pub struct FloatPolarIndexing {
    space: SharedSpace,
    origin: (f64, f64),
    effect_radius: f64,
}

impl FloatPolarIndexing {
    pub fn new(space: SharedSpace, origin: (f64, f64), effect_radius: f64) -> Result<Self> {
        Ok(FloatPolarIndexing {
            space,
            origin: check_origin(origin)?,
            effect_radius: check_radius("effect radius", effect_radius)?,
        })
    }

    pub fn space(&self) -> &SharedSpace {
        &self.space
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    pub fn effect_radius(&self) -> f64 {
        self.effect_radius
    }
}

impl Strategy for FloatPolarIndexing {
    fn name(&self) -> &'static str {
        "float polar"
    }

    fn get(&mut self, key: &Key) -> Result<Resolved> {
        let Key::Angle { theta, radius } = *key else {
            return Err(mismatch(self.name(), key));
        };
        let (x, y) = polar_to_cartesian(self.origin, theta, radius);
        let lights = self.space.lock().query_radius(x, y, self.effect_radius);
        Ok(Resolved::from_set(lights.iter().map(|l| l.index()).collect()))
    }

    fn prepare_to_send(&mut self) {
        self.space.lock().detach();
    }
}
