//! Continuous points resolved to every light within an effect radius.

use crate::error::Result;
use crate::space::SharedSpace;

use super::{Key, Resolved, Strategy, check_radius, mismatch};

/// Addresses lights by a continuous `(x, y)`. A point resolves to the set of
/// lights inside `effect_radius`, so effects can blend across neighbours
/// instead of snapping to one light.
#[derive(Debug, Clone)]
pub struct FloatCartesianIndexing {
    space: SharedSpace,
    effect_radius: f64,
}

impl FloatCartesianIndexing {
    pub fn new(space: SharedSpace, effect_radius: f64) -> Result<Self> {
        Ok(FloatCartesianIndexing {
            space,
            effect_radius: check_radius("effect radius", effect_radius)?,
        })
    }

    pub fn space(&self) -> &SharedSpace {
        &self.space
    }

    pub fn effect_radius(&self) -> f64 {
        self.effect_radius
    }
}

impl Strategy for FloatCartesianIndexing {
    fn name(&self) -> &'static str {
        "float cartesian"
    }

    fn get(&mut self, key: &Key) -> Result<Resolved> {
        let Key::Point { x, y } = *key else {
            return Err(mismatch(self.name(), key));
        };
        let lights = self.space.lock().query_radius(x, y, self.effect_radius);
        Ok(Resolved::from_set(lights.iter().map(|l| l.index()).collect()))
    }

    fn prepare_to_send(&mut self) {
        self.space.lock().detach();
    }
}
