//! Ceiling configuration, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::indexing::check_radius;
use crate::layout::Layout;
use crate::space::{
    CIRCLE_MASK_POINTS, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_DISTANCE, check_circle_points,
};

/// Lights on the basement ceiling strip.
pub const NUMBER_LIGHTS: usize = 200;

/// Configuration for a [`Ceiling`](crate::Ceiling) and the strategies it builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CeilingConfig {
    /// Pixels on the strip
    pub number_lights: usize,
    /// Row arrangement, bottom row first
    pub layout: Layout,
    /// Acceptance radius for cartesian and polar indexing
    pub search_range: f64,
    /// Blend radius for float cartesian and float polar indexing
    pub effect_radius: f64,
    /// Acceptance radius for [`Ceiling::nearest`](crate::Ceiling::nearest)
    pub max_distance: f64,
    /// Entries kept per query kind in a spatial index's cache
    pub cache_capacity: usize,
    /// Polygon vertices approximating a circle in radius queries
    pub circle_points: usize,
}

impl Default for CeilingConfig {
    fn default() -> Self {
        Self {
            number_lights: NUMBER_LIGHTS,
            layout: Layout::default(),
            search_range: 0.2,
            effect_radius: 0.2,
            max_distance: DEFAULT_MAX_DISTANCE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            circle_points: CIRCLE_MASK_POINTS,
        }
    }
}

impl CeilingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CeilingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        CeilingConfig::from_json_str(&json)
    }

    /// Check radii and counts. A layout addressing more or fewer lights than
    /// the strip holds is allowed but logged.
    pub fn validate(&self) -> Result<()> {
        check_radius("search_range", self.search_range)?;
        check_radius("effect_radius", self.effect_radius)?;
        check_radius("max_distance", self.max_distance)?;
        check_circle_points(self.circle_points)?;
        if self.layout.light_count() != self.number_lights {
            log::warn!(
                "layout addresses {} lights but the strip has {}",
                self.layout.light_count(),
                self.number_lights
            );
        }
        Ok(())
    }
}
