//! Estimated light positions in a 1x1 square, with box, radius and nearest
//! queries.
//!
//! x and y both run over `0..=1`. A space is either attached (point grid
//! built and queryable) or detached (lights flattened into an ordered list so
//! the space can be serialized and shipped elsewhere). Queries on a detached
//! space reattach it first.

pub mod cache;
pub mod grid;

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::error::{LightError, Result};
use crate::geometry::{Bounds, Light, circle_polygon, zigzag_map};
use crate::layout::Layout;

pub use cache::{CacheStats, DEFAULT_CACHE_CAPACITY, QueryCache};
pub use grid::PointGrid;

/// Default acceptance radius for [`LedSpace::nearest_index`].
pub const DEFAULT_MAX_DISTANCE: f64 = 0.30;

/// Vertices of the polygon standing in for a circle in radius queries.
pub const CIRCLE_MASK_POINTS: usize = 10;

/// Widening of the nearest-light box prefilter, so rounding in its edges never
/// drops a light that the exact distance check would accept.
const NEAREST_PREFILTER_SLACK: f64 = 1e-9;

/// Check a circle mask has at least a triangle's worth of vertices.
pub fn check_circle_points(points: usize) -> Result<usize> {
    if points >= 3 {
        Ok(points)
    } else {
        Err(LightError::InvalidParameter(format!(
            "circle_points must be at least 3, got {points}"
        )))
    }
}

#[derive(Debug, Clone)]
enum Structure {
    Attached(PointGrid),
    Detached(Vec<Light>),
}

/// Flat, serializable form of a detached space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceSnapshot {
    pub layout: Option<Layout>,
    /// Lights ordered by index.
    pub lights: Vec<Light>,
    pub circle_points: usize,
    pub cache_capacity: usize,
}

/// Maintains estimated locations of lights and answers spatial queries.
#[derive(Debug)]
pub struct LedSpace {
    layout: Option<Layout>,
    structure: Structure,
    cache: QueryCache,
    circle_points: usize,
}

impl Default for LedSpace {
    fn default() -> Self {
        LedSpace::new()
    }
}

impl LedSpace {
    /// Empty, attached space.
    pub fn new() -> Self {
        LedSpace::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        LedSpace {
            layout: None,
            structure: Structure::Attached(PointGrid::sized_for(0)),
            cache: QueryCache::new(capacity),
            circle_points: CIRCLE_MASK_POINTS,
        }
    }

    /// Space mapped from `layout`.
    pub fn from_layout(layout: &Layout) -> Self {
        let mut space = LedSpace::new();
        space.map_in_zigzag(layout);
        space
    }

    /// Vertex count used to approximate circles in [`Self::query_radius`].
    /// Fewer than 3 is rejected and leaves the space unchanged.
    pub fn set_circle_points(&mut self, points: usize) -> Result<()> {
        self.circle_points = check_circle_points(points)?;
        self.cache.invalidate();
        Ok(())
    }

    pub fn circle_points(&self) -> usize {
        self.circle_points
    }

    /// Replace every light with positions estimated from `layout`.
    ///
    /// Discards prior content, including a detached list, and invalidates the
    /// query cache.
    pub fn map_in_zigzag(&mut self, layout: &Layout) {
        let lights = zigzag_map(layout);
        log::debug!(
            "mapping {} lights over {} rows",
            lights.len(),
            layout.row_count()
        );
        self.structure = Structure::Attached(PointGrid::from_lights(&lights));
        self.layout = Some(layout.clone());
        self.invalidate_cache();
    }

    /// Validate raw row counts and map them. On error the space is left as it was.
    pub fn map_rows(&mut self, rows: &[usize]) -> Result<()> {
        let layout = Layout::new(rows.to_vec())?;
        self.map_in_zigzag(&layout);
        Ok(())
    }

    /// Layout of the current mapping, if any.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn len(&self) -> usize {
        match &self.structure {
            Structure::Attached(grid) => grid.len(),
            Structure::Detached(lights) => lights.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_detached(&self) -> bool {
        matches!(self.structure, Structure::Detached(_))
    }

    /// Lights inside the `width` x `height` box centered on `(x, y)`, ordered by index.
    pub fn query_box(&mut self, x: f64, y: f64, width: f64, height: f64) -> Vec<Light> {
        self.reattach();
        let Structure::Attached(grid) = &self.structure else {
            return Vec::new();
        };
        self.cache.boxed([x, y, width, height], || {
            grid.query_bounds(&Bounds::centered(x, y, width, height))
        })
    }

    /// Lights within `radius` of `(x, y)`, ordered by index.
    ///
    /// The circle is approximated by an inscribed polygon of
    /// [`Self::circle_points`] vertices, so lights right at the rim may be left
    /// out but nothing farther than `radius` is ever returned.
    pub fn query_radius(&mut self, x: f64, y: f64, radius: f64) -> Vec<Light> {
        self.reattach();
        let points = self.circle_points;
        let Structure::Attached(grid) = &self.structure else {
            return Vec::new();
        };
        self.cache.radius([x, y, radius], || {
            grid.query_polygon(&circle_polygon(x, y, radius, points))
        })
    }

    /// Index of the light closest to `(x, y)` no farther than `max_distance`.
    ///
    /// Equidistant candidates resolve to the lowest index.
    pub fn nearest_index(&mut self, x: f64, y: f64, max_distance: f64) -> Option<usize> {
        let key = [x, y, max_distance];
        if let Some(hit) = self.cache.lookup_nearest(key) {
            return hit;
        }

        // Box superset of the acceptance circle, then exact distances
        let extent = (max_distance + NEAREST_PREFILTER_SLACK) * 2.0;
        let candidates = self.query_box(x, y, extent, extent);
        let nearest = closest(&candidates, x, y, max_distance);
        self.cache.store_nearest(key, nearest);
        nearest
    }

    /// [`Self::nearest_index`] with [`DEFAULT_MAX_DISTANCE`].
    pub fn nearest(&mut self, x: f64, y: f64) -> Option<usize> {
        self.nearest_index(x, y, DEFAULT_MAX_DISTANCE)
    }

    /// Flatten the lights into an ordered list and drop the point grid.
    ///
    /// Does nothing if already detached.
    pub fn detach(&mut self) {
        if let Structure::Attached(grid) = &self.structure {
            let lights = grid.lights();
            log::debug!("detaching {} lights", lights.len());
            self.structure = Structure::Detached(lights);
        }
    }

    /// Rebuild the point grid from the detached list, consuming it.
    ///
    /// Does nothing if attached.
    pub fn reattach(&mut self) {
        if let Structure::Detached(lights) = &self.structure {
            log::debug!("reattaching {} lights", lights.len());
            self.structure = Structure::Attached(PointGrid::from_lights(lights));
        }
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Detach and return a copy of the flat form for transfer.
    pub fn snapshot(&mut self) -> SpaceSnapshot {
        self.detach();
        let lights = match &self.structure {
            Structure::Detached(lights) => lights.clone(),
            Structure::Attached(grid) => grid.lights(),
        };
        SpaceSnapshot {
            layout: self.layout.clone(),
            lights,
            circle_points: self.circle_points,
            cache_capacity: self.cache.capacity(),
        }
    }

    /// Detached space from a snapshot; the grid is rebuilt on first query.
    ///
    /// A circle vertex count below 3 falls back to [`CIRCLE_MASK_POINTS`].
    pub fn restore(snapshot: SpaceSnapshot) -> Self {
        let circle_points = check_circle_points(snapshot.circle_points).unwrap_or_else(|e| {
            log::warn!("{e}; using {CIRCLE_MASK_POINTS}");
            CIRCLE_MASK_POINTS
        });
        LedSpace {
            layout: snapshot.layout,
            structure: Structure::Detached(snapshot.lights),
            cache: QueryCache::new(snapshot.cache_capacity),
            circle_points,
        }
    }
}

/// Closest light within `max_distance`; ties keep the earliest (lowest index) candidate.
fn closest(candidates: &[Light], x: f64, y: f64, max_distance: f64) -> Option<usize> {
    let mut best: Option<(f64, usize)> = None;
    for light in candidates {
        let distance = light.distance_to(x, y);
        if distance > max_distance {
            continue;
        }
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, light.index()));
        }
    }
    best.map(|(_, index)| index)
}

/// Cloneable handle to a space shared between strategies built for the same layout.
#[derive(Debug, Clone)]
pub struct SharedSpace(Arc<Mutex<LedSpace>>);

impl SharedSpace {
    pub fn new(space: LedSpace) -> Self {
        SharedSpace(Arc::new(Mutex::new(space)))
    }

    pub fn from_layout(layout: &Layout) -> Self {
        SharedSpace::new(LedSpace::from_layout(layout))
    }

    pub fn lock(&self) -> MutexGuard<'_, LedSpace> {
        self.0.lock()
    }

    /// Layout of the shared space, cloned out of the lock.
    pub fn layout(&self) -> Option<Layout> {
        self.lock().layout().cloned()
    }

    /// Whether both handles point at the same space.
    pub fn ptr_eq(&self, other: &SharedSpace) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(rows: &[usize]) -> LedSpace {
        LedSpace::from_layout(&Layout::new(rows.to_vec()).unwrap())
    }

    fn indices(lights: &[Light]) -> Vec<usize> {
        lights.iter().map(Light::index).collect()
    }

    #[test]
    fn test_nearest_in_two_row_layout() {
        let mut space = space(&[2, 3]);
        assert_eq!(space.nearest_index(0.0, 0.6, 0.1), Some(2));
        assert_eq!(space.nearest_index(0.5, 0.0, 0.05), Some(0));
        assert_eq!(space.nearest_index(0.5, 0.3, 0.01), None);
    }

    #[test]
    fn test_nearest_tie_prefers_lowest_index() {
        let mut space = LedSpace::new();
        space.structure = Structure::Attached(PointGrid::from_lights(&[
            Light::new(0.75, 0.5, 3),
            Light::new(0.25, 0.5, 1),
        ]));
        assert_eq!(space.nearest_index(0.5, 0.5, 0.3), Some(1));
    }

    #[test]
    fn test_query_box() {
        let mut space = space(&[2, 3]);
        let found = space.query_box(0.25, 0.25, 0.5, 0.5);
        assert_eq!(indices(&found), vec![0, 1, 2]);
        assert!(space.query_box(5.0, 5.0, 0.5, 0.5).is_empty());
    }

    #[test]
    fn test_query_radius() {
        let mut space = space(&[2, 3]);
        let found = space.query_radius(0.0, 0.6, 0.3);
        assert_eq!(indices(&found), vec![2]);
        for light in &found {
            assert!(light.distance_to(0.0, 0.6) <= 0.3);
        }
    }

    #[test]
    fn test_cache_hits_and_invalidation() {
        let mut space = space(&[4, 4]);
        let first = space.query_box(0.5, 0.5, 0.4, 0.4);
        let second = space.query_box(0.5, 0.5, 0.4, 0.4);
        assert_eq!(first, second);
        assert_eq!(space.cache_stats(), CacheStats { hits: 1, misses: 1 });

        space.map_in_zigzag(&Layout::new(vec![1]).unwrap());
        assert_eq!(space.cache_stats(), CacheStats::default());
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_detach_reattach() {
        let mut space = space(&[3, 5, 4]);
        let before = space.query_radius(0.5, 0.5, 0.4);

        space.detach();
        space.detach();
        assert!(space.is_detached());
        assert_eq!(space.len(), 12);

        space.reattach();
        assert!(!space.is_detached());
        space.reattach();
        space.invalidate_cache();
        assert_eq!(space.query_radius(0.5, 0.5, 0.4), before);
    }

    #[test]
    fn test_query_on_detached_reattaches() {
        let mut space = space(&[2, 3]);
        space.detach();
        assert_eq!(space.nearest_index(0.0, 0.6, 0.1), Some(2));
        assert!(!space.is_detached());
    }

    #[test]
    fn test_snapshot_round_trip_through_json() {
        let mut original = space(&[2, 3]);
        let json = serde_json::to_string(&original.snapshot()).unwrap();
        assert!(original.is_detached());

        let snapshot: SpaceSnapshot = serde_json::from_str(&json).unwrap();
        let mut restored = LedSpace::restore(snapshot);
        assert!(restored.is_detached());
        assert_eq!(restored.layout(), original.layout());
        assert_eq!(restored.query_box(0.5, 0.5, 1.0, 1.0), original.query_box(0.5, 0.5, 1.0, 1.0));
    }

    #[test]
    fn test_repeat_nearest_is_cache_hit() {
        let mut space = space(&[2, 3]);
        let first = space.nearest_index(0.0, 0.6, 0.1);
        let misses = space.cache_stats().misses;

        let second = space.nearest_index(0.0, 0.6, 0.1);
        assert_eq!(first, second);
        assert_eq!(second, Some(2));
        assert_eq!(space.cache_stats().misses, misses);
        assert_eq!(space.cache_stats().hits, 1);

        // A remembered miss is also served from the cache
        assert_eq!(space.nearest_index(1.0, 1.0, 0.01), None);
        assert_eq!(space.nearest_index(1.0, 1.0, 0.01), None);
        assert_eq!(space.cache_stats().hits, 2);
    }

    #[test]
    fn test_cached_nearest_on_detached_space_stays_detached() {
        let mut space = space(&[2, 3]);
        assert_eq!(space.nearest_index(0.0, 0.6, 0.1), Some(2));
        space.detach();

        assert_eq!(space.nearest_index(0.0, 0.6, 0.1), Some(2));
        assert!(space.is_detached());

        // An uncached query rebuilds the grid
        assert_eq!(space.nearest_index(0.5, 0.0, 0.05), Some(0));
        assert!(!space.is_detached());
    }

    #[test]
    fn test_restore_keeps_settings() {
        let mut original = LedSpace::with_cache_capacity(7);
        original.set_circle_points(3).unwrap();
        original.map_in_zigzag(&Layout::default());
        let before = original.query_radius(0.5, 0.5, 0.3);

        let json = serde_json::to_string(&original.snapshot()).unwrap();
        let mut restored = LedSpace::restore(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.circle_points(), 3);
        assert_eq!(restored.snapshot().cache_capacity, 7);
        assert_eq!(restored.query_radius(0.5, 0.5, 0.3), before);
    }

    #[test]
    fn test_circle_points_below_three_rejected() {
        let mut space = space(&[2, 3]);
        assert!(matches!(
            space.set_circle_points(2),
            Err(LightError::InvalidParameter(_))
        ));
        assert_eq!(space.circle_points(), CIRCLE_MASK_POINTS);
        space.set_circle_points(3).unwrap();
        assert_eq!(space.circle_points(), 3);
    }

    #[test]
    fn test_map_rows_rejects_invalid() {
        let mut space = space(&[2, 3]);
        assert!(space.map_rows(&[2, 0]).is_err());
        assert_eq!(space.len(), 5);
        space.map_rows(&[7]).unwrap();
        assert_eq!(space.len(), 7);
    }

    #[test]
    fn test_shared_space() {
        let shared = SharedSpace::from_layout(&Layout::new(vec![2, 3]).unwrap());
        let other = shared.clone();
        assert!(shared.ptr_eq(&other));
        assert_eq!(other.lock().nearest_index(0.0, 0.6, 0.1), Some(2));
        assert_eq!(shared.layout().map(|l| l.light_count()), Some(5));
    }
}
