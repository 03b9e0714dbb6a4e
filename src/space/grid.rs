//! Uniform bucket grid over the unit square.
//!
//! Light counts are small (hundreds) and the domain is fixed, so a flat grid of
//! buckets gives box queries that touch only the overlapped cells. Polygon
//! queries prefilter on the polygon's bounding box and refine each candidate
//! with `geo::Contains`.

use geo::Contains;
use geo_types::{Point, Polygon};

use crate::geometry::{Bounds, Light};

/// Upper bound on cells per side.
const MAX_SIDE: usize = 64;

/// Point-region index of lights. Cell index = row * side + column.
#[derive(Debug, Clone)]
pub struct PointGrid {
    side: usize,
    cells: Vec<Vec<Light>>,
    len: usize,
}

impl PointGrid {
    /// Empty grid with `side` x `side` cells.
    pub fn new(side: usize) -> Self {
        let side = side.clamp(1, MAX_SIDE);
        PointGrid {
            side,
            cells: vec![Vec::new(); side * side],
            len: 0,
        }
    }

    /// Grid sized so `count` evenly spread lights average about one per cell.
    pub fn sized_for(count: usize) -> Self {
        PointGrid::new((count as f64).sqrt().ceil() as usize)
    }

    pub fn from_lights(lights: &[Light]) -> Self {
        let mut grid = PointGrid::sized_for(lights.len());
        for &light in lights {
            grid.insert(light);
        }
        grid
    }

    /// Insert a light. Lights outside the unit square land in the nearest edge cell.
    pub fn insert(&mut self, light: Light) {
        let column = self.cell_of(light.x());
        let row = self.cell_of(light.y());
        self.cells[row * self.side + column].push(light);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All lights in the box, ordered by index.
    pub fn query_bounds(&self, bounds: &Bounds) -> Vec<Light> {
        self.collect_in(bounds, |light| bounds.contains(light.x(), light.y()))
    }

    /// All lights strictly inside `polygon`, ordered by index.
    pub fn query_polygon(&self, polygon: &Polygon<f64>) -> Vec<Light> {
        let Some(bounds) = Bounds::of_polygon(polygon) else {
            return Vec::new();
        };
        self.collect_in(&bounds, |light| {
            bounds.contains(light.x(), light.y())
                && polygon.contains(&Point::new(light.x(), light.y()))
        })
    }

    /// Every light, ordered by index.
    pub fn lights(&self) -> Vec<Light> {
        let mut lights: Vec<Light> = self.cells.iter().flatten().copied().collect();
        lights.sort_by_key(Light::index);
        lights
    }

    fn collect_in(&self, bounds: &Bounds, keep: impl Fn(&Light) -> bool) -> Vec<Light> {
        if self.len == 0 || bounds.min_x > bounds.max_x || bounds.min_y > bounds.max_y {
            return Vec::new();
        }

        // cell_of is monotone, so every light inside the bounds sits in this range
        let (col_lo, col_hi) = (self.cell_of(bounds.min_x), self.cell_of(bounds.max_x));
        let (row_lo, row_hi) = (self.cell_of(bounds.min_y), self.cell_of(bounds.max_y));

        let mut found = Vec::new();
        for row in row_lo..=row_hi {
            for column in col_lo..=col_hi {
                found.extend(self.cells[row * self.side + column].iter().filter(|l| keep(l)));
            }
        }
        found.sort_by_key(Light::index);
        found
    }

    #[inline]
    fn cell_of(&self, coordinate: f64) -> usize {
        let cell = (coordinate * self.side as f64).floor();
        if cell <= 0.0 {
            0
        } else {
            (cell as usize).min(self.side - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::LineString;

    fn sample() -> Vec<Light> {
        vec![
            Light::new(0.1, 0.1, 0),
            Light::new(0.9, 0.1, 1),
            Light::new(0.5, 0.5, 2),
            Light::new(0.1, 0.9, 3),
            Light::new(1.0, 1.0, 4),
        ]
    }

    #[test]
    fn test_box_query() {
        let grid = PointGrid::from_lights(&sample());
        assert_eq!(grid.len(), 5);

        let found = grid.query_bounds(&Bounds::new(0.0, 0.0, 0.6, 0.6));
        let indices: Vec<usize> = found.iter().map(Light::index).collect();
        assert_eq!(indices, vec![0, 2]);

        // Right and top edges are inclusive
        let corner = grid.query_bounds(&Bounds::new(0.95, 0.95, 1.0, 1.0));
        assert_eq!(corner.len(), 1);
        assert_eq!(corner[0].index(), 4);
    }

    #[test]
    fn test_box_query_outside_square() {
        let grid = PointGrid::from_lights(&sample());
        assert!(grid.query_bounds(&Bounds::new(1.5, 1.5, 2.0, 2.0)).is_empty());
        assert!(grid.query_bounds(&Bounds::new(-2.0, -2.0, -1.0, -1.0)).is_empty());
        // Partial overlap still finds what is inside
        assert_eq!(grid.query_bounds(&Bounds::new(-1.0, -1.0, 0.2, 0.2)).len(), 1);
    }

    #[test]
    fn test_polygon_query() {
        let grid = PointGrid::from_lights(&sample());
        let triangle = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.5, 0.8)]),
            Vec::new(),
        );
        let indices: Vec<usize> = grid.query_polygon(&triangle).iter().map(Light::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let empty = Polygon::new(LineString::new(Vec::new()), Vec::new());
        assert!(grid.query_polygon(&empty).is_empty());
    }

    #[test]
    fn test_box_edge_is_exact() {
        let grid = PointGrid::from_lights(&sample());
        let just_short = grid.query_bounds(&Bounds::new(0.0, 0.0, 0.5 - 4e-13, 0.6));
        let indices: Vec<usize> = just_short.iter().map(Light::index).collect();
        assert_eq!(indices, vec![0]);
    }

    #[test]
    fn test_lights_in_index_order() {
        let mut lights = sample();
        lights.reverse();
        let grid = PointGrid::from_lights(&lights);
        let indices: Vec<usize> = grid.lights().iter().map(Light::index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_grid() {
        let grid = PointGrid::sized_for(0);
        assert!(grid.is_empty());
        assert!(grid.query_bounds(&Bounds::new(0.0, 0.0, 1.0, 1.0)).is_empty());
    }
}
