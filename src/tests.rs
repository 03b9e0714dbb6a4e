//! End-to-end scenarios across the spatial index, strategies and ceiling

use crate::{
    Ceiling, CeilingConfig, Key, Layout, LedSpace, Light, MemoryPixels, Resolved, Strategy,
    zigzag_map,
};

fn small_ceiling() -> Ceiling<MemoryPixels<u8>> {
    let config = CeilingConfig {
        number_lights: 5,
        layout: Layout::new(vec![2, 3]).unwrap(),
        ..CeilingConfig::default()
    };
    Ceiling::new(MemoryPixels::new(5), config).unwrap()
}

/// Lowest-index light at the smallest distance within `max_distance`.
fn brute_nearest(lights: &[Light], x: f64, y: f64, max_distance: f64) -> Option<usize> {
    let mut best: Option<(f64, usize)> = None;
    for light in lights {
        let d = light.distance_to(x, y);
        if d <= max_distance && best.is_none_or(|(best_d, _)| d < best_d) {
            best = Some((d, light.index()));
        }
    }
    best.map(|(_, index)| index)
}

fn sample_points(side: usize) -> Vec<(f64, f64)> {
    (0..side * side)
        .map(|i| {
            let x = (i % side) as f64 / (side - 1) as f64;
            let y = (i / side) as f64 / (side - 1) as f64;
            (x, y)
        })
        .collect()
}

#[test]
fn test_indices_contiguous() {
    for rows in [vec![1], vec![2, 3], vec![5, 1, 4], Layout::default().rows().to_vec()] {
        let layout = Layout::new(rows).unwrap();
        let lights = zigzag_map(&layout);
        let indices: Vec<usize> = lights.iter().map(|l| l.index()).collect();
        assert_eq!(indices, (0..layout.light_count()).collect::<Vec<_>>());
        assert!(
            lights
                .iter()
                .all(|l| (0.0..=1.0).contains(&l.x()) && (0.0..=1.0).contains(&l.y()))
        );
    }
}

#[test]
fn test_rows_alternate_direction() {
    let layout = Layout::new(vec![4, 4, 4]).unwrap();
    let lights = zigzag_map(&layout);

    for (row, chunk) in lights.chunks(4).enumerate() {
        let rising = chunk.windows(2).all(|w| w[1].x() > w[0].x());
        let falling = chunk.windows(2).all(|w| w[1].x() < w[0].x());
        if row % 2 == 0 {
            assert!(falling, "row {row} should run right to left");
        } else {
            assert!(rising, "row {row} should run left to right");
        }
        // y climbs along the row
        assert!(chunk.windows(2).all(|w| w[1].y() > w[0].y()));
    }
}

#[test]
fn test_box_query_matches_scan() {
    let layout = Layout::default();
    let lights = zigzag_map(&layout);
    let mut space = LedSpace::from_layout(&layout);

    for (x, y) in sample_points(7) {
        for (w, h) in [(0.1, 0.1), (0.3, 0.05), (0.5, 0.5)] {
            let expected: Vec<usize> = lights
                .iter()
                .filter(|l| {
                    x - w / 2.0 <= l.x()
                        && l.x() <= x + w / 2.0
                        && y - h / 2.0 <= l.y()
                        && l.y() <= y + h / 2.0
                })
                .map(|l| l.index())
                .collect();
            let found: Vec<usize> = space.query_box(x, y, w, h).iter().map(|l| l.index()).collect();
            assert_eq!(found, expected, "box ({x}, {y}, {w}, {h})");
        }
    }
}

#[test]
fn test_box_query_excludes_light_just_past_edge() {
    let mut space = LedSpace::from_layout(&Layout::new(vec![2, 3]).unwrap());
    let width = 0.5 - 4e-13;
    let right = 0.25 + width / 2.0;

    // Light 0 sits at x = 0.5, a hair beyond the right edge
    let found = space.query_box(0.25, 0.0, width, 0.2);
    assert!(found.iter().all(|l| l.x() <= right));
    assert!(found.iter().all(|l| l.index() != 0));

    let touching = space.query_box(0.25, 0.0, 0.5, 0.2);
    assert_eq!(touching.iter().map(|l| l.index()).collect::<Vec<_>>(), vec![0]);
}

#[test]
fn test_nearest_matches_scan() {
    let layout = Layout::default();
    let lights = zigzag_map(&layout);
    let mut space = LedSpace::from_layout(&layout);

    for max_distance in [0.01, 0.05, 0.3] {
        for (x, y) in sample_points(11) {
            let found = space.nearest_index(x, y, max_distance);
            assert_eq!(found, brute_nearest(&lights, x, y, max_distance));
            if let Some(index) = found {
                assert!(lights[index].distance_to(x, y) <= max_distance);
            }
        }
    }
}

#[test]
fn test_nearest_none_when_far() {
    let layout = Layout::new(vec![2, 3]).unwrap();
    let mut space = LedSpace::from_layout(&layout);
    assert_eq!(space.nearest_index(1.0, 0.0, 0.1), None);
    assert_eq!(space.nearest_index(0.0, 0.6, 0.1), Some(2));
}

#[test]
fn test_detach_cycles_preserve_answers() {
    let layout = Layout::default();
    let mut space = LedSpace::from_layout(&layout);
    let before: Vec<Option<usize>> = sample_points(5).iter().map(|&(x, y)| space.nearest(x, y)).collect();

    for _ in 0..50 {
        space.detach();
        space.detach();
        assert!(space.is_detached());
        space.reattach();
        space.reattach();
        assert!(!space.is_detached());
    }

    space.invalidate_cache();
    let after: Vec<Option<usize>> = sample_points(5).iter().map(|&(x, y)| space.nearest(x, y)).collect();
    assert_eq!(before, after);
    assert_eq!(space.len(), layout.light_count());
}

#[test]
fn test_cached_repeat_is_identical() {
    let mut space = LedSpace::from_layout(&Layout::default());
    let first = space.query_radius(0.4, 0.4, 0.2);
    let second = space.query_radius(0.4, 0.4, 0.2);
    assert_eq!(first, second);
    assert_eq!(space.cache_stats().hits, 1);
}

#[test]
fn test_linear_negative_index() {
    let mut ceiling = small_ceiling();
    assert_eq!(ceiling.get(Key::Index(-1)).unwrap(), ceiling.get(Key::Index(4)).unwrap());

    ceiling.set(Key::Index(-1), 7).unwrap();
    assert_eq!(ceiling.pixels().as_slice(), &[0, 0, 0, 0, 7]);
}

#[test]
fn test_float_cartesian_blend() {
    let mut ceiling = small_ceiling();
    let lights = zigzag_map(&Layout::new(vec![2, 3]).unwrap());
    let mut strategy = ceiling.float_cartesian().unwrap();

    // Widen the blend to 0.3 through a fresh strategy on the same space
    let mut wide = crate::FloatCartesianIndexing::new(strategy.space().clone(), 0.3).unwrap();
    let resolved = wide.get(&Key::Point { x: 0.0, y: 0.6 }).unwrap();
    assert!(resolved.indices().contains(&2));
    assert!(resolved.indices().iter().all(|&i| lights[i].distance_to(0.0, 0.6) <= 0.3));

    assert!(strategy.get(&Key::Point { x: 5.0, y: 5.0 }).unwrap().is_miss());
}

#[test]
fn test_with_restores_strategy() {
    let mut ceiling = small_ceiling();
    ceiling.use_row();

    let name = ceiling.with_cartesian(|c| c.indexing().name()).unwrap();
    assert_eq!(name, "cartesian");
    assert_eq!(ceiling.indexing().name(), "row");

    let written = ceiling
        .with_float_polar((0.0, 0.0), |c| c.set(Key::Angle { theta: 0.0, radius: 0.5 }, 3))
        .unwrap()
        .unwrap();
    assert!(written > 0);
    assert_eq!(ceiling.indexing().name(), "row");
}

#[test]
fn test_send_detached_ceiling() {
    let mut ceiling = small_ceiling();
    ceiling.use_float_cartesian().unwrap();
    ceiling.prepare_to_send();

    let resolved = std::thread::spawn(move || {
        ceiling.get(Key::Point { x: 0.0, y: 0.5 }).unwrap()
    })
    .join()
    .unwrap();
    assert_eq!(resolved.indices().first(), Some(&2));
    assert!(matches!(resolved, Resolved::Lights(_)));
}
