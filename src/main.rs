use std::time::Instant;

use ceiling_lights::{CeilingConfig, LedSpace, LightError, Result, SpaceSnapshot};
use rayon::prelude::*;

fn main() {
    env_logger::init();

    // Check for command line arguments
    let args: Vec<String> = std::env::args().collect();

    let config = match config_from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    if args.iter().any(|arg| arg == "--benchmark") {
        if let Err(e) = run_benchmark(&config) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    } else {
        println!("Ceiling Lights");
        println!("Run with --benchmark to time spatial queries");
        println!("Add --config <path> to load a JSON ceiling config");
    }
}

fn config_from_args(args: &[String]) -> Result<CeilingConfig> {
    match args.iter().position(|arg| arg == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .ok_or_else(|| LightError::InvalidParameter("--config needs a path".into()))?;
            CeilingConfig::load(path)
        }
        None => Ok(CeilingConfig::default()),
    }
}

/// Average milliseconds per iteration of `pass`.
fn time_ms(iterations: usize, mut pass: impl FnMut()) -> f64 {
    let start = Instant::now();
    for _ in 0..iterations {
        pass();
    }
    start.elapsed().as_secs_f64() * 1000.0 / iterations as f64
}

fn run_benchmark(config: &CeilingConfig) -> Result<()> {
    println!("=== Spatial Query Benchmark ===\n");

    let iterations = 20;
    let side = 20;
    let points: Vec<(f64, f64)> = (0..side * side)
        .map(|i| {
            let x = (i % side) as f64 / (side - 1) as f64;
            let y = (i / side) as f64 / (side - 1) as f64;
            (x, y)
        })
        .collect();

    let mut space = LedSpace::with_cache_capacity(config.cache_capacity);
    space.set_circle_points(config.circle_points)?;
    space.map_in_zigzag(&config.layout);

    println!(
        "Layout: {} rows, {} lights, {} points per pass",
        config.layout.row_count(),
        space.len(),
        points.len()
    );
    println!("-----------------------");

    let radius = config.effect_radius;
    let max_distance = config.max_distance;
    let passes: [(&str, &dyn Fn(&mut LedSpace, f64, f64)); 3] = [
        ("Box", &|s, x, y| {
            s.query_box(x, y, radius, radius);
        }),
        ("Radius", &|s, x, y| {
            s.query_radius(x, y, radius);
        }),
        ("Nearest", &|s, x, y| {
            s.nearest_index(x, y, max_distance);
        }),
    ];

    for (name, query) in passes {
        let cold_ms = time_ms(iterations, || {
            space.invalidate_cache();
            for &(x, y) in &points {
                query(&mut space, x, y);
            }
        });
        let warm_ms = time_ms(iterations, || {
            for &(x, y) in &points {
                query(&mut space, x, y);
            }
        });

        println!("  {:<8} cold: {:.3} ms/pass", name, cold_ms);
        println!("  {:<8} warm: {:.3} ms/pass", name, warm_ms);
        println!("  Speedup: {:.2}x", cold_ms / warm_ms);
        println!();
    }

    let stats = space.cache_stats();
    println!("Cache: {} hits, {} misses\n", stats.hits, stats.misses);

    // Ship the detached index to worker threads as JSON
    println!("=== Detached Transfer ===");
    let json = serde_json::to_string(&space.snapshot())?;
    let workers = rayon::current_num_threads();

    let start = Instant::now();
    let hits = (0..workers)
        .into_par_iter()
        .map(|worker| -> Result<usize> {
            let snapshot: SpaceSnapshot = serde_json::from_str(&json)?;
            let mut space = LedSpace::restore(snapshot);
            Ok(points
                .iter()
                .skip(worker)
                .step_by(workers)
                .filter(|&&(x, y)| space.nearest_index(x, y, max_distance).is_some())
                .count())
        })
        .collect::<Result<Vec<usize>>>()?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    println!("Snapshot size: {} bytes, {} workers", json.len(), workers);
    println!(
        "  Resolved {} of {} points in {:.3} ms",
        hits.iter().sum::<usize>(),
        points.len(),
        elapsed_ms
    );

    Ok(())
}
