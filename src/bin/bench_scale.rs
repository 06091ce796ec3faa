use std::time::Instant;

use toro_life::SimConfig;
use toro_life::runtime::run_headless;

fn bench_workers(grid_size: usize, workers: usize, steps: u64) -> (f64, u64) {
    let config = SimConfig::default()
        .grid_size(grid_size)
        .workers(workers)
        .steps(steps)
        .density(0.42);

    let start = Instant::now();
    let snapshot = run_headless(&config).expect("benchmark run failed");
    let duration = start.elapsed();

    (duration.as_secs_f64() * 1000.0, snapshot.population())
}

fn main() {
    const GRID_SIZE: usize = 256;
    const STEPS: u64 = 200;
    let worker_counts: &[usize] = &[1, 2, 4, 8, 16];

    println!(
        "{:<10} {:>8} {:>8} {:>12} {:>10} {:>12}",
        "Grid", "Workers", "Steps", "Total(ms)", "Avg(ms)", "Population"
    );
    println!("{}", "-".repeat(66));

    for &workers in worker_counts {
        let (total_ms, population) = bench_workers(GRID_SIZE, workers, STEPS);
        let avg_ms = total_ms / STEPS as f64;
        println!(
            "{:<10} {:>8} {:>8} {:>12.1} {:>10.4} {:>12}",
            format!("{}x{}", GRID_SIZE, GRID_SIZE),
            workers,
            STEPS,
            total_ms,
            avg_ms,
            population
        );
    }
}
