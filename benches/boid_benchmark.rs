/*
 * Boid Simulation Benchmark
 *
 * This file contains benchmarks for the boid simulation to identify performance bottlenecks.
 * It measures the neighbour snapshot on its own and the whole tick, with and
 * without the spatial grid, for a range of flock sizes.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use manifold_boids::{Simulation, SimulationConfig, Topology};

fn simulation(agent_count: usize, topology: Topology, spatial_grid: bool) -> Simulation {
    let config = SimulationConfig {
        width: 2000,
        height: 2000,
        agent_count,
        topology,
        spatial_grid,
        ..SimulationConfig::default()
    };
    Simulation::with_seed(config, 1).expect("benchmark config is valid")
}

// Benchmark neighbour discovery alone
fn bench_neighbor_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_snapshots");

    for &num_boids in [100, 500, 1000, 2000].iter() {
        for grid in [false, true] {
            let sim = simulation(num_boids, Topology::Periodic, grid);
            let label = if grid { "grid" } else { "brute_force" };
            group.bench_with_input(BenchmarkId::new(label, num_boids), &sim, |b, sim| {
                b.iter(|| black_box(sim.neighbor_snapshots()));
            });
        }
    }

    group.finish();
}

// Benchmark the full tick on every topology
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for &num_boids in [100, 500, 1000].iter() {
        for topology in Topology::ALL {
            let mut sim = simulation(num_boids, topology, false);
            group.bench_function(BenchmarkId::new(topology.name(), num_boids), |b| {
                b.iter(|| sim.tick(black_box(Duration::from_millis(16))));
            });
        }
    }

    group.finish();
}

// Configure the benchmarks
criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_neighbor_snapshots, bench_tick
}

criterion_main!(benches);
