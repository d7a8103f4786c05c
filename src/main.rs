/*
 * Boid Flocking Simulation
 *
 * This application simulates the flocking behavior of birds (boids) based on three main rules:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 *
 * The domain's edges can be glued together in different ways (wraparound,
 * walls, sphere, Klein bottle). With a window the simulation is interactive;
 * with --headless it just ticks and logs flock statistics.
 */

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use manifold_boids::app;
use manifold_boids::cli::{self, Args, LaunchOptions};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = match Args::parse().into_options() {
        Ok(options) => options,
        Err(err) => cli::usage_error(&err).exit(),
    };
    if options.headless {
        run_headless(&options)
    } else {
        app::run(options)?;
        Ok(())
    }
}

fn run_headless(options: &LaunchOptions) -> Result<()> {
    let mut simulation = options.build_simulation()?;
    let started = Instant::now();
    let mut last_tick = started;

    info!(ticks = ?options.ticks, "running headless");
    while options.ticks.map_or(true, |ticks| simulation.tick_count() < ticks) {
        let now = Instant::now();
        simulation.tick(now.duration_since(last_tick));
        last_tick = now;

        if simulation.tick_count() % options.report_every == 0 {
            let stats = simulation.stats();
            info!(
                tick = simulation.tick_count(),
                agents = stats.agent_count,
                polarization = stats.polarization,
                mean_speed = stats.mean_velocity.length(),
                "flock statistics"
            );
        }
    }

    if options.show_correlations {
        simulation.wait_for_correlations();
        if let Some(histogram) = simulation.correlations() {
            info!(correlations = ?histogram.normalized(), "final correlation histogram");
        }
    }

    let elapsed = started.elapsed().max(Duration::from_micros(1));
    info!(
        ticks = simulation.tick_count(),
        ticks_per_second = simulation.tick_count() as f64 / elapsed.as_secs_f64(),
        "headless run finished"
    );
    Ok(())
}
