/*
 * Command Line Module
 *
 * Startup options for the boids binary. A TOML config file, if given, is read
 * first and any flag given on the command line overrides the matching field.
 * The merged config is validated before a simulation is built from it.
 */

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::params::{SimulationConfig, UpdateMode};
use crate::persistence::{self, DEFAULT_SAVE_DIRECTORY};
use crate::simulation::Simulation;
use crate::topology::Topology;

#[derive(Debug, Parser)]
#[command(name = "boids", version, about = "Flocking simulation on a choice of surfaces")]
pub struct Args {
    /// Domain width
    #[arg(long)]
    pub width: Option<u32>,

    /// Domain height
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of boids at startup
    #[arg(short, long)]
    pub number: Option<usize>,

    #[arg(long)]
    pub separation: Option<f32>,

    #[arg(long)]
    pub cohesion: Option<f32>,

    #[arg(long)]
    pub alignment: Option<f32>,

    #[arg(long)]
    pub vision_range: Option<f32>,

    #[arg(long)]
    pub max_speed: Option<f32>,

    /// Cap on the length of each tick's steering
    #[arg(long)]
    pub susceptibility: Option<f32>,

    #[arg(long, value_enum)]
    pub boundary_condition: Option<Topology>,

    #[arg(long, value_enum)]
    pub update_mode: Option<UpdateMode>,

    /// Start from a saved agent list instead of random boids
    #[arg(long)]
    pub load_file: Option<PathBuf>,

    /// TOML file with simulation settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for reproducible initial positions
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use the spatial grid for neighbour search where it applies
    #[arg(long)]
    pub grid: bool,

    /// Run the whole tick on one thread
    #[arg(long)]
    pub no_parallel: bool,

    /// Compute and plot the velocity correlation histogram
    #[arg(long)]
    pub show_correlations: bool,

    /// Ticks between correlation recomputations
    #[arg(long)]
    pub correlation_period: Option<u32>,

    /// Show the surrounding universes around the domain
    #[arg(long)]
    pub zoom_out: bool,

    /// Run without a window
    #[arg(long)]
    pub headless: bool,

    /// Stop a headless run after this many ticks
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Log flock statistics every this many ticks in a headless run
    #[arg(long, default_value_t = 100)]
    pub report_every: u64,

    /// Directory for saves made from the viewer
    #[arg(long, default_value = DEFAULT_SAVE_DIRECTORY)]
    pub save_dir: PathBuf,
}

// Everything needed to start a run
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub config: SimulationConfig,
    pub load_file: Option<PathBuf>,
    pub show_correlations: bool,
    pub zoom_out: bool,
    pub headless: bool,
    pub ticks: Option<u64>,
    pub report_every: u64,
    pub save_dir: PathBuf,
}

impl Args {
    pub fn into_options(self) -> Result<LaunchOptions, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_toml_file(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(number) = self.number {
            config.agent_count = number;
        }
        if let Some(weight) = self.separation {
            config.separation_weight = weight;
        }
        if let Some(weight) = self.cohesion {
            config.cohesion_weight = weight;
        }
        if let Some(weight) = self.alignment {
            config.alignment_weight = weight;
        }
        if let Some(range) = self.vision_range {
            config.vision_range = range;
        }
        if let Some(speed) = self.max_speed {
            config.max_speed = speed;
        }
        if self.susceptibility.is_some() {
            config.susceptibility = self.susceptibility;
        }
        if let Some(topology) = self.boundary_condition {
            config.topology = topology;
        }
        if let Some(mode) = self.update_mode {
            config.update_mode = mode;
        }
        if self.seed.is_some() {
            config.rng_seed = self.seed;
        }
        if self.grid {
            config.spatial_grid = true;
        }
        if self.no_parallel {
            config.parallel = false;
        }
        if self.correlation_period.is_some() {
            config.correlation_period = self.correlation_period;
        }
        if self.show_correlations && config.correlation_period.is_none() {
            config.correlation_period = Some(1);
        }

        config.validate()?;

        Ok(LaunchOptions {
            show_correlations: self.show_correlations || config.correlation_period.is_some(),
            config,
            load_file: self.load_file,
            zoom_out: self.zoom_out,
            headless: self.headless,
            ticks: self.ticks,
            report_every: self.report_every.max(1),
            save_dir: self.save_dir,
        })
    }
}

// Turn a config that failed validation into a clap error, so it is reported
// the same way as a malformed flag: with the usage line and a non-zero exit
pub fn usage_error(err: &ConfigError) -> clap::Error {
    Args::command().error(ErrorKind::ValueValidation, err)
}

impl LaunchOptions {
    // Build the starting simulation. A save file that cannot be read is
    // reported and replaced by random boids.
    pub fn build_simulation(&self) -> Result<Simulation, ConfigError> {
        if let Some(path) = &self.load_file {
            match persistence::load_records(path) {
                Ok(records) => {
                    info!(path = %path.display(), "starting from saved agents");
                    return Simulation::from_records(self.config.clone(), &records);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "could not load save file, starting with random boids");
                }
            }
        }
        Simulation::new(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::AgentRecord;
    use nannou::prelude::vec2;

    fn parse(args: &[&str]) -> Result<LaunchOptions, ConfigError> {
        let args = Args::try_parse_from(std::iter::once("boids").chain(args.iter().copied()))
            .expect("arguments parse");
        args.into_options()
    }

    #[test]
    fn no_flags_gives_defaults() {
        let options = parse(&[]).expect("valid");
        assert_eq!(options.config, SimulationConfig::default());
        assert!(!options.headless);
        assert!(!options.show_correlations);
    }

    #[test]
    fn flags_fill_the_config() {
        let options = parse(&[
            "--width", "400", "--height", "400", "-n", "50", "--separation", "10",
            "--boundary-condition", "sphere", "--update-mode", "timed", "--no-parallel",
            "--grid", "--seed", "7", "--show-correlations",
        ])
        .expect("valid");
        assert_eq!(options.config.width, 400);
        assert_eq!(options.config.height, 400);
        assert_eq!(options.config.agent_count, 50);
        assert_eq!(options.config.separation_weight, 10.0);
        assert_eq!(options.config.topology, Topology::Sphere);
        assert_eq!(options.config.update_mode, UpdateMode::Timed);
        assert!(!options.config.parallel);
        assert!(options.config.spatial_grid);
        assert_eq!(options.config.rng_seed, Some(7));
        assert_eq!(options.config.correlation_period, Some(1));
    }

    #[test]
    fn unknown_topology_is_a_usage_error() {
        let result = Args::try_parse_from(["boids", "--boundary-condition", "donut"]);
        assert!(result.is_err());
    }

    #[test]
    fn negative_weight_is_a_config_error() {
        let result = parse(&["--cohesion=-3"]);
        assert!(matches!(result, Err(ConfigError::InvalidWeight { .. })));
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("boids.toml");
        std::fs::write(&path, "width = 500\nagent_count = 12\ntopology = \"klein\"\n")
            .expect("write config");

        let path = path.to_string_lossy().into_owned();
        let options = parse(&["--config", &path, "--width", "600"]).expect("valid");
        assert_eq!(options.config.width, 600);
        assert_eq!(options.config.agent_count, 12);
        assert_eq!(options.config.topology, Topology::Klein);
    }

    #[test]
    fn unreadable_save_falls_back_to_random_boids() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.json").to_string_lossy().into_owned();
        let options = parse(&["-n", "8", "--load-file", &missing]).expect("valid");
        let simulation = options.build_simulation().expect("simulation");
        assert_eq!(simulation.len(), 8);
    }

    #[test]
    fn save_file_seeds_the_simulation() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("agents.json");
        let saved = vec![AgentRecord::new(vec2(5.0, 6.0), vec2(1.0, 0.0))];
        persistence::save_records(&path, &saved).expect("save");

        let path = path.to_string_lossy().into_owned();
        let options = parse(&["-n", "8", "--load-file", &path]).expect("valid");
        let simulation = options.build_simulation().expect("simulation");
        assert_eq!(simulation.records(), saved);
    }

    #[test]
    fn invalid_config_becomes_a_usage_error() {
        let err = parse(&["--boundary-condition", "sphere", "--width", "300", "--height", "200"])
            .expect_err("non-square sphere");
        let usage = usage_error(&err);
        assert_eq!(usage.kind(), ErrorKind::ValueValidation);
        assert!(usage.to_string().contains("square domain"));
    }
}
