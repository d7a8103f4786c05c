/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationConfig struct that contains all the
 * adjustable parameters for the boid simulation. The simulation reads one
 * value of it per tick; the CLI, a TOML file or the viewer's controls produce
 * new values between ticks. Every value that reaches the simulation has been
 * through `validate`, so the tick loop never has to check ranges itself.
 */

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::topology::{Domain, Topology};
use crate::{DETERMINISTIC_TIMESTEP, WEIGHT_SCALING_FACTOR};

// How the integration timestep is chosen each tick
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    // Fixed nominal timestep, reproducible run to run
    #[default]
    Deterministic,
    // Measured frame delta, smoother but not reproducible
    Timed,
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateMode::Deterministic => "deterministic",
            UpdateMode::Timed => "timed",
        })
    }
}

// The three steering behaviours, used to address their weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behaviour {
    Separation,
    Cohesion,
    Alignment,
}

impl Behaviour {
    pub fn name(self) -> &'static str {
        match self {
            Behaviour::Separation => "separation",
            Behaviour::Cohesion => "cohesion",
            Behaviour::Alignment => "alignment",
        }
    }
}

// Parameters for the simulation that can be adjusted via CLI, config file or UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub width: u32,
    pub height: u32,
    pub agent_count: usize,
    // Raw slider values; the boid update multiplies them by WEIGHT_SCALING_FACTOR
    pub separation_weight: f32,
    pub cohesion_weight: f32,
    pub alignment_weight: f32,
    pub vision_range: f32,
    pub max_speed: f32,
    // Upper bound on the steering vector's length, if any
    pub susceptibility: Option<f32>,
    pub topology: Topology,
    pub update_mode: UpdateMode,
    // Performance settings
    pub parallel: bool,
    pub spatial_grid: bool,
    pub rng_seed: Option<u64>,
    // Correlation histogram refresh period in ticks; None disables it
    pub correlation_period: Option<u32>,
    pub correlation_interval: f32,
    // Defaults to width / (2 * correlation_interval) buckets
    pub correlation_buckets: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 880,
            height: 880,
            agent_count: 200,
            separation_weight: 60.0,
            cohesion_weight: 20.0,
            alignment_weight: 1.0,
            vision_range: 40.0,
            max_speed: crate::MAX_SPEED,
            susceptibility: None,
            topology: Topology::Periodic,
            update_mode: UpdateMode::Deterministic,
            parallel: true,
            spatial_grid: false,
            rng_seed: None,
            correlation_period: None,
            correlation_interval: 10.0,
            correlation_buckets: None,
        }
    }
}

impl SimulationConfig {
    // Read a config from a TOML file; missing fields take their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroDimension { name: "width" });
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroDimension { name: "height" });
        }
        for behaviour in [Behaviour::Separation, Behaviour::Cohesion, Behaviour::Alignment] {
            let value = self.weight(behaviour);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    name: behaviour.name(),
                    value,
                });
            }
        }
        if !self.vision_range.is_finite() || self.vision_range <= 0.0 {
            return Err(ConfigError::InvalidVisionRange(self.vision_range));
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(ConfigError::InvalidMaxSpeed(self.max_speed));
        }
        if let Some(cap) = self.susceptibility {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(ConfigError::InvalidSusceptibility(cap));
            }
        }
        if self.correlation_period == Some(0) {
            return Err(ConfigError::InvalidCorrelation("period must be at least one tick"));
        }
        if !self.correlation_interval.is_finite() || self.correlation_interval <= 0.0 {
            return Err(ConfigError::InvalidCorrelation("bucket interval must be positive"));
        }
        if self.correlation_buckets == Some(0) {
            return Err(ConfigError::InvalidCorrelation("histogram needs at least one bucket"));
        }
        if !self.topology.supports(self.domain()) {
            return Err(ConfigError::UnsupportedDomain {
                topology: self.topology,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn domain(&self) -> Domain {
        Domain::new(self.width as f32, self.height as f32)
    }

    pub fn weight(&self, behaviour: Behaviour) -> f32 {
        match behaviour {
            Behaviour::Separation => self.separation_weight,
            Behaviour::Cohesion => self.cohesion_weight,
            Behaviour::Alignment => self.alignment_weight,
        }
    }

    pub fn weight_mut(&mut self, behaviour: Behaviour) -> &mut f32 {
        match behaviour {
            Behaviour::Separation => &mut self.separation_weight,
            Behaviour::Cohesion => &mut self.cohesion_weight,
            Behaviour::Alignment => &mut self.alignment_weight,
        }
    }

    // Weight as it is applied to the steering vector
    pub fn effective_weight(&self, behaviour: Behaviour) -> f32 {
        self.weight(behaviour) * WEIGHT_SCALING_FACTOR
    }

    // Integration step for a tick, given the real time since the last frame.
    // Capped so that a boid at full speed never travels further than the
    // shorter side of the domain in one tick, however long the frame stalled.
    pub fn timestep(&self, frame_delta: Duration) -> f32 {
        let step = match self.update_mode {
            UpdateMode::Deterministic => DETERMINISTIC_TIMESTEP,
            UpdateMode::Timed => frame_delta.as_secs_f32(),
        };
        step.min(self.max_timestep())
    }

    pub fn max_timestep(&self) -> f32 {
        let shorter_side = self.width.min(self.height) as f32;
        shorter_side / self.max_speed
    }

    pub fn correlation_bucket_count(&self) -> usize {
        self.correlation_buckets.unwrap_or_else(|| {
            ((self.width as f32 / (self.correlation_interval * 2.0)).floor() as usize).max(1)
        })
    }

    // Get parameter ranges for UI sliders
    pub fn get_agent_count_range() -> std::ops::RangeInclusive<usize> {
        0..=2000
    }

    pub fn get_max_speed_range() -> std::ops::RangeInclusive<f32> {
        10.0..=1000.0
    }

    pub fn get_weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=200.0
    }

    pub fn get_vision_range() -> std::ops::RangeInclusive<f32> {
        5.0..=200.0
    }
}
