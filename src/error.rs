/*
 * Error Module
 *
 * Recoverable failures at the edges of the simulation: bad configuration and
 * save files that cannot be read or written. Broken internal invariants in the
 * tick loop are panics, not errors.
 */

use std::path::PathBuf;

use thiserror::Error;

use crate::topology::Topology;

// Errors raised while building or changing a SimulationConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("domain {name} must be a positive integer")]
    ZeroDimension { name: &'static str },

    #[error("{name} weight must be a non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f32 },

    #[error("vision range must be positive, got {0}")]
    InvalidVisionRange(f32),

    #[error("max speed must be positive, got {0}")]
    InvalidMaxSpeed(f32),

    #[error("susceptibility must be positive when set, got {0}")]
    InvalidSusceptibility(f32),

    #[error("invalid correlation settings: {0}")]
    InvalidCorrelation(&'static str),

    #[error("{topology} topology needs a square domain, got {width}x{height}")]
    UnsupportedDomain {
        topology: Topology,
        width: u32,
        height: u32,
    },

    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// Errors raised while saving or loading agent lists
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed save data")]
    Format(#[from] serde_json::Error),

    #[error("no save files found in {0}")]
    NoSaves(PathBuf),
}
