/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure for the boid simulation.
 * The simulation core (topology, boid, simulation, stats) has no window
 * dependency beyond nannou's vector type; the viewer modules wrap it.
 */

// Re-export key components for easier access
pub use boid::{Boid, BoidUpdate, Steering};
pub use camera::Camera;
pub use diagnostics::{CorrelationMonitor, RequestOutcome};
pub use error::{ConfigError, PersistenceError};
pub use params::{Behaviour, SimulationConfig, UpdateMode};
pub use persistence::{AgentRecord, SaveDirectory};
pub use simulation::{AgentFrame, NeighborSnapshot, RunState, Simulation};
pub use spatial_grid::SpatialGrid;
pub use stats::{CorrelationHistogram, FlockStats};
pub use topology::{Domain, Topology, Universe};

// Define modules
pub mod app;
pub mod boid;
pub mod camera;
pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod input;
pub mod params;
pub mod persistence;
pub mod renderer;
pub mod simulation;
pub mod spatial_grid;
pub mod stats;
pub mod topology;
pub mod ui;
pub mod vector;

// Constants
pub const MAX_SPEED: f32 = 300.0;
pub const SEPARATION_CONSTANT: f32 = 30.0;
pub const WEIGHT_SCALING_FACTOR: f32 = 0.005;
pub const DETERMINISTIC_TIMESTEP: f32 = 0.02;
pub const BOID_SIZE: f32 = 6.0;
