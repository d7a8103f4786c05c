/*
 * Simulation Module
 *
 * The Simulation owns the boids and advances them one tick at a time:
 * 1. Snapshot: every boid's neighbours are measured from the pre-tick state
 * 2. Update: every boid steers from its own snapshot only
 * 3. Wrap: out-of-bounds boids are mapped back into the domain
 * 4. Statistics: mean velocity and polarization are refreshed
 *
 * Because no boid moves until every snapshot exists, the result does not
 * depend on iteration order, which is what makes the snapshot and update
 * phases safe to run in parallel.
 *
 * Everything else on this type is the control surface used between ticks by
 * the viewer, the CLI and the save/load code.
 */

use std::time::Duration;

use nannou::prelude::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::boid::{Boid, BoidUpdate, Steering};
use crate::diagnostics::{CorrelationMonitor, RequestOutcome};
use crate::error::ConfigError;
use crate::params::{Behaviour, SimulationConfig, UpdateMode};
use crate::persistence::AgentRecord;
use crate::spatial_grid::SpatialGrid;
use crate::stats::{CorrelationHistogram, FlockStats};
use crate::topology::{Domain, Topology};
use crate::vector::heading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

// What one boid can see at the start of a tick, in collection order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NeighborSnapshot {
    pub displacements: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
}

impl NeighborSnapshot {
    pub fn len(&self) -> usize {
        self.displacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displacements.is_empty()
    }
}

// Per-boid rendering feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentFrame {
    pub position: Vec2,
    pub velocity: Vec2,
    // Angle of the velocity, in radians from the x axis
    pub heading: f32,
}

impl AgentFrame {
    fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            heading: heading(velocity),
        }
    }
}

pub struct Simulation {
    config: SimulationConfig,
    boids: Vec<Boid>,
    steering: Vec<Steering>,
    rng: StdRng,
    state: RunState,
    tick_count: u64,
    stats: FlockStats,
    correlations: CorrelationMonitor,
}

impl Simulation {
    // Random boids, seeded from the config if it carries a seed
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut simulation = Self::empty(config, rng);
        simulation.populate();
        info!(
            agents = simulation.boids.len(),
            topology = %simulation.config.topology,
            mode = %simulation.config.update_mode,
            "created simulation"
        );
        Ok(simulation)
    }

    pub fn with_seed(mut config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        config.rng_seed = Some(seed);
        Self::new(config)
    }

    // Boids taken from saved records instead of random initialisation
    pub fn from_records(
        config: SimulationConfig,
        records: &[AgentRecord],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut simulation = Self::empty(config, rng);
        simulation.load_records(records);
        Ok(simulation)
    }

    fn empty(config: SimulationConfig, rng: StdRng) -> Self {
        Self {
            config,
            boids: Vec::new(),
            steering: Vec::new(),
            rng,
            state: RunState::Idle,
            tick_count: 0,
            stats: FlockStats::default(),
            correlations: CorrelationMonitor::new(),
        }
    }

    // Fill the collection with `agent_count` random boids
    fn populate(&mut self) {
        let domain = self.config.domain();
        let speed = self.config.max_speed;
        let rng = &mut self.rng;
        self.boids = (0..self.config.agent_count)
            .map(|_| Boid::random(domain, speed, rng))
            .collect();
        self.steering = vec![Steering::default(); self.boids.len()];
        self.refresh_stats();
    }

    // Advance the simulation by one tick
    pub fn tick(&mut self, frame_delta: Duration) {
        let dt = self.config.timestep(frame_delta);
        let snapshots = self.neighbor_snapshots();
        let updates = self.compute_updates(dt, &snapshots);
        self.apply_updates(&updates);
        self.refresh_stats();

        self.tick_count += 1;
        self.state = RunState::Running;
        self.request_correlations();

        debug!(
            tick = self.tick_count,
            dt,
            polarization = self.stats.polarization,
            "tick complete"
        );
    }

    // Neighbour lists for every boid, measured from the current state
    pub fn neighbor_snapshots(&self) -> Vec<NeighborSnapshot> {
        let positions: Vec<Vec2> = self.boids.iter().map(Boid::position).collect();
        let velocities: Vec<Vec2> = self.boids.iter().map(Boid::velocity).collect();
        let grid = self.build_grid(&positions);

        let snapshot_for = |index: usize| {
            self.snapshot_for(index, &positions, &velocities, grid.as_ref())
        };

        if self.config.parallel {
            // Each worker fills only its own boid's list; collect is the barrier
            (0..positions.len()).into_par_iter().map(snapshot_for).collect()
        } else {
            (0..positions.len()).map(snapshot_for).collect()
        }
    }

    // A grid is only a valid shortcut where a neighbour's nearest copy is
    // either itself or a plain translation across one edge
    fn build_grid(&self, positions: &[Vec2]) -> Option<SpatialGrid> {
        if !self.config.spatial_grid {
            return None;
        }
        let domain = self.config.domain();
        let wraps = match self.config.topology {
            Topology::Periodic => true,
            Topology::Solid => false,
            Topology::Sphere | Topology::Klein => return None,
        };
        if !positions.iter().all(|&p| domain.contains_closed(p)) {
            return None;
        }

        let mut grid = SpatialGrid::new(self.config.vision_range, domain, wraps);
        grid.rebuild(positions);
        Some(grid)
    }

    fn snapshot_for(
        &self,
        index: usize,
        positions: &[Vec2],
        velocities: &[Vec2],
        grid: Option<&SpatialGrid>,
    ) -> NeighborSnapshot {
        let me = positions[index];
        let mut snapshot = NeighborSnapshot::default();
        let mut observe = |other: usize| {
            if other == index {
                return;
            }
            let (displacement, velocity) = self.config.topology.relative_state(
                self.config.domain(),
                me,
                positions[other],
                velocities[other],
            );
            if displacement.length() < self.config.vision_range {
                snapshot.displacements.push(displacement);
                snapshot.velocities.push(velocity);
            }
        };

        match grid {
            Some(grid) => grid.candidates(me).into_iter().for_each(&mut observe),
            None => (0..positions.len()).for_each(&mut observe),
        }
        snapshot
    }

    fn compute_updates(&self, dt: f32, snapshots: &[NeighborSnapshot]) -> Vec<BoidUpdate> {
        assert_eq!(
            self.boids.len(),
            snapshots.len(),
            "one neighbour snapshot is needed per boid"
        );
        let update = |(boid, snapshot): (&Boid, &NeighborSnapshot)| {
            boid.update(dt, &snapshot.displacements, &snapshot.velocities, &self.config)
        };

        if self.config.parallel {
            self.boids.par_iter().zip(snapshots.par_iter()).map(update).collect()
        } else {
            self.boids.iter().zip(snapshots.iter()).map(update).collect()
        }
    }

    // Velocity has to be wrapped first: which edge was crossed is read off the
    // raw, out-of-bounds position
    fn apply_updates(&mut self, updates: &[BoidUpdate]) {
        let topology = self.config.topology;
        let domain = self.config.domain();
        for ((boid, steering), update) in self.boids.iter_mut().zip(&mut self.steering).zip(updates) {
            let velocity = topology.wrap_velocity(domain, update.position, update.velocity);
            let position = topology.wrap_position(domain, update.position);
            boid.set_state(position, velocity);
            *steering = update.steering;
        }
    }

    fn refresh_stats(&mut self) {
        let velocities: Vec<Vec2> = self.boids.iter().map(Boid::velocity).collect();
        self.stats = FlockStats::from_velocities(&velocities);
    }

    fn request_correlations(&self) {
        let Some(period) = self.config.correlation_period else {
            return;
        };
        if self.tick_count % u64::from(period) != 0 {
            return;
        }

        let positions: Vec<Vec2> = self.boids.iter().map(Boid::position).collect();
        let velocities: Vec<Vec2> = self.boids.iter().map(Boid::velocity).collect();
        let mean_velocity = self.stats.mean_velocity;
        let topology = self.config.topology;
        let domain = self.config.domain();
        let interval = self.config.correlation_interval;
        let buckets = self.config.correlation_bucket_count();

        let outcome = self.correlations.request(move || {
            CorrelationHistogram::build(
                &positions,
                &velocities,
                mean_velocity,
                topology,
                domain,
                interval,
                buckets,
            )
        });
        if outcome == RequestOutcome::Started {
            debug!(tick = self.tick_count, "started correlation job");
        }
    }

    // Bring a position/velocity pair into the canonical domain
    fn wrapped(&self, position: Vec2, velocity: Vec2) -> Boid {
        let topology = self.config.topology;
        let domain = self.config.domain();
        Boid::new(
            topology.wrap_position(domain, position),
            topology.wrap_velocity(domain, position, velocity),
        )
    }

    fn rewrap_all(&mut self) {
        let rewrapped: Vec<Boid> = self
            .boids
            .iter()
            .map(|boid| self.wrapped(boid.position(), boid.velocity()))
            .collect();
        self.boids = rewrapped;
    }

    // Add a boid at a point, flying at full speed in a random direction
    pub fn spawn_at(&mut self, point: Vec2) {
        let spawned = Boid::with_random_heading(point, self.config.max_speed, &mut self.rng);
        let boid = self.wrapped(spawned.position(), spawned.velocity());
        debug!(x = boid.position().x, y = boid.position().y, "spawned boid");
        self.boids.push(boid);
        self.steering.push(Steering::default());
        self.refresh_stats();
    }

    // Replace every boid with `agent_count` fresh random ones
    pub fn reset(&mut self) {
        self.populate();
        self.correlations.clear();
        info!(agents = self.boids.len(), "reset simulation");
    }

    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config.topology != self.config.topology {
            info!(from = %self.config.topology, to = %config.topology, "changed topology");
        }
        if config.update_mode != self.config.update_mode {
            info!(mode = %config.update_mode, "changed update mode");
        }
        let reshaped = config.topology != self.config.topology
            || config.width != self.config.width
            || config.height != self.config.height;

        self.config = config;
        if reshaped {
            self.rewrap_all();
            self.correlations.clear();
        }
        Ok(())
    }

    // Nudge one behaviour weight; weights never go below zero
    pub fn adjust_weight(&mut self, behaviour: Behaviour, delta: f32) {
        let weight = self.config.weight_mut(behaviour);
        *weight = (*weight + delta).max(0.0);
        info!(behaviour = behaviour.name(), weight = *weight, "adjusted weight");
    }

    // Switch topology, unless the current domain cannot carry it
    pub fn set_topology(&mut self, topology: Topology) -> Result<(), ConfigError> {
        if topology == self.config.topology {
            return Ok(());
        }
        if !topology.supports(self.config.domain()) {
            warn!(
                topology = %topology,
                width = self.config.width,
                height = self.config.height,
                "topology not supported on this domain"
            );
            return Err(ConfigError::UnsupportedDomain {
                topology,
                width: self.config.width,
                height: self.config.height,
            });
        }
        self.switch_topology(topology);
        Ok(())
    }

    // Move on to the next topology the domain supports
    pub fn cycle_topology(&mut self) -> Topology {
        let domain = self.config.domain();
        let mut next = self.config.topology.next();
        while !next.supports(domain) {
            next = next.next();
        }
        self.switch_topology(next);
        next
    }

    fn switch_topology(&mut self, topology: Topology) {
        if topology == self.config.topology {
            return;
        }
        info!(from = %self.config.topology, to = %topology, "changed topology");
        self.config.topology = topology;
        self.rewrap_all();
        self.correlations.clear();
    }

    pub fn set_update_mode(&mut self, mode: UpdateMode) {
        if mode != self.config.update_mode {
            info!(mode = %mode, "changed update mode");
            self.config.update_mode = mode;
        }
    }

    // Replace every boid with the saved ones
    pub fn load_records(&mut self, records: &[AgentRecord]) {
        self.boids = records
            .iter()
            .map(|record| self.wrapped(record.position(), record.velocity()))
            .collect();
        self.steering = vec![Steering::default(); self.boids.len()];
        self.correlations.clear();
        self.refresh_stats();
        info!(agents = self.boids.len(), "loaded agents");
    }

    pub fn records(&self) -> Vec<AgentRecord> {
        self.boids
            .iter()
            .map(|boid| AgentRecord::new(boid.position(), boid.velocity()))
            .collect()
    }

    pub fn frame(&self) -> Vec<AgentFrame> {
        self.boids
            .iter()
            .map(|boid| AgentFrame::new(boid.position(), boid.velocity()))
            .collect()
    }

    // Copies of every boid in the surrounding universes, for the wide view
    pub fn ghosts(&self) -> Vec<AgentFrame> {
        let topology = self.config.topology;
        let domain = self.config.domain();
        self.boids
            .iter()
            .flat_map(|boid| topology.ghosts(domain, boid.position(), boid.velocity()))
            .map(|(position, velocity)| AgentFrame::new(position, velocity))
            .collect()
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    // Weighted steering of each boid on the last tick
    pub fn steering(&self) -> &[Steering] {
        &self.steering
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn domain(&self) -> Domain {
        self.config.domain()
    }

    pub fn stats(&self) -> FlockStats {
        self.stats
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn correlations(&self) -> Option<CorrelationHistogram> {
        self.correlations.latest()
    }

    // Block until any running correlation job has published
    pub fn wait_for_correlations(&self) {
        self.correlations.wait_until_idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nannou::prelude::vec2;

    fn config(agent_count: usize) -> SimulationConfig {
        SimulationConfig {
            width: 100,
            height: 100,
            agent_count,
            parallel: false,
            ..SimulationConfig::default()
        }
    }

    fn records(pairs: &[(Vec2, Vec2)]) -> Vec<AgentRecord> {
        pairs.iter().map(|&(p, v)| AgentRecord::new(p, v)).collect()
    }

    #[test]
    fn starts_idle_and_runs_after_first_tick() {
        let mut simulation = Simulation::with_seed(config(10), 1).expect("valid config");
        assert_eq!(simulation.state(), RunState::Idle);
        assert_eq!(simulation.len(), 10);
        simulation.tick(Duration::from_millis(16));
        assert_eq!(simulation.state(), RunState::Running);
        assert_eq!(simulation.tick_count(), 1);
    }

    #[test]
    fn snapshots_respect_vision_and_topology() {
        let simulation = Simulation::from_records(
            config(0),
            &records(&[
                (vec2(1.0, 50.0), vec2(1.0, 0.0)),
                (vec2(99.0, 50.0), vec2(2.0, 0.0)),
                (vec2(50.0, 50.0), vec2(3.0, 0.0)),
            ]),
        )
        .expect("valid config");

        let snapshots = simulation.neighbor_snapshots();
        assert_eq!(snapshots[0].displacements, vec![vec2(-2.0, 0.0)]);
        assert_eq!(snapshots[0].velocities, vec![vec2(2.0, 0.0)]);
        assert!(snapshots[2].is_empty());
    }

    #[test]
    fn same_seed_gives_same_run() {
        let mut a = Simulation::with_seed(config(30), 42).expect("valid config");
        let mut b = Simulation::with_seed(config(30), 42).expect("valid config");
        for _ in 0..20 {
            a.tick(Duration::from_millis(16));
            b.tick(Duration::from_millis(3));
        }
        assert_eq!(a.records(), b.records());
    }

    #[test]
    fn parallel_and_serial_ticks_agree() {
        let mut serial = Simulation::with_seed(config(40), 9).expect("valid config");
        let mut parallel = Simulation::with_seed(
            SimulationConfig {
                parallel: true,
                ..config(40)
            },
            9,
        )
        .expect("valid config");
        for _ in 0..10 {
            serial.tick(Duration::ZERO);
            parallel.tick(Duration::ZERO);
        }
        assert_eq!(serial.records(), parallel.records());
    }

    #[test]
    fn spawned_boids_are_wrapped_into_the_domain() {
        let mut simulation = Simulation::with_seed(config(0), 3).expect("valid config");
        simulation.spawn_at(vec2(-1.0, 50.0));
        assert_eq!(simulation.len(), 1);
        assert_eq!(simulation.boids()[0].position(), vec2(99.0, 50.0));
        assert_eq!(simulation.stats().agent_count, 1);
    }

    #[test]
    fn weights_are_clamped_at_zero() {
        let mut simulation = Simulation::with_seed(config(0), 3).expect("valid config");
        simulation.adjust_weight(Behaviour::Alignment, -5.0);
        assert_eq!(simulation.config().alignment_weight, 0.0);
        simulation.adjust_weight(Behaviour::Cohesion, 1.0);
        assert_eq!(simulation.config().cohesion_weight, 21.0);
    }

    #[test]
    fn invalid_config_is_rejected_and_old_one_kept() {
        let mut simulation = Simulation::with_seed(config(0), 3).expect("valid config");
        let bad = SimulationConfig {
            vision_range: 0.0,
            ..config(0)
        };
        assert!(simulation.set_config(bad).is_err());
        assert_eq!(simulation.config().vision_range, 40.0);
        assert!(Simulation::new(SimulationConfig {
            max_speed: -1.0,
            ..config(0)
        })
        .is_err());
    }

    #[test]
    fn switching_to_solid_removes_ghosts() {
        let mut simulation = Simulation::with_seed(config(5), 3).expect("valid config");
        assert_eq!(simulation.ghosts().len(), 40);
        simulation.set_topology(Topology::Solid).expect("solid fits any domain");
        assert!(simulation.ghosts().is_empty());
        assert_eq!(simulation.config().topology, Topology::Solid);
    }

    #[test]
    fn sphere_is_refused_on_a_rectangle() {
        let mut simulation = Simulation::with_seed(
            SimulationConfig {
                height: 200,
                ..config(5)
            },
            3,
        )
        .expect("valid config");
        assert!(matches!(
            simulation.set_topology(Topology::Sphere),
            Err(ConfigError::UnsupportedDomain { .. })
        ));
        assert_eq!(simulation.config().topology, Topology::Periodic);

        // Cycling skips straight past it
        assert_eq!(simulation.cycle_topology(), Topology::Solid);
        assert_eq!(simulation.cycle_topology(), Topology::Klein);
    }

    #[test]
    fn reset_restores_the_configured_count() {
        let mut simulation = Simulation::with_seed(config(5), 3).expect("valid config");
        simulation.spawn_at(vec2(10.0, 10.0));
        assert_eq!(simulation.len(), 6);
        simulation.reset();
        assert_eq!(simulation.len(), 5);
    }

    #[test]
    fn correlations_are_published_on_schedule() {
        let mut simulation = Simulation::with_seed(
            SimulationConfig {
                correlation_period: Some(2),
                ..config(20)
            },
            5,
        )
        .expect("valid config");
        simulation.tick(Duration::ZERO);
        simulation.wait_for_correlations();
        assert!(simulation.correlations().is_none());

        simulation.tick(Duration::ZERO);
        simulation.wait_for_correlations();
        let histogram = simulation.correlations().expect("histogram after second tick");
        assert_eq!(histogram.bucket_count(), 5);
    }
}
