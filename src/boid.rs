/*
 * Boid Module
 *
 * This module defines the Boid struct and its behavior.
 * Each boid follows three main rules:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 *
 * A boid never looks at other boids directly. It is handed the displacement
 * and velocity of each neighbour as seen through the active topology, so the
 * same update works on every boundary. Wrapping back into the domain happens
 * afterwards, in the simulation.
 */

use nannou::prelude::Vec2;
use rand::Rng;

use crate::params::{Behaviour, SimulationConfig};
use crate::topology::Domain;
use crate::vector::{from_heading, limit_length};
use crate::SEPARATION_CONSTANT;

#[derive(Debug, Clone, PartialEq)]
pub struct Boid {
    position: Vec2,
    velocity: Vec2,
}

// The weighted steering contributions of one update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Steering {
    pub separation: Vec2,
    pub cohesion: Vec2,
    pub alignment: Vec2,
}

impl Steering {
    pub fn total(&self) -> Vec2 {
        self.separation + self.cohesion + self.alignment
    }
}

// Result of a boid update, before any boundary handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidUpdate {
    pub position: Vec2,
    pub velocity: Vec2,
    pub steering: Steering,
}

impl Boid {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    // A boid at a given point flying at full speed in a random direction
    pub fn with_random_heading<R: Rng + ?Sized>(position: Vec2, speed: f32, rng: &mut R) -> Self {
        let heading = rng.gen_range(0.0..std::f32::consts::TAU);
        Self::new(position, from_heading(heading, speed))
    }

    // A boid anywhere in the domain flying at full speed in a random direction
    pub fn random<R: Rng + ?Sized>(domain: Domain, speed: f32, rng: &mut R) -> Self {
        let x = rng.gen_range(0.0..domain.width);
        let y = rng.gen_range(0.0..domain.height);
        Self::with_random_heading(Vec2::new(x, y), speed, rng)
    }

    // Positions and velocities are handed out by value so that nothing
    // outside the tick pipeline can change them
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub(crate) fn set_state(&mut self, position: Vec2, velocity: Vec2) {
        self.position = position;
        self.velocity = velocity;
    }

    // Work out where the boid goes next from the neighbours it can see.
    // `displacements[i]` and `velocities[i]` describe the same neighbour.
    pub fn update(
        &self,
        dt: f32,
        displacements: &[Vec2],
        velocities: &[Vec2],
        config: &SimulationConfig,
    ) -> BoidUpdate {
        assert_eq!(
            displacements.len(),
            velocities.len(),
            "neighbour displacement and velocity lists differ in length"
        );

        let steering = Steering {
            separation: separation(displacements) * config.effective_weight(Behaviour::Separation),
            cohesion: cohesion(displacements) * config.effective_weight(Behaviour::Cohesion),
            alignment: alignment(velocities) * config.effective_weight(Behaviour::Alignment),
        };

        let mut steer = steering.total();
        if let Some(cap) = config.susceptibility {
            steer = limit_length(steer, cap);
        }

        let velocity = limit_length(self.velocity + steer, config.max_speed);
        let position = self.position + velocity * dt;

        BoidUpdate {
            position,
            velocity,
            steering,
        }
    }
}

// Inverse-square push away from every neighbour
fn separation(displacements: &[Vec2]) -> Vec2 {
    let mut steering = Vec2::ZERO;
    for &displacement in displacements {
        let distance_squared = displacement.length_squared();
        if distance_squared != 0.0 {
            steering += displacement * (SEPARATION_CONSTANT / distance_squared);
        }
    }
    -steering
}

// Pull towards the neighbours' centre of mass
fn cohesion(displacements: &[Vec2]) -> Vec2 {
    if displacements.is_empty() {
        return Vec2::ZERO;
    }
    displacements.iter().sum::<Vec2>() / displacements.len() as f32
}

// Match the neighbours' average velocity
fn alignment(velocities: &[Vec2]) -> Vec2 {
    if velocities.is_empty() {
        return Vec2::ZERO;
    }
    velocities.iter().sum::<Vec2>() / velocities.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use nannou::prelude::vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn only(behaviour: Behaviour, weight: f32) -> SimulationConfig {
        let mut config = SimulationConfig {
            separation_weight: 0.0,
            cohesion_weight: 0.0,
            alignment_weight: 0.0,
            ..SimulationConfig::default()
        };
        *config.weight_mut(behaviour) = weight;
        config
    }

    #[test]
    fn no_neighbours_means_straight_flight() {
        let boid = Boid::new(vec2(10.0, 10.0), vec2(100.0, 0.0));
        let update = boid.update(0.5, &[], &[], &SimulationConfig::default());
        assert_eq!(update.velocity, vec2(100.0, 0.0));
        assert_eq!(update.position, vec2(60.0, 10.0));
        assert_eq!(update.steering, Steering::default());
    }

    #[test]
    fn separation_pushes_away_with_inverse_square() {
        let boid = Boid::new(Vec2::ZERO, Vec2::ZERO);
        let config = only(Behaviour::Separation, 200.0);
        let update = boid.update(0.02, &[vec2(10.0, 0.0)], &[Vec2::ZERO], &config);
        // 30 / 10^2 * 10 = 3, weighted by 200 * 0.005 = 1
        assert!((update.velocity - vec2(-3.0, 0.0)).length() < 1e-5);
        assert!(update.position.x < 0.0);
    }

    #[test]
    fn coincident_neighbour_adds_no_separation() {
        let boid = Boid::new(Vec2::ZERO, Vec2::ZERO);
        let config = only(Behaviour::Separation, 100.0);
        let update = boid.update(0.02, &[Vec2::ZERO], &[Vec2::ZERO], &config);
        assert_eq!(update.velocity, Vec2::ZERO);
    }

    #[test]
    fn cohesion_and_alignment_use_means() {
        let boid = Boid::new(Vec2::ZERO, Vec2::ZERO);
        let displacements = [vec2(10.0, 0.0), vec2(0.0, 20.0)];
        let velocities = [vec2(4.0, 0.0), vec2(0.0, 8.0)];

        let update = boid.update(0.0, &displacements, &velocities, &only(Behaviour::Cohesion, 200.0));
        assert!((update.velocity - vec2(5.0, 10.0)).length() < 1e-5);

        let update = boid.update(0.0, &displacements, &velocities, &only(Behaviour::Alignment, 200.0));
        assert!((update.velocity - vec2(2.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn speed_is_capped() {
        let config = only(Behaviour::Alignment, 200.0);
        let boid = Boid::new(Vec2::ZERO, vec2(config.max_speed, 0.0));
        let update = boid.update(0.02, &[vec2(5.0, 5.0)], &[vec2(1000.0, 0.0)], &config);
        assert!(update.velocity.length() <= config.max_speed + 1e-3);
    }

    #[test]
    fn susceptibility_caps_the_steer() {
        let mut config = only(Behaviour::Alignment, 200.0);
        config.susceptibility = Some(2.0);
        let boid = Boid::new(Vec2::ZERO, Vec2::ZERO);
        let update = boid.update(0.0, &[vec2(1.0, 1.0)], &[vec2(0.0, 50.0)], &config);
        assert!((update.velocity - vec2(0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    #[should_panic(expected = "differ in length")]
    fn mismatched_neighbour_lists_are_fatal() {
        let boid = Boid::new(Vec2::ZERO, Vec2::ZERO);
        boid.update(0.02, &[vec2(1.0, 0.0)], &[], &SimulationConfig::default());
    }

    #[test]
    fn random_boids_start_inside_at_full_speed() {
        let mut rng = StdRng::seed_from_u64(7);
        let domain = Domain::new(200.0, 100.0);
        for _ in 0..100 {
            let boid = Boid::random(domain, 300.0, &mut rng);
            assert!(domain.contains(boid.position()));
            assert!((boid.velocity().length() - 300.0).abs() < 1e-2);
        }
    }
}
