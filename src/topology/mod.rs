/*
 * Topology Module
 *
 * This module defines how the rectangular simulation domain is glued together
 * at its edges. A topology answers four questions for the simulation:
 * 1. Where is the nearest copy of another boid, and how far away is it?
 * 2. How does that boid's velocity look from the copy we picked?
 * 3. Where does a boid that left the domain re-enter, and with what velocity?
 * 4. Where are the copies of a boid in the eight surrounding universes?
 *
 * The set of topologies is closed, so it is an enum and each variant keeps its
 * formulas in its own submodule.
 */

use std::fmt;

use nannou::prelude::{vec2, Vec2};
use serde::{Deserialize, Serialize};

mod klein;
mod periodic;
mod solid;
mod sphere;

// Boundary identification used by the simulation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    // Pac-man style wraparound (a torus)
    #[default]
    Periodic,
    // Reflective walls
    Solid,
    // Edges glued with quarter turns about the domain corners
    Sphere,
    // Wraparound with a mirror across the top/bottom edge
    Klein,
}

impl Topology {
    pub const ALL: [Topology; 4] = [
        Topology::Periodic,
        Topology::Solid,
        Topology::Sphere,
        Topology::Klein,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Topology::Periodic => "periodic",
            Topology::Solid => "solid",
            Topology::Sphere => "sphere",
            Topology::Klein => "klein",
        }
    }

    // The topology after this one, used for cycling through them at runtime
    pub fn next(self) -> Topology {
        match self {
            Topology::Periodic => Topology::Solid,
            Topology::Solid => Topology::Sphere,
            Topology::Sphere => Topology::Klein,
            Topology::Klein => Topology::Periodic,
        }
    }

    // The sphere's quarter-turn gluing only lines up on a square domain
    pub fn supports(self, domain: Domain) -> bool {
        match self {
            Topology::Sphere => domain.width == domain.height,
            _ => true,
        }
    }

    // Whether the topology has neighbouring universes at all
    pub fn has_images(self) -> bool {
        !matches!(self, Topology::Solid)
    }

    // Position of `point` as seen in a neighbouring universe
    pub fn image(self, domain: Domain, universe: Universe, point: Vec2) -> Vec2 {
        match self {
            Topology::Periodic | Topology::Solid => periodic::image(domain, universe, point),
            Topology::Sphere => sphere::image(domain, universe, point),
            Topology::Klein => klein::image(domain, universe, point),
        }
    }

    // Velocity carried into a neighbouring universe
    pub fn carried_velocity(self, universe: Universe, velocity: Vec2) -> Vec2 {
        match self {
            Topology::Periodic | Topology::Solid => velocity,
            Topology::Sphere => sphere::carried_velocity(universe, velocity),
            Topology::Klein => klein::carried_velocity(universe, velocity),
        }
    }

    // The universe holding the copy of `to` nearest to `from`, and the
    // displacement from `from` to that copy. Ties go to the earlier universe.
    pub fn nearest_image(self, domain: Domain, from: Vec2, to: Vec2) -> (Universe, Vec2) {
        if !self.has_images() {
            return (Universe::Same, solid::relative_displacement(from, to));
        }

        let mut best = (Universe::Same, to - from);
        let mut best_distance_squared = best.1.length_squared();
        for &universe in &Universe::ORDER[1..] {
            let displacement = self.image(domain, universe, to) - from;
            let distance_squared = displacement.length_squared();
            if distance_squared < best_distance_squared {
                best = (universe, displacement);
                best_distance_squared = distance_squared;
            }
        }
        best
    }

    pub fn relative_displacement(self, domain: Domain, from: Vec2, to: Vec2) -> Vec2 {
        self.nearest_image(domain, from, to).1
    }

    pub fn relative_velocity(
        self,
        domain: Domain,
        my_position: Vec2,
        other_position: Vec2,
        other_velocity: Vec2,
    ) -> Vec2 {
        let (universe, _) = self.nearest_image(domain, my_position, other_position);
        self.carried_velocity(universe, other_velocity)
    }

    // Displacement and velocity of another boid in one image search
    pub fn relative_state(
        self,
        domain: Domain,
        my_position: Vec2,
        other_position: Vec2,
        other_velocity: Vec2,
    ) -> (Vec2, Vec2) {
        let (universe, displacement) = self.nearest_image(domain, my_position, other_position);
        (displacement, self.carried_velocity(universe, other_velocity))
    }

    // Canonical in-domain position for a position that may be out of bounds
    pub fn wrap_position(self, domain: Domain, position: Vec2) -> Vec2 {
        match self {
            Topology::Periodic => periodic::wrap_position(domain, position),
            Topology::Solid => solid::wrap_position(domain, position),
            Topology::Sphere => sphere::wrap_position(domain, position),
            Topology::Klein => klein::wrap_position(domain, position),
        }
    }

    // Velocity after crossing whichever boundary `position` lies beyond.
    // Must be given the position before it is wrapped.
    pub fn wrap_velocity(self, domain: Domain, position: Vec2, velocity: Vec2) -> Vec2 {
        match self {
            Topology::Periodic => velocity,
            Topology::Solid => solid::wrap_velocity(domain, position, velocity),
            Topology::Sphere => sphere::wrap_velocity(domain, position, velocity),
            Topology::Klein => klein::wrap_velocity(domain, position, velocity),
        }
    }

    // Copies of a boid in the eight surrounding universes, for wide-view rendering
    pub fn ghosts(self, domain: Domain, position: Vec2, velocity: Vec2) -> Vec<(Vec2, Vec2)> {
        if !self.has_images() {
            return Vec::new();
        }
        Universe::ORDER[1..]
            .iter()
            .map(|&universe| {
                (
                    self.image(domain, universe, position),
                    self.carried_velocity(universe, velocity),
                )
            })
            .collect()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// The simulated rectangle [0, width) x [0, height)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub width: f32,
    pub height: f32,
}

impl Domain {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn centre(&self) -> Vec2 {
        vec2(self.width / 2.0, self.height / 2.0)
    }

    // Half-open containment, the canonical range of the wrapping topologies
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x < self.width && point.y >= 0.0 && point.y < self.height
    }

    // Closed containment, which is what reflective walls guarantee
    pub fn contains_closed(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

// The domain itself and the eight virtual copies around it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Universe {
    Same,
    Left,
    Right,
    Bottom,
    Top,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Universe {
    // Search order for nearest images, which fixes the tie-break
    pub const ORDER: [Universe; 9] = [
        Universe::Same,
        Universe::Left,
        Universe::Right,
        Universe::Bottom,
        Universe::Top,
        Universe::TopLeft,
        Universe::TopRight,
        Universe::BottomLeft,
        Universe::BottomRight,
    ];

    // Offset of the universe in whole domain widths/heights
    pub fn offset(self) -> (f32, f32) {
        match self {
            Universe::Same => (0.0, 0.0),
            Universe::Left => (-1.0, 0.0),
            Universe::Right => (1.0, 0.0),
            Universe::Bottom => (0.0, -1.0),
            Universe::Top => (0.0, 1.0),
            Universe::TopLeft => (-1.0, 1.0),
            Universe::TopRight => (1.0, 1.0),
            Universe::BottomLeft => (-1.0, -1.0),
            Universe::BottomRight => (1.0, -1.0),
        }
    }

    pub fn translation(self, domain: Domain) -> Vec2 {
        let (dx, dy) = self.offset();
        vec2(dx * domain.width, dy * domain.height)
    }

    pub fn is_corner(self) -> bool {
        let (dx, dy) = self.offset();
        dx != 0.0 && dy != 0.0
    }

    pub fn crosses_vertically(self) -> bool {
        self.offset().1 != 0.0
    }

    // Which universe a position lies in, judged against [0, width) x [0, height)
    pub fn containing(domain: Domain, position: Vec2) -> Universe {
        let left = position.x < 0.0;
        let right = position.x >= domain.width;
        let bottom = position.y < 0.0;
        let top = position.y >= domain.height;
        match (left, right, bottom, top) {
            (true, _, _, true) => Universe::TopLeft,
            (_, true, _, true) => Universe::TopRight,
            (true, _, true, _) => Universe::BottomLeft,
            (_, true, true, _) => Universe::BottomRight,
            (true, _, _, _) => Universe::Left,
            (_, true, _, _) => Universe::Right,
            (_, _, true, _) => Universe::Bottom,
            (_, _, _, true) => Universe::Top,
            _ => Universe::Same,
        }
    }
}
