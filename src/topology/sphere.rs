/*
 * Sphere boundary
 *
 * Each edge is glued to an adjacent edge with a quarter turn: leaving through
 * the left edge re-enters through the bottom edge, leaving through the right
 * edge re-enters through the top edge. Corners are glued to themselves with a
 * half turn. Neighbouring universes are the domain rotated about its centre
 * and then translated, which lines up with the wrap rule for square domains.
 */

use nannou::prelude::{vec2, Vec2};

use super::{Domain, Universe};
use crate::vector::Turn;

// Rotation of the domain as seen through each neighbouring universe
fn image_turn(universe: Universe) -> Turn {
    match universe {
        Universe::Same => Turn::Identity,
        Universe::Left | Universe::Right => Turn::Ccw,
        Universe::Bottom | Universe::Top => Turn::Cw,
        Universe::TopLeft | Universe::TopRight | Universe::BottomLeft | Universe::BottomRight => {
            Turn::Half
        }
    }
}

pub(super) fn image(domain: Domain, universe: Universe, point: Vec2) -> Vec2 {
    image_turn(universe).apply_about(point, domain.centre()) + universe.translation(domain)
}

pub(super) fn carried_velocity(universe: Universe, velocity: Vec2) -> Vec2 {
    image_turn(universe).apply(velocity)
}

// Rotation applied when a boid leaves through the given edge or corner,
// with the point it turns about
fn wrap_turn(domain: Domain, zone: Universe) -> (Turn, Vec2) {
    let (w, h) = (domain.width, domain.height);
    match zone {
        Universe::Same => (Turn::Identity, Vec2::ZERO),
        Universe::TopLeft => (Turn::Half, vec2(0.0, h)),
        Universe::TopRight => (Turn::Half, vec2(w, h)),
        Universe::BottomLeft => (Turn::Half, Vec2::ZERO),
        Universe::BottomRight => (Turn::Half, vec2(w, 0.0)),
        Universe::Left => (Turn::Cw, Vec2::ZERO),
        Universe::Right => (Turn::Cw, vec2(w, h)),
        Universe::Bottom => (Turn::Ccw, Vec2::ZERO),
        Universe::Top => (Turn::Ccw, vec2(w, h)),
    }
}

// Each pass re-enters through one glued edge; a boid far enough out can land
// beyond another edge and needs a further pass. Points on the closed boundary
// are left alone since the right and top edges are glued to each other.
const MAX_WRAP_PASSES: usize = 64;

fn fold(domain: Domain, mut position: Vec2, mut velocity: Vec2) -> (Vec2, Vec2) {
    for _ in 0..MAX_WRAP_PASSES {
        if domain.contains_closed(position) {
            break;
        }
        let (turn, pivot) = wrap_turn(domain, Universe::containing(domain, position));
        position = turn.apply_about(position, pivot);
        velocity = turn.apply(velocity);
    }
    (position, velocity)
}

pub(super) fn wrap_position(domain: Domain, position: Vec2) -> Vec2 {
    fold(domain, position, Vec2::ZERO).0
}

pub(super) fn wrap_velocity(domain: Domain, position: Vec2, velocity: Vec2) -> Vec2 {
    fold(domain, position, velocity).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;

    const DOMAIN: Domain = Domain {
        width: 100.0,
        height: 100.0,
    };

    #[test]
    fn left_edge_reenters_through_bottom_edge() {
        let topology = Topology::Sphere;
        let position = vec2(-1.0, 50.0);
        let velocity = vec2(-10.0, 0.0);
        assert_eq!(topology.wrap_position(DOMAIN, position), vec2(50.0, 1.0));
        // Heading left becomes heading up, back into the domain
        assert_eq!(topology.wrap_velocity(DOMAIN, position, velocity), vec2(0.0, 10.0));
    }

    #[test]
    fn top_edge_reenters_through_right_edge() {
        let topology = Topology::Sphere;
        let position = vec2(30.0, 102.0);
        let velocity = vec2(0.0, 5.0);
        assert_eq!(topology.wrap_position(DOMAIN, position), vec2(98.0, 30.0));
        assert_eq!(topology.wrap_velocity(DOMAIN, position, velocity), vec2(-5.0, 0.0));
    }

    #[test]
    fn corners_turn_half_way_round() {
        let topology = Topology::Sphere;
        let position = vec2(-2.0, -3.0);
        let velocity = vec2(-1.0, -1.0);
        assert_eq!(topology.wrap_position(DOMAIN, position), vec2(2.0, 3.0));
        assert_eq!(topology.wrap_velocity(DOMAIN, position, velocity), vec2(1.0, 1.0));
    }

    #[test]
    fn far_overshoot_takes_several_passes() {
        let topology = Topology::Sphere;
        // Left edge lands above the top edge, which then re-enters on the right
        let position = vec2(-130.0, 40.0);
        let velocity = vec2(-10.0, 0.0);
        assert_eq!(topology.wrap_position(DOMAIN, position), vec2(70.0, 40.0));
        assert_eq!(topology.wrap_velocity(DOMAIN, position, velocity), vec2(-10.0, 0.0));
    }

    #[test]
    fn neighbour_across_an_edge_is_rotated() {
        let topology = Topology::Sphere;
        // (50, 1) sits just across the left edge from (1, 50) once the bottom
        // edge is glued to the left edge
        let me = vec2(1.0, 50.0);
        let other = vec2(50.0, 1.0);
        let (displacement, velocity) =
            topology.relative_state(DOMAIN, me, other, vec2(0.0, 10.0));
        assert_eq!(displacement, vec2(-2.0, 0.0));
        assert_eq!(velocity, vec2(-10.0, 0.0));
    }

    #[test]
    fn ghosts_wrap_back_to_their_boid() {
        let topology = Topology::Sphere;
        let position = vec2(20.0, 70.0);
        let velocity = vec2(3.0, -4.0);
        for (ghost_position, ghost_velocity) in topology.ghosts(DOMAIN, position, velocity) {
            let wrapped_velocity = topology.wrap_velocity(DOMAIN, ghost_position, ghost_velocity);
            let wrapped_position = topology.wrap_position(DOMAIN, ghost_position);
            assert!((wrapped_position - position).length() < 1e-4);
            assert!((wrapped_velocity - velocity).length() < 1e-4);
        }
    }
}
