// Klein bottle boundary: left/right edges wrap as usual, crossing the
// top/bottom edge also mirrors the boid horizontally

use nannou::prelude::{vec2, Vec2};

use super::{Domain, Universe};
use crate::vector::{flip_x, wrap_coordinate};

pub(super) fn image(domain: Domain, universe: Universe, point: Vec2) -> Vec2 {
    let base = if universe.crosses_vertically() {
        vec2(domain.width - point.x, point.y)
    } else {
        point
    };
    base + universe.translation(domain)
}

pub(super) fn carried_velocity(universe: Universe, velocity: Vec2) -> Vec2 {
    if universe.crosses_vertically() {
        flip_x(velocity)
    } else {
        velocity
    }
}

// Every crossing of the top or bottom edge mirrors the boid, so only an odd
// number of crossings leaves it mirrored
fn mirrored(domain: Domain, position: Vec2) -> bool {
    let crossings = (position.y / domain.height).floor() as i64;
    crossings.rem_euclid(2) == 1
}

pub(super) fn wrap_position(domain: Domain, position: Vec2) -> Vec2 {
    let mut wrapped = position;
    if mirrored(domain, wrapped) {
        wrapped.x = domain.width - wrapped.x;
    }
    wrapped.y = wrap_coordinate(wrapped.y, domain.height);
    wrapped.x = wrap_coordinate(wrapped.x, domain.width);
    wrapped
}

pub(super) fn wrap_velocity(domain: Domain, position: Vec2, velocity: Vec2) -> Vec2 {
    if mirrored(domain, position) {
        flip_x(velocity)
    } else {
        velocity
    }
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
    fn horizontal_wrap_is_plain() {
        let topology = Topology::Klein;
        let position = vec2(101.0, 40.0);
        let velocity = vec2(2.0, 1.0);
        assert_eq!(topology.wrap_position(DOMAIN, position), vec2(1.0, 40.0));
        assert_eq!(topology.wrap_velocity(DOMAIN, position, velocity), velocity);
    }

    #[test]
    fn vertical_wrap_mirrors() {
        let topology = Topology::Klein;
        let position = vec2(20.0, 101.0);
        let velocity = vec2(2.0, 1.0);
        assert_eq!(topology.wrap_position(DOMAIN, position), vec2(80.0, 1.0));
        assert_eq!(topology.wrap_velocity(DOMAIN, position, velocity), vec2(-2.0, 1.0));
    }

    #[test]
    fn crossing_twice_undoes_the_mirror() {
        let topology = Topology::Klein;
        let position = vec2(20.0, 230.0);
        let velocity = vec2(2.0, 1.0);
        assert_eq!(topology.wrap_position(DOMAIN, position), vec2(20.0, 30.0));
        assert_eq!(topology.wrap_velocity(DOMAIN, position, velocity), velocity);

        let position = vec2(20.0, -130.0);
        assert_eq!(topology.wrap_position(DOMAIN, position), vec2(20.0, 70.0));
        assert_eq!(topology.wrap_velocity(DOMAIN, position, velocity), velocity);
    }

    #[test]
    fn neighbour_across_the_top_is_mirrored() {
        let topology = Topology::Klein;
        let me = vec2(20.0, 99.0);
        let other = vec2(80.0, 1.0);
        let (displacement, velocity) =
            topology.relative_state(DOMAIN, me, other, vec2(3.0, 4.0));
        assert_eq!(displacement, vec2(0.0, 2.0));
        assert_eq!(velocity, vec2(-3.0, 4.0));
    }

    #[test]
    fn ghosts_wrap_back_to_their_boid() {
        let topology = Topology::Klein;
        let position = vec2(15.0, 60.0);
        let velocity = vec2(-3.0, 2.0);
        for (ghost_position, ghost_velocity) in topology.ghosts(DOMAIN, position, velocity) {
            let wrapped_velocity = topology.wrap_velocity(DOMAIN, ghost_position, ghost_velocity);
            assert_eq!(topology.wrap_position(DOMAIN, ghost_position), position);
            assert_eq!(wrapped_velocity, velocity);
        }
    }
}
