// Periodic (torus) boundary: plain translations, velocities are never changed

use nannou::prelude::{vec2, Vec2};

use super::{Domain, Universe};
use crate::vector::wrap_coordinate;

pub(super) fn image(domain: Domain, universe: Universe, point: Vec2) -> Vec2 {
    point + universe.translation(domain)
}

pub(super) fn wrap_position(domain: Domain, position: Vec2) -> Vec2 {
    vec2(
        wrap_coordinate(position.x, domain.width),
        wrap_coordinate(position.y, domain.height),
    )
}
