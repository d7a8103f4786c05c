// Solid walls: no identification, boids bounce off the edges

use nannou::prelude::{vec2, Vec2};

use super::Domain;

pub(super) fn relative_displacement(from: Vec2, to: Vec2) -> Vec2 {
    to - from
}

// Fold a coordinate back into [0, length] by reflecting off both walls as
// many times as it takes. Also reports whether an odd number of reflections
// happened, which is when the velocity component flips.
fn reflect(value: f32, length: f32) -> (f32, bool) {
    if (0.0..=length).contains(&value) {
        return (value, false);
    }
    let folded = value.rem_euclid(2.0 * length);
    if folded > length {
        (2.0 * length - folded, true)
    } else {
        (folded, false)
    }
}

pub(super) fn wrap_position(domain: Domain, position: Vec2) -> Vec2 {
    let (x, _) = reflect(position.x, domain.width);
    let (y, _) = reflect(position.y, domain.height);
    vec2(x, y)
}

pub(super) fn wrap_velocity(domain: Domain, position: Vec2, velocity: Vec2) -> Vec2 {
    let mut bounced = velocity;
    if reflect(position.x, domain.width).1 {
        bounced.x = -bounced.x;
    }
    if reflect(position.y, domain.height).1 {
        bounced.y = -bounced.y;
    }
    bounced
}
