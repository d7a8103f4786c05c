/*
 * Vector Module
 *
 * Small helpers on top of nannou's Vec2 that the topologies and the boid
 * update need: exact quarter turns, mirroring, rotation about a pivot and
 * speed limiting. Quarter turns are done with component swaps so that a
 * rotation followed by its inverse gives back the exact input.
 */

use nannou::prelude::{vec2, Vec2};

// A rotation by a multiple of 90 degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Identity,
    // +90 degrees (counterclockwise)
    Ccw,
    // -90 degrees (clockwise)
    Cw,
    Half,
}

impl Turn {
    #[inline]
    pub fn apply(self, v: Vec2) -> Vec2 {
        match self {
            Turn::Identity => v,
            Turn::Ccw => vec2(-v.y, v.x),
            Turn::Cw => vec2(v.y, -v.x),
            Turn::Half => vec2(-v.x, -v.y),
        }
    }

    pub fn inverse(self) -> Turn {
        match self {
            Turn::Ccw => Turn::Cw,
            Turn::Cw => Turn::Ccw,
            other => other,
        }
    }

    // Rotate a point about a pivot
    #[inline]
    pub fn apply_about(self, point: Vec2, pivot: Vec2) -> Vec2 {
        self.apply(point - pivot) + pivot
    }
}

// Mirror the horizontal component
#[inline]
pub fn flip_x(v: Vec2) -> Vec2 {
    vec2(-v.x, v.y)
}

// Unit vector in the direction of v, or zero for a zero-length vector
#[inline]
pub fn unit_or_zero(v: Vec2) -> Vec2 {
    let length_squared = v.length_squared();
    if length_squared > 0.0 {
        v / length_squared.sqrt()
    } else {
        Vec2::ZERO
    }
}

// Rescale v to max_length if it is longer than that
#[inline]
pub fn limit_length(v: Vec2, max_length: f32) -> Vec2 {
    let length = v.length();
    if length > max_length && length > 0.0 {
        v * (max_length / length)
    } else {
        v
    }
}

// Angle of the vector in radians, measured counterclockwise from +x
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

// Velocity of the given speed pointing along a heading measured clockwise from +y
pub fn from_heading(heading: f32, speed: f32) -> Vec2 {
    vec2(speed * heading.sin(), speed * heading.cos())
}

// Floor-modulo that always lands in [0, period)
#[inline]
pub fn wrap_coordinate(value: f32, period: f32) -> f32 {
    if value >= 0.0 && value < period {
        return value;
    }
    let wrapped = value - period * (value / period).floor();
    // (-tiny + period) can round up to period itself
    if wrapped >= period || wrapped < 0.0 {
        0.0
    } else {
        wrapped
    }
}
