/*
 * Input Module
 *
 * This module handles keyboard and mouse events for the viewer.
 *
 * Keys:
 * - A/Z, S/X, D/C: raise/lower the separation, cohesion and alignment weights
 * - W: save, R: load the newest save
 * - Y: show the neighbouring universes, T: next topology
 * - I: correlation plot, P: pause
 *
 * Mouse: left click or drag spawns boids, right drag pans, wheel zooms.
 */

use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};

use crate::app::{self, Model};
use crate::params::Behaviour;

const WEIGHT_STEP: f32 = 1.0;

pub fn key_pressed(app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }
    match key {
        Key::A => model.simulation.adjust_weight(Behaviour::Separation, WEIGHT_STEP),
        Key::Z => model.simulation.adjust_weight(Behaviour::Separation, -WEIGHT_STEP),
        Key::S => model.simulation.adjust_weight(Behaviour::Cohesion, WEIGHT_STEP),
        Key::X => model.simulation.adjust_weight(Behaviour::Cohesion, -WEIGHT_STEP),
        Key::D => model.simulation.adjust_weight(Behaviour::Alignment, WEIGHT_STEP),
        Key::C => model.simulation.adjust_weight(Behaviour::Alignment, -WEIGHT_STEP),
        Key::W => app::save(model),
        Key::R => app::load(model),
        Key::Y => {
            model.view.zoom_out = !model.view.zoom_out;
            app::reframe(app, model);
        }
        Key::T => {
            model.simulation.cycle_topology();
        }
        Key::I => {
            let enabled = !model.view.show_correlations;
            app::set_correlations(model, enabled);
        }
        Key::P => model.view.paused = !model.view.paused,
        _ => {}
    }
}

// Mouse moved event handler
pub fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    model.mouse_position = pos;
    if model.camera.is_dragging() {
        model.camera.drag(pos);
    }
    if model.spawning {
        spawn_under_cursor(app, model);
    }
}

pub fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    // Clicks on the control panel are egui's
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    match button {
        MouseButton::Left => {
            model.spawning = true;
            spawn_under_cursor(app, model);
        }
        MouseButton::Right => model.camera.start_drag(model.mouse_position),
        _ => {}
    }
}

pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    match button {
        MouseButton::Left => model.spawning = false,
        MouseButton::Right => model.camera.end_drag(),
        _ => {}
    }
}

// Mouse wheel event handler for zooming
pub fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    let scroll = match delta {
        MouseScrollDelta::LineDelta(x, y) => vec2(x, y),
        MouseScrollDelta::PixelDelta(pos) => vec2(pos.x as f32, pos.y as f32) * 0.01,
    };
    model.camera.zoom(scroll, model.mouse_position, app.window_rect());
}

// Pass raw events on to egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}

fn spawn_under_cursor(app: &App, model: &mut Model) {
    let point = model.camera.screen_to_world(model.mouse_position, app.window_rect());
    model.simulation.spawn_at(point);
}
