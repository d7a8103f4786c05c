/*
 * Renderer Module
 *
 * This module draws the simulation: the domain outline, the boids as
 * triangles pointing along their velocity, their copies in the neighbouring
 * universes when zoomed out, and the overlays.
 */

use nannou::prelude::*;
use tracing::warn;

use crate::app::Model;
use crate::camera::Camera;
use crate::simulation::AgentFrame;
use crate::ui;
use crate::BOID_SIZE;

// Length of the steering indicator per unit of steering
const STEERING_SCALE: f32 = 20.0;

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);
    let window_rect = app.window_rect();
    let camera = &model.camera;
    let domain = model.simulation.domain();

    // Domain boundary
    let bottom_left = camera.world_to_screen(vec2(0.0, 0.0), window_rect);
    let top_right = camera.world_to_screen(vec2(domain.width, domain.height), window_rect);
    let domain_rect = Rect::from_corners(bottom_left, top_right);
    draw.rect()
        .xy(domain_rect.xy())
        .wh(domain_rect.wh())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.5, 0.5, 0.5, 1.0));

    if model.view.zoom_out {
        for ghost in model.simulation.ghosts() {
            draw_agent(&draw, camera, window_rect, &ghost, rgba(0.45, 0.45, 0.55, 1.0));
        }
    }

    let agents = model.simulation.frame();
    for agent in &agents {
        draw_agent(&draw, camera, window_rect, agent, rgba(0.86, 0.86, 0.86, 1.0));
    }

    if model.view.show_steering {
        for (agent, steering) in agents.iter().zip(model.simulation.steering()) {
            let start = camera.world_to_screen(agent.position, window_rect);
            let scale = STEERING_SCALE * camera.zoom;
            for (force, color) in [
                (steering.separation, RED),
                (steering.cohesion, GREEN),
                (steering.alignment, BLUE),
            ] {
                if force != Vec2::ZERO {
                    draw.line()
                        .start(start)
                        .end(start + force * scale)
                        .color(color)
                        .weight(1.0);
                }
            }
        }
    }

    ui::draw_overlay(&draw, &ui::overlay_lines(&model.simulation, &model.view), window_rect);
    if model.view.show_correlations {
        if let Some(histogram) = model.simulation.correlations() {
            ui::draw_correlation_plot(&draw, &histogram, window_rect);
        }
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        warn!(error = ?err, "failed to draw frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        warn!(error = ?err, "failed to draw controls");
    }
}

// Draw one boid as a triangle pointing along its velocity
fn draw_agent(draw: &Draw, camera: &Camera, window_rect: Rect, agent: &AgentFrame, color: Rgba) {
    let screen_pos = camera.world_to_screen(agent.position, window_rect);
    let size = BOID_SIZE * camera.zoom;
    let points = [
        pt2(size, 0.0),
        pt2(-size, size / 2.0),
        pt2(-size, -size / 2.0),
    ];
    draw.polygon()
        .color(color)
        .points(points)
        .xy(screen_pos)
        .rotate(agent.heading);
}
