/*
 * UI Module
 *
 * This module contains the egui control panel and the text and plot overlays
 * drawn over the simulation. The panel never touches the simulation itself:
 * it edits a copy of the config and reports what the user asked for, and the
 * app applies it between ticks.
 */

use std::time::Duration;

use nannou::prelude::*;
use nannou_egui::{egui, Egui};

use crate::params::{Behaviour, SimulationConfig, UpdateMode};
use crate::simulation::Simulation;
use crate::stats::CorrelationHistogram;
use crate::topology::Topology;

// Viewer-only state shown in and edited by the panel
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub paused: bool,
    pub zoom_out: bool,
    pub show_correlations: bool,
    pub show_steering: bool,
    pub fps: f32,
    pub frame_time: Duration,
    // Outcome of the last save, load or rejected change
    pub status: Option<String>,
}

// What the user asked for this frame
#[derive(Debug, Default)]
pub struct UiActions {
    pub config: Option<SimulationConfig>,
    pub reset: bool,
    pub save: bool,
    pub load: bool,
    pub zoom_changed: bool,
    pub correlations_changed: bool,
}

// Build the control panel for this frame
pub fn update_ui(egui: &mut Egui, view: &mut ViewState, simulation: &Simulation) -> UiActions {
    let mut actions = UiActions::default();
    let mut config = simulation.config().clone();
    let zoom_out = view.zoom_out;
    let show_correlations = view.show_correlations;

    let ctx = egui.begin_frame();
    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Boid Parameters", |ui| {
                ui.add(
                    egui::Slider::new(&mut config.agent_count, SimulationConfig::get_agent_count_range())
                        .text("Number of Boids"),
                );
                ui.add(
                    egui::Slider::new(&mut config.max_speed, SimulationConfig::get_max_speed_range())
                        .text("Max Speed"),
                );
                ui.add(
                    egui::Slider::new(&mut config.vision_range, SimulationConfig::get_vision_range())
                        .text("Vision Range"),
                );

                let mut capped = config.susceptibility.is_some();
                ui.checkbox(&mut capped, "Cap Steering");
                config.susceptibility = if capped {
                    let mut cap = config.susceptibility.unwrap_or(10.0);
                    ui.add(egui::Slider::new(&mut cap, 0.1..=100.0).text("Susceptibility"));
                    Some(cap)
                } else {
                    None
                };

                ui.horizontal(|ui| {
                    if ui.button("Reset Boids").clicked() {
                        actions.reset = true;
                    }
                    if ui.button("Save").clicked() {
                        actions.save = true;
                    }
                    if ui.button("Load Latest").clicked() {
                        actions.load = true;
                    }
                });
            });

            ui.collapsing("Flocking Behavior", |ui| {
                for behaviour in [Behaviour::Separation, Behaviour::Cohesion, Behaviour::Alignment] {
                    ui.add(
                        egui::Slider::new(config.weight_mut(behaviour), SimulationConfig::get_weight_range())
                            .text(format!("{} Weight", capitalized(behaviour.name()))),
                    );
                }
            });

            ui.collapsing("Surface", |ui| {
                egui::ComboBox::from_label("Topology")
                    .selected_text(capitalized(config.topology.name()))
                    .show_ui(ui, |ui| {
                        let domain = config.domain();
                        for topology in Topology::ALL.into_iter().filter(|t| t.supports(domain)) {
                            ui.selectable_value(&mut config.topology, topology, capitalized(topology.name()));
                        }
                    });
                ui.horizontal(|ui| {
                    ui.radio_value(&mut config.update_mode, UpdateMode::Deterministic, "Deterministic");
                    ui.radio_value(&mut config.update_mode, UpdateMode::Timed, "Timed");
                });
                ui.checkbox(&mut view.zoom_out, "Show Neighbouring Universes");
            });

            ui.collapsing("Performance Tuning", |ui| {
                ui.checkbox(&mut config.parallel, "Enable Parallel Processing");
                ui.checkbox(&mut config.spatial_grid, "Enable Spatial Grid");
                ui.separator();
                ui.label(format!("FPS: {:.1}", view.fps));
                ui.label(format!("Frame time: {:.2} ms", view.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Ticks: {}", simulation.tick_count()));
            });

            ui.checkbox(&mut view.show_correlations, "Show Correlations");
            ui.checkbox(&mut view.show_steering, "Show Steering");
            ui.checkbox(&mut view.paused, "Pause Simulation");

            if let Some(status) = &view.status {
                ui.separator();
                ui.label(status.as_str());
            }
        });

    if &config != simulation.config() {
        actions.config = Some(config);
    }
    actions.zoom_changed = view.zoom_out != zoom_out;
    actions.correlations_changed = view.show_correlations != show_correlations;
    actions
}

fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Lines of the text overlay in the top-left corner
pub fn overlay_lines(simulation: &Simulation, view: &ViewState) -> Vec<String> {
    let config = simulation.config();
    let stats = simulation.stats();
    let mut lines = vec![
        format!("Boids: {}", stats.agent_count),
        format!("FPS: {:.1}", view.fps),
        format!("Polarization: {:.3}", stats.polarization),
        format!(
            "Weights: sep {:.3} coh {:.3} ali {:.3}",
            config.effective_weight(Behaviour::Separation),
            config.effective_weight(Behaviour::Cohesion),
            config.effective_weight(Behaviour::Alignment),
        ),
        format!("Surface: {} ({})", config.topology, config.update_mode),
    ];
    if view.paused {
        lines.push("Paused".to_string());
    }
    lines
}

// Draw the text overlay on the screen
pub fn draw_overlay(draw: &Draw, lines: &[String], window_rect: Rect) {
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 260.0;
    let panel_height = line_height * lines.len() as f32 + margin;

    draw.rect()
        .x_y(
            window_rect.right() - panel_width / 2.0,
            window_rect.top() - panel_height / 2.0,
        )
        .w_h(panel_width, panel_height)
        .color(rgba(0.0, 0.0, 0.0, 0.7));

    let text_y = window_rect.top() - margin;
    for (i, text) in lines.iter().enumerate() {
        draw.text(text)
            .x_y(window_rect.right() - panel_width / 2.0, text_y - i as f32 * line_height)
            .w(panel_width - margin)
            .left_justify()
            .color(WHITE)
            .font_size(14);
    }
}

// Bar plot of the normalized correlation histogram in the bottom-right corner
pub fn draw_correlation_plot(draw: &Draw, histogram: &CorrelationHistogram, window_rect: Rect) {
    let values = histogram.normalized();
    if values.is_empty() {
        return;
    }

    let plot_width = 300.0;
    let plot_height = 160.0;
    let margin = 20.0;
    let centre = pt2(
        window_rect.right() - margin - plot_width / 2.0,
        window_rect.bottom() + margin + plot_height / 2.0,
    );

    draw.rect()
        .xy(centre)
        .w_h(plot_width, plot_height)
        .color(rgba(0.0, 0.0, 0.0, 0.7));
    draw.line()
        .start(pt2(centre.x - plot_width / 2.0, centre.y))
        .end(pt2(centre.x + plot_width / 2.0, centre.y))
        .color(GRAY)
        .weight(1.0);

    // Normalized values lie in [-1, 1], the zero line runs through the middle
    let bar_width = plot_width / values.len() as f32;
    for (i, &value) in values.iter().enumerate() {
        let height = value * plot_height / 2.0;
        draw.rect()
            .x_y(
                centre.x - plot_width / 2.0 + bar_width * (i as f32 + 0.5),
                centre.y + height / 2.0,
            )
            .w_h(bar_width * 0.8, height.abs())
            .color(if value >= 0.0 { STEELBLUE } else { INDIANRED });
    }

    draw.text(&format!(
        "Correlation vs distance (0 to {:.0})",
        histogram.bucket_start(values.len() - 1) + histogram.interval()
    ))
    .xy(pt2(centre.x, centre.y + plot_height / 2.0 - 10.0))
    .w(plot_width)
    .color(WHITE)
    .font_size(12);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_capitalized_for_display() {
        assert_eq!(capitalized("klein"), "Klein");
        assert_eq!(capitalized(""), "");
    }
}
