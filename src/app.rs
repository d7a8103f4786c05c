/*
 * Application Module
 *
 * This module defines the viewer's model and its update loop. The model owns
 * the simulation and only talks to it between ticks, through its control
 * surface. Deterministic mode ticks on a fixed-step accumulator; timed mode
 * ticks once per frame with the measured frame time.
 */

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{info, warn};

use crate::camera::Camera;
use crate::cli::LaunchOptions;
use crate::error::ConfigError;
use crate::input;
use crate::params::{SimulationConfig, UpdateMode};
use crate::persistence::SaveDirectory;
use crate::renderer;
use crate::simulation::Simulation;
use crate::ui::{self, UiActions, ViewState};
use crate::DETERMINISTIC_TIMESTEP;

// Upper bound on catch-up ticks in one frame, so a slow frame cannot snowball
const MAX_TICKS_PER_FRAME: u32 = 10;

// nannou builds the model from a plain fn, so the prepared simulation is
// handed over through here
struct Launch {
    simulation: Simulation,
    options: LaunchOptions,
}

static LAUNCH: Mutex<Option<Launch>> = Mutex::new(None);

// Main model for the application
pub struct Model {
    pub simulation: Simulation,
    pub egui: Egui,
    pub camera: Camera,
    pub saves: SaveDirectory,
    pub view: ViewState,
    pub mouse_position: Vec2,
    pub spawning: bool,
    pub accumulator: Duration,
}

// Open the viewer window and run until it is closed
pub fn run(options: LaunchOptions) -> Result<(), ConfigError> {
    let simulation = options.build_simulation()?;
    *LAUNCH.lock().unwrap_or_else(PoisonError::into_inner) = Some(Launch {
        simulation,
        options,
    });
    nannou::app(model).update(update).run();
    Ok(())
}

// Initialize the model
fn model(app: &App) -> Model {
    let Launch {
        simulation,
        options,
    } = LAUNCH
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .expect("viewer started through app::run");

    let config = simulation.config();
    let window_id = app
        .new_window()
        .title(format!("Boids on a {} domain", config.topology))
        .size(config.width, config.height)
        .view(renderer::view)
        .key_pressed(input::key_pressed)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_wheel(input::mouse_wheel)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to create window");
    let window = app.window(window_id).expect("window was just created");
    let egui = Egui::from_window(&window);

    let mut camera = Camera::new(simulation.domain());
    camera.frame_domain(simulation.domain(), window.rect(), options.zoom_out);

    info!(saves = %options.save_dir.display(), "viewer started");
    Model {
        simulation,
        egui,
        camera,
        saves: SaveDirectory::new(options.save_dir.clone()),
        view: ViewState {
            zoom_out: options.zoom_out,
            show_correlations: options.show_correlations,
            ..ViewState::default()
        },
        mouse_position: Vec2::ZERO,
        spawning: false,
        accumulator: Duration::ZERO,
    }
}

// Update the model
fn update(app: &App, model: &mut Model, update: Update) {
    model.view.fps = app.fps();
    model.view.frame_time = update.since_last;

    let actions = ui::update_ui(&mut model.egui, &mut model.view, &model.simulation);
    apply_actions(app, model, actions);

    if model.view.paused {
        model.accumulator = Duration::ZERO;
        return;
    }

    match model.simulation.config().update_mode {
        UpdateMode::Deterministic => {
            let step = Duration::from_secs_f32(DETERMINISTIC_TIMESTEP);
            model.accumulator += update.since_last;
            let mut ticks = 0;
            while model.accumulator >= step && ticks < MAX_TICKS_PER_FRAME {
                model.simulation.tick(step);
                model.accumulator -= step;
                ticks += 1;
            }
            if ticks == MAX_TICKS_PER_FRAME {
                model.accumulator = Duration::ZERO;
            }
        }
        UpdateMode::Timed => model.simulation.tick(update.since_last),
    }
}

fn apply_actions(app: &App, model: &mut Model, actions: UiActions) {
    if let Some(config) = actions.config {
        apply_config(model, config);
    }
    if actions.zoom_changed {
        reframe(app, model);
    }
    if actions.correlations_changed {
        let enabled = model.view.show_correlations;
        set_correlations(model, enabled);
    }
    if actions.reset {
        model.simulation.reset();
    }
    if actions.save {
        save(model);
    }
    if actions.load {
        load(model);
    }
}

// Hand a config edited in the viewer to the simulation. A new boid count
// takes effect through a reset.
pub fn apply_config(model: &mut Model, config: SimulationConfig) {
    let recount = config.agent_count != model.simulation.config().agent_count;
    match model.simulation.set_config(config) {
        Ok(()) if recount => model.simulation.reset(),
        Ok(()) => {}
        Err(err) => {
            warn!(error = %err, "rejected config change");
            model.view.status = Some(err.to_string());
        }
    }
}

pub fn reframe(app: &App, model: &mut Model) {
    let domain = model.simulation.domain();
    model.camera.frame_domain(domain, app.window_rect(), model.view.zoom_out);
}

// Start or stop refreshing the correlation histogram
pub fn set_correlations(model: &mut Model, enabled: bool) {
    model.view.show_correlations = enabled;
    let mut config = model.simulation.config().clone();
    config.correlation_period = if enabled {
        Some(config.correlation_period.unwrap_or(1))
    } else {
        None
    };
    apply_config(model, config);
}

pub fn save(model: &mut Model) {
    model.view.status = Some(match model.saves.write_new(&model.simulation.records()) {
        Ok(path) => format!("Saved to {}", path.display()),
        Err(err) => {
            warn!(error = %err, "save failed");
            format!("Save failed: {err}")
        }
    });
}

pub fn load(model: &mut Model) {
    model.view.status = Some(match model.saves.load_latest() {
        Ok(records) => {
            model.simulation.load_records(&records);
            format!("Loaded {} boids", records.len())
        }
        Err(err) => {
            warn!(error = %err, "load failed");
            format!("Load failed: {err}")
        }
    });
}
