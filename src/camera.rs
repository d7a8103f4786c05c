/*
 * Camera Module
 *
 * This module defines the Camera struct that handles zooming and panning
 * in the viewer. It provides coordinate transformations between the
 * simulation domain, where (0, 0) is the bottom-left corner, and screen
 * space, where (0, 0) is the middle of the window.
 */

use nannou::prelude::*;

use crate::topology::Domain;

// How much of the surroundings to show when zoomed out: the domain plus one
// neighbouring universe on every side
const ZOOMED_OUT_SPAN: f32 = 3.0;

pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    drag_anchor: Option<Vec2>,
}

impl Camera {
    // A camera looking at the middle of the domain at 1:1 scale
    pub fn new(domain: Domain) -> Self {
        Self {
            position: domain.centre(),
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
            drag_anchor: None,
        }
    }

    // Convert a point from world space to screen space
    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - self.position) * self.zoom + window_rect.xy()
    }

    // Convert a point from screen space to world space
    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - window_rect.xy()) / self.zoom + self.position
    }

    // Centre the domain and scale it to fill the window, or to fill it with
    // the eight neighbouring universes as well
    pub fn frame_domain(&mut self, domain: Domain, window_rect: Rect, zoomed_out: bool) {
        let span = if zoomed_out { ZOOMED_OUT_SPAN } else { 1.0 };
        let fit = (window_rect.w() / (domain.width * span)).min(window_rect.h() / (domain.height * span));
        self.position = domain.centre();
        self.zoom = fit.clamp(self.min_zoom, self.max_zoom);
    }

    // Zoom about the cursor so the point under it stays put
    pub fn zoom(&mut self, scroll_delta: Vec2, cursor_position: Vec2, window_rect: Rect) {
        let zoom_factor = 1.0 + scroll_delta.y * 0.1;
        let cursor_world_before = self.screen_to_world(cursor_position, window_rect);
        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);
        let cursor_world_after = self.screen_to_world(cursor_position, window_rect);
        self.position += cursor_world_before - cursor_world_after;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.drag_anchor = Some(position);
    }

    // Move the camera by however far the cursor moved since the last call
    pub fn drag(&mut self, position: Vec2) {
        if let Some(anchor) = self.drag_anchor {
            let delta = position - anchor;
            if delta.length_squared() > 0.0 {
                self.position -= delta / self.zoom;
                self.drag_anchor = Some(position);
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: Domain = Domain {
        width: 200.0,
        height: 100.0,
    };

    #[test]
    fn screen_and_world_are_inverse() {
        let window = Rect::from_w_h(400.0, 200.0);
        let mut camera = Camera::new(DOMAIN);
        camera.frame_domain(DOMAIN, window, false);
        assert_eq!(camera.zoom, 2.0);

        let corner = camera.world_to_screen(vec2(0.0, 0.0), window);
        assert_eq!(corner, vec2(-200.0, -100.0));
        assert_eq!(camera.screen_to_world(corner, window), vec2(0.0, 0.0));
    }

    #[test]
    fn zooming_out_fits_the_neighbouring_universes() {
        let window = Rect::from_w_h(600.0, 300.0);
        let mut camera = Camera::new(DOMAIN);
        camera.frame_domain(DOMAIN, window, true);
        assert_eq!(camera.zoom, 1.0);
        assert_eq!(camera.world_to_screen(vec2(-200.0, -100.0), window), vec2(-300.0, -150.0));
    }

    #[test]
    fn dragging_pans_against_the_cursor() {
        let mut camera = Camera::new(DOMAIN);
        camera.start_drag(vec2(0.0, 0.0));
        camera.drag(vec2(10.0, -5.0));
        camera.end_drag();
        assert_eq!(camera.position, DOMAIN.centre() - vec2(10.0, -5.0));
        assert!(!camera.is_dragging());
    }
}
