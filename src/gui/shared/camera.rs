//! 2D pan/zoom camera applied to the world container
//!
//! The camera is independent of node layout: it only maps world coordinates
//! to screen coordinates through a translate and a uniform scale.

use super::layout::{clamp_value, Bounds, Position, Size};

/// Wheel zoom limits
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 1.5;

/// Fit-to-view scale limits
pub const MIN_FIT_SCALE: f64 = 0.5;
pub const MAX_FIT_SCALE: f64 = 1.2;

/// Zoom change per wheel delta unit
pub const WHEEL_SENSITIVITY: f64 = 0.001;

/// Space kept around the content when fitting
pub const FIT_PADDING: f64 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    /// Pointer offset captured when a pan starts; `None` when not panning
    pan_start: Option<Position>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            pan_start: None,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_panning(&self) -> bool {
        self.pan_start.is_some()
    }

    /// Begin a pan at the pointer's screen position.
    pub fn pan_start(&mut self, pointer: Position) {
        self.pan_start = Some(Position::new(pointer.x - self.x, pointer.y - self.y));
    }

    /// Follow the pointer. Returns whether the camera moved.
    pub fn pan_move(&mut self, pointer: Position) -> bool {
        let Some(start) = self.pan_start else {
            return false;
        };
        self.x = pointer.x - start.x;
        self.y = pointer.y - start.y;
        true
    }

    pub fn pan_end(&mut self) {
        self.pan_start = None;
    }

    /// Zoom by a wheel delta; positive deltas zoom out.
    pub fn wheel(&mut self, delta_y: f64) {
        let delta = -delta_y * WHEEL_SENSITIVITY;
        self.scale = clamp_value(self.scale + delta, MIN_ZOOM, MAX_ZOOM);
    }

    /// Center `bounds` in the canvas with padding, scaling down to fit.
    pub fn fit_to(&mut self, bounds: Bounds, canvas: Size) {
        let content_width = bounds.width() + FIT_PADDING * 2.0;
        let content_height = bounds.height() + FIT_PADDING * 2.0;
        let scale = (canvas.width / content_width)
            .min(canvas.height / content_height)
            .min(1.0);

        self.scale = clamp_value(scale, MIN_FIT_SCALE, MAX_FIT_SCALE);
        self.x = (canvas.width - content_width * self.scale) / 2.0 - bounds.min_x * self.scale
            + FIT_PADDING * self.scale;
        self.y = (canvas.height - content_height * self.scale) / 2.0 - bounds.min_y * self.scale
            + FIT_PADDING * self.scale;
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.scale.is_finite()
    }

    /// Reset to the identity transform when any component is non-finite.
    /// Returns whether a reset happened.
    pub fn sanitize(&mut self) -> bool {
        if self.is_valid() {
            return false;
        }
        self.x = 0.0;
        self.y = 0.0;
        self.scale = 1.0;
        true
    }

    /// CSS transform for the world container.
    pub fn transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.x, self.y, self.scale
        )
    }

    /// Map a screen point into world coordinates.
    pub fn screen_to_world(&self, point: Position) -> Position {
        Position::new(
            (point.x - self.x) / self.scale,
            (point.y - self.y) / self.scale,
        )
    }
}
