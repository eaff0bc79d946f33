use crate::domain::geometry::{Vec2, Viewport};
use crate::domain::tuning::CameraTuning;

/// Additive offset plus uniform scale mapping world space to screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub offset: Vec2,
    pub scale: f32,
    /// Background grid spacing in screen pixels at the current zoom.
    pub grid_cell: f32,
}

impl CameraTransform {
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.scale + self.offset.x,
            p.y * self.scale + self.offset.y,
        )
    }

    /// Phase of the background grid so its lines scroll with the world.
    pub fn grid_offset(&self) -> Vec2 {
        if self.grid_cell <= 0.0 {
            return Vec2::default();
        }
        Vec2::new(
            self.offset.x.rem_euclid(self.grid_cell),
            self.offset.y.rem_euclid(self.grid_cell),
        )
    }
}

#[derive(Debug, Clone)]
pub struct CameraProjector {
    tuning: CameraTuning,
    zoom: f32,
}

impl CameraProjector {
    pub fn new(tuning: CameraTuning) -> Self {
        let mut camera = Self {
            tuning,
            zoom: tuning.min_zoom,
        };
        camera.set_zoom(tuning.initial_zoom);
        camera
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Wheel down (positive delta) zooms out.
    pub fn apply_wheel(&mut self, delta_y: f32) {
        self.set_zoom(self.zoom - delta_y * self.tuning.wheel_sensitivity);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            // Bounds may arrive swapped from config; order them before clamping.
            let (lo, hi) = (
                self.tuning.min_zoom.min(self.tuning.max_zoom),
                self.tuning.min_zoom.max(self.tuning.max_zoom),
            );
            self.zoom = zoom.clamp(lo, hi);
        }
    }

    /// Keeps `focus` pinned to the viewport centre at any zoom.
    pub fn transform(&self, focus: Vec2, viewport: Viewport) -> CameraTransform {
        let center = viewport.center();
        CameraTransform {
            offset: Vec2::new(center.x - focus.x * self.zoom, center.y - focus.y * self.zoom),
            scale: self.zoom,
            grid_cell: self.tuning.grid_cell * self.zoom,
        }
    }
}
