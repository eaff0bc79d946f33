#[derive(Debug, Clone, Copy)]
pub struct CameraTuning {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub initial_zoom: f32,

    /// Zoom change per unit of wheel delta.
    pub wheel_sensitivity: f32,

    /// Background grid spacing in world units.
    pub grid_cell: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 2.0,
            initial_zoom: 1.0,
            wheel_sensitivity: 0.001,
            grid_cell: 50.0,
        }
    }
}

/// Fixed-size overview map tuning.
#[derive(Debug, Clone, Copy)]
pub struct MinimapTuning {
    /// Minimap size in pixels.
    pub width: f32,
    pub height: f32,

    /// World units added to the fitted box before computing scale.
    pub fit_margin: f32,

    /// Smallest world extent per axis, so a lone or clustered group never over-zooms.
    pub min_extent: f32,

    /// Scale cap; the minimap only ever zooms out past this.
    pub max_scale: f32,

    /// Pixel inset dots are clamped to.
    pub edge_inset: f32,
}

impl Default for MinimapTuning {
    fn default() -> Self {
        Self {
            width: 192.0,
            height: 144.0,
            fit_margin: 100.0,
            min_extent: 600.0,
            max_scale: 0.5,
            edge_inset: 5.0,
        }
    }
}
