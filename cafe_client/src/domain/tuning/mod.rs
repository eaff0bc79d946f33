// Tunables for interpolation and view projection.
//
// Keep this separate from runtime configuration (tick rates, channel sizes, etc.).

pub mod interpolation;
pub mod view;

pub use interpolation::InterpolationTuning;
pub use view::{CameraTuning, MinimapTuning};
