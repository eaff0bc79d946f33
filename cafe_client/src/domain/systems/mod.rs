// Per-frame systems: smoothing and world-to-screen projection.

pub mod camera;
pub mod interpolation;
pub mod minimap;

pub use camera::{CameraProjector, CameraTransform};
pub use interpolation::InterpolationEngine;
pub use minimap::{MinimapDot, MinimapProjector, MinimapView};
