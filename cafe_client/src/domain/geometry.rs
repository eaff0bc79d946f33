// World-space primitives shared by interpolation and projection.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Componentwise linear interpolation toward `target`.
    pub fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        Vec2 {
            x: lerp(self.x, target.x, t),
            y: lerp(self.y, target.y, t),
        }
    }

    /// True when both axes are strictly closer than `threshold`.
    pub fn within(self, other: Vec2, threshold: f32) -> bool {
        (self.x - other.x).abs() < threshold && (self.y - other.y).abs() < threshold
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Screen area the camera renders into, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}
