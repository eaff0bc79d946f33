/// Smoothing applied when chasing server targets.
#[derive(Debug, Clone, Copy)]
pub struct InterpolationTuning {
    /// Exponential decay rate per second (15 reaches ~95% in ~200ms).
    pub decay_rate: f32,

    /// Distance per axis under which the visual snaps onto the target.
    pub snap_distance: f32,
}

impl Default for InterpolationTuning {
    fn default() -> Self {
        Self {
            decay_rate: 15.0,
            snap_distance: 1.0,
        }
    }
}
