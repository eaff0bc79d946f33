use crate::domain::entity::EntityId;
use crate::domain::geometry::Vec2;
use crate::domain::tuning::InterpolationTuning;
use std::collections::BTreeMap;
use std::time::Instant;

/// Fraction of the remaining distance covered after `dt` seconds.
pub fn decay_factor(rate: f32, dt: f32) -> f32 {
    if dt > 0.0 && dt.is_finite() {
        1.0 - (-rate * dt).exp()
    } else {
        0.0
    }
}

/// Owns visual positions and chases presence targets frame by frame.
#[derive(Debug)]
pub struct InterpolationEngine {
    tuning: InterpolationTuning,
    visuals: BTreeMap<EntityId, Vec2>,
    last_tick: Option<Instant>,
}

impl InterpolationEngine {
    pub fn new(tuning: InterpolationTuning) -> Self {
        Self {
            tuning,
            visuals: BTreeMap::new(),
            last_tick: None,
        }
    }

    pub fn visual(&self, id: &str) -> Option<Vec2> {
        self.visuals.get(id).copied()
    }

    pub fn visuals(&self) -> &BTreeMap<EntityId, Vec2> {
        &self.visuals
    }

    /// Advances by wall-clock time since the previous tick. The first tick only
    /// records its timestamp and returns false.
    pub fn tick(&mut self, now: Instant, targets: &[(EntityId, Vec2)]) -> bool {
        let Some(last) = self.last_tick.replace(now) else {
            return false;
        };
        let dt = now.saturating_duration_since(last).as_secs_f32();
        self.step(dt, targets);
        true
    }

    /// Advances every listed entity by `dt` seconds. Entities not listed are dropped;
    /// newly listed ones start exactly on their target.
    pub fn step(&mut self, dt: f32, targets: &[(EntityId, Vec2)]) {
        let factor = decay_factor(self.tuning.decay_rate, dt);
        let snap = self.tuning.snap_distance;

        let next = targets
            .iter()
            .map(|(id, target)| {
                let current = self.visuals.get(id).copied().unwrap_or(*target);
                let moved = current.lerp(*target, factor);
                let visual = if moved.within(*target, snap) {
                    *target
                } else {
                    moved
                };
                (id.clone(), visual)
            })
            .collect();
        self.visuals = next;
    }
}
