use crate::domain::entity::EntityId;
use crate::domain::geometry::Vec2;
use crate::domain::tuning::MinimapTuning;

#[derive(Debug, Clone, PartialEq)]
pub struct MinimapDot {
    pub id: EntityId,
    /// Pixel position inside the minimap, already clamped to the frame.
    pub position: Vec2,
    pub is_me: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimapView {
    pub scale: f32,
    /// World-space point drawn at the minimap centre.
    pub center: Vec2,
    pub dots: Vec<MinimapDot>,
}

/// Auto-fits every entity into a fixed-size overview, never zooming in past the cap.
#[derive(Debug, Clone)]
pub struct MinimapProjector {
    tuning: MinimapTuning,
}

impl MinimapProjector {
    pub fn new(tuning: MinimapTuning) -> Self {
        Self { tuning }
    }

    /// Returns `None` when there is nothing to draw.
    pub fn project<'a>(
        &self,
        positions: impl IntoIterator<Item = (&'a str, Vec2)>,
        local_id: &str,
    ) -> Option<MinimapView> {
        let positions: Vec<(&str, Vec2)> = positions
            .into_iter()
            .filter(|(_, p)| p.x.is_finite() && p.y.is_finite())
            .collect();
        if positions.is_empty() {
            return None;
        }

        let (mut min, mut max) = (positions[0].1, positions[0].1);
        for (_, p) in &positions[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        let t = &self.tuning;
        let box_w = (max.x - min.x).max(t.min_extent);
        let box_h = (max.y - min.y).max(t.min_extent);
        let scale_x = t.width / (box_w + t.fit_margin);
        let scale_y = t.height / (box_h + t.fit_margin);
        let scale = scale_x.min(scale_y).min(t.max_scale);

        let center = Vec2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
        let map_center = Vec2::new(t.width / 2.0, t.height / 2.0);
        // An inset wider than half the map collapses the clamp range onto the inset.
        let max_x = (t.width - t.edge_inset).max(t.edge_inset);
        let max_y = (t.height - t.edge_inset).max(t.edge_inset);

        let dots = positions
            .into_iter()
            .map(|(id, p)| {
                let x = (p.x - center.x) * scale + map_center.x;
                let y = (p.y - center.y) * scale + map_center.y;
                MinimapDot {
                    id: id.to_string(),
                    position: Vec2::new(
                        x.clamp(t.edge_inset, max_x),
                        y.clamp(t.edge_inset, max_y),
                    ),
                    is_me: id == local_id,
                }
            })
            .collect();

        Some(MinimapView {
            scale,
            center,
            dots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> MinimapProjector {
        MinimapProjector::new(MinimapTuning::default())
    }

    #[test]
    fn no_entities_renders_nothing() {
        assert_eq!(projector().project(std::iter::empty(), "me"), None);
    }

    #[test]
    fn single_entity_uses_minimum_box_and_sits_at_center() {
        let view = projector()
            .project([("me", Vec2::new(400.0, 300.0))], "me")
            .unwrap();

        // 144 / (600 + 100) is the tighter axis.
        assert!((view.scale - 144.0 / 700.0).abs() < 1e-6);
        assert_eq!(view.center, Vec2::new(400.0, 300.0));
        assert_eq!(view.dots[0].position, Vec2::new(96.0, 72.0));
        assert!(view.dots[0].is_me);
    }

    #[test]
    fn wide_spread_scales_by_width() {
        let view = projector()
            .project(
                [("a", Vec2::new(0.0, 0.0)), ("b", Vec2::new(3000.0, 0.0))],
                "a",
            )
            .unwrap();
        assert!((view.scale - 192.0 / 3100.0).abs() < 1e-6);
        assert!(view.dots.iter().all(|d| d.position.x >= 5.0 && d.position.x <= 187.0));
        assert!(!view.dots[1].is_me);
    }

    #[test]
    fn scale_never_exceeds_cap() {
        let tuning = MinimapTuning {
            width: 10_000.0,
            height: 10_000.0,
            ..MinimapTuning::default()
        };
        let view = MinimapProjector::new(tuning)
            .project([("me", Vec2::new(0.0, 0.0))], "me")
            .unwrap();
        assert_eq!(view.scale, 0.5);
    }

    #[test]
    fn dots_are_clamped_inside_frame() {
        let tuning = MinimapTuning {
            min_extent: 0.0,
            fit_margin: 0.0,
            max_scale: 1.0,
            ..MinimapTuning::default()
        };
        let view = MinimapProjector::new(tuning)
            .project(
                [("a", Vec2::new(0.0, 0.0)), ("b", Vec2::new(10.0, 10_000.0))],
                "a",
            )
            .unwrap();
        for dot in &view.dots {
            assert!((5.0..=187.0).contains(&dot.position.x));
            assert!((5.0..=139.0).contains(&dot.position.y));
        }
    }

    #[test]
    fn tiny_map_with_wide_inset_does_not_panic() {
        let tuning = MinimapTuning {
            width: 8.0,
            height: 8.0,
            ..MinimapTuning::default()
        };
        let view = MinimapProjector::new(tuning)
            .project(
                [("a", Vec2::new(0.0, 0.0)), ("b", Vec2::new(900.0, -900.0))],
                "a",
            )
            .unwrap();
        for dot in &view.dots {
            assert_eq!(dot.position, Vec2::new(5.0, 5.0));
        }
    }
}
