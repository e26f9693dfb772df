use egui::{Color32, CursorIcon, PointerButton, Pos2, Ui, Vec2};

use super::data::{ToolData, floor_pixels};
use super::{OptionsEnv, OverlayPainter, Tool, ToolContext, ToolId};
use crate::geometry::hit_testing::{Edge, EdgeInsets, hit_edge};
use crate::input::{ToolEvent, ToolEventKind};

const SHADE: Color32 = Color32::from_black_alpha(140);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrimState {
    /// Amount cut from each side, in image units
    pub insets: EdgeInsets,
    pub dragging: Option<Edge>,
}

/// Largest inset `edge` may take while leaving `min_gap` between it and the opposite edge.
pub fn max_inset(edge: Edge, insets: &EdgeInsets, size: Vec2, min_gap: f32) -> f32 {
    let (extent, opposite) = match edge {
        Edge::Top => (size.y, insets.bottom),
        Edge::Bottom => (size.y, insets.top),
        Edge::Left => (size.x, insets.right),
        Edge::Right => (size.x, insets.left),
    };
    (extent - opposite - min_gap).max(0.0)
}

/// Inset of `edge` when its line is dragged to `point`.
fn dragged_inset(edge: Edge, point: Pos2, insets: &EdgeInsets, size: Vec2, min_gap: f32) -> f32 {
    let raw = match edge {
        Edge::Top => point.y,
        Edge::Bottom => size.y - point.y,
        Edge::Left => point.x,
        Edge::Right => size.x - point.x,
    };
    raw.clamp(0.0, max_inset(edge, insets, size, min_gap))
}

/// Crop by dragging the four borders inward.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimTool;

impl Tool for TrimTool {
    type State = TrimState;

    fn id(&self) -> ToolId {
        ToolId::Trim
    }

    fn init(&self, _variant: Option<&str>) -> TrimState {
        TrimState::default()
    }

    fn reduce(&self, state: &TrimState, event: &ToolEvent, ctx: &ToolContext<'_>) -> Option<TrimState> {
        let image = ctx.image?;
        let size = image.size();
        let at = event.image_point;
        match event.kind {
            ToolEventKind::PointerDown if event.button() == Some(PointerButton::Primary) => {
                let edge = hit_edge(at, state.insets.shrink(size), ctx.edge_tolerance())?;
                ctx.set_cursor(edge.cursor_icon());
                Some(TrimState {
                    dragging: Some(edge),
                    ..state.clone()
                })
            }
            ToolEventKind::PointerMove => {
                let Some(edge) = state.dragging else {
                    let hovered = hit_edge(at, state.insets.shrink(size), ctx.edge_tolerance());
                    ctx.set_cursor(hovered.map_or(CursorIcon::Default, |edge| edge.cursor_icon()));
                    return None;
                };
                ctx.set_cursor(edge.cursor_icon());
                let value = dragged_inset(edge, at, &state.insets, size, ctx.config.min_trim_gap);
                if value == state.insets.get(edge) {
                    return None;
                }
                let mut insets = state.insets;
                insets.set(edge, value);
                Some(TrimState {
                    insets,
                    dragging: Some(edge),
                })
            }
            ToolEventKind::PointerUp => state.dragging.map(|_| TrimState {
                dragging: None,
                ..state.clone()
            }),
            _ => None,
        }
    }

    fn render(&self, state: &TrimState, ctx: &ToolContext<'_>, painter: &mut OverlayPainter) {
        let Some(image) = ctx.image else {
            return;
        };
        let full = image.rect();
        let kept = state.insets.shrink(image.size());

        // shade what will be cut
        painter.rect_filled(egui::Rect::from_min_max(full.min, Pos2::new(full.max.x, kept.min.y)), SHADE);
        painter.rect_filled(egui::Rect::from_min_max(Pos2::new(full.min.x, kept.max.y), full.max), SHADE);
        painter.rect_filled(
            egui::Rect::from_min_max(Pos2::new(full.min.x, kept.min.y), Pos2::new(kept.min.x, kept.max.y)),
            SHADE,
        );
        painter.rect_filled(
            egui::Rect::from_min_max(Pos2::new(kept.max.x, kept.min.y), Pos2::new(full.max.x, kept.max.y)),
            SHADE,
        );

        painter.contrast_segment(kept.left_top(), kept.right_top());
        painter.contrast_segment(kept.left_bottom(), kept.right_bottom());
        painter.contrast_segment(kept.left_top(), kept.left_bottom());
        painter.contrast_segment(kept.right_top(), kept.right_bottom());

        for center in [kept.center_top(), kept.center_bottom(), kept.left_center(), kept.right_center()] {
            painter.handle(center);
        }
    }

    fn get_data(&self, state: &TrimState) -> Option<ToolData> {
        if state.insets.is_zero() {
            return None;
        }
        Some(ToolData::Trim {
            top: floor_pixels(state.insets.top),
            bottom: floor_pixels(state.insets.bottom),
            left: floor_pixels(state.insets.left),
            right: floor_pixels(state.insets.right),
        })
    }

    fn options_ui(&self, state: &TrimState, ui: &mut Ui, env: &mut OptionsEnv<'_>) -> Option<TrimState> {
        let size = env
            .current
            .and_then(|path| env.images.get(path))
            .map(|image| image.size());
        let min_gap = env.config.min_trim_gap;
        let mut insets = state.insets;
        egui::Grid::new("trim_insets").num_columns(2).show(ui, |ui| {
            for edge in Edge::ALL {
                let max = size.map_or(f32::INFINITY, |size| max_inset(edge, &state.insets, size, min_gap));
                let mut value = insets.get(edge);
                ui.label(edge.as_str());
                ui.add(egui::DragValue::new(&mut value).range(0.0..=max).speed(1.0).suffix(" px"));
                insets.set(edge, value.round());
                ui.end_row();
            }
        });
        if let Some(size) = size {
            let kept = insets.shrink(size);
            ui.label(format!("Result: {:.0} × {:.0}", kept.width().max(0.0), kept.height().max(0.0)));
        }
        (insets != state.insets).then(|| TrimState {
            insets,
            dragging: state.dragging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ViewTransform;
    use crate::tools::test_support::Harness;

    #[test]
    fn press_near_an_edge_starts_dragging_it() {
        let harness = Harness::with_image(100.0, 100.0);
        let tool = TrimTool;
        let state = harness.step(&tool, tool.init(None), harness.down(50.0, 3.0));
        assert_eq!(state.dragging, Some(Edge::Top));
        assert_eq!(harness.cursor.get(), CursorIcon::ResizeVertical);

        assert!(tool.reduce(&tool.init(None), &harness.down(50.0, 50.0), &harness.ctx()).is_none());
    }

    #[test]
    fn top_edge_is_clamped_against_bottom_and_zero() {
        let harness = Harness::with_image(100.0, 100.0);
        let tool = TrimTool;
        let mut state = TrimState {
            insets: EdgeInsets {
                bottom: 30.0,
                ..Default::default()
            },
            dragging: None,
        };
        state = harness.step(&tool, state, harness.down(50.0, 0.0));
        for y in [40.0, 95.0, 500.0, -20.0, 70.0] {
            state = harness.step(&tool, state, harness.mv(50.0, y));
            assert!(state.insets.top >= 0.0);
            assert!(state.insets.top <= 100.0 - 30.0 - 10.0, "top {} after y {y}", state.insets.top);
        }
        assert_eq!(state.insets.top, 60.0);

        state = harness.step(&tool, state, harness.up(50.0, 70.0));
        assert_eq!(state.dragging, None);
    }

    #[test]
    fn bottom_and_right_are_measured_from_the_far_side() {
        let harness = Harness::with_image(200.0, 100.0);
        let tool = TrimTool;
        let mut state = harness.step(&tool, tool.init(None), harness.down(198.0, 50.0));
        assert_eq!(state.dragging, Some(Edge::Right));
        state = harness.step(&tool, state, harness.mv(150.0, 50.0));
        assert_eq!(state.insets.right, 50.0);

        state = harness.step(&tool, state, harness.up(150.0, 50.0));
        state = harness.step(&tool, state, harness.down(20.0, 99.0));
        assert_eq!(state.dragging, Some(Edge::Bottom));
        state = harness.step(&tool, state, harness.mv(20.0, 75.0));
        assert_eq!(state.insets.bottom, 25.0);
    }

    #[test]
    fn hit_tolerance_is_constant_on_screen() {
        let mut harness = Harness::with_image(100.0, 100.0);
        let tool = TrimTool;
        // 8 image units away: inside 10px at scale 1, outside at scale 2
        assert!(tool.reduce(&tool.init(None), &harness.down(50.0, 8.0), &harness.ctx()).is_some());
        harness.transform = ViewTransform::new(0.0, 0.0, 2.0);
        assert!(tool.reduce(&tool.init(None), &harness.down(50.0, 8.0), &harness.ctx()).is_none());
    }

    #[test]
    fn hover_updates_cursor_without_changing_state() {
        let harness = Harness::with_image(100.0, 100.0);
        let tool = TrimTool;
        let state = tool.init(None);
        assert!(tool.reduce(&state, &harness.mv(2.0, 50.0), &harness.ctx()).is_none());
        assert_eq!(harness.cursor.get(), CursorIcon::ResizeHorizontal);
        assert!(tool.reduce(&state, &harness.mv(50.0, 50.0), &harness.ctx()).is_none());
        assert_eq!(harness.cursor.get(), CursorIcon::Default);
    }

    #[test]
    fn payload_floors_to_whole_pixels() {
        let tool = TrimTool;
        let state = TrimState {
            insets: EdgeInsets {
                top: 10.4,
                left: 2.6,
                ..Default::default()
            },
            dragging: None,
        };
        assert_eq!(
            tool.get_data(&state),
            Some(ToolData::Trim {
                top: 10,
                bottom: 0,
                left: 2,
                right: 0
            })
        );
    }

    #[test]
    fn payload_keeps_the_minimum_gap_after_rounding() {
        let harness = Harness::with_image(100.0, 100.0);
        let tool = TrimTool;
        let state = TrimState {
            insets: EdgeInsets {
                bottom: 30.5,
                ..Default::default()
            },
            dragging: Some(Edge::Top),
        };
        let state = harness.step(&tool, state, harness.mv(50.0, 59.5));
        assert_eq!(state.insets.top, 59.5);

        let Some(ToolData::Trim { top, bottom, .. }) = tool.get_data(&state) else {
            panic!("expected trim payload");
        };
        assert!(top + bottom <= 90, "{top} + {bottom}");
    }
}
