use egui::{Color32, CursorIcon, PointerButton, Pos2, Rect, Ui};

use super::data::{ToolData, color_to_hex, to_pixels};
use super::drawing::color_row;
use super::{OptionsEnv, OverlayPainter, Tool, ToolContext, ToolId};
use crate::geometry::hit_testing::{Edge, EdgeInsets, hit_edge};
use crate::input::{ToolEvent, ToolEventKind};

const DEFAULT_COLOR: Color32 = Color32::from_rgb(255, 255, 255);
fn original_outline() -> Color32 {
    Color32::from_white_alpha(80)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandState {
    /// Margin added on each side, in image units
    pub insets: EdgeInsets,
    pub color: Color32,
    pub dragging: Option<Edge>,
}

impl Default for ExpandState {
    fn default() -> Self {
        Self {
            insets: EdgeInsets::default(),
            color: DEFAULT_COLOR,
            dragging: None,
        }
    }
}

/// Margin of `edge` when its line is dragged to `point`; never negative.
fn dragged_margin(edge: Edge, point: Pos2, image: Rect) -> f32 {
    let raw = match edge {
        Edge::Top => image.min.y - point.y,
        Edge::Bottom => point.y - image.max.y,
        Edge::Left => image.min.x - point.x,
        Edge::Right => point.x - image.max.x,
    };
    raw.max(0.0)
}

/// Pad the image with solid margins by dragging its borders outward.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandTool;

impl Tool for ExpandTool {
    type State = ExpandState;

    fn id(&self) -> ToolId {
        ToolId::Expand
    }

    fn clip(&self) -> bool {
        false
    }

    fn init(&self, _variant: Option<&str>) -> ExpandState {
        ExpandState::default()
    }

    fn reduce(&self, state: &ExpandState, event: &ToolEvent, ctx: &ToolContext<'_>) -> Option<ExpandState> {
        let image = ctx.image?;
        let bounds = state.insets.grow(image.size());
        let at = event.image_point;
        match event.kind {
            ToolEventKind::PointerDown if event.button() == Some(PointerButton::Primary) => {
                let edge = hit_edge(at, bounds, ctx.edge_tolerance())?;
                ctx.set_cursor(edge.cursor_icon());
                Some(ExpandState {
                    dragging: Some(edge),
                    ..state.clone()
                })
            }
            ToolEventKind::PointerMove => {
                let Some(edge) = state.dragging else {
                    let hovered = hit_edge(at, bounds, ctx.edge_tolerance());
                    ctx.set_cursor(hovered.map_or(CursorIcon::Default, |edge| edge.cursor_icon()));
                    return None;
                };
                ctx.set_cursor(edge.cursor_icon());
                let value = dragged_margin(edge, at, image.rect());
                if value == state.insets.get(edge) {
                    return None;
                }
                let mut insets = state.insets;
                insets.set(edge, value);
                Some(ExpandState {
                    insets,
                    ..state.clone()
                })
            }
            ToolEventKind::PointerUp => state.dragging.map(|_| ExpandState {
                dragging: None,
                ..state.clone()
            }),
            _ => None,
        }
    }

    fn render(&self, state: &ExpandState, ctx: &ToolContext<'_>, painter: &mut OverlayPainter) {
        let Some(image) = ctx.image else {
            return;
        };
        let original = image.rect();
        let grown = state.insets.grow(image.size());

        // margins: full-width bands above and below, side bands beside the image
        painter.rect_filled(Rect::from_min_max(grown.min, Pos2::new(grown.max.x, original.min.y)), state.color);
        painter.rect_filled(Rect::from_min_max(Pos2::new(grown.min.x, original.max.y), grown.max), state.color);
        painter.rect_filled(
            Rect::from_min_max(Pos2::new(grown.min.x, original.min.y), original.left_bottom()),
            state.color,
        );
        painter.rect_filled(
            Rect::from_min_max(original.right_top(), Pos2::new(grown.max.x, original.max.y)),
            state.color,
        );

        painter.rect_stroke_px(original, 1.0, original_outline());
        painter.contrast_segment(grown.left_top(), grown.right_top());
        painter.contrast_segment(grown.left_bottom(), grown.right_bottom());
        painter.contrast_segment(grown.left_top(), grown.left_bottom());
        painter.contrast_segment(grown.right_top(), grown.right_bottom());

        for center in [grown.center_top(), grown.center_bottom(), grown.left_center(), grown.right_center()] {
            painter.handle(center);
        }
    }

    fn get_data(&self, state: &ExpandState) -> Option<ToolData> {
        if state.insets.is_zero() {
            return None;
        }
        Some(ToolData::Expand {
            color: color_to_hex(state.color),
            top: to_pixels(state.insets.top),
            bottom: to_pixels(state.insets.bottom),
            left: to_pixels(state.insets.left),
            right: to_pixels(state.insets.right),
        })
    }

    fn options_ui(&self, state: &ExpandState, ui: &mut Ui, _env: &mut OptionsEnv<'_>) -> Option<ExpandState> {
        let mut updated = state.clone();
        egui::Grid::new("expand_insets").num_columns(2).show(ui, |ui| {
            for edge in Edge::ALL {
                let mut value = updated.insets.get(edge);
                ui.label(edge.as_str());
                ui.add(egui::DragValue::new(&mut value).range(0.0..=f32::INFINITY).speed(1.0).suffix(" px"));
                updated.insets.set(edge, value.round());
                ui.end_row();
            }
        });
        if let Some(color) = color_row(ui, "Fill:", state.color) {
            updated.color = color;
        }
        (updated != *state).then_some(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::Harness;

    #[test]
    fn dragging_outward_grows_the_margin() {
        let harness = Harness::with_image(100.0, 100.0);
        let tool = ExpandTool;
        let mut state = harness.step(&tool, tool.init(None), harness.down(50.0, 1.0));
        assert_eq!(state.dragging, Some(Edge::Top));

        state = harness.step(&tool, state, harness.mv(50.0, -25.0));
        assert_eq!(state.insets.top, 25.0);

        // dragging back into the image stops at zero
        state = harness.step(&tool, state, harness.mv(50.0, 40.0));
        assert_eq!(state.insets.top, 0.0);

        state = harness.step(&tool, state, harness.up(50.0, 40.0));
        assert_eq!(state.dragging, None);
    }

    #[test]
    fn expanded_edge_is_hit_at_its_new_position() {
        let harness = Harness::with_image(100.0, 100.0);
        let tool = ExpandTool;
        let state = ExpandState {
            insets: EdgeInsets {
                right: 40.0,
                ..Default::default()
            },
            ..Default::default()
        };
        // the old border no longer grabs
        assert!(tool.reduce(&state, &harness.down(100.0, 50.0), &harness.ctx()).is_none());

        let state = harness.step(&tool, state, harness.down(139.0, 50.0));
        assert_eq!(state.dragging, Some(Edge::Right));
        let state = harness.step(&tool, state, harness.mv(170.0, 50.0));
        assert_eq!(state.insets.right, 70.0);
    }

    #[test]
    fn margins_render_outside_the_image() {
        let harness = Harness::with_image(100.0, 100.0);
        let tool = ExpandTool;
        assert!(!tool.clip());

        let state = ExpandState {
            insets: EdgeInsets {
                top: 10.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut painter = OverlayPainter::new(harness.transform, Pos2::ZERO);
        tool.render(&state, &harness.ctx(), &mut painter);
        // one margin band, original outline, four boundary lines (halo + core), four handles
        assert_eq!(painter.shapes().len(), 1 + 1 + 8 + 8);
    }

    #[test]
    fn payload_includes_fill_color() {
        let tool = ExpandTool;
        assert!(tool.get_data(&tool.init(None)).is_none());

        let state = ExpandState {
            insets: EdgeInsets {
                left: 12.0,
                ..Default::default()
            },
            color: Color32::from_rgb(0, 128, 255),
            dragging: None,
        };
        assert_eq!(
            tool.get_data(&state),
            Some(ToolData::Expand {
                color: "#0080ff".to_string(),
                top: 0,
                bottom: 0,
                left: 12,
                right: 0,
            })
        );
    }
}
