use egui::{Color32, PointerButton, Ui};

use super::data::{RectFill, ToolData, color_to_hex};
use super::drawing::{DrawingState, RectShape, color_row};
use super::{OptionsEnv, OverlayPainter, Tool, ToolContext, ToolId};
use crate::input::{ToolEvent, ToolEventKind};

pub type RectState = DrawingState<RectShape>;

const DEFAULT_COLOR: Color32 = Color32::from_rgb(0, 0, 0);

/// Filled rectangles, e.g. to black out a watermark.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectTool;

impl Tool for RectTool {
    type State = RectState;

    fn id(&self) -> ToolId {
        ToolId::Rect
    }

    fn init(&self, _variant: Option<&str>) -> RectState {
        DrawingState::new(DEFAULT_COLOR)
    }

    fn reduce(&self, state: &RectState, event: &ToolEvent, ctx: &ToolContext<'_>) -> Option<RectState> {
        ctx.image?;
        match event.kind {
            ToolEventKind::PointerDown if event.button() == Some(PointerButton::Primary) && !state.is_drawing() => {
                Some(state.begin(RectShape {
                    start: event.image_point,
                    end: event.image_point,
                    color: state.color,
                }))
            }
            ToolEventKind::PointerMove => state.update_current(|shape| shape.end = event.image_point),
            ToolEventKind::PointerUp if event.button() == Some(PointerButton::Primary) => state.commit(),
            _ => None,
        }
    }

    fn render(&self, state: &RectState, ctx: &ToolContext<'_>, painter: &mut OverlayPainter) {
        if ctx.image.is_none() {
            return;
        }
        for shape in &state.shapes {
            painter.rect_filled(shape.rect(), shape.color);
        }
        if let Some(shape) = &state.current {
            painter.rect_filled(shape.rect(), shape.color.gamma_multiply(0.5));
            painter.rect_stroke_px(shape.rect(), 1.0, shape.color);
        }
    }

    fn get_data(&self, state: &RectState) -> Option<ToolData> {
        if state.shapes.is_empty() {
            return None;
        }
        let drawing = state
            .shapes
            .iter()
            .map(|shape| RectFill {
                color: color_to_hex(shape.color),
                start: shape.start.into(),
                end: shape.end.into(),
            })
            .collect();
        Some(ToolData::Rect { drawing })
    }

    fn options_ui(&self, state: &RectState, ui: &mut Ui, _env: &mut OptionsEnv<'_>) -> Option<RectState> {
        ui.label(format!("{} rectangle(s)", state.shapes.len()));
        color_row(ui, "Fill:", state.color).and_then(|color| state.with_color(color))
    }
}
