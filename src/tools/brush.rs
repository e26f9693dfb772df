use egui::{Color32, PointerButton, Ui};

use super::data::{BrushLine, ToolData, color_to_hex, to_pixels};
use super::drawing::{DrawingState, StrokeShape, color_row};
use super::{OptionsEnv, OverlayPainter, Tool, ToolContext, ToolId};
use crate::input::{ToolEvent, ToolEventKind};

pub type BrushState = DrawingState<StrokeShape>;

const DEFAULT_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

/// Freehand annotation: press to start a stroke, drag to extend it, release to keep it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrushTool;

impl Tool for BrushTool {
    type State = BrushState;

    fn id(&self) -> ToolId {
        ToolId::Brush
    }

    fn init(&self, _variant: Option<&str>) -> BrushState {
        DrawingState::new(DEFAULT_COLOR)
    }

    fn reduce(&self, state: &BrushState, event: &ToolEvent, ctx: &ToolContext<'_>) -> Option<BrushState> {
        ctx.image?;
        match event.kind {
            ToolEventKind::PointerDown if event.button() == Some(PointerButton::Primary) && !state.is_drawing() => {
                Some(state.begin(StrokeShape::new(event.image_point, state.color, ctx.config.brush_width)))
            }
            ToolEventKind::PointerMove => state.update_current(|stroke| stroke.points.push(event.image_point)),
            ToolEventKind::PointerUp if event.button() == Some(PointerButton::Primary) => state.commit(),
            _ => None,
        }
    }

    fn render(&self, state: &BrushState, ctx: &ToolContext<'_>, painter: &mut OverlayPainter) {
        if ctx.image.is_none() {
            return;
        }
        for stroke in state.all_shapes() {
            painter.polyline(&stroke.points, stroke.width, stroke.color);
        }
    }

    fn get_data(&self, state: &BrushState) -> Option<ToolData> {
        if state.shapes.is_empty() {
            return None;
        }
        let drawing = state
            .shapes
            .iter()
            .map(|stroke| BrushLine {
                color: color_to_hex(stroke.color),
                width: to_pixels(stroke.width),
                points: stroke.points.iter().map(|p| (*p).into()).collect(),
            })
            .collect();
        Some(ToolData::Brush { drawing })
    }

    fn options_ui(&self, state: &BrushState, ui: &mut Ui, _env: &mut OptionsEnv<'_>) -> Option<BrushState> {
        ui.label(format!("{} stroke(s)", state.shapes.len()));
        color_row(ui, "Color:", state.color).and_then(|color| state.with_color(color))
    }
}
