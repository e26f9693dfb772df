use egui::{Align2, Color32, FontId, Response, Sense, Stroke, Ui};

use crate::tools::ToolId;

const SELECTED_FILL: Color32 = Color32::from_rgb(100, 181, 246);
const SELECTED_BORDER: Color32 = Color32::from_rgb(33, 150, 243);

/// Square palette button showing a tool's icon, with the tool name as tooltip.
pub struct ToolButton {
    pub tool: ToolId,
    pub selected: bool,
}

impl ToolButton {
    pub fn new(tool: ToolId, selected: bool) -> Self {
        Self { tool, selected }
    }

    pub fn show(&self, ui: &mut Ui) -> Response {
        let button_size = egui::vec2(32.0, 32.0);
        let (rect, response) = ui.allocate_exact_size(button_size, Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if self.selected {
                SELECTED_FILL
            } else if response.hovered() {
                Color32::from_gray(60)
            } else {
                Color32::from_gray(40)
            };
            ui.painter().rect_filled(rect, 4.0, bg_color);

            let text_color = if self.selected {
                Color32::BLACK
            } else {
                Color32::WHITE
            };
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.tool.icon(),
                FontId::proportional(20.0),
                text_color,
            );

            if self.selected {
                ui.painter().rect_stroke(rect, 4.0, Stroke::new(2.0, SELECTED_BORDER));
            }
        }

        let response = response.on_hover_text(self.tool.name());
        if self.tool.variants().is_empty() {
            response
        } else {
            response.on_hover_text("Right-click for modes")
        }
    }
}
