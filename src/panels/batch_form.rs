use egui::{Color32, Ui};

use crate::backend::{BatchOperation, BoxPosition};
use crate::tools::data::color_to_hex;

/// Inputs of the folder-wide operations, kept between frames.
#[derive(Debug, Clone)]
pub struct BatchForm {
    pub width: u32,
    pub height: u32,
    pub color: Color32,
    pub box_tag: bool,
    pub position: BoxPosition,
    pub pattern: String,
    pub find: String,
    pub replace: String,
}

impl Default for BatchForm {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            color: Color32::WHITE,
            box_tag: false,
            position: BoxPosition::default(),
            pattern: String::new(),
            find: String::new(),
            replace: String::new(),
        }
    }
}

impl BatchForm {
    pub fn align_resolution(&self) -> BatchOperation {
        BatchOperation::AlignResolution {
            width: self.width,
            height: self.height,
            color: color_to_hex(self.color),
            box_tag: self.box_tag,
            position: self.position,
        }
    }

    /// Draw the form. Returns the operation whose button was pressed.
    pub fn ui(&mut self, ui: &mut Ui, running: bool) -> Option<BatchOperation> {
        let mut requested = None;
        ui.add_enabled_ui(!running, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Escape ( )").clicked() {
                    requested = Some(BatchOperation::EscapeParentheses);
                }
                if ui.button("Unescape ( )").clicked() {
                    requested = Some(BatchOperation::UnescapeParentheses);
                }
            });
            if ui.button("Deduplicate tags").clicked() {
                requested = Some(BatchOperation::DedupTags);
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.pattern);
                let enabled = !self.pattern.is_empty();
                if ui.add_enabled(enabled, egui::Button::new("Remove")).clicked() {
                    requested = Some(BatchOperation::RemoveMatching {
                        pattern: self.pattern.clone(),
                    });
                }
            });

            egui::Grid::new("find_replace_grid").num_columns(2).show(ui, |ui| {
                ui.label("Find");
                ui.text_edit_singleline(&mut self.find);
                ui.end_row();
                ui.label("Replace");
                ui.text_edit_singleline(&mut self.replace);
                ui.end_row();
            });
            if ui
                .add_enabled(!self.find.is_empty(), egui::Button::new("Replace all"))
                .clicked()
            {
                requested = Some(BatchOperation::FindReplace {
                    find: self.find.clone(),
                    replace: self.replace.clone(),
                });
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.add(egui::DragValue::new(&mut self.width).range(1..=16384).suffix(" w"));
                ui.add(egui::DragValue::new(&mut self.height).range(1..=16384).suffix(" h"));
                ui.color_edit_button_srgba(&mut self.color);
            });
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("box_position")
                    .selected_text(self.position.as_str())
                    .show_ui(ui, |ui| {
                        for position in BoxPosition::ALL {
                            ui.selectable_value(&mut self.position, position, position.as_str());
                        }
                    });
                ui.checkbox(&mut self.box_tag, "Box tag");
            });
            if ui.button("Align resolution").clicked() {
                requested = Some(self.align_resolution());
            }
        });
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_resolution_carries_the_form_values() {
        let form = BatchForm {
            width: 512,
            height: 768,
            color: Color32::from_rgb(0, 0, 0),
            box_tag: true,
            position: BoxPosition::TopLeft,
            ..BatchForm::default()
        };
        assert_eq!(
            form.align_resolution(),
            BatchOperation::AlignResolution {
                width: 512,
                height: 768,
                color: "#000000".into(),
                box_tag: true,
                position: BoxPosition::TopLeft,
            }
        );
    }
}
