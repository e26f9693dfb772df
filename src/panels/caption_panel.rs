use crate::ImageToolkitApp;

pub fn caption_panel(app: &mut ImageToolkitApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("caption_panel")
        .resizable(true)
        .default_height(110.0)
        .show(ctx, |ui| {
            let has_selection = app.editor.selected().is_some();
            ui.add_enabled_ui(has_selection, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Prefix");
                    ui.add(
                        egui::TextEdit::singleline(app.editor.caption_prefix_mut())
                            .hint_text("tags shared by every caption")
                            .desired_width(f32::INFINITY),
                    );
                });
                ui.label("Caption");
                ui.add(
                    egui::TextEdit::multiline(app.editor.caption_mut())
                        .desired_rows(3)
                        .desired_width(f32::INFINITY),
                );
            });
        });
}
