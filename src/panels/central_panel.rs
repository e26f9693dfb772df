use crate::ImageToolkitApp;

pub fn central_panel(app: &mut ImageToolkitApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let canvas_rect = ui.available_rect_before_wrap();

            if let Some(state) = app.canvas.show(ui, app.editor.tool_state(), &app.settings.config) {
                app.editor.set_tool_state(state);
            }

            let hint = if app.editor.items().is_empty() {
                Some("Open a folder or drop images here")
            } else if app.canvas.image().is_none() && app.failed_image.is_some() {
                Some("Image could not be loaded")
            } else {
                None
            };
            if let Some(hint) = hint {
                ui.painter().text(
                    canvas_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    hint,
                    egui::FontId::proportional(16.0),
                    egui::Color32::GRAY,
                );
            }
        });
}
