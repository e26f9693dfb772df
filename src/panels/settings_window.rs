use crate::ImageToolkitApp;
use crate::config::CanvasConfig;

pub fn settings_window(app: &mut ImageToolkitApp, ctx: &egui::Context) {
    let mut open = app.show_settings;
    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            if app.settings.config.ui(ui) {
                log::debug!("Canvas config changed: {:?}", app.settings.config);
            }
            ui.separator();
            if ui.button("Restore defaults").clicked() {
                app.settings.config = CanvasConfig::default();
            }
        });
    app.show_settings = open;
}
