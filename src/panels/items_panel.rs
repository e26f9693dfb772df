use std::path::{Path, PathBuf};

use crate::ImageToolkitApp;

pub fn items_panel(app: &mut ImageToolkitApp, ctx: &egui::Context) {
    egui::SidePanel::right("items_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading("Dataset");

            let running = app.editor.running();
            ui.add(
                egui::TextEdit::singleline(&mut app.folder_input)
                    .hint_text("folder path")
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui| {
                if ui.add_enabled(!running, egui::Button::new("📂 Open…")).clicked() {
                    let mut dialog = rfd::FileDialog::new();
                    if let Some(last) = app.settings.last_folder.as_deref().filter(|last| last.is_dir()) {
                        dialog = dialog.set_directory(last);
                    }
                    if let Some(folder) = dialog.pick_folder() {
                        app.folder_input = folder.display().to_string();
                        open_folder(app, folder);
                    }
                }
                let folder = app.folder_input.trim().to_string();
                if ui
                    .add_enabled(!running && !folder.is_empty(), egui::Button::new("Open path"))
                    .on_hover_text("Open the folder typed above")
                    .clicked()
                {
                    open_folder(app, PathBuf::from(folder));
                }
                let is_open = app.editor.dataset().folder.is_some();
                if ui.add_enabled(!running && is_open, egui::Button::new("Close")).clicked() {
                    app.editor.close_folder();
                }
                if ui.add_enabled(!running, egui::Button::new("Refresh")).clicked() {
                    app.editor.refresh();
                }
            });
            if let Some(folder) = &app.editor.dataset().folder {
                ui.weak(folder.display().to_string());
            }

            ui.separator();

            let selected = app.editor.selected().map(Path::to_path_buf);
            ui.horizontal(|ui| {
                ui.label(format!("{} images", app.editor.items().len()));
                if ui
                    .add_enabled(!running && selected.is_some(), egui::Button::new("🗑 Delete"))
                    .clicked()
                {
                    app.editor.delete_selected();
                }
            });

            let mut clicked = None;
            egui::ScrollArea::vertical()
                .max_height(ui.available_height() * 0.5)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for item in app.editor.items() {
                        let name = item
                            .image
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_else(|| item.image.display().to_string());
                        let is_selected = selected.as_deref() == Some(item.image.as_path());
                        let mut response = ui.selectable_label(is_selected, name);
                        if !item.caption_str.is_empty() {
                            response = response.on_hover_text(&item.caption_str);
                        }
                        if response.clicked() {
                            clicked = Some(item.image.clone());
                        }
                    }
                });
            if let Some(image) = clicked {
                app.editor.select(Some(image));
            }

            ui.separator();

            egui::CollapsingHeader::new("Batch operations")
                .default_open(false)
                .show(ui, |ui| {
                    if let Some(operation) = app.batch.ui(ui, running) {
                        log::info!("Batch requested: {}", operation.name());
                        app.editor.run_batch(operation);
                    }
                });
        });
}

fn open_folder(app: &mut ImageToolkitApp, folder: PathBuf) {
    app.settings.last_folder = Some(folder.clone());
    app.editor.open_folder(folder);
}
