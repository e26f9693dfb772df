use std::path::Path;

use crate::ImageToolkitApp;
use crate::components::ToolButton;
use crate::tools::{OptionsEnv, ToolId};

pub fn tools_panel(app: &mut ImageToolkitApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.editor.active_tool();
            ui.horizontal_wrapped(|ui| {
                for id in ToolId::ALL {
                    let response = ToolButton::new(id, id == active).show(ui);
                    if response.clicked() {
                        log::info!("Tool selected from UI: {}", id.as_str());
                        app.editor.switch_tool(id, None);
                    }
                    if !id.variants().is_empty() {
                        response.context_menu(|ui| {
                            for variant in id.variants() {
                                let current = id == active && app.editor.variant() == Some(variant.id);
                                if ui.selectable_label(current, variant.name).clicked() {
                                    app.editor.switch_tool(id, Some(variant.id));
                                    ui.close_menu();
                                }
                            }
                        });
                    }
                }
            });

            ui.separator();

            let active = app.editor.active_tool();
            ui.horizontal(|ui| {
                ui.strong(active.name());
                ui.weak(app.editor.tool_state().phase());
            });

            // Clone what the options borrow so the editor stays free for the notifications
            let items = app.editor.items().to_vec();
            let current = app.editor.selected().map(Path::to_path_buf);
            let state = app.editor.tool_state().clone();
            let updated = {
                let mut env = OptionsEnv {
                    items: &items,
                    current: current.as_deref(),
                    config: &app.settings.config,
                    images: &mut app.images,
                    source: app.services.image_source.as_ref(),
                    notifications: app.editor.notifications_mut(),
                    egui_ctx: ctx.clone(),
                };
                state.options_ui(ui, &mut env)
            };
            if let Some(state) = updated {
                app.editor.set_tool_state(state);
            }

            ui.separator();

            let running = app.editor.running();
            let has_selection = current.is_some();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!running && has_selection, egui::Button::new("Apply"))
                    .on_hover_text("Ctrl+S")
                    .clicked()
                {
                    app.editor.apply();
                }
                if ui
                    .add_enabled(!running, egui::Button::new("Reset"))
                    .on_hover_text("Esc")
                    .clicked()
                {
                    app.editor.reset();
                }
                if running {
                    ui.spinner();
                }
            });
            if let Some(kind) = app.editor.running_kind() {
                ui.weak(format!("{kind:?} running"));
            }

            egui::CollapsingHeader::new("Payload")
                .default_open(false)
                .show(ui, |ui| match app.editor.save_request() {
                    Some(request) => match serde_json::to_string_pretty(&request) {
                        Ok(json) => {
                            ui.monospace(json);
                        }
                        Err(err) => {
                            ui.colored_label(egui::Color32::RED, err.to_string());
                        }
                    },
                    None => {
                        ui.weak("Nothing selected");
                    }
                });

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                if ui.button("⚙ Settings").clicked() {
                    app.show_settings = !app.show_settings;
                }
            });
        });
}
