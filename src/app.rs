use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::DatasetBackend;
use crate::canvas::CanvasSurface;
use crate::config::CanvasConfig;
use crate::editor::{Editor, Invalidation};
use crate::image_cache::ImageCache;
use crate::panels::{BatchForm, caption_panel, central_panel, items_panel, settings_window, tools_panel};
use crate::services::Services;
use crate::tools::ToolId;

const MAX_CACHED_IMAGES: usize = 16;

/// What survives a restart.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Settings {
    pub config: CanvasConfig,
    pub last_tool: Option<ToolId>,
    pub last_folder: Option<PathBuf>,
}

pub struct ImageToolkitApp {
    pub(crate) settings: Settings,
    pub(crate) editor: Editor,
    pub(crate) canvas: CanvasSurface,
    pub(crate) images: ImageCache,
    pub(crate) services: Services,
    /// Selected image that failed to load; not retried until invalidated
    pub(crate) failed_image: Option<PathBuf>,
    pub(crate) show_settings: bool,
    pub(crate) folder_input: String,
    pub(crate) batch: BatchForm,
}

impl ImageToolkitApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, backend: Arc<dyn DatasetBackend>) -> Self {
        let mut settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        settings.config = settings.config.sanitized();
        Self::with_services(backend, Services::default(), settings)
    }

    pub fn with_services(backend: Arc<dyn DatasetBackend>, services: Services, settings: Settings) -> Self {
        let mut editor = Editor::new(backend);
        editor.attach_drops(&services.drops);
        if let Some(tool) = settings.last_tool {
            editor.switch_tool(tool, None);
        }
        let folder_input = settings
            .last_folder
            .as_deref()
            .map(|folder| folder.display().to_string())
            .unwrap_or_default();

        Self {
            settings,
            editor,
            canvas: CanvasSurface::new(),
            images: ImageCache::new(MAX_CACHED_IMAGES),
            services,
            failed_image: None,
            show_settings: false,
            folder_input,
            batch: BatchForm::default(),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn canvas(&self) -> &CanvasSurface {
        &self.canvas
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn apply_invalidations(&mut self) {
        for invalidation in self.editor.take_invalidated() {
            match invalidation {
                Invalidation::Image(path) => {
                    log::debug!("Reloading {}", path.display());
                    self.images.invalidate(&path);
                    if self.canvas.image().is_some_and(|image| image.path() == path) {
                        self.canvas.set_image(None);
                    }
                    if self.failed_image.as_deref() == Some(path.as_path()) {
                        self.failed_image = None;
                    }
                }
                Invalidation::All => {
                    self.images.clear();
                    self.canvas.set_image(None);
                    self.failed_image = None;
                }
            }
        }
    }

    /// Show the selected item on the canvas, loading it on first use.
    fn sync_canvas_image(&mut self, ctx: &egui::Context) {
        let Some(path) = self.editor.selected().map(Path::to_path_buf) else {
            self.canvas.set_image(None);
            return;
        };
        let shown = self.canvas.image().is_some_and(|image| image.path() == path);
        if shown || self.failed_image.as_ref() == Some(&path) {
            return;
        }

        match self.images.get_or_load(&path, self.services.image_source.as_ref(), ctx) {
            Ok(image) => {
                self.failed_image = None;
                self.canvas.set_image(Some(image));
            }
            Err(err) => {
                log::error!("Failed to load {}: {err}", path.display());
                self.editor.notifications_mut().error(err.to_string());
                self.canvas.set_image(None);
                self.failed_image = Some(path);
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let save = ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::S));
        if save && !self.editor.running() {
            self.editor.apply();
        }
        if ctx.wants_keyboard_input() {
            return;
        }
        let escape = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape));
        if escape {
            self.editor.reset();
        }
    }
}

impl eframe::App for ImageToolkitApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.last_tool = Some(self.editor.active_tool());
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.images.begin_frame();
        self.services.drops.poll(ctx);
        self.editor.poll();
        self.apply_invalidations();
        self.sync_canvas_image(ctx);
        self.handle_shortcuts(ctx);

        // Side panels first so the canvas gets the remaining space
        tools_panel(self, ctx);
        items_panel(self, ctx);
        caption_panel(self, ctx);
        central_panel(self, ctx);
        settings_window(self, ctx);

        self.editor.notifications_mut().show(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    #[test]
    fn settings_restore_missing_fields_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"last_tool":"trim"}"#).unwrap();
        assert_eq!(settings.last_tool, Some(ToolId::Trim));
        assert_eq!(settings.config, CanvasConfig::default());
    }

    #[test]
    fn last_tool_is_restored_on_startup() {
        let settings = Settings {
            last_tool: Some(ToolId::Split),
            last_folder: Some(PathBuf::from("/data/set")),
            ..Settings::default()
        };
        let backend = Arc::new(MemoryBackend::default());
        let app = ImageToolkitApp::with_services(backend, Services::default(), settings);
        assert_eq!(app.editor().active_tool(), ToolId::Split);
        assert_eq!(app.folder_input, "/data/set");
    }
}
