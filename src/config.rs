use serde::{Deserialize, Serialize};

/// Tunables for the canvas interaction.
///
/// These used to be literals scattered through the tools; they are grouped here so
/// the feel of zooming and edge dragging can be adjusted without touching tool code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Lower bound for the view scale
    pub min_scale: f32,
    /// Upper bound for the view scale
    pub max_scale: f32,
    /// Scale change per wheel unit
    pub zoom_intensity: f32,
    /// Fraction of the canvas an image fills after auto-fit
    pub fit_factor: f32,
    /// Edge grab distance in screen pixels, independent of zoom
    pub edge_tolerance_px: f32,
    /// Minimum image-space extent that trimming has to leave
    pub min_trim_gap: f32,
    /// Brush stroke width in image pixels
    pub brush_width: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 50.0,
            zoom_intensity: 0.001,
            fit_factor: 0.9,
            edge_tolerance_px: 10.0,
            min_trim_gap: 10.0,
            brush_width: 5.0,
        }
    }
}

impl CanvasConfig {
    /// Clamp a scale into the configured zoom range.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.max(self.min_scale).min(self.max_scale)
    }

    /// Repair values restored from storage: anything non-finite or non-positive
    /// falls back to its default, and an inverted zoom range is swapped.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32, default: f32| {
            if value.is_finite() && value > 0.0 { value } else { default }
        };
        let mut min_scale = positive(self.min_scale, defaults.min_scale);
        let mut max_scale = positive(self.max_scale, defaults.max_scale);
        if min_scale > max_scale {
            log::warn!("Zoom range {min_scale}..{max_scale} is inverted, swapping");
            std::mem::swap(&mut min_scale, &mut max_scale);
        }
        Self {
            min_scale,
            max_scale,
            zoom_intensity: positive(self.zoom_intensity, defaults.zoom_intensity),
            fit_factor: positive(self.fit_factor, defaults.fit_factor).min(1.0),
            edge_tolerance_px: positive(self.edge_tolerance_px, defaults.edge_tolerance_px),
            min_trim_gap: positive(self.min_trim_gap, defaults.min_trim_gap),
            brush_width: positive(self.brush_width, defaults.brush_width),
        }
    }

    /// Settings window body. Returns true when a value changed.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        egui::Grid::new("canvas_config_grid")
            .num_columns(2)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.label("Min zoom");
                changed |= ui
                    .add(egui::DragValue::new(&mut self.min_scale).speed(0.01).range(0.01..=1.0))
                    .changed();
                ui.end_row();

                ui.label("Max zoom");
                changed |= ui
                    .add(egui::DragValue::new(&mut self.max_scale).speed(0.5).range(1.0..=200.0))
                    .changed();
                ui.end_row();

                ui.label("Zoom speed");
                changed |= ui
                    .add(egui::DragValue::new(&mut self.zoom_intensity).speed(0.0001).range(0.0001..=0.01))
                    .changed();
                ui.end_row();

                ui.label("Fit factor");
                changed |= ui
                    .add(egui::Slider::new(&mut self.fit_factor, 0.1..=1.0))
                    .changed();
                ui.end_row();

                ui.label("Edge tolerance (px)");
                changed |= ui
                    .add(egui::Slider::new(&mut self.edge_tolerance_px, 2.0..=40.0))
                    .changed();
                ui.end_row();

                ui.label("Minimum trim gap");
                changed |= ui
                    .add(egui::DragValue::new(&mut self.min_trim_gap).range(1.0..=500.0))
                    .changed();
                ui.end_row();

                ui.label("Brush width");
                changed |= ui
                    .add(egui::Slider::new(&mut self.brush_width, 1.0..=50.0))
                    .changed();
                ui.end_row();
            });

        if ui.button("Reset to defaults").clicked() {
            *self = Self::default();
            changed = true;
        }
        changed
    }
}
