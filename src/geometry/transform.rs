use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::CanvasConfig;

/// Affine map from image space to view space: `view = image * scale + (x, y)`.
///
/// View space is local to the canvas widget, with its origin at the canvas' top-left
/// corner. The surface owns the one live instance; tools only ever read copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    pub fn new(x: f32, y: f32, scale: f32) -> Self {
        Self { x, y, scale }
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// `(view - translation) / scale`
    pub fn to_image_space(&self, view: Pos2) -> Pos2 {
        ((view.to_vec2() - self.translation()) / self.scale).to_pos2()
    }

    /// `image * scale + translation`
    pub fn to_view_space(&self, image: Pos2) -> Pos2 {
        (image.to_vec2() * self.scale + self.translation()).to_pos2()
    }

    pub fn rect_to_view_space(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.to_view_space(rect.min), self.to_view_space(rect.max))
    }

    /// Convert a length measured in view pixels into image units.
    pub fn view_len_to_image(&self, len: f32) -> f32 {
        len / self.scale
    }

    pub fn panned(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            scale: self.scale,
        }
    }

    /// Zoom by a wheel delta, keeping the image point under `anchor` fixed.
    ///
    /// `anchor` is in view space. Positive deltas zoom in.
    pub fn zoomed_at(&self, anchor: Pos2, wheel_delta: f32, config: &CanvasConfig) -> Self {
        let new_scale = config.clamp_scale(self.scale * (1.0 + wheel_delta * config.zoom_intensity));
        let ratio = new_scale / self.scale;
        Self {
            x: anchor.x - (anchor.x - self.x) * ratio,
            y: anchor.y - (anchor.y - self.y) * ratio,
            scale: new_scale,
        }
    }

    /// Fit `image_size` into a view of `view_size`, centred.
    pub fn fit(image_size: Vec2, view_size: Vec2, config: &CanvasConfig) -> Self {
        if image_size.x <= 0.0 || image_size.y <= 0.0 || view_size.x <= 0.0 || view_size.y <= 0.0 {
            return Self::IDENTITY;
        }
        let scale = config.clamp_scale(
            (view_size.x / image_size.x).min(view_size.y / image_size.y) * config.fit_factor,
        );
        Self {
            x: (view_size.x - image_size.x * scale) / 2.0,
            y: (view_size.y - image_size.y * scale) / 2.0,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn assert_close(a: Pos2, b: Pos2) {
        assert!((a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3, "{a:?} != {b:?}");
    }

    #[test]
    fn image_and_view_space_are_inverse() {
        let t = ViewTransform::new(12.0, -7.5, 2.5);
        let p = pos2(33.0, 48.0);
        assert_close(t.to_image_space(t.to_view_space(p)), p);
        assert_close(t.to_view_space(pos2(0.0, 0.0)), pos2(12.0, -7.5));
    }

    #[test]
    fn zoom_keeps_the_cursor_anchored() {
        let config = CanvasConfig::default();
        let cases = [
            (ViewTransform::new(0.0, 0.0, 1.0), pos2(100.0, 80.0), 120.0),
            (ViewTransform::new(-40.0, 25.0, 3.0), pos2(7.0, 300.0), -250.0),
            (ViewTransform::new(10.0, 10.0, 0.5), pos2(512.0, 1.0), 900.0),
        ];
        for (before, mouse, delta) in cases {
            let after = before.zoomed_at(mouse, delta, &config);
            assert_close(before.to_image_space(mouse), after.to_image_space(mouse));
        }
    }

    #[test]
    fn zoom_is_clamped_and_still_anchored() {
        let config = CanvasConfig::default();
        let before = ViewTransform::new(5.0, 5.0, 49.0);
        let mouse = pos2(60.0, 90.0);
        let after = before.zoomed_at(mouse, 10_000.0, &config);
        assert_eq!(after.scale, config.max_scale);
        assert_close(before.to_image_space(mouse), after.to_image_space(mouse));

        let tiny = ViewTransform::new(0.0, 0.0, 0.11).zoomed_at(mouse, -900.0, &config);
        assert_eq!(tiny.scale, config.min_scale);
    }

    #[test]
    fn fit_centres_the_image() {
        let config = CanvasConfig::default();
        let t = ViewTransform::fit(vec2(200.0, 100.0), vec2(400.0, 400.0), &config);
        assert!((t.scale - 1.8).abs() < 1e-5);
        assert!((t.x - 20.0).abs() < 1e-3);
        assert!((t.y - 110.0).abs() < 1e-3);
    }

    #[test]
    fn fit_of_empty_image_is_identity() {
        let config = CanvasConfig::default();
        assert_eq!(
            ViewTransform::fit(vec2(0.0, 10.0), vec2(100.0, 100.0), &config),
            ViewTransform::IDENTITY
        );
    }
}
