use egui::{Color32, Pos2, Rect, Shape, Stroke, TextureId, Vec2};

use crate::geometry::ViewTransform;

const HANDLE_RADIUS: f32 = 5.0;
const HANDLE_COLOR: Color32 = Color32::from_rgb(30, 120, 255);

/// Drawing surface handed to a tool's render.
///
/// Tools draw in image space; the painter applies the view transform and the canvas
/// offset. Widths suffixed `_px` are screen pixels and stay constant under zoom,
/// other widths are image units. Shapes are collected and flushed by the canvas.
#[derive(Debug)]
pub struct OverlayPainter {
    transform: ViewTransform,
    origin: Vec2,
    shapes: Vec<Shape>,
}

impl OverlayPainter {
    /// `canvas_origin` is the screen position of the canvas' top-left corner.
    pub fn new(transform: ViewTransform, canvas_origin: Pos2) -> Self {
        Self {
            transform,
            origin: canvas_origin.to_vec2(),
            shapes: Vec::new(),
        }
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn to_screen(&self, image: Pos2) -> Pos2 {
        self.transform.to_view_space(image) + self.origin
    }

    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_two_pos(self.to_screen(rect.min), self.to_screen(rect.max))
    }

    /// Polyline with an image-space width
    pub fn polyline(&mut self, points: &[Pos2], width: f32, color: Color32) {
        let stroke = Stroke::new(width * self.transform.scale, color);
        match points {
            [] => {}
            [single] => {
                // a click without movement still leaves a dot
                self.shapes.push(Shape::circle_filled(self.to_screen(*single), stroke.width / 2.0, color));
            }
            _ => {
                let screen = points.iter().map(|p| self.to_screen(*p)).collect();
                self.shapes.push(Shape::line(screen, stroke));
            }
        }
    }

    pub fn segment_px(&mut self, a: Pos2, b: Pos2, width_px: f32, color: Color32) {
        self.shapes.push(Shape::line_segment(
            [self.to_screen(a), self.to_screen(b)],
            Stroke::new(width_px, color),
        ));
    }

    /// Segment readable over any background: a dark halo under a light core line
    pub fn contrast_segment(&mut self, a: Pos2, b: Pos2) {
        self.segment_px(a, b, 3.0, Color32::from_black_alpha(200));
        self.segment_px(a, b, 1.0, Color32::WHITE);
    }

    pub fn rect_filled(&mut self, rect: Rect, color: Color32) {
        if rect.is_positive() {
            self.shapes.push(Shape::rect_filled(self.rect_to_screen(rect), 0.0, color));
        }
    }

    pub fn rect_stroke_px(&mut self, rect: Rect, width_px: f32, color: Color32) {
        self.shapes.push(Shape::rect_stroke(
            self.rect_to_screen(rect),
            0.0,
            Stroke::new(width_px, color),
        ));
    }

    pub fn image(&mut self, texture: TextureId, rect: Rect) {
        self.shapes.push(Shape::image(
            texture,
            self.rect_to_screen(rect),
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        ));
    }

    /// Round drag handle centred on an image-space point
    pub fn handle(&mut self, center: Pos2) {
        let center = self.to_screen(center);
        self.shapes.push(Shape::circle_filled(center, HANDLE_RADIUS, HANDLE_COLOR));
        self.shapes.push(Shape::circle_stroke(center, HANDLE_RADIUS, Stroke::new(1.0, Color32::WHITE)));
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn into_shapes(self) -> Vec<Shape> {
        self.shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn image_points_are_mapped_to_screen() {
        let painter = OverlayPainter::new(ViewTransform::new(10.0, 20.0, 2.0), pos2(100.0, 50.0));
        assert_eq!(painter.to_screen(pos2(5.0, 5.0)), pos2(120.0, 80.0));
    }

    #[test]
    fn polyline_width_scales_with_zoom() {
        let mut painter = OverlayPainter::new(ViewTransform::new(0.0, 0.0, 3.0), Pos2::ZERO);
        painter.polyline(&[pos2(0.0, 0.0), pos2(1.0, 1.0)], 5.0, Color32::RED);
        match &painter.shapes()[0] {
            Shape::Path(path) => assert_eq!(path.stroke.width, 15.0),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn degenerate_rects_are_skipped() {
        let mut painter = OverlayPainter::new(ViewTransform::IDENTITY, Pos2::ZERO);
        painter.rect_filled(Rect::from_min_max(pos2(5.0, 5.0), pos2(5.0, 10.0)), Color32::RED);
        assert!(painter.shapes().is_empty());
    }
}
