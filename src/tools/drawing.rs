use egui::{Color32, Pos2, Rect, Ui};

/// Shapes drawn by a press-drag-release gesture, plus the one in progress.
///
/// `current` is `Some` exactly while a gesture is active and is moved into `shapes`
/// once, on release.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingState<S> {
    pub shapes: Vec<S>,
    pub color: Color32,
    pub current: Option<S>,
}

impl<S: Clone> DrawingState<S> {
    pub fn new(color: Color32) -> Self {
        Self {
            shapes: Vec::new(),
            color,
            current: None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    pub fn phase(&self) -> &'static str {
        if self.is_drawing() { "drawing" } else { "idle" }
    }

    pub fn begin(&self, shape: S) -> Self {
        Self {
            shapes: self.shapes.clone(),
            color: self.color,
            current: Some(shape),
        }
    }

    /// Modify the shape in progress; `None` when not drawing.
    pub fn update_current(&self, update: impl FnOnce(&mut S)) -> Option<Self> {
        let mut current = self.current.clone()?;
        update(&mut current);
        Some(Self {
            shapes: self.shapes.clone(),
            color: self.color,
            current: Some(current),
        })
    }

    /// Move the shape in progress into the committed list; `None` when not drawing.
    pub fn commit(&self) -> Option<Self> {
        let current = self.current.clone()?;
        let mut shapes = self.shapes.clone();
        shapes.push(current);
        Some(Self {
            shapes,
            color: self.color,
            current: None,
        })
    }

    pub fn with_color(&self, color: Color32) -> Option<Self> {
        (color != self.color).then(|| Self {
            shapes: self.shapes.clone(),
            color,
            current: self.current.clone(),
        })
    }

    /// Committed shapes followed by the one in progress
    pub fn all_shapes(&self) -> impl Iterator<Item = &S> {
        self.shapes.iter().chain(self.current.iter())
    }
}

/// A freehand polyline in image space
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeShape {
    pub points: Vec<Pos2>,
    pub color: Color32,
    pub width: f32,
}

impl StrokeShape {
    pub fn new(start: Pos2, color: Color32, width: f32) -> Self {
        Self {
            points: vec![start],
            color,
            width,
        }
    }
}

/// A rectangle spanned by two corners in image space
#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub start: Pos2,
    pub end: Pos2,
    pub color: Color32,
}

impl RectShape {
    pub fn rect(&self) -> Rect {
        Rect::from_two_pos(self.start, self.end)
    }
}

/// Color row shared by the drawing tools' option panels
pub(crate) fn color_row(ui: &mut Ui, label: &str, color: Color32) -> Option<Color32> {
    let mut edited = color;
    ui.horizontal(|ui| {
        ui.label(label);
        egui::color_picker::color_edit_button_srgba(ui, &mut edited, egui::color_picker::Alpha::Opaque);
    });
    (edited != color).then_some(edited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn commit_moves_current_into_shapes() {
        let state = DrawingState::new(Color32::RED).begin(StrokeShape::new(pos2(1.0, 1.0), Color32::RED, 5.0));
        assert!(state.is_drawing());

        let state = state.commit().unwrap();
        assert!(!state.is_drawing());
        assert_eq!(state.shapes.len(), 1);
        assert!(state.commit().is_none());
    }

    #[test]
    fn update_without_gesture_is_unchanged() {
        let state: DrawingState<StrokeShape> = DrawingState::new(Color32::RED);
        assert!(state.update_current(|s| s.points.push(pos2(0.0, 0.0))).is_none());
    }

    #[test]
    fn same_color_is_no_change() {
        let state: DrawingState<RectShape> = DrawingState::new(Color32::RED);
        assert!(state.with_color(Color32::RED).is_none());
        assert_eq!(state.with_color(Color32::BLUE).unwrap().color, Color32::BLUE);
    }

    #[test]
    fn rect_is_normalized() {
        let shape = RectShape {
            start: pos2(10.0, 10.0),
            end: pos2(0.0, 5.0),
            color: Color32::RED,
        };
        assert_eq!(shape.rect(), Rect::from_min_max(pos2(0.0, 5.0), pos2(10.0, 10.0)));
    }
}
