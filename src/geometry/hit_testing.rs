use egui::{CursorIcon, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// One side of a rectangular boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    // Hit-test order when two edges are within tolerance (small images, far zoom out)
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
            Edge::Right => "right",
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Edge::Top | Edge::Bottom)
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        if self.is_horizontal() {
            CursorIcon::ResizeVertical
        } else {
            CursorIcon::ResizeHorizontal
        }
    }
}

/// Per-side distances, in image units, measured inward (trim) or outward (expand)
/// from the image border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl EdgeInsets {
    pub fn get(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn set(&mut self, edge: Edge, value: f32) {
        match edge {
            Edge::Top => self.top = value,
            Edge::Bottom => self.bottom = value,
            Edge::Left => self.left = value,
            Edge::Right => self.right = value,
        }
    }

    pub fn is_zero(&self) -> bool {
        Edge::ALL.iter().all(|edge| self.get(*edge) == 0.0)
    }

    /// The rectangle left over after trimming these insets from an image of `size`.
    pub fn shrink(&self, size: Vec2) -> Rect {
        Rect::from_min_max(
            Pos2::new(self.left, self.top),
            Pos2::new(size.x - self.right, size.y - self.bottom),
        )
    }

    /// The rectangle covered by an image of `size` grown by these insets.
    pub fn grow(&self, size: Vec2) -> Rect {
        Rect::from_min_max(
            Pos2::new(-self.left, -self.top),
            Pos2::new(size.x + self.right, size.y + self.bottom),
        )
    }
}

/// Coordinate of `edge` on `bounds` along the edge's normal axis.
pub fn edge_position(bounds: Rect, edge: Edge) -> f32 {
    match edge {
        Edge::Top => bounds.min.y,
        Edge::Bottom => bounds.max.y,
        Edge::Left => bounds.min.x,
        Edge::Right => bounds.max.x,
    }
}

/// Whether `point` lies within `tolerance` of the edge line, including a
/// `tolerance` overhang past the line's endpoints.
pub fn is_point_near_edge(point: Pos2, bounds: Rect, edge: Edge, tolerance: f32) -> bool {
    let line = edge_position(bounds, edge);
    if edge.is_horizontal() {
        (point.y - line).abs() <= tolerance
            && point.x >= bounds.min.x - tolerance
            && point.x <= bounds.max.x + tolerance
    } else {
        (point.x - line).abs() <= tolerance
            && point.y >= bounds.min.y - tolerance
            && point.y <= bounds.max.y + tolerance
    }
}

/// First edge of `bounds` that `point` is close to, in [`Edge::ALL`] order.
pub fn hit_edge(point: Pos2, bounds: Rect, tolerance: f32) -> Option<Edge> {
    Edge::ALL
        .into_iter()
        .find(|edge| is_point_near_edge(point, bounds, *edge, tolerance))
}
