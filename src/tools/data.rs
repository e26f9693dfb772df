//! Commit payloads produced by the tools.
//!
//! These are the only serialized shapes the canvas defines. The dataset backend
//! receives them inside a save request and performs the actual pixel edit.

use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An image-space coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Pos2> for Point {
    fn from(pos: Pos2) -> Self {
        Self { x: pos.x, y: pos.y }
    }
}

impl From<Point> for Pos2 {
    fn from(point: Point) -> Self {
        Pos2::new(point.x, point.y)
    }
}

/// Which guide lines a split draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    #[default]
    Cross,
    Horizontal,
    Vertical,
}

impl SplitMode {
    pub const ALL: [SplitMode; 3] = [SplitMode::Cross, SplitMode::Horizontal, SplitMode::Vertical];

    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMode::Cross => "cross",
            SplitMode::Horizontal => "horizontal",
            SplitMode::Vertical => "vertical",
        }
    }

    pub fn from_variant(variant: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == variant)
    }
}

/// Axis along which two images are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcatMode {
    #[default]
    Horizontal,
    Vertical,
}

impl ConcatMode {
    pub const ALL: [ConcatMode; 2] = [ConcatMode::Horizontal, ConcatMode::Vertical];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConcatMode::Horizontal => "horizontal",
            ConcatMode::Vertical => "vertical",
        }
    }

    pub fn from_variant(variant: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == variant)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushLine {
    pub color: String,
    pub width: u32,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectFill {
    pub color: String,
    pub start: Point,
    pub end: Point,
}

/// A tool's edit description, tagged by tool id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "lowercase")]
pub enum ToolData {
    Brush {
        drawing: Vec<BrushLine>,
    },
    Rect {
        drawing: Vec<RectFill>,
    },
    Split {
        mode: SplitMode,
        point: Point,
    },
    Trim {
        top: u32,
        bottom: u32,
        left: u32,
        right: u32,
    },
    Expand {
        color: String,
        top: u32,
        bottom: u32,
        left: u32,
        right: u32,
    },
    Concat {
        mode: ConcatMode,
        image: PathBuf,
        offset: u32,
        color: String,
    },
}

/// `#rrggbb`, alpha dropped
pub fn color_to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Round a non-negative image-space length to whole pixels.
pub(crate) fn to_pixels(value: f32) -> u32 {
    value.max(0.0).round() as u32
}

/// Whole pixels, rounded down. Sums of floored lengths never exceed the sum of the lengths.
pub(crate) fn floor_pixels(value: f32) -> u32 {
    value.max(0.0).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_is_tagged_by_tool_id() {
        let data = ToolData::Trim {
            top: 1,
            bottom: 2,
            left: 3,
            right: 4,
        };
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"id": "trim", "top": 1, "bottom": 2, "left": 3, "right": 4})
        );
    }

    #[test]
    fn split_mode_serializes_lowercase() {
        let data = ToolData::Split {
            mode: SplitMode::Horizontal,
            point: Point { x: 1.0, y: 2.0 },
        };
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"id": "split", "mode": "horizontal", "point": {"x": 1.0, "y": 2.0}})
        );
    }

    #[test]
    fn hex_colors_are_lowercase_rrggbb() {
        assert_eq!(color_to_hex(Color32::from_rgb(255, 16, 0)), "#ff1000");
    }

    #[test]
    fn variants_parse_by_name() {
        assert_eq!(SplitMode::from_variant("vertical"), Some(SplitMode::Vertical));
        assert_eq!(ConcatMode::from_variant("cross"), None);
        assert_eq!(to_pixels(-3.0), 0);
        assert_eq!(to_pixels(2.6), 3);
        assert_eq!(floor_pixels(2.6), 2);
        assert_eq!(floor_pixels(-0.5), 0);
    }
}
