use egui::{PointerButton, Pos2};

use super::{PointerInput, ToolEventKind};
use crate::tools::ToolId;

/// Where a canvas input goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Wheel: zoom the view around the pointer
    Zoom,
    /// Start moving the view with the given button
    PanStart(PointerButton),
    /// Continue moving the view
    Pan,
    /// Stop moving the view
    PanEnd,
    /// Hand the event to the active tool's reduce
    Tool,
}

/// An in-progress view drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    pub button: PointerButton,
    pub last_screen_pos: Pos2,
}

/// Decide whether an input pans/zooms the view or is dispatched to the active tool.
///
/// Panning is middle-drag, alt+left-drag, or any left-drag while the view tool is
/// active. Panning input never reaches a tool.
pub fn route_input(input: &PointerInput, active_tool: ToolId, panning: Option<&PanGesture>) -> Route {
    if input.kind == ToolEventKind::Wheel {
        return Route::Zoom;
    }

    if let Some(pan) = panning {
        // other buttons are ignored while dragging the view
        if input.kind == ToolEventKind::PointerUp && input.button == Some(pan.button) {
            return Route::PanEnd;
        }
        return Route::Pan;
    }

    if input.kind == ToolEventKind::PointerDown {
        match input.button {
            Some(PointerButton::Middle) => return Route::PanStart(PointerButton::Middle),
            Some(PointerButton::Primary) if input.modifiers.alt || active_tool == ToolId::View => {
                return Route::PanStart(PointerButton::Primary);
            }
            _ => {}
        }
    }

    Route::Tool
}
