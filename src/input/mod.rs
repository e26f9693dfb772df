use egui::{Context, Modifiers, PointerButton, Pos2, Vec2};

use crate::geometry::ViewTransform;

mod router;
pub use router::{PanGesture, Route, route_input};

/// The kind of a normalized input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolEventKind {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerLeave,
    Wheel,
}

impl ToolEventKind {
    pub const ALL: [ToolEventKind; 5] = [
        ToolEventKind::PointerDown,
        ToolEventKind::PointerMove,
        ToolEventKind::PointerUp,
        ToolEventKind::PointerLeave,
        ToolEventKind::Wheel,
    ];
}

/// A raw pointer or wheel event as read from egui, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub kind: ToolEventKind,
    /// Button that was pressed or released; `None` for moves, leaves and wheel
    pub button: Option<PointerButton>,
    pub modifiers: Modifiers,
    pub screen_pos: Pos2,
    /// Only non-zero for wheel events
    pub scroll_delta: Vec2,
}

impl PointerInput {
    pub fn new(kind: ToolEventKind, screen_pos: Pos2) -> Self {
        Self {
            kind,
            button: None,
            modifiers: Modifiers::NONE,
            screen_pos,
            scroll_delta: Vec2::ZERO,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_scroll(mut self, delta: Vec2) -> Self {
        self.scroll_delta = delta;
        self
    }
}

/// A pointer event handed to a tool.
///
/// Both points are computed once, when the event is created, from the transform that
/// was current at that moment. Tools read them as snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolEvent {
    pub kind: ToolEventKind,
    pub original: PointerInput,
    pub image_point: Pos2,
    pub view_point: Pos2,
}

impl ToolEvent {
    /// `canvas_origin` is the screen position of the canvas' top-left corner.
    pub fn from_input(original: PointerInput, canvas_origin: Pos2, transform: &ViewTransform) -> Self {
        let view_point = original.screen_pos - canvas_origin.to_vec2();
        Self {
            kind: original.kind,
            original,
            image_point: transform.to_image_space(view_point),
            view_point,
        }
    }

    /// Build an event straight from an image-space point under `transform`.
    pub fn at_image_point(
        kind: ToolEventKind,
        button: Option<PointerButton>,
        image_point: Pos2,
        transform: &ViewTransform,
    ) -> Self {
        let view_point = transform.to_view_space(image_point);
        let mut original = PointerInput::new(kind, view_point);
        original.button = button;
        Self {
            kind,
            original,
            image_point,
            view_point,
        }
    }

    pub fn button(&self) -> Option<PointerButton> {
        self.original.button
    }

    pub fn is_press(&self, button: PointerButton) -> bool {
        self.kind == ToolEventKind::PointerDown && self.button() == Some(button)
    }
}

/// Turns egui's per-frame pointer state into a stream of [`PointerInput`]s for the canvas.
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    was_hovered: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect this frame's canvas events.
    ///
    /// `hovered` is whether the canvas widget is under the pointer, `captured` is the
    /// button currently holding pointer capture. While captured, moves and releases
    /// are reported even when the pointer is outside the canvas.
    pub fn process_input(
        &mut self,
        ctx: &Context,
        hovered: bool,
        captured: Option<PointerButton>,
    ) -> Vec<PointerInput> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let modifiers = input.modifiers;
            let pos = input.pointer.latest_pos();

            match pos {
                Some(pos) => {
                    if (hovered || captured.is_some()) && Some(pos) != self.last_pointer_pos {
                        events.push(PointerInput::new(ToolEventKind::PointerMove, pos).with_modifiers(modifiers));
                    }
                    if self.was_hovered && !hovered && captured.is_none() {
                        events.push(PointerInput::new(ToolEventKind::PointerLeave, pos).with_modifiers(modifiers));
                    }
                }
                None => {
                    if let Some(last) = self.last_pointer_pos {
                        // Pointer left the window: a held button is treated as released
                        if let Some(button) = captured {
                            events.push(
                                PointerInput::new(ToolEventKind::PointerUp, last)
                                    .with_button(button)
                                    .with_modifiers(modifiers),
                            );
                        } else if self.was_hovered {
                            events.push(PointerInput::new(ToolEventKind::PointerLeave, last).with_modifiers(modifiers));
                        }
                    }
                }
            }

            if let Some(pos) = pos {
                for button in [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle] {
                    if input.pointer.button_pressed(button) && hovered {
                        events.push(
                            PointerInput::new(ToolEventKind::PointerDown, pos)
                                .with_button(button)
                                .with_modifiers(modifiers),
                        );
                    }
                    if input.pointer.button_released(button) && (hovered || captured == Some(button)) {
                        events.push(
                            PointerInput::new(ToolEventKind::PointerUp, pos)
                                .with_button(button)
                                .with_modifiers(modifiers),
                        );
                    }
                }

                let scroll = input.smooth_scroll_delta;
                if hovered && scroll.y != 0.0 {
                    events.push(
                        PointerInput::new(ToolEventKind::Wheel, pos)
                            .with_modifiers(modifiers)
                            .with_scroll(scroll),
                    );
                }
            }

            self.last_pointer_pos = pos;
        });

        self.was_hovered = hovered;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn tool_event_maps_screen_to_both_spaces() {
        let transform = ViewTransform::new(10.0, 20.0, 2.0);
        let input = PointerInput::new(ToolEventKind::PointerDown, pos2(150.0, 170.0))
            .with_button(PointerButton::Primary);
        let event = ToolEvent::from_input(input, pos2(100.0, 100.0), &transform);
        assert_eq!(event.view_point, pos2(50.0, 70.0));
        assert_eq!(event.image_point, pos2(20.0, 25.0));
        assert!(event.is_press(PointerButton::Primary));
        assert!(!event.is_press(PointerButton::Secondary));
    }

    #[test]
    fn at_image_point_round_trips_through_the_transform() {
        let transform = ViewTransform::new(-5.0, 5.0, 4.0);
        let event = ToolEvent::at_image_point(ToolEventKind::PointerMove, None, pos2(3.0, 4.0), &transform);
        assert_eq!(event.view_point, pos2(7.0, 21.0));
        assert_eq!(event.button(), None);
    }
}
