use egui::{Color32, CursorIcon, PointerButton, Pos2, Rect, Sense, Ui, Vec2};
use std::cell::Cell;

use crate::config::CanvasConfig;
use crate::geometry::ViewTransform;
use crate::image::CanvasImageRef;
use crate::input::{InputHandler, PanGesture, PointerInput, Route, ToolEvent, ToolEventKind, route_input};
use crate::tools::{OverlayPainter, ToolContext, ToolId, ToolState};

const BACKGROUND: Color32 = Color32::from_gray(32);

/// The interaction surface.
///
/// Owns the displayed image and the view transform, turns pointer input into pan,
/// zoom or tool events, and redraws background, image and tool overlay every frame.
#[derive(Debug)]
pub struct CanvasSurface {
    image: Option<CanvasImageRef>,
    transform: ViewTransform,
    input: InputHandler,
    pan: Option<PanGesture>,
    /// Button holding pointer capture, from press to release
    captured: Option<PointerButton>,
    cursor: Cell<CursorIcon>,
    view_size: Vec2,
    /// Refit on the next frame (new image)
    needs_fit: bool,
    /// The view was panned or zoomed since the last fit; resizing keeps it as is
    user_moved: bool,
    last_tool: Option<ToolId>,
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self {
            image: None,
            transform: ViewTransform::IDENTITY,
            input: InputHandler::new(),
            pan: None,
            captured: None,
            cursor: Cell::new(CursorIcon::Default),
            view_size: Vec2::ZERO,
            needs_fit: false,
            user_moved: false,
            last_tool: None,
        }
    }

    pub fn image(&self) -> Option<&CanvasImageRef> {
        self.image.as_ref()
    }

    /// Replace the displayed image. A different image is fitted to the view.
    pub fn set_image(&mut self, image: Option<CanvasImageRef>) {
        let changed = match (&self.image, &image) {
            (Some(old), Some(new)) => old.id() != new.id(),
            (None, None) => false,
            _ => true,
        };
        if !changed {
            return;
        }
        if let Some(image) = &image {
            log::debug!("Canvas image: {} ({}x{})", image.path().display(), image.width(), image.height());
        }
        self.image = image;
        self.needs_fit = true;
        self.pan = None;
        self.captured = None;
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
        self.user_moved = true;
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn captured(&self) -> Option<PointerButton> {
        self.captured
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor.get()
    }

    /// Centre the image in a view of `view_size`.
    pub fn fit(&mut self, view_size: Vec2, config: &CanvasConfig) {
        self.view_size = view_size;
        self.needs_fit = false;
        self.user_moved = false;
        if let Some(image) = &self.image {
            self.transform = ViewTransform::fit(image.size(), view_size, config);
            log::debug!(
                "Fit to {}x{}: scale {:.3}",
                view_size.x,
                view_size.y,
                self.transform.scale
            );
        }
    }

    /// Refit when a new image arrived or the view was resized while untouched.
    fn sync_view_size(&mut self, view_size: Vec2, config: &CanvasConfig) {
        let resized = view_size != self.view_size;
        if self.needs_fit || (resized && !self.user_moved) {
            self.fit(view_size, config);
        } else if resized {
            self.view_size = view_size;
        }
    }

    /// Route a batch of inputs. Returns the active tool's new state if any reduce changed it.
    ///
    /// `canvas_origin` is the screen position of the canvas' top-left corner.
    pub fn handle_input(
        &mut self,
        inputs: &[PointerInput],
        canvas_origin: Pos2,
        state: &ToolState,
        config: &CanvasConfig,
    ) -> Option<ToolState> {
        let active = state.id();
        let mut updated: Option<ToolState> = None;

        for input in inputs {
            match route_input(input, active, self.pan.as_ref()) {
                Route::Zoom => {
                    let anchor = input.screen_pos - canvas_origin.to_vec2();
                    self.transform = self.transform.zoomed_at(anchor, input.scroll_delta.y, config);
                    self.user_moved = true;
                }
                Route::PanStart(button) => {
                    self.pan = Some(PanGesture {
                        button,
                        last_screen_pos: input.screen_pos,
                    });
                    self.captured = Some(button);
                }
                Route::Pan => {
                    if let Some(pan) = &mut self.pan {
                        if input.kind == ToolEventKind::PointerMove {
                            let delta = input.screen_pos - pan.last_screen_pos;
                            pan.last_screen_pos = input.screen_pos;
                            self.transform = self.transform.panned(delta);
                            self.user_moved = true;
                        }
                    }
                }
                Route::PanEnd => {
                    self.pan = None;
                    self.captured = None;
                }
                Route::Tool => {
                    match input.kind {
                        ToolEventKind::PointerDown => self.captured = self.captured.or(input.button),
                        ToolEventKind::PointerUp if input.button == self.captured => self.captured = None,
                        _ => {}
                    }
                    let event = ToolEvent::from_input(*input, canvas_origin, &self.transform);
                    let ctx = ToolContext::new(self.transform, self.image.as_deref(), config, &self.cursor);
                    let current = updated.as_ref().unwrap_or(state);
                    if let Some(next) = current.reduce(&event, &ctx) {
                        log::trace!("{:?} -> {}", event.kind, next.phase());
                        updated = Some(next);
                    }
                }
            }
        }
        updated
    }

    /// Screen rectangle of the image inside a canvas at `canvas_rect`
    pub fn image_screen_rect(&self, canvas_rect: Rect) -> Option<Rect> {
        let image = self.image.as_ref()?;
        Some(
            self.transform
                .rect_to_view_space(image.rect())
                .translate(canvas_rect.min.to_vec2()),
        )
    }

    /// Lay out, handle input for and paint the canvas. Returns the new tool state when
    /// the active tool changed it this frame.
    pub fn show(&mut self, ui: &mut Ui, state: &ToolState, config: &CanvasConfig) -> Option<ToolState> {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        self.sync_view_size(rect.size(), config);

        let active = state.id();
        if self.last_tool != Some(active) {
            self.cursor.set(CursorIcon::Default);
            self.last_tool = Some(active);
        }

        let inputs = self.input.process_input(ui.ctx(), response.hovered(), self.captured);
        let updated = self.handle_input(&inputs, rect.min, state, config);
        let state = updated.as_ref().unwrap_or(state);

        painter.rect_filled(rect, 0.0, BACKGROUND);

        let image_rect = self.image_screen_rect(rect);
        if let (Some(image), Some(image_rect)) = (&self.image, image_rect) {
            if let Some(texture) = image.texture_id() {
                painter.image(
                    texture,
                    image_rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
        }

        let ctx = ToolContext::new(self.transform, self.image.as_deref(), config, &self.cursor);
        let mut overlay = OverlayPainter::new(self.transform, rect.min);
        state.render(&ctx, &mut overlay);
        let clip = match image_rect {
            Some(image_rect) if active.clip() => image_rect.intersect(rect),
            _ => rect,
        };
        painter.with_clip_rect(clip).extend(overlay.into_shapes());

        if self.pan.is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        } else if response.hovered() || self.captured.is_some() {
            let icon = match self.cursor.get() {
                CursorIcon::Default if active == ToolId::View => CursorIcon::Grab,
                icon => icon,
            };
            ui.ctx().set_cursor_icon(icon);
        }

        // continuous redraw: the frame always reflects the latest transform and state
        ui.ctx().request_repaint();
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::CanvasImage;
    use egui::{Modifiers, pos2, vec2};

    fn surface(width: f32, height: f32) -> CanvasSurface {
        let mut surface = CanvasSurface::new();
        surface.set_image(Some(CanvasImage::new_ref("main.png", vec2(width, height), None)));
        surface
    }

    fn input(kind: ToolEventKind, x: f32, y: f32) -> PointerInput {
        PointerInput::new(kind, pos2(x, y))
    }

    #[test]
    fn new_image_is_fitted_on_the_next_layout() {
        let config = CanvasConfig::default();
        let mut surface = surface(200.0, 100.0);
        surface.sync_view_size(vec2(400.0, 400.0), &config);
        assert_eq!(surface.transform(), ViewTransform::fit(vec2(200.0, 100.0), vec2(400.0, 400.0), &config));

        // a moved view survives a resize
        surface.set_transform(ViewTransform::new(1.0, 2.0, 3.0));
        surface.sync_view_size(vec2(500.0, 400.0), &config);
        assert_eq!(surface.transform(), ViewTransform::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn brush_receives_image_space_points() {
        let config = CanvasConfig::default();
        let mut surface = surface(100.0, 100.0);
        surface.transform = ViewTransform::new(10.0, 10.0, 2.0);
        let state = ToolState::init(ToolId::Brush, None);

        let inputs = [
            input(ToolEventKind::PointerDown, 30.0, 30.0).with_button(PointerButton::Primary),
            input(ToolEventKind::PointerMove, 50.0, 30.0),
            input(ToolEventKind::PointerUp, 50.0, 30.0).with_button(PointerButton::Primary),
        ];
        let updated = surface.handle_input(&inputs, Pos2::ZERO, &state, &config).unwrap();
        let ToolState::Brush(brush) = updated else {
            panic!("expected brush state");
        };
        assert_eq!(brush.shapes[0].points, vec![pos2(10.0, 10.0), pos2(20.0, 10.0)]);
        assert_eq!(surface.captured(), None);
    }

    #[test]
    fn middle_drag_pans_without_reaching_the_tool() {
        let config = CanvasConfig::default();
        let mut surface = surface(100.0, 100.0);
        let state = ToolState::init(ToolId::Brush, None);

        let inputs = [
            input(ToolEventKind::PointerDown, 10.0, 10.0).with_button(PointerButton::Middle),
            input(ToolEventKind::PointerMove, 25.0, 5.0),
        ];
        assert!(surface.handle_input(&inputs, Pos2::ZERO, &state, &config).is_none());
        assert!(surface.is_panning());
        assert_eq!(surface.captured(), Some(PointerButton::Middle));
        assert_eq!(surface.transform(), ViewTransform::new(15.0, -5.0, 1.0));

        let release = [input(ToolEventKind::PointerUp, 25.0, 5.0).with_button(PointerButton::Middle)];
        surface.handle_input(&release, Pos2::ZERO, &state, &config);
        assert!(!surface.is_panning());
        assert_eq!(surface.captured(), None);
    }

    #[test]
    fn alt_drag_pans_even_with_a_drawing_tool() {
        let config = CanvasConfig::default();
        let mut surface = surface(100.0, 100.0);
        let state = ToolState::init(ToolId::Rect, None);
        let inputs = [
            input(ToolEventKind::PointerDown, 0.0, 0.0)
                .with_button(PointerButton::Primary)
                .with_modifiers(Modifiers::ALT),
            input(ToolEventKind::PointerMove, 4.0, 4.0),
        ];
        assert!(surface.handle_input(&inputs, Pos2::ZERO, &state, &config).is_none());
        assert_eq!(surface.transform().translation(), vec2(4.0, 4.0));
    }

    #[test]
    fn wheel_zooms_around_the_pointer() {
        let config = CanvasConfig::default();
        let mut surface = surface(100.0, 100.0);
        let state = ToolState::init(ToolId::Brush, None);
        let origin = pos2(50.0, 20.0);
        let mouse = pos2(120.0, 90.0);
        let before = surface.transform().to_image_space(mouse - origin.to_vec2());

        let wheel = [PointerInput::new(ToolEventKind::Wheel, mouse).with_scroll(vec2(0.0, 240.0))];
        assert!(surface.handle_input(&wheel, origin, &state, &config).is_none());

        let after = surface.transform().to_image_space(mouse - origin.to_vec2());
        assert!(surface.transform().scale > 1.0);
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn setting_the_same_image_keeps_the_view() {
        let config = CanvasConfig::default();
        let image = CanvasImage::new_ref("main.png", vec2(10.0, 10.0), None);
        let mut surface = CanvasSurface::new();
        surface.set_image(Some(image.clone()));
        surface.sync_view_size(vec2(100.0, 100.0), &config);
        surface.set_transform(ViewTransform::new(3.0, 3.0, 2.0));

        surface.set_image(Some(image));
        surface.sync_view_size(vec2(100.0, 100.0), &config);
        assert_eq!(surface.transform(), ViewTransform::new(3.0, 3.0, 2.0));
    }
}
