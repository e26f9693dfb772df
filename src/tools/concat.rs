use egui::{Color32, CursorIcon, PointerButton, Pos2, Rect, Ui, Vec2};
use std::path::PathBuf;

use super::data::{ConcatMode, ToolData, color_to_hex, to_pixels};
use super::drawing::color_row;
use super::{OptionsEnv, OverlayPainter, Tool, ToolContext, ToolId, ToolVariant};
use crate::image::CanvasImageRef;
use crate::input::{ToolEvent, ToolEventKind};

const DEFAULT_COLOR: Color32 = Color32::from_rgb(0, 0, 0);
const PLACEHOLDER: Color32 = Color32::from_gray(90);

/// Which of the two images a drag moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatDrag {
    Main,
    Other,
}

/// The image joined onto the current one
#[derive(Debug, Clone, PartialEq)]
pub struct OtherImage {
    pub path: PathBuf,
    pub image: CanvasImageRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcatState {
    pub mode: ConcatMode,
    pub other: Option<OtherImage>,
    /// Cross-axis shift of the smaller image, kept within `[0, max_offset]`
    pub offset: f32,
    /// Fill for the uncovered part of the joined canvas
    pub color: Color32,
    pub dragging: Option<ConcatDrag>,
    pub drag_start: Pos2,
    pub offset_start: f32,
}

impl ConcatState {
    pub fn new(mode: ConcatMode) -> Self {
        Self {
            mode,
            other: None,
            offset: 0.0,
            color: DEFAULT_COLOR,
            dragging: None,
            drag_start: Pos2::ZERO,
            offset_start: 0.0,
        }
    }

    /// Same state in another mode. The offset restarts since the cross axis changes.
    pub fn with_mode(&self, mode: ConcatMode) -> Option<Self> {
        (mode != self.mode).then(|| Self {
            mode,
            offset: 0.0,
            dragging: None,
            ..self.clone()
        })
    }

    pub fn with_other(&self, other: Option<OtherImage>) -> Self {
        Self {
            other,
            offset: 0.0,
            dragging: None,
            ..self.clone()
        }
    }
}

/// Placement of both images in the main image's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConcatLayout {
    pub main: Rect,
    pub other: Rect,
    /// Union of both images: the size of the result
    pub bounds: Rect,
    pub max_offset: f32,
    /// Image that carries the offset; `None` when both match along the cross axis
    pub movable: Option<ConcatDrag>,
}

impl ConcatLayout {
    pub fn rect_of(&self, which: ConcatDrag) -> Rect {
        match which {
            ConcatDrag::Main => self.main,
            ConcatDrag::Other => self.other,
        }
    }
}

fn cross(mode: ConcatMode, v: Vec2) -> f32 {
    match mode {
        ConcatMode::Horizontal => v.y,
        ConcatMode::Vertical => v.x,
    }
}

fn along(mode: ConcatMode, v: Vec2) -> f32 {
    match mode {
        ConcatMode::Horizontal => v.x,
        ConcatMode::Vertical => v.y,
    }
}

fn place(mode: ConcatMode, along_pos: f32, cross_pos: f32) -> Pos2 {
    match mode {
        ConcatMode::Horizontal => Pos2::new(along_pos, cross_pos),
        ConcatMode::Vertical => Pos2::new(cross_pos, along_pos),
    }
}

/// Lay the two images edge to edge along `mode`'s axis.
///
/// The main image stays at the origin. The image that is smaller across the axis
/// is shifted by the offset, clamped here on every call. When the main image is the
/// smaller one the other image is drawn at a negative offset instead, so the main
/// image appears shifted relative to it.
pub fn get_layout(mode: ConcatMode, offset: f32, main: Vec2, other: Vec2) -> ConcatLayout {
    let difference = cross(mode, main) - cross(mode, other);
    let max_offset = difference.abs();
    let offset = offset.clamp(0.0, max_offset);

    let (other_cross, movable) = if difference > 0.0 {
        (offset, Some(ConcatDrag::Other))
    } else if difference < 0.0 {
        (-offset, Some(ConcatDrag::Main))
    } else {
        (0.0, None)
    };

    let main_rect = Rect::from_min_size(Pos2::ZERO, main);
    let other_rect = Rect::from_min_size(place(mode, along(mode, main), other_cross), other);
    ConcatLayout {
        main: main_rect,
        other: other_rect,
        bounds: main_rect.union(other_rect),
        max_offset,
        movable,
    }
}

/// The parts of `lane` (one image's strip across the result) not covered by `image`.
fn uncovered(mode: ConcatMode, bounds: Rect, image: Rect) -> [Rect; 2] {
    match mode {
        ConcatMode::Horizontal => [
            Rect::from_min_max(Pos2::new(image.min.x, bounds.min.y), image.right_top()),
            Rect::from_min_max(image.left_bottom(), Pos2::new(image.max.x, bounds.max.y)),
        ],
        ConcatMode::Vertical => [
            Rect::from_min_max(Pos2::new(bounds.min.x, image.min.y), image.left_bottom()),
            Rect::from_min_max(image.right_top(), Pos2::new(bounds.max.x, image.max.y)),
        ],
    }
}

/// Join a second dataset image onto the current one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatTool;

const VARIANTS: [ToolVariant; 2] = [
    ToolVariant {
        id: "horizontal",
        name: "Horizontal",
    },
    ToolVariant {
        id: "vertical",
        name: "Vertical",
    },
];

impl ConcatTool {
    pub fn layout(&self, state: &ConcatState, ctx: &ToolContext<'_>) -> Option<ConcatLayout> {
        let main = ctx.image?;
        let other = state.other.as_ref()?;
        Some(get_layout(state.mode, state.offset, main.size(), other.image.size()))
    }
}

impl Tool for ConcatTool {
    type State = ConcatState;

    fn id(&self) -> ToolId {
        ToolId::Concat
    }

    fn variants(&self) -> &'static [ToolVariant] {
        &VARIANTS
    }

    fn clip(&self) -> bool {
        false
    }

    fn init(&self, variant: Option<&str>) -> ConcatState {
        ConcatState::new(variant.and_then(ConcatMode::from_variant).unwrap_or_default())
    }

    fn reduce(&self, state: &ConcatState, event: &ToolEvent, ctx: &ToolContext<'_>) -> Option<ConcatState> {
        let layout = self.layout(state, ctx)?;
        let at = event.image_point;
        match event.kind {
            ToolEventKind::PointerDown if event.button() == Some(PointerButton::Primary) => {
                let movable = layout.movable?;
                if !layout.rect_of(movable).contains(at) {
                    return None;
                }
                ctx.set_cursor(CursorIcon::Grabbing);
                Some(ConcatState {
                    dragging: Some(movable),
                    drag_start: at,
                    offset_start: state.offset,
                    ..state.clone()
                })
            }
            ToolEventKind::PointerMove => {
                if state.dragging.is_none() {
                    let grabbable = layout.movable.is_some_and(|which| layout.rect_of(which).contains(at));
                    ctx.set_cursor(if grabbable { CursorIcon::Grab } else { CursorIcon::Default });
                    return None;
                }
                let delta = cross(state.mode, at - state.drag_start);
                let offset = (state.offset_start + delta).clamp(0.0, layout.max_offset);
                (offset != state.offset).then(|| ConcatState {
                    offset,
                    ..state.clone()
                })
            }
            ToolEventKind::PointerUp => state.dragging.map(|_| ConcatState {
                dragging: None,
                ..state.clone()
            }),
            _ => None,
        }
    }

    fn render(&self, state: &ConcatState, ctx: &ToolContext<'_>, painter: &mut OverlayPainter) {
        let Some(layout) = self.layout(state, ctx) else {
            return;
        };
        let Some(other) = &state.other else {
            return;
        };

        for image_rect in [layout.main, layout.other] {
            for gap in uncovered(state.mode, layout.bounds, image_rect) {
                painter.rect_filled(gap, state.color);
            }
        }

        match other.image.texture_id() {
            Some(texture) => painter.image(texture, layout.other),
            None => painter.rect_filled(layout.other, PLACEHOLDER),
        }

        if let Some(movable) = layout.movable {
            let rect = layout.rect_of(movable);
            painter.contrast_segment(rect.left_top(), rect.right_top());
            painter.contrast_segment(rect.left_bottom(), rect.right_bottom());
            painter.contrast_segment(rect.left_top(), rect.left_bottom());
            painter.contrast_segment(rect.right_top(), rect.right_bottom());
        }
        painter.rect_stroke_px(layout.bounds, 1.0, Color32::from_white_alpha(80));
    }

    fn get_data(&self, state: &ConcatState) -> Option<ToolData> {
        let other = state.other.as_ref()?;
        Some(ToolData::Concat {
            mode: state.mode,
            image: other.path.clone(),
            offset: to_pixels(state.offset),
            color: color_to_hex(state.color),
        })
    }

    fn select_variant(&self, state: &ConcatState, variant: &str) -> Option<ConcatState> {
        ConcatMode::from_variant(variant).and_then(|mode| state.with_mode(mode))
    }

    fn options_ui(&self, state: &ConcatState, ui: &mut Ui, env: &mut OptionsEnv<'_>) -> Option<ConcatState> {
        let mut updated = None;

        ui.horizontal(|ui| {
            for mode in ConcatMode::ALL {
                if ui.selectable_label(state.mode == mode, mode.as_str()).clicked() {
                    updated = state.with_mode(mode);
                }
            }
        });

        let selected_text = state
            .other
            .as_ref()
            .and_then(|other| other.path.file_name())
            .map_or_else(|| "Choose image…".to_string(), |name| name.to_string_lossy().into_owned());
        let mut picked: Option<PathBuf> = None;
        egui::ComboBox::from_label("With")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for item in env.items {
                    if Some(item.image.as_path()) == env.current {
                        continue;
                    }
                    let name = item
                        .image
                        .file_name()
                        .map_or_else(|| item.image.display().to_string(), |n| n.to_string_lossy().into_owned());
                    let is_selected = state.other.as_ref().is_some_and(|o| o.path == item.image);
                    if ui.selectable_label(is_selected, name).clicked() && !is_selected {
                        picked = Some(item.image.clone());
                    }
                }
            });

        if let Some(path) = picked {
            match env.images.get_or_load(&path, env.source, &env.egui_ctx) {
                Ok(image) => {
                    log::info!("Concat with {}", path.display());
                    updated = Some(state.with_other(Some(OtherImage { path, image })));
                }
                Err(err) => {
                    log::warn!("Failed to load {}: {err}", path.display());
                    env.notifications.error(format!("Could not load {}: {err}", path.display()));
                }
            }
        }

        if state.other.is_some() && ui.button("Remove second image").clicked() {
            updated = Some(state.with_other(None));
        }

        let base = updated.as_ref().unwrap_or(state);
        if let Some(color) = color_row(ui, "Background:", base.color) {
            updated = Some(ConcatState {
                color,
                ..base.clone()
            });
        }
        updated
    }
}
