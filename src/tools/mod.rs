use egui::{CursorIcon, Ui};
use std::cell::Cell;
use std::path::Path;

use crate::backend::DatasetItem;
use crate::config::CanvasConfig;
use crate::geometry::ViewTransform;
use crate::image::CanvasImage;
use crate::image_cache::{ImageCache, ImageSource};
use crate::input::ToolEvent;
use crate::notifications::Notifications;

pub mod data;
pub mod overlay;

mod brush;
mod concat;
mod drawing;
mod expand;
mod rect;
mod split;
mod trim;
mod view;

pub use brush::{BrushState, BrushTool};
pub use concat::{ConcatDrag, ConcatLayout, ConcatState, ConcatTool, OtherImage, get_layout};
pub use data::{ConcatMode, Point, SplitMode, ToolData};
pub use drawing::{DrawingState, RectShape, StrokeShape};
pub use expand::{ExpandState, ExpandTool};
pub use overlay::OverlayPainter;
pub use rect::{RectState, RectTool};
pub use split::{SplitState, SplitTool};
pub use trim::{TrimState, TrimTool};
pub use view::ViewTool;

/// Per-call context given to every tool.
///
/// Built fresh by the canvas for each reduce and each frame; tools must not keep
/// the transform or image beyond the call.
pub struct ToolContext<'a> {
    pub transform: ViewTransform,
    /// `None` while nothing is selected or the image is still loading
    pub image: Option<&'a CanvasImage>,
    pub config: &'a CanvasConfig,
    cursor: &'a Cell<CursorIcon>,
}

impl<'a> ToolContext<'a> {
    pub fn new(
        transform: ViewTransform,
        image: Option<&'a CanvasImage>,
        config: &'a CanvasConfig,
        cursor: &'a Cell<CursorIcon>,
    ) -> Self {
        Self {
            transform,
            image,
            config,
            cursor,
        }
    }

    /// Set the canvas cursor. The only side effect a reduce may have.
    pub fn set_cursor(&self, icon: CursorIcon) {
        self.cursor.set(icon);
    }

    /// Edge grab distance in image units: a constant screen distance at any zoom.
    pub fn edge_tolerance(&self) -> f32 {
        self.transform.view_len_to_image(self.config.edge_tolerance_px)
    }
}

/// What a tool's options panel may touch besides its own state.
pub struct OptionsEnv<'a> {
    pub items: &'a [DatasetItem],
    pub current: Option<&'a Path>,
    pub config: &'a CanvasConfig,
    pub images: &'a mut ImageCache,
    pub source: &'a dyn ImageSource,
    pub notifications: &'a mut Notifications,
    pub egui_ctx: egui::Context,
}

/// A sub-mode selectable from a tool's secondary menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolVariant {
    pub id: &'static str,
    pub name: &'static str,
}

/// Tool trait defines the interaction contract shared by all canvas tools.
///
/// A tool holds no mutable data itself: everything it needs between events lives in
/// its `State`, which the editor owns and replaces wholesale.
pub trait Tool {
    type State: Clone + std::fmt::Debug;

    fn id(&self) -> ToolId;

    /// Sub-modes for the secondary menu
    fn variants(&self) -> &'static [ToolVariant] {
        &[]
    }

    /// Whether the overlay is clipped to the image's on-screen rectangle
    fn clip(&self) -> bool {
        true
    }

    /// Fresh state, optionally for one of [`Tool::variants`].
    fn init(&self, variant: Option<&str>) -> Self::State;

    /// Apply an event. Returns `None` when the state is unchanged, so the caller can
    /// skip propagating it.
    fn reduce(&self, state: &Self::State, event: &ToolEvent, ctx: &ToolContext<'_>) -> Option<Self::State>;

    /// Paint the live overlay.
    fn render(&self, state: &Self::State, ctx: &ToolContext<'_>, painter: &mut OverlayPainter);

    /// Commit payload, or `None` when there is nothing to apply.
    fn get_data(&self, state: &Self::State) -> Option<ToolData>;

    /// Switch sub-mode while keeping the rest of the state.
    fn select_variant(&self, _state: &Self::State, _variant: &str) -> Option<Self::State> {
        None
    }

    /// Tool-specific controls. Returns the updated state when something changed.
    fn options_ui(&self, _state: &Self::State, _ui: &mut Ui, _env: &mut OptionsEnv<'_>) -> Option<Self::State> {
        None
    }
}

/// Identity of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolId {
    View,
    Brush,
    Rect,
    Split,
    Trim,
    Expand,
    Concat,
}

impl ToolId {
    /// Palette order
    pub const ALL: [ToolId; 7] = [
        ToolId::View,
        ToolId::Brush,
        ToolId::Rect,
        ToolId::Split,
        ToolId::Trim,
        ToolId::Expand,
        ToolId::Concat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::View => "view",
            ToolId::Brush => "brush",
            ToolId::Rect => "rect",
            ToolId::Split => "split",
            ToolId::Trim => "trim",
            ToolId::Expand => "expand",
            ToolId::Concat => "concat",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolId::View => "View",
            ToolId::Brush => "Brush",
            ToolId::Rect => "Rectangle",
            ToolId::Split => "Split",
            ToolId::Trim => "Trim",
            ToolId::Expand => "Expand",
            ToolId::Concat => "Concat",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ToolId::View => "✋",
            ToolId::Brush => "🖌",
            ToolId::Rect => "◻",
            ToolId::Split => "✂",
            ToolId::Trim => "⛶",
            ToolId::Expand => "⬚",
            ToolId::Concat => "➕",
        }
    }

    pub fn variants(&self) -> &'static [ToolVariant] {
        match self {
            ToolId::View => ViewTool.variants(),
            ToolId::Brush => BrushTool.variants(),
            ToolId::Rect => RectTool.variants(),
            ToolId::Split => SplitTool.variants(),
            ToolId::Trim => TrimTool.variants(),
            ToolId::Expand => ExpandTool.variants(),
            ToolId::Concat => ConcatTool.variants(),
        }
    }

    pub fn clip(&self) -> bool {
        match self {
            ToolId::View => ViewTool.clip(),
            ToolId::Brush => BrushTool.clip(),
            ToolId::Rect => RectTool.clip(),
            ToolId::Split => SplitTool.clip(),
            ToolId::Trim => TrimTool.clip(),
            ToolId::Expand => ExpandTool.clip(),
            ToolId::Concat => ConcatTool.clip(),
        }
    }
}

/// State of the active tool, one variant per tool.
///
/// Enum dispatch keeps every tool's state concrete and makes adding a tool a
/// compile error everywhere it has to be handled.
#[derive(Debug, Clone)]
pub enum ToolState {
    View,
    Brush(BrushState),
    Rect(RectState),
    Split(SplitState),
    Trim(TrimState),
    Expand(ExpandState),
    Concat(ConcatState),
}

impl ToolState {
    pub fn init(id: ToolId, variant: Option<&str>) -> Self {
        match id {
            ToolId::View => {
                ViewTool.init(variant);
                Self::View
            }
            ToolId::Brush => Self::Brush(BrushTool.init(variant)),
            ToolId::Rect => Self::Rect(RectTool.init(variant)),
            ToolId::Split => Self::Split(SplitTool.init(variant)),
            ToolId::Trim => Self::Trim(TrimTool.init(variant)),
            ToolId::Expand => Self::Expand(ExpandTool.init(variant)),
            ToolId::Concat => Self::Concat(ConcatTool.init(variant)),
        }
    }

    pub fn id(&self) -> ToolId {
        match self {
            Self::View => ToolId::View,
            Self::Brush(_) => ToolId::Brush,
            Self::Rect(_) => ToolId::Rect,
            Self::Split(_) => ToolId::Split,
            Self::Trim(_) => ToolId::Trim,
            Self::Expand(_) => ToolId::Expand,
            Self::Concat(_) => ToolId::Concat,
        }
    }

    pub fn reduce(&self, event: &ToolEvent, ctx: &ToolContext<'_>) -> Option<Self> {
        match self {
            Self::View => ViewTool.reduce(&(), event, ctx).map(|()| Self::View),
            Self::Brush(state) => BrushTool.reduce(state, event, ctx).map(Self::Brush),
            Self::Rect(state) => RectTool.reduce(state, event, ctx).map(Self::Rect),
            Self::Split(state) => SplitTool.reduce(state, event, ctx).map(Self::Split),
            Self::Trim(state) => TrimTool.reduce(state, event, ctx).map(Self::Trim),
            Self::Expand(state) => ExpandTool.reduce(state, event, ctx).map(Self::Expand),
            Self::Concat(state) => ConcatTool.reduce(state, event, ctx).map(Self::Concat),
        }
    }

    pub fn render(&self, ctx: &ToolContext<'_>, painter: &mut OverlayPainter) {
        match self {
            Self::View => ViewTool.render(&(), ctx, painter),
            Self::Brush(state) => BrushTool.render(state, ctx, painter),
            Self::Rect(state) => RectTool.render(state, ctx, painter),
            Self::Split(state) => SplitTool.render(state, ctx, painter),
            Self::Trim(state) => TrimTool.render(state, ctx, painter),
            Self::Expand(state) => ExpandTool.render(state, ctx, painter),
            Self::Concat(state) => ConcatTool.render(state, ctx, painter),
        }
    }

    pub fn get_data(&self) -> Option<ToolData> {
        match self {
            Self::View => ViewTool.get_data(&()),
            Self::Brush(state) => BrushTool.get_data(state),
            Self::Rect(state) => RectTool.get_data(state),
            Self::Split(state) => SplitTool.get_data(state),
            Self::Trim(state) => TrimTool.get_data(state),
            Self::Expand(state) => ExpandTool.get_data(state),
            Self::Concat(state) => ConcatTool.get_data(state),
        }
    }

    pub fn select_variant(&self, variant: &str) -> Option<Self> {
        match self {
            Self::View => None,
            Self::Brush(state) => BrushTool.select_variant(state, variant).map(Self::Brush),
            Self::Rect(state) => RectTool.select_variant(state, variant).map(Self::Rect),
            Self::Split(state) => SplitTool.select_variant(state, variant).map(Self::Split),
            Self::Trim(state) => TrimTool.select_variant(state, variant).map(Self::Trim),
            Self::Expand(state) => ExpandTool.select_variant(state, variant).map(Self::Expand),
            Self::Concat(state) => ConcatTool.select_variant(state, variant).map(Self::Concat),
        }
    }

    pub fn options_ui(&self, ui: &mut Ui, env: &mut OptionsEnv<'_>) -> Option<Self> {
        match self {
            Self::View => ViewTool.options_ui(&(), ui, env).map(|()| Self::View),
            Self::Brush(state) => BrushTool.options_ui(state, ui, env).map(Self::Brush),
            Self::Rect(state) => RectTool.options_ui(state, ui, env).map(Self::Rect),
            Self::Split(state) => SplitTool.options_ui(state, ui, env).map(Self::Split),
            Self::Trim(state) => TrimTool.options_ui(state, ui, env).map(Self::Trim),
            Self::Expand(state) => ExpandTool.options_ui(state, ui, env).map(Self::Expand),
            Self::Concat(state) => ConcatTool.options_ui(state, ui, env).map(Self::Concat),
        }
    }

    /// Short label of the state machine's current phase, for the status line
    pub fn phase(&self) -> &'static str {
        match self {
            Self::View => "idle",
            Self::Brush(state) => state.phase(),
            Self::Rect(state) => state.phase(),
            Self::Split(state) => {
                if state.split_point.is_some() {
                    "placed"
                } else {
                    "idle"
                }
            }
            Self::Trim(state) => state.dragging.map(|edge| edge.as_str()).unwrap_or("idle"),
            Self::Expand(state) => state.dragging.map(|edge| edge.as_str()).unwrap_or("idle"),
            Self::Concat(state) => match state.dragging {
                Some(ConcatDrag::Main) => "dragging main",
                Some(ConcatDrag::Other) => "dragging other",
                None => "idle",
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::input::ToolEventKind;
    use egui::{PointerButton, Pos2, pos2};

    /// Owns what a [`ToolContext`] borrows.
    pub struct Harness {
        pub transform: ViewTransform,
        pub image: Option<CanvasImage>,
        pub config: CanvasConfig,
        pub cursor: Cell<CursorIcon>,
    }

    impl Harness {
        pub fn with_image(width: f32, height: f32) -> Self {
            Self {
                transform: ViewTransform::IDENTITY,
                image: Some(CanvasImage::with_size("main.png", width, height)),
                config: CanvasConfig::default(),
                cursor: Cell::new(CursorIcon::Default),
            }
        }

        pub fn without_image() -> Self {
            Self {
                image: None,
                ..Self::with_image(0.0, 0.0)
            }
        }

        pub fn ctx(&self) -> ToolContext<'_> {
            ToolContext::new(self.transform, self.image.as_ref(), &self.config, &self.cursor)
        }

        pub fn event(&self, kind: ToolEventKind, button: Option<PointerButton>, at: Pos2) -> ToolEvent {
            ToolEvent::at_image_point(kind, button, at, &self.transform)
        }

        pub fn down(&self, x: f32, y: f32) -> ToolEvent {
            self.event(ToolEventKind::PointerDown, Some(PointerButton::Primary), pos2(x, y))
        }

        pub fn right_down(&self, x: f32, y: f32) -> ToolEvent {
            self.event(ToolEventKind::PointerDown, Some(PointerButton::Secondary), pos2(x, y))
        }

        pub fn mv(&self, x: f32, y: f32) -> ToolEvent {
            self.event(ToolEventKind::PointerMove, None, pos2(x, y))
        }

        pub fn right_up(&self, x: f32, y: f32) -> ToolEvent {
            self.event(ToolEventKind::PointerUp, Some(PointerButton::Secondary), pos2(x, y))
        }

        pub fn up(&self, x: f32, y: f32) -> ToolEvent {
            self.event(ToolEventKind::PointerUp, Some(PointerButton::Primary), pos2(x, y))
        }

        /// Reduce and keep the old state when nothing changed
        pub fn step<T: Tool>(&self, tool: &T, state: T::State, event: ToolEvent) -> T::State {
            tool.reduce(&state, &event, &self.ctx()).unwrap_or(state)
        }
    }
}
