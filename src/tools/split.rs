use egui::{PointerButton, Pos2, Ui};

use super::data::{SplitMode, ToolData};
use super::{OptionsEnv, OverlayPainter, Tool, ToolContext, ToolId, ToolVariant};
use crate::input::{ToolEvent, ToolEventKind};

#[derive(Debug, Clone, PartialEq)]
pub struct SplitState {
    pub mode: SplitMode,
    /// Committed split position; only a right-click or a reset clears it
    pub split_point: Option<Pos2>,
    /// Preview position while nothing is committed
    pub hover_point: Option<Pos2>,
}

impl SplitState {
    pub fn new(mode: SplitMode) -> Self {
        Self {
            mode,
            split_point: None,
            hover_point: None,
        }
    }

    /// Same state in another mode; the split point is kept.
    pub fn with_mode(&self, mode: SplitMode) -> Option<Self> {
        (mode != self.mode).then(|| Self {
            mode,
            ..self.clone()
        })
    }

    /// Where a click at `at` puts the split point in the current mode.
    ///
    /// Horizontal and vertical clicks move one axis only, keeping the other from the
    /// existing point.
    fn placed_point(&self, at: Pos2) -> Pos2 {
        match (self.mode, self.split_point) {
            (SplitMode::Horizontal, Some(existing)) => Pos2::new(existing.x, at.y),
            (SplitMode::Vertical, Some(existing)) => Pos2::new(at.x, existing.y),
            _ => at,
        }
    }
}

/// Cut an image into two or four parts along guide lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitTool;

const VARIANTS: [ToolVariant; 3] = [
    ToolVariant {
        id: "cross",
        name: "Cross",
    },
    ToolVariant {
        id: "horizontal",
        name: "Horizontal",
    },
    ToolVariant {
        id: "vertical",
        name: "Vertical",
    },
];

impl Tool for SplitTool {
    type State = SplitState;

    fn id(&self) -> ToolId {
        ToolId::Split
    }

    fn variants(&self) -> &'static [ToolVariant] {
        &VARIANTS
    }

    fn init(&self, variant: Option<&str>) -> SplitState {
        SplitState::new(variant.and_then(SplitMode::from_variant).unwrap_or_default())
    }

    fn reduce(&self, state: &SplitState, event: &ToolEvent, ctx: &ToolContext<'_>) -> Option<SplitState> {
        ctx.image?;
        let at = event.image_point;
        match (event.kind, event.button()) {
            (ToolEventKind::PointerDown, Some(PointerButton::Primary)) => {
                let point = state.placed_point(at);
                (state.split_point != Some(point)).then(|| SplitState {
                    split_point: Some(point),
                    ..state.clone()
                })
            }
            (ToolEventKind::PointerDown, Some(PointerButton::Secondary)) => {
                state.split_point.is_some().then(|| SplitState {
                    split_point: None,
                    hover_point: Some(at),
                    ..state.clone()
                })
            }
            (ToolEventKind::PointerMove, _) => (state.split_point.is_none() && state.hover_point != Some(at))
                .then(|| SplitState {
                    hover_point: Some(at),
                    ..state.clone()
                }),
            (ToolEventKind::PointerLeave, _) => state.hover_point.is_some().then(|| SplitState {
                hover_point: None,
                ..state.clone()
            }),
            _ => None,
        }
    }

    fn render(&self, state: &SplitState, ctx: &ToolContext<'_>, painter: &mut OverlayPainter) {
        let Some(image) = ctx.image else {
            return;
        };
        let Some(point) = state.split_point.or(state.hover_point) else {
            return;
        };
        let size = image.size();
        let horizontal_line = |painter: &mut OverlayPainter| {
            painter.contrast_segment(Pos2::new(0.0, point.y), Pos2::new(size.x, point.y));
        };
        let vertical_line = |painter: &mut OverlayPainter| {
            painter.contrast_segment(Pos2::new(point.x, 0.0), Pos2::new(point.x, size.y));
        };
        match state.mode {
            SplitMode::Cross => {
                horizontal_line(painter);
                vertical_line(painter);
            }
            SplitMode::Horizontal => horizontal_line(painter),
            SplitMode::Vertical => vertical_line(painter),
        }
    }

    fn get_data(&self, state: &SplitState) -> Option<ToolData> {
        state.split_point.map(|point| ToolData::Split {
            mode: state.mode,
            point: point.into(),
        })
    }

    fn select_variant(&self, state: &SplitState, variant: &str) -> Option<SplitState> {
        SplitMode::from_variant(variant).and_then(|mode| state.with_mode(mode))
    }

    fn options_ui(&self, state: &SplitState, ui: &mut Ui, _env: &mut OptionsEnv<'_>) -> Option<SplitState> {
        let mut updated = None;
        ui.horizontal(|ui| {
            for mode in SplitMode::ALL {
                if ui.selectable_label(state.mode == mode, mode.as_str()).clicked() {
                    updated = state.with_mode(mode);
                }
            }
        });
        match state.split_point {
            Some(point) => {
                ui.label(format!("Split at ({:.0}, {:.0})", point.x, point.y));
                if ui.button("Clear").clicked() {
                    updated = Some(SplitState {
                        split_point: None,
                        ..state.clone()
                    });
                }
            }
            None => {
                ui.label("Click to place the split, right-click to clear.");
            }
        }
        updated
    }
}
