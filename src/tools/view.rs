use super::data::ToolData;
use super::{OverlayPainter, Tool, ToolContext, ToolId};
use crate::input::ToolEvent;

/// Pan-only mode. The canvas routes left-drags to panning while this tool is active,
/// so it never sees them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewTool;

impl Tool for ViewTool {
    type State = ();

    fn id(&self) -> ToolId {
        ToolId::View
    }

    fn init(&self, _variant: Option<&str>) {}

    fn reduce(&self, _state: &(), _event: &ToolEvent, _ctx: &ToolContext<'_>) -> Option<()> {
        None
    }

    fn render(&self, _state: &(), _ctx: &ToolContext<'_>, _painter: &mut OverlayPainter) {}

    fn get_data(&self, _state: &()) -> Option<ToolData> {
        None
    }
}
