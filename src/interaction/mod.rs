//! Transient interaction state: selection, active tool, drag sessions,
//! snapping, and the timeline viewport. None of this is persisted and none
//! of it mutates the temporal model before a gesture commits.

pub mod drag;
pub mod selection;
pub mod snap;
pub mod viewport;

pub use drag::{DragKind, DragSession, DragState};
pub use selection::Selection;
pub use snap::{SnapResult, SnapSettings, SnapTarget, SnapTargetKind};
pub use viewport::{Tool, Viewport, ZOOM_LADDER};

/// All per-session interaction state in one place.
#[derive(Debug, Default)]
pub struct InteractionState {
    pub selection: Selection,
    pub tool: Tool,
    pub drag: DragState,
    pub viewport: Viewport,
    pub snap: SnapSettings,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }
}
