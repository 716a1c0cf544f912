//! Drag-and-drop interaction state.
//!
//! States: `Idle` and `Dragging`.
//! - `Enter`: → `Dragging`
//! - `Leave`: → `Idle`
//! - `Drop(files)`: → `Idle`, then the files are submitted as one batch
//! - `Over`: no transition
//!
//! Each event is applied synchronously, so any burst of events settles to the
//! state implied by the last one.

/// Drop-target interaction state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// A drag is hovering over the drop target.
    Dragging,
}

impl DragState {
    pub fn is_active(self) -> bool {
        matches!(self, DragState::Dragging)
    }

    /// Returns the state after `event`.
    pub fn next<F>(self, event: &DragEvent<F>) -> DragState {
        match event {
            DragEvent::Enter => DragState::Dragging,
            DragEvent::Over => self,
            DragEvent::Leave | DragEvent::Drop(_) => DragState::Idle,
        }
    }
}

/// A drag event delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent<F> {
    Enter,
    Over,
    Leave,
    /// Files released over the drop target.
    Drop(Vec<F>),
}

/// What the host must do with the native event after the session handled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragResponse {
    /// Suppress the host's default handling (otherwise the drop is never delivered).
    pub prevent_default: bool,
}

impl DragResponse {
    pub const HANDLED: DragResponse = DragResponse {
        prevent_default: true,
    };
}
