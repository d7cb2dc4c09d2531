//! Drag session state machine.
//!
//! A drag accumulates a live delta against the model without mutating it;
//! only `end_drag` hands the accumulated state to the session layer for an
//! actual (batched) model mutation. `cancel_drag` discards everything.

use crate::core::time::Time;
use crate::interaction::snap::{self, SnapResult, SnapSettings, SnapTarget};
use crate::model::{ClipId, TrackId};

/// What the drag is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    TrimStart,
    TrimEnd,
    Split,
    Select,
}

/// Live state of an in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub kind: DragKind,
    pub clip_ids: Vec<ClipId>,
    /// Timeline position where the pointer went down.
    pub origin_time: Time,
    /// Current (snapped) pointer position on the timeline.
    pub current_time: Time,
    /// Destination track under the pointer, for cross-track moves.
    pub target_track: Option<TrackId>,
    /// Guides produced by the latest snap resolution.
    pub guides: Vec<SnapTarget>,
}

impl DragSession {
    /// Accumulated timeline delta since the drag started.
    pub fn delta(&self) -> Time {
        self.current_time - self.origin_time
    }
}

/// Drag state: idle or one active session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragState {
    /// Begin a drag. Returns `false` (and changes nothing) if a drag is
    /// already active - one gesture at a time.
    pub fn start(&mut self, kind: DragKind, clip_ids: Vec<ClipId>, at: Time) -> bool {
        if matches!(self, DragState::Dragging(_)) {
            return false;
        }
        *self = DragState::Dragging(DragSession {
            kind,
            clip_ids,
            origin_time: at,
            current_time: at,
            target_track: None,
            guides: Vec::new(),
        });
        true
    }

    /// Update the live position, resolving snapping against the given
    /// targets. Returns the snapped time, or `None` when idle.
    pub fn update(
        &mut self,
        to: Time,
        target_track: Option<TrackId>,
        settings: &SnapSettings,
        targets: &[SnapTarget],
    ) -> Option<Time> {
        let DragState::Dragging(session) = self else {
            return None;
        };
        let SnapResult { time, guide } = snap::resolve(to, settings, targets);
        session.current_time = time;
        session.target_track = target_track;
        session.guides.clear();
        if let Some(guide) = guide {
            session.guides.push(guide);
        }
        Some(time)
    }

    /// Finish the drag, returning the session for the caller to commit.
    pub fn end(&mut self) -> Option<DragSession> {
        match std::mem::take(self) {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Abandon the drag with no observable effect.
    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match self {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::from_millis;

    fn no_snap() -> SnapSettings {
        SnapSettings {
            enabled: false,
            grid: 0,
            threshold: 0,
        }
    }

    #[test]
    fn test_start_update_end() {
        let mut drag = DragState::default();
        assert!(drag.start(DragKind::Move, vec![1], from_millis(1000)));
        assert!(drag.is_dragging());

        drag.update(from_millis(2500), None, &no_snap(), &[]);
        let session = drag.end().unwrap();
        assert_eq!(session.delta(), from_millis(1500));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_second_start_is_rejected() {
        let mut drag = DragState::default();
        assert!(drag.start(DragKind::Move, vec![1], 0));
        assert!(!drag.start(DragKind::TrimEnd, vec![2], 0));
        // original session survives
        assert_eq!(drag.session().unwrap().kind, DragKind::Move);
    }

    #[test]
    fn test_cancel_discards_session() {
        let mut drag = DragState::default();
        drag.start(DragKind::TrimStart, vec![1], from_millis(1000));
        drag.update(from_millis(3000), None, &no_snap(), &[]);
        drag.cancel();
        assert!(drag.end().is_none());
    }

    #[test]
    fn test_update_records_snap_guides() {
        let mut drag = DragState::default();
        drag.start(DragKind::Move, vec![1], 0);

        let settings = SnapSettings {
            enabled: true,
            grid: from_millis(1000),
            threshold: from_millis(100),
        };
        let targets = [SnapTarget::clip_edge(from_millis(1490), 9)];
        let snapped = drag
            .update(from_millis(1450), None, &settings, &targets)
            .unwrap();
        assert_eq!(snapped, from_millis(1490));
        assert_eq!(drag.session().unwrap().guides.len(), 1);
    }

    #[test]
    fn test_update_while_idle_is_none() {
        let mut drag = DragState::default();
        assert!(drag.update(from_millis(100), None, &no_snap(), &[]).is_none());
    }
}
