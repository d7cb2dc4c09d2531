//! Command history engine: a bounded log of reversible edits with a cursor
//! and atomic batching.
//!
//! The cursor counts applied actions, so it ranges over `[0, len]`; the
//! conventional "current index" view is `cursor - 1`. Actions past the
//! cursor form the redo tail and are permanently discarded when a new
//! action is pushed.

use crate::core::id::IdGen;
use crate::core::time::now_millis;
use crate::history::action::{ActionId, ActionPayload, EditAction};

pub const DEFAULT_MAX_SIZE: usize = 100;

/// Error type for history operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// `start_batch` while a batch is already open. Batches never nest.
    #[error("a history batch is already in progress")]
    BatchInProgress,
}

#[derive(Debug, Clone)]
struct BatchBuffer {
    description: String,
    actions: Vec<EditAction>,
}

/// Bounded, cursor-based log of edit actions.
#[derive(Debug)]
pub struct HistoryEngine {
    actions: Vec<EditAction>,
    /// Number of applied actions; `actions[cursor..]` is the redo tail.
    cursor: usize,
    max_size: usize,
    batch: Option<BatchBuffer>,
    id_gen: IdGen,
}

impl HistoryEngine {
    pub fn new(max_size: usize) -> Self {
        Self {
            actions: Vec::new(),
            cursor: 0,
            max_size: max_size.max(1),
            batch: None,
            id_gen: IdGen::new(),
        }
    }

    // ----- recording -------------------------------------------------------

    /// Record an edit. While a batch is open the action goes to the batch
    /// buffer; otherwise the redo tail is discarded, the action is appended,
    /// and the oldest action is evicted if the log exceeds its bound.
    pub fn push(&mut self, description: impl Into<String>, payload: ActionPayload) -> ActionId {
        let action = EditAction {
            id: self.id_gen.next_id(),
            timestamp: now_millis(),
            description: description.into(),
            payload,
        };
        let id = action.id;

        if let Some(batch) = self.batch.as_mut() {
            batch.actions.push(action);
            return id;
        }

        self.append(action);
        id
    }

    fn append(&mut self, action: EditAction) {
        // prune the redo tail before appending
        self.actions.truncate(self.cursor);
        self.actions.push(action);
        self.cursor = self.actions.len();

        if self.actions.len() > self.max_size {
            self.actions.remove(0);
            self.cursor -= 1;
        }
    }

    // ----- batching --------------------------------------------------------

    /// Open a batch. Edits pushed until `end_batch` are committed as one
    /// composite action. A second `start_batch` is rejected, never nested.
    pub fn start_batch(&mut self, description: impl Into<String>) -> Result<(), HistoryError> {
        if self.batch.is_some() {
            return Err(HistoryError::BatchInProgress);
        }
        self.batch = Some(BatchBuffer {
            description: description.into(),
            actions: Vec::new(),
        });
        Ok(())
    }

    /// Flush the open batch as one composite action. An empty batch is
    /// silently discarded. Returns the composite action's id, if any.
    pub fn end_batch(&mut self) -> Option<ActionId> {
        let buffer = self.batch.take()?;
        if buffer.actions.is_empty() {
            return None;
        }
        let action = EditAction {
            id: self.id_gen.next_id(),
            timestamp: now_millis(),
            description: buffer.description,
            payload: ActionPayload::Batch {
                actions: buffer.actions,
            },
        };
        let id = action.id;
        self.append(action);
        Some(id)
    }

    /// Discard the open batch without touching the main log.
    pub fn cancel_batch(&mut self) {
        self.batch = None;
    }

    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }

    // ----- cursor movement -------------------------------------------------

    /// Step the cursor back and return the action to invert, or `None` if
    /// there is nothing to undo. The caller applies the inverse payload.
    pub fn undo(&mut self) -> Option<EditAction> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.actions[self.cursor].clone())
    }

    /// Step the cursor forward and return the action to reapply, or `None`
    /// if the cursor is already at the tail.
    pub fn redo(&mut self) -> Option<EditAction> {
        if !self.can_redo() {
            return None;
        }
        let action = self.actions[self.cursor].clone();
        self.cursor += 1;
        Some(action)
    }

    /// Mid-gesture edits are not individually undoable, so both of these are
    /// false while a batch is open.
    pub fn can_undo(&self) -> bool {
        self.batch.is_none() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.batch.is_none() && self.cursor < self.actions.len()
    }

    // ----- maintenance -----------------------------------------------------

    /// Change the retained-size bound. Shrinking drops the oldest excess
    /// actions and clamps the cursor.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        if self.actions.len() > self.max_size {
            let excess = self.actions.len() - self.max_size;
            self.actions.drain(..excess);
            self.cursor = self.cursor.saturating_sub(excess);
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.cursor = 0;
        self.batch = None;
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The conventional current index: `-1` when nothing is applied.
    pub fn current_index(&self) -> i64 {
        self.cursor as i64 - 1
    }

    /// Recorded actions, oldest first.
    pub fn actions(&self) -> &[EditAction] {
        &self.actions
    }
}

impl Default for HistoryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertyTarget, PropertyValue};

    fn payload(n: u64) -> ActionPayload {
        // any self-contained payload works for engine-level tests
        ActionPayload::ReorderTrack {
            track_id: n,
            from_order: 0,
            to_order: 1,
        }
    }

    #[test]
    fn test_push_undo_redo_cycle() {
        let mut history = HistoryEngine::new(10);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current_index(), -1);

        history.push("a", payload(1));
        history.push("b", payload(2));
        assert_eq!(history.current_index(), 1);

        let undone = history.undo().unwrap();
        assert_eq!(undone.description, "b");
        assert!(history.can_redo());

        let redone = history.redo().unwrap();
        assert_eq!(redone.description, "b");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_discards_redo_tail() {
        let mut history = HistoryEngine::new(10);
        history.push("a", payload(1));
        history.push("b", payload(2));
        history.push("c", payload(3));

        history.undo();
        history.undo();
        assert!(history.can_redo());

        history.push("d", payload(4));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.actions()[1].description, "d");
    }

    #[test]
    fn test_eviction_keeps_cursor_valid() {
        let mut history = HistoryEngine::new(3);
        for n in 0..5 {
            history.push(format!("a{}", n), payload(n));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.current_index(), 2);
        // oldest first: a0 and a1 were evicted
        assert_eq!(history.actions()[0].description, "a2");

        // undo still walks the retained window
        assert_eq!(history.undo().unwrap().description, "a4");
        assert_eq!(history.undo().unwrap().description, "a3");
        assert_eq!(history.undo().unwrap().description, "a2");
        assert!(history.undo().is_none());
        assert_eq!(history.current_index(), -1);
    }

    #[test]
    fn test_batch_flushes_as_single_action() {
        let mut history = HistoryEngine::new(10);
        history.start_batch("drag").unwrap();
        assert!(!history.can_undo());
        assert!(!history.can_redo());

        history.push("m1", payload(1));
        history.push("m2", payload(2));
        history.push("m3", payload(3));
        assert_eq!(history.len(), 0); // buffered, not in the log

        history.end_batch().unwrap();
        assert_eq!(history.len(), 1);
        let composite = &history.actions()[0];
        assert_eq!(composite.description, "drag");
        match &composite.payload {
            ActionPayload::Batch { actions } => assert_eq!(actions.len(), 3),
            other => panic!("expected batch payload, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch_is_discarded() {
        let mut history = HistoryEngine::new(10);
        history.start_batch("noop").unwrap();
        assert!(history.end_batch().is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_reentrant_start_batch_is_rejected() {
        let mut history = HistoryEngine::new(10);
        history.start_batch("outer").unwrap();
        assert_eq!(history.start_batch("inner"), Err(HistoryError::BatchInProgress));

        // the original batch is still intact
        history.push("m1", payload(1));
        history.end_batch().unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_cancel_batch_discards_buffer() {
        let mut history = HistoryEngine::new(10);
        history.push("kept", payload(1));

        history.start_batch("drag").unwrap();
        history.push("m1", payload(2));
        history.cancel_batch();

        assert_eq!(history.len(), 1);
        assert!(!history.is_batching());
        assert!(history.can_undo());
    }

    #[test]
    fn test_shrink_max_size_drops_oldest() {
        let mut history = HistoryEngine::new(10);
        for n in 0..6 {
            history.push(format!("a{}", n), payload(n));
        }
        history.undo();
        history.undo(); // cursor at 4

        history.set_max_size(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.actions()[0].description, "a4");
        assert_eq!(history.current_index(), -1); // clamped, never below -1
    }

    #[test]
    fn test_change_property_payload_round_trips() {
        // sanity-check that payload data survives the log verbatim
        let mut history = HistoryEngine::new(10);
        history.push(
            "mute",
            ActionPayload::ChangeProperty {
                target: PropertyTarget::Track(3),
                old: PropertyValue::Muted(false),
                new: PropertyValue::Muted(true),
            },
        );
        let back = history.undo().unwrap();
        match back.payload {
            ActionPayload::ChangeProperty { old, new, .. } => {
                assert_eq!(old, PropertyValue::Muted(false));
                assert_eq!(new, PropertyValue::Muted(true));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
