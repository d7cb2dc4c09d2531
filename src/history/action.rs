//! Edit action descriptors.
//!
//! Each variant carries both the forward data and everything needed to
//! invert it, so undo never has to consult state that the edit already
//! destroyed.

use serde::{Deserialize, Serialize};

use crate::core::time::Time;
use crate::model::{Clip, ClipId, PropertyTarget, PropertyValue, Track, TrackId};

/// Unique identifier for an edit action
pub type ActionId = u64;

/// Payload of a single reversible edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionPayload {
    AddClip {
        clip: Clip,
    },
    RemoveClip {
        clip: Clip,
    },
    MoveClip {
        clip_id: ClipId,
        from_track: TrackId,
        from_start: Time,
        to_track: TrackId,
        to_start: Time,
    },
    TrimClip {
        clip_id: ClipId,
        from_start: Time,
        from_trim: (Time, Time),
        to_start: Time,
        to_trim: (Time, Time),
    },
    SplitClip {
        original: Clip,
        first: Clip,
        second: Clip,
    },
    MergeClips {
        first: Clip,
        second: Clip,
        merged: Clip,
    },
    AddTrack {
        track: Track,
    },
    RemoveTrack {
        track: Track,
        order: usize,
    },
    ReorderTrack {
        track_id: TrackId,
        from_order: usize,
        to_order: usize,
    },
    ChangeProperty {
        target: PropertyTarget,
        old: PropertyValue,
        new: PropertyValue,
    },
    /// A group of edits committed and undone as one unit.
    Batch {
        actions: Vec<EditAction>,
    },
}

impl ActionPayload {
    /// Short label for logging and history display.
    pub fn label(&self) -> &'static str {
        match self {
            ActionPayload::AddClip { .. } => "add clip",
            ActionPayload::RemoveClip { .. } => "remove clip",
            ActionPayload::MoveClip { .. } => "move clip",
            ActionPayload::TrimClip { .. } => "trim clip",
            ActionPayload::SplitClip { .. } => "split clip",
            ActionPayload::MergeClips { .. } => "merge clips",
            ActionPayload::AddTrack { .. } => "add track",
            ActionPayload::RemoveTrack { .. } => "remove track",
            ActionPayload::ReorderTrack { .. } => "reorder track",
            ActionPayload::ChangeProperty { .. } => "change property",
            ActionPayload::Batch { .. } => "batch",
        }
    }
}

/// A recorded, reversible edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditAction {
    pub id: ActionId,
    /// Wall-clock unix millis when the edit was recorded.
    pub timestamp: i64,
    /// Human-readable description ("Move 3 clips").
    pub description: String,
    pub payload: ActionPayload,
}
