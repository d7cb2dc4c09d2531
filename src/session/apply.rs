//! Forward and inverse application of action payloads to project snapshots.
//!
//! Payloads carry fully-built entities, so reapplying an action after undo
//! reproduces the exact ids and state the original mutation created.

use crate::history::ActionPayload;
use crate::model::Project;

/// Apply a payload in the forward direction (redo). Returns the new
/// snapshot, or `None` if the project no longer satisfies the payload's
/// preconditions.
pub(crate) fn apply_forward(project: &Project, payload: &ActionPayload) -> Option<Project> {
    match payload {
        ActionPayload::AddClip { clip } => project.insert_clip(clip.clone()),
        ActionPayload::RemoveClip { clip } => project.remove_clip(clip.id).map(|(p, _)| p),
        ActionPayload::MoveClip {
            clip_id,
            to_track,
            to_start,
            ..
        } => project.move_clip(*clip_id, *to_track, *to_start),
        ActionPayload::TrimClip {
            clip_id,
            to_start,
            to_trim,
            ..
        } => project.trim_clip(*clip_id, *to_start, to_trim.0, to_trim.1),
        ActionPayload::SplitClip {
            original,
            first,
            second,
        } => project.replace_clip_with_pair(original.id, first.clone(), second.clone()),
        ActionPayload::MergeClips {
            first,
            second,
            merged,
        } => project.replace_pair_with_clip(first.id, second.id, merged.clone()),
        ActionPayload::AddTrack { track } => Some(project.insert_track(track.clone(), track.order)),
        ActionPayload::RemoveTrack { track, .. } => {
            project.remove_track(track.id).map(|(p, _)| p)
        }
        ActionPayload::ReorderTrack {
            track_id, to_order, ..
        } => project.reorder_track(*track_id, *to_order),
        ActionPayload::ChangeProperty { target, new, .. } => {
            project.apply_property(*target, new.clone()).map(|(p, _)| p)
        }
        ActionPayload::Batch { actions } => {
            let mut current = project.clone();
            for action in actions {
                current = apply_forward(&current, &action.payload)?;
            }
            Some(current)
        }
    }
}

/// Apply a payload's inverse (undo).
pub(crate) fn apply_inverse(project: &Project, payload: &ActionPayload) -> Option<Project> {
    match payload {
        ActionPayload::AddClip { clip } => project.remove_clip(clip.id).map(|(p, _)| p),
        ActionPayload::RemoveClip { clip } => project.insert_clip(clip.clone()),
        ActionPayload::MoveClip {
            clip_id,
            from_track,
            from_start,
            ..
        } => project.move_clip(*clip_id, *from_track, *from_start),
        ActionPayload::TrimClip {
            clip_id,
            from_start,
            from_trim,
            ..
        } => project.trim_clip(*clip_id, *from_start, from_trim.0, from_trim.1),
        ActionPayload::SplitClip {
            original,
            first,
            second,
        } => project.replace_pair_with_clip(first.id, second.id, original.clone()),
        ActionPayload::MergeClips {
            first,
            second,
            merged,
        } => project.replace_clip_with_pair(merged.id, first.clone(), second.clone()),
        ActionPayload::AddTrack { track } => project.remove_track(track.id).map(|(p, _)| p),
        ActionPayload::RemoveTrack { track, order } => {
            Some(project.insert_track(track.clone(), *order))
        }
        ActionPayload::ReorderTrack {
            track_id,
            from_order,
            ..
        } => project.reorder_track(*track_id, *from_order),
        ActionPayload::ChangeProperty { target, old, .. } => {
            project.apply_property(*target, old.clone()).map(|(p, _)| p)
        }
        ActionPayload::Batch { actions } => {
            let mut current = project.clone();
            for action in actions.iter().rev() {
                current = apply_inverse(&current, &action.payload)?;
            }
            Some(current)
        }
    }
}
