//! Project snapshot: the temporal model root.
//!
//! Every mutating operation takes `&self` and returns a fresh snapshot, so
//! callers (history, sync) can hold prior snapshots without aliasing
//! hazards. Operations with unmet preconditions return `None` and the input
//! snapshot is untouched - invalid edits are silent no-ops, never errors.

use serde::{Deserialize, Serialize};

use crate::core::id::IdGen;
use crate::core::time::{now_millis, Time};
use crate::model::clip::{Clip, ClipId, Effect, MediaKind, SourceRef, TrackId, Transform};
use crate::model::settings::ProjectSettings;
use crate::model::track::Track;

/// Unique identifier for a project
pub type ProjectId = u64;

/// Property targets for change-property edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyTarget {
    Clip(ClipId),
    Track(TrackId),
}

/// Property values, enumerated so apply/undo paths match exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Transform(Transform),
    Effects(Vec<Effect>),
    Muted(bool),
    Visible(bool),
    Locked(bool),
}

/// A structural invariant violation found by [`Project::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ModelViolation {
    /// A track's `order` does not match its position in the track list.
    BadTrackOrder { track_id: TrackId, order: usize, expected: usize },
    /// A clip's back-reference names a track it is not stored on.
    BadClipBackRef { clip_id: ClipId, track_id: TrackId },
    /// A clip's duration differs from its trim range length.
    BadClipDuration { clip_id: ClipId },
    /// A clip has a negative start or an empty trim range.
    BadClipBounds { clip_id: ClipId },
}

/// The editable project: an ordered list of tracks holding clips.
///
/// Duration is always derived from the clips; it is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub tracks: Vec<Track>, // ordered by `order`, which equals the index
    pub settings: ProjectSettings,
    pub created_at: i64,  // unix millis
    pub modified_at: i64, // unix millis
    id_gen: IdGen,
}

impl Project {
    /// Create a new empty project.
    pub fn new(name: impl Into<String>, settings: ProjectSettings) -> Self {
        let now = now_millis();
        let mut id_gen = IdGen::new();
        let id = id_gen.next_id();
        Self {
            id,
            name: name.into(),
            tracks: Vec::new(),
            settings,
            created_at: now,
            modified_at: now,
            id_gen,
        }
    }

    // ----- queries ---------------------------------------------------------

    /// Total duration: max over all clips of `start_time + duration`, or 0.
    pub fn total_duration(&self) -> Time {
        self.tracks.iter().map(|t| t.duration()).max().unwrap_or(0)
    }

    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn clip(&self, clip_id: ClipId) -> Option<&Clip> {
        self.tracks.iter().find_map(|t| t.clip(clip_id))
    }

    /// Clips on a track, in start-time order. `None` if the track is unknown.
    pub fn clips_on_track(&self, track_id: TrackId) -> Option<&[Clip]> {
        self.track(track_id).map(|t| t.clips.as_slice())
    }

    /// All clip ids currently in the project.
    pub fn clip_ids(&self) -> Vec<ClipId> {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter().map(|c| c.id))
            .collect()
    }

    /// Full consistency sweep over model invariants. An empty report is the
    /// expected state after every operation.
    pub fn validate(&self) -> Vec<ModelViolation> {
        let mut report = Vec::new();
        for (index, track) in self.tracks.iter().enumerate() {
            if track.order != index {
                report.push(ModelViolation::BadTrackOrder {
                    track_id: track.id,
                    order: track.order,
                    expected: index,
                });
            }
            for clip in &track.clips {
                if clip.track_id != track.id {
                    report.push(ModelViolation::BadClipBackRef {
                        clip_id: clip.id,
                        track_id: clip.track_id,
                    });
                }
                if clip.duration != clip.trim_end - clip.trim_start {
                    report.push(ModelViolation::BadClipDuration { clip_id: clip.id });
                }
                if clip.start_time < 0 || clip.trim_start >= clip.trim_end {
                    report.push(ModelViolation::BadClipBounds { clip_id: clip.id });
                }
            }
        }
        report
    }

    // ----- track operations ------------------------------------------------

    /// Add an empty track of the given kind at the end of the track list.
    pub fn add_track(&self, kind: MediaKind) -> (Project, TrackId) {
        let mut next = self.clone();
        let track_id = next.id_gen.next_id();
        let order = next.tracks.len();
        next.tracks.push(Track::new(track_id, kind, order));
        next.touch();
        (next, track_id)
    }

    /// Re-insert a previously built track at a given order (undo of remove).
    pub fn insert_track(&self, track: Track, order: usize) -> Project {
        let mut next = self.clone();
        let order = order.min(next.tracks.len());
        next.tracks.insert(order, track);
        next.renumber_tracks();
        next.touch();
        next
    }

    /// Remove a track and everything on it. Returns the removed track so the
    /// caller can build an inverse payload.
    pub fn remove_track(&self, track_id: TrackId) -> Option<(Project, Track)> {
        let pos = self.tracks.iter().position(|t| t.id == track_id)?;
        let mut next = self.clone();
        let removed = next.tracks.remove(pos);
        next.renumber_tracks();
        next.touch();
        Some((next, removed))
    }

    /// Move a track to a new order, re-deriving all orders.
    /// `new_order` is clamped to the valid range.
    pub fn reorder_track(&self, track_id: TrackId, new_order: usize) -> Option<Project> {
        let pos = self.tracks.iter().position(|t| t.id == track_id)?;
        let mut next = self.clone();
        let track = next.tracks.remove(pos);
        let dest = new_order.min(next.tracks.len());
        next.tracks.insert(dest, track);
        next.renumber_tracks();
        next.touch();
        Some(next)
    }

    // ----- clip operations -------------------------------------------------

    /// Create a clip on a track. Returns `None` if the track does not exist
    /// or the bounds are invalid.
    #[allow(clippy::too_many_arguments)]
    pub fn add_clip(
        &self,
        track_id: TrackId,
        kind: MediaKind,
        source: SourceRef,
        start_time: Time,
        trim_start: Time,
        trim_end: Time,
    ) -> Option<(Project, ClipId)> {
        if start_time < 0 || trim_start < 0 || trim_start >= trim_end {
            return None;
        }
        self.track(track_id)?;
        let mut next = self.clone();
        let clip_id = next.id_gen.next_id();
        let clip = Clip::new(clip_id, kind, track_id, source, start_time, trim_start, trim_end);
        next.track_mut(track_id)?.insert_clip(clip);
        next.touch();
        Some((next, clip_id))
    }

    /// Re-insert a fully built clip onto its track (redo of add, undo of
    /// remove). The clip's `track_id` names the destination.
    pub fn insert_clip(&self, clip: Clip) -> Option<Project> {
        self.track(clip.track_id)?;
        let mut next = self.clone();
        next.track_mut(clip.track_id)?.insert_clip(clip);
        next.touch();
        Some(next)
    }

    /// Remove a clip. Returns the removed clip for inverse payloads.
    pub fn remove_clip(&self, clip_id: ClipId) -> Option<(Project, Clip)> {
        let track_id = self.clip(clip_id)?.track_id;
        let mut next = self.clone();
        let removed = next.track_mut(track_id)?.remove_clip(clip_id)?;
        next.touch();
        Some((next, removed))
    }

    /// Move a clip to a destination track and start time, reassigning the
    /// back-reference atomically with track membership.
    ///
    /// All-or-nothing: the destination is resolved before the clip is
    /// detached, so a nonexistent destination leaves the source untouched
    /// and returns `None`.
    pub fn move_clip(
        &self,
        clip_id: ClipId,
        dest_track: TrackId,
        new_start: Time,
    ) -> Option<Project> {
        if new_start < 0 {
            return None;
        }
        let src_track = self.clip(clip_id)?.track_id;
        self.track(dest_track)?;

        let mut next = self.clone();
        let mut clip = next.track_mut(src_track)?.remove_clip(clip_id)?;
        clip.track_id = dest_track;
        clip.start_time = new_start;
        next.track_mut(dest_track)?.insert_clip(clip);
        next.touch();
        Some(next)
    }

    /// Adjust a clip's trim range and timeline position. Duration is
    /// re-derived from the trim range so the invariant holds.
    pub fn trim_clip(
        &self,
        clip_id: ClipId,
        new_start_time: Time,
        new_trim_start: Time,
        new_trim_end: Time,
    ) -> Option<Project> {
        if new_start_time < 0 || new_trim_start < 0 || new_trim_start >= new_trim_end {
            return None;
        }
        let track_id = self.clip(clip_id)?.track_id;
        let mut next = self.clone();
        {
            let track = next.track_mut(track_id)?;
            let clip = track.clip_mut(clip_id)?;
            clip.start_time = new_start_time;
            clip.trim_start = new_trim_start;
            clip.trim_end = new_trim_end;
            clip.duration = new_trim_end - new_trim_start;
            track.resort();
        }
        next.touch();
        Some(next)
    }

    /// Split a clip at timeline position `t` (strictly inside its span).
    /// Returns the new snapshot and the two resulting clips.
    pub fn split_clip(&self, clip_id: ClipId, t: Time) -> Option<(Project, Clip, Clip)> {
        let original = self.clip(clip_id)?.clone();
        let mut next = self.clone();
        let first_id = next.id_gen.next_id();
        let second_id = next.id_gen.next_id();
        let (first, second) = original.split_at(t, first_id, second_id)?;
        {
            let track = next.track_mut(original.track_id)?;
            track.remove_clip(clip_id)?;
            track.insert_clip(first.clone());
            track.insert_clip(second.clone());
        }
        next.touch();
        Some((next, first, second))
    }

    /// Merge two adjacent clips of the same source back into one.
    /// Returns `None` unless `second` seamlessly continues `first`.
    pub fn merge_clips(&self, first_id: ClipId, second_id: ClipId) -> Option<(Project, Clip)> {
        let first = self.clip(first_id)?.clone();
        let second = self.clip(second_id)?.clone();
        if !first.is_continuation(&second) {
            return None;
        }

        let mut next = self.clone();
        let merged_id = next.id_gen.next_id();
        let mut merged = first.clone();
        merged.id = merged_id;
        merged.trim_end = second.trim_end;
        merged.duration = merged.trim_end - merged.trim_start;
        merged.selected = false;
        {
            let track = next.track_mut(first.track_id)?;
            track.remove_clip(first_id)?;
            track.remove_clip(second_id)?;
            track.insert_clip(merged.clone());
        }
        next.touch();
        Some((next, merged))
    }

    /// Replace one clip with a pair (redo of split, undo of merge). The pair
    /// must target the same track the original sits on.
    pub fn replace_clip_with_pair(
        &self,
        clip_id: ClipId,
        first: Clip,
        second: Clip,
    ) -> Option<Project> {
        let track_id = self.clip(clip_id)?.track_id;
        let mut next = self.clone();
        {
            let track = next.track_mut(track_id)?;
            track.remove_clip(clip_id)?;
            track.insert_clip(first);
            track.insert_clip(second);
        }
        next.touch();
        Some(next)
    }

    /// Replace a pair of clips with one (undo of split, redo of merge).
    pub fn replace_pair_with_clip(
        &self,
        first_id: ClipId,
        second_id: ClipId,
        merged: Clip,
    ) -> Option<Project> {
        let track_id = self.clip(first_id)?.track_id;
        self.clip(second_id)?;
        let mut next = self.clone();
        {
            let track = next.track_mut(track_id)?;
            track.remove_clip(first_id)?;
            track.remove_clip(second_id)?;
            track.insert_clip(merged);
        }
        next.touch();
        Some(next)
    }

    /// Apply a property change, returning the new snapshot and the previous
    /// value for the inverse payload.
    pub fn apply_property(
        &self,
        target: PropertyTarget,
        value: PropertyValue,
    ) -> Option<(Project, PropertyValue)> {
        let mut next = self.clone();
        let old = match (target, &value) {
            (PropertyTarget::Clip(id), PropertyValue::Transform(t)) => {
                let track_id = next.clip(id)?.track_id;
                let clip = next.track_mut(track_id)?.clip_mut(id)?;
                let old = PropertyValue::Transform(clip.transform);
                clip.transform = *t;
                old
            }
            (PropertyTarget::Clip(id), PropertyValue::Effects(effects)) => {
                let track_id = next.clip(id)?.track_id;
                let clip = next.track_mut(track_id)?.clip_mut(id)?;
                let old = PropertyValue::Effects(clip.effects.clone());
                clip.effects = effects.clone();
                old
            }
            (PropertyTarget::Track(id), PropertyValue::Muted(m)) => {
                let track = next.track_by_id_mut(id)?;
                let old = PropertyValue::Muted(track.muted);
                track.muted = *m;
                old
            }
            (PropertyTarget::Track(id), PropertyValue::Visible(v)) => {
                let track = next.track_by_id_mut(id)?;
                let old = PropertyValue::Visible(track.visible);
                track.visible = *v;
                old
            }
            (PropertyTarget::Track(id), PropertyValue::Locked(l)) => {
                let track = next.track_by_id_mut(id)?;
                let old = PropertyValue::Locked(track.locked);
                track.locked = *l;
                old
            }
            // flags on clips and per-clip values on tracks have no meaning
            (PropertyTarget::Clip(_), _)
            | (
                PropertyTarget::Track(_),
                PropertyValue::Transform(_) | PropertyValue::Effects(_),
            ) => return None,
        };
        next.touch();
        Some((next, old))
    }

    // ----- internals -------------------------------------------------------

    fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == track_id)
    }

    fn track_by_id_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.track_mut(track_id)
    }

    fn renumber_tracks(&mut self) {
        for (index, track) in self.tracks.iter_mut().enumerate() {
            track.order = index;
        }
    }

    fn touch(&mut self) {
        self.modified_at = now_millis();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::from_millis;

    fn project_with_clip() -> (Project, TrackId, ClipId) {
        let project = Project::new("test", ProjectSettings::default());
        let (project, track_id) = project.add_track(MediaKind::Video);
        let (project, clip_id) = project
            .add_clip(
                track_id,
                MediaKind::Video,
                SourceRef::new("a.mp4"),
                from_millis(1000),
                0,
                from_millis(4000),
            )
            .unwrap();
        (project, track_id, clip_id)
    }

    #[test]
    fn test_snapshot_semantics() {
        let (project, track_id, clip_id) = project_with_clip();
        let before = project.clone();

        let (after, _) = project.remove_clip(clip_id).unwrap();
        // prior snapshot is unaffected
        assert!(project.clip(clip_id).is_some());
        assert_eq!(project, before);
        assert!(after.clip(clip_id).is_none());
        assert!(after.track(track_id).is_some());
    }

    #[test]
    fn test_total_duration_is_derived() {
        let (project, track_id, _) = project_with_clip();
        assert_eq!(project.total_duration(), from_millis(5000));

        let (project, _) = project
            .add_clip(
                track_id,
                MediaKind::Video,
                SourceRef::new("b.mp4"),
                from_millis(20_000),
                0,
                from_millis(1000),
            )
            .unwrap();
        assert_eq!(project.total_duration(), from_millis(21_000));
    }

    #[test]
    fn test_track_orders_are_contiguous() {
        let project = Project::new("test", ProjectSettings::default());
        let (project, a) = project.add_track(MediaKind::Video);
        let (project, b) = project.add_track(MediaKind::Audio);
        let (project, c) = project.add_track(MediaKind::Text);

        let orders: Vec<usize> = project.tracks.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        let project = project.reorder_track(c, 0).unwrap();
        let ids: Vec<TrackId> = project.tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c, a, b]);
        let orders: Vec<usize> = project.tracks.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        let (project, removed) = project.remove_track(a).unwrap();
        assert_eq!(removed.id, a);
        let orders: Vec<usize> = project.tracks.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert!(project.validate().is_empty());
    }

    #[test]
    fn test_move_clip_reassigns_back_reference() {
        let (project, _, clip_id) = project_with_clip();
        let (project, dest) = project.add_track(MediaKind::Video);

        let project = project.move_clip(clip_id, dest, from_millis(7000)).unwrap();
        let clip = project.clip(clip_id).unwrap();
        assert_eq!(clip.track_id, dest);
        assert_eq!(clip.start_time, from_millis(7000));
        assert_eq!(project.clips_on_track(dest).unwrap().len(), 1);
        assert!(project.validate().is_empty());
    }

    #[test]
    fn test_move_to_missing_track_is_noop() {
        let (project, track_id, clip_id) = project_with_clip();
        let before = project.clone();

        assert!(project.move_clip(clip_id, 9999, from_millis(0)).is_none());
        // all-or-nothing: source track still owns the clip
        assert_eq!(project, before);
        assert_eq!(project.clips_on_track(track_id).unwrap().len(), 1);
    }

    #[test]
    fn test_split_replaces_clip_in_order() {
        let (project, track_id, clip_id) = project_with_clip();
        let (project, first, second) = project.split_clip(clip_id, from_millis(3000)).unwrap();

        assert!(project.clip(clip_id).is_none());
        let clips = project.clips_on_track(track_id).unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].id, first.id);
        assert_eq!(clips[1].id, second.id);
        assert_eq!(first.duration + second.duration, from_millis(4000));
        assert!(project.validate().is_empty());
    }

    #[test]
    fn test_split_at_boundary_is_empty_result() {
        let (project, _, clip_id) = project_with_clip();
        assert!(project.split_clip(clip_id, from_millis(1000)).is_none());
        assert!(project.split_clip(clip_id, from_millis(5000)).is_none());
    }

    #[test]
    fn test_merge_restores_split() {
        let (project, track_id, clip_id) = project_with_clip();
        let original = project.clip(clip_id).unwrap().clone();
        let (project, first, second) = project.split_clip(clip_id, from_millis(2000)).unwrap();

        let (project, merged) = project.merge_clips(first.id, second.id).unwrap();
        assert_eq!(merged.start_time, original.start_time);
        assert_eq!(merged.duration, original.duration);
        assert_eq!(merged.trim_start, original.trim_start);
        assert_eq!(merged.trim_end, original.trim_end);
        assert_eq!(project.clips_on_track(track_id).unwrap().len(), 1);
    }

    #[test]
    fn test_merge_rejects_non_adjacent() {
        let (project, track_id, a) = project_with_clip();
        let (project, b) = project
            .add_clip(
                track_id,
                MediaKind::Video,
                SourceRef::new("a.mp4"),
                from_millis(10_000),
                0,
                from_millis(1000),
            )
            .unwrap();
        assert!(project.merge_clips(a, b).is_none());
    }

    #[test]
    fn test_trim_preserves_duration_invariant() {
        let (project, _, clip_id) = project_with_clip();
        let project = project
            .trim_clip(clip_id, from_millis(1500), from_millis(500), from_millis(4000))
            .unwrap();
        let clip = project.clip(clip_id).unwrap();
        assert_eq!(clip.duration, from_millis(3500));
        assert_eq!(clip.duration, clip.trim_end - clip.trim_start);
        assert!(project.validate().is_empty());
    }

    #[test]
    fn test_invalid_trim_is_noop() {
        let (project, _, clip_id) = project_with_clip();
        assert!(project
            .trim_clip(clip_id, from_millis(1000), from_millis(4000), from_millis(4000))
            .is_none());
        assert!(project.trim_clip(9999, 0, 0, from_millis(1000)).is_none());
    }

    #[test]
    fn test_apply_property_returns_old_value() {
        let (project, track_id, _) = project_with_clip();
        let (project, old) = project
            .apply_property(PropertyTarget::Track(track_id), PropertyValue::Muted(true))
            .unwrap();
        assert_eq!(old, PropertyValue::Muted(false));
        assert!(project.track(track_id).unwrap().muted);
    }

    #[test]
    fn test_apply_effects_replaces_clip_stack() {
        let (project, _, clip_id) = project_with_clip();
        let effects = vec![Effect::Opacity(0.5), Effect::Blur(2.0)];
        let (project, old) = project
            .apply_property(
                PropertyTarget::Clip(clip_id),
                PropertyValue::Effects(effects.clone()),
            )
            .unwrap();
        assert_eq!(old, PropertyValue::Effects(Vec::new()));
        assert_eq!(project.clip(clip_id).unwrap().effects, effects);

        // effects only make sense on clips
        let track_id = project.clip(clip_id).unwrap().track_id;
        assert!(project
            .apply_property(PropertyTarget::Track(track_id), PropertyValue::Effects(vec![]))
            .is_none());
    }
}
