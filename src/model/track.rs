//! Track data structure: an ordered lane of clips of one media kind.

use serde::{Deserialize, Serialize};

use crate::core::time::Time;
use crate::model::clip::{Clip, ClipId, MediaKind, TrackId};

/// A track contains clips arranged on the timeline.
///
/// Clips are stored sorted by `start_time`. Overlap is not enforced here
/// (non-overlapping is a convention the interaction layer maintains).
/// `order` is the track's zero-based position within the project; the
/// project re-derives all orders on insertion, removal, and reorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub kind: MediaKind,
    pub order: usize,
    pub visible: bool,
    pub muted: bool,
    pub locked: bool,
    pub clips: Vec<Clip>, // sorted by start_time
}

impl Track {
    /// Create a new empty track.
    pub fn new(id: TrackId, kind: MediaKind, order: usize) -> Self {
        Self {
            id,
            kind,
            order,
            visible: true,
            muted: false,
            locked: false,
            clips: Vec::new(),
        }
    }

    /// Insert a clip, keeping the list sorted by `start_time`.
    pub fn insert_clip(&mut self, clip: Clip) {
        let pos = self
            .clips
            .partition_point(|c| c.start_time <= clip.start_time);
        self.clips.insert(pos, clip);
    }

    /// Remove a clip by id. Returns the removed clip if found.
    pub fn remove_clip(&mut self, clip_id: ClipId) -> Option<Clip> {
        let pos = self.clips.iter().position(|c| c.id == clip_id)?;
        Some(self.clips.remove(pos))
    }

    /// Look up a clip by id.
    pub fn clip(&self, clip_id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    /// Mutable lookup of a clip by id.
    pub fn clip_mut(&mut self, clip_id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == clip_id)
    }

    /// Find the clip at a given timeline position.
    pub fn clip_at(&self, t: Time) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.contains(t))
    }

    /// End time of the last clip, or 0 for an empty track.
    pub fn duration(&self) -> Time {
        self.clips.iter().map(|clip| clip.end_time()).max().unwrap_or(0)
    }

    /// Re-sort clips after an in-place start_time change.
    pub fn resort(&mut self) {
        self.clips.sort_by_key(|c| c.start_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::from_millis;
    use crate::model::clip::SourceRef;

    fn clip(id: ClipId, start_ms: i64, len_ms: i64) -> Clip {
        Clip::new(
            id,
            MediaKind::Video,
            1,
            SourceRef::new("test.mp4"),
            from_millis(start_ms),
            0,
            from_millis(len_ms),
        )
    }

    #[test]
    fn test_track_creation() {
        let track = Track::new(1, MediaKind::Video, 0);
        assert_eq!(track.clips.len(), 0);
        assert!(track.visible);
        assert!(!track.muted);
        assert!(!track.locked);
    }

    #[test]
    fn test_insert_keeps_sorted_order() {
        let mut track = Track::new(1, MediaKind::Video, 0);
        track.insert_clip(clip(1, 20_000, 5000));
        track.insert_clip(clip(2, 0, 5000));
        track.insert_clip(clip(3, 10_000, 5000));

        let ids: Vec<ClipId> = track.clips.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_remove_clip() {
        let mut track = Track::new(1, MediaKind::Video, 0);
        track.insert_clip(clip(1, 0, 5000));

        let removed = track.remove_clip(1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(track.remove_clip(1).is_none());
        assert!(track.clips.is_empty());
    }

    #[test]
    fn test_clip_at() {
        let mut track = Track::new(1, MediaKind::Video, 0);
        track.insert_clip(clip(1, 1000, 2000));

        assert!(track.clip_at(from_millis(1500)).is_some());
        assert!(track.clip_at(from_millis(500)).is_none());
    }

    #[test]
    fn test_duration() {
        let mut track = Track::new(1, MediaKind::Video, 0);
        assert_eq!(track.duration(), 0);

        track.insert_clip(clip(1, 0, 2000));
        track.insert_clip(clip(2, 5000, 3000));
        assert_eq!(track.duration(), from_millis(8000));
    }
}
