//! Clip selection, ordered by insertion so "last selected" is meaningful.

use crate::model::ClipId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    clip_ids: Vec<ClipId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single clip.
    pub fn select(&mut self, clip_id: ClipId) {
        self.clip_ids.clear();
        self.clip_ids.push(clip_id);
    }

    /// Add a clip to the selection if not already present.
    pub fn add(&mut self, clip_id: ClipId) {
        if !self.contains(clip_id) {
            self.clip_ids.push(clip_id);
        }
    }

    /// Toggle a clip's membership.
    pub fn toggle(&mut self, clip_id: ClipId) {
        if self.contains(clip_id) {
            self.remove(clip_id);
        } else {
            self.clip_ids.push(clip_id);
        }
    }

    pub fn remove(&mut self, clip_id: ClipId) {
        self.clip_ids.retain(|id| *id != clip_id);
    }

    /// Drop selected ids the predicate rejects, keeping order. Used after
    /// model mutations so the selection never names a deleted clip.
    pub fn prune(&mut self, keep: impl Fn(ClipId) -> bool) {
        self.clip_ids.retain(|id| keep(*id));
    }

    pub fn clear(&mut self) {
        self.clip_ids.clear();
    }

    pub fn contains(&self, clip_id: ClipId) -> bool {
        self.clip_ids.contains(&clip_id)
    }

    /// Most recently selected clip, if any.
    pub fn last_selected(&self) -> Option<ClipId> {
        self.clip_ids.last().copied()
    }

    pub fn ids(&self) -> &[ClipId] {
        &self.clip_ids
    }

    pub fn len(&self) -> usize {
        self.clip_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clip_ids.is_empty()
    }
}
