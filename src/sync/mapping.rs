//! Clip-to-sprite mapping: a strict bijection between live clips and
//! renderer handles, with a side-effect-free consistency sweep.

use std::collections::HashMap;

use crate::model::ClipId;
use crate::sync::renderer::HandleId;

/// One discrepancy found by [`SpriteMap::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingIssue {
    /// A live clip has no registered handle.
    ClipWithoutHandle(ClipId),
    /// A registered handle maps to a clip that no longer exists.
    HandleWithoutClip(HandleId),
}

/// Cardinality snapshot of the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingStats {
    pub entries: usize,
}

/// Bidirectional clip <-> handle map. Both directions are O(1).
#[derive(Debug, Default)]
pub struct SpriteMap {
    by_clip: HashMap<ClipId, HandleId>,
    by_handle: HashMap<HandleId, ClipId>,
}

impl SpriteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish a mapping entry. Duplicate registration of either side is
    /// rejected (returns `false`, map unchanged).
    pub fn register(&mut self, clip_id: ClipId, handle: HandleId) -> bool {
        if self.by_clip.contains_key(&clip_id) || self.by_handle.contains_key(&handle) {
            return false;
        }
        self.by_clip.insert(clip_id, handle);
        self.by_handle.insert(handle, clip_id);
        true
    }

    /// Remove a clip's entry, returning its handle so the caller can release
    /// it. Both directions are cleared together - no dangling references.
    pub fn unregister(&mut self, clip_id: ClipId) -> Option<HandleId> {
        let handle = self.by_clip.remove(&clip_id)?;
        self.by_handle.remove(&handle);
        Some(handle)
    }

    pub fn handle_for(&self, clip_id: ClipId) -> Option<HandleId> {
        self.by_clip.get(&clip_id).copied()
    }

    pub fn clip_for(&self, handle: HandleId) -> Option<ClipId> {
        self.by_handle.get(&handle).copied()
    }

    /// Full consistency sweep against the set of live clips. Reports every
    /// clip without a handle and every handle without a live clip as
    /// discrete entries. Read-only; callable at any time.
    pub fn validate(&self, live_clips: &[ClipId]) -> Vec<MappingIssue> {
        let mut issues = Vec::new();
        for &clip_id in live_clips {
            if !self.by_clip.contains_key(&clip_id) {
                issues.push(MappingIssue::ClipWithoutHandle(clip_id));
            }
        }
        for (&handle, clip_id) in &self.by_handle {
            if !live_clips.contains(clip_id) {
                issues.push(MappingIssue::HandleWithoutClip(handle));
            }
        }
        issues
    }

    pub fn stats(&self) -> MappingStats {
        MappingStats {
            entries: self.by_clip.len(),
        }
    }

    /// Drain every entry, yielding the handles for release during teardown.
    pub fn drain_handles(&mut self) -> Vec<HandleId> {
        self.by_clip.clear();
        self.by_handle.drain().map(|(handle, _)| handle).collect()
    }

    pub fn len(&self) -> usize {
        self.by_clip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_clip.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup_both_ways() {
        let mut map = SpriteMap::new();
        assert!(map.register(1, 100));
        assert_eq!(map.handle_for(1), Some(100));
        assert_eq!(map.clip_for(100), Some(1));
        assert_eq!(map.stats().entries, 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut map = SpriteMap::new();
        assert!(map.register(1, 100));
        assert!(!map.register(1, 200)); // duplicate clip
        assert!(!map.register(2, 100)); // duplicate handle
        assert_eq!(map.len(), 1);
        assert_eq!(map.handle_for(1), Some(100));
    }

    #[test]
    fn test_unregister_clears_both_directions() {
        let mut map = SpriteMap::new();
        map.register(1, 100);
        assert_eq!(map.unregister(1), Some(100));
        assert_eq!(map.handle_for(1), None);
        assert_eq!(map.clip_for(100), None);
        assert_eq!(map.unregister(1), None);
    }

    #[test]
    fn test_validate_reports_discrete_issues() {
        let mut map = SpriteMap::new();
        map.register(1, 100);
        map.register(2, 200);
        map.unregister(2);

        // clip 2 and 3 are live but unmapped; handle 100 maps to a dead clip
        let issues = map.validate(&[2, 3]);
        assert!(issues.contains(&MappingIssue::ClipWithoutHandle(2)));
        assert!(issues.contains(&MappingIssue::ClipWithoutHandle(3)));
        assert!(issues.contains(&MappingIssue::HandleWithoutClip(100)));
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_validate_clean_bijection() {
        let mut map = SpriteMap::new();
        map.register(1, 100);
        map.register(2, 200);
        assert!(map.validate(&[1, 2]).is_empty());
    }

    #[test]
    fn test_drain_for_teardown() {
        let mut map = SpriteMap::new();
        map.register(1, 100);
        map.register(2, 200);
        let mut handles = map.drain_handles();
        handles.sort_unstable();
        assert_eq!(handles, vec![100, 200]);
        assert!(map.is_empty());
    }
}
