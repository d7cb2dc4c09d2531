//! Renderer synchronization engine.
//!
//! Translates committed edit payloads into renderer handle operations while
//! keeping the clip<->handle bijection intact. Additions create and register
//! handles; removals unregister and release them; moves/trims/transforms
//! push deltas to the existing handle; split and merge destroy and recreate.
//!
//! Failure policy: if a handle operation fails, the engine restores the
//! handles it touched for that payload (best effort) and returns the error,
//! so the caller can refuse to commit the model mutation. Partial
//! application is not permitted.

use log::{error, warn};

use crate::history::{ActionPayload, EditAction};
use crate::model::{Clip, ClipId, Project, PropertyTarget, PropertyValue, Track};
use crate::sync::mapping::{MappingIssue, MappingStats, SpriteMap};
use crate::sync::renderer::{HandleDelta, Renderer, RendererError};

/// Error type for synchronization operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("renderer error: {0}")]
    Renderer(#[from] RendererError),
    #[error("no handle registered for clip {0}")]
    MissingHandle(ClipId),
    #[error("duplicate mapping for clip {0}")]
    DuplicateMapping(ClipId),
}

/// Owns the sprite mapping for one renderer session.
#[derive(Debug, Default)]
pub struct SyncEngine {
    map: SpriteMap,
}

impl SyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- protocol --------------------------------------------------------

    /// Apply a committed payload in the forward direction. `project` is the
    /// post-mutation snapshot, used to look up current clip state.
    pub fn apply(
        &mut self,
        payload: &ActionPayload,
        project: &Project,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        match payload {
            ActionPayload::AddClip { clip } => self.create_for(clip, renderer),
            ActionPayload::RemoveClip { clip } => self.destroy_for(clip.id, renderer),
            ActionPayload::MoveClip { clip_id, .. } => {
                self.push_placement(*clip_id, project, renderer)
            }
            ActionPayload::TrimClip { clip_id, .. } => {
                self.push_placement(*clip_id, project, renderer)?;
                self.push_trim(*clip_id, project, renderer)
            }
            ActionPayload::SplitClip {
                original,
                first,
                second,
            } => self.swap_handles(&[original.clone()], &[first.clone(), second.clone()], renderer),
            ActionPayload::MergeClips {
                first,
                second,
                merged,
            } => self.swap_handles(&[first.clone(), second.clone()], &[merged.clone()], renderer),
            ActionPayload::AddTrack { .. } | ActionPayload::ReorderTrack { .. } => Ok(()),
            ActionPayload::RemoveTrack { track, .. } => self.destroy_track_handles(track, renderer),
            ActionPayload::ChangeProperty { target, new, .. } => {
                self.push_property(*target, new, renderer)
            }
            ActionPayload::Batch { actions } => self.apply_batch(actions, project, renderer),
        }
    }

    /// Apply a payload in the inverse direction (undo). `project` is the
    /// post-undo snapshot.
    pub fn revert(
        &mut self,
        payload: &ActionPayload,
        project: &Project,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        match payload {
            ActionPayload::AddClip { clip } => self.destroy_for(clip.id, renderer),
            ActionPayload::RemoveClip { clip } => self.create_for(clip, renderer),
            ActionPayload::MoveClip { clip_id, .. } => {
                self.push_placement(*clip_id, project, renderer)
            }
            ActionPayload::TrimClip { clip_id, .. } => {
                self.push_placement(*clip_id, project, renderer)?;
                self.push_trim(*clip_id, project, renderer)
            }
            ActionPayload::SplitClip {
                original,
                first,
                second,
            } => self.swap_handles(&[first.clone(), second.clone()], &[original.clone()], renderer),
            ActionPayload::MergeClips {
                first,
                second,
                merged,
            } => self.swap_handles(&[merged.clone()], &[first.clone(), second.clone()], renderer),
            ActionPayload::AddTrack { track } => self.destroy_track_handles(track, renderer),
            ActionPayload::ReorderTrack { .. } => Ok(()),
            ActionPayload::RemoveTrack { track, .. } => {
                for clip in &track.clips {
                    self.create_for(clip, renderer)?;
                }
                Ok(())
            }
            ActionPayload::ChangeProperty { target, old, .. } => {
                self.push_property(*target, old, renderer)
            }
            ActionPayload::Batch { actions } => self.revert_batch(actions, project, renderer),
        }
    }

    /// Create handles for every clip already in the project (initial sync
    /// after load).
    pub fn realize_project(
        &mut self,
        project: &Project,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        for track in &project.tracks {
            for clip in &track.clips {
                self.create_for(clip, renderer)?;
            }
        }
        Ok(())
    }

    /// Release every handle. Required before a new renderer session starts.
    pub fn teardown(&mut self, renderer: &mut dyn Renderer) {
        for handle in self.map.drain_handles() {
            if let Err(e) = renderer.destroy_handle(handle) {
                warn!("teardown: failed to destroy handle {}: {}", handle, e);
            }
        }
    }

    // ----- diagnostics -----------------------------------------------------

    /// Consistency sweep of the mapping against the project's live clips.
    pub fn validate(&self, project: &Project) -> Vec<MappingIssue> {
        self.map.validate(&project.clip_ids())
    }

    pub fn stats(&self) -> MappingStats {
        self.map.stats()
    }

    pub fn mapping(&self) -> &SpriteMap {
        &self.map
    }

    // ----- handle operations -----------------------------------------------

    fn create_for(&mut self, clip: &Clip, renderer: &mut dyn Renderer) -> Result<(), SyncError> {
        let handle = renderer.create_handle(&clip.source, &clip.transform)?;
        if !self.map.register(clip.id, handle) {
            // should never happen under correct usage; release and report
            let _ = renderer.destroy_handle(handle);
            error!("duplicate mapping registration for clip {}", clip.id);
            return Err(SyncError::DuplicateMapping(clip.id));
        }
        Ok(())
    }

    fn destroy_for(&mut self, clip_id: ClipId, renderer: &mut dyn Renderer) -> Result<(), SyncError> {
        let handle = self
            .map
            .unregister(clip_id)
            .ok_or(SyncError::MissingHandle(clip_id))?;
        renderer.destroy_handle(handle)?;
        Ok(())
    }

    fn destroy_track_handles(
        &mut self,
        track: &Track,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        for clip in &track.clips {
            self.destroy_for(clip.id, renderer)?;
        }
        Ok(())
    }

    /// Destroy the handles of `out` and create handles for `in_`, restoring
    /// the originals if any creation fails.
    fn swap_handles(
        &mut self,
        out: &[Clip],
        in_: &[Clip],
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        for clip in out {
            self.destroy_for(clip.id, renderer)?;
        }
        let mut created: Vec<ClipId> = Vec::new();
        for clip in in_ {
            match self.create_for(clip, renderer) {
                Ok(()) => created.push(clip.id),
                Err(e) => {
                    // unwind this payload's effects before reporting
                    for id in created {
                        if let Err(cleanup) = self.destroy_for(id, renderer) {
                            warn!("rollback cleanup failed for clip {}: {}", id, cleanup);
                        }
                    }
                    for clip in out {
                        if let Err(cleanup) = self.create_for(clip, renderer) {
                            warn!("rollback restore failed for clip {}: {}", clip.id, cleanup);
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn push_placement(
        &mut self,
        clip_id: ClipId,
        project: &Project,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        let clip = project.clip(clip_id).ok_or(SyncError::MissingHandle(clip_id))?;
        let handle = self
            .map
            .handle_for(clip_id)
            .ok_or(SyncError::MissingHandle(clip_id))?;
        renderer.update_handle(
            handle,
            &HandleDelta::Placement {
                start_time: clip.start_time,
                duration: clip.duration,
            },
        )?;
        Ok(())
    }

    fn push_trim(
        &mut self,
        clip_id: ClipId,
        project: &Project,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        let clip = project.clip(clip_id).ok_or(SyncError::MissingHandle(clip_id))?;
        let handle = self
            .map
            .handle_for(clip_id)
            .ok_or(SyncError::MissingHandle(clip_id))?;
        renderer.update_handle(
            handle,
            &HandleDelta::TrimRange {
                trim_start: clip.trim_start,
                trim_end: clip.trim_end,
            },
        )?;
        Ok(())
    }

    fn push_property(
        &mut self,
        target: PropertyTarget,
        value: &PropertyValue,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        match (target, value) {
            (PropertyTarget::Clip(clip_id), PropertyValue::Transform(t)) => {
                let handle = self
                    .map
                    .handle_for(clip_id)
                    .ok_or(SyncError::MissingHandle(clip_id))?;
                renderer.update_handle(handle, &HandleDelta::Transform(*t))?;
                Ok(())
            }
            (PropertyTarget::Clip(clip_id), PropertyValue::Effects(effects)) => {
                let handle = self
                    .map
                    .handle_for(clip_id)
                    .ok_or(SyncError::MissingHandle(clip_id))?;
                renderer.update_handle(handle, &HandleDelta::Effects(effects.clone()))?;
                Ok(())
            }
            // track flags are composition concerns the renderer reads from
            // the project on its own schedule
            _ => Ok(()),
        }
    }

    fn apply_batch(
        &mut self,
        actions: &[EditAction],
        project: &Project,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        for (index, action) in actions.iter().enumerate() {
            if let Err(e) = self.apply(&action.payload, project, renderer) {
                // unwind the children already applied, newest first
                for done in actions[..index].iter().rev() {
                    if let Err(cleanup) = self.revert(&done.payload, project, renderer) {
                        warn!("batch rollback failed for '{}': {}", done.description, cleanup);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn revert_batch(
        &mut self,
        actions: &[EditAction],
        project: &Project,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SyncError> {
        for (index, action) in actions.iter().rev().enumerate() {
            if let Err(e) = self.revert(&action.payload, project, renderer) {
                // re-apply the children already reverted, oldest first
                let undone = actions.len() - index;
                for done in &actions[undone..] {
                    if let Err(cleanup) = self.apply(&done.payload, project, renderer) {
                        warn!("batch rollback failed for '{}': {}", done.description, cleanup);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::from_millis;
    use crate::model::{MediaKind, ProjectSettings, SourceRef};
    use crate::sync::renderer::{HeadlessRenderer, RendererConfig};

    fn setup() -> (SyncEngine, HeadlessRenderer, Project, ClipId) {
        let mut renderer = HeadlessRenderer::new();
        renderer.initialize(RendererConfig::default()).unwrap();

        let project = Project::new("test", ProjectSettings::default());
        let (project, track_id) = project.add_track(MediaKind::Video);
        let (project, clip_id) = project
            .add_clip(
                track_id,
                MediaKind::Video,
                SourceRef::new("a.mp4"),
                0,
                0,
                from_millis(4000),
            )
            .unwrap();

        let mut engine = SyncEngine::new();
        engine.realize_project(&project, &mut renderer).unwrap();
        (engine, renderer, project, clip_id)
    }

    #[test]
    fn test_realize_creates_one_handle_per_clip() {
        let (engine, renderer, project, _) = setup();
        assert_eq!(renderer.handle_count(), 1);
        assert_eq!(engine.stats().entries, 1);
        assert!(engine.validate(&project).is_empty());
    }

    #[test]
    fn test_remove_clip_releases_handle() {
        let (mut engine, mut renderer, project, clip_id) = setup();
        let (after, removed) = project.remove_clip(clip_id).unwrap();

        engine
            .apply(
                &ActionPayload::RemoveClip { clip: removed },
                &after,
                &mut renderer,
            )
            .unwrap();
        assert_eq!(renderer.handle_count(), 0);
        assert!(engine.validate(&after).is_empty());
    }

    #[test]
    fn test_split_recreates_handles() {
        let (mut engine, mut renderer, project, clip_id) = setup();
        let original = project.clip(clip_id).unwrap().clone();
        let (after, first, second) = project.split_clip(clip_id, from_millis(2000)).unwrap();

        let payload = ActionPayload::SplitClip {
            original,
            first,
            second,
        };
        engine.apply(&payload, &after, &mut renderer).unwrap();
        assert_eq!(renderer.handle_count(), 2);
        assert!(engine.validate(&after).is_empty());

        // undo restores the single original handle
        engine.revert(&payload, &project, &mut renderer).unwrap();
        assert_eq!(renderer.handle_count(), 1);
        assert!(engine.validate(&project).is_empty());
    }

    #[test]
    fn test_failed_creation_restores_mapping() {
        let (mut engine, mut renderer, project, clip_id) = setup();
        let original = project.clip(clip_id).unwrap().clone();
        let (after, first, second) = project.split_clip(clip_id, from_millis(2000)).unwrap();

        renderer.fail_next_create = true;
        let payload = ActionPayload::SplitClip {
            original,
            first,
            second,
        };
        let result = engine.apply(&payload, &after, &mut renderer);
        assert!(result.is_err());

        // mapping rolled back to the pre-split state
        assert_eq!(renderer.handle_count(), 1);
        assert!(engine.validate(&project).is_empty());
    }

    #[test]
    fn test_move_pushes_delta_without_recreating() {
        let (mut engine, mut renderer, project, clip_id) = setup();
        let handle_before = engine.mapping().handle_for(clip_id).unwrap();
        let (after_p, dest) = project.add_track(MediaKind::Video);
        let after = after_p.move_clip(clip_id, dest, from_millis(9000)).unwrap();

        engine
            .apply(
                &ActionPayload::MoveClip {
                    clip_id,
                    from_track: 0,
                    from_start: 0,
                    to_track: dest,
                    to_start: from_millis(9000),
                },
                &after,
                &mut renderer,
            )
            .unwrap();
        assert_eq!(engine.mapping().handle_for(clip_id), Some(handle_before));
        assert_eq!(renderer.handle_count(), 1);
    }

    #[test]
    fn test_failed_batch_revert_reapplies_reverted_children() {
        let (mut engine, mut renderer, project, clip_id) = setup();
        let original = project.clip(clip_id).unwrap().clone();
        let track_id = original.track_id;
        let (split_p, first, second) = project.split_clip(clip_id, from_millis(2000)).unwrap();
        let (after, extra_id) = split_p
            .add_clip(
                track_id,
                MediaKind::Video,
                SourceRef::new("b.mp4"),
                from_millis(5000),
                0,
                from_millis(1000),
            )
            .unwrap();
        let extra = after.clip(extra_id).unwrap().clone();

        let action = |id, payload: ActionPayload| EditAction {
            id,
            timestamp: 0,
            description: payload.label().to_string(),
            payload,
        };
        let batch = ActionPayload::Batch {
            actions: vec![
                action(
                    1,
                    ActionPayload::SplitClip {
                        original,
                        first,
                        second,
                    },
                ),
                action(2, ActionPayload::AddClip { clip: extra }),
            ],
        };
        engine.apply(&batch, &after, &mut renderer).unwrap();
        assert_eq!(renderer.handle_count(), 3);

        // the add reverts cleanly, then recreating the pre-split clip fails;
        // the add must be re-applied so the mapping matches the batch state
        renderer.fail_next_create = true;
        assert!(engine.revert(&batch, &project, &mut renderer).is_err());
        assert_eq!(renderer.handle_count(), 3);
        assert!(engine.validate(&after).is_empty());
    }

    #[test]
    fn test_teardown_releases_everything() {
        let (mut engine, mut renderer, _, _) = setup();
        engine.teardown(&mut renderer);
        assert_eq!(renderer.handle_count(), 0);
        assert_eq!(engine.stats().entries, 0);
    }
}
