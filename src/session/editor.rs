//! Editing session: one project, one history log, one interaction state,
//! one sprite mapping, one playback controller, one renderer session.
//!
//! Sessions are explicitly constructed and self-contained; a process may
//! host several, each owning its own state. All mutations flow through
//! [`EditorSession::commit`], which applies renderer synchronization before
//! committing the model snapshot - if handle work fails, the model keeps
//! its previous state and nothing is recorded.

use std::path::{Path, PathBuf};

use log::{error, warn};

use crate::core::observer::{ObserverRegistry, SubscriptionToken};
use crate::core::time::Time;
use crate::history::{ActionPayload, HistoryEngine, HistoryError};
use crate::interaction::{snap, DragKind, InteractionState};
use crate::media::{MediaError, MediaProbe};
use crate::model::{
    ClipId, Effect, MediaKind, Project, ProjectSettings, PropertyTarget, PropertyValue, SourceRef,
    TrackId, Transform,
};
use crate::persist::{JsonProjectStore, PersistError};
use crate::playback::PlaybackController;
use crate::session::apply;
use crate::sync::mapping::{MappingIssue, MappingStats};
use crate::sync::renderer::{Renderer, RendererConfig, RendererError};
use crate::sync::{SyncEngine, SyncError};

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    #[error("renderer error: {0}")]
    Renderer(#[from] RendererError),
    #[error("media error: {0}")]
    Media(#[from] MediaError),
}

/// Coarse notifications for views observing the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ProjectChanged,
    HistoryChanged,
}

pub struct EditorSession<R: Renderer> {
    project: Project,
    history: HistoryEngine,
    interaction: InteractionState,
    sync: SyncEngine,
    playback: PlaybackController,
    renderer: R,
    events: ObserverRegistry<SessionEvent>,
    unsaved_changes: bool,
}

impl<R: Renderer> EditorSession<R> {
    /// Create a session around an empty project, initializing the renderer.
    pub fn new(
        name: impl Into<String>,
        settings: ProjectSettings,
        mut renderer: R,
        config: RendererConfig,
    ) -> Result<Self, SessionError> {
        renderer.initialize(config)?;
        Ok(Self {
            project: Project::new(name, settings),
            history: HistoryEngine::default(),
            interaction: InteractionState::new(),
            sync: SyncEngine::new(),
            playback: PlaybackController::new(),
            renderer,
            events: ObserverRegistry::new(),
            unsaved_changes: false,
        })
    }

    /// Create a session around a loaded project, realizing a handle for
    /// every existing clip.
    pub fn from_project(
        project: Project,
        mut renderer: R,
        config: RendererConfig,
    ) -> Result<Self, SessionError> {
        renderer.initialize(config)?;
        let mut sync = SyncEngine::new();
        sync.realize_project(&project, &mut renderer)?;
        Ok(Self {
            project,
            history: HistoryEngine::default(),
            interaction: InteractionState::new(),
            sync,
            playback: PlaybackController::new(),
            renderer,
            events: ObserverRegistry::new(),
            unsaved_changes: false,
        })
    }

    // ----- accessors -------------------------------------------------------

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn history(&self) -> &HistoryEngine {
        &self.history
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut InteractionState {
        &mut self.interaction
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    pub fn subscribe(&mut self) -> (SubscriptionToken, crossbeam::channel::Receiver<SessionEvent>) {
        self.events.subscribe()
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        self.events.unsubscribe(token)
    }

    // ----- track commands --------------------------------------------------

    pub fn add_track(&mut self, kind: MediaKind) -> Result<Option<TrackId>, SessionError> {
        let (next, track_id) = self.project.add_track(kind);
        let Some(track) = next.track(track_id).cloned() else {
            return Ok(None);
        };
        self.commit("Add track", next, ActionPayload::AddTrack { track })?;
        Ok(Some(track_id))
    }

    pub fn remove_track(&mut self, track_id: TrackId) -> Result<bool, SessionError> {
        let Some((next, removed)) = self.project.remove_track(track_id) else {
            return Ok(false);
        };
        let order = removed.order;
        self.commit(
            "Remove track",
            next,
            ActionPayload::RemoveTrack {
                track: removed,
                order,
            },
        )?;
        Ok(true)
    }

    pub fn reorder_track(&mut self, track_id: TrackId, new_order: usize) -> Result<bool, SessionError> {
        let Some(from_order) = self.project.track(track_id).map(|t| t.order) else {
            return Ok(false);
        };
        let Some(next) = self.project.reorder_track(track_id, new_order) else {
            return Ok(false);
        };
        let to_order = next.track(track_id).map(|t| t.order).unwrap_or(new_order);
        self.commit(
            "Reorder track",
            next,
            ActionPayload::ReorderTrack {
                track_id,
                from_order,
                to_order,
            },
        )?;
        Ok(true)
    }

    // ----- clip commands ---------------------------------------------------

    pub fn add_clip(
        &mut self,
        track_id: TrackId,
        kind: MediaKind,
        source: SourceRef,
        start_time: Time,
        trim_start: Time,
        trim_end: Time,
    ) -> Result<Option<ClipId>, SessionError> {
        let Some((next, clip_id)) =
            self.project
                .add_clip(track_id, kind, source, start_time, trim_start, trim_end)
        else {
            return Ok(None);
        };
        let Some(clip) = next.clip(clip_id).cloned() else {
            return Ok(None);
        };
        self.commit("Add clip", next, ActionPayload::AddClip { clip })?;
        Ok(Some(clip_id))
    }

    /// Probe a media file and place a clip covering its full duration.
    pub fn add_clip_from_media(
        &mut self,
        probe: &dyn MediaProbe,
        path: &Path,
        track_id: TrackId,
        at: Time,
    ) -> Result<Option<ClipId>, SessionError> {
        let Some(kind) = self.project.track(track_id).map(|t| t.kind) else {
            return Ok(None);
        };
        let info = probe.probe(path)?;
        self.add_clip(track_id, kind, SourceRef::new(path), at, 0, info.duration)
    }

    pub fn remove_clip(&mut self, clip_id: ClipId) -> Result<bool, SessionError> {
        let Some((next, removed)) = self.project.remove_clip(clip_id) else {
            return Ok(false);
        };
        self.commit("Remove clip", next, ActionPayload::RemoveClip { clip: removed })?;
        Ok(true)
    }

    pub fn move_clip(
        &mut self,
        clip_id: ClipId,
        dest_track: TrackId,
        new_start: Time,
    ) -> Result<bool, SessionError> {
        let Some(clip) = self.project.clip(clip_id) else {
            return Ok(false);
        };
        let (from_track, from_start) = (clip.track_id, clip.start_time);
        let Some(next) = self.project.move_clip(clip_id, dest_track, new_start) else {
            return Ok(false);
        };
        self.commit(
            "Move clip",
            next,
            ActionPayload::MoveClip {
                clip_id,
                from_track,
                from_start,
                to_track: dest_track,
                to_start: new_start,
            },
        )?;
        Ok(true)
    }

    pub fn trim_clip(
        &mut self,
        clip_id: ClipId,
        new_start_time: Time,
        new_trim_start: Time,
        new_trim_end: Time,
    ) -> Result<bool, SessionError> {
        let Some(clip) = self.project.clip(clip_id) else {
            return Ok(false);
        };
        let from_start = clip.start_time;
        let from_trim = (clip.trim_start, clip.trim_end);
        let Some(next) =
            self.project
                .trim_clip(clip_id, new_start_time, new_trim_start, new_trim_end)
        else {
            return Ok(false);
        };
        self.commit(
            "Trim clip",
            next,
            ActionPayload::TrimClip {
                clip_id,
                from_start,
                from_trim,
                to_start: new_start_time,
                to_trim: (new_trim_start, new_trim_end),
            },
        )?;
        Ok(true)
    }

    pub fn split_clip(
        &mut self,
        clip_id: ClipId,
        at: Time,
    ) -> Result<Option<(ClipId, ClipId)>, SessionError> {
        let Some(original) = self.project.clip(clip_id).cloned() else {
            return Ok(None);
        };
        let Some((next, first, second)) = self.project.split_clip(clip_id, at) else {
            return Ok(None);
        };
        let ids = (first.id, second.id);
        self.commit(
            "Split clip",
            next,
            ActionPayload::SplitClip {
                original,
                first,
                second,
            },
        )?;
        Ok(Some(ids))
    }

    pub fn merge_clips(
        &mut self,
        first_id: ClipId,
        second_id: ClipId,
    ) -> Result<Option<ClipId>, SessionError> {
        let (Some(first), Some(second)) = (
            self.project.clip(first_id).cloned(),
            self.project.clip(second_id).cloned(),
        ) else {
            return Ok(None);
        };
        let Some((next, merged)) = self.project.merge_clips(first_id, second_id) else {
            return Ok(None);
        };
        let merged_id = merged.id;
        self.commit(
            "Merge clips",
            next,
            ActionPayload::MergeClips {
                first,
                second,
                merged,
            },
        )?;
        Ok(Some(merged_id))
    }

    pub fn set_clip_transform(
        &mut self,
        clip_id: ClipId,
        transform: Transform,
    ) -> Result<bool, SessionError> {
        self.change_property(
            PropertyTarget::Clip(clip_id),
            PropertyValue::Transform(transform),
        )
    }

    pub fn set_clip_effects(
        &mut self,
        clip_id: ClipId,
        effects: Vec<Effect>,
    ) -> Result<bool, SessionError> {
        self.change_property(PropertyTarget::Clip(clip_id), PropertyValue::Effects(effects))
    }

    pub fn set_track_muted(&mut self, track_id: TrackId, muted: bool) -> Result<bool, SessionError> {
        self.change_property(PropertyTarget::Track(track_id), PropertyValue::Muted(muted))
    }

    pub fn set_track_visible(
        &mut self,
        track_id: TrackId,
        visible: bool,
    ) -> Result<bool, SessionError> {
        self.change_property(
            PropertyTarget::Track(track_id),
            PropertyValue::Visible(visible),
        )
    }

    pub fn set_track_locked(&mut self, track_id: TrackId, locked: bool) -> Result<bool, SessionError> {
        self.change_property(PropertyTarget::Track(track_id), PropertyValue::Locked(locked))
    }

    fn change_property(
        &mut self,
        target: PropertyTarget,
        value: PropertyValue,
    ) -> Result<bool, SessionError> {
        let Some((next, old)) = self.project.apply_property(target, value.clone()) else {
            return Ok(false);
        };
        self.commit(
            "Change property",
            next,
            ActionPayload::ChangeProperty {
                target,
                old,
                new: value,
            },
        )?;
        Ok(true)
    }

    // ----- gestures --------------------------------------------------------

    /// Open a history batch for a multi-step gesture. A second call before
    /// `end_gesture` is rejected.
    pub fn start_gesture(&mut self, description: impl Into<String>) -> Result<(), SessionError> {
        self.history.start_batch(description)?;
        Ok(())
    }

    /// Flush the open gesture as one undoable step.
    pub fn end_gesture(&mut self) {
        if self.history.end_batch().is_some() {
            self.events.emit(SessionEvent::HistoryChanged);
        }
    }

    /// Begin a drag over the given clips at a timeline position.
    pub fn start_drag(&mut self, kind: DragKind, clip_ids: Vec<ClipId>, at: Time) -> bool {
        self.interaction.drag.start(kind, clip_ids, at)
    }

    /// Update the live drag position, resolving snapping against clip
    /// edges, the playhead, and the grid. Returns the snapped time.
    pub fn update_drag(&mut self, to: Time, target_track: Option<TrackId>) -> Option<Time> {
        let exclude = self.interaction.drag.session()?.clip_ids.clone();
        let targets = snap::collect_targets(&self.project, self.playback.playhead(), &exclude);
        let InteractionState { drag, snap, .. } = &mut self.interaction;
        drag.update(to, target_track, snap, &targets)
    }

    /// Discard the drag with no model effect.
    pub fn cancel_drag(&mut self) {
        self.interaction.drag.cancel();
    }

    /// Commit the drag's accumulated delta as model mutations wrapped in a
    /// single history batch. Clips on locked tracks are left untouched.
    pub fn commit_drag(&mut self) -> Result<(), SessionError> {
        let Some(session) = self.interaction.drag.end() else {
            return Ok(());
        };
        let result = self.apply_drag(session);
        // close the gesture even on failure so already-applied steps stay
        // undoable as one unit
        if self.history.is_batching() {
            self.end_gesture();
        }
        result
    }

    fn apply_drag(&mut self, session: crate::interaction::DragSession) -> Result<(), SessionError> {
        let delta = session.delta();

        match session.kind {
            DragKind::Select => {
                self.interaction.selection.clear();
                for id in session.clip_ids {
                    self.interaction.selection.add(id);
                }
                return Ok(());
            }
            DragKind::Move => {
                self.start_gesture(format!("Move {} clip(s)", session.clip_ids.len()))?;
                for clip_id in &session.clip_ids {
                    let Some(clip) = self.project.clip(*clip_id).cloned() else {
                        continue;
                    };
                    let dest = session.target_track.unwrap_or(clip.track_id);
                    if self.is_locked(clip.track_id) || self.is_locked(dest) {
                        continue;
                    }
                    let new_start = (clip.start_time + delta).max(0);
                    self.move_clip(*clip_id, dest, new_start)?;
                }
            }
            DragKind::TrimStart => {
                self.start_gesture("Trim clip start")?;
                if let Some(clip) = session
                    .clip_ids
                    .first()
                    .and_then(|id| self.project.clip(*id).cloned())
                {
                    if !self.is_locked(clip.track_id) {
                        // clamp so the clip keeps a non-empty trim range
                        let new_trim_start =
                            (clip.trim_start + delta).clamp(0, clip.trim_end - 1);
                        let applied = new_trim_start - clip.trim_start;
                        self.trim_clip(
                            clip.id,
                            clip.start_time + applied,
                            new_trim_start,
                            clip.trim_end,
                        )?;
                    }
                }
            }
            DragKind::TrimEnd => {
                self.start_gesture("Trim clip end")?;
                if let Some(clip) = session
                    .clip_ids
                    .first()
                    .and_then(|id| self.project.clip(*id).cloned())
                {
                    if !self.is_locked(clip.track_id) {
                        let new_trim_end = (clip.trim_end + delta).max(clip.trim_start + 1);
                        self.trim_clip(clip.id, clip.start_time, clip.trim_start, new_trim_end)?;
                    }
                }
            }
            DragKind::Split => {
                self.start_gesture("Split clip")?;
                if let Some(clip_id) = session.clip_ids.first().copied() {
                    let locked = self
                        .project
                        .clip(clip_id)
                        .map(|c| self.is_locked(c.track_id))
                        .unwrap_or(true);
                    if !locked {
                        self.split_clip(clip_id, session.current_time)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn is_locked(&self, track_id: TrackId) -> bool {
        self.project.track(track_id).map(|t| t.locked).unwrap_or(false)
    }

    // ----- undo / redo -----------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Roll back the most recent action. Returns `false` if there was
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        let Some(action) = self.history.undo() else {
            return Ok(false);
        };
        let Some(prev) = apply::apply_inverse(&self.project, &action.payload) else {
            // never expected under correct usage; restore the cursor
            error!("undo: inverse application failed for '{}'", action.description);
            self.history.redo();
            return Ok(false);
        };
        if let Err(e) = self.sync.revert(&action.payload, &prev, &mut self.renderer) {
            self.history.redo();
            return Err(e.into());
        }
        self.project = prev;
        self.after_model_change();
        Ok(true)
    }

    /// Reapply the most recently undone action.
    pub fn redo(&mut self) -> Result<bool, SessionError> {
        let Some(action) = self.history.redo() else {
            return Ok(false);
        };
        let Some(next) = apply::apply_forward(&self.project, &action.payload) else {
            error!("redo: forward application failed for '{}'", action.description);
            self.history.undo();
            return Ok(false);
        };
        if let Err(e) = self.sync.apply(&action.payload, &next, &mut self.renderer) {
            self.history.undo();
            return Err(e.into());
        }
        self.project = next;
        self.after_model_change();
        Ok(true)
    }

    // ----- playback --------------------------------------------------------

    pub fn play(&mut self) {
        self.playback.play(&mut self.renderer);
    }

    pub fn pause(&mut self) {
        self.playback.pause(&mut self.renderer);
    }

    pub fn stop(&mut self) {
        self.playback.stop(&mut self.renderer);
    }

    pub fn seek_to(&mut self, t: Time) {
        let duration = self.project.total_duration();
        self.playback.seek_to(t, duration, &mut self.renderer);
    }

    /// Periodic playback tick: read the renderer clock back into the
    /// playhead.
    pub fn tick_playback(&mut self) {
        let duration = self.project.total_duration();
        self.playback.tick(duration, &mut self.renderer);
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.playback.set_looping(looping);
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.playback.set_rate(rate, &mut self.renderer);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.playback.set_volume(volume, &mut self.renderer);
    }

    // ----- diagnostics and persistence -------------------------------------

    /// Mapping consistency sweep; empty under correct usage.
    pub fn validate_mappings(&self) -> Vec<MappingIssue> {
        self.sync.validate(&self.project)
    }

    pub fn mapping_stats(&self) -> MappingStats {
        self.sync.stats()
    }

    /// Save the project. The unsaved-changes flag is cleared only when the
    /// store reports success.
    pub async fn save(&mut self, store: &JsonProjectStore) -> Result<PathBuf, PersistError> {
        let path = store.save(&self.project).await?;
        self.unsaved_changes = false;
        Ok(path)
    }

    /// Release every renderer handle and tear the renderer session down.
    /// Required before handing the renderer to a new session.
    pub fn teardown(&mut self) {
        if self.interaction.drag.is_dragging() {
            warn!("teardown with an active drag; discarding it");
            self.interaction.drag.cancel();
        }
        self.sync.teardown(&mut self.renderer);
        self.renderer.destroy();
    }

    // ----- internals -------------------------------------------------------

    fn commit(
        &mut self,
        description: &str,
        next: Project,
        payload: ActionPayload,
    ) -> Result<(), SessionError> {
        // synchronize first: a failed handle operation must leave the model
        // on its previous snapshot
        self.sync.apply(&payload, &next, &mut self.renderer)?;
        self.project = next;
        self.history.push(description, payload);
        self.after_model_change();
        self.events.emit(SessionEvent::HistoryChanged);
        Ok(())
    }

    fn after_model_change(&mut self) {
        self.unsaved_changes = true;
        let duration = self.project.total_duration();
        self.playback.reconcile_duration(duration, &mut self.renderer);
        let live = self.project.clip_ids();
        self.interaction.selection.prune(|id| live.contains(&id));
        self.events.emit(SessionEvent::ProjectChanged);
    }
}

impl<R: Renderer> Drop for EditorSession<R> {
    fn drop(&mut self) {
        self.sync.teardown(&mut self.renderer);
        self.renderer.destroy();
    }
}
