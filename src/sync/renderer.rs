//! Renderer boundary.
//!
//! The compositing engine is externally owned; this trait is the full
//! surface the editor touches. Engines with async internals block inside
//! their adapter, so by the time a call returns the handle exists and the
//! mapping may observe it.

use std::collections::HashMap;

use crate::core::id::IdGen;
use crate::core::time::Time;
use crate::model::{Effect, SourceRef, Transform};

/// Opaque renderer-owned handle ("sprite") for one clip's realization.
pub type HandleId = u64;

/// Error type for renderer operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RendererError {
    #[error("renderer is not initialized")]
    NotInitialized,
    #[error("unknown handle {0}")]
    UnknownHandle(HandleId),
    #[error("handle creation failed: {0}")]
    CreateFailed(String),
}

/// Initialization parameters for a renderer session.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            background: [0, 0, 0, 255],
        }
    }
}

/// Incremental update pushed to an existing handle.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleDelta {
    /// Timeline placement changed (move, or trim changing the span).
    Placement { start_time: Time, duration: Time },
    /// Source trim range changed.
    TrimRange { trim_start: Time, trim_end: Time },
    Transform(Transform),
    Effects(Vec<Effect>),
}

/// The rendering/compositing engine boundary.
pub trait Renderer {
    /// Prepare the renderer session. Blocks until the engine is ready.
    fn initialize(&mut self, config: RendererConfig) -> Result<(), RendererError>;

    fn create_handle(
        &mut self,
        source: &SourceRef,
        transform: &Transform,
    ) -> Result<HandleId, RendererError>;

    fn update_handle(&mut self, handle: HandleId, delta: &HandleDelta) -> Result<(), RendererError>;

    fn destroy_handle(&mut self, handle: HandleId) -> Result<(), RendererError>;

    /// Current position of the renderer's internal clock.
    fn get_time(&self) -> Time;

    fn set_time(&mut self, t: Time);

    fn play(&mut self);

    fn pause(&mut self);

    fn set_rate(&mut self, rate: f64);

    fn set_volume(&mut self, volume: f32);

    /// Tear down the session, releasing every handle and any partially
    /// acquired resources. Idempotent, and safe to call before
    /// `initialize` has completed.
    fn destroy(&mut self);
}

/// In-memory renderer used for tests and headless operation.
///
/// Tracks handles and clock state without doing any compositing. The clock
/// only advances when the test calls [`HeadlessRenderer::advance`].
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    initialized: bool,
    handles: HashMap<HandleId, (SourceRef, Transform)>,
    id_gen: IdGen,
    time: Time,
    playing: bool,
    rate: f64,
    volume: f32,
    /// When set, the next `create_handle` call fails once. Lets tests
    /// exercise the rollback path.
    pub fail_next_create: bool,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self {
            rate: 1.0,
            volume: 1.0,
            ..Self::default()
        }
    }

    /// Advance the internal clock, as wall time would during playback.
    pub fn advance(&mut self, dt: Time) {
        if self.playing {
            self.time += (dt as f64 * self.rate) as Time;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl Renderer for HeadlessRenderer {
    fn initialize(&mut self, _config: RendererConfig) -> Result<(), RendererError> {
        self.initialized = true;
        Ok(())
    }

    fn create_handle(
        &mut self,
        source: &SourceRef,
        transform: &Transform,
    ) -> Result<HandleId, RendererError> {
        if !self.initialized {
            return Err(RendererError::NotInitialized);
        }
        if self.fail_next_create {
            self.fail_next_create = false;
            return Err(RendererError::CreateFailed("simulated failure".into()));
        }
        let handle = self.id_gen.next_id();
        self.handles.insert(handle, (source.clone(), *transform));
        Ok(handle)
    }

    fn update_handle(&mut self, handle: HandleId, delta: &HandleDelta) -> Result<(), RendererError> {
        let entry = self
            .handles
            .get_mut(&handle)
            .ok_or(RendererError::UnknownHandle(handle))?;
        if let HandleDelta::Transform(t) = delta {
            entry.1 = *t;
        }
        Ok(())
    }

    fn destroy_handle(&mut self, handle: HandleId) -> Result<(), RendererError> {
        self.handles
            .remove(&handle)
            .map(|_| ())
            .ok_or(RendererError::UnknownHandle(handle))
    }

    fn get_time(&self) -> Time {
        self.time
    }

    fn set_time(&mut self, t: Time) {
        self.time = t;
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn destroy(&mut self) {
        // safe mid-initialization and on repeat calls
        self.handles.clear();
        self.playing = false;
        self.time = 0;
        self.initialized = false;
    }
}
