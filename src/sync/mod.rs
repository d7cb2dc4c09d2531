//! Renderer synchronization: the renderer boundary trait, the clip<->handle
//! bijection, and the engine that keeps them consistent across edits.

pub mod engine;
pub mod mapping;
pub mod renderer;

pub use engine::{SyncEngine, SyncError};
pub use mapping::{MappingIssue, MappingStats, SpriteMap};
pub use renderer::{HandleDelta, HandleId, HeadlessRenderer, Renderer, RendererConfig, RendererError};
