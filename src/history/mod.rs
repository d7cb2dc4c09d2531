//! Command history: reversible edit descriptors and the undo/redo engine.

pub mod action;
pub mod engine;

pub use action::{ActionId, ActionPayload, EditAction};
pub use engine::{HistoryEngine, HistoryError, DEFAULT_MAX_SIZE};
