//! Cutline: a timeline-based editing core.
//!
//! The crate is organized around an immutable-snapshot temporal model
//! (`model`), a reversible command history (`history`), transient
//! interaction state (`interaction`), a renderer synchronization layer
//! keeping clip-to-handle mappings bijective (`sync`), playback time
//! arbitration (`playback`), and an `EditorSession` (`session`) that ties
//! them together behind one command surface. `ui` is a thin egui shell
//! over a session.

pub mod core;
pub mod export;
pub mod history;
pub mod interaction;
pub mod media;
pub mod model;
pub mod persist;
pub mod playback;
pub mod session;
pub mod sync;
pub mod ui;
