//! The editing session: ties the temporal model, history, interaction
//! state, renderer synchronization, and playback together behind one
//! command surface.

mod apply;
pub mod editor;

pub use editor::{EditorSession, SessionError, SessionEvent};
