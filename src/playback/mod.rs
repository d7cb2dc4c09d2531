//! Playback synchronization: a single authoritative time position shared
//! between the model playhead and the renderer clock.

pub mod controller;
pub mod state;

pub use controller::{PlaybackController, PlaybackEvent};
pub use state::{PlayState, TimeAuthority};
