//! Playback state machine and time authority.

/// Which clock is authoritative for the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAuthority {
    /// The editable playhead: authoritative while scrubbing, paused, or
    /// stopped.
    Playhead,
    /// The renderer's internal clock: authoritative while actively playing.
    RendererClock,
}

/// Transport state mirrored from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlayState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayState::Playing)
    }

    /// The authoritative time source in this state.
    pub fn authority(&self) -> TimeAuthority {
        if self.is_playing() {
            TimeAuthority::RendererClock
        } else {
            TimeAuthority::Playhead
        }
    }
}
