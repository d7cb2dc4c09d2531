//! Clip data structure representing a segment of source media on a track.
//!
//! Key concepts:
//! - **Source time** (trim_start, trim_end): offsets into the source media
//! - **Timeline time** (start_time, start_time + duration): position on the
//!   global timeline
//! - These are independent - a clip can use source range [5s, 10s] but be
//!   placed at timeline time 0s.
//!
//! Invariant: `duration == trim_end - trim_start` at creation, preserved by
//! trimming and splitting.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::time::Time;

/// Unique identifier for a clip
pub type ClipId = u64;

/// Unique identifier for a track
pub type TrackId = u64;

/// Kind of media a clip or track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
    Text,
    Image,
}

/// Reference to a source media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub path: PathBuf,
    /// Which stream in the source file (0 = first video, 1 = first audio, ...)
    pub stream_index: usize,
}

impl SourceRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stream_index: 0,
        }
    }
}

/// Visual placement of a clip on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

/// A single effect applied to a clip. Parameters are enumerated per effect
/// so apply/undo paths can match exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Opacity(f32),
    Blur(f32),
    Brightness(f32),
    Volume(f32),
}

/// A clip is a placed, time-bounded reference to a media source on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub kind: MediaKind,
    /// Back-reference to the owning track, kept in step with track
    /// membership by every move.
    pub track_id: TrackId,
    /// Position on the global timeline (nanoseconds, >= 0).
    pub start_time: Time,
    /// Timeline duration (nanoseconds, > 0). Equals `trim_end - trim_start`.
    pub duration: Time,
    /// Offset into the source media where the clip begins.
    pub trim_start: Time,
    /// Offset into the source media where the clip ends.
    pub trim_end: Time,
    pub source: SourceRef,
    pub transform: Transform,
    pub effects: Vec<Effect>,
    pub selected: bool,
}

impl Clip {
    /// Create a new clip. Duration is derived from the trim range.
    ///
    /// Callers must have validated `trim_start < trim_end` and
    /// `start_time >= 0` (the project operations do).
    pub fn new(
        id: ClipId,
        kind: MediaKind,
        track_id: TrackId,
        source: SourceRef,
        start_time: Time,
        trim_start: Time,
        trim_end: Time,
    ) -> Self {
        debug_assert!(trim_start < trim_end, "clip trim range must be non-empty");
        debug_assert!(start_time >= 0, "clip start_time must be non-negative");

        Self {
            id,
            kind,
            track_id,
            start_time,
            duration: trim_end - trim_start,
            trim_start,
            trim_end,
            source,
            transform: Transform::default(),
            effects: Vec::new(),
            selected: false,
        }
    }

    /// End position on the timeline.
    pub fn end_time(&self) -> Time {
        self.start_time + self.duration
    }

    /// Check whether a timeline position lies strictly inside this clip's span.
    pub fn contains_strictly(&self, t: Time) -> bool {
        t > self.start_time && t < self.end_time()
    }

    /// Check whether a timeline position lies within this clip's span
    /// (inclusive bounds).
    pub fn contains(&self, t: Time) -> bool {
        t >= self.start_time && t <= self.end_time()
    }

    /// Split this clip at timeline position `t`, producing the two pieces.
    ///
    /// Returns `None` unless `t` is strictly inside the span. The pieces
    /// partition the original with no gap or overlap:
    /// `first.duration + second.duration == self.duration`, and the trim
    /// ranges partition `[trim_start, trim_end]` at the same offset.
    pub fn split_at(&self, t: Time, first_id: ClipId, second_id: ClipId) -> Option<(Clip, Clip)> {
        if !self.contains_strictly(t) {
            return None;
        }
        let offset = t - self.start_time;

        let mut first = self.clone();
        first.id = first_id;
        first.duration = offset;
        first.trim_end = self.trim_start + offset;
        first.selected = false;

        let mut second = self.clone();
        second.id = second_id;
        second.start_time = t;
        second.duration = self.duration - offset;
        second.trim_start = self.trim_start + offset;
        second.selected = false;

        Some((first, second))
    }

    /// Check whether `other` continues this clip seamlessly: same track,
    /// same source, adjacent on the timeline, and contiguous in source trim
    /// space. This is the precondition for merging.
    pub fn is_continuation(&self, other: &Clip) -> bool {
        self.track_id == other.track_id
            && self.source == other.source
            && self.kind == other.kind
            && self.end_time() == other.start_time
            && self.trim_end == other.trim_start
    }
}
