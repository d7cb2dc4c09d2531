//! Media metadata/extraction boundary.
//!
//! Probing and thumbnailing delegate to an external engine; this module
//! only fixes the types crossing the boundary. Decoding itself is out of
//! scope.

use std::path::{Path, PathBuf};

use crate::core::time::Time;

/// Error type for media probing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    /// The file exists but the prober cannot read it yet.
    #[error("media not ready")]
    NotReady,
    #[error("unsupported format: {0}")]
    Unsupported(String),
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Metadata extracted from a media file. Fields that do not apply to the
/// media kind (e.g. sample rate for an image) are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub duration: Time,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
}

/// Reference to a generated thumbnail image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRef {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// The metadata/extraction boundary.
pub trait MediaProbe {
    /// Extract metadata for a file, or fail with a typed error.
    fn probe(&self, path: &Path) -> Result<MediaInfo, MediaError>;

    /// Generate a thumbnail for the frame at `at`.
    fn thumbnail(&self, path: &Path, at: Time) -> Result<ThumbnailRef, MediaError>;
}
