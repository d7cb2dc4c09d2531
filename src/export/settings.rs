//! Export settings and pre-encode validation.
//!
//! Validation returns the full list of problems (empty = valid) so the
//! caller can surface them all at once before any encoding is attempted.

use std::fmt;

/// Container format for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Mp4,
    WebM,
    Gif,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    H264,
    Vp9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    Aac,
    Opus,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Mp4 => write!(f, "mp4"),
            ExportFormat::WebM => write!(f, "webm"),
            ExportFormat::Gif => write!(f, "gif"),
        }
    }
}

/// One validation problem. The boundary reports all of them, not the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportValidationError {
    #[error("resolution must be non-zero")]
    ZeroResolution,
    #[error("H.264 requires even dimensions ({0}x{1})")]
    OddDimensions(u32, u32),
    #[error("frame rate {0} is outside (0, 240]")]
    InvalidFps(u32),
    #[error("quality {0} is outside 1..=100")]
    InvalidQuality(u8),
    #[error("bitrate must be non-zero")]
    ZeroBitrate,
    #[error("sample rate {0} is not supported")]
    UnsupportedSampleRate(u32),
    #[error("codec not available in {0} containers")]
    CodecMismatch(ExportFormat),
}

/// Full set of export parameters, validated before any encoding starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// 1..=100
    pub quality: u8,
    pub video_bitrate: u64, // bits per second
    pub audio_bitrate: u64, // bits per second
    pub sample_rate: u32,
    pub channels: u32,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Mp4,
            width: 1920,
            height: 1080,
            fps: 30,
            quality: 80,
            video_bitrate: 5_000_000, // 5 Mbps
            audio_bitrate: 192_000,   // 192 kbps
            sample_rate: 48_000,
            channels: 2,
            video_codec: VideoCodec::H264,
            audio_codec: AudioCodec::Aac,
        }
    }
}

const SUPPORTED_SAMPLE_RATES: [u32; 4] = [22_050, 44_100, 48_000, 96_000];

impl ExportSettings {
    /// 720p preset with a lower bitrate.
    pub fn preset_720p() -> Self {
        Self {
            width: 1280,
            height: 720,
            video_bitrate: 2_500_000,
            ..Self::default()
        }
    }

    /// Validate the settings, returning every problem found. An empty list
    /// means the settings are encodable.
    pub fn validate(&self) -> Vec<ExportValidationError> {
        let mut errors = Vec::new();

        if self.width == 0 || self.height == 0 {
            errors.push(ExportValidationError::ZeroResolution);
        } else if self.video_codec == VideoCodec::H264
            && (self.width % 2 != 0 || self.height % 2 != 0)
        {
            errors.push(ExportValidationError::OddDimensions(self.width, self.height));
        }

        if self.fps == 0 || self.fps > 240 {
            errors.push(ExportValidationError::InvalidFps(self.fps));
        }

        if self.quality == 0 || self.quality > 100 {
            errors.push(ExportValidationError::InvalidQuality(self.quality));
        }

        if self.video_bitrate == 0 || (self.format != ExportFormat::Gif && self.audio_bitrate == 0)
        {
            errors.push(ExportValidationError::ZeroBitrate);
        }

        if self.format != ExportFormat::Gif
            && !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate)
        {
            errors.push(ExportValidationError::UnsupportedSampleRate(self.sample_rate));
        }

        let codecs_ok = match self.format {
            ExportFormat::Mp4 => {
                self.video_codec == VideoCodec::H264 && self.audio_codec == AudioCodec::Aac
            }
            ExportFormat::WebM => {
                self.video_codec == VideoCodec::Vp9 && self.audio_codec == AudioCodec::Opus
            }
            // gif ignores codecs entirely
            ExportFormat::Gif => true,
        };
        if !codecs_ok {
            errors.push(ExportValidationError::CodecMismatch(self.format));
        }

        errors
    }
}
