//! Export boundary: settings and their pre-encode validation. Encoding
//! itself is delegated to an external engine and out of scope here.

pub mod settings;

pub use settings::{
    AudioCodec, ExportFormat, ExportSettings, ExportValidationError, VideoCodec,
};
