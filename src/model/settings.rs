//! Project-level settings.

use serde::{Deserialize, Serialize};

/// Settings shared by every track in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub fps: f64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub sample_rate: u32,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            fps: 30.0,
            canvas_width: 1920,
            canvas_height: 1080,
            sample_rate: 48_000,
        }
    }
}
