//! Timeline viewport: zoom ladder, scroll offset, and pixel/time mapping.

use crate::core::time::{constants::NANOS_PER_SECOND, Time};

/// Active editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Razor,
    Hand,
    Zoom,
}

/// Fixed ladder of preset zoom scales (multiplier over the base scale).
pub const ZOOM_LADDER: [f64; 9] = [0.1, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0];

/// Index of the 1.0x entry in [`ZOOM_LADDER`].
const DEFAULT_ZOOM_INDEX: usize = 3;

/// Pixels per second of timeline at 1.0x zoom.
const BASE_PX_PER_SECOND: f64 = 100.0;

/// Viewport over the timeline: zoom level (bounded to the preset ladder)
/// and horizontal scroll offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom_index: usize,
    pub scroll_offset: Time,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            zoom_index: DEFAULT_ZOOM_INDEX,
            scroll_offset: 0,
        }
    }

    pub fn zoom(&self) -> f64 {
        ZOOM_LADDER[self.zoom_index]
    }

    /// Step one rung up the ladder. Saturates at the top.
    pub fn zoom_in(&mut self) {
        if self.zoom_index + 1 < ZOOM_LADDER.len() {
            self.zoom_index += 1;
        }
    }

    /// Step one rung down the ladder. Saturates at the bottom.
    pub fn zoom_out(&mut self) {
        self.zoom_index = self.zoom_index.saturating_sub(1);
    }

    pub fn set_scroll(&mut self, offset: Time) {
        self.scroll_offset = offset.max(0);
    }

    /// Nanoseconds of timeline represented by one pixel at the current zoom.
    pub fn time_per_pixel(&self) -> Time {
        let px_per_second = BASE_PX_PER_SECOND * self.zoom();
        (NANOS_PER_SECOND as f64 / px_per_second) as Time
    }

    /// Map a viewport x coordinate to a timeline position.
    pub fn pixel_to_time(&self, x: f64) -> Time {
        self.scroll_offset + (x * self.time_per_pixel() as f64) as Time
    }

    /// Map a timeline position to a viewport x coordinate.
    pub fn time_to_pixel(&self, t: Time) -> f64 {
        (t - self.scroll_offset) as f64 / self.time_per_pixel() as f64
    }

    /// Convert a pixel distance to a timeline distance (used for snap
    /// thresholds, which are specified in pixels).
    pub fn pixels_to_duration(&self, px: f64) -> Time {
        (px * self.time_per_pixel() as f64) as Time
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}
