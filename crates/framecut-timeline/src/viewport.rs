//! Pixel↔time mapping and zoom/scroll state for the timeline strip.

use framecut_core::TimeRange;
use serde::{Deserialize, Serialize};

/// Zoom bounds, pixels per second.
pub const MIN_PIXELS_PER_SECOND: f64 = 2.0;
pub const MAX_PIXELS_PER_SECOND: f64 = 2_000.0;

/// Visible window over the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Timeline time at the left edge, seconds.
    pub scroll_time: f64,
    /// Zoom level.
    pub pixels_per_second: f64,
    /// Viewport width in pixels.
    pub width_px: f64,
}

impl Viewport {
    pub fn new(width_px: f64) -> Self {
        Self {
            scroll_time: 0.0,
            pixels_per_second: 60.0,
            width_px,
        }
    }

    /// Timeline time to viewport pixel x.
    #[inline]
    pub fn time_to_px(&self, time: f64) -> f64 {
        (time - self.scroll_time) * self.pixels_per_second
    }

    /// Viewport pixel x to timeline time.
    #[inline]
    pub fn px_to_time(&self, px: f64) -> f64 {
        self.scroll_time + px / self.pixels_per_second
    }

    /// The time range currently visible.
    pub fn visible_range(&self) -> TimeRange {
        TimeRange::new(self.scroll_time, self.width_px / self.pixels_per_second)
    }

    /// Scroll horizontally by a pixel delta. Never scrolls before zero.
    pub fn scroll_by_px(&mut self, dx: f64) {
        self.scroll_time = (self.scroll_time + dx / self.pixels_per_second).max(0.0);
    }

    /// Zoom by a factor, keeping the time under `anchor_px` stationary.
    pub fn zoom_by(&mut self, factor: f64, anchor_px: f64) {
        let anchor_time = self.px_to_time(anchor_px);
        self.pixels_per_second = (self.pixels_per_second * factor)
            .clamp(MIN_PIXELS_PER_SECOND, MAX_PIXELS_PER_SECOND);
        self.scroll_time = (anchor_time - anchor_px / self.pixels_per_second).max(0.0);
    }
}
