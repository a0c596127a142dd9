//! Frame rates and timeline time ranges.
//!
//! Timeline positions are continuous seconds (`f64`); frame rates are exact
//! rationals so frame quantization never accumulates floating-point error.
//! Interval checks come in two modes: continuous comparison within
//! [`TIME_EPSILON`], or quantization to integer frame indices when a frame
//! rate is known (floor for starts, ceil for ends) so clips that touch at a
//! frame boundary are never flagged as overlapping.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for continuous-time comparisons (seconds).
pub const TIME_EPSILON: f64 = 1e-6;

/// Slack absorbed when quantizing to frame indices, in frames. A start or
/// end within a thousandth of a frame of a boundary lands on that boundary,
/// so placements that are effectively adjacent are never flagged as
/// overlapping by float noise.
const FRAME_SNAP_EPSILON: f64 = 1e-3;

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Duration of a single frame in seconds.
    #[inline]
    pub fn frame_duration(self) -> f64 {
        self.denominator as f64 / self.numerator as f64
    }

    /// Quantize a time in seconds to a frame index, rounding down.
    ///
    /// Used for interval starts. A start sitting a hair before a frame
    /// boundary (within [`FRAME_SNAP_EPSILON`] frames) lands on it.
    pub fn frame_floor(self, seconds: f64) -> i64 {
        let frames = self.seconds_to_frames(seconds);
        (frames + FRAME_SNAP_EPSILON).floor() as i64
    }

    /// Quantize a time in seconds to a frame index, rounding up.
    ///
    /// Used for interval ends: an end mid-frame still claims that frame,
    /// while an end on (or a hair past) a boundary does not spill over.
    pub fn frame_ceil(self, seconds: f64) -> i64 {
        let frames = self.seconds_to_frames(seconds);
        (frames - FRAME_SNAP_EPSILON).ceil() as i64
    }

    /// Exact frame index of a time, as a float (frames since zero).
    fn seconds_to_frames(self, seconds: f64) -> f64 {
        // Multiply by the exact rational fps to keep integer rates exact.
        let rate = Rational64::new(self.numerator as i64, self.denominator as i64);
        seconds * (*rate.numer() as f64) / (*rate.denom() as f64)
    }

    /// Time in seconds of the given frame index.
    pub fn frame_to_seconds(self, frame: i64) -> f64 {
        frame as f64 * self.frame_duration()
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// A half-open time interval `[start, start + duration)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: f64,
    /// Duration of the range
    pub duration: f64,
}

impl TimeRange {
    /// Create a new time range from start and duration.
    #[inline]
    pub fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    /// Create a time range from start and end times.
    #[inline]
    pub fn from_start_end(start: f64, end: f64) -> Self {
        Self {
            start,
            duration: end - start,
        }
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(self) -> f64 {
        self.start + self.duration
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end()
    }

    /// Continuous-time overlap check within [`TIME_EPSILON`].
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end() - TIME_EPSILON && other.start < self.end() - TIME_EPSILON
    }

    /// Frame-quantized overlap check: starts floor, ends ceil, so intervals
    /// that are effectively adjacent at a frame boundary never intersect.
    pub fn overlaps_at_rate(self, other: Self, rate: FrameRate) -> bool {
        let a_start = rate.frame_floor(self.start);
        let a_end = rate.frame_ceil(self.end());
        let b_start = rate.frame_floor(other.start);
        let b_end = rate.frame_ceil(other.end());
        a_start < b_end && b_start < a_end
    }

    /// Compute the intersection of two ranges, if any.
    pub fn intersection(self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        if end - start > TIME_EPSILON {
            Some(Self::from_start_end(start, end))
        } else {
            None
        }
    }
}
