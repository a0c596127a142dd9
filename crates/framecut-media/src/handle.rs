//! Playable media handles.
//!
//! A `MediaHandle` wraps whatever the platform uses to decode and present a
//! video source. Seeks are asynchronous: the caller requests a target time
//! and polls for completion against a deadline. A timed-out seek means
//! "frame unavailable for this draw", never a fatal error.

use framecut_core::Raster;
use std::time::{Duration, Instant};

/// Readiness of a media handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaReady {
    /// Nothing known about the source yet.
    Nothing,
    /// Dimensions and duration are known, no frame decoded.
    Metadata,
    /// A frame for the current time is available.
    CurrentFrame,
}

/// Outcome of polling an in-flight seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekState {
    /// No seek in flight.
    Idle,
    /// Seek requested, frame not yet available.
    Pending,
    /// Seek finished; `current_frame` reflects the target time.
    Complete,
    /// The deadline passed before the seek finished.
    TimedOut,
}

/// A playable media source.
///
/// Implementations own the platform decoder. All methods are non-blocking;
/// long operations are modelled as request + poll.
pub trait MediaHandle: Send {
    /// Current readiness.
    fn ready(&self) -> MediaReady;

    /// Natural pixel dimensions of the source.
    fn natural_size(&self) -> (u32, u32);

    /// Source duration in seconds.
    fn duration(&self) -> f64;

    /// The source time of the currently presented frame.
    fn current_time(&self) -> f64;

    /// Begin an asynchronous seek to `time` with the given deadline.
    /// A new request supersedes any seek still in flight.
    fn request_seek(&mut self, time: f64, deadline: Instant);

    /// Poll the state of the most recent seek.
    fn poll_seek(&mut self, now: Instant) -> SeekState;

    /// The currently presented frame, if one is decoded.
    fn current_frame(&self) -> Option<&Raster>;
}

/// Default deadline for a single seek request.
pub const DEFAULT_SEEK_TIMEOUT: Duration = Duration::from_millis(500);
