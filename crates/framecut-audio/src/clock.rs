//! The playback clock.
//!
//! One logical clock (current time, rate, play state) drives both the
//! compositor's render loop and the audio scheduler. Seeking is a plain
//! shared-state write; the scheduler detects it by drift, not by an event.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// An immutable view of the clock at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSnapshot {
    pub time: f64,
    pub rate: f64,
    pub playing: bool,
}

/// Playback clock state.
#[derive(Debug)]
pub struct PlaybackClock {
    time: f64,
    rate: f64,
    playing: bool,
    last_advance: Option<Instant>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            rate: 1.0,
            playing: false,
            last_advance: None,
        }
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            time: self.time,
            rate: self.rate,
            playing: self.playing,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate.clamp(0.25, 4.0);
    }

    pub fn play(&mut self, now: Instant) {
        self.playing = true;
        self.last_advance = Some(now);
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.last_advance = None;
    }

    /// Jump to a time. Observed by both loops on their next pass.
    pub fn seek(&mut self, time: f64) {
        self.time = time.max(0.0);
    }

    /// Advance by wall-clock elapsed time at the current rate. Returns the
    /// new time. No-op while paused.
    pub fn advance(&mut self, now: Instant) -> f64 {
        if self.playing {
            if let Some(last) = self.last_advance {
                let elapsed = now.saturating_duration_since(last).as_secs_f64();
                self.time += elapsed * self.rate;
            }
            self.last_advance = Some(now);
        }
        self.time
    }

    /// Wrap back to a loop start once the end is reached. Returns true when
    /// a wrap happened — the scheduler will see it as a backward jump.
    pub fn wrap_loop(&mut self, loop_start: f64, loop_end: f64) -> bool {
        if self.playing && loop_end > loop_start && self.time >= loop_end {
            self.time = loop_start;
            true
        } else {
            false
        }
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

/// The clock behind a lock, shared between the engine and playback thread.
pub type SharedClock = Arc<Mutex<PlaybackClock>>;

/// Construct a fresh shared clock.
pub fn shared_clock() -> SharedClock {
    Arc::new(Mutex::new(PlaybackClock::new()))
}
