//! The drift-corrected audio scheduler.
//!
//! Runs on a fixed-interval tick plus on-demand triggers. Each tick
//! reconciles the active voice set with the timeline at the clock's current
//! time:
//! - a clip with no voice gets one started at the correct in-buffer offset,
//!   playing for min(remaining clip, remaining buffer) — unless its buffer
//!   is not decoded yet, which is a silent buffer miss retried next tick
//! - a clip with a live voice only has its gain updated; volume changes
//!   never restart a voice
//! - voices for clips no longer active are stopped and disconnected
//!
//! Seeks have no event channel: playback time is written by scrubbing,
//! programmatic seeks, and loop wraparound alike, so the scheduler compares
//! the observed clock delta against the wall-clock-expected delta. A
//! backward jump, or a forward jump past a threshold whose drift also
//! exceeds a tolerance, forces a full reschedule — rate-limited so a burst
//! of scrub writes cannot thrash the graph.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use framecut_timeline::{find_clip_at_time, Clip, ChangeEvent, Track, TrackKind};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::cache::BufferCache;
use crate::clock::ClockSnapshot;
use crate::graph::{AudioGraph, VoiceId, VoiceSpec};

/// Drift-detection and rate-limit tuning.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Forward jumps larger than this (seconds) are seek candidates.
    pub forward_jump_threshold: f64,
    /// How far the observed delta may drift from the wall-clock-expected
    /// delta before a forward jump counts as a seek (seconds).
    pub drift_tolerance: f64,
    /// Minimum spacing between drift-triggered reschedules.
    pub min_reschedule_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            forward_jump_threshold: 0.3,
            drift_tolerance: 0.15,
            min_reschedule_interval: Duration::from_millis(250),
        }
    }
}

/// Synchronous stop signal, honored before and during any tick.
#[derive(Debug, Clone, Default)]
pub struct ForceStop(Arc<AtomicBool>);

impl ForceStop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. The scheduler pre-empts any in-flight tick at its
    /// next voice boundary and stops everything.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct ActiveVoice {
    voice: VoiceId,
    gain: f32,
}

struct TickStamp {
    clock_time: f64,
    wall: Instant,
}

/// Reconciles native audio voices with the timeline.
pub struct AudioScheduler {
    graph: Box<dyn AudioGraph>,
    cache: Arc<BufferCache>,
    config: SchedulerConfig,
    /// clip id → its live voice. The voice id doubles as a generation tag:
    /// a completion callback for a replaced voice no longer matches and is
    /// discarded.
    active: HashMap<Uuid, ActiveVoice>,
    changes: Option<Receiver<ChangeEvent>>,
    force_stop: ForceStop,
    last_tick: Option<TickStamp>,
    last_reschedule: Option<Instant>,
    model_dirty: bool,
    foreground: bool,
}

impl AudioScheduler {
    pub fn new(graph: Box<dyn AudioGraph>, cache: Arc<BufferCache>) -> Self {
        Self::with_config(graph, cache, SchedulerConfig::default())
    }

    pub fn with_config(
        graph: Box<dyn AudioGraph>,
        cache: Arc<BufferCache>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            graph,
            cache,
            config,
            active: HashMap::new(),
            changes: None,
            force_stop: ForceStop::new(),
            last_tick: None,
            last_reschedule: None,
            model_dirty: false,
            foreground: true,
        }
    }

    /// Subscribe to model change notifications; clip/track edits trigger a
    /// rebuild on the next tick.
    pub fn observe(&mut self, changes: Receiver<ChangeEvent>) {
        self.changes = Some(changes);
    }

    /// Handle other threads can use to pre-empt scheduling synchronously.
    pub fn force_stop_handle(&self) -> ForceStop {
        self.force_stop.clone()
    }

    /// Adopt an externally created force-stop handle (the controller hands
    /// the same handle to its callers before the scheduler thread starts).
    pub fn use_force_stop(&mut self, handle: ForceStop) {
        self.force_stop = handle;
    }

    /// Number of live voices (tests and diagnostics).
    pub fn active_voice_count(&self) -> usize {
        self.active.len()
    }

    /// One scheduling pass. Runs on the fixed-interval timer and on demand.
    pub fn tick(&mut self, tracks: &[Track], clips: &[Clip], clock: ClockSnapshot, now: Instant) {
        if self.force_stop.is_raised() {
            self.stop_all();
            self.force_stop.clear();
            self.last_tick = None;
            return;
        }

        self.drain_changes();

        if !clock.playing || !self.foreground {
            self.stop_all();
            self.last_tick = None;
            return;
        }

        let mut rebuild = self.model_dirty;
        self.model_dirty = false;

        if let Some(prev) = &self.last_tick {
            let actual = clock.time - prev.clock_time;
            let expected = now.saturating_duration_since(prev.wall).as_secs_f64() * clock.rate;
            let seek_detected = actual < 0.0
                || (actual > self.config.forward_jump_threshold
                    && (actual - expected).abs() > self.config.drift_tolerance);
            if seek_detected {
                let allowed = self
                    .last_reschedule
                    .map(|t| now.saturating_duration_since(t) >= self.config.min_reschedule_interval)
                    .unwrap_or(true);
                if allowed {
                    debug!(
                        actual,
                        expected, "playback discontinuity — rescheduling audio"
                    );
                    self.last_reschedule = Some(now);
                    rebuild = true;
                }
            }
        }

        if rebuild {
            self.stop_all();
        }

        self.reconcile(tracks, clips, clock);

        // Self-cleaning completion: a finished id that no longer matches the
        // registered voice for its clip belongs to a replaced voice — stale,
        // and must not disturb the registry.
        for finished in self.graph.take_finished() {
            self.active.retain(|_, entry| entry.voice != finished);
        }

        self.last_tick = Some(TickStamp {
            clock_time: clock.time,
            wall: now,
        });
    }

    /// Stop every voice and clear the registry. Used for pause, background,
    /// reschedule, and teardown.
    pub fn stop_all(&mut self) {
        for (_, entry) in self.active.drain() {
            self.graph.stop_voice(entry.voice);
        }
        let _ = self.graph.take_finished();
    }

    /// Foreground/background transition. Backgrounding stops all voices at
    /// once and suspends the device; foregrounding resumes and forces a
    /// fresh schedule on the next tick.
    pub fn set_foreground(&mut self, foreground: bool) {
        if self.foreground == foreground {
            return;
        }
        self.foreground = foreground;
        if foreground {
            self.graph.resume();
            self.model_dirty = true;
            self.last_tick = None;
        } else {
            self.stop_all();
            self.graph.suspend();
        }
    }

    fn drain_changes(&mut self) {
        let Some(rx) = &self.changes else { return };
        for event in rx.try_iter() {
            match event {
                ChangeEvent::ClipsChanged | ChangeEvent::TracksChanged => {
                    self.model_dirty = true;
                }
                ChangeEvent::MasksChanged | ChangeEvent::DurationChanged => {}
            }
        }
    }

    fn reconcile(&mut self, tracks: &[Track], clips: &[Clip], clock: ClockSnapshot) {
        let mut live: Vec<Uuid> = Vec::new();

        for track in tracks {
            if track.muted || !track.visible {
                continue;
            }
            let mut on_track: Vec<&Clip> =
                clips.iter().filter(|c| c.track_id == track.id).collect();
            on_track.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
            let Some(clip) = find_clip_at_time(&on_track, clock.time) else {
                continue;
            };
            if !clip.is_audible() || (track.kind == TrackKind::Video && !clip.visible) {
                continue;
            }
            let Some(gain) = clip.audio_settings().map(|a| a.gain()) else {
                continue;
            };

            // Force stop must pre-empt mid-tick, before any new voice work.
            if self.force_stop.is_raised() {
                self.stop_all();
                return;
            }

            live.push(clip.id);

            if let Some(entry) = self.active.get_mut(&clip.id) {
                // Live voice: gain only, never a restart.
                if (entry.gain - gain).abs() > f32::EPSILON {
                    self.graph.set_gain(entry.voice, gain);
                    entry.gain = gain;
                }
                continue;
            }

            let Some(buffer) = self.cache.get(clip.source_id) else {
                trace!(clip = %clip.id, "buffer miss — retry next tick");
                continue;
            };

            let offset = clip.source_time(clock.time).max(0.0);
            let remaining_clip = clip.end_time() - clock.time;
            let remaining_buffer = buffer.duration() - offset;
            let duration = remaining_clip.min(remaining_buffer);
            if duration <= 0.0 {
                continue;
            }

            match self.graph.start_voice(VoiceSpec {
                buffer,
                start_offset: offset,
                duration,
                gain,
            }) {
                Ok(voice) => {
                    trace!(clip = %clip.id, offset, duration, "voice started");
                    self.active.insert(clip.id, ActiveVoice { voice, gain });
                }
                Err(e) => {
                    debug!(clip = %clip.id, "voice start failed: {e}");
                }
            }
        }

        // Stop voices whose clip is no longer active.
        let stale: Vec<Uuid> = self
            .active
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in stale {
            if let Some(entry) = self.active.remove(&id) {
                self.graph.stop_voice(entry.voice);
            }
        }
    }
}
