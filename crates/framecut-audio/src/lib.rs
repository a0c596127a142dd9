//! Framecut Audio - Playback clock and audio scheduler
//!
//! Architecture:
//! - `PlaybackClock`: the single shared current-time reference driving both
//!   the render loop and audio scheduling
//! - `AudioGraph`: ownership boundary for native audio voices; nothing else
//!   touches audio nodes
//! - `AudioScheduler`: fixed-interval tick that reconciles voices with the
//!   timeline, with drift-based seek detection and rate-limited reschedules
//! - `BufferCache`: pre-decoded PCM keyed by source id, fed by decode workers
//! - `CpalAudioGraph`: real output backend
//! - `mixdown`: offline export render, independent of the live scheduler

pub mod backend;
pub mod cache;
pub mod clock;
pub mod graph;
pub mod mixdown;
pub mod scheduler;
pub mod testing;

pub use backend::CpalAudioGraph;
pub use cache::BufferCache;
pub use clock::{ClockSnapshot, PlaybackClock, SharedClock};
pub use graph::{AudioGraph, VoiceId, VoiceSpec};
pub use mixdown::render_mixdown;
pub use scheduler::{AudioScheduler, ForceStop, SchedulerConfig};
