//! The audio-graph ownership boundary.
//!
//! All native voice mutation — creation, stop, gain — goes through an
//! `AudioGraph` owned by the scheduler. No other component touches audio
//! nodes. The graph is injected, not ambient, so multiple timeline
//! instances can run independent graphs and tests can script one.

use framecut_core::Result;
use framecut_media::PcmBuffer;
use std::sync::Arc;

/// Opaque identifier of a playing voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub u64);

/// Everything needed to start one voice.
#[derive(Debug, Clone)]
pub struct VoiceSpec {
    /// Pre-decoded source audio. Readiness is the caller's precondition.
    pub buffer: Arc<PcmBuffer>,
    /// In-buffer start offset, seconds.
    pub start_offset: f64,
    /// Playable window: min(remaining clip, remaining buffer), seconds.
    pub duration: f64,
    /// Initial linear gain.
    pub gain: f32,
}

/// Owner of native audio voices.
pub trait AudioGraph {
    /// Start a voice at the given in-buffer offset.
    fn start_voice(&mut self, spec: VoiceSpec) -> Result<VoiceId>;

    /// Stop and disconnect a voice. Unknown ids are ignored.
    fn stop_voice(&mut self, voice: VoiceId);

    /// Update a playing voice's gain. Never restarts the voice.
    fn set_gain(&mut self, voice: VoiceId, gain: f32);

    /// Background transition: silence output and release the device.
    fn suspend(&mut self);

    /// Foreground transition: reacquire the device.
    fn resume(&mut self);

    /// Voices that ran to completion since the last call. A voice appears
    /// at most once; stopped voices never appear.
    fn take_finished(&mut self) -> Vec<VoiceId>;
}
