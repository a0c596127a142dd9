//! Scripted audio graph for scheduler tests.

use crate::graph::{AudioGraph, VoiceId, VoiceSpec};
use framecut_core::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Everything the graph was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    Start {
        voice: VoiceId,
        offset: f64,
        duration: f64,
        gain: f32,
    },
    Stop(VoiceId),
    SetGain {
        voice: VoiceId,
        gain: f32,
    },
    Suspend,
    Resume,
}

/// Shared event log, inspected by tests after the graph is boxed away.
pub type GraphLog = Arc<Mutex<Vec<GraphEvent>>>;

/// Lets a test deliver a voice-completion callback by hand.
#[derive(Clone)]
pub struct Finisher(Arc<Mutex<Vec<VoiceId>>>);

impl Finisher {
    pub fn finish(&self, voice: VoiceId) {
        self.0.lock().push(voice);
    }
}

/// An `AudioGraph` that records every call and plays nothing.
pub struct RecordingGraph {
    log: GraphLog,
    finished: Arc<Mutex<Vec<VoiceId>>>,
    next_id: u64,
}

impl RecordingGraph {
    pub fn new() -> (Self, GraphLog) {
        let log: GraphLog = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: log.clone(),
                finished: Arc::new(Mutex::new(Vec::new())),
                next_id: 0,
            },
            log,
        )
    }

    /// Handle for delivering completions from the test body.
    pub fn finisher(&self) -> Finisher {
        Finisher(self.finished.clone())
    }
}

impl AudioGraph for RecordingGraph {
    fn start_voice(&mut self, spec: VoiceSpec) -> Result<VoiceId> {
        let voice = VoiceId(self.next_id);
        self.next_id += 1;
        self.log.lock().push(GraphEvent::Start {
            voice,
            offset: spec.start_offset,
            duration: spec.duration,
            gain: spec.gain,
        });
        Ok(voice)
    }

    fn stop_voice(&mut self, voice: VoiceId) {
        self.log.lock().push(GraphEvent::Stop(voice));
    }

    fn set_gain(&mut self, voice: VoiceId, gain: f32) {
        self.log.lock().push(GraphEvent::SetGain { voice, gain });
    }

    fn suspend(&mut self) {
        self.log.lock().push(GraphEvent::Suspend);
    }

    fn resume(&mut self) {
        self.log.lock().push(GraphEvent::Resume);
    }

    fn take_finished(&mut self) -> Vec<VoiceId> {
        std::mem::take(&mut *self.finished.lock())
    }
}
