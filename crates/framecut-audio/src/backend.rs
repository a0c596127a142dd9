//! cpal output backend for the audio graph.
//!
//! Voices are mixed in the device callback from a shared table. The graph
//! side only mutates the table; the callback marks voices finished when
//! their window runs out, and `take_finished` hands those back to the
//! scheduler for registry cleanup.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use framecut_core::{FramecutError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use crate::graph::{AudioGraph, VoiceId, VoiceSpec};

struct Voice {
    id: VoiceId,
    spec: VoiceSpec,
    /// Playback cursor in source frames.
    cursor: f64,
    /// Exclusive end, source frames.
    end_frame: f64,
    /// Source frames advanced per output frame.
    step: f64,
    done: bool,
}

#[derive(Default)]
struct VoiceTable {
    voices: Vec<Voice>,
    finished: Vec<VoiceId>,
    suspended: bool,
}

impl VoiceTable {
    /// Mix one output buffer of interleaved frames.
    fn render(&mut self, out: &mut [f32], out_channels: usize) {
        for sample in out.iter_mut() {
            *sample = 0.0;
        }
        if self.suspended || out_channels == 0 {
            return;
        }

        let frames = out.len() / out_channels;
        for voice in &mut self.voices {
            if voice.done {
                continue;
            }
            let src = &voice.spec.buffer;
            let src_channels = src.channels.max(1) as usize;
            let src_frames = src.frame_count();

            for frame in 0..frames {
                if voice.cursor >= voice.end_frame || voice.cursor as usize >= src_frames {
                    voice.done = true;
                    self.finished.push(voice.id);
                    break;
                }
                let idx = voice.cursor as usize * src_channels;
                let left = src.samples[idx];
                let right = if src_channels > 1 {
                    src.samples[idx + 1]
                } else {
                    left
                };

                let base = frame * out_channels;
                out[base] = (out[base] + left * voice.spec.gain).clamp(-1.0, 1.0);
                if out_channels > 1 {
                    out[base + 1] = (out[base + 1] + right * voice.spec.gain).clamp(-1.0, 1.0);
                }
                voice.cursor += voice.step;
            }
        }
        self.voices.retain(|v| !v.done);
    }
}

/// Real audio output through cpal.
///
/// Not `Send` — construct it on the thread that owns the scheduler.
pub struct CpalAudioGraph {
    stream: cpal::Stream,
    table: Arc<Mutex<VoiceTable>>,
    device_rate: u32,
    next_id: u64,
}

impl CpalAudioGraph {
    /// Open the default output device.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| FramecutError::Audio("no output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| FramecutError::Audio(format!("no output config: {e}")))?;
        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(FramecutError::Audio(format!(
                "unsupported sample format {:?}",
                config.sample_format()
            )));
        }

        let device_rate = config.sample_rate().0;
        let out_channels = config.channels() as usize;
        let table: Arc<Mutex<VoiceTable>> = Arc::new(Mutex::new(VoiceTable::default()));
        let callback_table = table.clone();

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    callback_table.lock().render(data, out_channels);
                },
                |err| warn!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| FramecutError::Audio(format!("failed to open stream: {e}")))?;
        stream
            .play()
            .map_err(|e| FramecutError::Audio(format!("failed to start stream: {e}")))?;

        info!(rate = device_rate, channels = out_channels, "audio output opened");
        Ok(Self {
            stream,
            table,
            device_rate,
            next_id: 0,
        })
    }
}

impl AudioGraph for CpalAudioGraph {
    fn start_voice(&mut self, spec: VoiceSpec) -> Result<VoiceId> {
        let id = VoiceId(self.next_id);
        self.next_id += 1;

        let src_rate = spec.buffer.sample_rate.max(1) as f64;
        let cursor = spec.start_offset * src_rate;
        let end_frame =
            ((spec.start_offset + spec.duration) * src_rate).min(spec.buffer.frame_count() as f64);
        let step = src_rate / self.device_rate.max(1) as f64;

        self.table.lock().voices.push(Voice {
            id,
            spec,
            cursor,
            end_frame,
            step,
            done: false,
        });
        Ok(id)
    }

    fn stop_voice(&mut self, voice: VoiceId) {
        self.table.lock().voices.retain(|v| v.id != voice);
    }

    fn set_gain(&mut self, voice: VoiceId, gain: f32) {
        let mut table = self.table.lock();
        if let Some(v) = table.voices.iter_mut().find(|v| v.id == voice) {
            v.spec.gain = gain;
        }
    }

    fn suspend(&mut self) {
        let mut table = self.table.lock();
        table.suspended = true;
        table.voices.clear();
        if let Err(e) = self.stream.pause() {
            warn!("failed to pause audio stream: {e}");
        }
    }

    fn resume(&mut self) {
        self.table.lock().suspended = false;
        if let Err(e) = self.stream.play() {
            warn!("failed to resume audio stream: {e}");
        }
    }

    fn take_finished(&mut self) -> Vec<VoiceId> {
        std::mem::take(&mut self.table.lock().finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecut_media::PcmBuffer;

    fn voice(buffer: PcmBuffer, offset: f64, duration: f64, gain: f32) -> Voice {
        let src_rate = buffer.sample_rate as f64;
        let frame_count = buffer.frame_count() as f64;
        Voice {
            id: VoiceId(0),
            cursor: offset * src_rate,
            end_frame: ((offset + duration) * src_rate).min(frame_count),
            step: 1.0,
            done: false,
            spec: VoiceSpec {
                buffer: Arc::new(buffer),
                start_offset: offset,
                duration,
                gain,
            },
        }
    }

    #[test]
    fn test_render_mixes_with_gain() {
        let mut buffer = PcmBuffer::silent(48_000, 2, 4);
        for s in buffer.samples.iter_mut() {
            *s = 0.5;
        }
        let mut table = VoiceTable::default();
        table.voices.push(voice(buffer, 0.0, 1.0, 0.5));

        let mut out = vec![0.0f32; 8];
        table.render(&mut out, 2);
        for s in &out {
            assert!((s - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_render_marks_finished_at_window_end() {
        let buffer = PcmBuffer::silent(48_000, 2, 48);
        let mut table = VoiceTable::default();
        // Window is 1ms = 48 frames; a 96-frame render exhausts it.
        table.voices.push(voice(buffer, 0.0, 0.001, 1.0));

        let mut out = vec![0.0f32; 96 * 2];
        table.render(&mut out, 2);
        assert_eq!(table.finished, vec![VoiceId(0)]);
        assert!(table.voices.is_empty());
    }

    #[test]
    fn test_suspended_renders_silence() {
        let mut buffer = PcmBuffer::silent(48_000, 2, 48);
        for s in buffer.samples.iter_mut() {
            *s = 1.0;
        }
        let mut table = VoiceTable::default();
        table.voices.push(voice(buffer, 0.0, 1.0, 1.0));
        table.suspended = true;

        let mut out = vec![0.5f32; 8];
        table.render(&mut out, 2);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_mono_source_feeds_both_channels() {
        let mut buffer = PcmBuffer::silent(48_000, 1, 4);
        for s in buffer.samples.iter_mut() {
            *s = 0.25;
        }
        let mut table = VoiceTable::default();
        table.voices.push(voice(buffer, 0.0, 1.0, 1.0));

        let mut out = vec![0.0f32; 8];
        table.render(&mut out, 2);
        assert!((out[0] - 0.25).abs() < 1e-6);
        assert!((out[1] - 0.25).abs() < 1e-6);
    }
}
