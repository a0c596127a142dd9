//! In-memory collaborator doubles shared by the workspace's tests.

use crate::decode::{AudioDecoder, PcmBuffer};
use crate::handle::{MediaHandle, MediaReady, SeekState};
use crate::interpolate::FrameInterpolator;
use framecut_core::{Raster, Result, Rgba};
use std::time::Instant;

/// A media handle that shows a solid color and completes seeks after a
/// configurable number of polls (0 = instant).
pub struct SolidColorMedia {
    size: (u32, u32),
    duration: f64,
    frame: Raster,
    time: f64,
    seek: Option<PendingSeek>,
    /// How many polls a seek stays pending before completing.
    pub seek_latency_polls: u32,
}

struct PendingSeek {
    target: f64,
    deadline: Instant,
    polls_left: u32,
}

impl SolidColorMedia {
    pub fn new(width: u32, height: u32, duration: f64, color: Rgba) -> Self {
        Self {
            size: (width, height),
            duration,
            frame: Raster::solid(width, height, color),
            time: 0.0,
            seek: None,
            seek_latency_polls: 0,
        }
    }
}

impl MediaHandle for SolidColorMedia {
    fn ready(&self) -> MediaReady {
        MediaReady::CurrentFrame
    }

    fn natural_size(&self) -> (u32, u32) {
        self.size
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn request_seek(&mut self, time: f64, deadline: Instant) {
        self.seek = Some(PendingSeek {
            target: time.clamp(0.0, self.duration),
            deadline,
            polls_left: self.seek_latency_polls,
        });
    }

    fn poll_seek(&mut self, now: Instant) -> SeekState {
        let Some(seek) = self.seek.as_mut() else {
            return SeekState::Idle;
        };
        if now > seek.deadline {
            self.seek = None;
            return SeekState::TimedOut;
        }
        if seek.polls_left > 0 {
            seek.polls_left -= 1;
            return SeekState::Pending;
        }
        self.time = seek.target;
        self.seek = None;
        SeekState::Complete
    }

    fn current_frame(&self) -> Option<&Raster> {
        Some(&self.frame)
    }
}

/// An audio decoder that synthesizes a sine tone regardless of input bytes.
/// The first input byte selects the duration in tenths of a second
/// (0 -> 1.0s) so tests can shape buffers without real media.
#[derive(Debug)]
pub struct SineAudioDecoder {
    pub sample_rate: u32,
    pub channels: u16,
    pub frequency: f32,
}

impl Default for SineAudioDecoder {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
            frequency: 440.0,
        }
    }
}

impl AudioDecoder for SineAudioDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PcmBuffer> {
        let tenths = bytes.first().copied().unwrap_or(10).max(1);
        let frames = (self.sample_rate as usize) * (tenths as usize) / 10;
        let mut samples = Vec::with_capacity(frames * self.channels as usize);
        for i in 0..frames {
            let t = i as f32 / self.sample_rate as f32;
            let v = (t * self.frequency * std::f32::consts::TAU).sin() * 0.5;
            for _ in 0..self.channels {
                samples.push(v);
            }
        }
        Ok(PcmBuffer {
            sample_rate: self.sample_rate,
            channels: self.channels,
            samples,
        })
    }
}

/// A frame interpolator that cross-dissolves between the boundary frames.
#[derive(Debug, Default)]
pub struct DissolveInterpolator;

impl FrameInterpolator for DissolveInterpolator {
    fn interpolate(
        &self,
        from: &Raster,
        to: &Raster,
        steps: usize,
        _high_quality: bool,
        progress: &mut dyn FnMut(f32),
    ) -> Result<Vec<Raster>> {
        let mut frames = Vec::with_capacity(steps);
        for step in 0..steps {
            let t = (step + 1) as f32 / (steps + 1) as f32;
            let mut frame = from.clone();
            let dst = frame.data_mut();
            let src = to.data();
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = (*d as f32 * (1.0 - t) + *s as f32 * t).round() as u8;
            }
            frames.push(frame);
            progress((step + 1) as f32 / steps as f32);
        }
        Ok(frames)
    }
}
