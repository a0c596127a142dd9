//! Decode interfaces: bytes in, raster or PCM out.

use framecut_core::{FramecutError, Raster, Result};

/// A block of decoded PCM audio, interleaved f32 samples.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    /// Samples per second.
    pub sample_rate: u32,
    /// Channel count (samples are interleaved).
    pub channels: u16,
    /// Interleaved samples, `frame_count() * channels` long.
    pub samples: Vec<f32>,
}

impl PcmBuffer {
    /// Create a silent buffer of the given length.
    pub fn silent(sample_rate: u32, channels: u16, frames: usize) -> Self {
        Self {
            sample_rate,
            channels,
            samples: vec![0.0; frames * channels as usize],
        }
    }

    /// Number of sample frames (one per channel group).
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

/// Decode an encoded still image into an RGBA raster.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Raster>;
}

/// Decode encoded audio bytes into a PCM buffer.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<PcmBuffer>;
}

/// `ImageDecoder` backed by the `image` crate.
#[derive(Debug, Default)]
pub struct StillDecoder;

impl ImageDecoder for StillDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Raster> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| FramecutError::Decode(format!("still decode failed: {e}")))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Raster::from_rgba(width, height, rgba.into_raw())
            .ok_or_else(|| FramecutError::Decode("still decode produced bad buffer".into()))
    }
}
