//! The encoder abstraction: frame sequence + optional audio in, container
//! bytes out.

use framecut_core::{FrameRate, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoCodec {
    H264,
    /// Legacy MPEG-4 part 2 — the broad-compatibility fallback.
    Mpeg4,
}

impl VideoCodec {
    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::Mpeg4 => "mpeg4",
        }
    }

    /// Container extension for this codec.
    pub fn extension(self) -> &'static str {
        match self {
            Self::H264 => "mp4",
            Self::Mpeg4 => "mov",
        }
    }

    /// MIME type of the produced container.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::H264 => "video/mp4",
            Self::Mpeg4 => "video/quicktime",
        }
    }

    /// The simpler codec to retry with after a primary-codec failure.
    pub fn fallback(self) -> Option<Self> {
        match self {
            Self::H264 => Some(Self::Mpeg4),
            Self::Mpeg4 => None,
        }
    }
}

/// Encoder quality parameters for one codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecProfile {
    pub codec: VideoCodec,
    /// CRF value (lower = better), used by rate-factor codecs.
    pub crf: Option<u32>,
    /// Encoder speed preset (e.g. "fast", "veryfast").
    pub preset: Option<String>,
    /// Bitrate in kbps for codecs without CRF.
    pub video_bitrate: Option<u32>,
    /// Output pixel format; yuv420p for broad playback compatibility.
    pub pixel_format: String,
}

impl CodecProfile {
    /// Switch this profile to its fallback codec, keeping the quality knobs
    /// that still apply.
    pub fn to_fallback(&self) -> Option<Self> {
        let codec = self.codec.fallback()?;
        Some(Self {
            codec,
            crf: None,
            preset: None,
            video_bitrate: self.video_bitrate.or(Some(8_000)),
            pixel_format: self.pixel_format.clone(),
        })
    }
}

/// One encode invocation: an ordered, gap-free PNG frame sequence on disk
/// plus an optional uncompressed audio file.
#[derive(Debug, Clone)]
pub struct EncodeJob<'a> {
    /// Directory containing `frame_%06d.png`.
    pub frames_dir: &'a Path,
    /// Number of frames in the sequence.
    pub frame_count: u64,
    /// Output frame size.
    pub size: (u32, u32),
    pub frame_rate: FrameRate,
    /// Optional WAV file to mux.
    pub audio: Option<&'a Path>,
    pub profile: &'a CodecProfile,
    /// Where to write the container.
    pub output: PathBuf,
}

/// An external encoder.
pub trait Encoder: Send + Sync {
    /// Run one encode. `progress` receives a fraction in `[0, 1]`.
    /// On failure the implementation must not leave a partial `job.output`.
    fn encode(&self, job: &EncodeJob<'_>, progress: &mut dyn FnMut(f32)) -> Result<()>;
}

/// File name of the Nth spooled frame.
pub fn frame_file_name(index: u64) -> String {
    format!("frame_{index:06}.png")
}
