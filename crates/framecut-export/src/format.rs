//! Export settings and the compression-tier → codec-profile mapping.

use framecut_core::{FrameRate, TimeRange};
use framecut_media::{CodecProfile, VideoCodec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User-facing compression choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionTier {
    /// Large file, best quality.
    High,
    /// Default tradeoff.
    Balanced,
    /// Smallest file.
    Small,
}

impl CompressionTier {
    /// The primary codec profile for this tier.
    pub fn profile(self) -> CodecProfile {
        let (crf, preset) = match self {
            Self::High => (16, "slow"),
            Self::Balanced => (21, "medium"),
            Self::Small => (28, "veryfast"),
        };
        CodecProfile {
            codec: VideoCodec::H264,
            crf: Some(crf),
            preset: Some(preset.to_string()),
            video_bitrate: None,
            pixel_format: "yuv420p".to_string(),
        }
    }
}

/// One export request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Output frame size; defaults to the project canvas.
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
    /// Time range to export.
    pub range: TimeRange,
    pub include_audio: bool,
    pub tier: CompressionTier,
    /// Base name of the offered file (extension follows the codec).
    pub file_stem: String,
    /// Directory for the final container.
    pub output_dir: PathBuf,
    /// Audio mixdown parameters.
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
}

impl ExportSettings {
    pub fn new(width: u32, height: u32, frame_rate: FrameRate, range: TimeRange) -> Self {
        Self {
            width,
            height,
            frame_rate,
            range,
            include_audio: true,
            tier: CompressionTier::Balanced,
            file_stem: "export".to_string(),
            output_dir: std::env::temp_dir(),
            audio_sample_rate: 48_000,
            audio_channels: 2,
        }
    }

    /// `ceil(duration × fps)` frames, never sampling past the export end.
    pub fn total_frames(&self) -> u64 {
        (self.range.duration * self.frame_rate.to_fps_f64()).ceil().max(0.0) as u64
    }

    /// The timeline time of an output frame index, clamped so the final
    /// frame never samples past the export end.
    pub fn frame_time(&self, index: u64) -> f64 {
        let t = self.range.start + index as f64 * self.frame_rate.frame_duration();
        t.min(self.range.end())
    }
}
