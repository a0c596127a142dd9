//! Clip types for the timeline.

use framecut_core::{TimeRange, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::keyframe::{normalize_keyframes, PositionKeyframe};

/// Audio playback settings shared by video and audio clips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Whether this clip's audio is muted.
    #[serde(default)]
    pub muted: bool,
    /// Volume in percent, 0–100.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    100.0
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            muted: false,
            volume: 100.0,
        }
    }
}

impl AudioSettings {
    /// Linear gain in `[0, 1]`.
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.volume / 100.0).clamp(0.0, 1.0)
        }
    }
}

/// Media-specific clip payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClipKind {
    Video {
        /// Duration of the backing source in seconds.
        source_duration: f64,
        /// Natural pixel size of the source.
        source_size: (u32, u32),
        /// Whether the source carries an audio stream.
        has_audio: bool,
        #[serde(default)]
        audio: AudioSettings,
    },
    Audio {
        /// Duration of the backing source in seconds.
        source_duration: f64,
        #[serde(default)]
        audio: AudioSettings,
    },
    Image {
        /// Optional embedded encoded still bytes (synthesized stills carry
        /// their data; imported stills live in the blob store).
        #[serde(default)]
        still: Option<Vec<u8>>,
    },
}

impl ClipKind {
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio { .. })
    }

    /// Source duration, unbounded for stills.
    pub fn source_duration(&self) -> f64 {
        match self {
            Self::Video {
                source_duration, ..
            }
            | Self::Audio {
                source_duration, ..
            } => *source_duration,
            Self::Image { .. } => f64::INFINITY,
        }
    }
}

/// A placed, trimmed media reference on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: Uuid,
    /// Track this clip sits on
    pub track_id: Uuid,
    /// Groups clips sharing one imported media asset (blob reuse on
    /// copy/duplicate/paste)
    pub source_id: Uuid,
    #[serde(default)]
    pub name: String,
    /// Timeline placement in seconds
    pub start_time: f64,
    pub duration: f64,
    /// Source-time window
    #[serde(default)]
    pub trim_in: f64,
    #[serde(default)]
    pub trim_out: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Static canvas position, overridden by keyframes when present
    #[serde(default)]
    pub position: Vec2,
    /// Uniform scale
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Independent axis scales, multiplied with `scale`
    #[serde(default = "default_scale")]
    pub scale_x: f32,
    #[serde(default = "default_scale")]
    pub scale_y: f32,
    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub position_keyframes: SmallVec<[PositionKeyframe; 4]>,
    pub kind: ClipKind,
}

fn default_opacity() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f32 {
    1.0
}

impl Clip {
    fn base(track_id: Uuid, name: impl Into<String>, duration: f64, kind: ClipKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            track_id,
            source_id: Uuid::new_v4(),
            name: name.into(),
            start_time: 0.0,
            duration,
            trim_in: 0.0,
            trim_out: duration,
            opacity: 1.0,
            visible: true,
            locked: false,
            position: Vec2::ZERO,
            scale: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            position_keyframes: SmallVec::new(),
            kind,
        }
    }

    /// Create a video clip spanning its full source.
    pub fn video(
        track_id: Uuid,
        name: impl Into<String>,
        source_duration: f64,
        source_size: (u32, u32),
        has_audio: bool,
    ) -> Self {
        Self::base(
            track_id,
            name,
            source_duration,
            ClipKind::Video {
                source_duration,
                source_size,
                has_audio,
                audio: AudioSettings::default(),
            },
        )
    }

    /// Create an audio clip spanning its full source.
    pub fn audio(track_id: Uuid, name: impl Into<String>, source_duration: f64) -> Self {
        Self::base(
            track_id,
            name,
            source_duration,
            ClipKind::Audio {
                source_duration,
                audio: AudioSettings::default(),
            },
        )
    }

    /// Create a still-image clip with the given timeline duration.
    pub fn image(track_id: Uuid, name: impl Into<String>, duration: f64) -> Self {
        Self::base(track_id, name, duration, ClipKind::Image { still: None })
    }

    /// Timeline interval occupied by this clip.
    #[inline]
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.duration)
    }

    /// Timeline end time (exclusive).
    #[inline]
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Clip-local time for a timeline time (not clamped).
    #[inline]
    pub fn local_time(&self, timeline_time: f64) -> f64 {
        timeline_time - self.start_time
    }

    /// Source time for a timeline time.
    #[inline]
    pub fn source_time(&self, timeline_time: f64) -> f64 {
        self.trim_in + self.local_time(timeline_time)
    }

    /// Per-axis scale: `scale` multiplied with the independent axis scales.
    #[inline]
    pub fn effective_scale(&self) -> Vec2 {
        Vec2::new(self.scale * self.scale_x, self.scale * self.scale_y)
    }

    /// Audio settings, if this clip kind carries audio.
    pub fn audio_settings(&self) -> Option<&AudioSettings> {
        match &self.kind {
            ClipKind::Video {
                has_audio, audio, ..
            } => has_audio.then_some(audio),
            ClipKind::Audio { audio, .. } => Some(audio),
            ClipKind::Image { .. } => None,
        }
    }

    pub fn audio_settings_mut(&mut self) -> Option<&mut AudioSettings> {
        match &mut self.kind {
            ClipKind::Video {
                has_audio, audio, ..
            } => (*has_audio).then_some(audio),
            ClipKind::Audio { audio, .. } => Some(audio),
            ClipKind::Image { .. } => None,
        }
    }

    /// Whether the clip produces audible output right now.
    pub fn is_audible(&self) -> bool {
        self.audio_settings().map(|a| a.gain() > 0.0).unwrap_or(false)
    }

    /// Clone this clip as a new placement sharing the same source asset.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy
    }

    /// Back-fill defaults and repair out-of-range fields. Applied once on
    /// load and after deserialization, never scattered at read sites.
    pub fn normalize(&mut self) {
        if !self.duration.is_finite() || self.duration < 0.0 {
            self.duration = 0.0;
        }
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            self.start_time = 0.0;
        }
        if self.trim_in < 0.0 {
            self.trim_in = 0.0;
        }
        // trim_out defaults to the end of the placed window
        if self.trim_out <= self.trim_in {
            self.trim_out = self.trim_in + self.duration;
        }
        self.opacity = self.opacity.clamp(0.0, 1.0);
        if self.scale <= 0.0 {
            self.scale = 1.0;
        }
        if self.scale_x <= 0.0 {
            self.scale_x = 1.0;
        }
        if self.scale_y <= 0.0 {
            self.scale_y = 1.0;
        }
        if let Some(audio) = self.audio_settings_mut() {
            audio.volume = audio.volume.clamp(0.0, 100.0);
        }
        let duration = self.duration;
        normalize_keyframes(&mut self.position_keyframes, duration);
    }
}
