//! Track types for the timeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip::ClipKind;

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
}

/// An ordered layer hosting clips and optionally masks.
///
/// Tracks are stored in UI order: index 0 is the topmost row, which renders
/// with the highest z-index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: Uuid,
    /// Track name
    pub name: String,
    /// Track kind
    pub kind: TrackKind,
    /// Render order; recomputed whenever track order changes
    #[serde(default)]
    pub z_index: u32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub muted: bool,
    /// Row height in the timeline UI, pixels
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_true() -> bool {
    true
}

fn default_height() -> f32 {
    48.0
}

impl Track {
    /// Create a new video track.
    pub fn video(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: TrackKind::Video,
            z_index: 0,
            visible: true,
            locked: false,
            muted: false,
            height: default_height(),
        }
    }

    /// Create a new audio track.
    pub fn audio(name: impl Into<String>) -> Self {
        Self {
            kind: TrackKind::Audio,
            ..Self::video(name)
        }
    }

    /// Whether this track can host a clip of the given kind. Audio tracks
    /// host only audio clips; video tracks host everything else.
    pub fn accepts(&self, kind: &ClipKind) -> bool {
        match self.kind {
            TrackKind::Audio => kind.is_audio(),
            TrackKind::Video => !kind.is_audio(),
        }
    }
}

/// Recompute the dense z-index over the track list (UI order, topmost
/// first). Must run whenever track order changes.
pub fn reindex_z_order(tracks: &mut [Track]) {
    let count = tracks.len();
    for (i, track) in tracks.iter_mut().enumerate() {
        track.z_index = (count - 1 - i) as u32;
    }
}
