//! Clipboard: a detached snapshot of selected clips and masks.
//!
//! Paste computes a relative offset from the playhead time recorded at copy,
//! so a selection copied at t=4 and pasted at t=10 keeps its internal
//! layout shifted by +6. Incompatible targets are silently skipped.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip::Clip;
use crate::mask::Mask;
use crate::project::Project;

/// Whether the source selection was copied or cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

/// Detached selection snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clipboard {
    pub mode: ClipboardMode,
    /// Playhead time when the selection was captured.
    pub source_time: f64,
    pub clips: Vec<Clip>,
    pub masks: Vec<Mask>,
}

impl Clipboard {
    /// Capture a selection. The snapshot is fully detached — later edits to
    /// the project do not affect it.
    pub fn capture(
        mode: ClipboardMode,
        source_time: f64,
        clips: &[&Clip],
        masks: &[&Mask],
    ) -> Self {
        Self {
            mode,
            source_time,
            clips: clips.iter().map(|c| (*c).clone()).collect(),
            masks: masks.iter().map(|m| (*m).clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty() && self.masks.is_empty()
    }
}

impl Project {
    /// Paste a clipboard at a timeline time.
    ///
    /// Each pasted clip lands on its original track when that track still
    /// exists and accepts it, otherwise on the first compatible unlocked
    /// track; clips with no compatible target are skipped. All placements go
    /// through the safe-start path. Returns the ids of the pasted clips.
    pub fn paste(&mut self, clipboard: &Clipboard, at_time: f64) -> Vec<Uuid> {
        let offset = at_time - clipboard.source_time;
        let mut pasted = Vec::new();

        for source in &clipboard.clips {
            let target_track = self
                .track(source.track_id)
                .filter(|t| !t.locked && t.accepts(&source.kind))
                .map(|t| t.id)
                .or_else(|| {
                    self.tracks
                        .iter()
                        .find(|t| !t.locked && t.accepts(&source.kind))
                        .map(|t| t.id)
                });
            let Some(track_id) = target_track else {
                continue;
            };

            let mut clip = source.duplicate();
            clip.track_id = track_id;
            clip.start_time = (source.start_time + offset).max(0.0);
            if let Some(id) = self.insert_clip(clip) {
                pasted.push(id);
            }
        }

        for source in &clipboard.masks {
            if self.track(source.track_id).is_none() {
                continue;
            }
            let mut mask = source.clone();
            mask.id = Uuid::new_v4();
            mask.start_time = (source.start_time + offset).max(0.0);
            self.add_mask(mask);
        }

        pasted
    }
}
