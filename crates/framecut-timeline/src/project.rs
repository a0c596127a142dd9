//! The project: canvas, frame rate, tracks, clips, masks, assets.
//!
//! Every placement mutation routes through the overlap/safe-start helpers in
//! `model` — there are no unchecked start-time writes. Invariant violations
//! (overlapping placement, wrong track kind, locked targets) are silently
//! rejected or auto-corrected, never raised as errors. Mutations emit change
//! events on the project's bus.

use framecut_core::FrameRate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::clip::Clip;
use crate::drag::{self, SwapDecision, TrimOrigin};
use crate::mask::{find_mask_at_time, Mask, MaskHit};
use crate::model::{clips_on_track, find_clip_at_time, has_track_overlap, project_duration, safe_clip_start};
use crate::notify::{ChangeBus, ChangeEvent};
use crate::track::{reindex_z_order, Track, TrackKind};

/// Projects never report a duration below this, seconds.
pub const MIN_PROJECT_DURATION: f64 = 10.0;

/// A reference to an imported media asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Matches `Clip::source_id` of every placement of this asset.
    pub source_id: Uuid,
    pub name: String,
    /// Opaque locator understood by the media layer.
    pub uri: String,
}

/// The timeline document.
#[derive(Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Output canvas size in pixels.
    pub canvas_size: (u32, u32),
    pub frame_rate: FrameRate,
    /// Derived: max clip end, floored to [`MIN_PROJECT_DURATION`].
    duration: f64,
    /// UI order: index 0 = topmost row = highest z.
    pub tracks: Vec<Track>,
    pub clips: Vec<Clip>,
    pub masks: Vec<Mask>,
    #[serde(default)]
    pub assets: Vec<AssetRef>,
    #[serde(skip)]
    bus: ChangeBus,
}

impl Project {
    /// Create an empty project with one video and one audio track.
    pub fn new(name: impl Into<String>, canvas_size: (u32, u32), frame_rate: FrameRate) -> Self {
        let mut tracks = vec![Track::video("V1"), Track::audio("A1")];
        reindex_z_order(&mut tracks);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            canvas_size,
            frame_rate,
            duration: MIN_PROJECT_DURATION,
            tracks,
            clips: Vec::new(),
            masks: Vec::new(),
            assets: Vec::new(),
            bus: ChangeBus::new(),
        }
    }

    /// Derived total duration.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Change-notification bus for schedulers and render loops.
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    fn recompute_duration(&mut self) {
        let next = project_duration(&self.clips, MIN_PROJECT_DURATION);
        if (next - self.duration).abs() > f64::EPSILON {
            self.duration = next;
            self.bus.emit(ChangeEvent::DurationChanged);
        }
    }

    // ── Track operations ────────────────────────────────────────

    pub fn track(&self, id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: Uuid) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Insert a new track at the top. Returns its id.
    pub fn add_track(&mut self, kind: TrackKind, name: impl Into<String>) -> Uuid {
        let track = match kind {
            TrackKind::Video => Track::video(name),
            TrackKind::Audio => Track::audio(name),
        };
        let id = track.id;
        self.tracks.insert(0, track);
        reindex_z_order(&mut self.tracks);
        self.bus.emit(ChangeEvent::TracksChanged);
        id
    }

    /// Remove a track along with its clips and masks.
    pub fn remove_track(&mut self, id: Uuid) -> Option<Track> {
        let index = self.tracks.iter().position(|t| t.id == id)?;
        let track = self.tracks.remove(index);
        reindex_z_order(&mut self.tracks);
        self.clips.retain(|c| c.track_id != id);
        self.masks.retain(|m| m.track_id != id);
        self.bus.emit(ChangeEvent::TracksChanged);
        self.bus.emit(ChangeEvent::ClipsChanged);
        self.recompute_duration();
        Some(track)
    }

    /// Reorder a track from one UI row to another.
    pub fn move_track(&mut self, from: usize, to: usize) {
        if from >= self.tracks.len() || to >= self.tracks.len() || from == to {
            return;
        }
        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        reindex_z_order(&mut self.tracks);
        self.bus.emit(ChangeEvent::TracksChanged);
    }

    // ── Clip operations ─────────────────────────────────────────

    pub fn clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Mutable clip access for transform edits (position, opacity,
    /// keyframes). Placement fields must go through the methods below.
    pub fn clip_mut(&mut self, id: Uuid) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// Clips on a track, sorted by start time.
    pub fn track_clips(&self, track_id: Uuid) -> Vec<&Clip> {
        clips_on_track(&self.clips, track_id)
    }

    /// Clip active on a track at a timeline time.
    pub fn clip_at(&self, track_id: Uuid, time: f64) -> Option<&Clip> {
        let sorted = self.track_clips(track_id);
        find_clip_at_time(&sorted, time)
    }

    /// Place a clip, pushing it forward to the next free slot if needed.
    /// Returns `None` when the target track is missing, locked, or of an
    /// incompatible kind.
    pub fn insert_clip(&mut self, mut clip: Clip) -> Option<Uuid> {
        let track = self.track(clip.track_id)?;
        if track.locked || !track.accepts(&clip.kind) {
            debug!(clip = %clip.id, "clip placement rejected by track");
            return None;
        }
        clip.normalize();
        clip.start_time = safe_clip_start(
            &self.clips,
            clip.track_id,
            clip.start_time,
            clip.duration,
            Some(clip.id),
            Some(self.frame_rate),
        );
        let id = clip.id;
        self.clips.push(clip);
        self.bus.emit(ChangeEvent::ClipsChanged);
        self.recompute_duration();
        Some(id)
    }

    /// Move a clip to a new track/start. The start is auto-corrected to the
    /// next free slot; incompatible or locked targets reject the move.
    pub fn move_clip(&mut self, id: Uuid, target_track: Uuid, desired_start: f64) -> bool {
        let Some(clip) = self.clip(id) else {
            return false;
        };
        if clip.locked {
            return false;
        }
        let duration = clip.duration;
        let kind = clip.kind.clone();
        let Some(track) = self.track(target_track) else {
            return false;
        };
        if track.locked || !track.accepts(&kind) {
            return false;
        }

        let start = safe_clip_start(
            &self.clips,
            target_track,
            desired_start,
            duration,
            Some(id),
            Some(self.frame_rate),
        );
        let frame_rate = self.frame_rate;
        let Some(clip) = self.clip_mut(id) else {
            return false;
        };
        clip.track_id = target_track;
        clip.start_time = start;

        if let Some(moved) = self.clip(id) {
            debug_assert!(!has_track_overlap(&self.clips, moved, None, Some(frame_rate)));
        }

        self.bus.emit(ChangeEvent::ClipsChanged);
        self.recompute_duration();
        true
    }

    /// Apply a swap decision atomically (both starts change together).
    pub fn apply_swap(&mut self, dragged: Uuid, swap: &SwapDecision) -> bool {
        let Some(_) = self.clip(dragged) else {
            return false;
        };
        if self.clip(swap.neighbor_id).is_none() {
            return false;
        }
        if let Some(clip) = self.clip_mut(dragged) {
            clip.start_time = swap.dragged_start;
        }
        if let Some(clip) = self.clip_mut(swap.neighbor_id) {
            clip.start_time = swap.neighbor_start;
        }
        self.bus.emit(ChangeEvent::ClipsChanged);
        self.recompute_duration();
        true
    }

    /// Trim a clip's leading edge toward `pointer_time`, additionally
    /// clamped so it cannot ride over the previous clip on the track.
    pub fn trim_clip_start(&mut self, id: Uuid, origin: &TrimOrigin, pointer_time: f64) -> bool {
        let Some(clip) = self.clip(id) else {
            return false;
        };
        if clip.locked {
            return false;
        }
        let track_id = clip.track_id;
        let floor = self
            .track_clips(track_id)
            .iter()
            .filter(|c| c.id != id && c.end_time() <= origin.start_time + f64::EPSILON)
            .map(|c| c.end_time())
            .fold(f64::NEG_INFINITY, f64::max);

        let Some(clip) = self.clip_mut(id) else {
            return false;
        };
        drag::trim_start_to(clip, origin, pointer_time.max(floor));
        self.bus.emit(ChangeEvent::ClipsChanged);
        self.recompute_duration();
        true
    }

    /// Trim a clip's trailing edge toward `pointer_time`, clamped to the
    /// start of the next clip on the track.
    pub fn trim_clip_end(&mut self, id: Uuid, origin: &TrimOrigin, pointer_time: f64) -> bool {
        let Some(clip) = self.clip(id) else {
            return false;
        };
        if clip.locked {
            return false;
        }
        let track_id = clip.track_id;
        let ceiling = self
            .track_clips(track_id)
            .iter()
            .filter(|c| c.id != id && c.start_time >= origin.start_time + origin.duration - f64::EPSILON)
            .map(|c| c.start_time)
            .fold(f64::INFINITY, f64::min);

        let Some(clip) = self.clip_mut(id) else {
            return false;
        };
        drag::trim_end_to(clip, origin, pointer_time.min(ceiling));
        self.bus.emit(ChangeEvent::ClipsChanged);
        self.recompute_duration();
        true
    }

    /// Razor a clip at a timeline time. Removal of the original and
    /// insertion of both halves happen atomically. Returns the new ids.
    pub fn split_clip_at(&mut self, id: Uuid, time: f64) -> Option<(Uuid, Uuid)> {
        let clip = self.clip(id)?;
        if clip.locked {
            return None;
        }
        let (left, right) = drag::split_clip(clip, time)?;
        let ids = (left.id, right.id);
        let index = self.clips.iter().position(|c| c.id == id)?;
        self.clips.splice(index..=index, [left, right]);
        self.bus.emit(ChangeEvent::ClipsChanged);
        Some(ids)
    }

    pub fn remove_clip(&mut self, id: Uuid) -> Option<Clip> {
        let index = self.clips.iter().position(|c| c.id == id)?;
        let clip = self.clips.remove(index);
        self.bus.emit(ChangeEvent::ClipsChanged);
        self.recompute_duration();
        Some(clip)
    }

    /// Duplicate a clip onto its own track, right after the original
    /// (auto-pushed past any conflicts). Shares the source asset.
    pub fn duplicate_clip(&mut self, id: Uuid) -> Option<Uuid> {
        let original = self.clip(id)?;
        let mut copy = original.duplicate();
        copy.start_time = original.end_time();
        self.insert_clip(copy)
    }

    // ── Asset references ────────────────────────────────────────

    /// Record an imported asset, replacing any entry for the same source.
    pub fn register_asset(&mut self, asset: AssetRef) {
        self.assets.retain(|a| a.source_id != asset.source_id);
        self.assets.push(asset);
    }

    pub fn asset(&self, source_id: Uuid) -> Option<&AssetRef> {
        self.assets.iter().find(|a| a.source_id == source_id)
    }

    /// Drop asset records no clip references anymore.
    pub fn prune_assets(&mut self) {
        let referenced: Vec<Uuid> = self.clips.iter().map(|c| c.source_id).collect();
        self.assets.retain(|a| referenced.contains(&a.source_id));
    }

    // ── Mask operations ─────────────────────────────────────────

    pub fn mask(&self, id: Uuid) -> Option<&Mask> {
        self.masks.iter().find(|m| m.id == id)
    }

    pub fn mask_mut(&mut self, id: Uuid) -> Option<&mut Mask> {
        self.masks.iter_mut().find(|m| m.id == id)
    }

    /// Add a mask. Its size is forced to the project canvas; a matte of the
    /// wrong size is replaced with a fully opaque one.
    pub fn add_mask(&mut self, mut mask: Mask) -> Option<Uuid> {
        self.track(mask.track_id)?;
        if mask.size != self.canvas_size {
            mask.size = self.canvas_size;
            mask.commit_static(framecut_core::Matte::opaque(
                self.canvas_size.0,
                self.canvas_size.1,
            ));
        }
        let id = mask.id;
        self.masks.push(mask);
        self.bus.emit(ChangeEvent::MasksChanged);
        Some(id)
    }

    pub fn remove_mask(&mut self, id: Uuid) -> Option<Mask> {
        let index = self.masks.iter().position(|m| m.id == id)?;
        let mask = self.masks.remove(index);
        self.bus.emit(ChangeEvent::MasksChanged);
        Some(mask)
    }

    /// Mask active on a track at a time; `editing` marks the live mask.
    pub fn mask_at(&self, track_id: Uuid, time: f64, editing: Option<Uuid>) -> Option<MaskHit<'_>> {
        find_mask_at_time(&self.masks, track_id, time, editing)
    }

    /// Announce that mask pixel data changed (edit commit).
    pub fn notify_masks_changed(&self) {
        self.bus.emit(ChangeEvent::MasksChanged);
    }

    // ── Snapshots & load normalization ──────────────────────────

    /// Replace all clips (undo/redo restore).
    pub fn restore_clips(&mut self, clips: Vec<Clip>) {
        self.clips = clips;
        self.bus.emit(ChangeEvent::ClipsChanged);
        self.recompute_duration();
    }

    /// Replace all masks (undo/redo restore).
    pub fn restore_masks(&mut self, masks: Vec<Mask>) {
        self.masks = masks;
        self.bus.emit(ChangeEvent::MasksChanged);
    }

    /// One-shot normalization applied after deserialization: back-fill clip
    /// defaults, sort keyframes, re-index track z order, recompute the
    /// derived duration.
    pub fn normalize_loaded(&mut self) {
        for clip in &mut self.clips {
            clip.normalize();
        }
        for mask in &mut self.masks {
            mask.normalize();
        }
        reindex_z_order(&mut self.tracks);
        self.duration = project_duration(&self.clips, MIN_PROJECT_DURATION);
    }
}

/// A frozen copy of the renderable model, used by export so a running job
/// never observes live edits.
#[derive(Debug, Clone)]
pub struct TimelineSnapshot {
    pub canvas_size: (u32, u32),
    pub frame_rate: FrameRate,
    pub duration: f64,
    pub tracks: Vec<Track>,
    pub clips: Vec<Clip>,
    pub masks: Vec<Mask>,
    pub assets: Vec<AssetRef>,
}

impl From<&Project> for TimelineSnapshot {
    fn from(project: &Project) -> Self {
        Self {
            canvas_size: project.canvas_size,
            frame_rate: project.frame_rate,
            duration: project.duration(),
            tracks: project.tracks.clone(),
            clips: project.clips.clone(),
            masks: project.masks.clone(),
            assets: project.assets.clone(),
        }
    }
}
