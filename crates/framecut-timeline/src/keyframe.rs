//! Position keyframes: linear interpolation over a clip's local timeline.
//!
//! A clip's keyframe list, when non-empty, overrides its static position.
//! Lists are kept sorted ascending by time, deduplicated within
//! [`KEYFRAME_EPSILON`] (later keyframe wins), and clamped to
//! `[0, duration]`. Every operation normalizes before returning.

use framecut_core::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::clip::Clip;

/// Two keyframes closer than this (seconds) collapse into one.
pub const KEYFRAME_EPSILON: f64 = 1e-4;

/// Interpolation mode between a keyframe and its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
}

/// A timestamped position on a clip's local timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionKeyframe {
    pub id: Uuid,
    /// Clip-local time in seconds, within `[0, duration]`.
    pub time: f64,
    pub value: Vec2,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl PositionKeyframe {
    pub fn new(time: f64, value: Vec2) -> Self {
        Self {
            id: Uuid::new_v4(),
            time,
            value,
            interpolation: Interpolation::Linear,
        }
    }
}

/// Inline storage sized for the common few-keyframe case.
pub type KeyframeList = SmallVec<[PositionKeyframe; 4]>;

/// Resolve the animated position at a clip-local time.
///
/// Before the first keyframe returns its value; after the last returns its
/// value; between two, linear interpolation by time ratio. An empty list
/// yields the static fallback.
pub fn resolve_position(keyframes: &[PositionKeyframe], local_time: f64, fallback: Vec2) -> Vec2 {
    match keyframes.len() {
        0 => fallback,
        1 => keyframes[0].value,
        _ => {
            let first = &keyframes[0];
            if local_time <= first.time {
                return first.value;
            }
            let last = &keyframes[keyframes.len() - 1];
            if local_time >= last.time {
                return last.value;
            }
            let idx = keyframes
                .partition_point(|kf| kf.time <= local_time)
                .saturating_sub(1);
            let a = &keyframes[idx];
            let b = &keyframes[idx + 1];
            let span = b.time - a.time;
            if span <= 0.0 {
                return a.value;
            }
            let t = ((local_time - a.time) / span).clamp(0.0, 1.0) as f32;
            match a.interpolation {
                Interpolation::Linear => a.value.lerp(b.value, t),
            }
        }
    }
}

/// Sort, clamp to `[0, duration]`, and collapse near-duplicates, keeping
/// the later entry of each colliding pair.
pub fn normalize_keyframes(keyframes: &mut KeyframeList, duration: f64) {
    for kf in keyframes.iter_mut() {
        kf.time = kf.time.clamp(0.0, duration.max(0.0));
    }
    // Stable sort keeps insertion order among equal times, so "later wins"
    // falls out of taking the last entry of each epsilon group.
    keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    let mut out: KeyframeList = SmallVec::new();
    for kf in keyframes.drain(..) {
        match out.last_mut() {
            Some(prev) if (kf.time - prev.time).abs() <= KEYFRAME_EPSILON => *prev = kf,
            _ => out.push(kf),
        }
    }
    *keyframes = out;
}

/// Insert or update a position keyframe at a timeline time.
///
/// With `auto_key`, inserting the first non-zero-time keyframe synthesizes
/// an implicit keyframe at time 0 holding the clip's current resolved
/// position, so motion before the edit point is preserved.
pub fn upsert_position_keyframe_at(
    clip: &mut Clip,
    timeline_time: f64,
    value: Vec2,
    auto_key: bool,
) {
    let local = clip.local_time(timeline_time).clamp(0.0, clip.duration);

    if auto_key && clip.position_keyframes.is_empty() && local > KEYFRAME_EPSILON {
        let held = clip.position;
        clip.position_keyframes
            .push(PositionKeyframe::new(0.0, held));
    }

    if let Some(existing) = clip
        .position_keyframes
        .iter_mut()
        .find(|kf| (kf.time - local).abs() <= KEYFRAME_EPSILON)
    {
        existing.value = value;
    } else {
        clip.position_keyframes
            .push(PositionKeyframe::new(local, value));
    }

    let duration = clip.duration;
    normalize_keyframes(&mut clip.position_keyframes, duration);
}

/// Remove the keyframe nearest a timeline time, within epsilon.
pub fn remove_position_keyframe_at(clip: &mut Clip, timeline_time: f64) -> bool {
    let local = clip.local_time(timeline_time);
    let before = clip.position_keyframes.len();
    clip.position_keyframes
        .retain(|kf| (kf.time - local).abs() > KEYFRAME_EPSILON);
    clip.position_keyframes.len() != before
}

/// Shift every keyframe value by a delta (canvas-space clip move).
pub fn offset_position_values(clip: &mut Clip, delta: Vec2) {
    for kf in clip.position_keyframes.iter_mut() {
        kf.value += delta;
    }
}

/// Partition a keyframe list at a clip-local cut point for a split.
///
/// Times in the right half are re-based into the new segment's local
/// window; boundary keyframes are synthesized on both sides so each
/// resulting clip animates identically in isolation — no value
/// discontinuity at the cut.
pub fn slice_position_keyframes(
    keyframes: &[PositionKeyframe],
    cut: f64,
    duration: f64,
    fallback: Vec2,
) -> (KeyframeList, KeyframeList) {
    let mut left: KeyframeList = SmallVec::new();
    let mut right: KeyframeList = SmallVec::new();
    if keyframes.is_empty() {
        return (left, right);
    }

    let cut_value = resolve_position(keyframes, cut, fallback);

    for kf in keyframes {
        if kf.time < cut - KEYFRAME_EPSILON {
            left.push(*kf);
        } else if kf.time > cut + KEYFRAME_EPSILON {
            let mut moved = *kf;
            moved.time -= cut;
            right.push(moved);
        }
        // A keyframe exactly at the cut is replaced by the boundary pair.
    }

    left.push(PositionKeyframe::new(cut, cut_value));
    right.push(PositionKeyframe::new(0.0, cut_value));

    normalize_keyframes(&mut left, cut);
    normalize_keyframes(&mut right, (duration - cut).max(0.0));
    (left, right)
}
