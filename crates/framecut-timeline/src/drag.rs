//! Stateless helpers consumed by pointer-drag sessions.
//!
//! The drag state machine, trim clamps, razor split, edge auto-scroll, and
//! the single-clip track-swap decision all live here; the owning session
//! applies the results through the project's mutation API.

use framecut_core::Vec2;
use uuid::Uuid;

use crate::clip::Clip;
use crate::keyframe::slice_position_keyframes;

/// Shortest clip a trim may leave behind, seconds.
pub const MIN_CLIP_DURATION: f64 = 0.1;

// ── Drag state machine ──────────────────────────────────────────

/// What a pointer-drag session is currently doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// Scrubbing the playhead.
    Playhead,
    /// Moving a clip; `grab_offset` is pointer time minus clip start at
    /// grab, so the clip does not jump under the cursor.
    ClipMove { clip_id: Uuid, grab_offset: f64 },
    TrimStart { clip_id: Uuid },
    TrimEnd { clip_id: Uuid },
}

impl Default for DragState {
    fn default() -> Self {
        Self::Idle
    }
}

// ── Auto-scroll ─────────────────────────────────────────────────

/// Edge auto-scroll tuning.
#[derive(Debug, Clone, Copy)]
pub struct AutoScrollParams {
    /// Width of the hot zone at each edge, pixels.
    pub edge_px: f32,
    /// Scroll speed cap, pixels per step.
    pub max_step_px: f32,
}

impl Default for AutoScrollParams {
    fn default() -> Self {
        Self {
            edge_px: 48.0,
            max_step_px: 24.0,
        }
    }
}

/// Scroll delta for a pointer at `x` in a viewport of `width` pixels.
///
/// Zero inside the dead zone; quadratic ease-in toward either edge, so the
/// scroll accelerates as the pointer digs into the hot zone. Negative =
/// scroll left.
pub fn auto_scroll_step(x: f32, width: f32, params: &AutoScrollParams) -> f32 {
    if params.edge_px <= 0.0 || width <= params.edge_px * 2.0 {
        return 0.0;
    }
    if x < params.edge_px {
        let depth = ((params.edge_px - x) / params.edge_px).clamp(0.0, 1.0);
        -(depth * depth) * params.max_step_px
    } else if x > width - params.edge_px {
        let depth = ((x - (width - params.edge_px)) / params.edge_px).clamp(0.0, 1.0);
        (depth * depth) * params.max_step_px
    } else {
        0.0
    }
}

// ── Single-clip track swap ──────────────────────────────────────

/// Swap trigger tuning.
#[derive(Debug, Clone, Copy)]
pub struct TrackSwapParams {
    /// Fraction of the neighbor's duration the candidate must intrude
    /// before a swap fires.
    pub trigger_ratio: f64,
}

impl Default for TrackSwapParams {
    fn default() -> Self {
        Self { trigger_ratio: 0.5 }
    }
}

/// A resolved swap: new start times for the dragged clip and its neighbor,
/// preserving the gap that existed between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapDecision {
    pub dragged_start: f64,
    pub neighbor_id: Uuid,
    pub neighbor_start: f64,
}

/// Decide whether a lone dragged clip should swap places with an adjacent
/// clip instead of overlapping it.
///
/// Fires only for a single selected clip moving within its own track. The
/// candidate position must have advanced past `trigger_ratio` of the
/// neighbor's span; the gap between the two clips survives the swap.
pub fn resolve_track_swap(
    dragged: &Clip,
    candidate_start: f64,
    track_clips: &[&Clip],
    selected_count: usize,
    target_track: Uuid,
    params: &TrackSwapParams,
) -> Option<SwapDecision> {
    if selected_count != 1 || target_track != dragged.track_id {
        return None;
    }

    let candidate_end = candidate_start + dragged.duration;

    // Forward: intruding into the next clip.
    let next = track_clips
        .iter()
        .filter(|c| c.id != dragged.id && c.start_time >= dragged.end_time())
        .min_by(|a, b| a.start_time.total_cmp(&b.start_time));
    if let Some(next) = next {
        let intrusion = candidate_end - next.start_time;
        if intrusion > 0.0 && intrusion >= next.duration * params.trigger_ratio {
            let gap = next.start_time - dragged.end_time();
            return Some(SwapDecision {
                neighbor_id: next.id,
                neighbor_start: dragged.start_time,
                dragged_start: dragged.start_time + next.duration + gap,
            });
        }
    }

    // Backward: intruding into the previous clip.
    let prev = track_clips
        .iter()
        .filter(|c| c.id != dragged.id && c.end_time() <= dragged.start_time)
        .max_by(|a, b| a.end_time().total_cmp(&b.end_time()));
    if let Some(prev) = prev {
        let intrusion = prev.end_time() - candidate_start;
        if intrusion > 0.0 && intrusion >= prev.duration * params.trigger_ratio {
            let gap = dragged.start_time - prev.end_time();
            return Some(SwapDecision {
                neighbor_id: prev.id,
                neighbor_start: prev.start_time + dragged.duration + gap,
                dragged_start: prev.start_time,
            });
        }
    }

    None
}

// ── Trim ────────────────────────────────────────────────────────

/// Clip placement captured when a trim drag begins.
#[derive(Debug, Clone, Copy)]
pub struct TrimOrigin {
    pub start_time: f64,
    pub duration: f64,
    pub trim_in: f64,
    pub trim_out: f64,
}

impl TrimOrigin {
    pub fn capture(clip: &Clip) -> Self {
        Self {
            start_time: clip.start_time,
            duration: clip.duration,
            trim_in: clip.trim_in,
            trim_out: clip.trim_out,
        }
    }
}

/// Drag the clip's leading edge to `pointer_time`.
///
/// Clamps to the minimum clip duration, to timeline zero, and to the start
/// of the source window (a clip cannot reveal media before its source's
/// first sample; stills have no such limit).
pub fn trim_start_to(clip: &mut Clip, origin: &TrimOrigin, pointer_time: f64) {
    let max_start = origin.start_time + origin.duration - MIN_CLIP_DURATION;
    let min_start = (origin.start_time - origin.trim_in).max(0.0);
    let new_start = pointer_time.clamp(min_start.min(max_start), max_start);

    let delta = new_start - origin.start_time;
    clip.start_time = new_start;
    clip.duration = origin.duration - delta;
    clip.trim_in = origin.trim_in + delta;
}

/// Drag the clip's trailing edge to `pointer_time`.
///
/// Clamps to the minimum clip duration and to the end of the source.
pub fn trim_end_to(clip: &mut Clip, origin: &TrimOrigin, pointer_time: f64) {
    let source_cap = clip.kind.source_duration() - origin.trim_in;
    let max_duration = source_cap.max(MIN_CLIP_DURATION);
    let new_duration =
        (pointer_time - origin.start_time).clamp(MIN_CLIP_DURATION, max_duration);

    clip.duration = new_duration;
    clip.trim_out = origin.trim_in + new_duration;
}

// ── Split ───────────────────────────────────────────────────────

/// Razor a clip at a timeline time.
///
/// Returns the replacement pair, with the source window re-based and the
/// position keyframes partitioned without a value discontinuity at the cut.
/// `None` when the cut would leave a sliver shorter than the minimum on
/// either side.
pub fn split_clip(clip: &Clip, timeline_time: f64) -> Option<(Clip, Clip)> {
    let local = clip.local_time(timeline_time);
    if local < MIN_CLIP_DURATION || local > clip.duration - MIN_CLIP_DURATION {
        return None;
    }

    let (left_keyframes, right_keyframes) =
        slice_position_keyframes(&clip.position_keyframes, local, clip.duration, clip.position);

    let mut left = clip.clone();
    left.duration = local;
    left.trim_out = clip.trim_in + local;
    left.position_keyframes = left_keyframes;

    let mut right = clip.duplicate();
    right.start_time = clip.start_time + local;
    right.duration = clip.duration - local;
    right.trim_in = clip.trim_in + local;
    right.trim_out = clip.trim_out;
    right.position_keyframes = right_keyframes;

    Some((left, right))
}

/// Resolved static position helper for hit-testing during drags.
pub fn position_at(clip: &Clip, timeline_time: f64) -> Vec2 {
    crate::keyframe::resolve_position(
        &clip.position_keyframes,
        clip.local_time(timeline_time),
        clip.position,
    )
}
