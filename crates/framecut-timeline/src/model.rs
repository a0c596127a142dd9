//! Placement helpers enforcing the per-track no-overlap invariant.
//!
//! Every mutation path that places a clip — move, trim, split, paste,
//! duplicate — routes through these functions. Overlap checks run in one of
//! two modes: frame-quantized when a frame rate is supplied (floor for
//! starts, ceil for ends, so clips touching at a frame boundary are never
//! falsely flagged), continuous within an epsilon otherwise.

use framecut_core::{FrameRate, TimeRange};
use uuid::Uuid;

use crate::clip::Clip;

/// Clips on a track, sorted ascending by start time.
pub fn clips_on_track(clips: &[Clip], track_id: Uuid) -> Vec<&Clip> {
    let mut on_track: Vec<&Clip> = clips.iter().filter(|c| c.track_id == track_id).collect();
    on_track.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    on_track
}

fn ranges_overlap(a: &Clip, b: &Clip, frame_rate: Option<FrameRate>) -> bool {
    match frame_rate {
        Some(rate) => a.time_range().overlaps_at_rate(b.time_range(), rate),
        None => a.time_range().overlaps(b.time_range()),
    }
}

/// Does `candidate` collide with any other clip on its track?
///
/// `exclude` ignores one clip id (the clip being moved). The candidate's own
/// id is always ignored.
pub fn has_track_overlap(
    clips: &[Clip],
    candidate: &Clip,
    exclude: Option<Uuid>,
    frame_rate: Option<FrameRate>,
) -> bool {
    clips.iter().any(|other| {
        other.track_id == candidate.track_id
            && other.id != candidate.id
            && Some(other.id) != exclude
            && ranges_overlap(candidate, other, frame_rate)
    })
}

/// Push a candidate start time forward past conflicting clips on a track,
/// iterating until stable.
///
/// Legacy projects can contain overlapping clips, so each pass jumps to the
/// end of the *latest-ending* conflict rather than the first one found.
pub fn safe_clip_start(
    clips: &[Clip],
    track_id: Uuid,
    desired_start: f64,
    duration: f64,
    exclude: Option<Uuid>,
    frame_rate: Option<FrameRate>,
) -> f64 {
    let on_track = clips_on_track(clips, track_id);
    let mut start = desired_start.max(0.0);

    let window_overlaps = |start: f64, other: &Clip| {
        let window = TimeRange::new(start, duration);
        match frame_rate {
            Some(rate) => window.overlaps_at_rate(other.time_range(), rate),
            None => window.overlaps(other.time_range()),
        }
    };

    loop {
        let conflict_end = on_track
            .iter()
            .copied()
            .filter(|other| Some(other.id) != exclude)
            .filter(|&other| window_overlaps(start, other))
            .map(|other| other.end_time())
            .fold(None::<f64>, |acc, end| {
                Some(acc.map_or(end, |a| a.max(end)))
            });

        match conflict_end {
            Some(end) if end > start => start = end,
            Some(_) | None => return start,
        }
    }
}

/// Rightmost clip on a time-sorted track slice whose start is ≤ `time` and
/// whose interval contains it.
///
/// Binary search first; a linear scan backward tolerates legacy unsorted or
/// overlapping data.
pub fn find_clip_at_time<'a>(track_clips: &[&'a Clip], time: f64) -> Option<&'a Clip> {
    let idx = track_clips.partition_point(|c| c.start_time <= time);
    if idx == 0 {
        return None;
    }
    let candidate = track_clips[idx - 1];
    if candidate.time_range().contains(time) {
        return Some(candidate);
    }
    track_clips[..idx]
        .iter()
        .rev()
        .find(|c| c.time_range().contains(time))
        .copied()
}

/// Derived project duration: the max clip end, floored to a minimum.
pub fn project_duration(clips: &[Clip], min_duration: f64) -> f64 {
    clips
        .iter()
        .map(Clip::end_time)
        .fold(min_duration, f64::max)
}
