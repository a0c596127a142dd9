//! Integration tests for the timeline subsystem.
//!
//! Exercises the end-to-end clip placement story,
//! the no-overlap invariant under operation sequences (including a proptest
//! sweep), split semantics, and the dual-mode overlap boundary.

use framecut_core::{FrameRate, Vec2};
use framecut_timeline::{
    has_track_overlap, resolve_position, upsert_position_keyframe_at, Clip, Project, TrackKind,
    TrimOrigin,
};
use proptest::prelude::*;
use uuid::Uuid;

// ── Helpers ────────────────────────────────────────────────────

fn build_project() -> Project {
    Project::new("Integration Test Project", (1920, 1080), FrameRate::FPS_30)
}

fn video_track(project: &Project) -> Uuid {
    project
        .tracks
        .iter()
        .find(|t| t.kind == TrackKind::Video)
        .unwrap()
        .id
}

fn placed_video(track: Uuid, start: f64, duration: f64) -> Clip {
    let mut clip = Clip::video(track, "video", duration, (1920, 1080), true);
    clip.start_time = start;
    clip
}

// ── End-to-end scenario ─────────────────────────────────────────

#[test]
fn end_to_end_placement_scenario() {
    // A 10s video at t=0 and a 3s image at t=12 on the same track.
    let mut project = build_project();
    let track = video_track(&project);

    let video_id = project
        .insert_clip(placed_video(track, 0.0, 10.0))
        .unwrap();
    let mut image = Clip::image(track, "image", 3.0);
    image.start_time = 12.0;
    let image_id = project.insert_clip(image).unwrap();

    // t=5: the video clip. t=10.5: the gap.
    assert_eq!(project.clip_at(track, 5.0).unwrap().id, video_id);
    assert!(project.clip_at(track, 10.5).is_none());

    // Moving the image to t=8 would overlap; it is auto-pushed to t=10.
    assert!(project.move_clip(image_id, track, 8.0));
    assert_eq!(project.clip_at(track, 10.0).unwrap().id, image_id);
    assert!((project.clip(image_id).unwrap().start_time - 10.0).abs() < 1e-9);
}

// ── No-overlap invariant ────────────────────────────────────────

fn assert_no_overlaps(project: &Project, rate: Option<FrameRate>) {
    for clip in &project.clips {
        assert!(
            !has_track_overlap(&project.clips, clip, None, rate),
            "clip {} overlaps a neighbor",
            clip.id
        );
    }
}

#[test]
fn no_overlap_after_move_trim_split_paste() {
    let mut project = build_project();
    let track = video_track(&project);
    let rate = project.frame_rate;

    let a = project.insert_clip(placed_video(track, 0.0, 8.0)).unwrap();
    let b = project.insert_clip(placed_video(track, 9.0, 4.0)).unwrap();
    assert_no_overlaps(&project, Some(rate));

    // Move B on top of A.
    project.move_clip(b, track, 2.0);
    assert_no_overlaps(&project, Some(rate));

    // Trim A's end into its neighbor.
    let origin = TrimOrigin::capture(project.clip(a).unwrap());
    project.trim_clip_end(a, &origin, 100.0);
    assert_no_overlaps(&project, Some(rate));

    // Split A and duplicate a half.
    let (left, _right) = project.split_clip_at(a, 3.0).unwrap();
    project.duplicate_clip(left).unwrap();
    assert_no_overlaps(&project, Some(rate));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn no_overlap_invariant_random_inserts_and_moves(
        ops in prop::collection::vec((0.0f64..60.0, 0.5f64..8.0), 1..24)
    ) {
        let mut project = build_project();
        let track = video_track(&project);
        let mut ids = Vec::new();

        for (start, duration) in &ops {
            let mut clip = Clip::image(track, "c", *duration);
            clip.start_time = *start;
            if let Some(id) = project.insert_clip(clip) {
                ids.push(id);
            }
            assert_no_overlaps(&project, Some(FrameRate::FPS_30));
        }

        // Move every clip somewhere arbitrary; the invariant must hold
        // after each mutation.
        for (i, id) in ids.iter().enumerate() {
            let target = (i as f64 * 7.3) % 50.0;
            project.move_clip(*id, track, target);
            assert_no_overlaps(&project, Some(FrameRate::FPS_30));
        }
    }
}

// ── Dual-mode overlap boundary (flagged open question) ─────────

#[test]
fn frame_quantized_vs_continuous_boundary() {
    let track = Uuid::new_v4();
    let rate = FrameRate::FPS_30;

    // B starts 10µs before A's end: adjacent at the frame boundary for
    // frame-mode callers, an overlap for continuous-mode callers.
    let a = placed_video(track, 0.0, 5.0);
    let b = placed_video(track, 5.0 - 1e-5, 2.0);
    let clips = vec![a];

    // Continuous mode sees the sliver; frame mode treats them as adjacent.
    assert!(has_track_overlap(&clips, &b, None, None));
    assert!(!has_track_overlap(&clips, &b, None, Some(rate)));

    // A full-frame intrusion is an overlap in both modes.
    let c = placed_video(track, 5.0 - 2.0 * rate.frame_duration(), 2.0);
    assert!(has_track_overlap(&clips, &c, None, None));
    assert!(has_track_overlap(&clips, &c, None, Some(rate)));
}

// ── Split semantics ─────────────────────────────────────────────

#[test]
fn split_preserves_total_duration_and_source_window() {
    let mut project = build_project();
    let track = video_track(&project);
    let mut clip = placed_video(track, 2.0, 10.0);
    clip.trim_in = 1.0;
    clip.trim_out = 11.0;
    let id = project.insert_clip(clip).unwrap();

    let (left_id, right_id) = project.split_clip_at(id, 6.0).unwrap();
    let left = project.clip(left_id).unwrap().clone();
    let right = project.clip(right_id).unwrap().clone();

    assert!((left.duration - 4.0).abs() < 1e-9);
    assert!((right.duration - 6.0).abs() < 1e-9);
    assert!((left.duration + right.duration - 10.0).abs() < 1e-9);
    // Concatenated source window is exactly the original trim_in..trim_out.
    assert!((left.trim_in - 1.0).abs() < 1e-9);
    assert!((left.trim_out - right.trim_in).abs() < 1e-9);
    assert!((right.trim_out - 11.0).abs() < 1e-9);
}

#[test]
fn split_partitions_keyframes_without_discontinuity() {
    let mut project = build_project();
    let track = video_track(&project);
    let mut clip = placed_video(track, 0.0, 8.0);
    upsert_position_keyframe_at(&mut clip, 0.0, Vec2::ZERO, false);
    upsert_position_keyframe_at(&mut clip, 8.0, Vec2::new(400.0, 80.0), false);
    let id = project.insert_clip(clip).unwrap();

    let (left_id, right_id) = project.split_clip_at(id, 6.0).unwrap();
    let left = project.clip(left_id).unwrap();
    let right = project.clip(right_id).unwrap();

    let at_cut = Vec2::new(300.0, 60.0);
    let left_end = resolve_position(&left.position_keyframes, left.duration, left.position);
    let right_start = resolve_position(&right.position_keyframes, 0.0, right.position);
    assert!((left_end - at_cut).length() < 1e-3);
    assert!((right_start - at_cut).length() < 1e-3);

    // Monotone, in-range keyframes on both halves.
    for half in [left, right] {
        let times: Vec<f64> = half.position_keyframes.iter().map(|k| k.time).collect();
        for pair in times.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for t in times {
            assert!((0.0..=half.duration).contains(&t));
        }
    }
}

// ── Interpolation boundary (spec property) ─────────────────────

#[test]
fn interpolation_boundary_property() {
    let mut clip = Clip::image(Uuid::new_v4(), "kf", 10.0);
    upsert_position_keyframe_at(&mut clip, 0.0, Vec2::new(0.0, 0.0), false);
    upsert_position_keyframe_at(&mut clip, 2.0, Vec2::new(100.0, 200.0), false);

    let resolve = |t: f64| resolve_position(&clip.position_keyframes, t, Vec2::ZERO);
    assert_eq!(resolve(-1.0), Vec2::new(0.0, 0.0));
    assert_eq!(resolve(3.0), Vec2::new(100.0, 200.0));
    assert_eq!(resolve(1.0), Vec2::new(50.0, 100.0));
}

// ── Drag swap determinism (spec property) ──────────────────────

#[test]
fn drag_swap_preserves_gap() {
    use framecut_timeline::{resolve_track_swap, TrackSwapParams};

    let mut project = build_project();
    let track = video_track(&project);
    let dragged = project.insert_clip(placed_video(track, 0.0, 4.0)).unwrap();
    let neighbor = project.insert_clip(placed_video(track, 5.5, 6.0)).unwrap();

    let dragged_clip = project.clip(dragged).unwrap().clone();
    let sorted = project.track_clips(track);
    let swap = resolve_track_swap(
        &dragged_clip,
        5.0, // candidate end 9.0 intrudes 3.5 into the 6s neighbor
        &sorted,
        1,
        track,
        &TrackSwapParams { trigger_ratio: 0.5 },
    )
    .unwrap();

    assert!(project.apply_swap(dragged, &swap));
    let dragged_clip = project.clip(dragged).unwrap();
    let neighbor_clip = project.clip(neighbor).unwrap();
    // Layout after: [neighbor][gap 1.5][dragged]
    assert!((neighbor_clip.start_time - 0.0).abs() < 1e-9);
    assert!((dragged_clip.start_time - 7.5).abs() < 1e-9);
    assert!(
        (dragged_clip.start_time - neighbor_clip.end_time() - 1.5).abs() < 1e-9
    );
    assert_no_overlaps(&project, Some(project.frame_rate));
}
