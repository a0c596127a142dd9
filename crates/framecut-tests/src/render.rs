//! Export/preview parity: both paths share the compositor, so the same
//! project at the same time yields pixel-identical output modulo the
//! preview's letterboxing and background.

use framecut_compositor::{
    CompositeOptions, Compositor, FrameSources, FrameStatus, MasksView, PreviewRenderer, Surface,
};
use framecut_core::{FrameRate, Matte, Raster, Vec2};
use framecut_timeline::{Clip, Mask, Project, TrackKind};
use uuid::Uuid;

struct SolidSources(Raster);

impl FrameSources for SolidSources {
    fn frame_for(
        &mut self,
        _clip: &Clip,
        _source_time: f64,
        _frame_rate: FrameRate,
    ) -> FrameStatus<'_> {
        FrameStatus::Ready(&self.0)
    }
}

/// A rotated, masked, opacity-scaled clip — the parity scenario.
fn parity_project() -> Project {
    let mut project = Project::new("parity", (32, 32), FrameRate::FPS_30);
    let track = project
        .tracks
        .iter()
        .find(|t| t.kind == TrackKind::Video)
        .unwrap()
        .id;

    let mut clip = Clip::video(track, "v", 10.0, (16, 16), false);
    clip.rotation = 30.0;
    clip.opacity = 0.7;
    clip.scale = 1.5;
    clip.position = Vec2::new(2.0, -3.0);
    project.insert_clip(clip).unwrap();

    let mut mask = Mask::new(track, 0.0, 10.0, (32, 32));
    let mut matte = Matte::opaque(32, 32);
    for y in 0..32 {
        for x in 16..32 {
            matte.set(x, y, 40); // right half mostly cut
        }
    }
    mask.commit_static(matte);
    project.add_mask(mask).unwrap();
    project
}

#[test]
fn export_and_preview_paths_are_pixel_identical() {
    let project = parity_project();
    let frame = Raster::solid(16, 16, [180, 90, 45, 255]);

    // Export path: direct composite at 1:1.
    let mut export_sources = SolidSources(frame.clone());
    let mut compositor = Compositor::new(project.canvas_size);
    let mut export_surface = Surface::new(32, 32);
    compositor
        .composite(
            &mut export_surface,
            2.0,
            project.frame_rate,
            &project.tracks,
            &project.clips,
            &MasksView::committed(&project.masks),
            &mut export_sources,
            CompositeOptions { background: None },
        )
        .unwrap();

    // Preview path: same composite, then letterbox fit. The internal
    // project-resolution frame must match the export surface exactly.
    let mut preview_sources = SolidSources(frame);
    let mut renderer = PreviewRenderer::new(project.canvas_size);
    let mut viewport = Surface::new(64, 48);
    renderer
        .render(
            &mut viewport,
            2.0,
            project.frame_rate,
            &project.tracks,
            &project.clips,
            &MasksView::committed(&project.masks),
            &mut preview_sources,
        )
        .unwrap();

    assert_eq!(
        renderer.last_frame().raster().data(),
        export_surface.raster().data(),
        "preview and export composites diverged"
    );

    // Sanity: the scenario actually exercised opacity and the matte.
    let center = export_surface.raster().pixel(16, 16);
    assert!(center[3] > 0 && center[3] < 255);
}

#[test]
fn compositing_is_deterministic_across_calls() {
    let project = parity_project();
    let frame = Raster::solid(16, 16, [10, 200, 250, 255]);

    let render_once = || {
        let mut sources = SolidSources(frame.clone());
        let mut compositor = Compositor::new(project.canvas_size);
        let mut surface = Surface::new(32, 32);
        compositor
            .composite(
                &mut surface,
                1.5,
                project.frame_rate,
                &project.tracks,
                &project.clips,
                &MasksView::committed(&project.masks),
                &mut sources,
                CompositeOptions {
                    background: Some([0, 0, 0, 255]),
                },
            )
            .unwrap();
        surface.into_raster()
    };

    assert_eq!(render_once().data(), render_once().data());
}

#[test]
fn keyframed_position_moves_the_rendered_clip() {
    let mut project = Project::new("kf", (24, 24), FrameRate::FPS_30);
    let track = project
        .tracks
        .iter()
        .find(|t| t.kind == TrackKind::Video)
        .unwrap()
        .id;
    let mut clip = Clip::video(track, "v", 10.0, (4, 4), false);
    framecut_timeline::upsert_position_keyframe_at(&mut clip, 0.0, Vec2::new(-8.0, 0.0), false);
    framecut_timeline::upsert_position_keyframe_at(&mut clip, 10.0, Vec2::new(8.0, 0.0), false);
    project.insert_clip(clip).unwrap();

    let frame = Raster::solid(4, 4, [255, 255, 255, 255]);
    let render_at = |time: f64| {
        let mut sources = SolidSources(frame.clone());
        let mut compositor = Compositor::new(project.canvas_size);
        let mut surface = Surface::new(24, 24);
        compositor
            .composite(
                &mut surface,
                time,
                project.frame_rate,
                &project.tracks,
                &project.clips,
                &MasksView::committed(&project.masks),
                &mut sources,
                CompositeOptions { background: None },
            )
            .unwrap();
        surface.into_raster()
    };

    // t=0: clip center at canvas center -8 in x. t=10: +8.
    let early = render_at(0.0);
    let late = render_at(10.0 - 1e-6);
    assert_eq!(early.pixel(4, 12)[3], 255);
    assert_eq!(early.pixel(20, 12)[3], 0);
    assert_eq!(late.pixel(20, 12)[3], 255);
    assert_eq!(late.pixel(4, 12)[3], 0);
}

#[test]
fn mask_window_limits_matte_in_time() {
    let mut project = Project::new("mw", (8, 8), FrameRate::FPS_30);
    let track = project
        .tracks
        .iter()
        .find(|t| t.kind == TrackKind::Video)
        .unwrap()
        .id;
    project
        .insert_clip(Clip::video(track, "v", 20.0, (8, 8), false))
        .unwrap();

    // Mask only covers 5..10; fully transparent matte.
    let mut mask = Mask::new(track, 5.0, 5.0, (8, 8));
    mask.commit_static(Matte::transparent(8, 8));
    project.add_mask(mask).unwrap();

    let frame = Raster::solid(8, 8, [50, 50, 50, 255]);
    let alpha_at = |time: f64| {
        let mut sources = SolidSources(frame.clone());
        let mut compositor = Compositor::new(project.canvas_size);
        let mut surface = Surface::new(8, 8);
        compositor
            .composite(
                &mut surface,
                time,
                project.frame_rate,
                &project.tracks,
                &project.clips,
                &MasksView::committed(&project.masks),
                &mut sources,
                CompositeOptions { background: None },
            )
            .unwrap();
        surface.raster().pixel(4, 4)[3]
    };

    assert_eq!(alpha_at(2.0), 255); // before the mask window
    assert_eq!(alpha_at(7.0), 0); // inside: matte erases everything
    assert_eq!(alpha_at(12.0), 255); // after
}
