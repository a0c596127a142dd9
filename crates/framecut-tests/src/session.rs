//! Session-level integration: edits, history, mask editing, and the
//! compositor's live-mask path working against one shared project.

use framecut_compositor::{CompositeOptions, Compositor, FrameSources, FrameStatus, MasksView, Surface};
use framecut_core::{FrameRate, Raster, Vec2};
use framecut_engine::{EditorSession, MaskEditSession};
use framecut_timeline::{Clip, HistoryTarget, Project, TrackKind};
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

fn session() -> (EditorSession, Uuid) {
    let project = Project::new("session-it", (8, 8), FrameRate::FPS_30);
    let track = project
        .tracks
        .iter()
        .find(|t| t.kind == TrackKind::Video)
        .unwrap()
        .id;
    (EditorSession::new(project), track)
}

#[test]
fn mask_edit_round_trip_through_session() {
    let (mut session, track) = session();
    let project = session.project();

    session.edit(HistoryTarget::Clips, |p| {
        p.insert_clip(Clip::video(track, "v", 4.0, (8, 8), false))
            .unwrap();
    });

    // Begin a mask edit and erase everything; the live surface drives the
    // compositor while the committed matte stays opaque.
    let mut mask_edit = MaskEditSession::new();
    {
        let mut p = project.write();
        mask_edit.begin(&mut p, track, 1.0).unwrap();
    }
    mask_edit.erase(Vec2::new(0.0, 4.0), Vec2::new(8.0, 4.0), 8.0);

    let alpha = {
        let p = project.read();
        let (mask_id, live) = mask_edit.live().unwrap();
        let view = MasksView {
            masks: &p.masks,
            editing: Some((mask_id, live)),
        };
        let mut sources = SolidSources(Raster::solid(8, 8, [90, 90, 90, 255]));
        let mut compositor = Compositor::new(p.canvas_size);
        let mut surface = Surface::new(8, 8);
        compositor
            .composite(
                &mut surface,
                1.0,
                p.frame_rate,
                &p.tracks,
                &p.clips,
                &view,
                &mut sources,
                CompositeOptions { background: None },
            )
            .unwrap();
        surface.raster().pixel(4, 4)[3]
    };
    assert_eq!(alpha, 0, "live surface should drive the composite");

    // Committing writes the strokes back; the committed path now matches.
    {
        let mut p = project.write();
        mask_edit.commit(&mut p);
    }
    let p = project.read();
    let alpha_committed = {
        let mut sources = SolidSources(Raster::solid(8, 8, [90, 90, 90, 255]));
        let mut compositor = Compositor::new(p.canvas_size);
        let mut surface = Surface::new(8, 8);
        compositor
            .composite(
                &mut surface,
                1.0,
                p.frame_rate,
                &p.tracks,
                &p.clips,
                &MasksView::committed(&p.masks),
                &mut sources,
                CompositeOptions { background: None },
            )
            .unwrap();
        surface.raster().pixel(4, 4)[3]
    };
    assert_eq!(alpha_committed, 0);
}

#[test]
fn undo_targets_follow_active_tool() {
    let (mut session, track) = session();
    let project = session.project();

    session.edit(HistoryTarget::Clips, |p| {
        p.insert_clip(Clip::image(track, "i", 2.0)).unwrap();
    });
    session.edit(HistoryTarget::Masks, |p| {
        p.add_mask(framecut_timeline::Mask::new(track, 0.0, 2.0, (8, 8)))
            .unwrap();
    });

    // Mask-tool undo removes the mask but leaves the clip.
    assert!(session.undo(HistoryTarget::Masks));
    {
        let p = project.read();
        assert_eq!(p.clips.len(), 1);
        assert!(p.masks.is_empty());
    }

    // Clip-tool undo then removes the clip.
    assert!(session.undo(HistoryTarget::Clips));
    assert!(project.read().clips.is_empty());
}
