//! The shared compositor: one function renders the frame for a timeline
//! time, used verbatim by live preview and export.

use framecut_core::{FrameRate, Matte, Raster, Result, Rgba, Vec2};
use framecut_timeline::{
    find_clip_at_time, find_mask_at_time, resolve_position, Clip, Mask, MaskHit, Track, TrackKind,
};
use tracing::trace;
use uuid::Uuid;

use crate::surface::{Placement, Surface};

/// Outcome of resolving one clip's frame.
#[derive(Debug)]
pub enum FrameStatus<'a> {
    Ready(&'a Raster),
    /// A seek or decode is in flight — skip the track this frame.
    Pending,
    /// No frame will come for this clip (missing still, audio clip).
    Unavailable,
}

/// Resolves a clip + source time to pixels.
///
/// Implementations own seek policy: when the handle's position has drifted
/// more than one output frame from the wanted time they request an async
/// seek, reporting `Pending` until it lands or times out.
pub trait FrameSources {
    fn frame_for(
        &mut self,
        clip: &Clip,
        source_time: f64,
        frame_rate: FrameRate,
    ) -> FrameStatus<'_>;
}

/// Masks to consult during a composite, plus the live-edit overlay.
pub struct MasksView<'a> {
    pub masks: &'a [Mask],
    /// The mask under edit and its live drawing surface.
    pub editing: Option<(Uuid, &'a Matte)>,
}

impl<'a> MasksView<'a> {
    pub fn committed(masks: &'a [Mask]) -> Self {
        Self {
            masks,
            editing: None,
        }
    }
}

/// Rendering options differing between the preview and export paths.
#[derive(Debug, Clone, Copy)]
pub struct CompositeOptions {
    /// Opaque background color, or `None` to leave transparency.
    pub background: Option<Rgba>,
}

/// Session-owned compositor state (scratch surface reuse).
pub struct Compositor {
    canvas_size: (u32, u32),
    scratch: Surface,
}

impl Compositor {
    pub fn new(canvas_size: (u32, u32)) -> Self {
        Self {
            canvas_size,
            scratch: Surface::new(canvas_size.0, canvas_size.1),
        }
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }

    /// Draw the composited frame for timeline time `time` into `target`.
    ///
    /// Tracks render in ascending z order (background first). Per track:
    /// resolve the active clip, its frame, its keyframed position, rotation
    /// about the clip center, opacity; a mask active on the track routes the
    /// draw through a scratch surface for the destination-alpha multiply.
    /// Transient misses (pending seek, undecoded still) skip the track.
    #[allow(clippy::too_many_arguments)]
    pub fn composite(
        &mut self,
        target: &mut Surface,
        time: f64,
        frame_rate: FrameRate,
        tracks: &[Track],
        clips: &[Clip],
        masks: &MasksView<'_>,
        sources: &mut dyn FrameSources,
        options: CompositeOptions,
    ) -> Result<()> {
        match options.background {
            Some(color) => target.clear(color),
            None => target.clear_transparent(),
        }

        let mut ordered: Vec<&Track> = tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Video && t.visible)
            .collect();
        ordered.sort_by_key(|t| t.z_index);

        for track in ordered {
            let mut on_track: Vec<&Clip> =
                clips.iter().filter(|c| c.track_id == track.id).collect();
            on_track.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
            let Some(clip) = find_clip_at_time(&on_track, time) else {
                continue;
            };
            if !clip.visible || clip.opacity <= 0.0 {
                continue;
            }

            let frame = match sources.frame_for(clip, clip.source_time(time), frame_rate) {
                FrameStatus::Ready(frame) => frame,
                FrameStatus::Pending => {
                    trace!(clip = %clip.id, "frame pending — track skipped");
                    continue;
                }
                FrameStatus::Unavailable => continue,
            };

            let canvas_center = Vec2::new(
                self.canvas_size.0 as f32 * 0.5,
                self.canvas_size.1 as f32 * 0.5,
            );
            let position =
                resolve_position(&clip.position_keyframes, clip.local_time(time), clip.position);
            let placement = Placement {
                center: canvas_center + position,
                scale: clip.effective_scale(),
                rotation_degrees: clip.rotation,
            };

            let mask_hit = find_mask_at_time(
                masks.masks,
                track.id,
                time,
                masks.editing.map(|(id, _)| id),
            );

            match mask_hit {
                Some(hit) => {
                    self.scratch.clear_transparent();
                    self.scratch.draw_raster(frame, &placement, 1.0);
                    let mask = hit.mask();
                    match (&hit, masks.editing) {
                        (MaskHit::Live(_), Some((_, live))) => {
                            self.scratch
                                .apply_matte(&framecut_timeline::MatteRef::Single(live));
                        }
                        _ => {
                            if let Some(matte) =
                                mask.matte_at(time - mask.start_time)
                            {
                                self.scratch.apply_matte(&matte);
                            }
                        }
                    }
                    target.composite_over(&self.scratch, clip.opacity);
                }
                None => {
                    target.draw_raster(frame, &placement, clip.opacity);
                }
            }
        }

        Ok(())
    }
}
