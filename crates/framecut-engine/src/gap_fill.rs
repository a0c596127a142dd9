//! Fill a timeline gap with AI-interpolated stills.
//!
//! The interpolator itself is an opaque collaborator: two boundary frames
//! in, N intermediates out. Each intermediate becomes an image clip placed
//! evenly across the gap; the encoded bytes are persisted by clip id, with
//! every synthesized clip sharing one source group.

use std::sync::Arc;

use framecut_core::{FramecutError, Raster, Result, TimeRange};
use framecut_media::{BlobStore, FrameInterpolator};
use framecut_timeline::{Clip, ClipKind, Project};
use tracing::info;
use uuid::Uuid;

fn encode_png(raster: &Raster) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image::write_buffer_with_format(
        &mut std::io::Cursor::new(&mut bytes),
        raster.data(),
        raster.width(),
        raster.height(),
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| FramecutError::Encoder(format!("still encode failed: {e}")))?;
    Ok(bytes)
}

/// Synthesize image clips that fill `gap` on a track.
///
/// Returns the new clip ids in timeline order. `progress` spans the
/// interpolation phase.
#[allow(clippy::too_many_arguments)]
pub fn fill_gap_with_interpolation(
    project: &mut Project,
    track_id: Uuid,
    gap: TimeRange,
    from: &Raster,
    to: &Raster,
    steps: usize,
    high_quality: bool,
    interpolator: &dyn FrameInterpolator,
    store: &dyn BlobStore,
    progress: &mut dyn FnMut(f32),
) -> Result<Vec<Uuid>> {
    if steps == 0 || gap.duration <= 0.0 {
        return Ok(Vec::new());
    }

    let frames = interpolator.interpolate(from, to, steps, high_quality, progress)?;
    info!(count = frames.len(), seconds = gap.duration, "interpolated gap frames");

    let slot = gap.duration / frames.len() as f64;
    let source_id = Uuid::new_v4();
    let mut placed = Vec::with_capacity(frames.len());

    for (index, frame) in frames.iter().enumerate() {
        let bytes = encode_png(frame)?;

        let mut clip = Clip::image(track_id, format!("interp {}", index + 1), slot);
        clip.source_id = source_id;
        clip.start_time = gap.start + index as f64 * slot;
        clip.kind = ClipKind::Image {
            still: Some(bytes.clone()),
        };

        let clip_id = clip.id;
        store.save(&clip_id.to_string(), Arc::new(bytes))?;
        match project.insert_clip(clip) {
            Some(id) => placed.push(id),
            None => {
                store.remove(&clip_id.to_string());
            }
        }
    }

    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecut_core::FrameRate;
    use framecut_media::testing::DissolveInterpolator;
    use framecut_media::MemoryBlobStore;
    use framecut_timeline::TrackKind;

    fn project() -> Project {
        Project::new("g", (4, 4), FrameRate::FPS_30)
    }

    fn video_track(p: &Project) -> Uuid {
        p.tracks
            .iter()
            .find(|t| t.kind == TrackKind::Video)
            .unwrap()
            .id
    }

    #[test]
    fn test_gap_filled_evenly() {
        let mut p = project();
        let vt = video_track(&p);
        let store = MemoryBlobStore::new();
        let from = Raster::solid(4, 4, [0, 0, 0, 255]);
        let to = Raster::solid(4, 4, [200, 200, 200, 255]);

        let mut last = 0.0;
        let placed = fill_gap_with_interpolation(
            &mut p,
            vt,
            TimeRange::new(10.0, 3.0),
            &from,
            &to,
            3,
            false,
            &DissolveInterpolator,
            &store,
            &mut |f| last = f,
        )
        .unwrap();

        assert_eq!(placed.len(), 3);
        assert_eq!(last, 1.0);
        assert_eq!(store.len(), 3);

        for (i, id) in placed.iter().enumerate() {
            let clip = p.clip(*id).unwrap();
            assert!((clip.start_time - (10.0 + i as f64)).abs() < 1e-9);
            assert!((clip.duration - 1.0).abs() < 1e-9);
            assert!(matches!(&clip.kind, ClipKind::Image { still: Some(_) }));
            // One shared source group for blob reuse.
            assert_eq!(clip.source_id, p.clip(placed[0]).unwrap().source_id);
        }
    }

    #[test]
    fn test_zero_steps_is_noop() {
        let mut p = project();
        let vt = video_track(&p);
        let store = MemoryBlobStore::new();
        let frame = Raster::solid(4, 4, [1, 1, 1, 255]);
        let placed = fill_gap_with_interpolation(
            &mut p,
            vt,
            TimeRange::new(0.0, 1.0),
            &frame,
            &frame,
            0,
            false,
            &DissolveInterpolator,
            &store,
            &mut |_| {},
        )
        .unwrap();
        assert!(placed.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_audio_track_rejected_cleanly() {
        let mut p = project();
        let at = p
            .tracks
            .iter()
            .find(|t| t.kind == TrackKind::Audio)
            .unwrap()
            .id;
        let store = MemoryBlobStore::new();
        let frame = Raster::solid(4, 4, [1, 1, 1, 255]);
        let placed = fill_gap_with_interpolation(
            &mut p,
            at,
            TimeRange::new(0.0, 1.0),
            &frame,
            &frame,
            2,
            false,
            &DissolveInterpolator,
            &store,
            &mut |_| {},
        )
        .unwrap();
        // Image clips cannot land on an audio track; stored bytes rolled back.
        assert!(placed.is_empty());
        assert!(store.is_empty());
    }
}
