//! Integration tests for the export pipeline against the real frame spool,
//! mixdown, and WAV serialization.

use std::path::PathBuf;
use std::sync::Arc;

use framecut_compositor::{FrameSources, FrameStatus};
use framecut_core::{FrameRate, Raster, Result, TimeRange};
use framecut_export::pipeline::ExportInputs;
use framecut_export::{ExportCancel, ExportPipeline, ExportSettings};
use framecut_media::testing::SineAudioDecoder;
use framecut_media::{BlobStore, EncodeJob, Encoder, MemoryBlobStore};
use framecut_timeline::{Clip, Project, TimelineSnapshot, TrackKind};
use parking_lot::Mutex;
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

/// Inspects the spool at encode time and fakes a container.
struct InspectingEncoder {
    seen: Mutex<Option<SpoolObservation>>,
}

struct SpoolObservation {
    frame_files: usize,
    first_frame_bytes: Vec<u8>,
    audio: Option<PathBuf>,
    audio_len: u64,
}

impl InspectingEncoder {
    fn new() -> Self {
        Self {
            seen: Mutex::new(None),
        }
    }
}

impl Encoder for InspectingEncoder {
    fn encode(&self, job: &EncodeJob<'_>, progress: &mut dyn FnMut(f32)) -> Result<()> {
        let frame_files = std::fs::read_dir(job.frames_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_string_lossy()
                    .starts_with("frame_")
            })
            .count();
        let first = job.frames_dir.join("frame_000000.png");
        let first_frame_bytes = std::fs::read(first)?;
        let audio_len = job
            .audio
            .map(|p| std::fs::metadata(p).map(|m| m.len()).unwrap_or(0))
            .unwrap_or(0);

        *self.seen.lock() = Some(SpoolObservation {
            frame_files,
            first_frame_bytes,
            audio: job.audio.map(|p| p.to_path_buf()),
            audio_len,
        });

        progress(1.0);
        std::fs::write(&job.output, b"mp4")?;
        Ok(())
    }
}

fn export_project() -> (TimelineSnapshot, Arc<MemoryBlobStore>) {
    let mut project = Project::new("export-it", (12, 12), FrameRate::FPS_30);
    let vt = project
        .tracks
        .iter()
        .find(|t| t.kind == TrackKind::Video)
        .unwrap()
        .id;
    let at = project
        .tracks
        .iter()
        .find(|t| t.kind == TrackKind::Audio)
        .unwrap()
        .id;
    project
        .insert_clip(Clip::video(vt, "v", 2.0, (12, 12), false))
        .unwrap();
    let audio = Clip::audio(at, "a", 2.0);
    let audio_source = audio.source_id;
    project.insert_clip(audio).unwrap();

    let store = Arc::new(MemoryBlobStore::new());
    // First byte drives the sine decoder's duration: 20 tenths = 2s.
    store
        .save(&audio_source.to_string(), Arc::new(vec![20u8]))
        .unwrap();
    (TimelineSnapshot::from(&project), store)
}

#[test]
fn full_export_spools_frames_and_audio() {
    let (snapshot, store) = export_project();
    let mut settings =
        ExportSettings::new(12, 12, FrameRate::FPS_30, TimeRange::new(0.0, 1.0));
    settings.file_stem = format!("it-{}", Uuid::new_v4());

    let mut sources = SolidSources(Raster::solid(12, 12, [120, 130, 140, 255]));
    let encoder = InspectingEncoder::new();
    let bytes_store = store.clone();
    let source_bytes = move |id: Uuid| bytes_store.load(&id.to_string());
    let decoder = SineAudioDecoder::default();

    let mut inputs = ExportInputs {
        snapshot: &snapshot,
        sources: &mut sources,
        source_bytes: &source_bytes,
        audio_decoder: &decoder,
        encoder: &encoder,
    };

    let result = ExportPipeline::new()
        .run(&settings, &mut inputs, |_| {}, &ExportCancel::new())
        .unwrap();

    let seen = encoder.seen.lock();
    let seen = seen.as_ref().expect("encoder never ran");
    // 1.0s at 30fps: 30 spooled PNGs.
    assert_eq!(seen.frame_files, 30);
    assert_eq!(&seen.first_frame_bytes[1..4], b"PNG");
    // 1s of 48kHz stereo 16-bit WAV plus header.
    assert!(seen.audio.is_some());
    assert_eq!(seen.audio_len, 44 + 48_000 * 2 * 2);

    // The spool was removed after the run; the container survives.
    assert!(!seen.audio.as_ref().unwrap().exists());
    assert!(result.path.exists());
    std::fs::remove_file(result.path).unwrap();
}

#[test]
fn export_without_audio_omits_mixdown() {
    let (snapshot, _store) = export_project();
    let mut settings =
        ExportSettings::new(12, 12, FrameRate::FPS_30, TimeRange::new(0.0, 0.5));
    settings.include_audio = false;
    settings.file_stem = format!("it-{}", Uuid::new_v4());

    let mut sources = SolidSources(Raster::solid(12, 12, [1, 2, 3, 255]));
    let encoder = InspectingEncoder::new();
    let source_bytes = |_id: Uuid| -> Option<Arc<Vec<u8>>> { None };
    let decoder = SineAudioDecoder::default();

    let mut inputs = ExportInputs {
        snapshot: &snapshot,
        sources: &mut sources,
        source_bytes: &source_bytes,
        audio_decoder: &decoder,
        encoder: &encoder,
    };

    let result = ExportPipeline::new()
        .run(&settings, &mut inputs, |_| {}, &ExportCancel::new())
        .unwrap();

    let seen = encoder.seen.lock();
    assert!(seen.as_ref().unwrap().audio.is_none());
    std::fs::remove_file(result.path).unwrap();
}

#[test]
fn export_does_not_touch_live_project() {
    // The pipeline reads a frozen snapshot: edits made mid-export (here,
    // before the run even starts) never affect the frames it renders.
    let mut project = Project::new("live", (8, 8), FrameRate::FPS_30);
    let vt = project
        .tracks
        .iter()
        .find(|t| t.kind == TrackKind::Video)
        .unwrap()
        .id;
    project
        .insert_clip(Clip::video(vt, "v", 2.0, (8, 8), false))
        .unwrap();
    let snapshot = TimelineSnapshot::from(&project);

    // Mutate the live project after snapshotting.
    let clip_id = project.clips[0].id;
    project.remove_clip(clip_id);
    assert!(project.clips.is_empty());
    assert_eq!(snapshot.clips.len(), 1);
}
