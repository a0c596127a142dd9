//! The export pipeline orchestrator.
//!
//! For frame index 0..total: compute the clamped frame time, run the shared
//! compositor against a frozen snapshot, spool the raster as a PNG; then
//! render the offline audio mixdown, serialize it as WAV, and hand both to
//! the encoder. Progress is one monotonic percentage across three weighted
//! phases with a human-readable stage label. On primary-codec failure the
//! partial output is deleted and the encode retries exactly once with the
//! fallback codec. Temp files are removed on every exit path, and a second
//! concurrent export is refused outright.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use framecut_audio::render_mixdown;
use framecut_audio::mixdown::SourceBytes;
use framecut_compositor::{CompositeOptions, Compositor, FrameSources, MasksView, Surface};
use framecut_core::{FramecutError, Rect, Result};
use framecut_media::{AudioDecoder, EncodeJob, Encoder};
use framecut_timeline::TimelineSnapshot;
use tracing::{info, warn};
use uuid::Uuid;

use crate::format::ExportSettings;
use crate::wav::encode_wav;

const WEIGHT_CAPTURE: f32 = 0.6;
const WEIGHT_AUDIO: f32 = 0.1;
const WEIGHT_ENCODE: f32 = 0.3;

/// Opaque background behind exported frames.
const EXPORT_BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Progress report: a monotonic fraction plus the current stage.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub fraction: f32,
    pub stage: &'static str,
}

/// The finished export, offered for download.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub path: PathBuf,
    /// `video/mp4` or `video/quicktime`.
    pub mime_type: &'static str,
}

/// Handle for cancelling an in-progress export.
#[derive(Debug, Clone, Default)]
pub struct ExportCancel(Arc<AtomicBool>);

impl ExportCancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything the pipeline borrows from the session for one run.
pub struct ExportInputs<'a> {
    pub snapshot: &'a TimelineSnapshot,
    pub sources: &'a mut dyn FrameSources,
    /// Stored bytes per media source, for the audio mixdown.
    pub source_bytes: &'a SourceBytes<'a>,
    pub audio_decoder: &'a dyn AudioDecoder,
    pub encoder: &'a dyn Encoder,
}

/// Removes the spool directory when the run ends, success or failure.
/// Cleanup failures are logged, never surfaced over the primary error.
struct TempDirGuard {
    path: PathBuf,
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!(path = %self.path.display(), "temp cleanup failed: {e}");
        }
    }
}

/// Resets the single-flight flag when a run ends.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The export orchestrator. One instance per session; a run owns its
/// scratch surfaces and caches and leaves live playback state untouched.
pub struct ExportPipeline {
    busy: Arc<AtomicBool>,
}

impl ExportPipeline {
    pub fn new() -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Run one export to completion.
    pub fn run(
        &self,
        settings: &ExportSettings,
        inputs: &mut ExportInputs<'_>,
        mut on_progress: impl FnMut(ExportProgress),
        cancel: &ExportCancel,
    ) -> Result<ExportedFile> {
        if settings.width == 0 || settings.height == 0 || settings.total_frames() == 0 {
            return Err(FramecutError::InvalidParameter(format!(
                "nothing to export: {}x{} over {} frames",
                settings.width,
                settings.height,
                settings.total_frames()
            )));
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FramecutError::ExportBusy);
        }
        let _busy = BusyGuard(self.busy.clone());

        let spool = std::env::temp_dir().join(format!("framecut-export-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&spool)?;
        let _spool_guard = TempDirGuard {
            path: spool.clone(),
        };

        // Monotonic progress: a late phase can never report less than an
        // earlier one did.
        let mut high_water = 0.0f32;
        let mut report = move |fraction: f32, stage: &'static str| {
            high_water = high_water.max(fraction.clamp(0.0, 1.0));
            on_progress(ExportProgress {
                fraction: high_water,
                stage,
            });
        };

        // ── Phase 1: capture ────────────────────────────────────
        let total_frames = settings.total_frames();
        info!(frames = total_frames, "export started");
        let canvas = inputs.snapshot.canvas_size;
        let mut compositor = Compositor::new(canvas);
        let mut frame_surface = Surface::new(canvas.0, canvas.1);
        let mut scaled_surface = Surface::new(settings.width, settings.height);
        let needs_scale = (settings.width, settings.height) != canvas;

        for index in 0..total_frames {
            if cancel.is_cancelled() {
                return Err(FramecutError::Cancelled);
            }
            let time = settings.frame_time(index);
            compositor.composite(
                &mut frame_surface,
                time,
                settings.frame_rate,
                &inputs.snapshot.tracks,
                &inputs.snapshot.clips,
                &MasksView::committed(&inputs.snapshot.masks),
                inputs.sources,
                CompositeOptions {
                    background: Some(EXPORT_BACKGROUND),
                },
            )?;

            let raster = if needs_scale {
                scaled_surface.clear(EXPORT_BACKGROUND);
                scaled_surface.blit_scaled(
                    frame_surface.raster(),
                    Rect::new(0.0, 0.0, settings.width as f32, settings.height as f32),
                );
                scaled_surface.raster()
            } else {
                frame_surface.raster()
            };

            let path = spool.join(framecut_media::encode::frame_file_name(index));
            image::save_buffer_with_format(
                &path,
                raster.data(),
                raster.width(),
                raster.height(),
                image::ExtendedColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .map_err(|e| FramecutError::Encoder(format!("frame spool failed: {e}")))?;

            report(
                WEIGHT_CAPTURE * (index + 1) as f32 / total_frames.max(1) as f32,
                "Rendering frames",
            );
        }

        // ── Phase 2: audio mixdown ──────────────────────────────
        let audio_path = if settings.include_audio {
            if cancel.is_cancelled() {
                return Err(FramecutError::Cancelled);
            }
            let mix = render_mixdown(
                inputs.snapshot,
                settings.range,
                settings.audio_sample_rate,
                settings.audio_channels,
                inputs.source_bytes,
                inputs.audio_decoder,
            )?;
            let path = spool.join("mixdown.wav");
            std::fs::write(&path, encode_wav(&mix))?;
            Some(path)
        } else {
            None
        };
        report(WEIGHT_CAPTURE + WEIGHT_AUDIO, "Mixing audio");

        // ── Phase 3: encode, with one fallback retry ────────────
        if cancel.is_cancelled() {
            return Err(FramecutError::Cancelled);
        }
        let primary = settings.tier.profile();
        let profiles = std::iter::once(primary.clone())
            .chain(primary.to_fallback())
            .collect::<Vec<_>>();

        let mut last_error = None;
        for (attempt, profile) in profiles.iter().enumerate() {
            let output = settings.output_dir.join(format!(
                "{}.{}",
                settings.file_stem,
                profile.codec.extension()
            ));
            let job = EncodeJob {
                frames_dir: &spool,
                frame_count: total_frames,
                size: (settings.width, settings.height),
                frame_rate: settings.frame_rate,
                audio: audio_path.as_deref(),
                profile,
                output: output.clone(),
            };

            let mut encode_progress = |fraction: f32| {
                report(
                    WEIGHT_CAPTURE + WEIGHT_AUDIO + WEIGHT_ENCODE * fraction,
                    "Encoding video",
                );
            };

            match inputs.encoder.encode(&job, &mut encode_progress) {
                Ok(()) => {
                    info!(path = %output.display(), "export finished");
                    return Ok(ExportedFile {
                        path: output,
                        mime_type: profile.codec.mime_type(),
                    });
                }
                Err(e) => {
                    warn!(attempt, "encode attempt failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FramecutError::Encoder("no codec available".into())))
    }
}

impl Default for ExportPipeline {
    fn default() -> Self {
        Self::new()
    }
}
