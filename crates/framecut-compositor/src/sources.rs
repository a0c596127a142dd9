//! `FrameSources` backed by playable media handles and decoded stills.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use framecut_core::{FrameRate, Raster};
use framecut_media::handle::DEFAULT_SEEK_TIMEOUT;
use framecut_media::{MediaHandle, SeekState};
use framecut_timeline::{Clip, ClipKind};
use tracing::trace;
use uuid::Uuid;

use crate::compositor::{FrameSources, FrameStatus};

/// Frame resolver over media handles (video) and decoded stills (images),
/// keyed by clip `source_id`.
pub struct MediaFrameSources {
    handles: HashMap<Uuid, Box<dyn MediaHandle>>,
    stills: HashMap<Uuid, Raster>,
    seek_timeout: Duration,
}

impl MediaFrameSources {
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
            stills: HashMap::new(),
            seek_timeout: DEFAULT_SEEK_TIMEOUT,
        }
    }

    pub fn with_seek_timeout(mut self, timeout: Duration) -> Self {
        self.seek_timeout = timeout;
        self
    }

    /// Register the playable handle for a video source.
    pub fn insert_handle(&mut self, source_id: Uuid, handle: Box<dyn MediaHandle>) {
        self.handles.insert(source_id, handle);
    }

    /// Register the decoded raster for a still source.
    pub fn insert_still(&mut self, source_id: Uuid, raster: Raster) {
        self.stills.insert(source_id, raster);
    }

    pub fn remove_source(&mut self, source_id: Uuid) {
        self.handles.remove(&source_id);
        self.stills.remove(&source_id);
    }
}

impl Default for MediaFrameSources {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSources for MediaFrameSources {
    fn frame_for(
        &mut self,
        clip: &Clip,
        source_time: f64,
        frame_rate: FrameRate,
    ) -> FrameStatus<'_> {
        match &clip.kind {
            ClipKind::Image { .. } => match self.stills.get(&clip.source_id) {
                Some(raster) => FrameStatus::Ready(raster),
                None => FrameStatus::Unavailable,
            },
            ClipKind::Audio { .. } => FrameStatus::Unavailable,
            ClipKind::Video { .. } => {
                let Some(handle) = self.handles.get_mut(&clip.source_id) else {
                    return FrameStatus::Unavailable;
                };
                let now = Instant::now();

                match handle.poll_seek(now) {
                    SeekState::Pending => return FrameStatus::Pending,
                    SeekState::TimedOut => {
                        // Frame unavailable for this draw, never fatal.
                        trace!(clip = %clip.id, "seek timed out");
                        return FrameStatus::Pending;
                    }
                    SeekState::Idle | SeekState::Complete => {}
                }

                // Re-seek when the handle has drifted more than one output
                // frame from the wanted source time.
                let drift = (handle.current_time() - source_time).abs();
                if drift > frame_rate.frame_duration() {
                    handle.request_seek(source_time, now + self.seek_timeout);
                    match handle.poll_seek(now) {
                        SeekState::Complete => {}
                        _ => return FrameStatus::Pending,
                    }
                }

                match handle.current_frame() {
                    Some(frame) => FrameStatus::Ready(frame),
                    None => FrameStatus::Pending,
                }
            }
        }
    }
}
