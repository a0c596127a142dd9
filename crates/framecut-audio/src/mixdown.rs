//! Offline audio mixdown for export.
//!
//! Renders the export range independently of the live scheduler: each
//! audible clip's source is decoded once (cached per source id), trimmed to
//! the export window, gain-applied, and summed into one fixed-length buffer.

use std::collections::HashMap;
use std::sync::Arc;

use framecut_core::{Result, TimeRange};
use framecut_media::{AudioDecoder, PcmBuffer};
use framecut_timeline::{Clip, TimelineSnapshot};
use tracing::{debug, warn};
use uuid::Uuid;

/// Fetches the stored bytes for a media source.
pub type SourceBytes<'a> = dyn Fn(Uuid) -> Option<Arc<Vec<u8>>> + 'a;

fn audible_clips<'a>(snapshot: &'a TimelineSnapshot, range: TimeRange) -> Vec<&'a Clip> {
    snapshot
        .clips
        .iter()
        .filter(|clip| clip.is_audible())
        .filter(|clip| clip.time_range().intersection(range).is_some())
        .filter(|clip| {
            snapshot
                .tracks
                .iter()
                .find(|t| t.id == clip.track_id)
                .map(|t| !t.muted && t.visible)
                .unwrap_or(false)
        })
        .collect()
}

/// Render the export mixdown for a time range.
///
/// Clips whose bytes are missing or fail to decode are skipped with a
/// warning — a silent track beats a failed export. The result always has
/// exactly `ceil(range.duration * sample_rate)` frames.
pub fn render_mixdown(
    snapshot: &TimelineSnapshot,
    range: TimeRange,
    sample_rate: u32,
    channels: u16,
    source_bytes: &SourceBytes<'_>,
    decoder: &dyn AudioDecoder,
) -> Result<PcmBuffer> {
    let total_frames = (range.duration * sample_rate as f64).ceil().max(0.0) as usize;
    let mut mix = PcmBuffer::silent(sample_rate, channels, total_frames);
    let out_channels = channels.max(1) as usize;

    let mut decoded: HashMap<Uuid, Option<Arc<PcmBuffer>>> = HashMap::new();

    for clip in audible_clips(snapshot, range) {
        let buffer = decoded
            .entry(clip.source_id)
            .or_insert_with(|| {
                let bytes = match source_bytes(clip.source_id) {
                    Some(bytes) => bytes,
                    None => {
                        warn!(source = %clip.source_id, "no stored bytes for audio source");
                        return None;
                    }
                };
                match decoder.decode(&bytes) {
                    Ok(buffer) => Some(Arc::new(buffer)),
                    Err(e) => {
                        warn!(source = %clip.source_id, "mixdown decode failed: {e}");
                        None
                    }
                }
            })
            .clone();
        let Some(buffer) = buffer else { continue };

        let gain = clip
            .audio_settings()
            .map(|a| a.gain())
            .unwrap_or(0.0);
        if gain <= 0.0 {
            continue;
        }

        let window = match clip.time_range().intersection(range) {
            Some(window) => window,
            None => continue,
        };
        debug!(clip = %clip.id, start = window.start, seconds = window.duration, "mixing clip");

        let src_channels = buffer.channels.max(1) as usize;
        let src_frames = buffer.frame_count();
        let first_out = ((window.start - range.start) * sample_rate as f64).round() as usize;
        let frames = (window.duration * sample_rate as f64).round() as usize;

        for i in 0..frames {
            let out_frame = first_out + i;
            if out_frame >= total_frames {
                break;
            }
            let t = window.start + i as f64 / sample_rate as f64;
            let src_frame = (clip.source_time(t) * buffer.sample_rate as f64) as usize;
            if src_frame >= src_frames {
                break;
            }

            let src_idx = src_frame * src_channels;
            let left = buffer.samples[src_idx] * gain;
            let right = if src_channels > 1 {
                buffer.samples[src_idx + 1] * gain
            } else {
                left
            };

            let base = out_frame * out_channels;
            mix.samples[base] = (mix.samples[base] + left).clamp(-1.0, 1.0);
            if out_channels > 1 {
                mix.samples[base + 1] = (mix.samples[base + 1] + right).clamp(-1.0, 1.0);
            }
        }
    }

    Ok(mix)
}
