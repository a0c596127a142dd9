//! FFmpeg encoder via the sidecar process.

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use framecut_core::{FramecutError, Result};
use framecut_media::{EncodeJob, Encoder};
use tracing::{debug, info, warn};

/// `Encoder` implementation spawning FFmpeg on a spooled PNG sequence.
#[derive(Debug, Default)]
pub struct SidecarEncoder;

impl SidecarEncoder {
    pub fn new() -> Self {
        Self
    }

    fn build_args(job: &EncodeJob<'_>) -> Vec<String> {
        let rate = format!(
            "{}/{}",
            job.frame_rate.numerator, job.frame_rate.denominator
        );
        let pattern = job.frames_dir.join("frame_%06d.png");

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-framerate".into(),
            rate,
            "-i".into(),
            pattern.to_string_lossy().into_owned(),
        ];

        if let Some(audio) = job.audio {
            args.push("-i".into());
            args.push(audio.to_string_lossy().into_owned());
        }

        args.push("-c:v".into());
        args.push(job.profile.codec.ffmpeg_encoder().into());
        if let Some(crf) = job.profile.crf {
            args.push("-crf".into());
            args.push(crf.to_string());
        }
        if let Some(preset) = &job.profile.preset {
            args.push("-preset".into());
            args.push(preset.clone());
        }
        if let Some(bitrate) = job.profile.video_bitrate {
            args.push("-b:v".into());
            args.push(format!("{bitrate}k"));
        }
        args.push("-pix_fmt".into());
        args.push(job.profile.pixel_format.clone());

        if job.audio.is_some() {
            args.push("-c:a".into());
            args.push("aac".into());
            args.push("-b:a".into());
            args.push("192k".into());
            args.push("-shortest".into());
        }

        args.push(job.output.to_string_lossy().into_owned());
        args
    }
}

impl Encoder for SidecarEncoder {
    fn encode(&self, job: &EncodeJob<'_>, progress: &mut dyn FnMut(f32)) -> Result<()> {
        let args = Self::build_args(job);
        info!(codec = job.profile.codec.ffmpeg_encoder(), frames = job.frame_count, "encoding");
        debug!(?args, "ffmpeg invocation");

        let mut run = || -> Result<()> {
            let mut child = FfmpegCommand::new()
                .args(args.iter().map(String::as_str))
                .spawn()
                .map_err(|e| FramecutError::Encoder(format!("failed to spawn ffmpeg: {e}")))?;

            let events = child
                .iter()
                .map_err(|e| FramecutError::Encoder(format!("failed to read ffmpeg: {e}")))?;
            let mut last_error: Option<String> = None;
            for event in events {
                match event {
                    FfmpegEvent::Progress(p) => {
                        if job.frame_count > 0 {
                            let fraction =
                                (p.frame as f32 / job.frame_count as f32).clamp(0.0, 1.0);
                            progress(fraction);
                        }
                    }
                    FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message) => {
                        warn!("ffmpeg: {message}");
                        last_error = Some(message);
                    }
                    _ => {}
                }
            }

            let status = child
                .wait()
                .map_err(|e| FramecutError::Encoder(format!("failed to wait for ffmpeg: {e}")))?;
            if !status.success() {
                return Err(FramecutError::Encoder(format!(
                    "ffmpeg exited with {status}{}",
                    last_error
                        .map(|m| format!(": {m}"))
                        .unwrap_or_default()
                )));
            }
            progress(1.0);
            Ok(())
        };

        let result = run();
        if result.is_err() && job.output.exists() {
            // A failed encode must not leave a partial container behind.
            if let Err(e) = std::fs::remove_file(&job.output) {
                warn!("failed to remove partial output: {e}");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecut_core::FrameRate;
    use framecut_media::{CodecProfile, VideoCodec};
    use std::path::Path;

    fn job<'a>(profile: &'a CodecProfile, audio: Option<&'a Path>) -> EncodeJob<'a> {
        EncodeJob {
            frames_dir: Path::new("/tmp/frames"),
            frame_count: 30,
            size: (640, 360),
            frame_rate: FrameRate::FPS_30,
            audio,
            profile,
            output: "/tmp/out.mp4".into(),
        }
    }

    #[test]
    fn test_args_video_only() {
        let profile = CodecProfile {
            codec: VideoCodec::H264,
            crf: Some(21),
            preset: Some("medium".into()),
            video_bitrate: None,
            pixel_format: "yuv420p".into(),
        };
        let args = SidecarEncoder::build_args(&job(&profile, None));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"-crf".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
        assert!(args.iter().any(|a| a.ends_with("frame_%06d.png")));
        assert!(!args.contains(&"-c:a".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
    }

    #[test]
    fn test_args_with_audio() {
        let profile = CodecProfile {
            codec: VideoCodec::Mpeg4,
            crf: None,
            preset: None,
            video_bitrate: Some(8_000),
            pixel_format: "yuv420p".into(),
        };
        let args = SidecarEncoder::build_args(&job(&profile, Some(Path::new("/tmp/mix.wav"))));
        assert!(args.contains(&"mpeg4".to_string()));
        assert!(args.contains(&"-b:v".to_string()));
        assert!(args.contains(&"8000k".to_string()));
        assert!(args.contains(&"-c:a".to_string()));
        assert!(args.contains(&"-shortest".to_string()));
    }
}
