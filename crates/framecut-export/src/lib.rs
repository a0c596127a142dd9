//! Framecut Export - offline re-render and encode
//!
//! Deterministic frame loop → shared compositor → PNG frame spool → offline
//! audio mixdown → external encoder, with weighted monotonic progress,
//! one fallback-codec retry, and guaranteed cleanup.

pub mod ffmpeg;
pub mod format;
pub mod pipeline;
pub mod wav;

pub use ffmpeg::SidecarEncoder;
pub use format::{CompressionTier, ExportSettings};
pub use pipeline::{ExportCancel, ExportInputs, ExportPipeline, ExportProgress, ExportedFile};
pub use wav::encode_wav;
