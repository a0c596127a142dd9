//! Framecut Media - External collaborator interfaces
//!
//! The engine core never talks to a decoder, an encoder, storage, or the AI
//! interpolation service directly. Each collaborator is an opaque trait here:
//! - `MediaHandle`: playable media with async seek completion
//! - `ImageDecoder` / `AudioDecoder`: bytes in, raster / PCM out
//! - `BlobStore`: keyed byte storage for clip media
//! - `FrameInterpolator`: two frames in, N intermediates out
//! - `Encoder`: frame sequence + optional audio in, container bytes out
//!
//! `testing` provides in-memory doubles used across the workspace's tests.

pub mod decode;
pub mod encode;
pub mod handle;
pub mod interpolate;
pub mod store;
pub mod testing;

pub use decode::{AudioDecoder, ImageDecoder, PcmBuffer, StillDecoder};
pub use encode::{CodecProfile, EncodeJob, Encoder, VideoCodec};
pub use handle::{MediaHandle, MediaReady, SeekState};
pub use interpolate::FrameInterpolator;
pub use store::{BlobStore, MemoryBlobStore};
