//! AI frame interpolation, consumed as an opaque collaborator.
//!
//! The engine only uses this to synthesize image clips that fill a timeline
//! gap; how the intermediates are produced is not its concern.

use framecut_core::{Raster, Result};

/// Produce `steps` intermediate frames between two boundary frames.
pub trait FrameInterpolator: Send + Sync {
    /// `progress` is called with a fraction in `[0, 1]` as frames complete.
    fn interpolate(
        &self,
        from: &Raster,
        to: &Raster,
        steps: usize,
        high_quality: bool,
        progress: &mut dyn FnMut(f32),
    ) -> Result<Vec<Raster>>;
}
