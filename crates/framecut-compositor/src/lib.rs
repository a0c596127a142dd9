//! Framecut Compositor - the shared frame renderer
//!
//! One `composite()` walks the tracks back-to-front and draws the frame for
//! a timeline time. Live preview and export both call it with identical
//! placement/scale/rotation/mask math; the preview additionally letterboxes
//! the result into the viewport over a checkerboard, the export path renders
//! 1:1 onto an opaque background.

pub mod compositor;
pub mod preview;
pub mod sources;
pub mod surface;

pub use compositor::{CompositeOptions, Compositor, FrameSources, FrameStatus, MasksView};
pub use preview::PreviewRenderer;
pub use sources::MediaFrameSources;
pub use surface::{Placement, Surface};
