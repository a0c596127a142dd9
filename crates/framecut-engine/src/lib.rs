//! Framecut Engine - session wiring
//!
//! Ties the data model, clock, scheduler, and compositor together behind an
//! explicit session object: no module-level registries, deterministic
//! teardown, one render-request guard collapsing bursts of edits into a
//! single frame.

pub mod gap_fill;
pub mod mask_edit;
pub mod playback;
pub mod session;

pub use gap_fill::fill_gap_with_interpolation;
pub use mask_edit::MaskEditSession;
pub use playback::{PlaybackCommand, PlaybackController};
pub use session::{EditorSession, RenderQueue};
