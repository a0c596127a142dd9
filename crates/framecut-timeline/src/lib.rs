//! Framecut Timeline - Timeline data model
//!
//! Implements the timeline structure for the video editor:
//! - Projects containing tracks, clips, and track-level masks
//! - Placement helpers enforcing the per-track no-overlap invariant
//! - Position keyframes with linear interpolation
//! - Drag, trim, split, and swap resolution for pointer sessions
//! - Viewport time mapping, clipboard, snapshot history
//! - Change notifications and versioned serialization

pub mod clip;
pub mod clipboard;
pub mod drag;
pub mod history;
pub mod keyframe;
pub mod mask;
pub mod model;
pub mod notify;
pub mod project;
pub mod serialization;
pub mod track;
pub mod viewport;

pub use clip::{AudioSettings, Clip, ClipKind};
pub use clipboard::{Clipboard, ClipboardMode};
pub use drag::{
    auto_scroll_step, resolve_track_swap, split_clip, trim_end_to, trim_start_to, AutoScrollParams,
    DragState, SwapDecision, TrackSwapParams, TrimOrigin, MIN_CLIP_DURATION,
};
pub use history::{EditorHistory, HistoryTarget, SnapshotStack};
pub use keyframe::{
    normalize_keyframes, offset_position_values, remove_position_keyframe_at, resolve_position,
    slice_position_keyframes, upsert_position_keyframe_at, Interpolation, KeyframeList,
    PositionKeyframe, KEYFRAME_EPSILON,
};
pub use mask::{find_mask_at_time, Mask, MaskData, MaskEasing, MaskHit, MaskKeyframe, MatteRef};
pub use model::{
    clips_on_track, find_clip_at_time, has_track_overlap, project_duration, safe_clip_start,
};
pub use notify::{ChangeBus, ChangeEvent};
pub use project::{AssetRef, Project, TimelineSnapshot, MIN_PROJECT_DURATION};
pub use serialization::ProjectFile;
pub use track::{reindex_z_order, Track, TrackKind};
pub use viewport::Viewport;
