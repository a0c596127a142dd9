//! Framecut Core - Foundation types for the timeline engine
//!
//! This crate provides the fundamental types used throughout Framecut:
//! - Frame rates and time ranges (FrameRate, TimeRange)
//! - RGBA rasters and grayscale mattes
//! - Geometric primitives

pub mod error;
pub mod geometry;
pub mod raster;
pub mod time;

pub use error::{FramecutError, Result};
pub use geometry::{fit_rect, Rect, Vec2};
pub use raster::{Matte, Raster, Rgba};
pub use time::{FrameRate, TimeRange, TIME_EPSILON};
