//! Integration test crate for Framecut.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple framecut crates to verify they work together.

#[cfg(test)]
mod timeline;

#[cfg(test)]
mod playback;

#[cfg(test)]
mod render;

#[cfg(test)]
mod export;

#[cfg(test)]
mod session;
