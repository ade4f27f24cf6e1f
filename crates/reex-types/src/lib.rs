//! Foundation types and traits for ReExplore.
//!
//! This crate contains the platform-agnostic types shared by every
//! ReExplore crate: colors, rectangles, input events, the graphics
//! surface and input backend traits, and the error type.

pub mod backend;
pub mod error;
pub mod geometry;
pub mod input;
