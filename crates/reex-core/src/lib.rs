//! ReExplore core.
//!
//! Platform-agnostic browser shell: synthetic font metrics, the document
//! model, flow layout, frame compositing and the input state machine,
//! plus the HTML, image, network and page-loading collaborators that feed
//! them. Rendering goes through the [`backend::SdiBackend`] trait only.

// Re-exports from reex-types (foundation types and traits).
pub use reex_types::backend;
pub use reex_types::error;
pub use reex_types::geometry;
pub use reex_types::input;

pub mod config;
pub mod document;
pub mod font;
pub mod html;
pub mod image;
pub mod layout;
pub mod loader;
pub mod page;
pub mod paint;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
