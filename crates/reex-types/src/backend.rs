//! Backend trait definitions.
//!
//! Every platform implements these traits. The core never calls
//! platform-specific APIs: window creation, texture upload, clipping and
//! frame presentation all go through [`SdiBackend`], raw input arrives
//! through [`InputBackend`].

use crate::error::Result;
use crate::input::InputEvent;

/// A color in RGBA format (0-255 per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// The color as four RGBA bytes, in buffer order.
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
}

/// Opaque handle to a loaded texture in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Graphics surface trait.
///
/// Two implementations exist: SDL2 for the desktop, and a recording mock
/// used by the core's tests. The core depends only on these primitives.
pub trait SdiBackend {
    /// Initialize the rendering subsystem.
    fn init(&mut self, width: u32, height: u32) -> Result<()>;

    /// Clear the whole frame to a solid color.
    fn clear(&mut self, color: Color) -> Result<()>;

    /// Copy a texture into the destination rectangle, scaling to fit.
    fn blit(&mut self, tex: TextureId, x: i32, y: i32, w: u32, h: u32) -> Result<()>;

    /// Draw a filled rectangle.
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) -> Result<()>;

    /// Present the current frame.
    fn swap_buffers(&mut self) -> Result<()>;

    /// Upload raw RGBA pixel data (4 bytes per pixel, row-major, no
    /// padding) as a texture. Returns a handle for later blits.
    fn load_texture(&mut self, width: u32, height: u32, rgba_data: &[u8]) -> Result<TextureId>;

    /// Destroy a previously loaded texture.
    fn destroy_texture(&mut self, tex: TextureId) -> Result<()>;

    /// Restrict subsequent drawing to the given rectangle.
    fn set_clip_rect(&mut self, x: i32, y: i32, w: u32, h: u32) -> Result<()>;

    /// Remove the clip rectangle.
    fn reset_clip_rect(&mut self) -> Result<()>;

    /// Current drawable size in pixels.
    fn viewport_size(&self) -> (u32, u32);

    /// Set the window caption. Surfaces without a title bar ignore it.
    fn set_window_title(&mut self, title: &str) -> Result<()>;

    /// Shut down the rendering subsystem and release resources.
    fn shutdown(&mut self) -> Result<()>;
}

/// Input backend trait.
///
/// Maps platform-specific input to the platform-agnostic [`InputEvent`].
pub trait InputBackend {
    /// Drain all pending input events.
    fn poll_events(&mut self) -> Vec<InputEvent>;
}
