//! Shared test utilities for the core.
//!
//! Provides a [`MockBackend`] that records every draw call and tracks
//! live textures, so tests can assert both geometry and texture
//! create/destroy balance.

use std::collections::HashMap;

use crate::backend::{Color, SdiBackend, TextureId};
use crate::error::{ReexError, Result};
use crate::geometry::Rect;

/// A recorded call on the mock backend.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Color),
    FillRect {
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        color: Color,
    },
    Blit {
        tex: TextureId,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    },
    SetClip(Rect),
    ResetClip,
    Present,
}

/// A mock backend that records calls for test assertions.
pub struct MockBackend {
    pub calls: Vec<DrawCall>,
    /// Live textures: id -> (width, height, pixels).
    pub textures: HashMap<u64, (u32, u32, Vec<u8>)>,
    /// Total number of textures ever created.
    pub created: usize,
    /// Total number of textures destroyed.
    pub destroyed: usize,
    /// When set, every `load_texture` call fails.
    pub fail_texture_loads: bool,
    /// Last caption passed to `set_window_title`.
    pub title: Option<String>,
    next_id: u64,
    width: u32,
    height: u32,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_size(1100, 780)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            calls: Vec::new(),
            textures: HashMap::new(),
            created: 0,
            destroyed: 0,
            fail_texture_loads: false,
            title: None,
            next_id: 1,
            width,
            height,
        }
    }

    /// Number of textures currently alive.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// All `Blit` calls as `(tex, x, y, w, h)`.
    pub fn blits(&self) -> Vec<(TextureId, i32, i32, u32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                DrawCall::Blit { tex, x, y, w, h } => Some((tex, x, y, w, h)),
                _ => None,
            })
            .collect()
    }

    /// All `FillRect` calls as `(x, y, w, h, color)`.
    pub fn fills(&self) -> Vec<(i32, i32, u32, u32, Color)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                DrawCall::FillRect { x, y, w, h, color } => Some((x, y, w, h, color)),
                _ => None,
            })
            .collect()
    }

    /// Index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&DrawCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SdiBackend for MockBackend {
    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        self.calls.push(DrawCall::Clear(color));
        Ok(())
    }

    fn blit(&mut self, tex: TextureId, x: i32, y: i32, w: u32, h: u32) -> Result<()> {
        if !self.textures.contains_key(&tex.0) {
            return Err(ReexError::Backend(format!("texture not found: {}", tex.0)));
        }
        self.calls.push(DrawCall::Blit { tex, x, y, w, h });
        Ok(())
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) -> Result<()> {
        self.calls.push(DrawCall::FillRect { x, y, w, h, color });
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.calls.push(DrawCall::Present);
        Ok(())
    }

    fn load_texture(&mut self, width: u32, height: u32, rgba_data: &[u8]) -> Result<TextureId> {
        if self.fail_texture_loads {
            return Err(ReexError::Backend("mock texture allocation failure".into()));
        }
        let expected = (width * height * 4) as usize;
        if rgba_data.len() != expected {
            return Err(ReexError::Backend(format!(
                "texture data size mismatch: expected {expected}, got {}",
                rgba_data.len()
            )));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.created += 1;
        self.textures
            .insert(id, (width, height, rgba_data.to_vec()));
        Ok(TextureId(id))
    }

    fn destroy_texture(&mut self, tex: TextureId) -> Result<()> {
        if self.textures.remove(&tex.0).is_none() {
            return Err(ReexError::Backend(format!(
                "double destroy of texture {}",
                tex.0
            )));
        }
        self.destroyed += 1;
        Ok(())
    }

    fn set_clip_rect(&mut self, x: i32, y: i32, w: u32, h: u32) -> Result<()> {
        self.calls
            .push(DrawCall::SetClip(Rect::new(x, y, w as i32, h as i32)));
        Ok(())
    }

    fn reset_clip_rect(&mut self) -> Result<()> {
        self.calls.push(DrawCall::ResetClip);
        Ok(())
    }

    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_window_title(&mut self, title: &str) -> Result<()> {
        self.title = Some(title.to_string());
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
