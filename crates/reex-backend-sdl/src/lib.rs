//! SDL2 backend for ReExplore.
//!
//! Implements `SdiBackend` and `InputBackend` using SDL2: solid rectangles,
//! RGBA texture upload and scaled blits, a single clip rectangle, and
//! wheel/text/key input.

use std::collections::HashMap;

use sdl2::EventPump;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseWheelDirection;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;
use sdl2::render::{BlendMode, Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};

use reex_types::backend::{Color, InputBackend, SdiBackend, TextureId};
use reex_types::error::{ReexError, Result};
use reex_types::input::InputEvent;

/// SDL2 rendering and input backend.
///
/// # Safety
///
/// `textures` is declared before `texture_creator` so that Rust's drop order
/// (declaration order) destroys all textures before the creator they borrow from.
/// The `Texture<'static>` lifetime is erased via transmute in `load_texture()`;
/// the `TextureCreator` always outlives the textures.
pub struct SdlBackend {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    textures: HashMap<u64, Texture<'static>>,
    texture_creator: TextureCreator<WindowContext>,
    next_texture_id: u64,
    window_w: u32,
    window_h: u32,
}

impl SdlBackend {
    /// Open a centered window and an accelerated, vsynced renderer.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let sdl = sdl2::init().map_err(backend_err)?;
        let video = sdl.video().map_err(backend_err)?;
        let window = video
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(backend_err)?;
        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(backend_err)?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl.event_pump().map_err(backend_err)?;

        // Deliver typed characters as TextInput events.
        video.text_input().start();

        log::info!("SDL2 backend initialized: {width}x{height}");

        Ok(Self {
            canvas,
            event_pump,
            textures: HashMap::new(),
            texture_creator,
            next_texture_id: 1,
            window_w: width,
            window_h: height,
        })
    }

    fn set_color(&mut self, color: Color) {
        let mode = if color.a < 255 {
            BlendMode::Blend
        } else {
            BlendMode::None
        };
        self.canvas.set_blend_mode(mode);
        self.canvas.set_draw_color(sdl_color(color));
    }
}

fn backend_err(e: impl ToString) -> ReexError {
    ReexError::Backend(e.to_string())
}

fn sdl_color(color: Color) -> sdl2::pixels::Color {
    sdl2::pixels::Color::RGBA(color.r, color.g, color.b, color.a)
}

impl SdiBackend for SdlBackend {
    fn init(&mut self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        self.canvas.set_draw_color(sdl_color(color));
        self.canvas.clear();
        Ok(())
    }

    fn blit(&mut self, tex: TextureId, x: i32, y: i32, w: u32, h: u32) -> Result<()> {
        let texture = self
            .textures
            .get(&tex.0)
            .ok_or_else(|| ReexError::Backend(format!("texture not found: {}", tex.0)))?;
        self.canvas
            .copy(texture, None, Rect::new(x, y, w, h))
            .map_err(backend_err)
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) -> Result<()> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        self.set_color(color);
        self.canvas
            .fill_rect(Rect::new(x, y, w, h))
            .map_err(backend_err)
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.canvas.present();
        Ok(())
    }

    fn load_texture(&mut self, width: u32, height: u32, rgba_data: &[u8]) -> Result<TextureId> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 || rgba_data.len() != expected {
            return Err(ReexError::Backend(format!(
                "texture data size mismatch: {width}x{height} needs {expected} bytes, got {}",
                rgba_data.len()
            )));
        }

        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::ABGR8888, width, height)
            .map_err(backend_err)?;

        let row_bytes = width as usize * 4;
        texture
            .with_lock(None, |buffer: &mut [u8], pitch: usize| {
                for (row, src) in rgba_data.chunks_exact(row_bytes).enumerate() {
                    let dst = row * pitch;
                    buffer[dst..dst + row_bytes].copy_from_slice(src);
                }
            })
            .map_err(backend_err)?;

        texture.set_blend_mode(BlendMode::Blend);

        // SAFETY: The texture borrows from self.texture_creator which lives in the
        // same struct. `textures` is declared before `texture_creator`, so Rust drops
        // textures first. The erased lifetime is therefore always valid.
        let texture: Texture<'static> = unsafe { std::mem::transmute(texture) };

        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures.insert(id, texture);
        Ok(TextureId(id))
    }

    fn destroy_texture(&mut self, tex: TextureId) -> Result<()> {
        self.textures
            .remove(&tex.0)
            .map(|_| ())
            .ok_or_else(|| ReexError::Backend(format!("texture not found: {}", tex.0)))
    }

    fn set_clip_rect(&mut self, x: i32, y: i32, w: u32, h: u32) -> Result<()> {
        self.canvas.set_clip_rect(Rect::new(x, y, w, h));
        Ok(())
    }

    fn reset_clip_rect(&mut self) -> Result<()> {
        self.canvas.set_clip_rect(None);
        Ok(())
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.canvas
            .output_size()
            .unwrap_or((self.window_w, self.window_h))
    }

    fn set_window_title(&mut self, title: &str) -> Result<()> {
        self.canvas
            .window_mut()
            .set_title(title)
            .map_err(backend_err)
    }

    fn shutdown(&mut self) -> Result<()> {
        if !self.textures.is_empty() {
            log::warn!("{} textures still alive at shutdown", self.textures.len());
            self.textures.clear();
        }
        log::info!("SDL2 backend shut down");
        Ok(())
    }
}

impl InputBackend for SdlBackend {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.event_pump.poll_iter().filter_map(map_sdl_event).collect()
    }
}

/// Map an SDL2 event to a ReExplore input event. Everything the shell
/// does not react to (pointer motion, clicks, focus, key releases) is
/// dropped here.
fn map_sdl_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Quit { .. } => Some(InputEvent::Quit),
        Event::KeyDown {
            keycode: Some(key), ..
        } => map_key_down(key),
        Event::MouseWheel { x, y, direction, .. } => Some(wheel_event(x, y, direction)),
        Event::TextInput { text, .. } if !text.is_empty() => Some(InputEvent::TextInput(text)),
        _ => None,
    }
}

/// Positive `dy` always means "away from the user", whatever the
/// platform's natural-scrolling setting.
fn wheel_event(x: i32, y: i32, direction: MouseWheelDirection) -> InputEvent {
    let (dx, dy) = if direction == MouseWheelDirection::Flipped {
        (-x, -y)
    } else {
        (x, y)
    };
    InputEvent::Wheel { dx, dy }
}

fn map_key_down(key: Keycode) -> Option<InputEvent> {
    match key {
        Keycode::Backspace => Some(InputEvent::Backspace),
        Keycode::Return | Keycode::KpEnter => Some(InputEvent::Confirm),
        _ => None,
    }
}
