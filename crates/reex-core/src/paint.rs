//! Frame compositor: browser chrome plus the flowed document.
//!
//! Draw order per frame: toolbar, brand label, URL field and its text,
//! content panel, status band and status text, then the document clipped
//! to the content panel. The host clears and presents around
//! [`draw_frame`]. Every text texture is created and destroyed within the
//! call that draws it.

use crate::backend::{Color, SdiBackend};
use crate::document::Document;
use crate::error::Result;
use crate::font::{FontFace, FontSet, render};
use crate::geometry::Rect;
use crate::layout::{FlowLayout, Placement, flow};
use crate::ui::UiState;

// -------------------------------------------------------------------
// Presentation constants
// -------------------------------------------------------------------

pub const TOOLBAR_COLOR: Color = Color::rgb(0, 120, 215);
pub const STATUS_COLOR: Color = Color::rgb(235, 235, 235);
pub const PANEL_COLOR: Color = Color::WHITE;
pub const BRAND_COLOR: Color = Color::WHITE;
pub const URL_TEXT_COLOR: Color = Color::rgb(20, 20, 20);
pub const STATUS_TEXT_COLOR: Color = Color::rgb(70, 70, 70);

pub const BRAND_LABEL: &str = "ReExplore XP";
pub const STATUS_TEXT: &str = "Status: Ready";

const TOOLBAR_HEIGHT: i32 = 40;
const STATUS_HEIGHT: i32 = 32;
const URL_FIELD_X: i32 = 120;
const URL_FIELD_Y: i32 = 6;
const URL_FIELD_HEIGHT: i32 = 28;
const URL_TEXT_PAD_X: i32 = 6;
const URL_TEXT_PAD_Y: i32 = 4;

/// Inset between the content panel edge and the document.
pub const CONTENT_INSET: i32 = 10;

// -------------------------------------------------------------------
// Chrome geometry
// -------------------------------------------------------------------

/// Chrome rectangles for a given window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    pub toolbar: Rect,
    pub url_field: Rect,
    pub content: Rect,
    pub status: Rect,
}

impl Chrome {
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        Self {
            toolbar: Rect::new(0, 0, w, TOOLBAR_HEIGHT),
            url_field: Rect::new(URL_FIELD_X, URL_FIELD_Y, w - 180, URL_FIELD_HEIGHT),
            content: Rect::new(20, 50, w - 40, h - 90),
            status: Rect::new(0, h - STATUS_HEIGHT, w, STATUS_HEIGHT),
        }
    }

    /// The rectangle the document is flowed into.
    pub fn layout_viewport(&self) -> Rect {
        self.content.inset(CONTENT_INSET)
    }
}

// -------------------------------------------------------------------
// Frame
// -------------------------------------------------------------------

/// Draw one frame of chrome and document. Returns the layout that was
/// painted.
pub fn draw_frame(backend: &mut dyn SdiBackend, ui: &UiState, document: &Document) -> Result<FlowLayout> {
    let (width, height) = backend.viewport_size();
    let chrome = Chrome::for_viewport(width, height);
    let body = &ui.fonts.body;

    fill(backend, chrome.toolbar, TOOLBAR_COLOR)?;
    fill(backend, chrome.url_field, PANEL_COLOR)?;
    draw_text(backend, body, BRAND_LABEL, 8, 9, BRAND_COLOR)?;
    draw_text(
        backend,
        body,
        ui.url(),
        chrome.url_field.x + URL_TEXT_PAD_X,
        chrome.url_field.y + URL_TEXT_PAD_Y,
        URL_TEXT_COLOR,
    )?;
    fill(backend, chrome.content, PANEL_COLOR)?;
    fill(backend, chrome.status, STATUS_COLOR)?;
    draw_text(backend, body, STATUS_TEXT, 8, height as i32 - 28, STATUS_TEXT_COLOR)?;

    let layout = flow(document, &ui.fonts, chrome.layout_viewport(), ui.scroll_offset());
    let (cw, ch) = chrome.content.size_u32();
    backend.set_clip_rect(chrome.content.x, chrome.content.y, cw, ch)?;
    let painted = paint_flow(backend, &ui.fonts, &layout);
    backend.reset_clip_rect()?;
    painted?;
    Ok(layout)
}

/// Issue the draws for a computed layout.
///
/// Words whose texture cannot be created are skipped; their space in the
/// layout is kept.
pub fn paint_flow(backend: &mut dyn SdiBackend, fonts: &FontSet, layout: &FlowLayout) -> Result<()> {
    for placement in &layout.placements {
        match placement {
            Placement::Word {
                text,
                heading,
                color,
                rect,
                ..
            } => draw_text(backend, fonts.select(*heading), text, rect.x, rect.y, *color)?,
            Placement::Image { texture, rect, .. } => {
                let (w, h) = rect.size_u32();
                backend.blit(*texture, rect.x, rect.y, w, h)?;
            },
        }
    }
    Ok(())
}

fn fill(backend: &mut dyn SdiBackend, r: Rect, color: Color) -> Result<()> {
    let (w, h) = r.size_u32();
    backend.fill_rect(r.x, r.y, w, h, color)
}

fn draw_text(
    backend: &mut dyn SdiBackend,
    face: &FontFace,
    text: &str,
    x: i32,
    y: i32,
    color: Color,
) -> Result<()> {
    match render(&mut *backend, face, text, color) {
        Some(mut tex) => tex.draw_at(x, y),
        None => Ok(()),
    }
}
