//! Flow layout: places words and images into lines within a fixed-width
//! viewport, top to bottom.
//!
//! The engine keeps a pen `(x, y)` and the tallest box seen on the current
//! line. Text runs are split on whitespace; each word is measured with a
//! trailing space and wrapped to a new line when it would cross the right
//! edge. Images start on a fresh line, shrink to the viewport width if
//! needed and are followed by a fixed gap.
//!
//! Nothing is cached between frames: [`flow`] is recomputed from the
//! document, scroll offset and viewport every time it is painted.

use crate::backend::{Color, TextureId};
use crate::document::{Document, Element, ImageElement, TextRun};
use crate::font::{FontSet, measure};
use crate::geometry::Rect;

/// Line advance used when a forced break happens on an empty line.
pub const FALLBACK_LINE_HEIGHT: i32 = 20;

/// Vertical gap left below every image.
pub const IMAGE_GAP: i32 = 8;

// -------------------------------------------------------------------
// Display list
// -------------------------------------------------------------------

/// A positioned box produced by layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// One word (with its trailing space) from a text run.
    Word {
        /// Index of the source element in the document.
        element: usize,
        text: String,
        heading: bool,
        color: Color,
        rect: Rect,
    },
    /// A hydrated image, possibly scaled down.
    Image {
        element: usize,
        texture: TextureId,
        rect: Rect,
    },
}

impl Placement {
    pub fn rect(&self) -> Rect {
        match self {
            Self::Word { rect, .. } | Self::Image { rect, .. } => *rect,
        }
    }
}

/// The result of one layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowLayout {
    pub placements: Vec<Placement>,
    /// Height from the first line's top to the bottom of the last line.
    pub content_height: i32,
}

// -------------------------------------------------------------------
// Pen
// -------------------------------------------------------------------

/// Pen state carried through one pass.
struct Pen {
    left: i32,
    right: i32,
    x: i32,
    y: i32,
    line_height: i32,
}

impl Pen {
    fn new(viewport: Rect, scroll_offset: i32) -> Self {
        Self {
            left: viewport.x,
            right: viewport.right(),
            x: viewport.x,
            y: viewport.y - scroll_offset,
            line_height: 0,
        }
    }

    /// Move to the start of the next line, advancing by the current line
    /// height or `fallback` if nothing has been placed on this line.
    fn break_line(&mut self, fallback: i32) {
        self.x = self.left;
        self.y += if self.line_height > 0 {
            self.line_height
        } else {
            fallback
        };
        self.line_height = 0;
    }

    fn at_line_start(&self) -> bool {
        self.x == self.left
    }
}

// -------------------------------------------------------------------
// Flow
// -------------------------------------------------------------------

/// Lay out `document` into `viewport` scrolled by `scroll_offset` pixels.
///
/// Only `viewport.x`, `viewport.y` and `viewport.w` are used; vertical
/// extent is unbounded and clipping is the compositor's job.
pub fn flow(document: &Document, fonts: &FontSet, viewport: Rect, scroll_offset: i32) -> FlowLayout {
    let mut pen = Pen::new(viewport, scroll_offset);
    let top = pen.y;
    let mut placements = Vec::new();

    for (index, element) in document.elements().iter().enumerate() {
        match element {
            Element::Text(run) => flow_text(&mut pen, fonts, index, run, &mut placements),
            Element::Image(img) => flow_image(&mut pen, viewport.w, index, img, &mut placements),
        }
    }

    FlowLayout {
        placements,
        content_height: (pen.y + pen.line_height - top).max(0),
    }
}

fn flow_text(pen: &mut Pen, fonts: &FontSet, index: usize, run: &TextRun, out: &mut Vec<Placement>) {
    let face = fonts.select(run.style.heading);

    for token in run.text.split_whitespace() {
        let word = format!("{token} ");
        let (w, h) = measure(face, &word);
        let (w, h) = (w as i32, h as i32);
        if pen.x + w > pen.right {
            pen.break_line(h);
        }
        out.push(Placement::Word {
            element: index,
            text: word,
            heading: run.style.heading,
            color: run.style.color,
            rect: Rect::new(pen.x, pen.y, w, h),
        });
        pen.line_height = pen.line_height.max(h);
        pen.x += w;
    }

    // Any newline in the run ends the line after the whole run.
    if run.text.contains('\n') {
        pen.break_line(FALLBACK_LINE_HEIGHT);
    }
}

fn flow_image(pen: &mut Pen, max_width: i32, index: usize, img: &ImageElement, out: &mut Vec<Placement>) {
    let Some(texture) = img.texture else {
        return;
    };

    let (mut w, mut h) = (img.width as i32, img.height as i32);
    if w > max_width {
        let scale = max_width as f32 / w as f32;
        w = max_width;
        h = (h as f32 * scale) as i32;
    }

    if !pen.at_line_start() {
        pen.break_line(FALLBACK_LINE_HEIGHT);
    }

    out.push(Placement::Image {
        element: index,
        texture,
        rect: Rect::new(pen.left, pen.y, w, h),
    });
    pen.y += h + IMAGE_GAP;
}
