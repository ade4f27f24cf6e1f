//! The document model: an ordered, bounded list of text runs and images.
//!
//! A [`Document`] is produced by the HTML parser, hydrated once by the page
//! loader, then borrowed read-only by layout and paint every frame. Image
//! textures belong to the document and must be handed back through
//! [`Document::release_textures`] before it is discarded.

use crate::backend::{Color, SdiBackend, TextureId};
use crate::error::{ReexError, Result};

/// Maximum number of elements a document holds.
pub const MAX_ELEMENTS: usize = 512;

/// Maximum byte length of a text run payload.
pub const MAX_TEXT_LEN: usize = 1023;

/// Text shown when a page cannot be loaded.
pub const LOAD_FAILED_TEXT: &str = "Failed to load URL.";

/// Default ink for body text.
pub const TEXT_COLOR: Color = Color::rgb(20, 20, 20);

// -------------------------------------------------------------------
// Elements
// -------------------------------------------------------------------

/// Presentation flags for a text run. Only `heading` affects layout;
/// `bold` and `italic` are carried for future faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub heading: bool,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            heading: false,
            bold: false,
            italic: false,
            color: TEXT_COLOR,
        }
    }
}

impl Style {
    pub fn heading() -> Self {
        Self {
            heading: true,
            ..Self::default()
        }
    }
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: Style,
}

impl TextRun {
    /// Create a run, truncating the payload to [`MAX_TEXT_LEN`] bytes on a
    /// char boundary.
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        let mut text = text.into();
        truncate_to_boundary(&mut text, MAX_TEXT_LEN);
        Self { text, style }
    }
}

/// An image reference and, once hydrated, its decoded size and texture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageElement {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub texture: Option<TextureId>,
}

impl ImageElement {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.texture.is_some()
    }
}

/// One unit of document content.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextRun),
    Image(ImageElement),
}

// -------------------------------------------------------------------
// Document
// -------------------------------------------------------------------

/// An ordered sequence of elements in rendering order.
#[derive(Debug, Default)]
pub struct Document {
    elements: Vec<Element>,
    pub title: Option<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single-element document shown after a failed navigation.
    pub fn load_failed() -> Self {
        let mut doc = Self::new();
        doc.elements
            .push(Element::Text(TextRun::new(LOAD_FAILED_TEXT, Style::default())));
        doc
    }

    /// Append an element. Fails once [`MAX_ELEMENTS`] are stored.
    pub fn push(&mut self, element: Element) -> Result<()> {
        if self.is_full() {
            return Err(ReexError::Capacity(format!(
                "document holds {MAX_ELEMENTS} elements"
            )));
        }
        self.elements.push(element);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.elements.len() >= MAX_ELEMENTS
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Mutable access to image elements, for hydration.
    pub fn images_mut(&mut self) -> impl Iterator<Item = &mut ImageElement> {
        self.elements.iter_mut().filter_map(|e| match e {
            Element::Image(img) => Some(img),
            Element::Text(_) => None,
        })
    }

    /// Last text run, if the document ends with one.
    pub fn last_text_mut(&mut self) -> Option<&mut TextRun> {
        match self.elements.last_mut() {
            Some(Element::Text(run)) => Some(run),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of image textures currently owned.
    pub fn texture_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, Element::Image(img) if img.is_hydrated()))
            .count()
    }

    /// Destroy every owned image texture. Each handle is taken, so a second
    /// call is a no-op.
    pub fn release_textures(&mut self, backend: &mut dyn SdiBackend) {
        let mut released = 0usize;
        for img in self.images_mut() {
            if let Some(tex) = img.texture.take() {
                if let Err(e) = backend.destroy_texture(tex) {
                    log::warn!("failed to release image texture for {}: {e}", img.src);
                }
                released += 1;
            }
        }
        if released > 0 {
            log::debug!("released {released} image textures");
        }
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        let leaked = self.texture_count();
        if leaked > 0 {
            log::warn!("document dropped while owning {leaked} image textures");
        }
    }
}

/// Truncate `s` to at most `max` bytes without splitting a char.
pub(crate) fn truncate_to_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
