//! Synthetic font metrics and glyph rasterization.
//!
//! There are no real glyph outlines here. A [`FontFace`] is a nominal
//! pixel size from which a fixed glyph width and line height are
//! derived; every visible character is painted as a solid block of that
//! width. [`measure`] and [`rasterize`] share the same advance table, so
//! a rendered string always has exactly the measured size and a real
//! glyph backend can replace [`rasterize`] without touching layout.

use crate::backend::{Color, SdiBackend, TextureId};
use crate::error::Result;

/// Pixel size used when a face is created with size 0.
pub const DEFAULT_PIXEL_SIZE: u32 = 16;

/// Narrowest glyph block, in pixels.
const MIN_GLYPH_WIDTH: u32 = 3;

/// Horizontal gap between adjacent glyph blocks.
const GLYPH_SPACING: u32 = 1;

// -------------------------------------------------------------------
// FontFace
// -------------------------------------------------------------------

/// A sized synthetic font.
///
/// All metrics derive from the nominal pixel size. An unloaded face
/// measures as `(0, 0)` and never renders.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontFace {
    pixel_size: u32,
    scale: f32,
    ascent: u32,
    descent: u32,
    line_gap: u32,
    loaded: bool,
}

impl FontFace {
    /// Create a loaded face. A size of 0 falls back to
    /// [`DEFAULT_PIXEL_SIZE`].
    pub fn load(pixel_size: u32) -> Self {
        let pixel_size = if pixel_size > 0 {
            pixel_size
        } else {
            DEFAULT_PIXEL_SIZE
        };
        Self {
            pixel_size,
            scale: 1.0,
            ascent: pixel_size,
            descent: pixel_size / 4,
            line_gap: pixel_size / 6,
            loaded: true,
        }
    }

    /// Reset to the unloaded state.
    pub fn unload(&mut self) {
        *self = Self::default();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn ascent(&self) -> u32 {
        self.ascent
    }

    pub fn descent(&self) -> u32 {
        self.descent
    }

    pub fn line_gap(&self) -> u32 {
        self.line_gap
    }

    /// Nominal size, or the default for a zeroed face.
    fn base_size(&self) -> u32 {
        if self.pixel_size > 0 {
            self.pixel_size
        } else {
            DEFAULT_PIXEL_SIZE
        }
    }

    /// Width of one glyph block: `max(3, size * 3 / 5)`.
    pub fn glyph_width(&self) -> u32 {
        (self.base_size() * 3 / 5).max(MIN_GLYPH_WIDTH)
    }

    /// Height of a glyph block (the nominal size).
    pub fn glyph_height(&self) -> u32 {
        self.base_size()
    }

    /// Pen advance per character, spaces included.
    pub fn advance(&self) -> u32 {
        self.glyph_width() + GLYPH_SPACING
    }

    /// Distance between successive baselines: `size + size / 4`.
    pub fn line_height(&self) -> u32 {
        let base = self.base_size();
        base + base / 4
    }
}

/// The two faces the UI needs: body text and headings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontSet {
    pub body: FontFace,
    pub heading: FontFace,
}

impl FontSet {
    pub fn load(body_px: u32, heading_px: u32) -> Self {
        Self {
            body: FontFace::load(body_px),
            heading: FontFace::load(heading_px),
        }
    }

    /// Face for a run with the given heading flag.
    pub fn select(&self, heading: bool) -> &FontFace {
        if heading { &self.heading } else { &self.body }
    }

    pub fn unload(&mut self) {
        self.body.unload();
        self.heading.unload();
    }
}

// -------------------------------------------------------------------
// Measurement
// -------------------------------------------------------------------

/// Measure `text` as `(width, height)` in pixels.
///
/// Width is the widest newline-separated line at one advance per
/// character; height is one line height per line. Empty text or an
/// unloaded face measures `(0, 0)`.
pub fn measure(face: &FontFace, text: &str) -> (u32, u32) {
    if !face.loaded || text.is_empty() {
        return (0, 0);
    }

    let advance = face.advance();
    let mut max_width = 0;
    let mut height = 0;
    for line in text.split('\n') {
        max_width = max_width.max(line.chars().count() as u32 * advance);
        height += face.line_height();
    }

    if max_width == 0 {
        max_width = face.glyph_width();
    }
    if height == 0 {
        height = face.line_height();
    }
    (max_width, height)
}

// -------------------------------------------------------------------
// Rasterization
// -------------------------------------------------------------------

/// A synthesized RGBA image of a string.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major.
    pub pixels: Vec<u8>,
}

/// Paint `text` into a fresh RGBA buffer of exactly the measured size.
///
/// Each visible character becomes a `glyph_width x pixel_size` block of
/// `color`; spaces advance the pen without painting; newlines move the
/// pen to the start of the next line. Returns `None` for an unloaded
/// face, empty text, or a degenerate size.
pub fn rasterize(face: &FontFace, text: &str, color: Color) -> Option<GlyphBitmap> {
    if !face.loaded || text.is_empty() {
        return None;
    }
    let (width, height) = measure(face, text);
    if width == 0 || height == 0 {
        return None;
    }

    let gw = face.glyph_width();
    let gh = face.glyph_height();
    let lh = face.line_height();
    let advance = face.advance();
    let pitch = width as usize * 4;
    let mut pixels = vec![0u8; pitch * height as usize];
    let rgba = color.to_bytes();

    let mut pen_x = 0u32;
    let mut pen_y = 0u32;
    for ch in text.chars() {
        if ch == '\n' {
            pen_x = 0;
            pen_y += lh;
            continue;
        }
        if pen_x > 0 && pen_x + gw > width {
            pen_x = 0;
            pen_y += lh;
        }
        if ch != ' ' {
            let rows = gh.min(height.saturating_sub(pen_y));
            let cols = gw.min(width.saturating_sub(pen_x));
            for row in 0..rows {
                let start = (pen_y + row) as usize * pitch + pen_x as usize * 4;
                for px in pixels[start..start + cols as usize * 4].chunks_exact_mut(4) {
                    px.copy_from_slice(&rgba);
                }
            }
        }
        pen_x += advance;
    }

    Some(GlyphBitmap {
        width,
        height,
        pixels,
    })
}

// -------------------------------------------------------------------
// Scoped text textures
// -------------------------------------------------------------------

/// A rendered string living on the backend for the current paint call.
///
/// The texture is destroyed when the guard is dropped, so text textures
/// never outlive the frame that created them.
pub struct TextTexture<'b, B: SdiBackend + ?Sized> {
    backend: &'b mut B,
    id: TextureId,
    width: u32,
    height: u32,
}

impl<B: SdiBackend + ?Sized> TextTexture<'_, B> {
    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Copy the texture to `(x, y)` at its natural size.
    pub fn draw_at(&mut self, x: i32, y: i32) -> Result<()> {
        self.backend.blit(self.id, x, y, self.width, self.height)
    }
}

impl<B: SdiBackend + ?Sized> Drop for TextTexture<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.backend.destroy_texture(self.id) {
            log::warn!("failed to release text texture {}: {e}", self.id.0);
        }
    }
}

/// Rasterize `text` and upload it as a texture.
///
/// Returns `None` when there is nothing to draw or the backend cannot
/// allocate the texture; callers skip the paint in that case.
pub fn render<'b, B: SdiBackend + ?Sized>(
    backend: &'b mut B,
    face: &FontFace,
    text: &str,
    color: Color,
) -> Option<TextTexture<'b, B>> {
    let bitmap = rasterize(face, text, color)?;
    match backend.load_texture(bitmap.width, bitmap.height, &bitmap.pixels) {
        Ok(id) => Some(TextTexture {
            backend,
            id,
            width: bitmap.width,
            height: bitmap.height,
        }),
        Err(e) => {
            log::warn!("text texture allocation failed: {e}");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockBackend;
    use proptest::prelude::*;

    const INK: Color = Color::rgb(20, 20, 20);

    fn pixel(bmp: &GlyphBitmap, x: u32, y: u32) -> [u8; 4] {
        let i = (y * bmp.width + x) as usize * 4;
        [
            bmp.pixels[i],
            bmp.pixels[i + 1],
            bmp.pixels[i + 2],
            bmp.pixels[i + 3],
        ]
    }

    // -- FontFace --

    #[test]
    fn load_derives_metrics() {
        let f = FontFace::load(18);
        assert!(f.is_loaded());
        assert_eq!(f.pixel_size(), 18);
        assert_eq!(f.ascent(), 18);
        assert_eq!(f.descent(), 4);
        assert_eq!(f.line_gap(), 3);
        assert!((f.scale() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_size_defaults_to_16() {
        let f = FontFace::load(0);
        assert_eq!(f.pixel_size(), 16);
        assert_eq!(f.glyph_width(), 9);
        assert_eq!(f.line_height(), 20);
    }

    #[test]
    fn glyph_width_has_floor_of_three() {
        assert_eq!(FontFace::load(1).glyph_width(), 3);
        assert_eq!(FontFace::load(4).glyph_width(), 3);
        assert_eq!(FontFace::load(5).glyph_width(), 3);
        assert_eq!(FontFace::load(6).glyph_width(), 3);
        assert_eq!(FontFace::load(7).glyph_width(), 4);
        assert_eq!(FontFace::load(28).glyph_width(), 16);
    }

    #[test]
    fn unload_resets_face() {
        let mut f = FontFace::load(18);
        f.unload();
        assert!(!f.is_loaded());
        assert_eq!(f, FontFace::default());
    }

    #[test]
    fn font_set_selects_by_heading_flag() {
        let set = FontSet::load(18, 28);
        assert_eq!(set.select(false).pixel_size(), 18);
        assert_eq!(set.select(true).pixel_size(), 28);
    }

    // -- measure --

    #[test]
    fn measure_single_word() {
        let f = FontFace::load(16);
        assert_eq!(measure(&f, "Hello "), (60, 20));
        assert_eq!(measure(&f, "world "), (60, 20));
    }

    #[test]
    fn measure_empty_is_zero() {
        assert_eq!(measure(&FontFace::load(16), ""), (0, 0));
    }

    #[test]
    fn measure_unloaded_is_zero() {
        let f = FontFace::default();
        assert_eq!(measure(&f, "anything"), (0, 0));
        assert_eq!(measure(&f, ""), (0, 0));
    }

    #[test]
    fn measure_multiline_takes_widest_line() {
        let f = FontFace::load(16);
        // Lines of 2, 5 and 0 chars.
        assert_eq!(measure(&f, "ab\nabcde\n"), (50, 60));
    }

    #[test]
    fn measure_newline_only_falls_back_to_glyph_width() {
        let f = FontFace::load(16);
        assert_eq!(measure(&f, "\n"), (9, 40));
    }

    #[test]
    fn measure_counts_chars_not_bytes() {
        let f = FontFace::load(16);
        assert_eq!(measure(&f, "héllo").0, 5 * 10);
    }

    // -- rasterize --

    #[test]
    fn rasterize_matches_measure() {
        let f = FontFace::load(16);
        let bmp = rasterize(&f, "Hello ", INK).unwrap();
        assert_eq!((bmp.width, bmp.height), measure(&f, "Hello "));
        assert_eq!(bmp.pixels.len(), (60 * 20 * 4) as usize);
    }

    #[test]
    fn rasterize_paints_glyph_blocks() {
        let f = FontFace::load(16);
        let bmp = rasterize(&f, "ab", INK).unwrap();
        // First block spans x 0..9, y 0..16.
        assert_eq!(pixel(&bmp, 0, 0), INK.to_bytes());
        assert_eq!(pixel(&bmp, 8, 15), INK.to_bytes());
        // Spacing column and the rows below the glyph stay transparent.
        assert_eq!(pixel(&bmp, 9, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&bmp, 0, 16), [0, 0, 0, 0]);
        // Second block starts one advance later.
        assert_eq!(pixel(&bmp, 10, 0), INK.to_bytes());
    }

    #[test]
    fn rasterize_leaves_spaces_blank() {
        let f = FontFace::load(16);
        let bmp = rasterize(&f, "a b", INK).unwrap();
        for x in 10..19 {
            assert_eq!(pixel(&bmp, x, 4), [0, 0, 0, 0], "x={x}");
        }
        assert_eq!(pixel(&bmp, 20, 4), INK.to_bytes());
    }

    #[test]
    fn rasterize_newline_moves_to_next_line() {
        let f = FontFace::load(16);
        let bmp = rasterize(&f, "a\nb", INK).unwrap();
        assert_eq!((bmp.width, bmp.height), (10, 40));
        assert_eq!(pixel(&bmp, 0, 0), INK.to_bytes());
        assert_eq!(pixel(&bmp, 0, 20), INK.to_bytes());
        assert_eq!(pixel(&bmp, 0, 17), [0, 0, 0, 0]);
    }

    #[test]
    fn rasterize_rejects_degenerate_input() {
        assert!(rasterize(&FontFace::load(16), "", INK).is_none());
        assert!(rasterize(&FontFace::default(), "abc", INK).is_none());
    }

    #[test]
    fn rasterize_all_spaces_is_blank() {
        let bmp = rasterize(&FontFace::load(16), "   ", INK).unwrap();
        assert!(bmp.pixels.iter().all(|&b| b == 0));
    }

    // -- render --

    #[test]
    fn render_uploads_and_releases_texture() {
        let mut be = MockBackend::new();
        let f = FontFace::load(16);
        {
            let mut tex = render(&mut be, &f, "Hello ", INK).unwrap();
            assert_eq!((tex.width(), tex.height()), (60, 20));
            tex.draw_at(5, 7).unwrap();
        }
        assert_eq!(be.created, 1);
        assert_eq!(be.live_textures(), 0);
        let (_, x, y, w, h) = be.blits()[0];
        assert_eq!((x, y, w, h), (5, 7, 60, 20));
    }

    #[test]
    fn render_returns_none_on_allocation_failure() {
        let mut be = MockBackend::new();
        be.fail_texture_loads = true;
        assert!(render(&mut be, &FontFace::load(16), "abc", INK).is_none());
        assert_eq!(be.live_textures(), 0);
    }

    #[test]
    fn render_returns_none_for_empty_text() {
        let mut be = MockBackend::new();
        assert!(render(&mut be, &FontFace::load(16), "", INK).is_none());
        assert_eq!(be.created, 0);
    }

    // -- properties --

    proptest! {
        #[test]
        fn width_is_advance_per_char(px in 1u32..64, words in prop::collection::vec("[a-z]{1,8}", 1..6)) {
            let f = FontFace::load(px);
            let text = words.join(" ") + " ";
            let chars = text.chars().count() as u32;
            let summed: u32 = words
                .iter()
                .map(|w| (w.len() as u32 + 1) * (f.glyph_width() + 1))
                .sum();
            prop_assert_eq!(measure(&f, &text).0, chars * f.advance());
            prop_assert_eq!(measure(&f, &text).0, summed);
        }

        #[test]
        fn width_is_monotonic_in_length(px in 1u32..64, s in "[a-z ]{0,40}", extra in "[a-z]{1,5}") {
            let f = FontFace::load(px);
            let longer = format!("{s}{extra}");
            prop_assert!(measure(&f, &s).0 <= measure(&f, &longer).0);
        }

        #[test]
        fn measure_is_idempotent(px in 0u32..64, s in "\\PC{0,30}") {
            let f = FontFace::load(px);
            prop_assert_eq!(measure(&f, &s), measure(&f, &s));
        }

        #[test]
        fn rendered_size_equals_measured(px in 1u32..48, s in "[a-zA-Z \n]{1,30}") {
            let f = FontFace::load(px);
            let bmp = rasterize(&f, &s, INK).unwrap();
            prop_assert_eq!((bmp.width, bmp.height), measure(&f, &s));
            prop_assert_eq!(bmp.pixels.len(), (bmp.width * bmp.height * 4) as usize);
        }
    }
}
