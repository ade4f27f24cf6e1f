//! Image decoding for hydration.
//!
//! PNG and BMP are decoded here; JPEG and GIF go through the `image`
//! crate. Every supported format is normalized to RGBA8 so the result can be
//! handed straight to [`SdiBackend::load_texture`](crate::backend::SdiBackend::load_texture).

use crate::error::{ReexError, Result};

/// Decoded image data (RGBA pixels).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel.
    pub pixels: Vec<u8>,
}

/// Image format detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Bmp,
    Jpeg,
    Gif,
    Unknown,
}

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Detect the format from the first few bytes.
pub fn detect_format(data: &[u8]) -> ImageFormat {
    if data.len() < 4 {
        return ImageFormat::Unknown;
    }

    if data.starts_with(&PNG_MAGIC[..4]) {
        ImageFormat::Png
    } else if data.starts_with(b"BM") {
        ImageFormat::Bmp
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        ImageFormat::Jpeg
    } else if data.starts_with(b"GIF8") {
        ImageFormat::Gif
    } else {
        ImageFormat::Unknown
    }
}

impl ImageFormat {
    /// Whether [`decode`] can handle this format.
    pub fn is_supported(self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

/// Decode PNG, BMP, JPEG or GIF bytes into RGBA8. Only the first frame of
/// an animated GIF is kept.
pub fn decode(data: &[u8]) -> Result<DecodedImage> {
    match detect_format(data) {
        ImageFormat::Png => decode_png(data),
        ImageFormat::Bmp => decode_bmp(data),
        ImageFormat::Jpeg => decode_with_image_crate(data, ::image::ImageFormat::Jpeg),
        ImageFormat::Gif => decode_with_image_crate(data, ::image::ImageFormat::Gif),
        ImageFormat::Unknown => Err(ReexError::Decode("unsupported image format".into())),
    }
}

// ---------------------------------------------------------------------------
// JPEG / GIF
// ---------------------------------------------------------------------------

fn decode_with_image_crate(data: &[u8], format: ::image::ImageFormat) -> Result<DecodedImage> {
    let rgba = ::image::load_from_memory_with_format(data, format)
        .map_err(|e| ReexError::Decode(format!("{format:?}: {e}")))?
        .to_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

fn decode_png(data: &[u8]) -> Result<DecodedImage> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| ReexError::Decode(format!("png header: {e}")))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| ReexError::Decode(format!("png data: {e}")))?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != png::BitDepth::Eight {
        return Err(ReexError::Decode(format!(
            "unexpected png bit depth after expansion: {:?}",
            info.bit_depth
        )));
    }

    let pixels = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::Indexed => {
            return Err(ReexError::Decode("indexed png was not expanded".into()));
        },
    };

    Ok(DecodedImage {
        width: info.width,
        height: info.height,
        pixels,
    })
}

// ---------------------------------------------------------------------------
// BMP
// ---------------------------------------------------------------------------

/// Decode an uncompressed 24- or 32-bit BMP.
fn decode_bmp(data: &[u8]) -> Result<DecodedImage> {
    if data.len() < 54 {
        return Err(ReexError::Decode("bmp header truncated".into()));
    }

    let pixel_offset = u32::from_le_bytes([data[10], data[11], data[12], data[13]]) as usize;
    let width = i32::from_le_bytes([data[18], data[19], data[20], data[21]]);
    let height = i32::from_le_bytes([data[22], data[23], data[24], data[25]]);
    let bpp = u16::from_le_bytes([data[28], data[29]]);
    let compression = u32::from_le_bytes([data[30], data[31], data[32], data[33]]);

    if width <= 0 || height == 0 {
        return Err(ReexError::Decode(format!("bmp size {width}x{height}")));
    }
    if compression != 0 {
        return Err(ReexError::Decode(format!("bmp compression {compression}")));
    }
    if bpp != 24 && bpp != 32 {
        return Err(ReexError::Decode(format!("bmp depth {bpp}")));
    }

    let w = width as usize;
    let h = height.unsigned_abs() as usize;
    let bottom_up = height > 0;
    let bytes_per_pixel = usize::from(bpp / 8);
    // Rows are padded to 4 bytes.
    let row_size = (w * bytes_per_pixel).div_ceil(4) * 4;

    let end = h
        .checked_mul(row_size)
        .and_then(|n| n.checked_add(pixel_offset))
        .ok_or_else(|| ReexError::Decode("bmp dimensions overflow".into()))?;
    if end > data.len() + (row_size - w * bytes_per_pixel) {
        return Err(ReexError::Decode("bmp pixel data truncated".into()));
    }

    let mut pixels = Vec::with_capacity(w * h * 4);
    for row in 0..h {
        let src_row = if bottom_up { h - 1 - row } else { row };
        let start = pixel_offset + src_row * row_size;
        let line = &data[start..start + w * bytes_per_pixel];
        for px in line.chunks_exact(bytes_per_pixel) {
            // BGR(A)
            let alpha = if bpp == 32 { px[3] } else { 255 };
            pixels.extend_from_slice(&[px[2], px[1], px[0], alpha]);
        }
    }

    Ok(DecodedImage {
        width: w as u32,
        height: h as u32,
        pixels,
    })
}
