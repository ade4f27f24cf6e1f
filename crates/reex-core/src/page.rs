//! Page loading: fetch, parse and hydrate a [`Document`].
//!
//! This is the blocking host step run between frames when the user asks
//! for a new URL. Failures never propagate: a page that cannot be fetched
//! becomes [`Document::load_failed`], and an image that cannot be fetched
//! or decoded stays unhydrated for the document's lifetime.

use crate::backend::SdiBackend;
use crate::document::{Document, Element, ImageElement};
use crate::error::{ReexError, Result};
use crate::html;
use crate::image;
use crate::loader::{Fetcher, Url};

/// Outcome of hydrating one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrateStats {
    pub hydrated: usize,
    pub failed: usize,
}

/// Drives a [`Fetcher`] to produce documents.
pub struct PageLoader<F: Fetcher> {
    fetcher: F,
}

impl<F: Fetcher> PageLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    // ---------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------

    /// Fetch `url` and build a hydrated document.
    pub fn load(&self, backend: &mut dyn SdiBackend, url: &str) -> Document {
        log::info!("Loading {url}");
        let response = match self.fetcher.fetch(url) {
            Ok(r) if r.is_success() => r,
            Ok(r) => {
                log::warn!("{url}: HTTP {} ({} bytes)", r.status, r.body.len());
                return Document::load_failed();
            },
            Err(e) => {
                log::warn!("{url}: {e}");
                return Document::load_failed();
            },
        };

        // A bare image is shown as a one-image page.
        if image::detect_format(&response.body).is_supported() {
            let mut document = Document::new();
            let mut img = ImageElement::new(response.url.as_str());
            if let Err(e) = hydrate_image(backend, &mut img, &response.body) {
                log::warn!("{}: {e}", response.url);
            }
            // An empty document never hits capacity.
            let _ = document.push(Element::Image(img));
            return document;
        }

        let base = Url::parse(&response.url);
        let mut document = html::parse(&response.body, base.as_ref());
        let stats = self.hydrate(backend, &mut document);
        log::info!(
            "Loaded {} \"{}\" ({} elements, {} images, {} failed)",
            response.url,
            document.title.as_deref().unwrap_or(""),
            document.len(),
            stats.hydrated,
            stats.failed
        );
        document
    }

    /// Release the current document's textures and replace it with the
    /// page at `url`.
    pub fn navigate(&self, backend: &mut dyn SdiBackend, document: &mut Document, url: &str) {
        document.release_textures(backend);
        *document = self.load(backend, url);
    }

    // ---------------------------------------------------------------
    // Hydration
    // ---------------------------------------------------------------

    /// Fetch, decode and upload every image that has no texture yet.
    pub fn hydrate(&self, backend: &mut dyn SdiBackend, document: &mut Document) -> HydrateStats {
        let mut stats = HydrateStats::default();
        for img in document.images_mut().filter(|img| !img.is_hydrated()) {
            let result = match self.fetch_image(&img.src) {
                Ok(bytes) => hydrate_image(backend, img, &bytes),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => stats.hydrated += 1,
                Err(e) => {
                    log::warn!("image {} not loaded: {e}", img.src);
                    stats.failed += 1;
                },
            }
        }
        log::debug!(
            "hydrated {} images, {} failed",
            stats.hydrated,
            stats.failed
        );
        stats
    }

    fn fetch_image(&self, src: &str) -> Result<Vec<u8>> {
        let response = self.fetcher.fetch(src)?;
        if !response.is_success() {
            return Err(ReexError::Network(format!(
                "HTTP {} ({} bytes)",
                response.status,
                response.body.len()
            )));
        }
        Ok(response.body)
    }
}

/// Decode `bytes` and upload them as `img`'s texture. On failure `img` is
/// left untouched.
fn hydrate_image(backend: &mut dyn SdiBackend, img: &mut ImageElement, bytes: &[u8]) -> Result<()> {
    let decoded = image::decode(bytes)?;
    let texture = backend.load_texture(decoded.width, decoded.height, &decoded.pixels)?;
    img.width = decoded.width;
    img.height = decoded.height;
    img.texture = Some(texture);
    Ok(())
}
