//! ReExplore desktop entry point.
//!
//! Usage: `reexplore [URL]`. Type in the address bar and press Enter to
//! load a page, scroll with the mouse wheel, close the window to quit.

mod app_state;

use std::sync::Arc;

use anyhow::Result;

use app_state::AppState;
use reex_backend_sdl::SdlBackend;
use reex_core::backend::SdiBackend;
use reex_core::config::ReexConfig;
use reex_core::loader::http::HttpFetcher;
use reex_core::loader::tls_rustls::RustlsTlsProvider;
use reex_core::page::PageLoader;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ReexConfig::load()?;
    let start_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.home_url.clone());
    log::info!(
        "Starting {} ({}x{})",
        config.window_title,
        config.window_width,
        config.window_height,
    );

    let mut backend = SdlBackend::new(
        &config.window_title,
        config.window_width,
        config.window_height,
    )?;
    backend.init(config.window_width, config.window_height)?;

    let fetcher = HttpFetcher::from_config(&config).with_tls(Arc::new(RustlsTlsProvider::new()));
    let mut state = AppState::new(&start_url, &config, PageLoader::new(fetcher));
    state.open(&mut backend, &start_url);

    state.run(&mut backend)?;
    Ok(())
}
