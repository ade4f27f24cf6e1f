//! Host state and the per-frame steps of the browser loop.

use reex_core::backend::{InputBackend, SdiBackend};
use reex_core::config::ReexConfig;
use reex_core::document::Document;
use reex_core::error::Result;
use reex_core::input::InputEvent;
use reex_core::loader::Fetcher;
use reex_core::page::PageLoader;
use reex_core::paint::{TOOLBAR_COLOR, draw_frame};
use reex_core::ui::UiState;

/// Result of draining one batch of input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
}

/// Everything the frame loop owns.
pub struct AppState<F: Fetcher> {
    pub ui: UiState,
    pub document: Document,
    loader: PageLoader<F>,
    window_title: String,
}

impl<F: Fetcher> AppState<F> {
    pub fn new(start_url: &str, config: &ReexConfig, loader: PageLoader<F>) -> Self {
        Self {
            ui: UiState::new(start_url, config),
            document: Document::new(),
            loader,
            window_title: config.window_title.clone(),
        }
    }

    /// Replace the current page with `url` and show its title in the
    /// window caption.
    pub fn open(&mut self, backend: &mut dyn SdiBackend, url: &str) {
        self.loader.navigate(backend, &mut self.document, url);
        self.ui.reset_scroll();
        if let Err(e) = backend.set_window_title(&self.caption()) {
            log::warn!("window title not updated: {e}");
        }
    }

    /// `"<page title> - <app title>"`, or the app title alone for pages
    /// without one.
    pub fn caption(&self) -> String {
        match &self.document.title {
            Some(title) => format!("{title} - {}", self.window_title),
            None => self.window_title.clone(),
        }
    }

    /// Feed events to the input state machine. `Quit` stops at once; the
    /// remaining events in the batch are dropped.
    pub fn handle_events(&mut self, events: Vec<InputEvent>) -> InputResult {
        for event in &events {
            if *event == InputEvent::Quit {
                return InputResult::Quit;
            }
            self.ui.handle_event(event);
        }
        InputResult::Continue
    }

    /// Load the requested page, if Enter was pressed since the last frame.
    /// Returns whether a navigation happened.
    pub fn apply_navigation(&mut self, backend: &mut dyn SdiBackend) -> bool {
        match self.ui.take_navigation() {
            Some(url) => {
                log::info!("Navigate: {url}");
                self.open(backend, &url);
                true
            },
            None => false,
        }
    }

    /// Clear, composite and present one frame.
    pub fn draw(&self, backend: &mut dyn SdiBackend) -> Result<()> {
        backend.clear(TOOLBAR_COLOR)?;
        draw_frame(backend, &self.ui, &self.document)?;
        backend.swap_buffers()
    }

    /// Run frames until the user quits, then shut everything down. The
    /// shutdown also happens when a frame fails; that error is returned
    /// after the backend is closed.
    pub fn run<B: SdiBackend + InputBackend>(&mut self, backend: &mut B) -> Result<()> {
        let result = self.run_frames(backend);
        if let Err(e) = &result {
            log::error!("frame loop stopped: {e}");
        }
        self.shutdown(backend);
        let closed = backend.shutdown();
        result.and(closed)
    }

    fn run_frames<B: SdiBackend + InputBackend>(&mut self, backend: &mut B) -> Result<()> {
        loop {
            if self.handle_events(backend.poll_events()) == InputResult::Quit {
                return Ok(());
            }
            self.apply_navigation(backend);
            self.draw(backend)?;
        }
    }

    /// Release the page's textures and unload fonts.
    pub fn shutdown(&mut self, backend: &mut dyn SdiBackend) {
        self.document.release_textures(backend);
        self.ui.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use reex_core::backend::{Color, TextureId};
    use reex_core::document::{Element, LOAD_FAILED_TEXT};
    use reex_core::error::ReexError;
    use reex_core::loader::FetchResponse;

    /// Counts frames and tracks live textures.
    #[derive(Default)]
    struct CountingBackend {
        live: HashSet<u64>,
        next: u64,
        clears: Vec<Color>,
        frames: usize,
        title: Option<String>,
        /// Event batches handed out by `poll_events`, front first.
        batches: Vec<Vec<InputEvent>>,
        /// Frame number whose `swap_buffers` fails.
        fail_frame: Option<usize>,
        shut_down: bool,
    }

    impl InputBackend for CountingBackend {
        fn poll_events(&mut self) -> Vec<InputEvent> {
            if self.batches.is_empty() {
                vec![InputEvent::Quit]
            } else {
                self.batches.remove(0)
            }
        }
    }

    impl SdiBackend for CountingBackend {
        fn init(&mut self, _w: u32, _h: u32) -> Result<()> {
            Ok(())
        }
        fn clear(&mut self, color: Color) -> Result<()> {
            self.clears.push(color);
            Ok(())
        }
        fn blit(&mut self, tex: TextureId, _x: i32, _y: i32, _w: u32, _h: u32) -> Result<()> {
            if self.live.contains(&tex.0) {
                Ok(())
            } else {
                Err(ReexError::Backend(format!("texture not found: {}", tex.0)))
            }
        }
        fn fill_rect(&mut self, _x: i32, _y: i32, _w: u32, _h: u32, _c: Color) -> Result<()> {
            Ok(())
        }
        fn swap_buffers(&mut self) -> Result<()> {
            self.frames += 1;
            if self.fail_frame == Some(self.frames) {
                return Err(ReexError::Backend("present failed".into()));
            }
            Ok(())
        }
        fn load_texture(&mut self, _w: u32, _h: u32, _rgba: &[u8]) -> Result<TextureId> {
            self.next += 1;
            self.live.insert(self.next);
            Ok(TextureId(self.next))
        }
        fn destroy_texture(&mut self, tex: TextureId) -> Result<()> {
            self.live.remove(&tex.0);
            Ok(())
        }
        fn set_clip_rect(&mut self, _x: i32, _y: i32, _w: u32, _h: u32) -> Result<()> {
            Ok(())
        }
        fn reset_clip_rect(&mut self) -> Result<()> {
            Ok(())
        }
        fn viewport_size(&self) -> (u32, u32) {
            (1100, 780)
        }
        fn set_window_title(&mut self, title: &str) -> Result<()> {
            self.title = Some(title.to_string());
            Ok(())
        }
        fn shutdown(&mut self) -> Result<()> {
            self.shut_down = true;
            Ok(())
        }
    }

    /// Serves one page for `http://home/`; everything else fails.
    struct OnePage;

    impl Fetcher for OnePage {
        fn fetch(&self, url: &str) -> Result<FetchResponse> {
            if url == "http://home/" {
                Ok(FetchResponse {
                    url: url.to_string(),
                    status: 200,
                    body: b"<title>Home Page</title><h1>Home</h1><p>Welcome</p>".to_vec(),
                })
            } else {
                Err(ReexError::Network(format!("cannot resolve {url}")))
            }
        }
    }

    fn state() -> AppState<OnePage> {
        AppState::new(
            "http://home/",
            &ReexConfig::default(),
            PageLoader::new(OnePage),
        )
    }

    fn first_text(doc: &Document) -> &str {
        match &doc.elements()[0] {
            Element::Text(run) => &run.text,
            Element::Image(img) => &img.src,
        }
    }

    #[test]
    fn quit_ends_the_batch() {
        let mut s = state();
        let events = vec![
            InputEvent::TextInput("x".into()),
            InputEvent::Quit,
            InputEvent::TextInput("y".into()),
        ];
        assert_eq!(s.handle_events(events), InputResult::Quit);
        assert_eq!(s.ui.url(), "http://home/x");
    }

    #[test]
    fn enter_navigates_once() {
        let mut be = CountingBackend::default();
        let mut s = state();
        s.open(&mut be, "http://home/");
        assert_eq!(first_text(&s.document), "Home\n");

        for _ in 0..3 {
            s.handle_events(vec![InputEvent::Backspace]);
        }
        s.handle_events(vec![
            InputEvent::TextInput("x/".into()),
            InputEvent::Confirm,
        ]);
        assert!(s.apply_navigation(&mut be));
        assert_eq!(first_text(&s.document), LOAD_FAILED_TEXT);
        assert!(!s.apply_navigation(&mut be));
    }

    #[test]
    fn navigation_resets_scroll() {
        let mut be = CountingBackend::default();
        let mut s = state();
        s.handle_events(vec![
            InputEvent::Wheel { dx: 0, dy: -3 },
            InputEvent::Confirm,
        ]);
        assert_eq!(s.ui.scroll_offset(), 120);
        s.apply_navigation(&mut be);
        assert_eq!(s.ui.scroll_offset(), 0);
    }

    #[test]
    fn open_puts_page_title_in_caption() {
        let mut be = CountingBackend::default();
        let mut s = state();
        s.open(&mut be, "http://home/");
        assert_eq!(be.title.as_deref(), Some("Home Page - ReExplore XP"));

        s.open(&mut be, "http://elsewhere/");
        assert_eq!(be.title.as_deref(), Some("ReExplore XP"));
    }

    #[test]
    fn draw_clears_to_toolbar_and_presents() {
        let mut be = CountingBackend::default();
        let mut s = state();
        s.open(&mut be, "http://home/");
        s.draw(&mut be).unwrap();
        s.draw(&mut be).unwrap();
        assert_eq!(be.clears, vec![TOOLBAR_COLOR, TOOLBAR_COLOR]);
        assert_eq!(be.frames, 2);
        assert!(be.live.is_empty());
    }

    #[test]
    fn run_draws_until_quit_then_shuts_down() {
        let mut be = CountingBackend {
            batches: vec![vec![], vec![InputEvent::Wheel { dx: 0, dy: -1 }]],
            ..CountingBackend::default()
        };
        let mut s = state();
        s.open(&mut be, "http://home/");
        s.run(&mut be).unwrap();
        assert_eq!(be.frames, 2);
        assert!(be.shut_down);
        assert!(!s.ui.fonts.body.is_loaded());
    }

    #[test]
    fn failed_frame_still_shuts_down() {
        let mut be = CountingBackend {
            batches: vec![vec![], vec![], vec![]],
            fail_frame: Some(2),
            ..CountingBackend::default()
        };
        let mut s = state();
        s.open(&mut be, "http://home/");
        let err = s.run(&mut be).unwrap_err();
        assert!(format!("{err}").contains("present failed"));
        assert_eq!(be.frames, 2);
        assert!(be.shut_down);
        assert!(!s.ui.fonts.body.is_loaded());
        assert!(be.live.is_empty());
    }

    #[test]
    fn shutdown_unloads_fonts() {
        let mut be = CountingBackend::default();
        let mut s = state();
        s.open(&mut be, "http://home/");
        s.shutdown(&mut be);
        assert!(!s.ui.fonts.body.is_loaded());
        assert!(be.live.is_empty());
    }
}
