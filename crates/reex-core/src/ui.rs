//! UI and navigation state, and the input state machine that mutates it.

use crate::config::ReexConfig;
use crate::document::truncate_to_boundary;
use crate::font::FontSet;
use crate::input::InputEvent;

/// Pixels scrolled per wheel notch unless configured otherwise.
pub const DEFAULT_SCROLL_STEP: i32 = 40;

/// Default URL buffer capacity in bytes.
pub const DEFAULT_URL_CAPACITY: usize = 1024;

/// State owned by the host for the whole run.
///
/// The initial URL is cut to `url_capacity - 1` bytes; typed text is only
/// accepted while the result stays shorter than that. `navigate_requested`
/// is a one-shot flag set by Enter and cleared by
/// [`UiState::take_navigation`].
#[derive(Debug, Clone)]
pub struct UiState {
    url: String,
    url_capacity: usize,
    navigate_requested: bool,
    scroll_offset: i32,
    scroll_step: i32,
    pub fonts: FontSet,
}

impl UiState {
    /// Create the initial state with both faces loaded.
    pub fn new(initial_url: &str, config: &ReexConfig) -> Self {
        let url_capacity = config.url_capacity.max(1);
        let mut url = initial_url.to_string();
        truncate_to_boundary(&mut url, url_capacity - 1);
        Self {
            url,
            url_capacity,
            navigate_requested: false,
            scroll_offset: 0,
            scroll_step: config.scroll_step_px,
            fonts: FontSet::load(config.body_font_px, config.heading_font_px),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    pub fn navigate_requested(&self) -> bool {
        self.navigate_requested
    }

    /// Apply one input event. Returns `true` when the frame must be
    /// redrawn.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Wheel { dy, .. } => {
                self.scroll_offset = self
                    .scroll_offset
                    .saturating_sub(dy.saturating_mul(self.scroll_step))
                    .max(0);
                true
            },
            InputEvent::TextInput(text) => {
                if self.url.len() + text.len() < self.url_capacity - 1 {
                    self.url.push_str(text);
                    true
                } else {
                    false
                }
            },
            InputEvent::Backspace => {
                self.url.pop();
                true
            },
            InputEvent::Confirm => {
                self.navigate_requested = true;
                true
            },
            // Quitting is the host's decision.
            InputEvent::Quit => false,
        }
    }

    /// Clear a pending navigation and return the URL to load.
    pub fn take_navigation(&mut self) -> Option<String> {
        if std::mem::take(&mut self.navigate_requested) {
            Some(self.url.clone())
        } else {
            None
        }
    }

    /// Reset the scroll position, e.g. after a new page loads.
    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
    }

    /// Unload the fonts at shutdown.
    pub fn shutdown(&mut self) {
        self.fonts.unload();
    }
}
