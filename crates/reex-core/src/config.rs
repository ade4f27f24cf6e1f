//! Runtime configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! the stock browser. Lookup order: the file named by `REEXPLORE_CONFIG`,
//! then `reexplore.toml` in the working directory, then built-in defaults.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ReexError, Result};
use crate::ui::{DEFAULT_SCROLL_STEP, DEFAULT_URL_CAPACITY};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "REEXPLORE_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "reexplore.toml";

/// Browser configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReexConfig {
    #[serde(default = "default_title")]
    pub window_title: String,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Page opened when no URL is given on the command line.
    #[serde(default = "default_home_url")]
    pub home_url: String,
    #[serde(default = "default_body_font_px")]
    pub body_font_px: u32,
    #[serde(default = "default_heading_font_px")]
    pub heading_font_px: u32,
    /// Pixels scrolled per wheel notch.
    #[serde(default = "default_scroll_step")]
    pub scroll_step_px: i32,
    /// URL buffer size in bytes.
    #[serde(default = "default_url_capacity")]
    pub url_capacity: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u8,
}

fn default_title() -> String {
    "ReExplore XP".to_string()
}
fn default_window_width() -> u32 {
    1100
}
fn default_window_height() -> u32 {
    780
}
fn default_home_url() -> String {
    "http://neverssl.com/".to_string()
}
fn default_body_font_px() -> u32 {
    18
}
fn default_heading_font_px() -> u32 {
    28
}
fn default_scroll_step() -> i32 {
    DEFAULT_SCROLL_STEP
}
fn default_url_capacity() -> usize {
    DEFAULT_URL_CAPACITY
}
fn default_user_agent() -> String {
    "ReExploreXP/0.5".to_string()
}
fn default_max_redirects() -> u8 {
    5
}

impl Default for ReexConfig {
    fn default() -> Self {
        Self {
            window_title: default_title(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            home_url: default_home_url(),
            body_font_px: default_body_font_px(),
            heading_font_px: default_heading_font_px(),
            scroll_step_px: default_scroll_step(),
            url_capacity: default_url_capacity(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl ReexConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|e| match e {
            ReexError::Config(msg) => ReexError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Load using the standard lookup order.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        match locate(std::env::var_os(CONFIG_ENV), &cwd) {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_file(&path)
            },
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ReexError::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        if self.body_font_px == 0 || self.heading_font_px == 0 {
            return Err(ReexError::Config("font sizes must be positive".into()));
        }
        if self.url_capacity < 2 {
            return Err(ReexError::Config(format!(
                "url_capacity must be at least 2, got {}",
                self.url_capacity
            )));
        }
        if self.home_url.is_empty() {
            return Err(ReexError::Config("home_url must not be empty".into()));
        }
        Ok(())
    }
}

/// Pick the config file: the env override if set, else `reexplore.toml`
/// in `cwd` if it exists.
pub fn locate(env_value: Option<OsString>, cwd: &Path) -> Option<PathBuf> {
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(value));
    }
    let local = cwd.join(CONFIG_FILE);
    local.is_file().then_some(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let c = ReexConfig::from_toml("").unwrap();
        assert_eq!(c, ReexConfig::default());
        assert_eq!(c.window_title, "ReExplore XP");
        assert_eq!((c.window_width, c.window_height), (1100, 780));
        assert_eq!(c.home_url, "http://neverssl.com/");
        assert_eq!(c.scroll_step_px, 40);
        assert_eq!(c.url_capacity, 1024);
        assert_eq!(c.user_agent, "ReExploreXP/0.5");
        assert_eq!(c.max_redirects, 5);
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let c = ReexConfig::from_toml(
            r#"
            home_url = "http://example.com/"
            body_font_px = 16
            "#,
        )
        .unwrap();
        assert_eq!(c.home_url, "http://example.com/");
        assert_eq!(c.body_font_px, 16);
        assert_eq!(c.heading_font_px, 28);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = ReexConfig::from_toml("home_url = [").unwrap_err();
        assert!(matches!(err, ReexError::TomlParse(_)));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(ReexConfig::from_toml("colour = 3").is_err());
    }

    #[test]
    fn zero_window_is_config_error() {
        let err = ReexConfig::from_toml("window_width = 0").unwrap_err();
        assert!(matches!(err, ReexError::Config(_)));
    }

    #[test]
    fn tiny_url_capacity_is_config_error() {
        let err = ReexConfig::from_toml("url_capacity = 1").unwrap_err();
        assert!(format!("{err}").contains("url_capacity"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "window_title = \"Test\"\n").unwrap();
        let c = ReexConfig::from_file(&path).unwrap();
        assert_eq!(c.window_title, "Test");
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReexConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ReexError::Io(_)));
    }

    #[test]
    fn from_file_config_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "heading_font_px = 0\n").unwrap();
        let msg = format!("{}", ReexConfig::from_file(&path).unwrap_err());
        assert!(msg.contains(CONFIG_FILE));
    }

    #[test]
    fn locate_prefers_env() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        let found = locate(Some("/etc/reex.toml".into()), dir.path());
        assert_eq!(found, Some(PathBuf::from("/etc/reex.toml")));
    }

    #[test]
    fn locate_falls_back_to_cwd_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(locate(None, dir.path()), None);
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        assert_eq!(locate(None, dir.path()), Some(dir.path().join(CONFIG_FILE)));
        // An empty env value is ignored.
        assert_eq!(
            locate(Some(OsString::new()), dir.path()),
            Some(dir.path().join(CONFIG_FILE))
        );
    }
}
