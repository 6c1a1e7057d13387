//! Configuration file parser for ~/.config/feedgrid/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::layout::HeightModel;
use crate::preferences::ViewMode;
use crate::seen::{ObserverOptions, DEFAULT_DEBOUNCE, DEFAULT_THRESHOLD};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Startup view mode. When unset, the last persisted mode is used.
    pub view_mode: Option<ViewMode>,

    /// Items requested per page.
    pub page_size: usize,

    /// Artificial delay added to every fixture call, in milliseconds.
    pub latency_ms: u64,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,

    pub seen: SeenConfig,

    /// Height estimate constants for column balancing.
    pub layout: HeightModel,

    pub notifications: NotificationsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view_mode: None,
            page_size: 20,
            latency_ms: 0,
            keybindings: HashMap::new(),
            seen: SeenConfig::default(),
            layout: HeightModel::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

/// `[seen]`: seen-state tracking.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeenConfig {
    /// Quiet period before a seen marker is committed.
    pub debounce_ms: u64,
    /// Visible fraction needed for an entry to count as seen.
    pub threshold: f32,
    /// Rows added above and below the viewport when measuring visibility.
    pub root_margin_rows: usize,
}

impl Default for SeenConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            threshold: DEFAULT_THRESHOLD,
            root_margin_rows: 0,
        }
    }
}

impl SeenConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Observer options with the threshold forced into `0.0..=1.0`.
    pub fn observer_options(&self) -> ObserverOptions {
        let threshold = if self.threshold.is_finite() {
            self.threshold.clamp(0.0, 1.0)
        } else {
            tracing::warn!(threshold = self.threshold, "Invalid seen threshold, using default");
            DEFAULT_THRESHOLD
        };
        ObserverOptions {
            threshold,
            root_margin: self.root_margin_rows,
        }
    }
}

/// `[notifications]`: unread count refresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Seconds between unread count polls. 0 disables polling.
    pub poll_interval_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
        }
    }
}

impl NotificationsConfig {
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: &'static [&'static str] = &[
        "view_mode",
        "page_size",
        "latency_ms",
        "keybindings",
        "seen",
        "layout",
        "notifications",
    ];

    const SECTION_KEYS: &'static [(&'static str, &'static [&'static str])] = &[
        ("seen", &["debounce_ms", "threshold", "root_margin_rows"]),
        (
            "layout",
            &[
                "text_only_height",
                "chrome_height",
                "nominal_column_width",
                "unknown_media_height",
            ],
        ),
        ("notifications", &["poll_interval_secs"]),
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            warn_unknown_keys(&raw);
        }

        let mut config: Config = toml::from_str(content)?;
        config.layout = config.layout.sanitized();
        config.page_size = config.page_size.max(1);
        tracing::info!(
            view_mode = ?config.view_mode,
            page_size = config.page_size,
            debounce_ms = config.seen.debounce_ms,
            "Loaded configuration"
        );
        Ok(config)
    }
}

fn warn_unknown_keys(raw: &toml::Table) {
    for (key, value) in raw {
        if !Config::KNOWN_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Unknown key in config file, ignoring");
            continue;
        }
        let Some((_, known)) = Config::SECTION_KEYS.iter().find(|(s, _)| *s == key.as_str()) else {
            continue;
        };
        if let Some(table) = value.as_table() {
            for sub in table.keys().filter(|k| !known.contains(&k.as_str())) {
                tracing::warn!(section = %key, key = %sub, "Unknown key in config section, ignoring");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.view_mode, None);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.seen.debounce(), Duration::from_millis(400));
        assert_eq!(config.seen.observer_options().threshold, 0.25);
        assert_eq!(config.layout, HeightModel::default());
        assert_eq!(config.notifications.poll_interval(), Some(Duration::from_secs(30)));
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/feedgrid_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("feedgrid_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.seen.debounce_ms, 400);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
view_mode = "double"
page_size = 40
latency_ms = 150

[keybindings]
quit = "Ctrl+q"
mark_all_read = "M"

[seen]
debounce_ms = 250
threshold = 0.5
root_margin_rows = 2

[layout]
text_only_height = 100.0

[notifications]
poll_interval_secs = 0
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.view_mode, Some(ViewMode::Double));
        assert_eq!(config.page_size, 40);
        assert_eq!(config.latency_ms, 150);
        assert_eq!(config.seen.debounce(), Duration::from_millis(250));
        let options = config.seen.observer_options();
        assert_eq!(options.threshold, 0.5);
        assert_eq!(options.root_margin, 2);
        assert_eq!(config.layout.text_only_height, 100.0);
        assert_eq!(config.layout.chrome_height, 96.0);
        assert_eq!(config.notifications.poll_interval(), None);
        assert_eq!(
            config.keybindings.get("mark_all_read").map(String::as_str),
            Some("M")
        );
    }

    #[test]
    fn test_layout_overrides_are_sanitized() {
        let config = Config::parse("[layout]\ntext_only_height = -5.0\nunknown_media_height = 10.0\n").unwrap();
        assert_eq!(config.layout.text_only_height, 140.0);
        assert!(config.layout.unknown_media_height > config.layout.text_only_height);
    }

    #[test]
    fn test_threshold_is_clamped() {
        let config = Config::parse("[seen]\nthreshold = 3.0\n").unwrap();
        assert_eq!(config.seen.observer_options().threshold, 1.0);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = r#"
page_size = 5
totally_fake_key = "should not fail"

[seen]
debounse_ms = 10
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.seen.debounce_ms, 400);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::parse("view_mode = 3\n").is_err());
        assert!(Config::parse("view_mode = \"quad\"\n").is_err());
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("feedgrid_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
