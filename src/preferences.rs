//! Persisted user preferences.
//!
//! Only the view mode survives restarts. It lives in `state.json` next to the
//! config file and is written atomically: a uniquely named temp file is
//! written and then renamed over the target.
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Failed to access preferences file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

// ============================================================================
// View Mode
// ============================================================================

/// How many columns the feed grid uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Single,
    Double,
    #[default]
    Triple,
}

impl ViewMode {
    pub fn column_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }

    /// Single → Double → Triple → Single.
    pub fn next(self) -> Self {
        match self {
            Self::Single => Self::Double,
            Self::Double => Self::Triple,
            Self::Triple => Self::Single,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "1" => Ok(Self::Single),
            "double" | "2" => Ok(Self::Double),
            "triple" | "3" => Ok(Self::Triple),
            other => Err(format!("Unknown view mode: {other}")),
        }
    }
}

// ============================================================================
// Preferences File
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub view_mode: ViewMode,
}

impl Preferences {
    /// Read preferences from `path`.
    ///
    /// A missing, unreadable, or corrupt file yields the defaults: preferences
    /// are a convenience and never block startup.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read preferences");
                }
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt preferences file, using defaults");
                Self::default()
            }
        }
    }

    /// Write preferences to `path` atomically, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<(), PreferencesError> {
        let json = serde_json::to_vec_pretty(self)?;
        let io_err = |p: &Path| {
            let path = p.display().to_string();
            move |source| PreferencesError::Io { path, source }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let temp_path = temp_path_for(path);
        let result = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .and_then(|()| std::fs::rename(&temp_path, path));

        if let Err(e) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(io_err(path)(e));
        }
        tracing::debug!(path = %path.display(), view_mode = %self.view_mode, "Saved preferences");
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    path.with_extension(format!("tmp.{suffix:016x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_counts_and_cycle() {
        assert_eq!(ViewMode::Single.column_count(), 1);
        assert_eq!(ViewMode::Triple.column_count(), 3);
        assert_eq!(ViewMode::Triple.next(), ViewMode::Single);
        assert_eq!(ViewMode::Single.next().next(), ViewMode::Triple);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Double".parse::<ViewMode>(), Ok(ViewMode::Double));
        assert_eq!("1".parse::<ViewMode>(), Ok(ViewMode::Single));
        assert!("quad".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join("feedgrid_prefs_test_save");
        let path = dir.join("nested").join("state.json");
        std::fs::remove_dir_all(&dir).ok();

        let prefs = Preferences {
            view_mode: ViewMode::Double,
        };
        prefs.save(&path).unwrap();
        assert_eq!(Preferences::load(&path), prefs);

        // No temp files left behind
        let leftovers = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .map(|e| e.file_name().to_string_lossy().contains("tmp"))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(leftovers, 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_or_corrupt_file_gives_default() {
        assert_eq!(
            Preferences::load(Path::new("/nonexistent/feedgrid/state.json")),
            Preferences::default()
        );

        let dir = std::env::temp_dir().join("feedgrid_prefs_test_corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(Preferences::load(&path), Preferences::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_view_mode_in_file_is_rejected() {
        let dir = std::env::temp_dir().join("feedgrid_prefs_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");
        std::fs::write(&path, r#"{"view_mode":"quad"}"#).unwrap();
        assert_eq!(Preferences::load(&path).view_mode, ViewMode::Triple);
        std::fs::remove_dir_all(&dir).ok();
    }
}
