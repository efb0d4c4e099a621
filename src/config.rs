use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Optional settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "exam-scope.json";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Runtime settings. Every field has a default so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding cached datasets.
    pub cache_dir: PathBuf,
    /// File-name pattern (without extension) of source spreadsheets.
    pub source_pattern: String,
    /// Extensions tried for `source_pattern`.
    pub source_extensions: Vec<String>,
    /// Minimum number of taken subjects to be considered for graduation.
    pub min_subjects_for_eligibility: usize,
    /// Scores at or below this value fail the candidate outright.
    pub fail_threshold: f64,
    /// Number of bins of the score histogram.
    pub histogram_bins: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data_cache"),
            source_pattern: "*-ketquathi-ct*".to_string(),
            source_extensions: vec!["xlsx".to_string(), "csv".to_string()],
            min_subjects_for_eligibility: 4,
            fail_threshold: 1.0,
            histogram_bins: 20,
        }
    }
}

impl Settings {
    /// Parse a settings file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load [`SETTINGS_FILE`] from `dir`, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempdir().unwrap();
        assert_eq!(Settings::load_or_default(tmp.path()), Settings::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            tmp.path().join(SETTINGS_FILE),
            r#"{ "cache_dir": "snapshots", "fail_threshold": 0.5 }"#,
        )
        .unwrap();

        let s = Settings::load_or_default(tmp.path());
        assert_eq!(s.cache_dir, PathBuf::from("snapshots"));
        assert_eq!(s.fail_threshold, 0.5);
        assert_eq!(s.min_subjects_for_eligibility, 4);
        assert_eq!(s.source_pattern, "*-ketquathi-ct*");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join(SETTINGS_FILE), "{ not json").unwrap();
        assert_eq!(Settings::load_or_default(tmp.path()), Settings::default());
    }
}
