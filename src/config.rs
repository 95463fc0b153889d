//! Configuration for the cover scanner
//!
//! [`ScanOptions`] carries the raw, unvalidated settings as they come from
//! the command line or an options file. [`ScanConfig::from_options`] turns
//! them into an immutable, validated [`ScanConfig`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

/// Music file extension scanned when none is configured
pub const DEFAULT_EXTENSION: &str = "mp3";

/// Width and height of a cover in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either side is below the corresponding side of `min`
    pub fn is_below(&self, min: &Resolution) -> bool {
        self.width < min.width || self.height < min.height
    }

    /// True if either side exceeds the corresponding side of `max`
    pub fn is_above(&self, max: &Resolution) -> bool {
        self.width > max.width || self.height > max.height
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ConfigError;

    /// Parses exactly two unsigned integers separated by a literal `x`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidResolution(s.to_string());
        let mut parts = s.split('x');
        let (Some(width), Some(height), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        Ok(Self {
            width: parse_dimension(width).ok_or_else(invalid)?,
            height: parse_dimension(height).ok_or_else(invalid)?,
        })
    }
}

fn parse_dimension(part: &str) -> Option<u32> {
    // u32::from_str accepts a leading '+'
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// How the byte size of a cover is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMeasure {
    /// Decode the cover and measure it re-encoded as an uncompressed bitmap
    #[default]
    Reencoded,
    /// Measure the picture bytes exactly as embedded in the tag
    Embedded,
}

impl SizeMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeMeasure::Reencoded => "reencoded",
            SizeMeasure::Embedded => "embedded",
        }
    }
}

/// Raw scan settings, as produced by the CLI or loaded from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// File or directory to analyze
    pub input: Option<PathBuf>,
    /// Minimum resolution, `WIDTHxHEIGHT`
    pub threshold: Option<String>,
    /// Maximum resolution, `WIDTHxHEIGHT`
    pub max_threshold: Option<String>,
    /// Maximum cover size in kB
    pub size: Option<f64>,
    /// Require square covers
    pub ratio: bool,
    /// Mirror textual output into this file
    pub logfile: Option<PathBuf>,
    /// Append violating tracks to this playlist
    pub playlist: Option<PathBuf>,
    /// Music file extensions to scan, without dot
    pub extensions: Vec<String>,
    /// Cover size measurement convention
    pub size_measure: SizeMeasure,
}

impl ScanOptions {
    /// Load options from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let options_error = |reason: String| ConfigError::OptionsFile {
            path: path.to_path_buf(),
            reason,
        };
        let json = std::fs::read_to_string(path).map_err(|e| options_error(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| options_error(e.to_string()))
    }

    /// Overlay every value set in `other` on top of these options
    ///
    /// `ratio` and a non-default `size_measure` can only be switched on by
    /// `other`, never back off.
    pub fn merge(mut self, other: ScanOptions) -> Self {
        if other.input.is_some() {
            self.input = other.input;
        }
        if other.threshold.is_some() {
            self.threshold = other.threshold;
        }
        if other.max_threshold.is_some() {
            self.max_threshold = other.max_threshold;
        }
        if other.size.is_some() {
            self.size = other.size;
        }
        self.ratio |= other.ratio;
        if other.logfile.is_some() {
            self.logfile = other.logfile;
        }
        if other.playlist.is_some() {
            self.playlist = other.playlist;
        }
        if !other.extensions.is_empty() {
            self.extensions = other.extensions;
        }
        if other.size_measure != SizeMeasure::default() {
            self.size_measure = other.size_measure;
        }
        self
    }
}

/// Validated, immutable scan configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File or directory to analyze, known to exist at validation time
    pub target_path: PathBuf,
    pub min_resolution: Option<Resolution>,
    pub max_resolution: Option<Resolution>,
    pub require_square_ratio: bool,
    /// Covers above this size (kB) are flagged
    pub max_file_size_kb: Option<f64>,
    pub log_destination: Option<PathBuf>,
    pub playlist_path: Option<PathBuf>,
    /// Lowercase extensions without dot
    pub extensions: BTreeSet<String>,
    pub size_measure: SizeMeasure,
}

impl ScanConfig {
    /// Validate raw options into a configuration
    ///
    /// Checks run in this order: log file target, input path, threshold,
    /// maximum threshold, size limit, playlist target. At least one of the
    /// threshold and the size limit must be present.
    pub fn from_options(options: &ScanOptions) -> Result<Self, ConfigError> {
        if let Some(logfile) = &options.logfile {
            if !is_creatable_file(logfile) {
                return Err(ConfigError::InvalidLogfile(logfile.clone()));
            }
        }

        let target_path = options.input.clone().ok_or(ConfigError::MissingTarget)?;
        if !target_path.is_file() && !target_path.is_dir() {
            return Err(ConfigError::InvalidTargetPath(target_path));
        }

        let min_resolution = options
            .threshold
            .as_deref()
            .map(str::parse::<Resolution>)
            .transpose()?;
        let max_resolution = options
            .max_threshold
            .as_deref()
            .map(str::parse::<Resolution>)
            .transpose()?;

        if let Some(size) = options.size {
            if !size.is_finite() || size < 0.0 {
                return Err(ConfigError::InvalidSize(size));
            }
        }

        if let Some(playlist) = &options.playlist {
            if !is_creatable_file(playlist) {
                return Err(ConfigError::InvalidPlaylist {
                    path: playlist.clone(),
                    reason: "directory does not exist".to_string(),
                });
            }
        }

        if min_resolution.is_none() && options.size.is_none() {
            return Err(ConfigError::NoActiveCheck);
        }

        let extensions = if options.extensions.is_empty() {
            BTreeSet::from([DEFAULT_EXTENSION.to_string()])
        } else {
            options
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect()
        };

        Ok(Self {
            target_path,
            min_resolution,
            max_resolution,
            require_square_ratio: options.ratio,
            max_file_size_kb: options.size,
            log_destination: options.logfile.clone(),
            playlist_path: options.playlist.clone(),
            extensions,
            size_measure: options.size_measure,
        })
    }

    /// Check if a file extension is one of the scanned music extensions
    pub fn should_include_extension(&self, ext: &str) -> bool {
        self.extensions.contains(&ext.to_lowercase())
    }

    /// Human-readable lines announcing the active settings
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.target_path.is_dir() {
            lines.push(format!("Analyzing file(s) in {}", self.target_path.display()));
        } else {
            lines.push(format!("Analyzing file {}", self.target_path.display()));
        }
        if let Some(min) = &self.min_resolution {
            lines.push(format!("Threshold enabled, selected value: {min}"));
        }
        if self.require_square_ratio {
            lines.push("Checking for 1:1 ratio is enabled.".to_string());
        }
        if let Some(size) = self.max_file_size_kb {
            lines.push(format!(
                "File size threshold enabled, reporting files above {size} kB ({} size)",
                self.size_measure.as_str()
            ));
        }
        if let Some(max) = &self.max_resolution {
            lines.push(format!("Maximum threshold enabled, selected value: {max}"));
        }
        lines
    }
}

/// A file path is creatable if it is not a directory and its parent directory exists
fn is_creatable_file(path: &Path) -> bool {
    if path.as_os_str().is_empty() || path.is_dir() {
        return false;
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
        // Bare file name, relative to the current directory
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn options_for(dir: &Path) -> ScanOptions {
        ScanOptions {
            input: Some(dir.to_path_buf()),
            threshold: Some("300x300".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!("300x300".parse::<Resolution>().unwrap(), Resolution::new(300, 300));
        assert_eq!("0x1200".parse::<Resolution>().unwrap(), Resolution::new(0, 1200));
    }

    #[test]
    fn test_parse_resolution_rejects_malformed() {
        for input in [
            "", "300", "300x", "x300", "300x300x300", "300X300", "-1x300", "+1x300", " 300x300",
            "300 x 300", "3e2x300", "99999999999x1",
        ] {
            assert!(
                matches!(input.parse::<Resolution>(), Err(ConfigError::InvalidResolution(_))),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_resolution_comparisons() {
        let cover = Resolution::new(500, 400);
        assert!(cover.is_below(&Resolution::new(300, 500)));
        assert!(!cover.is_below(&Resolution::new(500, 400)));
        assert!(cover.is_above(&Resolution::new(499, 1000)));
        assert!(!cover.is_above(&Resolution::new(500, 400)));
        assert!(!cover.is_square());
    }

    #[test]
    fn test_from_options_valid() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options_for(dir.path());
        options.max_threshold = Some("1000x1000".to_string());
        options.ratio = true;

        let config = ScanConfig::from_options(&options).unwrap();
        assert_eq!(config.min_resolution, Some(Resolution::new(300, 300)));
        assert_eq!(config.max_resolution, Some(Resolution::new(1000, 1000)));
        assert!(config.require_square_ratio);
        assert!(config.should_include_extension("MP3"));
        assert!(!config.should_include_extension("flac"));
    }

    #[test]
    fn test_from_options_requires_an_active_check() {
        let dir = tempfile::tempdir().unwrap();
        let options = ScanOptions {
            input: Some(dir.path().to_path_buf()),
            ratio: true,
            max_threshold: Some("1000x1000".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ScanConfig::from_options(&options),
            Err(ConfigError::NoActiveCheck)
        ));

        let size_only = ScanOptions {
            input: Some(dir.path().to_path_buf()),
            size: Some(500.0),
            ..Default::default()
        };
        assert!(ScanConfig::from_options(&size_only).is_ok());
    }

    #[test]
    fn test_from_options_invalid_target() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_for(&dir.path().join("missing"));
        assert!(matches!(
            ScanConfig::from_options(&options),
            Err(ConfigError::InvalidTargetPath(_))
        ));

        let no_input = ScanOptions {
            threshold: Some("300x300".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ScanConfig::from_options(&no_input),
            Err(ConfigError::MissingTarget)
        ));
    }

    #[test]
    fn test_from_options_invalid_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options_for(dir.path());
        options.max_threshold = Some("big".to_string());
        assert!(matches!(
            ScanConfig::from_options(&options),
            Err(ConfigError::InvalidResolution(s)) if s == "big"
        ));
    }

    #[test]
    fn test_from_options_invalid_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options_for(dir.path());
        options.size = Some(-1.0);
        assert!(matches!(
            ScanConfig::from_options(&options),
            Err(ConfigError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_from_options_output_targets_need_existing_directory() {
        let dir = tempfile::tempdir().unwrap();

        let mut options = options_for(dir.path());
        options.logfile = Some(dir.path().join("nope").join("scan.log"));
        assert!(matches!(
            ScanConfig::from_options(&options),
            Err(ConfigError::InvalidLogfile(_))
        ));

        let mut options = options_for(dir.path());
        options.playlist = Some(dir.path().join("nope").join("bad.m3u"));
        assert!(matches!(
            ScanConfig::from_options(&options),
            Err(ConfigError::InvalidPlaylist { .. })
        ));

        let mut options = options_for(dir.path());
        options.playlist = Some(dir.path().to_path_buf());
        assert!(ScanConfig::from_options(&options).is_err());

        let mut options = options_for(dir.path());
        options.logfile = Some(dir.path().join("scan.log"));
        options.playlist = Some(dir.path().join("bad.m3u"));
        assert!(ScanConfig::from_options(&options).is_ok());
    }

    #[test]
    fn test_custom_extensions_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options_for(dir.path());
        options.extensions = vec![".FLAC".to_string(), "mp3".to_string()];
        let config = ScanConfig::from_options(&options).unwrap();
        assert!(config.should_include_extension("flac"));
        assert!(config.should_include_extension("Mp3"));
        assert_eq!(config.extensions.len(), 2);
    }

    #[test]
    fn test_describe_lists_active_checks() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options_for(dir.path());
        options.ratio = true;
        options.size = Some(500.0);
        let lines = ScanConfig::from_options(&options).unwrap().describe();
        assert!(lines[0].starts_with("Analyzing file(s) in"));
        assert!(lines.contains(&"Threshold enabled, selected value: 300x300".to_string()));
        assert!(lines.contains(&"Checking for 1:1 ratio is enabled.".to_string()));
        assert!(lines.iter().any(|l| l.contains("reporting files above 500 kB")));
    }

    #[test]
    fn test_options_from_json_file_and_merge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(
            &path,
            r#"{"threshold": "500x500", "size": 250.0, "size_measure": "embedded"}"#,
        )
        .unwrap();

        let loaded = ScanOptions::from_json_file(&path).unwrap();
        assert_eq!(loaded.threshold.as_deref(), Some("500x500"));
        assert_eq!(loaded.size_measure, SizeMeasure::Embedded);

        let cli = ScanOptions {
            input: Some(dir.path().to_path_buf()),
            threshold: Some("300x300".to_string()),
            ..Default::default()
        };
        let merged = loaded.merge(cli);
        assert_eq!(merged.threshold.as_deref(), Some("300x300"));
        assert_eq!(merged.size, Some(250.0));
        assert_eq!(merged.size_measure, SizeMeasure::Embedded);
        assert_eq!(merged.input.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_merge_keeps_switches_from_file() {
        let from_file = ScanOptions {
            ratio: true,
            size_measure: SizeMeasure::Embedded,
            ..Default::default()
        };
        let merged = from_file.merge(ScanOptions::default());
        assert!(merged.ratio);
        assert_eq!(merged.size_measure, SizeMeasure::Embedded);

        let merged = ScanOptions::default().merge(ScanOptions {
            ratio: true,
            ..Default::default()
        });
        assert!(merged.ratio);
        assert_eq!(merged.size_measure, SizeMeasure::Reencoded);
    }

    #[test]
    fn test_options_from_bad_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ScanOptions::from_json_file(&path),
            Err(ConfigError::OptionsFile { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_resolution_display_parses_back(width in any::<u32>(), height in any::<u32>()) {
            let resolution = Resolution::new(width, height);
            prop_assert_eq!(resolution.to_string().parse::<Resolution>().unwrap(), resolution);
        }

        #[test]
        fn prop_resolution_rejects_non_digit_components(s in "[0-9]{1,4}[^0-9x]x[0-9]{1,4}") {
            prop_assert!(s.parse::<Resolution>().is_err());
        }
    }
}
