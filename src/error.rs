//! Error types for the cover scanner

use std::path::PathBuf;
use thiserror::Error;

/// Errors that reject a configuration before any file is touched
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No input file or directory was given
    #[error("No input file or directory given")]
    MissingTarget,

    /// Target is neither an existing file nor an existing directory
    #[error("Invalid target path: {}", .0.display())]
    InvalidTargetPath(PathBuf),

    /// Resolution string is not `<width>x<height>`
    #[error("Can not parse resolution {0}, must be in format e.g.: 300x300")]
    InvalidResolution(String),

    /// Size limit is negative or not a number
    #[error("Invalid file size limit: {0} (must be a non-negative number of kB)")]
    InvalidSize(f64),

    /// Neither a minimum resolution nor a size limit was given
    #[error("No check enabled, specify a threshold and/or a maximum file size")]
    NoActiveCheck,

    /// Log file can not be created or its directory does not exist
    #[error("Invalid logfile path: {}", .0.display())]
    InvalidLogfile(PathBuf),

    /// Playlist can not be created or its directory does not exist
    #[error("Invalid playlist path: {} ({reason})", .path.display())]
    InvalidPlaylist {
        /// Configured playlist path
        path: PathBuf,
        /// Why the playlist could not be opened
        reason: String,
    },

    /// Options file could not be read or parsed
    #[error("Can not load options from {}: {reason}", .path.display())]
    OptionsFile {
        /// Path of the options file
        path: PathBuf,
        /// Underlying I/O or JSON error
        reason: String,
    },
}

/// Errors while reading the embedded cover of a single track
#[derive(Debug, Error)]
pub enum TagError {
    /// Tag data could not be parsed
    #[error(transparent)]
    Tag(#[from] lofty::error::LoftyError),

    /// Embedded picture could not be decoded or re-encoded
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// I/O error while reading the track
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors that stop a scan as a whole
#[derive(Debug, Error)]
pub enum ScanError {
    /// Configuration was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Target disappeared between validation and scanning
    #[error("Target vanished before scanning: {}", .0.display())]
    TargetVanished(PathBuf),
}

impl ScanError {
    /// Whether this error was raised by configuration validation
    pub fn is_config(&self) -> bool {
        matches!(self, ScanError::Config(_))
    }
}
