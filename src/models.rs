//! Core data models for the cover scanner

use serde::Serialize;
use std::path::PathBuf;

use crate::config::Resolution;

/// Bytes per kibibyte
pub const BYTES_PER_KB: f64 = 1024.0;

/// Embedded cover of a track, decoded and measured
#[derive(Debug, Clone, PartialEq)]
pub struct CoverInfo {
    /// Picture bytes exactly as embedded in the tag
    pub raw_bytes: Vec<u8>,
    /// Decoded pixel width
    pub width: u32,
    /// Decoded pixel height
    pub height: u32,
    /// Byte length according to the configured size measure
    pub measured_bytes: u64,
}

impl CoverInfo {
    /// Create a cover measured by its embedded byte length
    pub fn new(raw_bytes: Vec<u8>, width: u32, height: u32) -> Self {
        let measured_bytes = raw_bytes.len() as u64;
        Self {
            raw_bytes,
            width,
            height,
            measured_bytes,
        }
    }

    /// Override the measured byte length
    pub fn with_measured_bytes(mut self, measured_bytes: u64) -> Self {
        self.measured_bytes = measured_bytes;
        self
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Measured size in kibibytes
    pub fn size_kb(&self) -> f64 {
        self.measured_bytes as f64 / BYTES_PER_KB
    }
}

/// Classification of one scanned track
///
/// Lives only while the track is being reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackResult {
    pub path: PathBuf,
    pub cover_found: bool,
    pub cover_dimensions: Option<Resolution>,
    pub cover_size_kb: Option<f64>,
    pub violations: Vec<String>,
}

impl TrackResult {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// Record the measurements of a found cover
    pub fn with_cover(mut self, cover: &CoverInfo) -> Self {
        self.cover_found = true;
        self.cover_dimensions = Some(cover.resolution());
        self.cover_size_kb = Some(cover.size_kb());
        self
    }

    pub fn with_violations(mut self, violations: Vec<String>) -> Self {
        self.violations = violations;
        self
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Violations joined into one report line
    pub fn violation_text(&self) -> String {
        self.violations.join(" ")
    }
}

/// File counters owned by the scan orchestrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanProgress {
    /// Files found by the pre-count pass
    pub total_files: u64,
    /// Files fully processed so far
    pub processed_files: u64,
}

impl ScanProgress {
    pub fn new(total_files: u64) -> Self {
        Self {
            total_files,
            processed_files: 0,
        }
    }

    /// Count one more finished file, never exceeding the total
    pub fn advance(&mut self) {
        if self.processed_files < self.total_files {
            self.processed_files += 1;
        }
    }

    /// Finished share in percent, within `[0, 100]`
    pub fn percent(&self) -> f64 {
        if self.total_files == 0 {
            return 100.0;
        }
        self.processed_files as f64 / self.total_files as f64 * 100.0
    }
}

/// Result of a scan run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    /// False only if the scan could not run at all
    pub success: bool,
    pub total_files: u64,
    pub processed_files: u64,
    /// Tracks reported with at least one violation
    pub flagged_files: u64,
    /// Tracks whose tags or cover could not be read
    pub unreadable_files: u64,
}

impl ScanOutcome {
    /// Outcome of a scan that was rejected before touching any file
    pub fn failed() -> Self {
        Self::default()
    }
}
