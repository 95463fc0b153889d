//! Album art scanner for music libraries
//!
//! This library walks a music library, reads the embedded cover of every
//! track and reports covers that are missing, too small, too large, not
//! square or above a file size budget.

pub mod config;
pub mod criteria;
pub mod error;
pub mod extractor;
pub mod models;
pub mod playlist;
pub mod report;
pub mod scanner;
pub mod walker;

pub use config::{Resolution, ScanConfig, ScanOptions, SizeMeasure};
pub use criteria::{evaluate, Criteria};
pub use error::{ConfigError, ScanError, TagError};
pub use extractor::{CoverExtractor, LoftyCoverExtractor};
pub use models::{CoverInfo, ScanOutcome, ScanProgress, TrackResult};
pub use playlist::{M3uPlaylist, PlaylistSink};
pub use report::{Reporter, StreamReporter};
pub use scanner::{execute, run_scan, scan, UNCAUGHT_EXIT_CODE};
pub use walker::DirectoryWalker;
