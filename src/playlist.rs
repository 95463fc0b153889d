//! Playlist of tracks with cover violations

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Receives the paths of tracks that failed a check
pub trait PlaylistSink {
    /// Append one track path
    fn append(&mut self, track: &Path) -> io::Result<()>;
}

/// Flat M3U playlist, one UTF-8 path per line
///
/// Every entry is appended and flushed on its own.
#[derive(Debug)]
pub struct M3uPlaylist {
    path: PathBuf,
    file: File,
    needs_separator: bool,
}

impl M3uPlaylist {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidPlaylist {
            path: path.to_path_buf(),
            reason,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| invalid(err.to_string()))?;
        let len = file.metadata().map_err(|err| invalid(err.to_string()))?.len();
        Ok(Self {
            path: path.to_path_buf(),
            file,
            needs_separator: len > 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlaylistSink for M3uPlaylist {
    fn append(&mut self, track: &Path) -> io::Result<()> {
        let entry = track.to_string_lossy();
        if self.needs_separator {
            write!(self.file, "\n{entry}")?;
        } else {
            write!(self.file, "{entry}")?;
        }
        self.file.flush()?;
        self.needs_separator = true;
        Ok(())
    }
}

impl PlaylistSink for Vec<PathBuf> {
    fn append(&mut self, track: &Path) -> io::Result<()> {
        self.push(track.to_path_buf());
        Ok(())
    }
}
