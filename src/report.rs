//! Reporting of scan output
//!
//! The scanner writes all user-facing text through a [`Reporter`]. The
//! [`StreamReporter`] sends it to the console, or to an append-only log file
//! while progress keeps going to the console.

use std::cell::{Cell, RefCell};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::error::ConfigError;
use crate::models::ScanProgress;

/// Sink for progress and result lines
pub trait Reporter {
    /// Write one line of text
    fn write_line(&self, text: &str);

    /// Show that `current` of `total` files are finished
    fn write_progress(&self, current: u64, total: u64);

    /// Write a warning line
    fn warn(&self, text: &str) {
        self.write_line(&format!("(Warning) {text}"));
    }

    /// Terminate any pending progress output
    fn finish(&self) {}
}

/// Format a progress line, without carriage return
pub fn progress_line(current: u64, total: u64) -> String {
    let progress = ScanProgress {
        total_files: total,
        processed_files: current.min(total),
    };
    format!("{current} of {total} ({:.2}%) finished.", progress.percent())
}

/// Reporter writing to the console and optionally a log file
pub struct StreamReporter {
    /// Progress target, and line target when no log is set
    console: RefCell<Box<dyn Write>>,
    /// Line target when logging to a file
    log: Option<RefCell<Box<dyn Write>>>,
    /// Length of the progress line currently shown on the console
    pending_progress: Cell<usize>,
}

impl StreamReporter {
    /// Create a reporter from explicit writers
    pub fn new(console: Box<dyn Write>, log: Option<Box<dyn Write>>) -> Self {
        Self {
            console: RefCell::new(console),
            log: log.map(RefCell::new),
            pending_progress: Cell::new(0),
        }
    }

    /// Reporter writing everything to stdout
    pub fn console() -> Self {
        Self::new(Box::new(io::stdout()), None)
    }

    /// Reporter appending lines to `path` and showing progress on stdout
    ///
    /// The log file's directory must already exist.
    pub fn with_logfile(path: &Path) -> Result<Self, ConfigError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| {
                log::error!("Could not create logfile {}: {err}", path.display());
                ConfigError::InvalidLogfile(path.to_path_buf())
            })?;
        let reporter = Self::new(Box::new(io::stdout()), Some(Box::new(file)));
        reporter.write_line(&format!(
            "==== Scan started {} ====",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        Ok(reporter)
    }

    /// Whether lines are written to a log file
    pub fn is_logging_to_file(&self) -> bool {
        self.log.is_some()
    }

    fn clear_progress(&self, console: &mut dyn Write) {
        let width = self.pending_progress.replace(0);
        if width > 0 {
            write!(console, "\r{}\r", " ".repeat(width)).ok();
        }
    }
}

impl Reporter for StreamReporter {
    fn write_line(&self, text: &str) {
        match &self.log {
            Some(log) => {
                let mut log = log.borrow_mut();
                writeln!(log, "{text}").ok();
                log.flush().ok();
            }
            None => {
                let mut console = self.console.borrow_mut();
                self.clear_progress(&mut **console);
                writeln!(console, "{text}").ok();
                console.flush().ok();
            }
        }
    }

    fn write_progress(&self, current: u64, total: u64) {
        let line = progress_line(current, total);
        let mut console = self.console.borrow_mut();
        self.clear_progress(&mut **console);
        write!(console, "\r{line}").ok();
        console.flush().ok();
        self.pending_progress.set(line.len());
    }

    fn finish(&self) {
        if self.pending_progress.replace(0) > 0 {
            let mut console = self.console.borrow_mut();
            writeln!(console).ok();
            console.flush().ok();
        }
    }
}
