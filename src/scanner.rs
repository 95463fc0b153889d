//! Scanner module - drives the walk, cover extraction and evaluation
//!
//! Files are processed one at a time in walk order. Progress is reported
//! after every file against a total counted before the walk starts.

use std::path::Path;

use crate::config::{ScanConfig, ScanOptions};
use crate::criteria::{evaluate, Criteria};
use crate::error::ScanError;
use crate::extractor::{CoverExtractor, LoftyCoverExtractor};
use crate::models::{ScanOutcome, ScanProgress, TrackResult};
use crate::playlist::{M3uPlaylist, PlaylistSink};
use crate::report::{Reporter, StreamReporter};
use crate::walker::DirectoryWalker;

/// Exit status of a run that ended because of a panic
pub const UNCAUGHT_EXIT_CODE: i32 = 5;

/// Scan the configured target
///
/// Per-directory and per-file failures are reported and skipped. Only a
/// target that disappeared since validation makes the scan fail.
pub fn scan<'a>(
    config: &ScanConfig,
    extractor: &'a dyn CoverExtractor,
    reporter: &'a dyn Reporter,
    playlist: Option<&'a mut dyn PlaylistSink>,
) -> Result<ScanOutcome, ScanError> {
    let mut run = ScanRun {
        criteria: Criteria::from(config),
        extractor,
        reporter,
        playlist,
        progress: ScanProgress::default(),
        outcome: ScanOutcome::default(),
    };

    let target = config.target_path.as_path();
    if target.is_file() {
        run.progress = ScanProgress::new(1);
        run.process_file(target);
    } else if target.is_dir() {
        let walker = DirectoryWalker::new(&config.extensions, reporter);
        run.progress = ScanProgress::new(walker.count_files(target));
        log::info!(
            "Found {} music files in {}",
            run.progress.total_files,
            target.display()
        );
        for dir in walker.accessible_directories(target) {
            for file in walker.enumerate_files(&dir) {
                run.process_file(&file);
            }
        }
    } else {
        return Err(ScanError::TargetVanished(target.to_path_buf()));
    }

    run.outcome.success = true;
    run.outcome.total_files = run.progress.total_files;
    run.outcome.processed_files = run.progress.processed_files;
    Ok(run.outcome)
}

/// State of one scan
struct ScanRun<'a> {
    criteria: Criteria,
    extractor: &'a dyn CoverExtractor,
    reporter: &'a dyn Reporter,
    playlist: Option<&'a mut dyn PlaylistSink>,
    progress: ScanProgress,
    outcome: ScanOutcome,
}

impl ScanRun<'_> {
    fn process_file(&mut self, path: &Path) {
        self.classify(path);
        self.progress.advance();
        self.reporter
            .write_progress(self.progress.processed_files, self.progress.total_files);
    }

    fn classify(&mut self, path: &Path) {
        let track = match self.extractor.read_cover(path) {
            Ok(cover) => {
                let violations = evaluate(cover.as_ref(), &self.criteria);
                let track = TrackResult::new(path.to_path_buf()).with_violations(violations);
                match &cover {
                    Some(cover) => track.with_cover(cover),
                    None => track,
                }
            }
            Err(err) => {
                log::debug!("Reading tags of {} failed: {err:?}", path.display());
                self.outcome.unreadable_files += 1;
                self.reporter.write_line(&format!(
                    "{}: Unable to read file tags, tags might be corrupt: {err}",
                    path.display()
                ));
                return;
            }
        };

        if !track.has_violations() {
            return;
        }
        self.outcome.flagged_files += 1;
        self.reporter.write_line(&format!(
            "{}: {}",
            track.path.display(),
            track.violation_text()
        ));
        if let Some(playlist) = self.playlist.as_deref_mut() {
            if let Err(err) = playlist.append(&track.path) {
                self.reporter.warn(&format!(
                    "Could not add {} to playlist: {err}",
                    track.path.display()
                ));
            }
        }
    }
}

/// Validate `options` and scan, reporting any error instead of returning it
pub fn execute(
    options: &ScanOptions,
    extractor: &dyn CoverExtractor,
    reporter: &dyn Reporter,
) -> ScanOutcome {
    let result = ScanConfig::from_options(options)
        .map_err(ScanError::from)
        .and_then(|config| {
            for line in config.describe() {
                reporter.write_line(&line);
            }
            let mut playlist = config
                .playlist_path
                .as_deref()
                .map(M3uPlaylist::open)
                .transpose()?;
            if let Some(playlist) = &playlist {
                reporter.write_line(&format!(
                    "Playlist enabled, writing to {}",
                    playlist.path().display()
                ));
            }
            scan(
                &config,
                extractor,
                reporter,
                playlist.as_mut().map(|p| p as &mut dyn PlaylistSink),
            )
        });

    match result {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("Scan aborted: {err}");
            reporter.write_line(&format!("Error: {err}"));
            ScanOutcome::failed()
        }
    }
}

/// Run a scan with console or log file output and the lofty extractor
///
/// Never fails; the returned outcome tells whether the scan could run.
pub fn run_scan(options: &ScanOptions) -> ScanOutcome {
    let reporter = match options.logfile.as_deref() {
        Some(logfile) => match StreamReporter::with_logfile(logfile) {
            Ok(reporter) => {
                reporter.write_line(&format!(
                    "Logging enabled, writing log to: {}",
                    logfile.display()
                ));
                reporter
            }
            Err(err) => {
                let console = StreamReporter::console();
                console.write_line(&format!("Error: {err}"));
                console.write_line("Finished with errors!");
                return ScanOutcome::failed();
            }
        },
        None => StreamReporter::console(),
    };

    let extractor = LoftyCoverExtractor::new(options.size_measure);
    let outcome = execute(options, &extractor, &reporter);
    reporter.finish();
    reporter.write_line(if outcome.success {
        "Finished!"
    } else {
        "Finished with errors!"
    });
    outcome
}
