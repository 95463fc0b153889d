//! Cover Scanner CLI
//!
//! Reports embedded album art that is missing, too small, too large,
//! not square or above a file size budget.

use clap::Parser;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use cover_scanner::{run_scan, ScanOptions, SizeMeasure, UNCAUGHT_EXIT_CODE};

const ABOUT: &str = r#"
Cover Scanner - find album art problems in a music library

Examples:
  cover_scanner -i /music -t 300x300                 covers below 300x300
  cover_scanner -i /music -t 300x300 -m 1200x1200    covers outside 300x300..1200x1200
  cover_scanner -i /music -s 500 --ratio             covers above 500 kB or not square
  cover_scanner -i /music -t 500x500 -p bad.m3u      write offending tracks to a playlist
  cover_scanner -i /music -t 500x500 -l scan.log     write the report to a log file
  cover_scanner -c options.json                      read options from a JSON file
"#;

/// Album art scanner
#[derive(Parser)]
#[command(name = "cover_scanner")]
#[command(author, version, about = ABOUT, long_about = None)]
#[command(help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
")]
struct Cli {
    /// File or directory to analyze
    #[arg(short = 'i', long, required_unless_present = "config")]
    input: Option<PathBuf>,

    /// Minimum cover resolution, e.g. 300x300
    #[arg(short = 't', long)]
    threshold: Option<String>,

    /// Maximum cover resolution, e.g. 1200x1200
    #[arg(short = 'm', long)]
    max_threshold: Option<String>,

    /// Maximum cover size in kB
    #[arg(short = 's', long)]
    size: Option<f64>,

    /// Require a 1:1 cover ratio
    #[arg(short = 'r', long)]
    ratio: bool,

    /// Write the report to this file instead of the console
    #[arg(short = 'l', long)]
    logfile: Option<PathBuf>,

    /// Append tracks with violations to this playlist
    #[arg(short = 'p', long)]
    playlist: Option<PathBuf>,

    /// Music file extension to scan, can be repeated (default: mp3)
    #[arg(short = 'e', long = "ext")]
    extensions: Vec<String>,

    /// Measure the embedded picture bytes instead of the re-encoded bitmap
    #[arg(long)]
    measure_embedded: bool,

    /// Read options from a JSON file
    ///
    /// Command line values take precedence. Switches set in the file
    /// (`ratio`, `size_measure: "embedded"`) stay on, the command line
    /// can only turn them on.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Print the scan outcome as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn options(&self) -> ScanOptions {
        ScanOptions {
            input: self.input.clone(),
            threshold: self.threshold.clone(),
            max_threshold: self.max_threshold.clone(),
            size: self.size,
            ratio: self.ratio,
            logfile: self.logfile.clone(),
            playlist: self.playlist.clone(),
            extensions: self.extensions.clone(),
            size_measure: if self.measure_embedded {
                SizeMeasure::Embedded
            } else {
                SizeMeasure::Reencoded
            },
        }
    }
}

fn install_panic_trap() {
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Unexpected failure: {panic_info}");
        eprintln!("{panic_info}");
        eprintln!("Can not continue, quitting.");
        std::process::exit(UNCAUGHT_EXIT_CODE);
    }));
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    install_panic_trap();

    let cli = Cli::parse();

    let options = match &cli.config {
        Some(path) => match ScanOptions::from_json_file(path) {
            Ok(loaded) => loaded.merge(cli.options()),
            Err(err) => {
                println!("Error: {err}");
                println!("Finished with errors!");
                std::process::exit(1);
            }
        },
        None => cli.options(),
    };
    info!("Options: {:?}", options);

    let outcome = run_scan(&options);

    if cli.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("Could not serialize outcome: {err}"),
        }
    }

    if !outcome.success {
        std::process::exit(1);
    }
}
