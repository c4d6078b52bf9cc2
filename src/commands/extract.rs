use crate::export::{format_table, save, OutputFormat};
use crate::scan::{ScanEvent, ScanManager, ScanReport};
use crate::utils::output_path;
use anyhow::{Context, Result};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_NAME: &str = "fits_info.csv";

pub struct ExtractOptions {
    pub directory: PathBuf,
    /// Output file name, relative to `directory` unless absolute
    pub output: String,
    pub format: OutputFormat,
    /// Also print the result table to stdout
    pub print: bool,
}

/// What an extraction run produced.
#[derive(Debug)]
pub struct ExtractSummary {
    pub report: ScanReport,
    /// Where the results were saved; `None` when there was nothing to save.
    pub output: Option<PathBuf>,
}

/// Scan a directory on a worker thread, show progress and failures as they
/// arrive, then save the collected records.
pub fn extract(options: &ExtractOptions) -> Result<ExtractSummary> {
    let directory = &options.directory;
    let output_name = options.output.trim();
    if output_name.is_empty() {
        anyhow::bail!("Please enter an output filename");
    }

    let mut manager = ScanManager::new();
    manager.start_scan(directory.clone())?;

    let mut progress = ProgressLine::new();
    let report = manager
        .wait(|event| match event {
            ScanEvent::Started { total } => {
                tracing::info!("Processing {} FITS files in {}", total, directory.display());
            }
            ScanEvent::Progress { percent, .. } => progress.update(*percent),
            ScanEvent::FileFailed(failure) => {
                progress.clear();
                eprintln!("{}", failure);
            }
            _ => {}
        })
        .with_context(|| format!("Failed to scan {}", directory.display()))?;
    progress.finish();

    if report.records.is_empty() {
        if report.total == 0 {
            eprintln!("No FITS files found!");
        } else {
            eprintln!(
                "No FITS headers could be read ({} files failed)",
                report.failures.len()
            );
        }
        return Ok(ExtractSummary {
            report,
            output: None,
        });
    }

    if options.print {
        print!("{}", format_table(&report.records));
    }

    let path = output_path(directory, output_name, options.format.extension());
    save(&report.records, &path, options.format)
        .with_context(|| format!("Error saving file: {}", path.display()))?;

    eprintln!("\nInformation saved to {}", path.display());
    if !report.failures.is_empty() {
        eprintln!("{} files could not be read", report.failures.len());
    }

    Ok(ExtractSummary {
        report,
        output: Some(path),
    })
}

/// Single-line percentage display on stderr, only when stderr is a terminal.
struct ProgressLine {
    enabled: bool,
    last: Option<u8>,
}

impl ProgressLine {
    fn new() -> Self {
        Self {
            enabled: std::io::stderr().is_terminal(),
            last: None,
        }
    }

    fn update(&mut self, percent: u8) {
        if !self.enabled || self.last == Some(percent) {
            return;
        }
        self.last = Some(percent);
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\rProgress: {:>3}%", percent);
        let _ = stderr.flush();
    }

    fn clear(&mut self) {
        if self.enabled && self.last.is_some() {
            let _ = write!(std::io::stderr(), "\r{:<16}\r", "");
        }
    }

    fn finish(&mut self) {
        if self.enabled && self.last.is_some() {
            eprintln!();
        }
    }
}

/// Default output name for a format when none was given.
pub fn default_output_name(format: OutputFormat) -> String {
    let stem = Path::new(DEFAULT_OUTPUT_NAME)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "fits_info".to_string());
    format!("{}.{}", stem, format.extension())
}
