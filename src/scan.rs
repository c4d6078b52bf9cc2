//! Directory scan pipeline.
//!
//! `scan` walks a directory tree, reads the primary header of every FITS file
//! and resolves one [`MetadataRecord`] per readable file. Files that cannot be
//! read are reported through the notification callback and skipped.
//!
//! `ScanManager` runs one scan on a worker thread and forwards notifications
//! over an mpsc channel in visit order, ending with exactly one terminal event.

use crate::error::{HeaderError, ScanError};
use crate::fits::{is_fits_file, read_primary_header};
use crate::resolver::{resolve, MetadataRecord};
use std::fmt;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// A file that matched a FITS extension but whose header could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file_name: String,
    pub path: PathBuf,
    pub error: String,
}

impl FileFailure {
    fn new(path: &Path, error: &HeaderError) -> Self {
        Self {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            path: path.to_path_buf(),
            error: error.to_string(),
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error processing {}: {}", self.file_name, self.error)
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// One record per readable file, in traversal order.
    pub records: Vec<MetadataRecord>,
    pub failures: Vec<FileFailure>,
    /// Number of FITS files found before processing started.
    pub total: usize,
    /// Set when the scan stopped early; `records` holds what was read so far.
    pub cancelled: bool,
}

impl ScanReport {
    pub fn processed(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Notifications emitted while a scan runs.
#[derive(Debug)]
pub enum ScanEvent {
    /// File discovery finished.
    Started { total: usize },
    /// One file was processed, successfully or not.
    Progress {
        processed: usize,
        total: usize,
        percent: u8,
    },
    FileFailed(FileFailure),
    /// Terminal: the scan finished (possibly cancelled).
    Completed(ScanReport),
    /// Terminal: the scan could not run.
    Failed(ScanError),
}

impl ScanEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanEvent::Completed(_) | ScanEvent::Failed(_))
    }
}

/// Events the worker may queue ahead of the consumer before it blocks.
const EVENT_BUFFER: usize = 32;

/// `floor(processed / total * 100)`, or 0 when nothing was found.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (processed.min(total) * 100 / total) as u8
}

fn check_root(root: &Path) -> Result<(), ScanError> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScanError::RootNotFound(root.to_path_buf()),
        _ => ScanError::RootUnreadable {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Recursively find all FITS files below `root`.
///
/// Returned paths are absolute. Entries are sorted by name within each
/// directory so repeated scans of an unchanged tree visit files in the same
/// order. Symlinks are followed; broken links, link loops and subdirectories
/// that cannot be read are skipped.
pub fn find_fits_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    check_root(root)?;
    let root = std::path::absolute(root).map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::RootUnreadable {
                    path: root.clone(),
                    source: e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("directory loop")),
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }
        if is_fits_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn process_file(path: &Path) -> Result<MetadataRecord, HeaderError> {
    let header = read_primary_header(path)?;
    Ok(resolve(path, &header))
}

/// Scan `root` and return one record per readable FITS file.
///
/// `notify` receives `Started`, then one `Progress` per file and a
/// `FileFailed` before the `Progress` of each file that could not be read.
/// Nothing is emitted when the root itself is unusable. `cancel` is checked
/// before each file.
pub fn scan<F>(root: &Path, cancel: &AtomicBool, mut notify: F) -> Result<ScanReport, ScanError>
where
    F: FnMut(ScanEvent),
{
    let files = find_fits_files(root)?;
    let total = files.len();
    info!("Found {} FITS files in {}", total, root.display());
    notify(ScanEvent::Started { total });

    let mut report = ScanReport {
        total,
        ..Default::default()
    };

    for (index, path) in files.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            info!("Scan cancelled after {} of {} files", index, total);
            report.cancelled = true;
            break;
        }

        match process_file(path) {
            Ok(record) => {
                debug!("Read header of {}", path.display());
                report.records.push(record);
            }
            Err(e) => {
                debug!("Failed to read {}: {}", path.display(), e);
                let failure = FileFailure::new(path, &e);
                notify(ScanEvent::FileFailed(failure.clone()));
                report.failures.push(failure);
            }
        }

        let processed = index + 1;
        notify(ScanEvent::Progress {
            processed,
            total,
            percent: progress_percent(processed, total),
        });
    }

    info!(
        "Scan finished: {} records, {} failures",
        report.records.len(),
        report.failures.len()
    );
    Ok(report)
}

/// Scan without notifications or cancellation.
pub fn scan_directory(root: &Path) -> Result<ScanReport, ScanError> {
    scan(root, &AtomicBool::new(false), |_| {})
}

/// Runs scans on a background thread.
///
/// Only one scan runs at a time; a new one can be started once the terminal
/// event of the previous one has been received.
#[derive(Default)]
pub struct ScanManager {
    events: Option<Receiver<ScanEvent>>,
    cancel_flag: Option<Arc<AtomicBool>>,
    worker: Option<JoinHandle<()>>,
}

impl ScanManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.events.is_some()
    }

    pub fn start_scan(&mut self, root: PathBuf) -> Result<(), ScanError> {
        if self.is_running() {
            return Err(ScanError::AlreadyRunning);
        }

        let (tx, rx) = mpsc::sync_channel(EVENT_BUFFER);
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);

        let worker = thread::spawn(move || run_worker(root, worker_cancel, tx));

        self.events = Some(rx);
        self.cancel_flag = Some(cancel);
        self.worker = Some(worker);
        info!("Scan started");
        Ok(())
    }

    /// Ask the running scan to stop before its next file.
    pub fn cancel_scan(&self) {
        if let Some(flag) = &self.cancel_flag {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Block until the next event. Returns `None` when no scan is running.
    pub fn recv(&mut self) -> Option<ScanEvent> {
        let events = self.events.as_ref()?;
        let event = events
            .recv()
            .unwrap_or_else(|_| ScanEvent::Failed(ScanError::WorkerDisconnected));
        if event.is_terminal() {
            self.finish();
        }
        Some(event)
    }

    /// Return the next event if one is ready.
    pub fn try_recv(&mut self) -> Option<ScanEvent> {
        let events = self.events.as_ref()?;
        let event = match events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => ScanEvent::Failed(ScanError::WorkerDisconnected),
        };
        if event.is_terminal() {
            self.finish();
        }
        Some(event)
    }

    /// Drain events until the scan ends, passing non-terminal ones to `on_event`.
    pub fn wait<F>(&mut self, mut on_event: F) -> Result<ScanReport, ScanError>
    where
        F: FnMut(&ScanEvent),
    {
        while let Some(event) = self.recv() {
            match event {
                ScanEvent::Completed(report) => return Ok(report),
                ScanEvent::Failed(e) => return Err(e),
                event => on_event(&event),
            }
        }
        Err(ScanError::WorkerDisconnected)
    }

    fn finish(&mut self) {
        self.events = None;
        self.cancel_flag = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for ScanManager {
    fn drop(&mut self) {
        self.cancel_scan();
    }
}

fn run_worker(root: PathBuf, cancel: Arc<AtomicBool>, tx: SyncSender<ScanEvent>) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        scan(&root, &cancel, |event| {
            let _ = tx.send(event);
        })
    }));

    let terminal = match result {
        Ok(Ok(report)) => ScanEvent::Completed(report),
        Ok(Err(e)) => ScanEvent::Failed(e),
        Err(_) => {
            error!("Scan worker panicked");
            ScanEvent::Failed(ScanError::WorkerPanicked)
        }
    };
    let _ = tx.send(terminal);
}
