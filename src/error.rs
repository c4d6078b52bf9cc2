use std::path::PathBuf;
use thiserror::Error;

/// Failure to read the primary header of a single file.
///
/// These never abort a scan; the pipeline turns them into status messages.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a FITS file: first keyword is {found:?}, expected SIMPLE")]
    NotFits { found: String },

    #[error("file ends before the END card ({bytes} header bytes read)")]
    Truncated { bytes: usize },

    #[error("no END card within the first {blocks} header blocks")]
    HeaderTooLarge { blocks: usize },
}

/// Fatal scan errors, surfaced once to the caller.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot read directory {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a scan is already running")]
    AlreadyRunning,

    #[error("scan worker panicked")]
    WorkerPanicked,

    #[error("scan worker exited without reporting a result")]
    WorkerDisconnected,
}

/// Failure to write an exported result set.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
