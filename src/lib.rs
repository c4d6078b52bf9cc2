pub mod commands;
pub mod error;
pub mod export;
pub mod fits;
pub mod resolver;
pub mod scan;
pub mod utils;

#[cfg(test)]
mod test_fixtures;

// Re-export commonly used items
pub use error::{ExportError, HeaderError, ScanError};
pub use fits::{read_primary_header, PrimaryHeader};
pub use resolver::{resolve, FieldValue, MetadataRecord};
pub use scan::{scan, scan_directory, ScanEvent, ScanManager, ScanReport};
