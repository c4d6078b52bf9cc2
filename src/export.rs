use crate::error::ExportError;
use crate::resolver::{MetadataRecord, COLUMNS};
use crate::utils::truncate_string;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// File formats a result set can be saved as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma separated, one header row, "N/A" for missing values
    #[default]
    Csv,
    /// Array of objects, null for missing values
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Write records as CSV with a header row.
pub fn write_csv<W: Write>(records: &[MetadataRecord], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for record in records {
        csv_writer.write_record(record.to_row())?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_json<W: Write>(records: &[MetadataRecord], mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)?;
    Ok(())
}

/// Save records to `path`, replacing any existing file.
pub fn save(
    records: &[MetadataRecord],
    path: &Path,
    format: OutputFormat,
) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);

    match format {
        OutputFormat::Csv => write_csv(records, writer),
        OutputFormat::Json => write_json(records, writer),
    }
}

/// Render records as a fixed-width table for the terminal.
pub fn format_table(records: &[MetadataRecord]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<32} {:<14} {:<14} {:<10} {:<24} {}\n",
        "File", "RA", "DEC", "Exposure", "Date", "Path"
    ));
    output.push_str(&format!("{:-<120}\n", ""));

    for record in records {
        output.push_str(&format!(
            "{:<32} {:<14} {:<14} {:<10} {:<24} {}\n",
            truncate_string(&record.file_name, 32),
            truncate_string(record.right_ascension.as_str(), 14),
            truncate_string(record.declination.as_str(), 14),
            truncate_string(record.exposure_time.as_str(), 10),
            truncate_string(record.observation_date.as_str(), 24),
            record.path
        ));
    }

    output.push_str(&format!("\nTotal: {} files\n", records.len()));
    output
}
