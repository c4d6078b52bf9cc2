use crate::fits::{read_primary_header, PrimaryHeader};
use crate::resolver::{resolve, MetadataRecord};
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HeaderFormat {
    #[default]
    Table,
    Json,
}

/// Print every keyword of a file's primary header and the fields that
/// `extract` would write for it.
pub fn show_headers(path: &Path, format: HeaderFormat) -> Result<()> {
    let header = read_primary_header(path)
        .with_context(|| format!("Failed to read FITS header: {}", path.display()))?;
    let record = resolve(path, &header);

    match format {
        HeaderFormat::Json => println!("{}", headers_json(&header, &record)?),
        HeaderFormat::Table => print!("{}", format_headers(&header, &record)),
    }

    Ok(())
}

fn headers_json(header: &PrimaryHeader, record: &MetadataRecord) -> Result<String> {
    let value = serde_json::json!({
        "record": record,
        "keywords": header.cards(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn format_headers(header: &PrimaryHeader, record: &MetadataRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("FITS File: {}\n", record.path));
    output.push_str("\nExtracted:\n");
    output.push_str(&format!("  RA:       {}\n", record.right_ascension));
    output.push_str(&format!("  DEC:      {}\n", record.declination));
    output.push_str(&format!("  Exposure: {}\n", record.exposure_time));
    output.push_str(&format!("  Date:     {}\n", record.observation_date));

    output.push_str(&format!("\nPrimary HDU - {} keywords:\n", header.len()));
    for card in header.cards() {
        output.push_str(&format!("  {:<16} = {}\n", card.keyword, card.value));
    }

    output
}
