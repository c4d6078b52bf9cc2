use crate::fits::PrimaryHeader;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// A metadata value taken from a header, or the "not available" marker.
///
/// `Present("")` (an empty string in the header) is not the same as
/// `NotAvailable` (no matching keyword at all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Present(String),
    NotAvailable,
}

impl FieldValue {
    /// Text written for `NotAvailable` in tabular output.
    pub const SENTINEL: &'static str = "N/A";

    pub fn as_option(&self) -> Option<&str> {
        match self {
            FieldValue::Present(value) => Some(value),
            FieldValue::NotAvailable => None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.as_option().unwrap_or(Self::SENTINEL)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Serialized as an optional string so structured outputs keep the distinction
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

/// Output fields filled from header keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RightAscension,
    Declination,
    ExposureTime,
    ObservationDate,
}

/// Keywords tried in order for one field; the first one present wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub keywords: &'static [&'static str],
}

pub const FIELD_RULES: [FieldRule; 4] = [
    FieldRule {
        field: Field::RightAscension,
        keywords: &["RA", "CRVAL1"],
    },
    FieldRule {
        field: Field::Declination,
        keywords: &["DEC", "CRVAL2"],
    },
    FieldRule {
        field: Field::ExposureTime,
        keywords: &["EXPTIME", "EXPOSURE"],
    },
    FieldRule {
        field: Field::ObservationDate,
        keywords: &["DATE-OBS", "DATE"],
    },
];

/// Column headings of the tabular output, in row order.
pub const COLUMNS: [&str; 6] = ["File", "Path", "RA", "DEC", "Exposure_Time", "Date_Obs"];

/// One output row per FITS file that could be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub file_name: String,
    pub path: String,
    pub right_ascension: FieldValue,
    pub declination: FieldValue,
    pub exposure_time: FieldValue,
    pub observation_date: FieldValue,
}

impl MetadataRecord {
    pub fn get(&self, field: Field) -> &FieldValue {
        match field {
            Field::RightAscension => &self.right_ascension,
            Field::Declination => &self.declination,
            Field::ExposureTime => &self.exposure_time,
            Field::ObservationDate => &self.observation_date,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut FieldValue {
        match field {
            Field::RightAscension => &mut self.right_ascension,
            Field::Declination => &mut self.declination,
            Field::ExposureTime => &mut self.exposure_time,
            Field::ObservationDate => &mut self.observation_date,
        }
    }

    /// Cell values in [`COLUMNS`] order.
    pub fn to_row(&self) -> [&str; 6] {
        [
            self.file_name.as_str(),
            self.path.as_str(),
            self.right_ascension.as_str(),
            self.declination.as_str(),
            self.exposure_time.as_str(),
            self.observation_date.as_str(),
        ]
    }
}

/// Look up the first of `keywords` present in the header.
pub fn resolve_field(header: &PrimaryHeader, keywords: &[&str]) -> FieldValue {
    keywords
        .iter()
        .find_map(|keyword| header.get(keyword))
        .map(|value| FieldValue::Present(value.to_string()))
        .unwrap_or(FieldValue::NotAvailable)
}

/// Build the metadata record for a file from its primary header.
pub fn resolve(path: &Path, header: &PrimaryHeader) -> MetadataRecord {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    let mut record = MetadataRecord {
        file_name,
        path: path.display().to_string(),
        right_ascension: FieldValue::NotAvailable,
        declination: FieldValue::NotAvailable,
        exposure_time: FieldValue::NotAvailable,
        observation_date: FieldValue::NotAvailable,
    };

    for rule in &FIELD_RULES {
        *record.get_mut(rule.field) = resolve_field(header, rule.keywords);
    }

    record
}
