//! Synthetic FITS files for tests.

use crate::fits::{BLOCK_SIZE, CARD_SIZE};
use std::path::Path;

/// Builds a FITS primary header card by card.
pub(crate) struct FitsBuilder {
    cards: Vec<String>,
    end: bool,
}

impl FitsBuilder {
    /// A minimal header: SIMPLE, BITPIX and NAXIS = 0 (no data unit).
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            end: true,
        }
        .value("SIMPLE", "T")
        .value("BITPIX", "16")
        .value("NAXIS", "0")
    }

    /// Add a keyword with raw value text, e.g. `30.0` or `T`.
    pub fn value(mut self, keyword: &str, value: &str) -> Self {
        self.cards.push(format!("{:<8}= {:>20}", keyword, value));
        self
    }

    /// Add a quoted string keyword.
    pub fn string(self, keyword: &str, value: &str) -> Self {
        let quoted = format!("'{}'", value.replace('\'', "''"));
        self.value(keyword, &quoted)
    }

    /// Add a card exactly as written.
    pub fn raw(mut self, card: &str) -> Self {
        self.cards.push(card.to_string());
        self
    }

    pub fn without_end(mut self) -> Self {
        self.end = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        for card in &self.cards {
            bytes.extend_from_slice(format!("{:<80}", card).as_bytes());
        }
        if self.end {
            bytes.extend_from_slice(format!("{:<80}", "END").as_bytes());
        }
        let padded = bytes.len().div_ceil(BLOCK_SIZE).max(1) * BLOCK_SIZE;
        bytes.resize(padded, b' ');
        debug_assert_eq!(bytes.len() % CARD_SIZE, 0);
        bytes
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

/// Write a file with a FITS extension that is not a FITS file.
pub(crate) fn write_corrupt(path: &Path) {
    std::fs::write(path, b"this is not a FITS header").unwrap();
}
