use crate::error::HeaderError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

/// FITS headers are stored in 2880-byte blocks of 80-character cards.
pub const BLOCK_SIZE: usize = 2880;
pub const CARD_SIZE: usize = 80;

/// Give up on a header that has not reached END after this many blocks.
pub const MAX_HEADER_BLOCKS: usize = 100;

/// File name suffixes recognized as FITS, compared case-insensitively.
pub const FITS_EXTENSIONS: [&str; 3] = [".fits", ".fit", ".fts"];

/// One keyword card with its raw value text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HeaderCard {
    pub keyword: String,
    pub value: String,
}

/// Primary header of a FITS file.
///
/// Keywords are case-sensitive. Values are kept exactly as written in the
/// card (string quotes removed), so `30.` stays `30.` and `1.5E+01` is not
/// turned into a number. When a keyword repeats, lookups return the first
/// occurrence.
#[derive(Debug, Clone, Default)]
pub struct PrimaryHeader {
    cards: Vec<HeaderCard>,
    index: HashMap<String, usize>,
}

impl PrimaryHeader {
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.index
            .get(keyword)
            .map(|&i| self.cards[i].value.as_str())
    }

    /// All value cards in the order they appear in the file.
    pub fn cards(&self) -> &[HeaderCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn push(&mut self, keyword: String, value: String) {
        self.index
            .entry(keyword.clone())
            .or_insert(self.cards.len());
        self.cards.push(HeaderCard { keyword, value });
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PrimaryHeader {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut header = PrimaryHeader::default();
        for (keyword, value) in iter {
            header.push(keyword.into(), value.into());
        }
        header
    }
}

/// Check whether a file name ends with one of the FITS extensions.
pub fn is_fits_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .map(|name| FITS_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
        .unwrap_or(false)
}

/// Read the primary header of a FITS file.
///
/// The file is closed before this returns.
pub fn read_primary_header(path: &Path) -> Result<PrimaryHeader, HeaderError> {
    let file = File::open(path)?;
    read_header_from(BufReader::new(file))
}

/// Read a primary header from any byte stream positioned at the start of the file.
pub fn read_header_from<R: Read>(mut reader: R) -> Result<PrimaryHeader, HeaderError> {
    let mut header = PrimaryHeader::default();
    let mut block = [0u8; BLOCK_SIZE];

    for block_index in 0..MAX_HEADER_BLOCKS {
        if let Err(e) = reader.read_exact(&mut block) {
            return Err(match e.kind() {
                ErrorKind::UnexpectedEof => HeaderError::Truncated {
                    bytes: block_index * BLOCK_SIZE,
                },
                _ => HeaderError::Io(e),
            });
        }

        for (card_index, card) in block.chunks_exact(CARD_SIZE).enumerate() {
            if block_index == 0 && card_index == 0 {
                check_simple(card)?;
            }

            match parse_card(card) {
                Card::End => return Ok(header),
                Card::Value { keyword, value } => header.push(keyword, value),
                Card::Skip => {}
            }
        }
    }

    Err(HeaderError::HeaderTooLarge {
        blocks: MAX_HEADER_BLOCKS,
    })
}

fn check_simple(card: &[u8]) -> Result<(), HeaderError> {
    let keyword = String::from_utf8_lossy(&card[..8]).trim().to_string();
    if keyword == "SIMPLE" {
        Ok(())
    } else {
        Err(HeaderError::NotFits { found: keyword })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Card {
    End,
    Value { keyword: String, value: String },
    Skip,
}

fn parse_card(card: &[u8]) -> Card {
    if !card.is_ascii() {
        tracing::debug!("Skipping non-ASCII header card");
        return Card::Skip;
    }
    let Ok(text) = std::str::from_utf8(card) else {
        return Card::Skip;
    };

    let keyword = text[..8].trim();
    match keyword {
        "END" => return Card::End,
        "" | "COMMENT" | "HISTORY" => return Card::Skip,
        _ => {}
    }

    // HIERARCH long keywords: "HIERARCH ESO DET DIT = 10.0"
    if keyword == "HIERARCH" {
        let rest = &text[8..];
        return match rest.find('=') {
            Some(eq_pos) if !rest[..eq_pos].trim().is_empty() => Card::Value {
                keyword: rest[..eq_pos].trim().to_string(),
                value: parse_value(&rest[eq_pos + 1..]),
            },
            _ => Card::Skip,
        };
    }

    // A value indicator in column 9 marks a value card; anything else is commentary
    if text.as_bytes()[8] != b'=' {
        return Card::Skip;
    }

    Card::Value {
        keyword: keyword.to_string(),
        value: parse_value(&text[9..]),
    }
}

/// Extract the value text from the part of a card after `=`.
fn parse_value(field: &str) -> String {
    let field = field.trim_start();

    if let Some(quoted) = field.strip_prefix('\'') {
        let mut value = String::new();
        let mut chars = quoted.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    value.push('\'');
                } else {
                    break;
                }
            } else {
                value.push(c);
            }
        }
        // Trailing spaces in FITS strings are not significant
        value.truncate(value.trim_end().len());
        return value;
    }

    let value = match field.find('/') {
        Some(comment_pos) => &field[..comment_pos],
        None => field,
    };
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::FitsBuilder;
    use std::path::PathBuf;

    fn card_bytes(text: &str) -> Vec<u8> {
        format!("{:<80}", text).into_bytes()
    }

    #[test]
    fn test_is_fits_file_extensions() {
        assert!(is_fits_file(Path::new("/data/m31.fits")));
        assert!(is_fits_file(Path::new("m31.FIT")));
        assert!(is_fits_file(Path::new("dir/light_0001.Fts")));
        assert!(!is_fits_file(Path::new("notes.txt")));
        assert!(!is_fits_file(Path::new("archive.fits.gz")));
        assert!(!is_fits_file(Path::new("fits")));
    }

    #[test]
    fn test_is_fits_file_hidden_name_matches_suffix() {
        assert!(is_fits_file(&PathBuf::from("/tmp/.fits")));
    }

    #[test]
    fn test_parse_value_numbers_are_raw() {
        assert_eq!(parse_value(" 30. / exposure in s"), "30.");
        assert_eq!(parse_value("           1.5E+01"), "1.5E+01");
        assert_eq!(parse_value("                   T"), "T");
        assert_eq!(parse_value("  -5.2"), "-5.2");
    }

    #[test]
    fn test_parse_value_strings() {
        assert_eq!(parse_value(" '2023-01-01T22:10:05' / UTC"), "2023-01-01T22:10:05");
        assert_eq!(parse_value(" 'M 31    '"), "M 31");
        assert_eq!(parse_value(" '  leading'"), "  leading");
        assert_eq!(parse_value(" 'O''Brien'"), "O'Brien");
        assert_eq!(parse_value(" 'a/b' / slash inside quotes"), "a/b");
        assert_eq!(parse_value(" ''"), "");
    }

    #[test]
    fn test_parse_value_undefined_is_empty() {
        assert_eq!(parse_value("                      / no value"), "");
    }

    #[test]
    fn test_parse_card_kinds() {
        assert_eq!(parse_card(&card_bytes("END")), Card::End);
        assert_eq!(parse_card(&card_bytes("COMMENT = not a value")), Card::Skip);
        assert_eq!(parse_card(&card_bytes("HISTORY processed")), Card::Skip);
        assert_eq!(parse_card(&card_bytes("")), Card::Skip);
        assert_eq!(
            parse_card(&card_bytes("EXPTIME =                 30.0 / seconds")),
            Card::Value {
                keyword: "EXPTIME".to_string(),
                value: "30.0".to_string()
            }
        );
        assert_eq!(
            parse_card(&card_bytes("HIERARCH ESO DET DIT = 10.0")),
            Card::Value {
                keyword: "ESO DET DIT".to_string(),
                value: "10.0".to_string()
            }
        );
        assert_eq!(parse_card(&card_bytes("DATE-OBS  no indicator")), Card::Skip);
    }

    #[test]
    fn test_parse_card_non_ascii_is_skipped() {
        let mut bytes = card_bytes("OBJECT  = 'xx'");
        bytes[12] = 0xC3;
        assert_eq!(parse_card(&bytes), Card::Skip);
    }

    #[test]
    fn test_read_header_keeps_first_duplicate_and_order() {
        let bytes = FitsBuilder::new()
            .value("RA", "10.5")
            .value("RA", "99.0")
            .string("OBJECT", "M 42")
            .build();

        let header = read_header_from(bytes.as_slice()).unwrap();
        assert_eq!(header.get("RA"), Some("10.5"));
        assert_eq!(header.get("OBJECT"), Some("M 42"));
        assert_eq!(header.get("ra"), None);
        assert_eq!(header.cards()[0].keyword, "SIMPLE");
        assert_eq!(
            header.cards().iter().filter(|c| c.keyword == "RA").count(),
            2
        );
    }

    #[test]
    fn test_read_header_spanning_blocks() {
        let mut builder = FitsBuilder::new();
        for i in 0..60 {
            builder = builder.value(&format!("KEY{}", i), &i.to_string());
        }
        let bytes = builder.value("EXPTIME", "120").build();
        assert_eq!(bytes.len(), 2 * BLOCK_SIZE);

        let header = read_header_from(bytes.as_slice()).unwrap();
        assert_eq!(header.get("EXPTIME"), Some("120"));
        assert_eq!(header.get("KEY59"), Some("59"));
    }

    #[test]
    fn test_read_header_rejects_non_fits() {
        let mut bytes = b"hello, this is plain text".to_vec();
        bytes.resize(BLOCK_SIZE, b' ');

        match read_header_from(bytes.as_slice()) {
            Err(HeaderError::NotFits { found }) => assert_eq!(found, "hello, t"),
            other => panic!("expected NotFits, got {:?}", other),
        }
    }

    #[test]
    fn test_read_header_truncated() {
        let bytes = FitsBuilder::new().value("RA", "1").build();
        let short = &bytes[..1000];
        assert!(matches!(
            read_header_from(short),
            Err(HeaderError::Truncated { bytes: 0 })
        ));

        let empty: &[u8] = &[];
        assert!(matches!(
            read_header_from(empty),
            Err(HeaderError::Truncated { .. })
        ));
    }

    #[test]
    fn test_read_header_without_end() {
        let bytes = FitsBuilder::new().value("RA", "1").without_end().build();
        assert!(matches!(
            read_header_from(bytes.as_slice()),
            Err(HeaderError::Truncated { bytes: BLOCK_SIZE })
        ));
    }

    #[test]
    fn test_read_primary_header_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("light.fits");
        FitsBuilder::new()
            .string("DATE-OBS", "2023-01-01")
            .write_to(&path);

        let header = read_primary_header(&path).unwrap();
        assert_eq!(header.get("DATE-OBS"), Some("2023-01-01"));
        assert_eq!(header.get("SIMPLE"), Some("T"));
        assert!(!header.is_empty());
    }

    #[test]
    fn test_read_primary_header_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_primary_header(&dir.path().join("missing.fits")),
            Err(HeaderError::Io(_))
        ));
    }

    #[test]
    fn test_header_from_pairs() {
        let header: PrimaryHeader = [("DEC", "-5.2"), ("DATE", "2020-02-02")]
            .into_iter()
            .collect();
        assert_eq!(header.len(), 2);
        assert_eq!(header.get("DEC"), Some("-5.2"));
    }
}
