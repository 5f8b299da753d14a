use crate::error::PipelineError;

use std::fs;
use std::path::Path;
use tracing::{debug, info};

const UTF8_BOM: char = '\u{feff}';

/// Decodes feed bytes as UTF-8, falling back to Latin-1.
pub fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("Feed is not UTF-8 ({}), decoding as Latin-1", e.utf8_error());
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Drops the header line, trims every remaining line and skips blank ones.
pub fn data_lines(text: &str) -> Vec<String> {
    text.trim_start_matches(UTF8_BOM)
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_sales_lines(path: impl AsRef<Path>) -> Result<Vec<String>, PipelineError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| PipelineError::Source {
        path: path.to_path_buf(),
        source,
    })?;

    let lines = data_lines(&decode(bytes));
    info!(path = %path.display(), lines = lines.len(), "Read sales data");
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_blank_lines_are_skipped() {
        let text = "TransactionID|Date\n\nT1|a\n   \n  T2|b  \r\n";
        assert_eq!(data_lines(text), vec!["T1|a", "T2|b"]);
    }

    #[test]
    fn test_bom_is_ignored() {
        let text = "\u{feff}header\nT1|a\n";
        assert_eq!(data_lines(text), vec!["T1|a"]);
    }

    #[test]
    fn test_latin1_fallback() {
        // "Caf\xe9" is invalid UTF-8
        let text = decode(vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(text, "Café");
    }

    #[test]
    fn test_utf8_is_kept() {
        assert_eq!(decode("Café".as_bytes().to_vec()), "Café");
    }

    #[test]
    fn test_header_only_file_has_no_lines() {
        assert!(data_lines("TransactionID|Date|ProductID\n").is_empty());
    }
}
