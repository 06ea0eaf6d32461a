//! File type detection

use crate::error::{Result, RfpAlignerError};
use std::fmt;
use std::path::Path;

pub const ACCEPTED_FORMATS: &str = "PDF, DOCX, TXT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Docx,
    Pdf,
}

impl DocumentFormat {
    /// Select a decoding strategy from a file name, case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let lower = name.to_lowercase();

        if lower.ends_with(".txt") {
            Ok(DocumentFormat::Text)
        } else if lower.ends_with(".docx") {
            Ok(DocumentFormat::Docx)
        } else if lower.ends_with(".pdf") {
            Ok(DocumentFormat::Pdf)
        } else {
            Err(RfpAlignerError::UnsupportedFormat(format!(
                "'{}' (accepted: {})",
                name, ACCEPTED_FORMATS
            )))
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_file_name(&name)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Text => write!(f, "TXT"),
            DocumentFormat::Docx => write!(f, "DOCX"),
            DocumentFormat::Pdf => write!(f, "PDF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_accepted_extensions_case_insensitively() {
        assert_eq!(DocumentFormat::from_file_name("rfp.TXT").unwrap(), DocumentFormat::Text);
        assert_eq!(DocumentFormat::from_file_name("Sol-123.Docx").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_file_name("amendment.pdf").unwrap(), DocumentFormat::Pdf);
    }

    #[test]
    fn test_rejects_other_extensions() {
        for name in ["pricing.csv", "notes.doc", "scan.png", "README"] {
            assert!(matches!(
                DocumentFormat::from_file_name(name),
                Err(RfpAlignerError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_only_final_extension_counts() {
        assert_eq!(DocumentFormat::from_file_name("draft.pdf.txt").unwrap(), DocumentFormat::Text);
        assert!(DocumentFormat::from_file_name("draft.txt.zip").is_err());
    }
}
