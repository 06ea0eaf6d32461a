//! Input manager for loading and decoding solicitation files

use crate::error::{Result, RfpAlignerError};
use crate::input::file_detector::DocumentFormat;
use crate::input::text_extractor::{extract_text, SourceFile};
use log::info;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Read a file from disk and extract its text.
    ///
    /// The extension is checked before the file is opened, so unsupported
    /// uploads fail without any I/O.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        let format = DocumentFormat::from_path(path)?;

        if !path.exists() {
            return Err(RfpAlignerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        info!("Extracting text from {} file: {}", format, path.display());
        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let text = self.extract_source(&SourceFile::new(name, bytes)).await?;

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    /// Extract text from an in-memory upload
    pub async fn extract_source(&self, file: &SourceFile) -> Result<String> {
        let text = extract_text(file).await?;
        info!("Extracted {} characters from '{}'", text.chars().count(), file.name);
        Ok(text)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-side guard run before spending an AI call on the text.
///
/// Counts characters of the trimmed text.
pub fn validate_text_length(text: &str, minimum: usize) -> Result<()> {
    let actual = text.trim().chars().count();
    if actual < minimum {
        return Err(RfpAlignerError::InputTooShort { actual, minimum });
    }
    Ok(())
}
