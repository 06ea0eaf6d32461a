//! Input processing module
//! Handles file detection, text extraction, and input management

pub mod file_detector;
pub mod text_extractor;
pub mod manager;

pub use file_detector::DocumentFormat;
pub use manager::{validate_text_length, InputManager};
pub use text_extractor::{extract_text, SourceFile};
