//! AI extraction service integration

pub mod analysis;
pub mod client;

pub use analysis::RfpAnalysis;
pub use client::{ExtractionRequest, ExtractionResponse, ExtractionService, HttpExtractionService};
