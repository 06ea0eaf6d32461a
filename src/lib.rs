//! RFP aligner library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod llm;
pub mod output;
pub mod storage;

pub use error::{Result, RfpAlignerError};
pub use config::Config;
