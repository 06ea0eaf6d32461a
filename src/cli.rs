//! CLI interface for the RFP aligner

use crate::config::OutputFormat;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rfp-aligner")]
#[command(about = "Score how well a company fits a government solicitation")]
#[command(long_about = "Extract text from RFP documents, send it to the AI extraction service, and compute deterministic NAICS, certification, capability and past-performance match scores")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract plain text from an RFP document
    Extract {
        /// Path to the RFP (PDF, DOCX, TXT)
        #[arg(short, long)]
        file: PathBuf,

        /// Save extracted text to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Rescore a stored analysis offline
    Score {
        /// Company profile JSON
        #[arg(long)]
        company: PathBuf,

        /// Analysis JSON as returned by the extraction service
        #[arg(short, long)]
        analysis: PathBuf,

        /// Output format: console, json, markdown, html
        #[arg(short, long)]
        output: Option<String>,

        /// Output detailed analysis
        #[arg(short, long)]
        detailed: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Extract, analyze, score and store an RFP
    #[command(group(ArgGroup::new("source").required(true).args(["file", "text_file"])))]
    Ingest {
        /// Path to the RFP (PDF, DOCX, TXT)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Read solicitation text verbatim from any file
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Company profile JSON
        #[arg(long)]
        company: PathBuf,

        /// Output format: console, json, markdown, html
        #[arg(short, long)]
        output: Option<String>,

        /// Output detailed analysis
        #[arg(short, long)]
        detailed: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("md"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("company.JSON"), &["json"]).is_ok());
        assert!(validate_file_extension(Path::new("company.yaml"), &["json"]).is_err());
        assert!(validate_file_extension(Path::new("company"), &["json"]).is_err());
    }

    #[test]
    fn test_ingest_requires_a_source() {
        let missing = Cli::try_parse_from(["rfp-aligner", "ingest", "--company", "c.json"]);
        assert!(missing.is_err());

        let cli = Cli::try_parse_from([
            "rfp-aligner", "ingest", "--file", "rfp.pdf", "--company", "c.json", "-o", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Ingest { file, output, .. } => {
                assert_eq!(file, Some(PathBuf::from("rfp.pdf")));
                assert_eq!(output.as_deref(), Some("json"));
            }
            _ => panic!("expected ingest"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rfp-aligner", "config", "path", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Config { action: Some(ConfigAction::Path) }));
    }
}
