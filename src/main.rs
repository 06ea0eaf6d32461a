//! RFP aligner: company-to-solicitation match scoring tool

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use rfp_aligner::cli::{self, Cli, Commands, ConfigAction};
use rfp_aligner::config::{Config, OutputFormat};
use rfp_aligner::input::InputManager;
use rfp_aligner::llm::{HttpExtractionService, RfpAnalysis};
use rfp_aligner::output::{save_report_to_file, ReportGenerator, ScoreReport};
use rfp_aligner::processing::{rescore, CompanyProfile, IngestionPipeline};
use rfp_aligner::storage::JsonFileStore;
use rfp_aligner::{Result, RfpAlignerError};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Extract { file, save } => {
            let mut input_manager = InputManager::new().with_cache(false);
            let text = input_manager.extract_text(&file).await?;
            info!("Extracted {} characters from {}", text.chars().count(), file.display());

            match save {
                Some(path) => {
                    save_report_to_file(&text, &path)?;
                    println!("Extracted text saved to {}", path.display());
                }
                None => println!("{}", text),
            }
        }

        Commands::Score {
            company,
            analysis,
            output,
            detailed,
            save,
        } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let company = load_company(&company).await?;

            cli::validate_file_extension(&analysis, &["json"])
                .map_err(|e| RfpAlignerError::InvalidInput(format!("Analysis file: {}", e)))?;
            let raw = tokio::fs::read_to_string(&analysis).await?;
            let parsed = RfpAnalysis::from_json(&raw)?;

            let rescored = rescore(&parsed, &company)?;
            let source = analysis.to_string_lossy();
            let report = ScoreReport::from_rescored(&rescored, Some(source.as_ref()));
            emit_report(&report, &format, detailed || config.output.detailed, &config, save.as_deref())?;
        }

        Commands::Ingest {
            file,
            text_file,
            company,
            output,
            detailed,
            save,
        } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let company = load_company(&company).await?;

            let service = HttpExtractionService::from_config(&config)?;
            let store = JsonFileStore::new(config.records_dir().clone());
            info!("Using extraction service at {}", service.endpoint());
            let mut pipeline = IngestionPipeline::from_config(service, store, &config);

            let (source, raw_text) = match (file, text_file) {
                (Some(path), _) => (path, None),
                (None, Some(path)) => {
                    let text = tokio::fs::read_to_string(&path).await?;
                    (path, Some(text))
                }
                (None, None) => {
                    return Err(RfpAlignerError::InvalidInput(
                        "Provide --file or --text-file".to_string(),
                    ))
                }
            };

            let spinner = spinner("Analyzing solicitation...");
            let outcome = match &raw_text {
                Some(text) => pipeline.ingest_text(text, &company).await,
                None => pipeline.ingest_file(&source, &company).await,
            };
            spinner.finish_and_clear();
            let outcome = outcome?;

            let source = source.to_string_lossy();
            let report = ScoreReport::from_outcome(&outcome, Some(source.as_ref()));
            emit_report(&report, &format, detailed || config.output.detailed, &config, save.as_deref())?;
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("Configuration ({})\n", config_path.display());
                println!("Service endpoint: {}", config.service.endpoint);
                println!(
                    "API key variable: {}",
                    config.service.api_key_env.as_deref().unwrap_or("(none)")
                );
                println!("Timeout: {}s", config.service.timeout_secs);
                println!("Minimum text length: {} characters", config.ingestion.min_text_chars);
                println!("Extraction cache: {}", config.ingestion.enable_caching);
                println!("Records directory: {}", config.records_dir().display());
                println!("Output format: {:?}", config.output.format);
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(&config_path)?;
                println!("Configuration reset: {}", config_path.display());
            }

            Some(ConfigAction::Path) => println!("{}", config_path.display()),
        },
    }

    Ok(())
}

fn resolve_format(requested: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match requested {
        Some(format) => cli::parse_output_format(format).map_err(RfpAlignerError::InvalidInput),
        None => Ok(config.output.format.clone()),
    }
}

async fn load_company(path: &Path) -> Result<CompanyProfile> {
    cli::validate_file_extension(path, &["json"])
        .map_err(|e| RfpAlignerError::InvalidInput(format!("Company profile: {}", e)))?;
    CompanyProfile::load(path).await
}

fn emit_report(
    report: &ScoreReport,
    format: &OutputFormat,
    detailed: bool,
    config: &Config,
    save: Option<&Path>,
) -> Result<()> {
    let use_colors = save.is_none() && config.output.color_output;
    let generator = ReportGenerator::with_options(use_colors, detailed, true, true, true);
    let content = generator.generate_report(report, format)?;

    match save {
        Some(path) => {
            save_report_to_file(&content, path)?;
            println!("Report saved to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
