//! End-to-end ingestion: extract, analyze, score, persist

use crate::config::Config;
use crate::error::Result;
use crate::input::{validate_text_length, InputManager};
use crate::llm::analysis::RfpAnalysis;
use crate::llm::client::{ExtractionRequest, ExtractionService};
use crate::processing::explain::{explain, ScoreExplanation};
use crate::processing::profile::{CompanyProfile, RfpForScoring};
use crate::processing::scoring::{compute_scores, ComputedScores};
use crate::storage::{apply_scores, RecordStore};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

pub const DEFAULT_MIN_TEXT_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionOutcome {
    pub id: String,
    /// Analysis as persisted, with computed scores applied
    pub analysis: RfpAnalysis,
    pub scores: ComputedScores,
    pub explanation: ScoreExplanation,
    pub text_chars: usize,
    pub processing_time_ms: u64,
}

/// Scores and explanation for an analysis, without touching service or store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescoredAnalysis {
    pub analysis: RfpAnalysis,
    pub scores: ComputedScores,
    pub explanation: ScoreExplanation,
}

pub struct IngestionPipeline<S: ExtractionService, R: RecordStore> {
    service: S,
    store: R,
    input_manager: InputManager,
    min_text_chars: usize,
}

impl<S: ExtractionService, R: RecordStore> IngestionPipeline<S, R> {
    pub fn new(service: S, store: R) -> Self {
        Self {
            service,
            store,
            input_manager: InputManager::new(),
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
        }
    }

    pub fn from_config(service: S, store: R, config: &Config) -> Self {
        Self {
            service,
            store,
            input_manager: InputManager::new().with_cache(config.ingestion.enable_caching),
            min_text_chars: config.ingestion.min_text_chars,
        }
    }

    pub fn with_min_text_chars(mut self, minimum: usize) -> Self {
        self.min_text_chars = minimum;
        self
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub async fn ingest_file(&mut self, path: &Path, company: &CompanyProfile) -> Result<IngestionOutcome> {
        info!("Ingesting solicitation from {}", path.display());
        let text = self.input_manager.extract_text(path).await?;
        self.ingest_text(&text, company).await
    }

    pub async fn ingest_text(&self, text: &str, company: &CompanyProfile) -> Result<IngestionOutcome> {
        let start = Instant::now();
        let rfp_text = text.trim();
        validate_text_length(rfp_text, self.min_text_chars)?;

        let request = ExtractionRequest {
            rfp_text: rfp_text.to_string(),
            company_profile: company.clone(),
        };
        let response = self.service.analyze(&request).await?;
        debug!("Extraction service returned record {}", response.id);

        let rescored = Self::rescore(&response.analysis, company)?;
        self.store
            .save_scored_analysis(&response.id, &rescored.scores, &response.analysis)
            .await?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Record {} scored {} ({}) in {}ms",
            response.id,
            rescored.scores.overall_match_score,
            rescored.scores.readiness_level,
            processing_time_ms
        );

        Ok(IngestionOutcome {
            id: response.id,
            analysis: rescored.analysis,
            scores: rescored.scores,
            explanation: rescored.explanation,
            text_chars: rfp_text.chars().count(),
            processing_time_ms,
        })
    }

    /// Recompute deterministic scores for an existing analysis
    pub fn rescore(analysis: &RfpAnalysis, company: &CompanyProfile) -> Result<RescoredAnalysis> {
        rescore(analysis, company)
    }
}

pub fn rescore(analysis: &RfpAnalysis, company: &CompanyProfile) -> Result<RescoredAnalysis> {
    let company = company.for_scoring();
    let rfp = RfpForScoring::from(analysis);

    let scores = compute_scores(&company, &rfp);
    let explanation = explain(&company, &rfp);
    let analysis = apply_scores(analysis, &scores)?;

    Ok(RescoredAnalysis {
        analysis,
        scores,
        explanation,
    })
}
