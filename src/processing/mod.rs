//! Company profiles, deterministic scoring and the ingestion pipeline

pub mod profile;
pub mod scoring;
pub mod explain;
pub mod pipeline;

pub use explain::{explain, NaicsMatch, ScoreExplanation};
pub use pipeline::{rescore, IngestionOutcome, IngestionPipeline, RescoredAnalysis};
pub use profile::{CompanyForScoring, CompanyProfile, RfpForScoring};
pub use scoring::{compute_scores, ComputedScores, ReadinessLevel};
