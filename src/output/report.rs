//! Report structures assembled from a scored analysis

use crate::llm::analysis::{MatchAnalysis, PartnerRecommendation, RfpAnalysis};
use crate::processing::explain::ScoreExplanation;
use crate::processing::pipeline::{IngestionOutcome, RescoredAnalysis};
use crate::processing::scoring::{ComputedScores, ReadinessLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything a formatter needs to present one scored solicitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Headline facts about the opportunity and the verdict
    pub summary: ReportSummary,

    /// Per-signal scores with their weight in the overall score
    pub score_breakdown: Vec<ScoreComponent>,

    /// Deterministic matches and gaps behind the scores
    pub explanation: ScoreExplanation,

    /// Qualitative findings reported by the AI service
    pub match_analysis: MatchAnalysis,

    pub partner_recommendations: Vec<PartnerRecommendation>,

    pub scores: ComputedScores,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub title: String,
    pub agency: Option<String>,
    pub solicitation_number: Option<String>,
    pub due_date: Option<String>,
    pub set_aside: Option<String>,
    pub naics_codes: Vec<String>,
    pub overall_match_score: u8,
    pub readiness_level: ReadinessLevel,
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub name: String,
    pub score: u8,
    /// Share of the overall score, in percent
    pub weight_percent: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub aligner_version: String,
    pub record_id: Option<String>,
    pub source: Option<String>,
    pub text_chars: Option<usize>,
    pub processing_time_ms: Option<u64>,
}

impl ScoreReport {
    pub fn new(
        analysis: &RfpAnalysis,
        scores: ComputedScores,
        explanation: ScoreExplanation,
        source: Option<&str>,
    ) -> Self {
        Self {
            summary: build_summary(analysis, &scores),
            score_breakdown: build_breakdown(&scores),
            explanation,
            match_analysis: analysis.match_analysis(),
            partner_recommendations: analysis.partner_recommendations(),
            scores,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                aligner_version: env!("CARGO_PKG_VERSION").to_string(),
                record_id: None,
                source: source.map(str::to_string),
                text_chars: None,
                processing_time_ms: None,
            },
        }
    }

    pub fn from_outcome(outcome: &IngestionOutcome, source: Option<&str>) -> Self {
        let mut report = Self::new(
            &outcome.analysis,
            outcome.scores,
            outcome.explanation.clone(),
            source,
        );
        report.metadata.record_id = Some(outcome.id.clone());
        report.metadata.text_chars = Some(outcome.text_chars);
        report.metadata.processing_time_ms = Some(outcome.processing_time_ms);
        report
    }

    pub fn from_rescored(rescored: &RescoredAnalysis, source: Option<&str>) -> Self {
        Self::new(
            &rescored.analysis,
            rescored.scores,
            rescored.explanation.clone(),
            source,
        )
    }
}

fn build_summary(analysis: &RfpAnalysis, scores: &ComputedScores) -> ReportSummary {
    let opportunity = &analysis.opportunity;
    ReportSummary {
        title: opportunity
            .title()
            .unwrap_or("Untitled solicitation")
            .to_string(),
        agency: opportunity.agency().map(str::to_string),
        solicitation_number: opportunity.solicitation_number().map(str::to_string),
        due_date: opportunity.due_date().map(str::to_string),
        set_aside: opportunity.set_aside().map(str::to_string),
        naics_codes: opportunity.naics_codes.clone(),
        overall_match_score: scores.overall_match_score,
        readiness_level: scores.readiness_level,
        verdict: verdict(scores.readiness_level).to_string(),
    }
}

fn build_breakdown(scores: &ComputedScores) -> Vec<ScoreComponent> {
    let component = |name: &str, score: u8, weight_percent: u8| ScoreComponent {
        name: name.to_string(),
        score,
        weight_percent,
    };

    vec![
        component("NAICS alignment", scores.naics_alignment_score, 20),
        component("Certifications", scores.certification_alignment_score, 30),
        component("Capabilities", scores.capability_alignment_score, 20),
        component("Past performance", scores.past_performance_alignment_score, 20),
    ]
}

pub fn verdict(level: ReadinessLevel) -> &'static str {
    match level {
        ReadinessLevel::High => "Strong fit: ready to pursue",
        ReadinessLevel::Medium => "Possible fit: close the listed gaps or team up",
        ReadinessLevel::Low => "Weak fit: pursue only with a teaming partner",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::pipeline::rescore;
    use crate::processing::profile::CompanyProfile;

    #[test]
    fn test_report_from_rescored_analysis() {
        let analysis = RfpAnalysis::from_json(
            r#"{
                "opportunity": {"title": "Cloud Hosting Services", "agency": "DOE", "naics_codes": ["541512"]},
                "match_analysis": {"strengths": ["Incumbent on similar work"], "gaps": "No FedRAMP High"},
                "partner_recommendations": [{"company_name": "Beta Corp", "rationale": "Holds FedRAMP High"}]
            }"#,
        )
        .unwrap();
        let company = CompanyProfile {
            primary_naics: "541512".to_string(),
            ..CompanyProfile::default()
        };

        let rescored = rescore(&analysis, &company).unwrap();
        let report = ScoreReport::from_rescored(&rescored, Some("analysis.json"));

        assert_eq!(report.summary.title, "Cloud Hosting Services");
        assert_eq!(report.summary.agency.as_deref(), Some("DOE"));
        assert_eq!(report.summary.overall_match_score, rescored.scores.overall_match_score);
        assert_eq!(report.score_breakdown.len(), 4);
        assert_eq!(report.score_breakdown[0].score, 100);
        assert_eq!(report.match_analysis.gaps, vec!["No FedRAMP High"]);
        assert_eq!(report.partner_recommendations[0].name, "Beta Corp");
        assert_eq!(report.metadata.source.as_deref(), Some("analysis.json"));
        assert!(report.metadata.record_id.is_none());
    }

    #[test]
    fn test_breakdown_weights_sum_with_baseline() {
        let rescored = rescore(&RfpAnalysis::default(), &CompanyProfile::default()).unwrap();
        let report = ScoreReport::from_rescored(&rescored, None);
        let weights: u32 = report
            .score_breakdown
            .iter()
            .map(|c| u32::from(c.weight_percent))
            .sum();
        assert_eq!(weights, 90);
        assert_eq!(report.summary.title, "Untitled solicitation");
    }
}
