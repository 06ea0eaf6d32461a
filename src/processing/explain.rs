//! Human-readable breakdown of what drove each sub-score

use crate::processing::profile::{CompanyForScoring, RfpForScoring};
use crate::processing::scoring::{naics_listed, TagMatcher};
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

const NEAR_MISS_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NaicsMatch {
    NoConstraint,
    Primary,
    Secondary,
    None,
}

/// A missing certification that looks like one the company already holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearMiss {
    pub required: String,
    pub held: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreExplanation {
    pub naics_match: NaicsMatch,
    /// The solicitation code that produced a primary or secondary match
    pub matched_naics: Option<String>,
    pub matched_certifications: Vec<String>,
    pub missing_certifications: Vec<String>,
    pub near_misses: Vec<NearMiss>,
    pub matched_requirements: Vec<String>,
    pub unmatched_requirements: Vec<String>,
    pub past_performance_hits: Vec<String>,
}

pub fn explain(company: &CompanyForScoring, rfp: &RfpForScoring) -> ScoreExplanation {
    let (naics_match, matched_naics) = classify_naics(company, rfp);

    let (matched_certifications, missing_certifications): (Vec<String>, Vec<String>) = rfp
        .required_certifications
        .iter()
        .cloned()
        .partition(|required| company.certifications.contains(required));

    let near_misses = missing_certifications
        .iter()
        .filter_map(|required| closest_held(required, &company.certifications))
        .collect();

    let matcher = TagMatcher::new(&company.capabilities);
    let (matched_requirements, unmatched_requirements): (Vec<String>, Vec<String>) = rfp
        .technical_requirements
        .iter()
        .cloned()
        .partition(|requirement| matcher.matches(requirement));

    let experience_text = rfp.experience_requirements.join(" ");
    let past_performance_hits =
        TagMatcher::matching_indices(&company.past_performance_tags, &experience_text)
            .into_iter()
            .map(|index| company.past_performance_tags[index].clone())
            .collect();

    ScoreExplanation {
        naics_match,
        matched_naics,
        matched_certifications,
        missing_certifications,
        near_misses,
        matched_requirements,
        unmatched_requirements,
        past_performance_hits,
    }
}

fn classify_naics(company: &CompanyForScoring, rfp: &RfpForScoring) -> (NaicsMatch, Option<String>) {
    if rfp.naics_codes.is_empty() {
        return (NaicsMatch::NoConstraint, None);
    }
    if naics_listed(&rfp.naics_codes, &company.primary_naics) {
        return (NaicsMatch::Primary, Some(company.primary_naics.clone()));
    }
    match company
        .secondary_naics
        .iter()
        .find(|code| naics_listed(&rfp.naics_codes, code))
    {
        Some(code) => (NaicsMatch::Secondary, Some(code.clone())),
        None => (NaicsMatch::None, None),
    }
}

fn closest_held(required: &str, held: &[String]) -> Option<NearMiss> {
    let target = required.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }

    held.iter()
        .map(|label| (label, jaro_winkler(&target, &label.trim().to_lowercase())))
        .filter(|(_, similarity)| *similarity >= NEAR_MISS_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, similarity)| NearMiss {
            required: required.to_string(),
            held: label.clone(),
            similarity,
        })
}
