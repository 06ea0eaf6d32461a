//! Deterministic company-to-solicitation match scoring
//!
//! Every function here is pure: the same company and solicitation always
//! produce the same scores. Empty inputs take the neutral-default branches
//! instead of failing. Scores are whole percentages, rounded half-up and
//! clamped to 0..=100 using integer arithmetic so boundary values never
//! drift with floating point error.

use crate::processing::profile::{CompanyForScoring, RfpForScoring};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NAICS_NO_CONSTRAINT: u8 = 70;
pub const NAICS_PRIMARY_MATCH: u8 = 100;
pub const NAICS_SECONDARY_MATCH: u8 = 75;
pub const NAICS_NO_MATCH: u8 = 40;

pub const CERTIFICATIONS_NONE_REQUIRED: u8 = 70;
pub const CAPABILITIES_NO_REQUIREMENTS: u8 = 60;

pub const PAST_PERFORMANCE_NO_TAGS: u8 = 50;
pub const PAST_PERFORMANCE_MATCH: u8 = 75;
pub const PAST_PERFORMANCE_NO_MATCH: u8 = 55;

/// Overall weights in tenths of a percent: 0.20, 0.30, 0.20, 0.20
const NAICS_WEIGHT_TENTHS: u32 = 2;
const CERTIFICATION_WEIGHT_TENTHS: u32 = 3;
const CAPABILITY_WEIGHT_TENTHS: u32 = 2;
const PAST_PERFORMANCE_WEIGHT_TENTHS: u32 = 2;
/// Fixed +10 baseline credit, in tenths
const BASELINE_TENTHS: u32 = 100;

pub const HIGH_READINESS_MIN: u8 = 75;
pub const MEDIUM_READINESS_MIN: u8 = 55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessLevel::Low => write!(f, "Low"),
            ReadinessLevel::Medium => write!(f, "Medium"),
            ReadinessLevel::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedScores {
    pub naics_alignment_score: u8,
    pub certification_alignment_score: u8,
    pub capability_alignment_score: u8,
    pub past_performance_alignment_score: u8,
    pub overall_match_score: u8,
    pub readiness_level: ReadinessLevel,
}

/// Compute all sub-scores, the weighted overall score and the readiness tier.
pub fn compute_scores(company: &CompanyForScoring, rfp: &RfpForScoring) -> ComputedScores {
    let naics = naics_score(company, rfp);
    let certifications = certification_score(company, rfp);
    let capabilities = capability_score(company, rfp);
    let past_performance = past_performance_score(company, rfp);
    let overall = overall_score(naics, certifications, capabilities, past_performance);

    ComputedScores {
        naics_alignment_score: naics,
        certification_alignment_score: certifications,
        capability_alignment_score: capabilities,
        past_performance_alignment_score: past_performance,
        overall_match_score: overall,
        readiness_level: readiness_level(overall),
    }
}

pub fn naics_score(company: &CompanyForScoring, rfp: &RfpForScoring) -> u8 {
    if rfp.naics_codes.is_empty() {
        return NAICS_NO_CONSTRAINT;
    }

    if naics_listed(&rfp.naics_codes, &company.primary_naics) {
        NAICS_PRIMARY_MATCH
    } else if company
        .secondary_naics
        .iter()
        .any(|code| naics_listed(&rfp.naics_codes, code))
    {
        NAICS_SECONDARY_MATCH
    } else {
        NAICS_NO_MATCH
    }
}

/// Exact membership; an empty code is unset and matches nothing.
pub(crate) fn naics_listed(codes: &[String], code: &str) -> bool {
    !code.is_empty() && codes.iter().any(|listed| listed == code)
}

/// Share of required certifications held verbatim (case-sensitive).
pub fn certification_score(company: &CompanyForScoring, rfp: &RfpForScoring) -> u8 {
    if rfp.required_certifications.is_empty() {
        return CERTIFICATIONS_NONE_REQUIRED;
    }

    let matched = rfp
        .required_certifications
        .iter()
        .filter(|required| company.certifications.contains(required))
        .count();

    percent(matched, rfp.required_certifications.len())
}

/// Share of technical requirement statements that mention at least one
/// company capability, case-insensitively.
pub fn capability_score(company: &CompanyForScoring, rfp: &RfpForScoring) -> u8 {
    if rfp.technical_requirements.is_empty() {
        return CAPABILITIES_NO_REQUIREMENTS;
    }

    let matcher = TagMatcher::new(&company.capabilities);
    let covered = rfp
        .technical_requirements
        .iter()
        .filter(|requirement| matcher.matches(requirement))
        .count();

    percent(covered, rfp.technical_requirements.len())
}

/// Binary signal: does any past-performance tag appear in the combined
/// experience requirements?
pub fn past_performance_score(company: &CompanyForScoring, rfp: &RfpForScoring) -> u8 {
    if company.past_performance_tags.is_empty() {
        return PAST_PERFORMANCE_NO_TAGS;
    }

    let experience_text = rfp.experience_requirements.join(" ");
    if TagMatcher::new(&company.past_performance_tags).matches(&experience_text) {
        PAST_PERFORMANCE_MATCH
    } else {
        PAST_PERFORMANCE_NO_MATCH
    }
}

/// `naics*0.20 + certifications*0.30 + capabilities*0.20 + past*0.20 + 10`
pub fn overall_score(naics: u8, certifications: u8, capabilities: u8, past_performance: u8) -> u8 {
    let tenths = NAICS_WEIGHT_TENTHS * u32::from(naics)
        + CERTIFICATION_WEIGHT_TENTHS * u32::from(certifications)
        + CAPABILITY_WEIGHT_TENTHS * u32::from(capabilities)
        + PAST_PERFORMANCE_WEIGHT_TENTHS * u32::from(past_performance)
        + BASELINE_TENTHS;

    ((tenths + 5) / 10).min(100) as u8
}

pub fn readiness_level(overall: u8) -> ReadinessLevel {
    if overall >= HIGH_READINESS_MIN {
        ReadinessLevel::High
    } else if overall >= MEDIUM_READINESS_MIN {
        ReadinessLevel::Medium
    } else {
        ReadinessLevel::Low
    }
}

/// `round(100 * numerator / denominator)`, half-up, clamped to 100.
fn percent(numerator: usize, denominator: usize) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let numerator = numerator as u64;
    let denominator = denominator as u64;
    ((numerator * 200 + denominator) / (denominator * 2)).min(100) as u8
}

/// Case-insensitive "does any tag occur in this text" matcher.
///
/// Both tags and text are lowercased before comparison and otherwise kept
/// verbatim, surrounding whitespace included. Empty tags are ignored since an
/// empty needle would match every text.
pub(crate) struct TagMatcher {
    tags: Vec<String>,
    automaton: Option<AhoCorasick>,
}

impl TagMatcher {
    pub(crate) fn new<S: AsRef<str>>(tags: &[S]) -> Self {
        let tags: Vec<String> = tags
            .iter()
            .map(|tag| tag.as_ref().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        let automaton = AhoCorasick::new(&tags).ok();

        Self { tags, automaton }
    }

    pub(crate) fn matches(&self, text: &str) -> bool {
        if self.tags.is_empty() {
            return false;
        }

        let haystack = text.to_lowercase();
        match &self.automaton {
            Some(automaton) => automaton.is_match(&haystack),
            None => self.tags.iter().any(|tag| haystack.contains(tag.as_str())),
        }
    }

    /// Indices of the tags that occur in `text`, in tag order.
    pub(crate) fn matching_indices<S: AsRef<str>>(original: &[S], text: &str) -> Vec<usize> {
        let haystack = text.to_lowercase();
        original
            .iter()
            .enumerate()
            .filter(|(_, tag)| {
                let needle = tag.as_ref().to_lowercase();
                !needle.is_empty() && haystack.contains(&needle)
            })
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn company(primary: &str, secondary: &[&str]) -> CompanyForScoring {
        CompanyForScoring {
            primary_naics: primary.to_string(),
            secondary_naics: strings(secondary),
            ..CompanyForScoring::default()
        }
    }

    fn rfp_with_naics(codes: &[&str]) -> RfpForScoring {
        RfpForScoring {
            naics_codes: strings(codes),
            ..RfpForScoring::default()
        }
    }

    #[test]
    fn test_naics_no_constraint_is_neutral() {
        let rfp = rfp_with_naics(&[]);
        assert_eq!(naics_score(&company("541512", &["541519"]), &rfp), 70);
        assert_eq!(naics_score(&company("", &[]), &rfp), 70);
    }

    #[test]
    fn test_naics_primary_match() {
        let rfp = rfp_with_naics(&["541330", "541512"]);
        assert_eq!(naics_score(&company("541512", &[]), &rfp), 100);
        // primary wins even when a secondary also matches
        assert_eq!(naics_score(&company("541512", &["541330"]), &rfp), 100);
    }

    #[test]
    fn test_naics_secondary_match() {
        let rfp = rfp_with_naics(&["541519"]);
        assert_eq!(naics_score(&company("541512", &["236220", "541519"]), &rfp), 75);
    }

    #[test]
    fn test_empty_primary_never_matches() {
        let rfp = rfp_with_naics(&["", "541512"]);
        assert_eq!(naics_score(&company("", &[""]), &rfp), 40);
    }

    #[test]
    fn test_naics_no_overlap() {
        let rfp = rfp_with_naics(&["236220"]);
        assert_eq!(naics_score(&company("541512", &["541519"]), &rfp), 40);
        assert_eq!(naics_score(&company("", &[]), &rfp), 40);
    }

    #[test]
    fn test_certifications_exact_case_sensitive() {
        let rfp = RfpForScoring {
            required_certifications: strings(&["FedRAMP", "ISO 27001", "8(a)"]),
            ..RfpForScoring::default()
        };
        let holder = CompanyForScoring {
            certifications: strings(&["fedramp", "ISO 27001", "8(a) Program"]),
            ..CompanyForScoring::default()
        };
        // only "ISO 27001" matches verbatim: 1/3 -> 33
        assert_eq!(certification_score(&holder, &rfp), 33);
    }

    #[test]
    fn test_certifications_rounding_half_up() {
        let rfp = RfpForScoring {
            required_certifications: strings(&["A", "B", "C"]),
            ..RfpForScoring::default()
        };
        let holder = CompanyForScoring {
            certifications: strings(&["A", "B"]),
            ..CompanyForScoring::default()
        };
        assert_eq!(certification_score(&holder, &rfp), 67);

        let rfp = RfpForScoring {
            required_certifications: strings(&["A", "B", "C", "D", "E", "F", "G", "H"]),
            ..RfpForScoring::default()
        };
        let holder = CompanyForScoring {
            certifications: strings(&["A"]),
            ..CompanyForScoring::default()
        };
        // 12.5 rounds up
        assert_eq!(certification_score(&holder, &rfp), 13);
    }

    #[test]
    fn test_certifications_none_required() {
        let holder = CompanyForScoring {
            certifications: strings(&["FedRAMP"]),
            ..CompanyForScoring::default()
        };
        assert_eq!(certification_score(&holder, &RfpForScoring::default()), 70);
    }

    #[test]
    fn test_certifications_monotonic_in_matches() {
        let required = strings(&["A", "B", "C", "D", "E", "F", "G"]);
        let rfp = RfpForScoring {
            required_certifications: required.clone(),
            ..RfpForScoring::default()
        };

        let mut previous = 0;
        for held in 0..=required.len() {
            let holder = CompanyForScoring {
                certifications: required[..held].to_vec(),
                ..CompanyForScoring::default()
            };
            let score = certification_score(&holder, &rfp);
            assert!(score >= previous, "{} matched gave {} < {}", held, score, previous);
            previous = score;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn test_capabilities_count_requirement_statements() {
        let holder = CompanyForScoring {
            capabilities: strings(&["cloud"]),
            ..CompanyForScoring::default()
        };
        let rfp = RfpForScoring {
            technical_requirements: strings(&[
                "Cloud hosting in FedRAMP High",
                "Multi-cloud monitoring",
                "Help desk tier 1",
                "Records management",
            ]),
            ..RfpForScoring::default()
        };
        // one tag covers two statements: 2/4
        assert_eq!(capability_score(&holder, &rfp), 50);
    }

    #[test]
    fn test_capabilities_case_insensitive_both_sides() {
        let holder = CompanyForScoring {
            capabilities: strings(&["DevSecOps"]),
            ..CompanyForScoring::default()
        };
        let rfp = RfpForScoring {
            technical_requirements: strings(&["Provide DEVSECOPS pipelines"]),
            ..RfpForScoring::default()
        };
        assert_eq!(capability_score(&holder, &rfp), 100);
    }

    #[test]
    fn test_capabilities_defaults() {
        let holder = CompanyForScoring {
            capabilities: strings(&["Cloud Migration"]),
            ..CompanyForScoring::default()
        };
        assert_eq!(capability_score(&holder, &RfpForScoring::default()), 60);

        let rfp = RfpForScoring {
            technical_requirements: strings(&["Anything"]),
            ..RfpForScoring::default()
        };
        assert_eq!(capability_score(&CompanyForScoring::default(), &rfp), 0);
    }

    #[test]
    fn test_empty_capability_tags_match_nothing() {
        let holder = CompanyForScoring {
            capabilities: strings(&["", ""]),
            ..CompanyForScoring::default()
        };
        let rfp = RfpForScoring {
            technical_requirements: strings(&["Data analytics"]),
            ..RfpForScoring::default()
        };
        assert_eq!(capability_score(&holder, &rfp), 0);
    }

    #[test]
    fn test_tag_whitespace_is_significant() {
        let holder = CompanyForScoring {
            capabilities: strings(&["cloud "]),
            ..CompanyForScoring::default()
        };
        let rfp = RfpForScoring {
            technical_requirements: strings(&["multi-cloud, hosting"]),
            ..RfpForScoring::default()
        };
        assert_eq!(capability_score(&holder, &rfp), 0);

        let spaced = RfpForScoring {
            technical_requirements: strings(&["Cloud hosting"]),
            ..RfpForScoring::default()
        };
        assert_eq!(capability_score(&holder, &spaced), 100);
    }

    #[test]
    fn test_empty_past_performance_tag_is_a_miss() {
        let holder = CompanyForScoring {
            past_performance_tags: strings(&[""]),
            ..CompanyForScoring::default()
        };
        let rfp = RfpForScoring {
            experience_requirements: strings(&["Prior DOE work"]),
            ..RfpForScoring::default()
        };
        // the company has tags, none of which can hit
        assert_eq!(past_performance_score(&holder, &rfp), 55);
    }

    #[test]
    fn test_past_performance_any_match() {
        let holder = CompanyForScoring {
            past_performance_tags: strings(&["Navy", "doe"]),
            ..CompanyForScoring::default()
        };
        let hit = RfpForScoring {
            experience_requirements: strings(&["Two references", "Prior DOE cloud work required"]),
            ..RfpForScoring::default()
        };
        let miss = RfpForScoring {
            experience_requirements: strings(&["Prior USDA work"]),
            ..RfpForScoring::default()
        };
        assert_eq!(past_performance_score(&holder, &hit), 75);
        assert_eq!(past_performance_score(&holder, &miss), 55);
        assert_eq!(past_performance_score(&holder, &RfpForScoring::default()), 55);
    }

    #[test]
    fn test_past_performance_without_tags() {
        let rfp = RfpForScoring {
            experience_requirements: strings(&["Prior DOE cloud work required"]),
            ..RfpForScoring::default()
        };
        assert_eq!(past_performance_score(&CompanyForScoring::default(), &rfp), 50);
    }

    #[test]
    fn test_overall_formula_exact_values() {
        assert_eq!(overall_score(100, 100, 100, 75), 95);
        assert_eq!(overall_score(70, 70, 60, 50), 67);
        assert_eq!(overall_score(0, 0, 0, 0), 10);
        assert_eq!(overall_score(100, 100, 100, 100), 100);
        // 40*.2 + 5*.3 + 0 + 55*.2 + 10 = 30.5 rounds up
        assert_eq!(overall_score(40, 5, 0, 55), 31);
        // 40*.2 + 33*.3 + 0 + 50*.2 + 10 = 37.9
        assert_eq!(overall_score(40, 33, 0, 50), 38);
    }

    #[test]
    fn test_overall_bounded_and_monotonic() {
        let steps: Vec<u8> = (0..=100).step_by(10).collect();
        for &a in &steps {
            for &b in &steps {
                for &c in &steps {
                    for &d in &steps {
                        let score = overall_score(a, b, c, d);
                        assert!(score <= 100);
                        if a < 100 {
                            assert!(overall_score(a + 10, b, c, d) >= score);
                        }
                        if b < 100 {
                            assert!(overall_score(a, b + 10, c, d) >= score);
                        }
                        if c < 100 {
                            assert!(overall_score(a, b, c + 10, d) >= score);
                        }
                        if d < 100 {
                            assert!(overall_score(a, b, c, d + 10) >= score);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_readiness_boundaries() {
        assert_eq!(readiness_level(74), ReadinessLevel::Medium);
        assert_eq!(readiness_level(75), ReadinessLevel::High);
        assert_eq!(readiness_level(54), ReadinessLevel::Low);
        assert_eq!(readiness_level(55), ReadinessLevel::Medium);
        assert_eq!(readiness_level(0), ReadinessLevel::Low);
        assert_eq!(readiness_level(100), ReadinessLevel::High);
    }

    #[test]
    fn test_scenario_full_alignment() {
        let company = CompanyForScoring {
            primary_naics: "541512".to_string(),
            secondary_naics: vec![],
            certifications: strings(&["FedRAMP"]),
            capabilities: strings(&["Cloud Migration"]),
            past_performance_tags: strings(&["DOE"]),
            location: None,
        };
        let rfp = RfpForScoring {
            naics_codes: strings(&["541512"]),
            required_certifications: strings(&["FedRAMP"]),
            technical_requirements: strings(&["Must support Cloud Migration to AWS GovCloud"]),
            experience_requirements: strings(&["Prior DOE cloud work required"]),
            compliance_requirements: vec![],
            place_of_performance: None,
        };

        let scores = compute_scores(&company, &rfp);
        assert_eq!(
            scores,
            ComputedScores {
                naics_alignment_score: 100,
                certification_alignment_score: 100,
                capability_alignment_score: 100,
                past_performance_alignment_score: 75,
                overall_match_score: 95,
                readiness_level: ReadinessLevel::High,
            }
        );
    }

    #[test]
    fn test_scenario_all_empty() {
        let scores = compute_scores(&CompanyForScoring::default(), &RfpForScoring::default());
        assert_eq!(scores.naics_alignment_score, 70);
        assert_eq!(scores.certification_alignment_score, 70);
        assert_eq!(scores.capability_alignment_score, 60);
        assert_eq!(scores.past_performance_alignment_score, 50);
        assert_eq!(scores.overall_match_score, 67);
        assert_eq!(scores.readiness_level, ReadinessLevel::Medium);
    }

    #[test]
    fn test_scores_are_reproducible() {
        let company = CompanyForScoring {
            primary_naics: "541611".to_string(),
            capabilities: strings(&["acquisition support", "PMO"]),
            past_performance_tags: strings(&["GSA"]),
            ..CompanyForScoring::default()
        };
        let rfp = RfpForScoring {
            naics_codes: strings(&["541611"]),
            technical_requirements: strings(&["Stand up a PMO", "Acquisition Support for OCIO"]),
            experience_requirements: strings(&["GSA schedule experience"]),
            ..RfpForScoring::default()
        };
        assert_eq!(compute_scores(&company, &rfp), compute_scores(&company, &rfp));
    }

    #[test]
    fn test_scores_serialize_with_wire_names() {
        let scores = compute_scores(&CompanyForScoring::default(), &RfpForScoring::default());
        let json = serde_json::to_value(scores).unwrap();
        assert_eq!(json["overall_match_score"], 67);
        assert_eq!(json["readiness_level"], "Medium");
        assert_eq!(json["capability_alignment_score"], 60);
    }

    #[test]
    fn test_matching_indices() {
        let tags = strings(&["DOE", "", "cloud", "Navy", " work "]);
        assert_eq!(TagMatcher::matching_indices(&tags, "Prior doe Cloud work"), vec![0, 2]);
    }
}
