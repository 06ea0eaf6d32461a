//! Company and solicitation views consumed by the scoring engine

use crate::error::{Result, RfpAlignerError};
use crate::llm::analysis::RfpAnalysis;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Company record as sent to the extraction service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub primary_naics: String,
    #[serde(default)]
    pub secondary_naics: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub past_performance_tags: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyForScoring {
    /// Empty means unset and matches nothing
    pub primary_naics: String,
    pub secondary_naics: Vec<String>,
    pub certifications: Vec<String>,
    pub capabilities: Vec<String>,
    pub past_performance_tags: Vec<String>,
    /// Reserved; not used by any score yet
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfpForScoring {
    pub naics_codes: Vec<String>,
    pub required_certifications: Vec<String>,
    pub technical_requirements: Vec<String>,
    pub experience_requirements: Vec<String>,
    pub compliance_requirements: Vec<String>,
    pub place_of_performance: Option<String>,
}

impl CompanyProfile {
    pub fn from_json(raw: &str) -> Result<Self> {
        let profile: CompanyProfile = serde_json::from_str(raw)?;
        Ok(profile)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            RfpAlignerError::InvalidInput(format!(
                "Cannot read company profile '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    pub fn for_scoring(&self) -> CompanyForScoring {
        CompanyForScoring::from(self)
    }
}

impl From<&CompanyProfile> for CompanyForScoring {
    fn from(profile: &CompanyProfile) -> Self {
        Self {
            primary_naics: profile.primary_naics.trim().to_string(),
            secondary_naics: profile
                .secondary_naics
                .iter()
                .map(|code| code.trim().to_string())
                .collect(),
            certifications: profile.certifications.clone(),
            capabilities: profile.capabilities.clone(),
            past_performance_tags: profile.past_performance_tags.clone(),
            location: profile.location.clone(),
        }
    }
}

impl From<&RfpAnalysis> for RfpForScoring {
    fn from(analysis: &RfpAnalysis) -> Self {
        let requirements = &analysis.requirements;
        Self {
            naics_codes: analysis.opportunity.naics_codes.clone(),
            required_certifications: requirements.required_certifications.clone(),
            technical_requirements: requirements.technical_requirements.clone(),
            experience_requirements: requirements.experience_requirements.clone(),
            compliance_requirements: requirements.compliance_requirements.clone(),
            place_of_performance: analysis.opportunity.place_of_performance(),
        }
    }
}
