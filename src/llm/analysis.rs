//! Structured RFP analysis returned by the AI extraction service
//!
//! Everything in here is untrusted model output. Sections and lists may be
//! missing, `null`, or the wrong shape; the deserializers below coerce what
//! they can and drop the rest instead of failing the whole document. Fields
//! the scoring engine does not read are kept verbatim in `extra` maps so they
//! are written back to storage unchanged.

use log::warn;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfpAnalysis {
    #[serde(
        default,
        deserialize_with = "lenient_section",
        serialize_with = "section_or_original"
    )]
    pub opportunity: Opportunity,

    #[serde(
        default,
        deserialize_with = "lenient_section",
        serialize_with = "section_or_original"
    )]
    pub requirements: Requirements,

    /// Provisional scores embedded by the AI; replaced before persisting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Value>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub bid_brief: Value,

    /// evaluation_criteria, match_analysis, partner_recommendations and
    /// anything else the service sends
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(default, deserialize_with = "naics_list")]
    pub naics_codes: Vec<String>,

    /// Kept as sent; read through `place_of_performance()`
    #[serde(
        default,
        rename = "place_of_performance",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_place_of_performance: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(skip)]
    original: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default, deserialize_with = "string_list")]
    pub technical_requirements: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub experience_requirements: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub required_certifications: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub compliance_requirements: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(skip)]
    original: Option<Value>,
}

/// A section that could not be read as an object keeps the value it arrived
/// with, and that value is what gets written back.
trait LenientSection: Default {
    fn malformed(original: Value) -> Self;
    fn original(&self) -> Option<&Value>;
}

impl LenientSection for Opportunity {
    fn malformed(original: Value) -> Self {
        Self {
            original: Some(original),
            ..Self::default()
        }
    }

    fn original(&self) -> Option<&Value> {
        self.original.as_ref()
    }
}

impl LenientSection for Requirements {
    fn malformed(original: Value) -> Self {
        Self {
            original: Some(original),
            ..Self::default()
        }
    }

    fn original(&self) -> Option<&Value> {
        self.original.as_ref()
    }
}

/// Strengths, gaps and risk flags as reported by the AI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub risk_flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerRecommendation {
    pub name: String,
    pub rationale: Option<String>,
}

impl Opportunity {
    pub fn place_of_performance(&self) -> Option<String> {
        self.raw_place_of_performance.as_ref().and_then(coerce_scalar)
    }

    pub fn title(&self) -> Option<&str> {
        text_field(&self.extra, &["title", "name"])
    }

    pub fn agency(&self) -> Option<&str> {
        text_field(&self.extra, &["agency", "department"])
    }

    pub fn solicitation_number(&self) -> Option<&str> {
        text_field(&self.extra, &["solicitation_number", "notice_id"])
    }

    pub fn due_date(&self) -> Option<&str> {
        text_field(&self.extra, &["due_date", "response_deadline"])
    }

    pub fn set_aside(&self) -> Option<&str> {
        text_field(&self.extra, &["set_aside"])
    }
}

impl RfpAnalysis {
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn match_analysis(&self) -> MatchAnalysis {
        let section = self.extra.get("match_analysis");
        let list = |key: &str| {
            section
                .and_then(|s| s.get(key))
                .map(coerce_string_list)
                .unwrap_or_default()
        };

        MatchAnalysis {
            strengths: list("strengths"),
            gaps: list("gaps"),
            risk_flags: list("risk_flags"),
        }
    }

    pub fn partner_recommendations(&self) -> Vec<PartnerRecommendation> {
        let entries = match self.extra.get("partner_recommendations") {
            Some(Value::Array(entries)) => entries,
            _ => return Vec::new(),
        };

        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) if !name.trim().is_empty() => Some(PartnerRecommendation {
                    name: name.trim().to_string(),
                    rationale: None,
                }),
                Value::Object(fields) => {
                    let name = text_field(fields, &["company_name", "name"])?;
                    Some(PartnerRecommendation {
                        name: name.to_string(),
                        rationale: text_field(fields, &["rationale", "reason"]).map(str::to_string),
                    })
                }
                _ => None,
            })
            .collect()
    }
}

fn text_field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Coerce an arbitrary JSON value into a list of trimmed, non-blank strings.
pub fn coerce_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(coerce_scalar).collect(),
        other => coerce_scalar(other).into_iter().collect(),
    }
}

fn coerce_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn naics_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(\d{6})\b").expect("valid NAICS pattern"))
}

/// Reduce a model-written label such as `"541512 - Computer Systems Design"`
/// to its six-digit code; labels without one are returned trimmed.
pub fn normalize_naics(raw: &str) -> String {
    naics_pattern()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_string_list(&value))
}

fn naics_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_string_list(&value)
        .iter()
        .map(|code| normalize_naics(code))
        .collect())
}

fn lenient_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + LenientSection,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    if !value.is_object() {
        warn!("Ignoring malformed analysis section: expected an object");
        return Ok(T::malformed(value));
    }

    match serde_json::from_value(value.clone()) {
        Ok(section) => Ok(section),
        Err(e) => {
            warn!("Ignoring malformed analysis section: {}", e);
            Ok(T::malformed(value))
        }
    }
}

fn section_or_original<S, T>(section: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + LenientSection,
{
    match section.original() {
        Some(original) => original.serialize(serializer),
        None => section.serialize(serializer),
    }
}
