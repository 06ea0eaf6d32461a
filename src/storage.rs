//! Persistence of scored analyses

use crate::error::{Result, RfpAlignerError};
use crate::llm::analysis::RfpAnalysis;
use crate::processing::scoring::ComputedScores;
use log::{debug, info};
use serde_json::{json, Map, Value};
use std::future::Future;
use std::path::{Path, PathBuf};

pub trait RecordStore {
    /// Persist `analysis` with its `scores` replaced and its bid brief
    /// scorecard updated from `scores`. Saving the same inputs twice leaves
    /// the same record.
    fn save_scored_analysis(
        &self,
        id: &str,
        scores: &ComputedScores,
        analysis: &RfpAnalysis,
    ) -> impl Future<Output = Result<()>> + Send;

    fn load(&self, id: &str) -> impl Future<Output = Result<Option<Value>>> + Send;
}

/// Overwrite provisional scores and merge the scorecard into the brief.
///
/// Existing brief keys and other scorecard keys survive. A brief that is
/// not an object is replaced by one.
pub fn apply_scores(analysis: &RfpAnalysis, scores: &ComputedScores) -> Result<RfpAnalysis> {
    let mut updated = analysis.clone();
    updated.scores = Some(serde_json::to_value(scores)?);

    let mut brief = match std::mem::take(&mut updated.bid_brief) {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };

    let scorecard = brief
        .entry("scorecard")
        .or_insert_with(|| Value::Object(Map::new()));
    if !scorecard.is_object() {
        *scorecard = Value::Object(Map::new());
    }
    if let Value::Object(card) = scorecard {
        card.insert("overall_match_score".to_string(), json!(scores.overall_match_score));
        card.insert(
            "readiness_level".to_string(),
            serde_json::to_value(scores.readiness_level)?,
        );
    }

    updated.bid_brief = Value::Object(brief);
    Ok(updated)
}

/// One pretty-printed JSON document per record under a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.root.join(format!("{}.json", id)))
    }
}

impl RecordStore for JsonFileStore {
    async fn save_scored_analysis(
        &self,
        id: &str,
        scores: &ComputedScores,
        analysis: &RfpAnalysis,
    ) -> Result<()> {
        let path = self.record_path(id)?;
        let record = apply_scores(analysis, scores)?;
        let content = serde_json::to_string_pretty(&record)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| storage_error(&self.root, e))?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| storage_error(&path, e))?;

        info!("Saved scored analysis {} to {}", id, path.display());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Value>> {
        let path = self.record_path(id)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No stored record at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(storage_error(&path, e)),
        };

        Ok(Some(serde_json::from_str(&raw)?))
    }
}

fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RfpAlignerError::Storage(format!("Invalid record id '{}'", id)))
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> RfpAlignerError {
    RfpAlignerError::Storage(format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::scoring::ReadinessLevel;
    use tempfile::TempDir;

    fn scores() -> ComputedScores {
        ComputedScores {
            naics_alignment_score: 100,
            certification_alignment_score: 100,
            capability_alignment_score: 100,
            past_performance_alignment_score: 75,
            overall_match_score: 95,
            readiness_level: ReadinessLevel::High,
        }
    }

    #[test]
    fn test_apply_scores_replaces_provisional_scores() {
        let analysis = RfpAnalysis::from_json(
            r#"{"scores": {"overall_match_score": 12, "confidence": "low"}}"#,
        )
        .unwrap();
        let updated = apply_scores(&analysis, &scores()).unwrap();

        let stored = updated.scores.unwrap();
        assert_eq!(stored["overall_match_score"], 95);
        assert_eq!(stored["readiness_level"], "High");
        assert!(stored.get("confidence").is_none());
    }

    #[test]
    fn test_apply_scores_merges_brief() {
        let analysis = RfpAnalysis::from_json(
            r#"{"bid_brief": {
                "summary": "Go",
                "scorecard": {"overall_match_score": 40, "notes": "keep me"}
            }}"#,
        )
        .unwrap();
        let updated = apply_scores(&analysis, &scores()).unwrap();

        assert_eq!(updated.bid_brief["summary"], "Go");
        assert_eq!(updated.bid_brief["scorecard"]["notes"], "keep me");
        assert_eq!(updated.bid_brief["scorecard"]["overall_match_score"], 95);
        assert_eq!(updated.bid_brief["scorecard"]["readiness_level"], "High");
    }

    #[test]
    fn test_apply_scores_replaces_non_object_brief() {
        let analysis = RfpAnalysis::from_json(r#"{"bid_brief": "pending"}"#).unwrap();
        let updated = apply_scores(&analysis, &scores()).unwrap();
        assert_eq!(
            updated.bid_brief,
            json!({"scorecard": {"overall_match_score": 95, "readiness_level": "High"}})
        );

        let missing = apply_scores(&RfpAnalysis::default(), &scores()).unwrap();
        assert_eq!(missing.bid_brief["scorecard"]["overall_match_score"], 95);
    }

    #[test]
    fn test_apply_scores_is_idempotent() {
        let analysis = RfpAnalysis::from_json(
            r#"{"bid_brief": {"summary": "Go"}, "evaluation_criteria": ["Technical"]}"#,
        )
        .unwrap();
        let once = apply_scores(&analysis, &scores()).unwrap();
        let twice = apply_scores(&once, &scores()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.extra["evaluation_criteria"], json!(["Technical"]));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("records"));
        let analysis = RfpAnalysis::from_json(r#"{"custom_section": {"a": 1}}"#).unwrap();

        store.save_scored_analysis("rfp_001", &scores(), &analysis).await.unwrap();
        store.save_scored_analysis("rfp_001", &scores(), &analysis).await.unwrap();

        let record = store.load("rfp_001").await.unwrap().unwrap();
        assert_eq!(record["scores"]["overall_match_score"], 95);
        assert_eq!(record["custom_section"]["a"], 1);
        assert!(dir.path().join("records/rfp_001.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load("nothing-here").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_ids() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        for id in ["../escape", "a/b", "", "rfp.1"] {
            let result = store
                .save_scored_analysis(id, &scores(), &RfpAnalysis::default())
                .await;
            assert!(matches!(result, Err(RfpAlignerError::Storage(_))), "id {:?}", id);
        }
    }
}
