//! Client for the hosted AI extraction service

use crate::config::Config;
use crate::error::{Result, RfpAlignerError};
use crate::llm::analysis::RfpAnalysis;
use crate::processing::profile::CompanyProfile;
use log::{debug, info};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub rfp_text: String,
    pub company_profile: CompanyProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub id: String,
    pub analysis: RfpAnalysis,
}

/// Turns solicitation text plus a company profile into a stored, structured
/// analysis. Implementations are opaque to the scoring pipeline.
pub trait ExtractionService {
    fn analyze(
        &self,
        request: &ExtractionRequest,
    ) -> impl std::future::Future<Output = Result<ExtractionResponse>> + Send;
}

pub struct HttpExtractionService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpExtractionService {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.service.endpoint.clone(),
            config.api_key(),
            Duration::from_secs(config.service.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ExtractionService for HttpExtractionService {
    async fn analyze(&self, request: &ExtractionRequest) -> Result<ExtractionResponse> {
        let start = Instant::now();
        info!(
            "Requesting RFP analysis for {} ({} characters)",
            request.company_profile.company_name,
            request.rfp_text.chars().count()
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RfpAlignerError::Service(format!(
                "HTTP {}: {}",
                status,
                truncate_body(&body, 300)
            )));
        }

        debug!("Extraction service responded in {}ms", start.elapsed().as_millis());
        parse_response(&body)
    }
}

/// Decode and sanity-check a service response body
pub fn parse_response(body: &str) -> Result<ExtractionResponse> {
    let response: ExtractionResponse = serde_json::from_str(body)
        .map_err(|e| RfpAlignerError::Service(format!("Malformed analysis response: {}", e)))?;

    if response.id.trim().is_empty() {
        return Err(RfpAlignerError::Service(
            "Analysis response is missing a record id".to_string(),
        ));
    }

    Ok(response)
}

fn truncate_body(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        body.to_string()
    } else {
        format!("{}...", body.chars().take(max_chars).collect::<String>())
    }
}
