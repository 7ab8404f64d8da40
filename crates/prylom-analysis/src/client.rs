//! Generative-language API client for site analysis.

use std::time::Duration;

use prylom_core::AppConfig;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::prompt::build_site_prompt;
use crate::report::SiteReport;
use crate::request::SiteAnalysisRequest;
use crate::SiteAnalyzer;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Client for the `models/{model}:generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    base_url: Url,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a client against the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, AnalysisError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (tests, proxies).
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`AnalysisError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AnalysisError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` and returns the first candidate's text.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::RateLimited`] on HTTP 429.
    /// - [`AnalysisError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`AnalysisError::Http`] on network failure.
    /// - [`AnalysisError::Deserialize`] if the envelope is malformed.
    /// - [`AnalysisError::EmptyResponse`] if no candidate carries text.
    pub async fn generate_json(&self, prompt: &str) -> Result<String, AnalysisError> {
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(AnalysisError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(AnalysisError::UnexpectedStatus {
                status: status.as_u16(),
                model: self.model.clone(),
            });
        }

        let body = response.text().await?;
        let envelope: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| AnalysisError::Deserialize {
                context: format!("generateContent response ({})", self.model),
                source: e,
            })?;

        envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(AnalysisError::EmptyResponse)
    }

    /// Asks for a site report on `request`.
    ///
    /// # Errors
    ///
    /// Everything [`generate_json`](Self::generate_json) returns, plus
    /// [`AnalysisError::Deserialize`] if the text is not a JSON object.
    pub async fn analyze_site(
        &self,
        request: &SiteAnalysisRequest,
    ) -> Result<SiteReport, AnalysisError> {
        let prompt = build_site_prompt(request);
        let text = self.generate_json(&prompt).await?;

        let report = SiteReport::from_json(strip_code_fences(&text)).map_err(|e| {
            AnalysisError::Deserialize {
                context: "site report".to_string(),
                source: e,
            }
        })?;

        tracing::debug!(
            model = %self.model,
            lat = request.anchor.latitude,
            lng = request.anchor.longitude,
            is_polygon = request.is_polygon(),
            municipality = report.municipality.as_deref().unwrap_or("-"),
            "site analysis received"
        );
        Ok(report)
    }

    fn endpoint(&self) -> Url {
        let action = format!("{}:generateContent", self.model);
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map(|mut segments| {
                segments
                    .pop_if_empty()
                    .extend(["v1beta", "models", action.as_str()]);
            })
            .ok();
        url
    }
}

impl SiteAnalyzer for GeminiClient {
    async fn analyze(&self, request: &SiteAnalysisRequest) -> Result<SiteReport, AnalysisError> {
        self.analyze_site(request).await
    }
}

/// The analyzer selected by configuration.
pub enum ConfiguredAnalyzer {
    Gemini(GeminiClient),
    /// No API key: every request reports [`AnalysisError::NotConfigured`].
    Disabled,
}

impl ConfiguredAnalyzer {
    /// # Errors
    ///
    /// Returns an error if an API key is set but the client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        match config.analysis_api_key.as_deref() {
            Some(key) => Ok(Self::Gemini(GeminiClient::with_base_url(
                key,
                &config.analysis_model,
                config.analysis_timeout_secs,
                &config.analysis_base_url,
            )?)),
            None => {
                tracing::warn!("PRYLOM_ANALYSIS_API_KEY not set; site analysis disabled");
                Ok(Self::Disabled)
            }
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Gemini(_))
    }
}

impl SiteAnalyzer for ConfiguredAnalyzer {
    async fn analyze(&self, request: &SiteAnalysisRequest) -> Result<SiteReport, AnalysisError> {
        match self {
            Self::Gemini(client) => client.analyze_site(request).await,
            Self::Disabled => Err(AnalysisError::NotConfigured),
        }
    }
}

/// Removes a surrounding Markdown code fence (```` ```json ... ``` ````).
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line. A one-line fence
    // carries the body right after it.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
