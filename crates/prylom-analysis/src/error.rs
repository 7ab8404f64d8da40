use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("analysis service returned {status} for model {model}")]
    UnexpectedStatus { status: u16, model: String },

    #[error("analysis service rate limited; retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("analysis service returned no candidate text")]
    EmptyResponse,

    #[error("site analysis is not configured (no API key)")]
    NotConfigured,

    #[error("invalid analysis base URL {base_url}: {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
