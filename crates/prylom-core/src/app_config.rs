use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub listings_path: PathBuf,
    pub geocoder_base_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_timeout_secs: u64,
    /// Minimum spacing between outbound geocoder requests.
    pub geocoder_min_interval_ms: u64,
    /// Appended to cluster queries, e.g. `"Sorriso, MT, Brasil"`.
    pub geocoder_country_label: String,
    /// `countrycodes` filter for free-text place search.
    pub geocoder_country_codes: String,
    /// Site analysis is disabled when no key is configured.
    pub analysis_api_key: Option<String>,
    pub analysis_base_url: String,
    pub analysis_model: String,
    pub analysis_timeout_secs: u64,
    pub rate_limit_per_minute: usize,
    /// Server capture sessions untouched for this long are dropped.
    pub capture_idle_ttl_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("listings_path", &self.listings_path)
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("geocoder_user_agent", &self.geocoder_user_agent)
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .field("geocoder_min_interval_ms", &self.geocoder_min_interval_ms)
            .field("geocoder_country_label", &self.geocoder_country_label)
            .field("geocoder_country_codes", &self.geocoder_country_codes)
            .field(
                "analysis_api_key",
                &self.analysis_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("analysis_base_url", &self.analysis_base_url)
            .field("analysis_model", &self.analysis_model)
            .field("analysis_timeout_secs", &self.analysis_timeout_secs)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("capture_idle_ttl_secs", &self.capture_idle_ttl_secs)
            .finish()
    }
}
