//! Site analysis for captured points and polygons.
//!
//! [`GeminiClient`] asks a generative-language service for an agronomic
//! profile of a location and parses the loosely-shaped JSON it returns into
//! a [`SiteReport`] whose fields are all independently optional.
//! [`ConfiguredAnalyzer`] picks the client, or a disabled stand-in when no
//! API key is configured.

pub mod client;
pub mod error;
pub mod prompt;
pub mod report;
pub mod request;

use std::future::Future;

pub use client::{ConfiguredAnalyzer, GeminiClient};
pub use error::AnalysisError;
pub use prompt::build_site_prompt;
pub use report::{
    ClimateProfile, LogisticsProfile, MarketProfile, RiskLevel, SiteReport, TerritorialRisk,
};
pub use request::SiteAnalysisRequest;

/// Produces a [`SiteReport`] for a captured location.
pub trait SiteAnalyzer: Send + Sync + 'static {
    fn analyze(
        &self,
        request: &SiteAnalysisRequest,
    ) -> impl Future<Output = Result<SiteReport, AnalysisError>> + Send;
}
