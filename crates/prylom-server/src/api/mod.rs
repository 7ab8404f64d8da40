mod area;
mod captures;
mod clusters;
mod geocode;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use prylom_analysis::ConfiguredAnalyzer;
use prylom_core::LocatedListing;
use prylom_geocode::{ClusterBuilder, GeocodeError, NominatimClient};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};
use crate::sessions::CaptureStore;

#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<Vec<LocatedListing>>,
    /// Owns the geocoder (and its rate limiter) plus the session cache.
    pub clusters: Arc<ClusterBuilder<NominatimClient>>,
    pub analyzer: Arc<ConfiguredAnalyzer>,
    pub captures: CaptureStore,
}

impl AppState {
    #[must_use]
    pub fn new(
        listings: Vec<LocatedListing>,
        clusters: ClusterBuilder<NominatimClient>,
        analyzer: ConfiguredAnalyzer,
        capture_idle_ttl: Duration,
    ) -> Self {
        Self {
            listings: Arc::new(listings),
            clusters: Arc::new(clusters),
            analyzer: Arc::new(analyzer),
            captures: CaptureStore::new(capture_idle_ttl),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    analysis: &'static str,
    listings: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn ok<T: Serialize>(req_id: RequestId, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) fn map_geocode_error(request_id: String, error: &GeocodeError) -> ApiError {
    match error {
        GeocodeError::RateLimited { retry_after_secs } => ApiError::new(
            request_id,
            "rate_limited",
            format!("geocoding service is rate limiting; retry in {retry_after_secs}s"),
        ),
        _ => {
            tracing::error!(error = %error, "geocoding request failed");
            ApiError::new(request_id, "upstream_error", "geocoding service request failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn api_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/area", post(area::compute_area))
        .route("/api/v1/geocode/search", get(geocode::search_place))
        .route("/api/v1/geocode/reverse", get(geocode::reverse_place))
        .route("/api/v1/clusters", get(clusters::list_clusters))
        .route("/api/v1/captures", post(captures::create_capture))
        .route(
            "/api/v1/captures/{id}",
            get(captures::get_capture).delete(captures::delete_capture),
        )
        .route(
            "/api/v1/captures/{id}/clicks",
            post(captures::register_click),
        )
        .route("/api/v1/captures/{id}/mode", put(captures::set_mode))
        .route(
            "/api/v1/captures/{id}/geometry",
            delete(captures::clear_capture),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(api_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let data = HealthData {
        status: "ok",
        analysis: if state.analyzer.is_enabled() {
            "enabled"
        } else {
            "disabled"
        },
        listings: state.listings.len(),
    };
    (StatusCode::OK, ok(req_id, data))
}
