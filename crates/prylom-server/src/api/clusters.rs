use axum::{
    extract::{Query, State},
    Extension, Json,
};
use prylom_core::{filter_by_category, Category, Currency, Language};
use prylom_geocode::{cluster_bounds, ClusterPopup, GroupingMode, MapBounds, UnresolvedGroup};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ok, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ClustersQuery {
    pub mode: Option<String>,
    pub category: Option<String>,
    pub currency: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ClustersData {
    pub mode: GroupingMode,
    pub currency: Currency,
    pub popups: Vec<ClusterPopup>,
    pub bounds: Option<MapBounds>,
    pub unresolved: Vec<UnresolvedGroup>,
    pub unlocated_listings: usize,
    pub notice: Option<String>,
}

fn parse_param<T>(req_id: &str, name: &str, raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| ApiError::new(req_id, "validation_error", format!("{name}: {e}")))
        })
        .transpose()
}

/// GET /api/v1/clusters: runs a clustering pass over the catalog.
///
/// Groups the geocoder cannot place are returned under `unresolved` with a
/// user-facing `notice`; the request still succeeds.
pub(super) async fn list_clusters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ClustersQuery>,
) -> Result<Json<ApiResponse<ClustersData>>, ApiError> {
    let rid = req_id.0.as_str();
    let mode = parse_param::<GroupingMode>(rid, "mode", query.mode.as_deref())?.unwrap_or_default();
    let category = parse_param::<Category>(rid, "category", query.category.as_deref())?;
    let currency = parse_param::<Currency>(rid, "currency", query.currency.as_deref())?
        .unwrap_or_else(|| {
            Language::from_tag(query.lang.as_deref().unwrap_or_default()).default_currency()
        });

    let listings = filter_by_category(&state.listings, category);
    let pass = state.clusters.build_clusters(&listings, mode).await;

    let data = ClustersData {
        mode,
        currency,
        popups: pass
            .clusters
            .iter()
            .map(|c| ClusterPopup::from_cluster(c, currency))
            .collect(),
        bounds: cluster_bounds(&pass.clusters),
        unlocated_listings: pass.unlocated_listing_count(),
        notice: pass.notice(),
        unresolved: pass.unresolved,
    };
    Ok(ok(req_id, data))
}
