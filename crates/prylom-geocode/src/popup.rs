//! Marker popups and viewport bounds for located clusters.

use geo::{BoundingRect, MultiPoint};
use prylom_core::currency::PRICE_ON_REQUEST;
use prylom_core::{format_price_parts, Currency, GeoPoint, PriceParts};
use serde::Serialize;

use crate::cluster::ListingCluster;

/// Shown when a listing has no photo.
pub const PLACEHOLDER_THUMBNAIL: &str =
    "https://images.unsplash.com/photo-1500382017468-9049fed747ef?auto=format&fit=crop&q=80&w=100";

const MULTI_ASSET_LABEL: &str = "Múltiplos Ativos";
const SINGLE_MARKER_BADGE: &str = "P";
const DETAILS_HINT: &str = "Clique para Detalhes";

#[derive(Debug, Clone, Serialize)]
pub struct PopupRow {
    pub listing_id: String,
    pub title: String,
    /// `None` when the listing is priced on request.
    pub price: Option<PriceParts>,
    /// `price` rendered as text, or `"Sob consulta"`.
    pub price_label: String,
    pub unit: Option<String>,
    pub thumbnail_url: String,
}

/// Everything the map needs to draw one cluster marker and its popup.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterPopup {
    pub group_key: String,
    pub position: GeoPoint,
    pub badge: String,
    pub header_label: String,
    pub header_title: String,
    pub rows: Vec<PopupRow>,
    /// Listing opened when the marker itself is clicked. Multi-listing
    /// markers navigate per row instead.
    pub click_target: Option<String>,
    pub footer_hint: Option<String>,
}

impl ClusterPopup {
    #[must_use]
    pub fn from_cluster(cluster: &ListingCluster, currency: Currency) -> Self {
        let rows: Vec<PopupRow> = cluster
            .members
            .iter()
            .map(|listing| {
                let price = listing
                    .price_minor
                    .map(|minor| format_price_parts(minor, currency));
                let price_label = price
                    .as_ref()
                    .map_or_else(|| PRICE_ON_REQUEST.to_string(), ToString::to_string);
                PopupRow {
                    listing_id: listing.id.clone(),
                    title: listing.display_title.clone(),
                    price,
                    price_label,
                    unit: listing.unit.clone(),
                    thumbnail_url: listing
                        .thumbnail_url
                        .clone()
                        .unwrap_or_else(|| PLACEHOLDER_THUMBNAIL.to_string()),
                }
            })
            .collect();

        let (badge, header_label, header_title, click_target, footer_hint) =
            match cluster.members.as_slice() {
                [single] => (
                    SINGLE_MARKER_BADGE.to_string(),
                    single.category.label().to_string(),
                    single.display_title.clone(),
                    Some(single.id.clone()),
                    Some(DETAILS_HINT.to_string()),
                ),
                members => (
                    members.len().to_string(),
                    MULTI_ASSET_LABEL.to_string(),
                    format!("{}, {}", cluster.place, cluster.state),
                    None,
                    None,
                ),
            };

        Self {
            group_key: cluster.group_key.clone(),
            position: cluster.representative_point,
            badge,
            header_label,
            header_title,
            rows,
            click_target,
            footer_hint,
        }
    }
}

/// South-west and north-east corners of a map viewport.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MapBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

/// Smallest box containing every cluster's marker, for fit-to-bounds.
/// `None` when there are no clusters.
#[must_use]
pub fn cluster_bounds(clusters: &[ListingCluster]) -> Option<MapBounds> {
    let points: MultiPoint<f64> = clusters
        .iter()
        .map(|c| geo::Point::from(c.representative_point))
        .collect();
    let rect = points.bounding_rect()?;

    Some(MapBounds {
        south_west: GeoPoint::new(rect.min().y, rect.min().x),
        north_east: GeoPoint::new(rect.max().y, rect.max().x),
    })
}
