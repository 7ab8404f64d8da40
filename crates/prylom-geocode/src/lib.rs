//! Geocoding and listing clustering for the property map.
//!
//! [`NominatimClient`] talks to a Nominatim-compatible service behind an
//! explicit [`RateLimiter`]. [`ClusterBuilder`] groups listings by place,
//! resolves one point per group through a session-scoped [`GeocodeCache`],
//! and reports groups it could not place instead of dropping them silently.
//! [`popup`] turns clusters into marker popups and map bounds.

pub mod cache;
pub mod client;
pub mod cluster;
pub mod error;
pub mod popup;
pub mod rate_limit;
pub mod types;

use std::future::Future;

use prylom_core::GeoPoint;

pub use cache::{CachedLookup, GeocodeCache};
pub use client::NominatimClient;
pub use cluster::{
    group_listings, ClusterBuilder, ClusterPass, GroupResolution, GroupingMode, ListingCluster,
    ListingGroup, UnresolvedGroup, UnresolvedReason,
};
pub use error::GeocodeError;
pub use popup::{cluster_bounds, ClusterPopup, MapBounds, PopupRow};
pub use rate_limit::RateLimiter;
pub use types::{Place, ReversePlace};

/// Forward geocoding as consumed by the clusterer.
///
/// `Ok(None)` means the service answered but found nothing.
pub trait Geocoder: Send + Sync {
    fn forward(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<GeoPoint>, GeocodeError>> + Send;
}
