//! Location grouping and cluster resolution for the listing map.
//!
//! A clustering pass:
//! 1. Partitions listings by `(place, state)`, case-insensitively, keeping
//!    first-seen order for both groups and members.
//! 2. Walks the groups in that order, one at a time. Each group's query is
//!    answered from the [`GeocodeCache`] or, on a miss, by the geocoder.
//!    Every outcome, failures included, is cached for the session.
//!    Requests are never fanned out; the geocoder's own rate limiter spaces
//!    them.
//! 3. Returns every located cluster in one batch together with the groups
//!    that could not be placed, so the caller can fit the map to the full set
//!    and tell the user how many listings are missing from it.

use std::collections::HashMap;

use prylom_core::{GeoPoint, LocatedListing};
use serde::{Deserialize, Serialize};

use crate::cache::{CachedLookup, GeocodeCache};
use crate::Geocoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    #[default]
    Municipality,
    /// Group by agricultural micro-region; listings without one fall back to
    /// their municipality.
    MicroRegion,
}

impl std::str::FromStr for GroupingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "municipality" => Ok(GroupingMode::Municipality),
            "micro-region" | "micro_region" | "microregion" => Ok(GroupingMode::MicroRegion),
            other => Err(format!("unknown grouping mode \"{other}\"")),
        }
    }
}

/// Listings sharing a place key, before geocoding.
#[derive(Debug, Clone, Serialize)]
pub struct ListingGroup {
    pub key: String,
    /// Municipality or micro-region name as first seen in the catalog.
    pub place: String,
    pub state: String,
    pub members: Vec<LocatedListing>,
}

impl ListingGroup {
    /// Free-text geocoder query, e.g. `"Sorriso, MT, Brasil"`.
    #[must_use]
    pub fn query(&self, country_label: &str) -> String {
        let country = country_label.trim();
        if country.is_empty() {
            format!("{}, {}", self.place, self.state)
        } else {
            format!("{}, {}, {country}", self.place, self.state)
        }
    }
}

/// A located group, rendered as one map marker.
#[derive(Debug, Clone, Serialize)]
pub struct ListingCluster {
    pub group_key: String,
    pub place: String,
    pub state: String,
    pub members: Vec<LocatedListing>,
    pub representative_point: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The geocoder answered with zero results (now or earlier this session).
    NoMatch,
    /// Network error, rate limiting or a malformed response. Not retried
    /// until the session cache is dropped.
    LookupFailed { message: String },
}

/// A group left off the map.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedGroup {
    pub group_key: String,
    pub query: String,
    pub listing_ids: Vec<String>,
    pub reason: UnresolvedReason,
}

#[derive(Debug, Clone)]
pub enum GroupResolution {
    Located(ListingCluster),
    Unresolved(UnresolvedGroup),
}

/// Output of one clustering pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterPass {
    pub clusters: Vec<ListingCluster>,
    pub unresolved: Vec<UnresolvedGroup>,
    /// Lookups that went to the network (cache misses).
    pub geocoder_requests: usize,
}

impl ClusterPass {
    #[must_use]
    pub fn unlocated_listing_count(&self) -> usize {
        self.unresolved.iter().map(|g| g.listing_ids.len()).sum()
    }

    /// User-facing partial-failure notice, if anything was left off the map.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        match self.unlocated_listing_count() {
            0 => None,
            1 => Some("1 anúncio não pôde ser localizado no mapa".to_string()),
            n => Some(format!("{n} anúncios não puderam ser localizados no mapa")),
        }
    }
}

/// Partitions `listings` into place groups.
///
/// Keys compare case-insensitively after trimming; the first listing seen
/// for a key supplies the group's display spelling.
#[must_use]
pub fn group_listings(listings: &[LocatedListing], mode: GroupingMode) -> Vec<ListingGroup> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<ListingGroup> = Vec::new();

    for listing in listings {
        let municipality = listing.municipality.trim();
        let place = match mode {
            GroupingMode::Municipality => municipality,
            GroupingMode::MicroRegion => listing
                .region
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(municipality),
        };
        let state = listing.state.trim();
        let lookup = (place.to_lowercase(), state.to_lowercase());

        if let Some(&i) = index.get(&lookup) {
            groups[i].members.push(listing.clone());
        } else {
            // Display key only; identity is the (place, state) pair.
            let key = format!("{}|{}", lookup.0, lookup.1);
            index.insert(lookup, groups.len());
            groups.push(ListingGroup {
                key,
                place: place.to_owned(),
                state: state.to_owned(),
                members: vec![listing.clone()],
            });
        }
    }

    groups
}

/// Resolves listing groups to map clusters.
///
/// Owns the geocoder and a handle to the session's [`GeocodeCache`]. Build
/// one per application session and reuse it across passes.
pub struct ClusterBuilder<G> {
    geocoder: G,
    cache: GeocodeCache,
    country_label: String,
}

impl<G: Geocoder> ClusterBuilder<G> {
    #[must_use]
    pub fn new(geocoder: G, cache: GeocodeCache, country_label: &str) -> Self {
        Self {
            geocoder,
            cache,
            country_label: country_label.to_owned(),
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Runs a full clustering pass over `listings`.
    ///
    /// Never fails: groups that cannot be placed are returned in
    /// [`ClusterPass::unresolved`].
    pub async fn build_clusters(
        &self,
        listings: &[LocatedListing],
        mode: GroupingMode,
    ) -> ClusterPass {
        let groups = group_listings(listings, mode);
        let group_count = groups.len();
        let mut pass = ClusterPass::default();

        for group in groups {
            let (resolution, requested) = self.resolve(group).await;
            if requested {
                pass.geocoder_requests += 1;
            }
            match resolution {
                GroupResolution::Located(cluster) => pass.clusters.push(cluster),
                GroupResolution::Unresolved(group) => pass.unresolved.push(group),
            }
        }

        tracing::info!(
            ?mode,
            groups = group_count,
            clusters = pass.clusters.len(),
            unresolved = pass.unresolved.len(),
            geocoder_requests = pass.geocoder_requests,
            "clustering pass complete"
        );

        pass
    }

    /// Resolves a single group.
    pub async fn resolve_group(&self, group: ListingGroup) -> GroupResolution {
        self.resolve(group).await.0
    }

    /// Returns the resolution and whether the geocoder was called.
    async fn resolve(&self, group: ListingGroup) -> (GroupResolution, bool) {
        let query = group.query(&self.country_label);

        if let Some(cached) = self.cache.get(&query) {
            tracing::debug!(group_key = %group.key, %query, "geocode cache hit");
            return (Self::finish(group, query, cached), false);
        }

        let lookup = match self.geocoder.forward(&query).await {
            Ok(Some(point)) => CachedLookup::Located(point),
            Ok(None) => {
                tracing::warn!(group_key = %group.key, %query, "geocoder found no match; group left off the map");
                CachedLookup::NotFound
            }
            Err(e) => {
                tracing::warn!(group_key = %group.key, %query, error = %e, "geocoding failed; group left off the map");
                CachedLookup::Failed {
                    message: e.to_string(),
                }
            }
        };
        let lookup = self.cache.insert(&query, lookup);

        (Self::finish(group, query, lookup), true)
    }

    fn finish(group: ListingGroup, query: String, lookup: CachedLookup) -> GroupResolution {
        match lookup {
            CachedLookup::Located(point) => GroupResolution::Located(ListingCluster {
                group_key: group.key,
                place: group.place,
                state: group.state,
                members: group.members,
                representative_point: point,
            }),
            CachedLookup::NotFound => Self::unresolved(group, query, UnresolvedReason::NoMatch),
            CachedLookup::Failed { message } => {
                Self::unresolved(group, query, UnresolvedReason::LookupFailed { message })
            }
        }
    }

    fn unresolved(group: ListingGroup, query: String, reason: UnresolvedReason) -> GroupResolution {
        GroupResolution::Unresolved(UnresolvedGroup {
            group_key: group.key,
            query,
            listing_ids: group.members.into_iter().map(|l| l.id).collect(),
            reason,
        })
    }
}

#[cfg(test)]
#[path = "cluster_test.rs"]
mod tests;
