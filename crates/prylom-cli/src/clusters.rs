//! `clusters` command handler.

use prylom_core::{filter_by_category, load_listings, AppConfig, Category, Currency};
use prylom_geocode::{
    cluster_bounds, ClusterBuilder, ClusterPopup, GeocodeCache, GroupingMode, MapBounds,
    UnresolvedGroup,
};
use serde::Serialize;

use crate::geocode::build_geocoder;
use crate::print_json;

#[derive(Serialize)]
struct ClustersOutput<'a> {
    mode: GroupingMode,
    currency: Currency,
    popups: Vec<ClusterPopup>,
    bounds: Option<MapBounds>,
    unresolved: &'a [UnresolvedGroup],
    notice: Option<String>,
}

/// Loads the catalog, runs one clustering pass and prints the popups.
///
/// Groups the geocoder cannot place are listed under `unresolved` and
/// summarised in `notice`; they do not fail the command.
///
/// # Errors
///
/// Returns an error if the listings file cannot be loaded or the geocoder
/// client cannot be built.
pub(crate) async fn run_clusters(
    config: &AppConfig,
    mode: GroupingMode,
    category: Option<Category>,
    currency: Currency,
) -> anyhow::Result<()> {
    let catalog = load_listings(&config.listings_path)?;
    let listings = filter_by_category(&catalog.listings, category);
    tracing::info!(
        total = catalog.listings.len(),
        selected = listings.len(),
        category = category.map(|c| c.to_string()).as_deref().unwrap_or("all"),
        "catalog loaded"
    );

    let builder = ClusterBuilder::new(
        build_geocoder(config)?,
        GeocodeCache::new(),
        &config.geocoder_country_label,
    );
    let pass = builder.build_clusters(&listings, mode).await;

    if let Some(notice) = pass.notice() {
        tracing::warn!(%notice, "some listings are missing from the map");
    }

    let output = ClustersOutput {
        mode,
        currency,
        popups: pass
            .clusters
            .iter()
            .map(|c| ClusterPopup::from_cluster(c, currency))
            .collect(),
        bounds: cluster_bounds(&pass.clusters),
        unresolved: &pass.unresolved,
        notice: pass.notice(),
    };
    print_json(&output)
}
