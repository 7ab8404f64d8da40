mod api;
mod middleware;
mod sessions;

use std::time::Duration;

use prylom_analysis::ConfiguredAnalyzer;
use prylom_geocode::{ClusterBuilder, GeocodeCache, NominatimClient, RateLimiter};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = prylom_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = prylom_core::load_listings(&config.listings_path)?;
    tracing::info!(
        listings = catalog.listings.len(),
        path = %config.listings_path.display(),
        "listing catalog loaded"
    );

    let geocoder = NominatimClient::new(
        &config.geocoder_base_url,
        &config.geocoder_user_agent,
        config.geocoder_timeout_secs,
        RateLimiter::new(Duration::from_millis(config.geocoder_min_interval_ms)),
    )?
    .with_country_codes(&config.geocoder_country_codes);
    // One cache for the process lifetime, shared by every clustering pass.
    let clusters = ClusterBuilder::new(
        geocoder,
        GeocodeCache::new(),
        &config.geocoder_country_label,
    );
    let analyzer = ConfiguredAnalyzer::from_config(&config)?;

    let state = AppState::new(
        catalog.listings,
        clusters,
        analyzer,
        Duration::from_secs(config.capture_idle_ttl_secs),
    );
    // Sweep at a quarter of the TTL so idle sessions go within 1.25x of it.
    let sweep_every = (state.captures.idle_ttl() / 4).max(Duration::from_secs(1));
    sessions::spawn_idle_sweep(state.captures.clone(), sweep_every);
    tracing::info!(
        idle_ttl_secs = config.capture_idle_ttl_secs,
        sweep_every_secs = sweep_every.as_secs(),
        "capture session sweep started"
    );

    let app = build_app(
        state,
        RateLimitState::per_minute(config.rate_limit_per_minute),
    );

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting prylom-server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
