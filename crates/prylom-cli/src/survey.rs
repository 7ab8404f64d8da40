//! `area` and `survey` command handlers.

use std::sync::Arc;

use prylom_analysis::ConfiguredAnalyzer;
use prylom_capture::CaptureController;
use prylom_core::{compute_area_hectares, AppConfig, CaptureMode, GeoPoint, Ring};
use serde::Serialize;

use crate::print_json;

#[derive(Serialize)]
struct AreaOutput {
    vertices: usize,
    area_hectares: f64,
}

/// # Errors
///
/// Returns an error only if the output cannot be serialised.
pub(crate) fn run_area(points: &[GeoPoint]) -> anyhow::Result<()> {
    let ring = Ring::from_points(points.to_vec());
    print_json(&AreaOutput {
        vertices: ring.len(),
        area_hectares: compute_area_hectares(&ring),
    })
}

/// Replays `points` as map clicks, waits for the latest site analysis and
/// prints the final capture snapshot.
///
/// # Errors
///
/// Returns an error if the analysis client cannot be built. A failed
/// analysis is reported in the snapshot, not as an error.
pub(crate) async fn run_survey(
    config: &AppConfig,
    mode: CaptureMode,
    points: &[GeoPoint],
) -> anyhow::Result<()> {
    let analyzer = ConfiguredAnalyzer::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build analysis client: {e}"))?;
    let mut controller = CaptureController::new(Arc::new(analyzer), mode);

    for &point in points {
        let issued = controller.register_click(point);
        tracing::info!(
            lat = point.latitude,
            lng = point.longitude,
            state = ?controller.state(),
            area_hectares = controller.captured().area_hectares,
            analysis_seq = ?issued,
            "click registered"
        );
    }

    controller.settled_analysis().await;
    print_json(&controller.snapshot())
}
