use prylom_analysis::SiteReport;
use prylom_core::{CaptureMode, CapturedArea};
use serde::Serialize;

/// Vertices needed before a polygon has an area and can be analysed.
pub const MIN_POLYGON_VERTICES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Empty,
    SinglePointSet,
    /// One or two vertices; area is zero.
    PolygonBuilding,
    PolygonReady,
}

impl CaptureState {
    #[must_use]
    pub fn of(area: &CapturedArea) -> Self {
        match area.mode {
            _ if area.is_empty() => CaptureState::Empty,
            CaptureMode::Point => CaptureState::SinglePointSet,
            CaptureMode::Polygon if area.ring.len() >= MIN_POLYGON_VERTICES => {
                CaptureState::PolygonReady
            }
            CaptureMode::Polygon => CaptureState::PolygonBuilding,
        }
    }
}

/// The analysis panel's view of the most recent request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisState {
    Idle,
    Pending { seq: u64 },
    Ready { seq: u64, report: SiteReport },
    /// The request failed; the panel shows a neutral empty state.
    Unavailable { seq: u64, reason: String },
}

impl AnalysisState {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, AnalysisState::Pending { .. })
    }

    #[must_use]
    pub fn seq(&self) -> Option<u64> {
        match self {
            AnalysisState::Idle => None,
            AnalysisState::Pending { seq }
            | AnalysisState::Ready { seq, .. }
            | AnalysisState::Unavailable { seq, .. } => Some(*seq),
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&SiteReport> {
        match self {
            AnalysisState::Ready { report, .. } => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use prylom_core::GeoPoint;

    use super::*;

    #[test]
    fn state_follows_capture() {
        let mut area = CapturedArea::empty(CaptureMode::Polygon);
        assert_eq!(CaptureState::of(&area), CaptureState::Empty);

        area.apply_click(GeoPoint::new(-12.0, -55.0));
        area.apply_click(GeoPoint::new(-12.0, -55.1));
        assert_eq!(CaptureState::of(&area), CaptureState::PolygonBuilding);

        area.apply_click(GeoPoint::new(-12.1, -55.1));
        assert_eq!(CaptureState::of(&area), CaptureState::PolygonReady);

        let mut point = CapturedArea::empty(CaptureMode::Point);
        point.apply_click(GeoPoint::new(-12.0, -55.0));
        assert_eq!(CaptureState::of(&point), CaptureState::SinglePointSet);
    }

    #[test]
    fn analysis_state_serializes_with_status_tag() {
        let json = serde_json::to_value(AnalysisState::Pending { seq: 3 }).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["seq"], 3);
        assert_eq!(AnalysisState::Idle.seq(), None);
    }
}
