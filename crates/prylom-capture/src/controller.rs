use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use prylom_analysis::{SiteAnalysisRequest, SiteAnalyzer};
use prylom_core::{CaptureMode, CapturedArea, GeoPoint, Ring};
use serde::Serialize;
use tokio::sync::watch;

use crate::state::{AnalysisState, CaptureState, MIN_POLYGON_VERTICES};

/// Serialisable view of a controller at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureSnapshot {
    pub state: CaptureState,
    pub mode: CaptureMode,
    pub ring: Ring,
    pub center_point: Option<GeoPoint>,
    pub area_hectares: f64,
    pub analysis: AnalysisState,
    /// Sequence number of the most recent analysis request or reset.
    pub analysis_seq: u64,
}

/// Drives one capture session.
///
/// Clicks mutate the capture synchronously; analyses run on spawned Tokio
/// tasks, so [`register_click`](Self::register_click) must be called from
/// within a runtime.
pub struct CaptureController<A> {
    analyzer: Arc<A>,
    area: CapturedArea,
    latest_seq: Arc<AtomicU64>,
    analysis: Arc<watch::Sender<AnalysisState>>,
}

impl<A: SiteAnalyzer> CaptureController<A> {
    #[must_use]
    pub fn new(analyzer: Arc<A>, mode: CaptureMode) -> Self {
        let (tx, _rx) = watch::channel(AnalysisState::Idle);
        Self {
            analyzer,
            area: CapturedArea::empty(mode),
            latest_seq: Arc::new(AtomicU64::new(0)),
            analysis: Arc::new(tx),
        }
    }

    #[must_use]
    pub fn mode(&self) -> CaptureMode {
        self.area.mode
    }

    #[must_use]
    pub fn state(&self) -> CaptureState {
        CaptureState::of(&self.area)
    }

    #[must_use]
    pub fn captured(&self) -> &CapturedArea {
        &self.area
    }

    /// Current analysis state.
    #[must_use]
    pub fn analysis(&self) -> AnalysisState {
        self.analysis.borrow().clone()
    }

    /// Receiver that observes every applied analysis state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.analysis.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            state: self.state(),
            mode: self.area.mode,
            ring: self.area.ring.clone(),
            center_point: self.area.center_point,
            area_hectares: self.area.area_hectares,
            analysis: self.analysis(),
            analysis_seq: self.latest_seq.load(Ordering::SeqCst),
        }
    }

    /// Switches mode and discards the current capture.
    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.area = CapturedArea::empty(mode);
        self.reset_analysis();
    }

    /// Discards the current capture, keeping the mode.
    pub fn clear(&mut self) {
        self.area = CapturedArea::empty(self.area.mode);
        self.reset_analysis();
    }

    /// Applies a click and, when the capture is analysable, issues a site
    /// analysis. Returns the request's sequence number if one was issued.
    pub fn register_click(&mut self, point: GeoPoint) -> Option<u64> {
        self.area.apply_click(point);

        let request = match self.area.mode {
            CaptureMode::Point => SiteAnalysisRequest::point(point),
            CaptureMode::Polygon if self.area.ring.len() >= MIN_POLYGON_VERTICES => {
                SiteAnalysisRequest::polygon(
                    point,
                    self.area.ring.clone(),
                    self.area.area_hectares,
                )
            }
            CaptureMode::Polygon => {
                tracing::trace!(
                    vertices = self.area.ring.len(),
                    "polygon not yet analysable"
                );
                return None;
            }
        };

        Some(self.dispatch(request))
    }

    /// Waits until the latest request has settled and returns the outcome.
    /// Returns immediately when nothing is pending.
    pub async fn settled_analysis(&self) -> AnalysisState {
        let mut rx = self.analysis.subscribe();
        let settled = match rx.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.clone(),
            Err(_) => self.analysis(),
        };
        settled
    }

    fn reset_analysis(&self) {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.analysis.send_replace(AnalysisState::Idle);
        tracing::debug!(seq, mode = %self.area.mode, "capture reset");
    }

    fn dispatch(&self, request: SiteAnalysisRequest) -> u64 {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.analysis.send_replace(AnalysisState::Pending { seq });

        tracing::debug!(
            seq,
            is_polygon = request.is_polygon(),
            vertices = request.ring.as_ref().map_or(0, Ring::len),
            "site analysis requested"
        );

        let analyzer = Arc::clone(&self.analyzer);
        let latest_seq = Arc::clone(&self.latest_seq);
        let analysis = Arc::clone(&self.analysis);

        tokio::spawn(async move {
            let next = match analyzer.analyze(&request).await {
                Ok(report) => AnalysisState::Ready { seq, report },
                Err(e) => {
                    tracing::warn!(seq, error = %e, "site analysis unavailable");
                    AnalysisState::Unavailable {
                        seq,
                        reason: e.to_string(),
                    }
                }
            };

            // Compared under the channel's write lock; a reset or newer
            // request that lands first makes this response stale.
            analysis.send_if_modified(|state| {
                let latest = latest_seq.load(Ordering::SeqCst);
                if latest == seq {
                    *state = next;
                    true
                } else {
                    tracing::debug!(seq, latest, "discarding stale site analysis");
                    false
                }
            });
        });

        seq
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
