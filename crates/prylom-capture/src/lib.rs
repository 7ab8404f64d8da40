//! Interactive point/polygon capture with latest-wins site analysis.
//!
//! A [`CaptureController`] receives map clicks, keeps the [`CapturedArea`]
//! and its area current, and fires a site analysis whenever the capture
//! becomes analysable: every click in point mode, and every vertex once a
//! polygon has three or more. There is no debounce, so each vertex past the
//! third costs one analysis request.
//!
//! Every request is tagged with a sequence number. A response is applied
//! only if its number is still the latest issued; `clear()` and
//! `set_mode()` also advance the sequence, so a response for an abandoned
//! capture never shows up.
//!
//! [`CapturedArea`]: prylom_core::CapturedArea

pub mod controller;
pub mod state;

pub use controller::{CaptureController, CaptureSnapshot};
pub use state::{AnalysisState, CaptureState, MIN_POLYGON_VERTICES};
