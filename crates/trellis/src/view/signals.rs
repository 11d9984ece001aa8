//! Signals a list adapter emits towards the host view.

use trellis_core::Signal;

use crate::model::IndexPath;

/// Requests from the adapter to the host view.
///
/// The host connects these to its activity indicator, refresh control and
/// scrolling. A full table reload is requested through
/// [`ModelSignals::model_reset`](crate::model::ModelSignals::model_reset).
#[derive(Default)]
pub struct ViewSignals {
    /// Show the loading indicator.
    pub loading_started: Signal<()>,
    /// Hide the loading indicator.
    ///
    /// Emitted once the success or failure listener has returned, not
    /// before it runs, so the indicator disappears together with the
    /// reloaded rows.
    pub loading_finished: Signal<()>,
    /// Stop the pull-to-refresh animation.
    pub refresh_ended: Signal<()>,
    /// Visually deselect a row.
    pub row_deselected: Signal<IndexPath>,
    /// Scroll a row into view.
    pub scroll_to_row: Signal<IndexPath>,
}

impl ViewSignals {
    /// Create a new set of view signals.
    pub fn new() -> Self {
        Self::default()
    }
}
