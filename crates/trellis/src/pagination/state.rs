//! Pagination state, outcomes and signals.

use trellis_core::Signal;
use trellis_net::NetworkError;

/// Where the pagination state machine is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    /// No fetch in flight; more pages may be requested.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last page was reached. Only a reload leaves this phase.
    Exhausted,
}

/// A point-in-time copy of the pagination state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationSnapshot {
    /// A fetch is in flight.
    pub is_loading: bool,
    /// No further pages will be fetched until a reload.
    pub is_exhausted: bool,
    /// Zero-based page of the latest fetch.
    pub current_page: usize,
    /// Server cursor from the latest successful page; empty until one arrives.
    pub cursor: String,
    /// Whether infinite scroll may request further pages.
    pub supports_pagination: bool,
    /// Whether the controller holds a request handle.
    pub has_in_flight_request: bool,
}

impl PaginationSnapshot {
    /// The phase this snapshot is in.
    pub fn phase(&self) -> LoadPhase {
        if self.is_loading {
            LoadPhase::Loading
        } else if self.is_exhausted {
            LoadPhase::Exhausted
        } else {
            LoadPhase::Idle
        }
    }
}

/// How a page load ended.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// The page arrived and was handed to the listener.
    Loaded {
        /// The page that was loaded.
        page: usize,
        /// Rows the listener appended to the model.
        rows_added: usize,
        /// Whether the list is now exhausted.
        exhausted: bool,
    },
    /// The fetch failed.
    Failed {
        /// The page that was requested.
        page: usize,
        /// Why the fetch failed.
        error: NetworkError,
    },
    /// The load was cancelled before it completed.
    Cancelled {
        /// The page that was requested.
        page: usize,
    },
}

impl LoadOutcome {
    /// The page this outcome belongs to.
    pub fn page(&self) -> usize {
        match self {
            Self::Loaded { page, .. } | Self::Failed { page, .. } | Self::Cancelled { page } => {
                *page
            }
        }
    }

    /// Returns `true` if the page was loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Signals emitted by a [`PaginationController`](super::PaginationController).
#[derive(Default)]
pub struct PaginationSignals {
    /// Emitted when a fetch is about to be issued. Args: the page.
    pub load_started: Signal<usize>,

    /// Emitted once per load when it completes, fails or is cancelled.
    pub load_finished: Signal<LoadOutcome>,
}

impl PaginationSignals {
    /// Create a new set of pagination signals.
    pub fn new() -> Self {
        Self::default()
    }
}
