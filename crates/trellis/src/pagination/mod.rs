//! Page-by-page loading for list views.
//!
//! The [`PaginationController`] decides when a page is fetched and tracks
//! the result, independent of what a page contains:
//!
//! ```text
//! Idle ──reload / load_next_page──> Loading ──success, cursor──> Idle
//!                                      │ ──success, no cursor──> Exhausted
//!                                      │ ──failure──────────────> Idle
//!                                      └─cancel─────────────────> Idle
//! Exhausted ──reload──> Loading
//! ```

mod controller;
mod state;

pub use controller::PaginationController;
pub use state::{LoadOutcome, LoadPhase, PaginationSignals, PaginationSnapshot};
