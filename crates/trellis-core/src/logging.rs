//! Logging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs, install
//! a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis::pagination=debug")
//!     .init();
//! ```
//!
//! Every subsystem logs under its own target (see [`targets`]) so hosts can
//! filter pagination traffic separately from model mutations.

/// Target names for log filtering.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Sectioned data model mutations.
    pub const MODEL: &str = "trellis::model";
    /// Pagination state machine.
    pub const PAGINATION: &str = "trellis::pagination";
    /// Rendering bridge (adapter queries, scroll handling).
    pub const VIEW: &str = "trellis::view";
    /// Cell renderer registry and reuse pool.
    pub const RENDERER: &str = "trellis::renderer";
    /// HTTP network collaborator.
    pub const HTTP: &str = "trellis_net::http";
}

/// A performance tracing span.
///
/// The span is entered on creation and exited when the guard is dropped.
///
/// ```
/// use trellis_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("configure_cell");
///     // ... timed work ...
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_without_subscriber() {
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [
            targets::SIGNAL,
            targets::MODEL,
            targets::PAGINATION,
            targets::VIEW,
            targets::RENDERER,
            targets::HTTP,
        ] {
            assert!(target.starts_with("trellis"));
        }
    }
}
