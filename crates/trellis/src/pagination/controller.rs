//! The pagination state machine.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use trellis_core::logging::targets;
use trellis_net::{Cancelable, FetchResult, NetworkClient};

use super::state::{LoadOutcome, LoadPhase, PaginationSignals, PaginationSnapshot};
use crate::config::ListViewConfig;
use crate::listener::ListenerSlot;
use crate::model::SectionedDataModel;

struct PaginationState {
    is_loading: bool,
    is_exhausted: bool,
    current_page: usize,
    cursor: String,
    supports_pagination: bool,
    in_flight: Option<Box<dyn Cancelable>>,
    /// Sequence number of the request whose completion is still wanted.
    active_request: Option<u64>,
    next_request: u64,
}

struct Shared {
    state: Mutex<PaginationState>,
    network: Arc<dyn NetworkClient>,
    model: Arc<SectionedDataModel>,
    listener: ListenerSlot,
    config: ListViewConfig,
    signals: PaginationSignals,
}

/// Fetches pages through a [`NetworkClient`] and tracks loading state.
///
/// At most one fetch is in flight at a time: `reload` and `load_next_page`
/// do nothing while a load is running. Completions hold only a weak
/// reference to the controller, so a response that arrives after the
/// controller was dropped is discarded. A response for a request that was
/// cancelled or superseded is discarded as well.
///
/// Page contents are not interpreted here. On success the listener's
/// [`on_load_success`](crate::listener::ListViewListener::on_load_success)
/// appends rows to the model; the controller only reads the cursor.
pub struct PaginationController {
    shared: Arc<Shared>,
}

impl PaginationController {
    /// Create a controller that fetches `config.url` through `network` and
    /// hands pages to the listener together with `model`.
    pub fn new(
        config: ListViewConfig,
        network: Arc<dyn NetworkClient>,
        model: Arc<SectionedDataModel>,
    ) -> Self {
        let state = PaginationState {
            is_loading: false,
            is_exhausted: false,
            current_page: 0,
            cursor: String::new(),
            supports_pagination: config.supports_pagination,
            in_flight: None,
            active_request: None,
            next_request: 0,
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                network,
                model,
                listener: ListenerSlot::new(),
                config,
                signals: PaginationSignals::new(),
            }),
        }
    }

    /// The listener receiving load callbacks. Held weakly.
    pub fn listener(&self) -> &ListenerSlot {
        &self.shared.listener
    }

    /// The controller's signals.
    pub fn signals(&self) -> &PaginationSignals {
        &self.shared.signals
    }

    /// The model pages are loaded into.
    pub fn model(&self) -> &Arc<SectionedDataModel> {
        &self.shared.model
    }

    /// The configuration the controller was built with.
    pub fn config(&self) -> &ListViewConfig {
        &self.shared.config
    }

    /// Start over from the first page.
    ///
    /// Resets the page, cursor and exhaustion, then fetches page 0. Returns
    /// `false` without doing anything if a load is already running.
    pub fn reload(&self) -> bool {
        {
            let mut state = self.shared.state.lock();
            if state.is_loading {
                tracing::trace!(target: targets::PAGINATION, "reload ignored, already loading");
                return false;
            }
            state.current_page = 0;
            state.cursor.clear();
            state.is_exhausted = false;
            state.is_loading = true;
        }
        tracing::debug!(target: targets::PAGINATION, "reloading from first page");
        self.shared.listener.with(|l| l.on_reload());
        self.shared.begin_fetch(0);
        true
    }

    /// Fetch the page after the current one.
    ///
    /// Returns `false` without doing anything while loading, once the list
    /// is exhausted, or when pagination is disabled.
    pub fn load_next_page(&self) -> bool {
        let page = {
            let mut state = self.shared.state.lock();
            if state.is_loading || state.is_exhausted || !state.supports_pagination {
                tracing::trace!(
                    target: targets::PAGINATION,
                    loading = state.is_loading,
                    exhausted = state.is_exhausted,
                    supports_pagination = state.supports_pagination,
                    "next page ignored"
                );
                return false;
            }
            state.current_page += 1;
            state.is_loading = true;
            state.current_page
        };
        tracing::debug!(target: targets::PAGINATION, page, "loading next page");
        self.shared.begin_fetch(page);
        true
    }

    /// Cancel the running load.
    ///
    /// The page, cursor and exhaustion are kept, so the next
    /// `load_next_page` continues after the cancelled page. Returns `false`
    /// if nothing was loading.
    pub fn cancel(&self) -> bool {
        let (handle, page) = {
            let mut state = self.shared.state.lock();
            if !state.is_loading && state.in_flight.is_none() {
                return false;
            }
            state.is_loading = false;
            state.active_request = None;
            (state.in_flight.take(), state.current_page)
        };
        if let Some(handle) = handle {
            handle.cancel();
        }
        tracing::debug!(target: targets::PAGINATION, page, "load cancelled");
        self.shared
            .signals
            .load_finished
            .emit(LoadOutcome::Cancelled { page });
        true
    }

    /// Returns `true` if `load_next_page` would issue a fetch.
    pub fn can_load_next_page(&self) -> bool {
        let state = self.shared.state.lock();
        !state.is_loading && !state.is_exhausted && state.supports_pagination
    }

    /// Enable or disable infinite scroll.
    pub fn set_supports_pagination(&self, enabled: bool) {
        self.shared.state.lock().supports_pagination = enabled;
    }

    /// Returns `true` while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.shared.state.lock().is_loading
    }

    /// Returns `true` once the last page was reached.
    pub fn is_exhausted(&self) -> bool {
        self.shared.state.lock().is_exhausted
    }

    /// Zero-based page of the latest fetch.
    pub fn current_page(&self) -> usize {
        self.shared.state.lock().current_page
    }

    /// The latest server cursor, empty until one arrives.
    pub fn cursor(&self) -> String {
        self.shared.state.lock().cursor.clone()
    }

    /// The current phase of the state machine.
    pub fn phase(&self) -> LoadPhase {
        self.snapshot().phase()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> PaginationSnapshot {
        let state = self.shared.state.lock();
        PaginationSnapshot {
            is_loading: state.is_loading,
            is_exhausted: state.is_exhausted,
            current_page: state.current_page,
            cursor: state.cursor.clone(),
            supports_pagination: state.supports_pagination,
            has_in_flight_request: state.in_flight.is_some(),
        }
    }
}

impl Drop for PaginationController {
    fn drop(&mut self) {
        let handle = self.shared.state.lock().in_flight.take();
        if let Some(handle) = handle {
            tracing::debug!(target: targets::PAGINATION, "controller dropped, cancelling request");
            handle.cancel();
        }
    }
}

impl std::fmt::Debug for PaginationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("state", &self.snapshot())
            .field("url", &self.shared.config.url)
            .finish()
    }
}

impl Shared {
    /// Issue the fetch for `page`. The caller has already set `is_loading`.
    fn begin_fetch(self: &Arc<Self>, page: usize) {
        self.listener.with(|l| l.on_load_start());
        self.signals.load_started.emit(page);

        let mut params = self
            .listener
            .with(|l| l.prepare_params(page))
            .unwrap_or_default();

        let (request, cursor) = {
            let mut state = self.state.lock();
            if !state.is_loading {
                tracing::debug!(target: targets::PAGINATION, page, "load cancelled before fetch");
                return;
            }
            let request = state.next_request;
            state.next_request += 1;
            state.active_request = Some(request);
            (request, state.cursor.clone())
        };

        params.insert(
            self.config.page_size_param.clone(),
            self.config.page_size.to_string(),
        );
        if !cursor.is_empty() {
            params.insert(self.config.cursor_param.clone(), cursor);
        }

        tracing::debug!(
            target: targets::PAGINATION,
            page,
            request,
            url = %self.config.url,
            ?params,
            "fetching page"
        );

        let weak: Weak<Shared> = Arc::downgrade(self);
        let handle = self.network.get(
            &self.config.url,
            params,
            Box::new(move |result| match weak.upgrade() {
                Some(shared) => shared.complete(request, page, result),
                None => {
                    tracing::debug!(
                        target: targets::PAGINATION,
                        request,
                        "controller gone, dropping completion"
                    );
                }
            }),
        );

        let mut state = self.state.lock();
        if state.active_request == Some(request) {
            state.in_flight = Some(handle);
        }
    }

    fn complete(&self, request: u64, page: usize, result: FetchResult) {
        if self.state.lock().active_request != Some(request) {
            tracing::debug!(target: targets::PAGINATION, request, page, "stale completion dropped");
            return;
        }

        let outcome = match result.error() {
            Some(error) => {
                tracing::warn!(target: targets::PAGINATION, page, %error, "page load failed");
                self.listener.with(|l| l.on_load_error(&result));
                LoadOutcome::Failed {
                    page,
                    error: error.clone(),
                }
            }
            None => {
                let appended_before = self.model.rows_appended();
                self.listener
                    .with(|l| l.on_load_success(&self.model, &result));
                let rows_added = self.model.rows_appended().wrapping_sub(appended_before);
                let cursor = result.cursor(&self.config.cursor_field);

                let mut state = self.state.lock();
                if state.active_request != Some(request) {
                    tracing::debug!(
                        target: targets::PAGINATION,
                        request,
                        "load cancelled by listener"
                    );
                    return;
                }
                match cursor {
                    Some(cursor) => {
                        state.cursor = cursor.to_string();
                        state.is_exhausted = false;
                    }
                    None => state.is_exhausted = true,
                }
                if self.config.exhaust_on_empty_page && rows_added == 0 {
                    state.is_exhausted = true;
                }
                tracing::debug!(
                    target: targets::PAGINATION,
                    page,
                    rows_added,
                    cursor = %state.cursor,
                    exhausted = state.is_exhausted,
                    "page loaded"
                );
                LoadOutcome::Loaded {
                    page,
                    rows_added,
                    exhausted: state.is_exhausted,
                }
            }
        };

        {
            let mut state = self.state.lock();
            if state.active_request != Some(request) {
                return;
            }
            state.is_loading = false;
            state.active_request = None;
            state.in_flight = None;
        }
        self.signals.load_finished.emit(outcome);
    }
}
