//! The list adapter: data source and delegate for a host table view.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use trellis_core::PerfSpan;
use trellis_core::logging::targets;
use trellis_net::NetworkClient;

use super::scroll::ScrollMetrics;
use super::signals::ViewSignals;
use crate::config::ListViewConfig;
use crate::error::Result;
use crate::listener::ListViewListener;
use crate::model::{IndexPath, SectionedDataModel, ViewHandle};
use crate::pagination::PaginationController;
use crate::renderer::{CellRenderer, CellView, RendererRegistry, ReusePolicy};

/// A cell view configured for one row.
#[derive(Debug)]
pub struct ConfiguredCell {
    index: IndexPath,
    view: CellView,
    reused: bool,
}

impl ConfiguredCell {
    /// The row this cell was configured for.
    pub fn index(&self) -> IndexPath {
        self.index
    }

    /// The configured view.
    pub fn view(&self) -> &CellView {
        &self.view
    }

    /// The configured view, mutably.
    pub fn view_mut(&mut self) -> &mut CellView {
        &mut self.view
    }

    /// Returns `true` if the view came from the reuse pool.
    pub fn was_reused(&self) -> bool {
        self.reused
    }

    /// Take the view out.
    pub fn into_view(self) -> CellView {
        self.view
    }
}

/// Builder for a [`ListAdapter`].
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use trellis::{ListAdapter, ListViewConfig};
/// use trellis_net::http::HttpNetworkClient;
///
/// let network = Arc::new(HttpNetworkClient::new()?);
/// let adapter = ListAdapter::builder(
///     ListViewConfig::new("https://api.example.com/posts").with_pull_to_refresh(true),
///     network,
/// )
/// .register_cell_type("post", PostRenderer)
/// .listener(&feed)
/// .build()?;
///
/// adapter.reload();
/// ```
pub struct ListAdapterBuilder {
    config: ListViewConfig,
    network: Arc<dyn NetworkClient>,
    model: Option<Arc<SectionedDataModel>>,
    registry: RendererRegistry,
    listener: Option<Arc<dyn ListViewListener>>,
}

impl ListAdapterBuilder {
    /// Start building an adapter for `config`, fetching through `network`.
    pub fn new(config: ListViewConfig, network: Arc<dyn NetworkClient>) -> Self {
        let registry =
            RendererRegistry::with_policy(ReusePolicy::new(config.reuse_slots_per_type));
        Self {
            config,
            network,
            model: None,
            registry,
            listener: None,
        }
    }

    /// Use an existing model instead of creating an empty one.
    pub fn model(mut self, model: Arc<SectionedDataModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Register a renderer for `cell_type`.
    pub fn register_cell_type<R: CellRenderer>(
        self,
        cell_type: impl Into<crate::model::CellTypeId>,
        renderer: R,
    ) -> Self {
        self.registry.register(cell_type, renderer);
        self
    }

    /// Set the listener. The adapter holds it weakly.
    pub fn listener<L: ListViewListener + 'static>(mut self, listener: &Arc<L>) -> Self {
        let listener: Arc<dyn ListViewListener> = listener.clone();
        self.listener = Some(listener);
        self
    }

    /// Validate the configuration and build the adapter.
    pub fn build(self) -> Result<ListAdapter> {
        self.config.validate()?;

        let model = self
            .model
            .unwrap_or_else(|| Arc::new(SectionedDataModel::new()));
        let pull_to_refresh = Arc::new(AtomicBool::new(self.config.pull_to_refresh));
        let estimated_row_height = self.config.estimated_row_height;
        let pagination = PaginationController::new(self.config, self.network, model.clone());
        if let Some(listener) = &self.listener {
            pagination.listener().set_dyn(listener);
        }

        let signals = Arc::new(ViewSignals::new());
        {
            let signals = signals.clone();
            pagination.signals().load_started.connect(move |_| {
                signals.loading_started.emit(());
            });
        }
        {
            let signals = signals.clone();
            let pull_to_refresh = pull_to_refresh.clone();
            let model = Arc::downgrade(&model);
            pagination.signals().load_finished.connect(move |outcome| {
                signals.loading_finished.emit(());
                if pull_to_refresh.load(Ordering::Acquire) {
                    signals.refresh_ended.emit(());
                }
                if outcome.is_loaded() {
                    if let Some(model) = model.upgrade() {
                        model.notify_reset();
                    }
                }
            });
        }

        tracing::debug!(
            target: targets::VIEW,
            url = %pagination.config().url,
            cell_types = self.registry.cell_types().len(),
            "list adapter built"
        );

        Ok(ListAdapter {
            model,
            pagination,
            registry: self.registry,
            signals,
            pull_to_refresh,
            estimated_row_height,
        })
    }
}

/// Answers a host table view's queries from a [`SectionedDataModel`] and
/// drives paginated loading.
///
/// The adapter owns no row state of its own: counts, heights and cells are
/// read from the model on every query, and every mutation is announced by
/// the model's [`model_reset`](crate::model::ModelSignals::model_reset)
/// signal so the host reloads the whole table.
pub struct ListAdapter {
    model: Arc<SectionedDataModel>,
    pagination: PaginationController,
    registry: RendererRegistry,
    signals: Arc<ViewSignals>,
    pull_to_refresh: Arc<AtomicBool>,
    estimated_row_height: f32,
}

impl ListAdapter {
    /// Start building an adapter.
    pub fn builder(config: ListViewConfig, network: Arc<dyn NetworkClient>) -> ListAdapterBuilder {
        ListAdapterBuilder::new(config, network)
    }

    /// Build an adapter with an empty model and no renderers.
    pub fn new(config: ListViewConfig, network: Arc<dyn NetworkClient>) -> Result<Self> {
        Self::builder(config, network).build()
    }

    /// The data model.
    pub fn model(&self) -> &Arc<SectionedDataModel> {
        &self.model
    }

    /// The pagination controller.
    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    /// The renderer registry.
    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Signals towards the host view.
    pub fn signals(&self) -> &ViewSignals {
        &self.signals
    }

    /// Row height hint for the host's initial layout.
    pub fn estimated_row_height(&self) -> f32 {
        self.estimated_row_height
    }

    /// Point the adapter at `listener`, replacing any previous one. Held weakly.
    pub fn set_listener<L: ListViewListener + 'static>(&self, listener: &Arc<L>) {
        self.pagination.listener().set(listener);
    }

    /// Register a renderer for `cell_type`. Returns `true` if one was replaced.
    pub fn register_cell_type<R: CellRenderer>(
        &self,
        cell_type: impl Into<crate::model::CellTypeId>,
        renderer: R,
    ) -> bool {
        self.registry.register(cell_type, renderer)
    }

    // -------------------------------------------------------------------------
    // Data source
    // -------------------------------------------------------------------------

    /// Number of sections.
    pub fn number_of_sections(&self) -> usize {
        self.model.section_count()
    }

    /// Number of rows in `section`.
    pub fn number_of_rows(&self, section: usize) -> Result<usize> {
        self.model.row_count(section)
    }

    /// Header height of `section`; zero when it has no header view.
    pub fn header_height(&self, section: usize) -> Result<f32> {
        Ok(self.model.section(section)?.effective_header_height())
    }

    /// Footer height of `section`; zero when it has no footer view.
    pub fn footer_height(&self, section: usize) -> Result<f32> {
        Ok(self.model.section(section)?.effective_footer_height())
    }

    /// Header view of `section`.
    pub fn header_view(&self, section: usize) -> Result<Option<ViewHandle>> {
        Ok(self.model.section(section)?.header_view())
    }

    /// Footer view of `section`.
    pub fn footer_view(&self, section: usize) -> Result<Option<ViewHandle>> {
        Ok(self.model.section(section)?.footer_view())
    }

    /// Height of the row at `index` laid out at `width`.
    pub fn row_height(&self, index: IndexPath, width: f32) -> Result<f32> {
        let binding = self.model.cell_at_path(index)?;
        self.registry.height_for(&binding, width)
    }

    /// A view for the row at `index`, configured by its renderer.
    ///
    /// The listener's `on_cell_configured` runs after the renderer. Hand the
    /// cell back through [`recycle_cell`](Self::recycle_cell) once it
    /// scrolls off screen.
    pub fn cell_for_row(&self, index: IndexPath, width: f32) -> Result<ConfiguredCell> {
        let _span = PerfSpan::new("cell_for_row");
        let binding = self.model.cell_at_path(index)?;
        let (mut view, reused) = self.registry.dequeue(binding.cell_type())?;
        if let Err(err) = self.registry.configure(&mut view, &binding, width) {
            tracing::warn!(target: targets::VIEW, %index, error = %err, "cell configuration failed");
            self.registry.recycle(view);
            return Err(err);
        }
        self.pagination
            .listener()
            .with(|l| l.on_cell_configured(&mut view, index));
        tracing::trace!(target: targets::VIEW, %index, reused, "cell configured");
        Ok(ConfiguredCell {
            index,
            view,
            reused,
        })
    }

    /// Return a cell that left the screen to the reuse pool.
    pub fn recycle_cell(&self, cell: ConfiguredCell) -> bool {
        self.registry.recycle(cell.view)
    }

    // -------------------------------------------------------------------------
    // Delegate
    // -------------------------------------------------------------------------

    /// The row at `index` was tapped. The listener is told, then the row is
    /// deselected.
    pub fn did_select_row(&self, index: IndexPath) {
        tracing::trace!(target: targets::VIEW, %index, "row selected");
        self.pagination.listener().with(|l| l.on_row_selected(index));
        self.signals.row_deselected.emit(index);
    }

    /// The list scrolled.
    ///
    /// The listener always sees the event. If the model has rows and the
    /// visible bottom edge crossed the threshold, the next page is
    /// requested. Returns `true` if a fetch was issued.
    pub fn did_scroll(&self, metrics: &ScrollMetrics) -> bool {
        self.pagination.listener().with(|l| l.on_scroll(metrics));
        if self.model.is_empty() || !metrics.is_near_bottom() {
            return false;
        }
        if !self.pagination.can_load_next_page() {
            return false;
        }
        tracing::debug!(
            target: targets::VIEW,
            visible_bottom = metrics.visible_bottom(),
            content_height = metrics.content_height,
            "bottom reached, requesting next page"
        );
        self.pagination.load_next_page()
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Reload from the first page. Returns `false` if a load is running.
    pub fn reload(&self) -> bool {
        self.pagination.reload()
    }

    /// Cancel the running load.
    pub fn cancel(&self) -> bool {
        self.pagination.cancel()
    }

    /// Enable pull-to-refresh. Finished loads then also end the refresh
    /// animation.
    pub fn enable_pull_to_refresh(&self) {
        self.pull_to_refresh.store(true, Ordering::Release);
    }

    /// Returns `true` if pull-to-refresh is enabled.
    pub fn is_pull_to_refresh_enabled(&self) -> bool {
        self.pull_to_refresh.load(Ordering::Acquire)
    }

    /// The user pulled to refresh.
    pub fn refresh_triggered(&self) -> bool {
        if !self.is_pull_to_refresh_enabled() {
            tracing::debug!(target: targets::VIEW, "refresh ignored, pull-to-refresh disabled");
            return false;
        }
        tracing::debug!(target: targets::VIEW, "refresh triggered by user");
        self.pagination.reload()
    }

    /// Scroll to the last row of the last section.
    ///
    /// Returns the row scrolled to, or `None` if the last section is empty.
    pub fn scroll_to_bottom(&self) -> Option<IndexPath> {
        let index = self.model.last_index_path()?;
        self.signals.scroll_to_row.emit(index);
        Some(index)
    }

    /// Remove every row and section.
    pub fn clear(&self) {
        self.model.clear();
    }
}

impl std::fmt::Debug for ListAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListAdapter")
            .field("model", &self.model)
            .field("pagination", &self.pagination)
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListViewError;
    use crate::testing::{Event, FakeNetwork, RecordingListener};
    use parking_lot::Mutex;
    use serde_json::{Value, json};

    struct TextRenderer;

    impl CellRenderer for TextRenderer {
        type Model = Value;
        type View = String;

        fn create_view(&self) -> String {
            String::new()
        }

        fn height_for(&self, _model: &Value, width: f32) -> f32 {
            width / 10.0
        }

        fn configure(&self, view: &mut String, model: &Value, _width: f32) {
            *view = model.to_string();
        }
    }

    fn adapter(config: ListViewConfig) -> (ListAdapter, Arc<FakeNetwork>, Arc<RecordingListener>) {
        let network = FakeNetwork::new();
        let listener = RecordingListener::new();
        let adapter = ListAdapter::builder(config, network.clone())
            .register_cell_type("item", TextRenderer)
            .listener(&listener)
            .build()
            .unwrap();
        (adapter, network, listener)
    }

    fn near_bottom() -> ScrollMetrics {
        ScrollMetrics::new(1500.0, 600.0, 2000.0)
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = ListAdapter::new(ListViewConfig::new("u").with_page_size(0), FakeNetwork::new());
        assert!(matches!(result, Err(ListViewError::InvalidConfig { .. })));
    }

    #[test]
    fn test_data_source_queries() {
        let (adapter, _network, _listener) = adapter(ListViewConfig::new("u"));
        let model = adapter.model();
        let first = model.add_section();
        first.set_header(ViewHandle::new("Today"), 28.0);
        model.add_cell(json!("a"), "item");
        model.add_cell(json!("b"), "item");
        model.add_section();

        assert_eq!(adapter.number_of_sections(), 2);
        assert_eq!(adapter.number_of_rows(0).unwrap(), 2);
        assert_eq!(adapter.number_of_rows(1).unwrap(), 0);
        assert_eq!(adapter.header_height(0).unwrap(), 28.0);
        assert_eq!(adapter.footer_height(0).unwrap(), 0.0);
        assert!(adapter.header_view(0).unwrap().is_some());
        assert!(adapter.footer_view(1).unwrap().is_none());
        assert_eq!(adapter.row_height(IndexPath::new(0, 1), 320.0).unwrap(), 32.0);
        assert!(adapter.row_height(IndexPath::new(1, 0), 320.0).unwrap_err().is_out_of_range());
        assert!(adapter.header_height(2).is_err());
        assert_eq!(adapter.estimated_row_height(), 100.0);
    }

    #[test]
    fn test_unregistered_cell_type_is_an_error() {
        let (adapter, _network, _listener) = adapter(ListViewConfig::new("u"));
        adapter.model().add_cell(json!(1), "photo");

        let index = IndexPath::new(0, 0);
        assert!(matches!(
            adapter.row_height(index, 320.0),
            Err(ListViewError::UnregisteredCellType(_))
        ));
        assert!(adapter.cell_for_row(index, 320.0).is_err());
    }

    #[test]
    fn test_cell_for_row_configures_and_notifies() {
        let (adapter, _network, listener) = adapter(ListViewConfig::new("u"));
        adapter.model().add_cell(json!("hello"), "item");

        let cell = adapter.cell_for_row(IndexPath::new(0, 0), 320.0).unwrap();

        assert_eq!(cell.index(), IndexPath::new(0, 0));
        assert!(!cell.was_reused());
        assert_eq!(cell.view().downcast_ref::<String>().unwrap(), "\"hello\"");
        assert_eq!(listener.events(), vec![Event::CellConfigured(IndexPath::new(0, 0))]);

        assert!(adapter.recycle_cell(cell));
        let again = adapter.cell_for_row(IndexPath::new(0, 0), 320.0).unwrap();
        assert!(again.was_reused());
    }

    #[test]
    fn test_model_type_mismatch_recycles_view() {
        let (adapter, _network, _listener) = adapter(ListViewConfig::new("u"));
        adapter.model().add_cell(5u32, "item");

        let err = adapter.cell_for_row(IndexPath::new(0, 0), 320.0).unwrap_err();

        assert!(matches!(err, ListViewError::ModelTypeMismatch { .. }));
        assert_eq!(adapter.registry().pooled(&"item".into()), 1);
    }

    #[test]
    fn test_selection_deselects() {
        let (adapter, _network, listener) = adapter(ListViewConfig::new("u"));
        let deselected = Arc::new(Mutex::new(Vec::new()));
        let deselected_clone = deselected.clone();
        adapter.signals().row_deselected.connect(move |index| {
            deselected_clone.lock().push(*index);
        });

        adapter.did_select_row(IndexPath::new(0, 3));

        assert_eq!(listener.events(), vec![Event::RowSelected(IndexPath::new(0, 3))]);
        assert_eq!(*deselected.lock(), vec![IndexPath::new(0, 3)]);
    }

    #[test]
    fn test_scroll_on_empty_model_never_loads() {
        let (adapter, network, listener) = adapter(ListViewConfig::new("u"));

        assert!(!adapter.did_scroll(&near_bottom()));

        assert_eq!(network.request_count(), 0);
        assert_eq!(listener.events(), vec![Event::Scroll(near_bottom())]);
    }

    #[test]
    fn test_scroll_to_bottom_loads_next_page() {
        let (adapter, network, listener) = adapter(ListViewConfig::new("https://example.com/feed"));
        adapter.reload();
        network.succeed(0, json!({"items": ["a", "b"], "cursor": "c1"}));
        listener.clear();

        // Not far enough.
        assert!(!adapter.did_scroll(&ScrollMetrics::new(0.0, 600.0, 2000.0)));
        assert_eq!(network.request_count(), 1);

        assert!(adapter.did_scroll(&near_bottom()));
        assert_eq!(network.request_count(), 2);
        assert_eq!(network.request(1).url, "https://example.com/feed");
        assert_eq!(network.last_params().get("cursor").map(String::as_str), Some("c1"));
        assert_eq!(adapter.pagination().current_page(), 1);

        // A second scroll event while loading does nothing.
        assert!(!adapter.did_scroll(&near_bottom()));
        assert_eq!(network.request_count(), 2);
        assert_eq!(listener.count(|e| matches!(e, Event::Scroll(_))), 3);
    }

    #[test]
    fn test_scroll_after_exhaustion_does_nothing() {
        let (adapter, network, _listener) = adapter(ListViewConfig::new("u"));
        adapter.reload();
        network.succeed_last(json!({"items": [1]}));

        assert!(!adapter.did_scroll(&near_bottom()));
        assert_eq!(network.request_count(), 1);
    }

    #[test]
    fn test_loading_signals_and_reset() {
        let (adapter, network, _listener) = adapter(ListViewConfig::new("u"));
        let log = Arc::new(Mutex::new(Vec::new()));
        for (signal, name) in [
            (&adapter.signals().loading_started, "start"),
            (&adapter.signals().loading_finished, "finish"),
            (&adapter.signals().refresh_ended, "refresh_end"),
        ] {
            let log = log.clone();
            signal.connect(move |_| log.lock().push(name));
        }
        let log_clone = log.clone();
        adapter.model().signals().model_reset.connect(move |_| {
            log_clone.lock().push("reset");
        });

        adapter.reload();
        network.succeed(0, json!({"items": [1], "cursor": "a"}));
        adapter.pagination().load_next_page();
        network.fail(1, trellis_net::NetworkError::Timeout);

        assert_eq!(
            *log.lock(),
            vec!["start", "finish", "reset", "start", "finish"]
        );
    }

    #[test]
    fn test_pull_to_refresh() {
        let (adapter, network, listener) = adapter(ListViewConfig::new("u"));
        let ended = Arc::new(Mutex::new(0));
        let ended_clone = ended.clone();
        adapter.signals().refresh_ended.connect(move |_| *ended_clone.lock() += 1);

        assert!(!adapter.refresh_triggered());
        assert_eq!(network.request_count(), 0);

        adapter.enable_pull_to_refresh();
        assert!(adapter.is_pull_to_refresh_enabled());
        assert!(adapter.refresh_triggered());
        assert_eq!(listener.events()[0], Event::Reload);

        network.fail(0, trellis_net::NetworkError::Timeout);
        assert_eq!(*ended.lock(), 1);
    }

    #[test]
    fn test_pull_to_refresh_from_config() {
        let (adapter, network, _listener) = adapter(ListViewConfig::new("u").with_pull_to_refresh(true));
        assert!(adapter.refresh_triggered());
        assert_eq!(network.request_count(), 1);
    }

    #[test]
    fn test_scroll_to_bottom() {
        let (adapter, _network, _listener) = adapter(ListViewConfig::new("u"));
        let scrolled = Arc::new(Mutex::new(Vec::new()));
        let scrolled_clone = scrolled.clone();
        adapter.signals().scroll_to_row.connect(move |index| {
            scrolled_clone.lock().push(*index);
        });

        assert_eq!(adapter.scroll_to_bottom(), None);

        adapter.model().add_cell(json!(1), "item");
        adapter.model().add_cell(json!(2), "item");
        assert_eq!(adapter.scroll_to_bottom(), Some(IndexPath::new(0, 1)));

        adapter.model().add_section();
        assert_eq!(adapter.scroll_to_bottom(), None);

        assert_eq!(*scrolled.lock(), vec![IndexPath::new(0, 1)]);
    }

    #[test]
    fn test_clear() {
        let (adapter, _network, _listener) = adapter(ListViewConfig::new("u"));
        adapter.model().add_cell(json!(1), "item");

        adapter.clear();

        assert_eq!(adapter.number_of_sections(), 0);
        assert!(adapter.model().is_empty());
    }

    #[test]
    fn test_listener_is_not_kept_alive() {
        let network = FakeNetwork::new();
        let adapter = ListAdapter::new(ListViewConfig::new("u"), network.clone()).unwrap();
        let listener = RecordingListener::new();
        adapter.set_listener(&listener);
        drop(listener);

        adapter.did_select_row(IndexPath::new(0, 0));
        adapter.reload();
        network.succeed(0, json!({"items": [1], "cursor": "a"}));

        assert!(adapter.model().is_empty());
        assert_eq!(adapter.pagination().cursor(), "a");
    }
}
