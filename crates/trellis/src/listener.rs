//! The event listener contract of a list view.
//!
//! Every method has a no-op default, so a listener implements only the
//! callbacks it cares about. The list view holds its listener weakly: it
//! never keeps the listener alive, and once the listener is dropped every
//! callback is skipped.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use trellis_net::{FetchResult, QueryParams};

use crate::model::{IndexPath, SectionedDataModel};
use crate::renderer::CellView;
use crate::view::ScrollMetrics;

/// Callbacks from a list view to the code that owns it.
///
/// # Example
///
/// ```
/// use trellis::listener::ListViewListener;
/// use trellis::model::SectionedDataModel;
/// use trellis_net::{FetchResult, QueryParams};
///
/// struct Feed;
///
/// impl ListViewListener for Feed {
///     fn prepare_params(&self, _page: usize) -> QueryParams {
///         QueryParams::from([("lang".to_string(), "en".to_string())])
///     }
///
///     fn on_load_success(&self, model: &SectionedDataModel, result: &FetchResult) {
///         let items = result.field("items").and_then(|v| v.as_array());
///         for item in items.into_iter().flatten() {
///             model.add_cell(item.clone(), "post");
///         }
///     }
/// }
/// ```
pub trait ListViewListener: Send + Sync {
    /// Caller-supplied query parameters for fetching `page`.
    fn prepare_params(&self, _page: usize) -> QueryParams {
        QueryParams::new()
    }

    /// A user-initiated reload is starting. The model has not been cleared;
    /// clear it here if the new first page should replace the old rows.
    fn on_reload(&self) {}

    /// A page fetch is about to be issued.
    fn on_load_start(&self) {}

    /// A page arrived. Append its rows to `model`.
    fn on_load_success(&self, _model: &SectionedDataModel, _result: &FetchResult) {}

    /// A page fetch failed.
    fn on_load_error(&self, _result: &FetchResult) {}

    /// A cell view was configured for the row at `index`.
    fn on_cell_configured(&self, _view: &mut CellView, _index: IndexPath) {}

    /// The row at `index` was selected.
    fn on_row_selected(&self, _index: IndexPath) {}

    /// The list scrolled.
    fn on_scroll(&self, _metrics: &ScrollMetrics) {}
}

/// A non-owning, replaceable reference to a [`ListViewListener`].
#[derive(Default)]
pub struct ListenerSlot {
    listener: RwLock<Option<Weak<dyn ListViewListener>>>,
}

impl ListenerSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the slot at `listener` without taking ownership of it.
    pub fn set<L: ListViewListener + 'static>(&self, listener: &Arc<L>) {
        let weak = Arc::downgrade(listener);
        let weak: Weak<dyn ListViewListener> = weak;
        *self.listener.write() = Some(weak);
    }

    /// Point the slot at a type-erased listener.
    pub fn set_dyn(&self, listener: &Arc<dyn ListViewListener>) {
        *self.listener.write() = Some(Arc::downgrade(listener));
    }

    /// Empty the slot.
    pub fn clear(&self) {
        *self.listener.write() = None;
    }

    /// The listener, if one is set and still alive.
    pub fn get(&self) -> Option<Arc<dyn ListViewListener>> {
        self.listener.read().as_ref().and_then(Weak::upgrade)
    }

    /// Invoke `f` with the listener if there is one.
    pub fn with<R>(&self, f: impl FnOnce(&dyn ListViewListener) -> R) -> Option<R> {
        self.get().map(|listener| f(&*listener))
    }
}

impl std::fmt::Debug for ListenerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSlot")
            .field("alive", &self.get().is_some())
            .finish()
    }
}
