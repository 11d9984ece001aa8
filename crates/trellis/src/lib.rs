//! Trellis: headless list views with sections, cell renderers and paginated
//! loading.
//!
//! Trellis is the state behind a table view. It keeps the rows, answers the
//! host toolkit's data-source and delegate queries, and loads pages from a
//! network collaborator as the user scrolls. Drawing stays with the host.
//!
//! # Modules
//!
//! - [`model`]: sections of rows, each row a model bound to a cell type
//! - [`renderer`]: per-cell-type sizing and view configuration, with view reuse
//! - [`pagination`]: the reload / next page / cancel state machine
//! - [`view`]: the [`ListAdapter`] bridging model, renderers and pagination
//! - [`listener`]: optional callbacks to the owner of the list
//! - [`config`]: endpoint and pagination settings, loadable from TOML
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trellis::prelude::*;
//! use trellis_net::http::HttpNetworkClient;
//!
//! struct Feed;
//!
//! impl ListViewListener for Feed {
//!     fn on_load_success(&self, model: &SectionedDataModel, result: &FetchResult) {
//!         for post in result.field("posts").and_then(|v| v.as_array()).into_iter().flatten() {
//!             model.add_cell(post.clone(), "post");
//!         }
//!     }
//! }
//!
//! let feed = Arc::new(Feed);
//! let adapter = ListAdapter::builder(
//!     ListViewConfig::from_toml_str(include_str!("feed.toml"))?,
//!     Arc::new(HttpNetworkClient::new()?),
//! )
//! .register_cell_type("post", PostRenderer)
//! .listener(&feed)
//! .build()?;
//!
//! adapter.model().signals().model_reset.connect(|_| table.reload_data());
//! adapter.reload();
//! ```

pub mod config;
mod error;
pub mod listener;
pub mod model;
pub mod pagination;
pub mod renderer;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ListViewConfig;
pub use error::{ListViewError, Result};
pub use listener::ListViewListener;
pub use model::{CellBinding, CellTypeId, IndexPath, Section, SectionedDataModel};
pub use pagination::{LoadOutcome, LoadPhase, PaginationController};
pub use renderer::{CellRenderer, RendererRegistry};
pub use view::{ListAdapter, ScrollMetrics};

/// Common imports for building list views.
pub mod prelude {
    pub use crate::config::ListViewConfig;
    pub use crate::error::{ListViewError, Result};
    pub use crate::listener::ListViewListener;
    pub use crate::model::{
        CellBinding, CellTypeId, IndexPath, Section, SectionedDataModel, ViewHandle,
    };
    pub use crate::pagination::{LoadOutcome, LoadPhase, PaginationController};
    pub use crate::renderer::{CellRenderer, CellView, RendererRegistry};
    pub use crate::view::{ConfiguredCell, ListAdapter, ScrollMetrics, ViewSignals};
    pub use trellis_core::Signal;
    pub use trellis_net::{FetchResult, NetworkClient, QueryParams};
}
