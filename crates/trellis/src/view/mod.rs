//! The bridge between the data model and the host's table view.
//!
//! A [`ListAdapter`] answers the host's data-source and delegate queries
//! (section and row counts, heights, configured cells) from a
//! [`SectionedDataModel`](crate::model::SectionedDataModel), forwards
//! selection and scroll events to the listener, and starts infinite-scroll
//! loads through its [`PaginationController`](crate::pagination::PaginationController).

mod adapter;
mod scroll;
mod signals;

pub use adapter::{ConfiguredCell, ListAdapter, ListAdapterBuilder};
pub use scroll::ScrollMetrics;
pub use signals::ViewSignals;
