//! Sectioned data for list views.
//!
//! A list view displays rows grouped into sections. Each row is a
//! [`CellBinding`]: a data object paired with the [`CellTypeId`] of the
//! renderer that sizes and configures it. Sections can carry an optional
//! header and footer view.
//!
//! # Core Types
//!
//! - [`IndexPath`]: a (section, row) position
//! - [`CellBinding`] / [`CellTypeId`]: one row and its renderer key
//! - [`Section`] / [`ViewHandle`]: a group of rows with header/footer views
//! - [`SectionedDataModel`]: all sections, with change notifications
//! - [`ModelSignals`]: signals emitted when the model changes

mod binding;
mod index;
mod section;
mod sectioned_model;
mod signals;

pub use binding::{CellBinding, CellTypeId};
pub use index::IndexPath;
pub use section::{Section, ViewHandle};
pub use sectioned_model::{SectionedDataModel, SharedModel};
pub use signals::ModelSignals;
