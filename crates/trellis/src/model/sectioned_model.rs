//! The sectioned data model backing a list view.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use trellis_core::logging::targets;

use super::binding::{CellBinding, CellTypeId};
use super::index::IndexPath;
use super::section::Section;
use super::signals::ModelSignals;
use crate::error::{ListViewError, Result};

/// An ordered collection of [`Section`]s; the source of truth for a list view.
///
/// All methods take `&self`, so the model can be shared between the adapter
/// and the listener that fills it (typically as an `Arc`). Change signals are
/// emitted after internal locks are released.
///
/// # Example
///
/// ```
/// use trellis::model::SectionedDataModel;
///
/// let model = SectionedDataModel::new();
///
/// // Appending without a section creates one.
/// model.add_cell("First post".to_string(), "post");
/// model.add_cell("Second post".to_string(), "post");
///
/// assert_eq!(model.section_count(), 1);
/// assert_eq!(model.row_count(0).unwrap(), 2);
/// ```
#[derive(Default)]
pub struct SectionedDataModel {
    sections: RwLock<Vec<Section>>,
    appended: AtomicUsize,
    signals: ModelSignals,
}

impl SectionedDataModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// The model's change signals.
    pub fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    /// Running count of rows appended to the model.
    ///
    /// The counter is never reset, not even by [`clear`](Self::clear), so the
    /// difference between two readings is the number of rows added in
    /// between regardless of what was removed.
    pub fn rows_appended(&self) -> usize {
        self.appended.load(Ordering::Acquire)
    }

    /// Append a new empty section and return it for configuration.
    pub fn add_section(&self) -> Section {
        let section = Section::new();
        let index = {
            let mut sections = self.sections.write();
            sections.push(section.clone());
            sections.len() - 1
        };
        tracing::trace!(target: targets::MODEL, section = index, "section added");
        self.signals.section_inserted.emit(index);
        section
    }

    /// Append a row to the last section, creating a section if there is none.
    pub fn add_cell<M: Any + Send + Sync>(
        &self,
        model: M,
        cell_type: impl Into<CellTypeId>,
    ) -> CellBinding {
        self.append(None, CellBinding::new(model, cell_type))
    }

    /// Append a row to `section`.
    ///
    /// `section` should be a handle returned by this model. A handle to a
    /// section that has since been cleared still receives the row, but the
    /// row is not part of the model and no insertion is announced.
    pub fn add_cell_to<M: Any + Send + Sync>(
        &self,
        section: &Section,
        model: M,
        cell_type: impl Into<CellTypeId>,
    ) -> CellBinding {
        self.append(Some(section), CellBinding::new(model, cell_type))
    }

    /// Append a prebuilt binding, resolving the target section like
    /// [`add_cell`](Self::add_cell) when `section` is `None`.
    pub fn append(&self, section: Option<&Section>, binding: CellBinding) -> CellBinding {
        let mut created = None;
        let path = {
            let mut sections = self.sections.write();
            let (index, target) = match section {
                Some(target) => (
                    sections.iter().position(|s| s.ptr_eq(target)),
                    target.clone(),
                ),
                None => match sections.last() {
                    Some(last) => (Some(sections.len() - 1), last.clone()),
                    None => {
                        let fresh = Section::new();
                        sections.push(fresh.clone());
                        created = Some(0);
                        (Some(0), fresh)
                    }
                },
            };
            let row = target.push(binding.clone());
            index.map(|section| IndexPath::new(section, row))
        };

        if let Some(index) = created {
            tracing::trace!(target: targets::MODEL, section = index, "section created for row");
            self.signals.section_inserted.emit(index);
        }
        match path {
            Some(path) => {
                self.appended.fetch_add(1, Ordering::AcqRel);
                tracing::trace!(
                    target: targets::MODEL,
                    %path,
                    cell_type = %binding.cell_type(),
                    "row added"
                );
                self.signals.rows_inserted.emit(path);
            }
            None => {
                tracing::debug!(
                    target: targets::MODEL,
                    cell_type = %binding.cell_type(),
                    "row added to a section no longer in the model"
                );
            }
        }
        binding
    }

    /// The binding at (`section`, `row`).
    ///
    /// A section index past the end fails with
    /// [`ListViewError::SectionOutOfRange`] and a row past the end of an
    /// existing section with [`ListViewError::IndexOutOfRange`]. Both report
    /// `true` from [`ListViewError::is_out_of_range`].
    pub fn cell_at(&self, section: usize, row: usize) -> Result<CellBinding> {
        let target = self.section(section)?;
        let count = target.len();
        target.cell(row).ok_or(ListViewError::IndexOutOfRange {
            section,
            row,
            count,
        })
    }

    /// The binding at `path`.
    pub fn cell_at_path(&self, path: IndexPath) -> Result<CellBinding> {
        self.cell_at(path.section, path.row)
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.read().len()
    }

    /// Number of rows in `section`.
    pub fn row_count(&self, section: usize) -> Result<usize> {
        self.section(section).map(|s| s.len())
    }

    /// Total number of rows across all sections.
    pub fn row_total(&self) -> usize {
        self.sections.read().iter().map(Section::len).sum()
    }

    /// Returns `true` if there are no sections or every section is empty.
    pub fn is_empty(&self) -> bool {
        self.sections.read().iter().all(Section::is_empty)
    }

    /// The section at `index`.
    pub fn section(&self, index: usize) -> Result<Section> {
        let sections = self.sections.read();
        sections
            .get(index)
            .cloned()
            .ok_or(ListViewError::SectionOutOfRange {
                section: index,
                count: sections.len(),
            })
    }

    /// Handles to every section, in display order.
    pub fn sections(&self) -> Vec<Section> {
        self.sections.read().clone()
    }

    /// The last row of the last section, if that section has rows.
    ///
    /// Earlier sections are not consulted: a trailing empty section means
    /// there is no last row.
    pub fn last_index_path(&self) -> Option<IndexPath> {
        let sections = self.sections.read();
        let section = sections.len().checked_sub(1)?;
        let row = sections[section].len().checked_sub(1)?;
        Some(IndexPath::new(section, row))
    }

    /// Remove every section and announce a reset.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.sections.write());
        tracing::debug!(target: targets::MODEL, sections = removed.len(), "model cleared");
        drop(removed);
        self.signals.emit_reset();
    }

    /// Announce that the model should be re-rendered in full.
    pub fn notify_reset(&self) {
        self.signals.emit_reset();
    }
}

impl std::fmt::Debug for SectionedDataModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionedDataModel")
            .field("sections", &*self.sections.read())
            .finish()
    }
}

/// Shared ownership of a model, as held by adapters and listeners.
pub type SharedModel = Arc<SectionedDataModel>;
