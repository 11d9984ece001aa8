//! Sections: ordered groups of rows with optional header and footer views.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::binding::CellBinding;

/// An opaque handle to a host view (a section header or footer).
///
/// The core never inspects the view. It only tracks whether one is present,
/// which decides whether the section's header/footer height is honored.
#[derive(Clone)]
pub struct ViewHandle(Arc<dyn Any + Send + Sync>);

impl ViewHandle {
    /// Wrap a host view.
    pub fn new<V: Any + Send + Sync>(view: V) -> Self {
        Self(Arc::new(view))
    }

    /// The wrapped view as `V`, if it is one.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.0.downcast_ref::<V>()
    }

    /// Returns `true` if both handles refer to the same view.
    pub fn ptr_eq(&self, other: &ViewHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewHandle(..)")
    }
}

#[derive(Default)]
struct SectionData {
    cells: Vec<CellBinding>,
    header: Option<ViewHandle>,
    header_height: f32,
    footer: Option<ViewHandle>,
    footer_height: f32,
}

/// An ordered group of [`CellBinding`]s.
///
/// `Section` is a shared handle: the value returned by
/// [`SectionedDataModel::add_section`](super::SectionedDataModel::add_section)
/// refers to the same section the model holds, so headers and footers can
/// be configured after the section was added. Rows are appended through the
/// model so that insertions are announced.
#[derive(Clone, Default)]
pub struct Section {
    data: Arc<RwLock<SectionData>>,
}

impl Section {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.read().cells.len()
    }

    /// Returns `true` if the section has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.read().cells.is_empty()
    }

    /// The binding at `row`.
    pub fn cell(&self, row: usize) -> Option<CellBinding> {
        self.data.read().cells.get(row).cloned()
    }

    /// A snapshot of every binding, in display order.
    pub fn cells(&self) -> Vec<CellBinding> {
        self.data.read().cells.clone()
    }

    /// Append a binding, returning its row.
    pub(crate) fn push(&self, binding: CellBinding) -> usize {
        let mut data = self.data.write();
        data.cells.push(binding);
        data.cells.len() - 1
    }

    /// Set the header view and the height it should be laid out with.
    pub fn set_header(&self, view: ViewHandle, height: f32) {
        let mut data = self.data.write();
        data.header = Some(view);
        data.header_height = height;
    }

    /// Remove the header view. The stored height is kept but no longer honored.
    pub fn clear_header(&self) {
        self.data.write().header = None;
    }

    /// Set the footer view and the height it should be laid out with.
    pub fn set_footer(&self, view: ViewHandle, height: f32) {
        let mut data = self.data.write();
        data.footer = Some(view);
        data.footer_height = height;
    }

    /// Remove the footer view. The stored height is kept but no longer honored.
    pub fn clear_footer(&self) {
        self.data.write().footer = None;
    }

    /// The header view, if any.
    pub fn header_view(&self) -> Option<ViewHandle> {
        self.data.read().header.clone()
    }

    /// The footer view, if any.
    pub fn footer_view(&self) -> Option<ViewHandle> {
        self.data.read().footer.clone()
    }

    /// The configured header height, whether or not a header view is set.
    pub fn header_height(&self) -> f32 {
        self.data.read().header_height
    }

    /// The configured footer height, whether or not a footer view is set.
    pub fn footer_height(&self) -> f32 {
        self.data.read().footer_height
    }

    /// The header height to lay out: zero unless a header view is present.
    pub fn effective_header_height(&self) -> f32 {
        let data = self.data.read();
        if data.header.is_some() {
            data.header_height
        } else {
            0.0
        }
    }

    /// The footer height to lay out: zero unless a footer view is present.
    pub fn effective_footer_height(&self) -> f32 {
        let data = self.data.read();
        if data.footer.is_some() {
            data.footer_height
        } else {
            0.0
        }
    }

    /// Returns `true` if both handles refer to the same section.
    pub fn ptr_eq(&self, other: &Section) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.read();
        f.debug_struct("Section")
            .field("rows", &data.cells.len())
            .field("header", &data.header.is_some())
            .field("footer", &data.footer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_needs_view() {
        let section = Section::new();
        section.set_header(ViewHandle::new("Title"), 32.0);
        assert_eq!(section.effective_header_height(), 32.0);

        section.clear_header();
        assert_eq!(section.header_height(), 32.0);
        assert_eq!(section.effective_header_height(), 0.0);
        assert_eq!(section.effective_footer_height(), 0.0);
    }

    #[test]
    fn test_handles_share_rows() {
        let section = Section::new();
        let alias = section.clone();

        assert_eq!(section.push(CellBinding::new(1u8, "n")), 0);
        assert_eq!(section.push(CellBinding::new(2u8, "n")), 1);

        assert_eq!(alias.len(), 2);
        assert!(alias.ptr_eq(&section));
        assert_eq!(alias.cell(1).and_then(|c| c.model_as::<u8>().copied()), Some(2));
        assert!(alias.cell(2).is_none());
    }

    #[test]
    fn test_footer_view_downcast() {
        let section = Section::new();
        section.set_footer(ViewHandle::new(String::from("Load more")), 20.0);

        let footer = section.footer_view().unwrap();
        assert_eq!(footer.downcast_ref::<String>().map(String::as_str), Some("Load more"));
        assert_eq!(section.effective_footer_height(), 20.0);
    }
}
