//! Cell bindings: a model paired with the cell type that renders it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Identifies a cell renderer.
///
/// The caller picks the key when registering a renderer with
/// [`RendererRegistry::register`](crate::renderer::RendererRegistry::register)
/// and uses the same key when appending rows.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellTypeId(Arc<str>);

impl CellTypeId {
    /// Create a cell type identifier.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CellTypeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CellTypeId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl fmt::Debug for CellTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellTypeId({:?})", &*self.0)
    }
}

impl fmt::Display for CellTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The data shown in one row and the cell type responsible for it.
///
/// Bindings are immutable once created. Cloning is cheap: the model is shared.
#[derive(Clone)]
pub struct CellBinding {
    model: Arc<dyn Any + Send + Sync>,
    cell_type: CellTypeId,
}

impl CellBinding {
    /// Bind `model` to `cell_type`.
    pub fn new<M: Any + Send + Sync>(model: M, cell_type: impl Into<CellTypeId>) -> Self {
        Self::from_shared(Arc::new(model), cell_type)
    }

    /// Bind an already shared model to `cell_type`.
    pub fn from_shared(model: Arc<dyn Any + Send + Sync>, cell_type: impl Into<CellTypeId>) -> Self {
        Self {
            model,
            cell_type: cell_type.into(),
        }
    }

    /// The cell type rendering this row.
    pub fn cell_type(&self) -> &CellTypeId {
        &self.cell_type
    }

    /// The bound model, type-erased.
    pub fn model(&self) -> &(dyn Any + Send + Sync) {
        &*self.model
    }

    /// The bound model as `T`, if it is one.
    pub fn model_as<T: Any>(&self) -> Option<&T> {
        self.model.downcast_ref::<T>()
    }

    /// A shared handle to the bound model.
    pub fn shared_model(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.model)
    }
}

impl fmt::Debug for CellBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellBinding")
            .field("cell_type", &self.cell_type)
            .finish_non_exhaustive()
    }
}
