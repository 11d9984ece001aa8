//! Cell renderers and the registry that resolves them by cell type.
//!
//! A [`CellRenderer`] knows how tall a row is for a given model and how to
//! bind that model into a host view. Renderers are registered under a
//! [`CellTypeId`]; rows name the same key in their [`CellBinding`].
//!
//! The registry also keeps a small pool of views per cell type. Views handed
//! back through [`RendererRegistry::recycle`] are reused by the next
//! [`RendererRegistry::dequeue`] for the same type instead of creating a new
//! one.
//!
//! # Example
//!
//! ```
//! use trellis::model::CellBinding;
//! use trellis::renderer::{CellRenderer, RendererRegistry};
//!
//! struct Post {
//!     title: String,
//! }
//!
//! #[derive(Default)]
//! struct PostView {
//!     label: String,
//! }
//!
//! struct PostRenderer;
//!
//! impl CellRenderer for PostRenderer {
//!     type Model = Post;
//!     type View = PostView;
//!
//!     fn create_view(&self) -> PostView {
//!         PostView::default()
//!     }
//!
//!     fn height_for(&self, post: &Post, _width: f32) -> f32 {
//!         if post.title.len() > 40 { 88.0 } else { 44.0 }
//!     }
//!
//!     fn configure(&self, view: &mut PostView, post: &Post, _width: f32) {
//!         view.label = post.title.clone();
//!     }
//! }
//!
//! let registry = RendererRegistry::new();
//! registry.register("post", PostRenderer);
//!
//! let row = CellBinding::new(Post { title: "Hello".into() }, "post");
//! assert_eq!(registry.height_for(&row, 320.0).unwrap(), 44.0);
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use trellis_core::logging::targets;

use crate::error::{ListViewError, Result};
use crate::model::{CellBinding, CellTypeId};

/// Default number of recycled views kept per cell type.
pub const DEFAULT_REUSE_SLOT_COUNT: usize = 7;

/// Sizes rows and binds models into views for one cell type.
pub trait CellRenderer: Send + Sync + 'static {
    /// The model type this renderer displays.
    type Model: Any;
    /// The host view this renderer configures.
    type View: Any + Send;

    /// Create a fresh view. Called when the reuse pool has none to hand out.
    fn create_view(&self) -> Self::View;

    /// The row height for `model` laid out at `width`.
    fn height_for(&self, model: &Self::Model, width: f32) -> f32;

    /// Bind `model` into `view`.
    fn configure(&self, view: &mut Self::View, model: &Self::Model, width: f32);

    /// Reset a view before it goes back into the reuse pool.
    fn prepare_for_reuse(&self, _view: &mut Self::View) {}
}

trait ErasedRenderer: Send + Sync {
    fn create_view(&self) -> Box<dyn Any + Send>;
    fn height_for(&self, cell_type: &CellTypeId, model: &dyn Any, width: f32) -> Result<f32>;
    fn configure(
        &self,
        cell_type: &CellTypeId,
        view: &mut dyn Any,
        model: &dyn Any,
        width: f32,
    ) -> Result<()>;
    fn prepare_for_reuse(&self, view: &mut dyn Any);
}

struct Erased<R>(R);

impl<R: CellRenderer> Erased<R> {
    fn model<'a>(&self, cell_type: &CellTypeId, model: &'a dyn Any) -> Result<&'a R::Model> {
        model
            .downcast_ref::<R::Model>()
            .ok_or_else(|| ListViewError::ModelTypeMismatch {
                cell_type: cell_type.clone(),
                expected: type_name::<R::Model>(),
            })
    }
}

impl<R: CellRenderer> ErasedRenderer for Erased<R> {
    fn create_view(&self) -> Box<dyn Any + Send> {
        Box::new(self.0.create_view())
    }

    fn height_for(&self, cell_type: &CellTypeId, model: &dyn Any, width: f32) -> Result<f32> {
        let model = self.model(cell_type, model)?;
        Ok(self.0.height_for(model, width))
    }

    fn configure(
        &self,
        cell_type: &CellTypeId,
        view: &mut dyn Any,
        model: &dyn Any,
        width: f32,
    ) -> Result<()> {
        let model = self.model(cell_type, model)?;
        let view = view
            .downcast_mut::<R::View>()
            .ok_or_else(|| ListViewError::ViewTypeMismatch {
                cell_type: cell_type.clone(),
                expected: type_name::<R::View>(),
            })?;
        self.0.configure(view, model, width);
        Ok(())
    }

    fn prepare_for_reuse(&self, view: &mut dyn Any) {
        if let Some(view) = view.downcast_mut::<R::View>() {
            self.0.prepare_for_reuse(view);
        }
    }
}

/// A host view created by a registered renderer.
pub struct CellView {
    cell_type: CellTypeId,
    view: Box<dyn Any + Send>,
}

impl CellView {
    /// The cell type whose renderer created this view.
    pub fn cell_type(&self) -> &CellTypeId {
        &self.cell_type
    }

    /// The view as `V`, if it is one.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.view.downcast_ref::<V>()
    }

    /// The view as `V`, mutably, if it is one.
    pub fn downcast_mut<V: Any>(&mut self) -> Option<&mut V> {
        self.view.downcast_mut::<V>()
    }

    /// The view, type-erased.
    pub fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut *self.view
    }

    /// Take the view out as `V`. Returns `self` unchanged if it is not a `V`.
    pub fn into_inner<V: Any>(self) -> std::result::Result<V, Self> {
        let cell_type = self.cell_type;
        match self.view.downcast::<V>() {
            Ok(view) => Ok(*view),
            Err(view) => Err(Self { cell_type, view }),
        }
    }
}

impl fmt::Debug for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellView")
            .field("cell_type", &self.cell_type)
            .finish_non_exhaustive()
    }
}

/// How many recycled views the registry keeps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReusePolicy {
    /// Maximum number of pooled views for each cell type.
    pub max_slots_per_type: usize,
    /// Whether views are pooled at all.
    pub enabled: bool,
}

impl Default for ReusePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REUSE_SLOT_COUNT)
    }
}

impl ReusePolicy {
    /// Keep up to `max_slots_per_type` views per cell type.
    pub fn new(max_slots_per_type: usize) -> Self {
        Self {
            max_slots_per_type,
            enabled: max_slots_per_type > 0,
        }
    }

    /// Never pool views.
    pub fn disabled() -> Self {
        Self {
            max_slots_per_type: 0,
            enabled: false,
        }
    }
}

/// Maps cell types to renderers and pools their views.
pub struct RendererRegistry {
    renderers: RwLock<HashMap<CellTypeId, Arc<dyn ErasedRenderer>>>,
    pool: Mutex<HashMap<CellTypeId, Vec<Box<dyn Any + Send>>>>,
    policy: ReusePolicy,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererRegistry {
    /// Create an empty registry with the default reuse policy.
    pub fn new() -> Self {
        Self::with_policy(ReusePolicy::default())
    }

    /// Create an empty registry with `policy`.
    pub fn with_policy(policy: ReusePolicy) -> Self {
        Self {
            renderers: RwLock::new(HashMap::new()),
            pool: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// The reuse policy.
    pub fn policy(&self) -> &ReusePolicy {
        &self.policy
    }

    /// Register `renderer` for `cell_type`.
    ///
    /// Returns `true` if a previous renderer was replaced. Pooled views of
    /// the replaced renderer are discarded.
    pub fn register<R: CellRenderer>(&self, cell_type: impl Into<CellTypeId>, renderer: R) -> bool {
        let cell_type = cell_type.into();
        let replaced = self
            .renderers
            .write()
            .insert(cell_type.clone(), Arc::new(Erased(renderer)))
            .is_some();
        if replaced {
            self.pool.lock().remove(&cell_type);
        }
        tracing::debug!(
            target: targets::RENDERER,
            %cell_type,
            renderer = type_name::<R>(),
            replaced,
            "cell type registered"
        );
        replaced
    }

    /// Returns `true` if a renderer is registered for `cell_type`.
    pub fn is_registered(&self, cell_type: &CellTypeId) -> bool {
        self.renderers.read().contains_key(cell_type)
    }

    /// Every registered cell type.
    pub fn cell_types(&self) -> Vec<CellTypeId> {
        self.renderers.read().keys().cloned().collect()
    }

    fn renderer(&self, cell_type: &CellTypeId) -> Result<Arc<dyn ErasedRenderer>> {
        self.renderers
            .read()
            .get(cell_type)
            .cloned()
            .ok_or_else(|| ListViewError::UnregisteredCellType(cell_type.clone()))
    }

    /// The height of `binding`'s row at `width`.
    pub fn height_for(&self, binding: &CellBinding, width: f32) -> Result<f32> {
        let cell_type = binding.cell_type();
        self.renderer(cell_type)?
            .height_for(cell_type, binding.model(), width)
    }

    /// A view for `cell_type`: a pooled one if available, otherwise new.
    ///
    /// The flag is `true` when the view came from the pool.
    pub fn dequeue(&self, cell_type: &CellTypeId) -> Result<(CellView, bool)> {
        let renderer = self.renderer(cell_type)?;
        let pooled = self
            .pool
            .lock()
            .get_mut(cell_type)
            .and_then(|views| views.pop());
        let reused = pooled.is_some();
        let view = pooled.unwrap_or_else(|| renderer.create_view());
        tracing::trace!(target: targets::RENDERER, %cell_type, reused, "view dequeued");
        Ok((
            CellView {
                cell_type: cell_type.clone(),
                view,
            },
            reused,
        ))
    }

    /// Bind `binding`'s model into `view`.
    pub fn configure(&self, view: &mut CellView, binding: &CellBinding, width: f32) -> Result<()> {
        let cell_type = binding.cell_type();
        self.renderer(cell_type)?
            .configure(cell_type, &mut *view.view, binding.model(), width)
    }

    /// Hand a view back for reuse.
    ///
    /// Returns `true` if the view was pooled, `false` if it was dropped
    /// because pooling is disabled, the pool for its type is full, or its
    /// cell type is no longer registered.
    pub fn recycle(&self, mut view: CellView) -> bool {
        if !self.policy.enabled {
            return false;
        }
        let Ok(renderer) = self.renderer(&view.cell_type) else {
            return false;
        };

        let mut pool = self.pool.lock();
        let views = pool.entry(view.cell_type.clone()).or_default();
        if views.len() >= self.policy.max_slots_per_type {
            return false;
        }
        renderer.prepare_for_reuse(&mut *view.view);
        views.push(view.view);
        true
    }

    /// Number of pooled views for `cell_type`.
    pub fn pooled(&self, cell_type: &CellTypeId) -> usize {
        self.pool.lock().get(cell_type).map_or(0, Vec::len)
    }

    /// Drop every pooled view.
    pub fn clear_pool(&self) {
        self.pool.lock().clear();
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("cell_types", &self.cell_types())
            .field("policy", &self.policy)
            .finish()
    }
}
