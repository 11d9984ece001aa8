//! Change notifications emitted by [`SectionedDataModel`](super::SectionedDataModel).

use trellis_core::Signal;

use super::index::IndexPath;

/// Signals emitted when the model changes.
///
/// Slots run synchronously on the thread that mutated the model, after the
/// model's locks have been released, so a slot may query the model freely.
#[derive(Default)]
pub struct ModelSignals {
    /// Emitted after a section is appended. Args: the new section's index.
    pub section_inserted: Signal<usize>,

    /// Emitted after a row is appended. Args: the new row's index path.
    pub rows_inserted: Signal<IndexPath>,

    /// Emitted when the whole model must be re-rendered: after a clear, or
    /// when a batch of rows finished loading.
    pub model_reset: Signal<()>,
}

impl ModelSignals {
    /// Create a new set of model signals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the model reset signal.
    pub fn emit_reset(&self) {
        self.model_reset.emit(());
    }
}
