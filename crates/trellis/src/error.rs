//! Error types for list views.
//!
//! Every variant describes a caller contract violation: an index that did not
//! come from the model's own counts, a row whose cell type was never
//! registered, or a renderer handed a model of the wrong type. Network
//! failures are not errors here; they are delivered to the listener.

use crate::model::CellTypeId;

/// Result type alias for list view operations.
pub type Result<T> = std::result::Result<T, ListViewError>;

/// Errors raised by list view queries.
#[derive(Debug, thiserror::Error)]
pub enum ListViewError {
    /// A section index past the end of the model.
    #[error("section {section} out of range (model has {count} sections)")]
    SectionOutOfRange { section: usize, count: usize },

    /// A row index past the end of its section.
    #[error("row {row} out of range in section {section} ({count} rows)")]
    IndexOutOfRange {
        section: usize,
        row: usize,
        count: usize,
    },

    /// A row refers to a cell type with no registered renderer.
    #[error("no renderer registered for cell type '{0}'")]
    UnregisteredCellType(CellTypeId),

    /// The renderer for a cell type cannot handle the bound model.
    #[error("cell type '{cell_type}' expects a model of type {expected}")]
    ModelTypeMismatch {
        cell_type: CellTypeId,
        expected: &'static str,
    },

    /// A view handed back for configuration was not created by this renderer.
    #[error("cell type '{cell_type}' expects a view of type {expected}")]
    ViewTypeMismatch {
        cell_type: CellTypeId,
        expected: &'static str,
    },

    /// A TOML configuration could not be parsed.
    #[error("invalid list view configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A JSON configuration could not be parsed.
    #[error("invalid list view configuration: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// A configuration value is outside its allowed range.
    #[error("invalid value for '{field}': {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },
}

impl ListViewError {
    /// Create an invalid configuration value error.
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` for errors caused by an index outside the model.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Self::SectionOutOfRange { .. } | Self::IndexOutOfRange { .. }
        )
    }
}
