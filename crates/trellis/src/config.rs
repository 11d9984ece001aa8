//! List view configuration.
//!
//! A [`ListViewConfig`] describes where pages come from and how they are
//! requested. It can be built in code or loaded from TOML or JSON; missing
//! keys fall back to their defaults.
//!
//! ```toml
//! url = "https://api.example.com/posts"
//! page_size = 30
//! cursor_field = "next"
//! pull_to_refresh = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ListViewError, Result};

/// Configuration for a paginated list view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListViewConfig {
    /// Endpoint every page is fetched from.
    pub url: String,
    /// Value sent in the page-size parameter.
    pub page_size: usize,
    /// Key of the page-size parameter.
    pub page_size_param: String,
    /// Key of the cursor parameter, sent only once a cursor is known.
    pub cursor_param: String,
    /// Top-level payload field the next cursor is read from.
    pub cursor_field: String,
    /// Whether infinite scroll may request further pages.
    pub supports_pagination: bool,
    /// Whether pull-to-refresh is enabled when the adapter is built.
    pub pull_to_refresh: bool,
    /// Row height hint for the host's initial layout pass.
    pub estimated_row_height: f32,
    /// Mark the list exhausted when a successful page adds no rows, even if
    /// the response carried a cursor.
    pub exhaust_on_empty_page: bool,
    /// Number of recycled views kept per cell type.
    pub reuse_slots_per_type: usize,
}

impl Default for ListViewConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            page_size: 20,
            page_size_param: "count".to_string(),
            cursor_param: "cursor".to_string(),
            cursor_field: "cursor".to_string(),
            supports_pagination: true,
            pull_to_refresh: false,
            estimated_row_height: 100.0,
            exhaust_on_empty_page: false,
            reuse_slots_per_type: 7,
        }
    }
}

impl ListViewConfig {
    /// Create a configuration for `url` with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from a TOML document and validate it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON document and validate it.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ListViewError::invalid_config("config", e.to_string()))
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ListViewError::invalid_config(
                "page_size",
                "must be at least 1",
            ));
        }
        if self.page_size_param.is_empty() {
            return Err(ListViewError::invalid_config(
                "page_size_param",
                "must not be empty",
            ));
        }
        if self.cursor_param.is_empty() {
            return Err(ListViewError::invalid_config(
                "cursor_param",
                "must not be empty",
            ));
        }
        if self.cursor_field.is_empty() {
            return Err(ListViewError::invalid_config(
                "cursor_field",
                "must not be empty",
            ));
        }
        if !self.estimated_row_height.is_finite() || self.estimated_row_height < 0.0 {
            return Err(ListViewError::invalid_config(
                "estimated_row_height",
                format!("{} is not a valid height", self.estimated_row_height),
            ));
        }
        Ok(())
    }

    /// Set the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the key of the page-size parameter.
    pub fn with_page_size_param(mut self, key: impl Into<String>) -> Self {
        self.page_size_param = key.into();
        self
    }

    /// Set the key of the cursor parameter.
    pub fn with_cursor_param(mut self, key: impl Into<String>) -> Self {
        self.cursor_param = key.into();
        self
    }

    /// Set the payload field the cursor is read from.
    pub fn with_cursor_field(mut self, field: impl Into<String>) -> Self {
        self.cursor_field = field.into();
        self
    }

    /// Enable or disable infinite scroll.
    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.supports_pagination = enabled;
        self
    }

    /// Enable or disable pull-to-refresh.
    pub fn with_pull_to_refresh(mut self, enabled: bool) -> Self {
        self.pull_to_refresh = enabled;
        self
    }

    /// Set the estimated row height.
    pub fn with_estimated_row_height(mut self, height: f32) -> Self {
        self.estimated_row_height = height;
        self
    }

    /// Mark the list exhausted when a page adds no rows.
    pub fn with_exhaust_on_empty_page(mut self, enabled: bool) -> Self {
        self.exhaust_on_empty_page = enabled;
        self
    }

    /// Set how many recycled views are kept per cell type.
    pub fn with_reuse_slots_per_type(mut self, slots: usize) -> Self {
        self.reuse_slots_per_type = slots;
        self
    }
}
