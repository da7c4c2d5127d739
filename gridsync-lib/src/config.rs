//! Table configuration shared by every session of a controller.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Map;
use serde_json::Value;

use crate::filters::DateRangeWidget;

/// Markup shown in the filter row above the first non-searchable column.
pub const DEFAULT_SEARCH_ICON: &str =
    r#"<div style="border: 1px solid #ccc; text-align: center;">?</div>"#;

/// Configuration applied to every table a controller creates.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gridsync_lib::TableConfig;
///
/// let config = TableConfig::default()
///     .with_search_icon(r#"<i class="fa fa-search"></i>"#)
///     .with_settle_delay(Duration::from_millis(100));
/// assert_eq!(config.csrf_cookie_name, "csrftoken");
/// ```
#[derive(Clone)]
pub struct TableConfig {
    /// Language strings handed to the grid library.
    ///
    /// Default: empty
    pub language: Map<String, Value>,

    /// Markup of the search icon cell in the column filter row.
    pub search_icon_html: String,

    /// Placeholder of the column filter inputs.
    ///
    /// Default: `...`
    pub filter_placeholder: String,

    /// Caller-supplied date-range widget; the built-in one is used when unset.
    pub date_range_widget: Option<Arc<dyn DateRangeWidget>>,

    /// Wait between the first render and the column width recalculation.
    ///
    /// Default: 200 ms
    pub settle_delay: Duration,

    /// Cookie holding the anti-forgery token.
    ///
    /// Default: `csrftoken`
    pub csrf_cookie_name: String,

    /// Header carrying the anti-forgery token on page requests.
    ///
    /// Default: `X-CSRFToken`
    pub csrf_header_name: String,

    /// Row field identifying a row when fetching its details.
    ///
    /// Default: `id`
    pub detail_id_field: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            language: Map::new(),
            search_icon_html: DEFAULT_SEARCH_ICON.to_string(),
            filter_placeholder: "...".to_string(),
            date_range_widget: None,
            settle_delay: Duration::from_millis(200),
            csrf_cookie_name: "csrftoken".to_string(),
            csrf_header_name: "X-CSRFToken".to_string(),
            detail_id_field: "id".to_string(),
        }
    }
}

impl TableConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the language strings.
    pub fn with_language(mut self, language: Map<String, Value>) -> Self {
        self.language = language;
        self
    }

    /// Sets the search icon markup.
    pub fn with_search_icon(mut self, html: impl Into<String>) -> Self {
        self.search_icon_html = html.into();
        self
    }

    /// Sets the column filter placeholder.
    pub fn with_filter_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.filter_placeholder = placeholder.into();
        self
    }

    /// Installs a caller-supplied date-range widget.
    pub fn with_date_range_widget<W: DateRangeWidget + 'static>(mut self, widget: W) -> Self {
        self.date_range_widget = Some(Arc::new(widget));
        self
    }

    /// Sets the settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the anti-forgery cookie and header names.
    pub fn with_csrf_names(mut self, cookie: impl Into<String>, header: impl Into<String>) -> Self {
        self.csrf_cookie_name = cookie.into();
        self.csrf_header_name = header.into();
        self
    }

    /// Sets the row field used as the details key.
    pub fn with_detail_id_field(mut self, field: impl Into<String>) -> Self {
        self.detail_id_field = field.into();
        self
    }
}

impl fmt::Debug for TableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableConfig")
            .field("language", &self.language)
            .field("search_icon_html", &self.search_icon_html)
            .field("filter_placeholder", &self.filter_placeholder)
            .field("date_range_widget", &self.date_range_widget.is_some())
            .field("settle_delay", &self.settle_delay)
            .field("csrf_cookie_name", &self.csrf_cookie_name)
            .field("csrf_header_name", &self.csrf_header_name)
            .field("detail_id_field", &self.detail_id_field)
            .finish()
    }
}
