//! Date-range annotations carried by every page request.

use chrono::NaiveDate;

/// Wire format of date bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Request field holding the lower bound.
pub const DATE_FROM_FIELD: &str = "date_from";

/// Request field holding the upper bound.
pub const DATE_TO_FIELD: &str = "date_to";

/// Optional lower and upper date bounds of a session.
///
/// Unset bounds go on the wire as empty strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a range from optional bounds.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Parses widget values; empty or invalid values leave the bound unset.
    pub fn parse(from: &str, to: &str) -> Self {
        Self {
            from: parse_bound(DATE_FROM_FIELD, from),
            to: parse_bound(DATE_TO_FIELD, to),
        }
    }

    /// Lower bound as sent on the wire.
    pub fn from_param(&self) -> String {
        format_bound(self.from)
    }

    /// Upper bound as sent on the wire.
    pub fn to_param(&self) -> String {
        format_bound(self.to)
    }

    /// Returns `true` if neither bound is set.
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

fn parse_bound(field: &str, value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            log::warn!("ignoring {} '{}': {}", field, value, e);
            None
        }
    }
}

fn format_bound(bound: Option<NaiveDate>) -> String {
    bound
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
