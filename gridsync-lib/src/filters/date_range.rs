//! Date-range toolbar filter.

use crate::protocol::InitPayload;
use crate::session::DateRange;
use crate::session::TableSession;
use crate::session::UiEvent;
use crate::session::UiEventKind;

/// Markup of the built-in toolbar: two native date inputs.
pub const NATIVE_DATE_RANGE_HTML: &str = concat!(
    r#"<div class="daterange" style="float: left; margin-right: 6px;">"#,
    r#"From: <input type="date" class="date_from datepicker">"#,
    r#"To: <input type="date" class="date_to datepicker">"#,
    "</div>",
);

/// Installs a date-range widget on a session.
///
/// An implementation owns the toolbar markup and its wiring. It is expected
/// to store the chosen bounds with [`TableSession::set_date_range`] and then
/// redraw with [`TableSession::draw`].
///
/// # Example
///
/// ```ignore
/// struct PickerWidget;
///
/// impl DateRangeWidget for PickerWidget {
///     fn install(&self, session: &TableSession, _payload: &InitPayload) {
///         if let Ok(grid) = session.grid() {
///             grid.set_toolbar(r#"<input class="date_from"> <input class="date_to">"#);
///         }
///         session.on(UiEventKind::DateInput, |session, event| {
///             // parse the picker values, then:
///             // session.set_date_range(range);
///             session.draw().is_ok()
///         });
///     }
/// }
/// ```
pub trait DateRangeWidget: Send + Sync {
    /// Renders the widget and binds its inputs.
    fn install(&self, session: &TableSession, payload: &InitPayload);
}

/// Built-in widget: two native date inputs in the toolbar area.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDateRange;

impl DateRangeWidget for NativeDateRange {
    fn install(&self, session: &TableSession, _payload: &InitPayload) {
        match session.grid() {
            Ok(grid) => grid.set_toolbar(NATIVE_DATE_RANGE_HTML),
            Err(e) => {
                log::warn!("{}: date range not installed: {}", session.mount(), e);
                return;
            }
        }

        session.on(UiEventKind::DateInput, |session, event| {
            let UiEvent::DateInputChanged { date_from, date_to } = event else {
                return false;
            };
            session.set_date_range(DateRange::parse(date_from, date_to));
            match session.draw() {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("{}: redraw after date change failed: {}", session.mount(), e);
                    false
                }
            }
        });
    }
}

/// Installs the configured date-range widget, or the built-in one.
///
/// Does nothing when the payload disables date filters.
pub fn install_date_range(session: &TableSession, payload: &InitPayload) {
    if !payload.show_date_filters {
        return;
    }
    match session.config().date_range_widget.clone() {
        Some(widget) => widget.install(session, payload),
        None => NativeDateRange.install(session, payload),
    }
    log::debug!("{}: date range installed", session.mount());
}
