//! Row expand/collapse controls.

use url::Url;

use super::load_row_details;
use crate::grid::RowIndex;
use crate::session::TableSession;
use crate::session::UiEvent;
use crate::session::UiEventKind;

/// Marker class of a row whose detail pane is shown.
pub const EXPANDED_CLASS: &str = "shown";

/// Binds row tool clicks to detail toggling.
///
/// Rebinding replaces the previous handler.
pub fn bind_row_tools(session: &TableSession, detail_endpoint: &Url, id_field: &str) {
    let endpoint = detail_endpoint.clone();
    let id_field = id_field.to_string();
    session.on(UiEventKind::RowTool, move |session, event| {
        let UiEvent::RowToolClick { row } = event else {
            return false;
        };
        toggle_row_details(session, *row, &endpoint, &id_field)
    });
}

/// Hides the row's detail pane if shown, otherwise fetches and shows it.
///
/// The shown state lives in the grid's child slot for the row.
pub fn toggle_row_details(
    session: &TableSession,
    row: RowIndex,
    endpoint: &Url,
    id_field: &str,
) -> bool {
    let grid = match session.grid() {
        Ok(grid) => grid,
        Err(e) => {
            log::warn!("{}: row tools ignored: {}", session.mount(), e);
            return false;
        }
    };

    if grid.is_child_shown(row) {
        if let Some(pane) = grid.hide_child(row) {
            pane.cancel();
        }
        grid.set_row_class(row, EXPANDED_CLASS, false);
        return true;
    }

    let Some(data) = grid.row_data(row) else {
        log::warn!("{}: no row at {:?}", session.mount(), row);
        return false;
    };
    let pane = load_row_details(session, &data, endpoint, id_field);
    grid.show_child(row, pane);
    grid.set_row_class(row, EXPANDED_CLASS, true);
    true
}
