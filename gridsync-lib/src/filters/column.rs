//! Per-column text filters injected into the grid header.

use crate::error::SessionError;
use crate::protocol::ColumnDescriptor;
use crate::protocol::InitPayload;
use crate::session::TableSession;
use crate::session::UiEvent;
use crate::session::UiEventKind;

/// Class of the header row holding the filter inputs.
pub const FILTER_ROW_CLASS: &str = "datatable-column-filter-row";

/// One cell of the filter row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCell {
    /// Text input filtering the column at `index`.
    Input { index: usize, placeholder: String },
    /// Search icon markup.
    Icon(String),
    Empty,
}

impl FilterCell {
    fn to_html(&self) -> String {
        match self {
            Self::Input { index, placeholder } => format!(
                r#"<th><input type="text" data-index="{}" placeholder="{}" /></th>"#,
                index,
                escape_attr(placeholder)
            ),
            Self::Icon(html) => format!("<th>{html}</th>"),
            Self::Empty => "<th>&nbsp;</th>".to_string(),
        }
    }
}

/// The filter row: one cell per visible column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRow {
    cells: Vec<FilterCell>,
}

impl FilterRow {
    /// Lays out the row for `columns`.
    ///
    /// Visible searchable columns get an input tagged with their column
    /// index. The first visible non-searchable column gets the icon, later
    /// ones an empty cell. Hidden columns get no cell.
    pub fn build(columns: &[ColumnDescriptor], icon_html: &str, placeholder: &str) -> Self {
        let mut icon_placed = false;
        let cells = columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.visible)
            .map(|(index, column)| {
                if column.searchable {
                    FilterCell::Input {
                        index,
                        placeholder: placeholder.to_string(),
                    }
                } else if !icon_placed {
                    icon_placed = true;
                    FilterCell::Icon(icon_html.to_string())
                } else {
                    FilterCell::Empty
                }
            })
            .collect();
        Self { cells }
    }

    /// Cells in column order.
    pub fn cells(&self) -> &[FilterCell] {
        &self.cells
    }

    /// Number of text inputs.
    pub fn input_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, FilterCell::Input { .. }))
            .count()
    }

    /// Markup of the row.
    pub fn to_html(&self) -> String {
        let cells: String = self.cells.iter().map(FilterCell::to_html).collect();
        format!(r#"<tr class="{FILTER_ROW_CLASS}">{cells}</tr>"#)
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Appends the filter row to the grid header and binds its inputs.
///
/// Does nothing when the payload disables column filters.
pub fn install_column_filters(
    session: &TableSession,
    payload: &InitPayload,
) -> Result<(), SessionError> {
    if !payload.show_column_filters {
        return Ok(());
    }

    let config = session.config();
    let row = FilterRow::build(
        &payload.columns,
        &config.search_icon_html,
        &config.filter_placeholder,
    );
    session.grid()?.append_header_row(&row.to_html());
    log::debug!(
        "{}: column filters installed ({} inputs)",
        session.mount(),
        row.input_count()
    );

    session.on(UiEventKind::ColumnFilter, |session, event| {
        let UiEvent::ColumnFilterInput { index, value, .. } = event else {
            return false;
        };
        apply_column_filter(session, *index, value)
    });
    Ok(())
}

/// Sets the search term of column `index` and redraws, unless the term is unchanged.
///
/// Returns `true` if a redraw was triggered.
pub fn apply_column_filter(session: &TableSession, index: usize, value: &str) -> bool {
    let grid = match session.grid() {
        Ok(grid) => grid,
        Err(e) => {
            log::warn!("{}: column filter ignored: {}", session.mount(), e);
            return false;
        }
    };
    if grid.column_search(index) == value {
        return false;
    }
    log::debug!("{}: column {} search '{}'", session.mount(), index, value);
    grid.set_column_search(index, value);
    grid.draw();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICON: &str = "<icon-markup>";

    fn column(title: &str, visible: bool, searchable: bool) -> ColumnDescriptor {
        ColumnDescriptor::new(title)
            .visible(visible)
            .searchable(searchable)
    }

    #[test]
    fn test_name_and_actions() {
        let row = FilterRow::build(
            &[column("Name", true, true), column("Actions", true, false)],
            ICON,
            "...",
        );
        assert_eq!(
            row.to_html(),
            r#"<tr class="datatable-column-filter-row"><th><input type="text" data-index="0" placeholder="..." /></th><th><icon-markup></th></tr>"#
        );
    }

    #[test]
    fn test_cells_follow_visible_columns() {
        let columns = [
            column("", true, false),
            column("Id", false, true),
            column("Code", true, true),
            column("Notes", true, false),
            column("Amount", true, true),
            column("Secret", false, false),
        ];
        let row = FilterRow::build(&columns, ICON, "...");

        assert_eq!(row.cells().len(), 4);
        assert_eq!(row.input_count(), 2);
        assert_eq!(row.cells()[0], FilterCell::Icon(ICON.into()));
        assert!(matches!(row.cells()[1], FilterCell::Input { index: 2, .. }));
        assert_eq!(row.cells()[2], FilterCell::Empty);
        assert!(matches!(row.cells()[3], FilterCell::Input { index: 4, .. }));
    }

    #[test]
    fn test_icon_lands_on_first_non_searchable_column() {
        let row = FilterRow::build(
            &[
                column("Code", true, true),
                column("Status", true, false),
                column("Tools", true, false),
            ],
            ICON,
            "...",
        );
        let icons = row
            .cells()
            .iter()
            .filter(|c| matches!(c, FilterCell::Icon(_)))
            .count();
        assert_eq!(icons, 1);
        assert_eq!(row.cells()[1], FilterCell::Icon(ICON.into()));
        assert_eq!(row.cells()[2], FilterCell::Empty);
    }

    #[test]
    fn test_all_searchable_has_no_icon() {
        let row = FilterRow::build(&[column("A", true, true), column("B", true, true)], ICON, "");
        assert!(!row.to_html().contains(ICON));
    }

    #[test]
    fn test_placeholder_is_escaped() {
        let row = FilterRow::build(&[column("A", true, true)], ICON, r#"Search "A""#);
        assert!(row.to_html().contains(r#"placeholder="Search &quot;A&quot;""#));
    }
}
