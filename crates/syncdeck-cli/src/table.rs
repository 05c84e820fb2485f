use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use syncdeck_core::records::COLUMNS;
use syncdeck_core::{DataPanel, NormalizedRecord};

/// Render records as a table. An empty slice renders a short notice instead.
pub fn render_records(rows: &[NormalizedRecord], placeholder: &str) -> String {
    if rows.is_empty() {
        return "No data available".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(COLUMNS);
    for row in rows {
        table.add_row(row.cells(placeholder));
    }
    table.to_string()
}

/// Render the data panel: a title line, then the table. `None` when the
/// panel has no rows.
pub fn render_panel(panel: &DataPanel, placeholder: &str) -> Option<String> {
    let rows = panel.rows()?;
    let title = match panel.source() {
        Some(kind) => format!("{kind} data ({} rows)", rows.len()),
        None => format!("{} rows", rows.len()),
    };
    Some(format!("{title}\n{}", render_records(rows, placeholder)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rows_render_notice() {
        assert_eq!(render_records(&[], "-"), "No data available");
    }

    #[test]
    fn table_has_headers_and_cells() {
        let rows = vec![NormalizedRecord {
            id: Some("1".into()),
            name: Some("Sheet1".into()),
            item_type: Some("Table".into()),
            ..Default::default()
        }];
        let out = render_records(&rows, "-");
        assert!(out.contains("MIME Type"));
        assert!(out.contains("Sheet1"));
        assert!(out.contains("Table"));
    }

    #[test]
    fn empty_panel_renders_nothing() {
        assert!(render_panel(&DataPanel::default(), "-").is_none());
    }
}
