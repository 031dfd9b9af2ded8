//! Idempotent injection of the derived "Cost ($)" column.
//!
//! The header and every processed row carry the marker attribute; marked
//! nodes are skipped on later passes. Rows the host re-renders come back
//! unmarked and get patched again.

use serde::Serialize;
use tracing::debug;

use crate::config::Settings;
use crate::dom::{Document, DomError, NodeId};
use crate::usage::parser::{body_rows, cost_cell, cost_source_text, match_cost};

/// Header label of the injected column
pub const COST_HEADER: &str = "Cost ($)";

/// Cell text for rows without a parsable cost
const MISSING_COST: &str = "-";

const HEADER_MARK: &str = "header";
const ROW_MARK: &str = "processed";
const CELL_MARK: &str = "cost";

/// What a patch pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    /// Whether the header cell was added in this pass
    pub header_added: bool,
    /// Rows that received a cost cell in this pass
    pub rows_patched: usize,
}

impl PatchReport {
    pub fn is_noop(&self) -> bool {
        !self.header_added && self.rows_patched == 0
    }
}

/// Ensure the cost header and one cost cell per body row exist
pub fn inject_cost_column(
    doc: &mut Document,
    table: NodeId,
    settings: &Settings,
) -> Result<PatchReport, DomError> {
    let marker = settings.targets.marker_attribute.as_str();
    let mut report = PatchReport::default();

    if let Some(header_row) = header_row(doc, table) {
        let already = doc
            .children_by_tag(header_row, "th")
            .into_iter()
            .any(|th| doc.has_attribute(th, marker));
        if !already {
            let th = doc.create_element_with(
                "th",
                &[
                    ("scope", "col"),
                    ("class", "px-3 py-2 font-semibold text-right"),
                    (marker, HEADER_MARK),
                ],
            );
            doc.set_text_content(th, COST_HEADER)?;
            doc.append_child(header_row, th)?;
            report.header_added = true;
        }
    }

    let pending: Vec<NodeId> = body_rows(doc, table)
        .into_iter()
        .filter(|row| !doc.has_attribute(*row, marker))
        .collect();

    for row in pending {
        doc.set_attribute(row, marker, ROW_MARK)?;
        let text = row_cost_text(doc, row, marker);
        let cell = doc.create_element_with(
            "td",
            &[
                ("class", "px-3 py-2 text-right font-mono text-xs"),
                (marker, CELL_MARK),
            ],
        );
        doc.set_text_content(cell, &text)?;
        doc.append_child(row, cell)?;
        report.rows_patched += 1;
    }

    if !report.is_noop() {
        debug!(
            "Cost column: header_added={}, rows_patched={}",
            report.header_added, report.rows_patched
        );
    }
    Ok(report)
}

/// First `thead > tr` of `table`
fn header_row(doc: &Document, table: NodeId) -> Option<NodeId> {
    doc.children_by_tag(table, "thead")
        .into_iter()
        .find_map(|thead| doc.children_by_tag(thead, "tr").into_iter().next())
}

/// Numeric cost text for the injected cell, or `-`
fn row_cost_text(doc: &Document, row: NodeId, marker: &str) -> String {
    cost_cell(doc, row, marker)
        .map(|cell| cost_source_text(doc, cell))
        .and_then(|text| match_cost(&text).map(str::to_string))
        .unwrap_or_else(|| MISSING_COST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{build_usage_page, render_usage_rows, UsageRow};

    fn rows() -> Vec<UsageRow> {
        vec![
            UsageRow {
                date: "2024-01-01T10:15".to_string(),
                model: "gpt-5".to_string(),
                kind: "Included".to_string(),
                tokens: "1K".to_string(),
                cost: "$0.04".to_string(),
                cost_detail: Some("$0.0412".to_string()),
            },
            UsageRow {
                date: "2024-01-01T10:45".to_string(),
                model: "gpt-5".to_string(),
                kind: "Usage-based".to_string(),
                tokens: "1K".to_string(),
                cost: "Free".to_string(),
                cost_detail: None,
            },
        ]
    }

    fn marked_cells(doc: &Document, row: NodeId, marker: &str) -> Vec<NodeId> {
        doc.children_by_tag(row, "td")
            .into_iter()
            .filter(|cell| doc.has_attribute(*cell, marker))
            .collect()
    }

    #[test]
    fn test_adds_header_and_cells() {
        let settings = Settings::default();
        let marker = settings.targets.marker_attribute.clone();
        let mut doc = Document::new();
        let page = build_usage_page(&mut doc, "Filtered Usage Events", &rows()).unwrap();

        let report = inject_cost_column(&mut doc, page.table, &settings).unwrap();
        assert!(report.header_added);
        assert_eq!(report.rows_patched, 2);

        let header = header_row(&doc, page.table).unwrap();
        let last_th = *doc.children_by_tag(header, "th").last().unwrap();
        assert_eq!(doc.text_content(last_th), "Cost ($)");

        let body = body_rows(&doc, page.table);
        let first = marked_cells(&doc, body[0], &marker);
        assert_eq!(doc.text_content(first[0]), "0.0412");
        let second = marked_cells(&doc, body[1], &marker);
        assert_eq!(doc.text_content(second[0]), "-");
    }

    #[test]
    fn test_second_pass_is_noop() {
        let settings = Settings::default();
        let marker = settings.targets.marker_attribute.clone();
        let mut doc = Document::new();
        let page = build_usage_page(&mut doc, "Filtered Usage Events", &rows()).unwrap();

        inject_cost_column(&mut doc, page.table, &settings).unwrap();
        let mutations = doc.mutation_count();
        let report = inject_cost_column(&mut doc, page.table, &settings).unwrap();

        assert!(report.is_noop());
        assert_eq!(doc.mutation_count(), mutations);
        let header = header_row(&doc, page.table).unwrap();
        let derived: Vec<_> = doc
            .children_by_tag(header, "th")
            .into_iter()
            .filter(|th| doc.has_attribute(*th, &marker))
            .collect();
        assert_eq!(derived.len(), 1);
        for row in body_rows(&doc, page.table) {
            assert_eq!(marked_cells(&doc, row, &marker).len(), 1);
        }
    }

    #[test]
    fn test_rerendered_rows_are_patched_again() {
        let settings = Settings::default();
        let mut doc = Document::new();
        let page = build_usage_page(&mut doc, "Filtered Usage Events", &rows()).unwrap();
        inject_cost_column(&mut doc, page.table, &settings).unwrap();

        render_usage_rows(&mut doc, page.tbody, &rows()[..1]).unwrap();
        let report = inject_cost_column(&mut doc, page.table, &settings).unwrap();

        assert!(!report.header_added);
        assert_eq!(report.rows_patched, 1);
    }

    #[test]
    fn test_table_without_thead() {
        let settings = Settings::default();
        let mut doc = Document::new();
        let table = doc.create_element("table");
        let tbody = doc.create_element("tbody");
        doc.append_child(table, tbody).unwrap();
        doc.append_child(doc.body(), table).unwrap();
        render_usage_rows(&mut doc, tbody, &rows()).unwrap();

        let report = inject_cost_column(&mut doc, table, &settings).unwrap();
        assert!(!report.header_added);
        assert_eq!(report.rows_patched, 2);
    }
}
