//! Extract usage records from the host's usage table.
//!
//! Every row is parsed independently; a row with a missing or unreadable
//! date, cost or (in categorized mode) kind simply yields no record.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::time::parse_timestamp;
use super::types::{CostCategory, UsageRecord};
use crate::config::{CategorySettings, Settings};
use crate::dom::{Document, NodeId};

/// Currency-prefixed decimal, e.g. `$0.0412`
static COST_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([\d.]+)").unwrap());

/// Numeric part of the first `$<number>` in `text`
pub fn match_cost(text: &str) -> Option<&str> {
    COST_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse a currency-prefixed decimal (`"$1.20"` → `1.2`)
pub fn parse_cost(text: &str) -> Option<f64> {
    let digits = match_cost(text)?;
    // Only the leading decimal counts: `$1.2.3` reads as 1.2
    let end = digits
        .match_indices('.')
        .nth(1)
        .map_or(digits.len(), |(index, _)| index);
    digits[..end]
        .parse::<f64>()
        .ok()
        .filter(|cost| cost.is_finite() && *cost >= 0.0)
}

/// Classify a kind label by substring match on the configured fragments
pub fn classify_category(label: &str, categories: &CategorySettings) -> CostCategory {
    if categories.included.iter().any(|f| label.contains(f.as_str())) {
        CostCategory::Included
    } else if categories.overage.iter().any(|f| label.contains(f.as_str())) {
        CostCategory::Overage
    } else {
        CostCategory::Unknown
    }
}

/// Body rows (`tbody > tr`) of `table`
pub fn body_rows(doc: &Document, table: NodeId) -> Vec<NodeId> {
    doc.children_by_tag(table, "tbody")
        .into_iter()
        .flat_map(|tbody| doc.children_by_tag(tbody, "tr"))
        .collect()
}

/// Cells rendered by the host, i.e. without the overlay's marker attribute
pub fn host_cells(doc: &Document, row: NodeId, marker_attribute: &str) -> Vec<NodeId> {
    doc.children_by_tag(row, "td")
        .into_iter()
        .filter(|cell| !doc.has_attribute(*cell, marker_attribute))
        .collect()
}

/// Text that carries the cell's cost.
///
/// A nested element whose `title` contains `$` holds the full-precision
/// value; otherwise the visible text is used.
pub fn cost_source_text(doc: &Document, cell: NodeId) -> String {
    let detailed = doc.descendants(cell).into_iter().find_map(|node| {
        doc.attribute(node, "title")
            .filter(|title| title.contains('$'))
            .map(str::to_string)
    });
    detailed.unwrap_or_else(|| doc.text_content(cell))
}

/// The host cell holding a row's cost (the last host cell)
pub fn cost_cell(doc: &Document, row: NodeId, marker_attribute: &str) -> Option<NodeId> {
    host_cells(doc, row, marker_attribute).last().copied()
}

/// Parse one body row into a record
pub fn parse_row(doc: &Document, row: NodeId, settings: &Settings) -> Option<UsageRecord> {
    let cells = host_cells(doc, row, &settings.targets.marker_attribute);

    let date_title = doc.attribute(*cells.first()?, "title")?;
    let Some(time) = parse_timestamp(date_title, settings.hour_basis) else {
        trace!("Skipping {}: unreadable date {:?}", row, date_title);
        return None;
    };

    let category = if settings.categorized {
        let label = cells
            .get(settings.categories.cell_index)
            .and_then(|cell| doc.attribute(*cell, "title"))
            .map(str::trim)
            .filter(|label| !label.is_empty())?;
        classify_category(label, &settings.categories)
    } else {
        CostCategory::Unknown
    };

    let cost_text = cost_source_text(doc, *cells.last()?);
    let Some(cost) = parse_cost(&cost_text) else {
        trace!("Skipping {}: no cost in {:?}", row, cost_text);
        return None;
    };

    Some(UsageRecord {
        time,
        cost,
        category,
    })
}

/// Extract every parsable row of `table`, in table order
pub fn extract_records(doc: &Document, table: NodeId, settings: &Settings) -> Vec<UsageRecord> {
    body_rows(doc, table)
        .into_iter()
        .filter_map(|row| parse_row(doc, row, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HourBasis;
    use crate::page::{build_usage_page, UsageRow};
    use chrono::{TimeZone, Utc};

    fn settings() -> Settings {
        Settings {
            hour_basis: HourBasis::Utc,
            ..Settings::default()
        }
    }

    fn row(date: &str, kind: &str, cost: &str, detail: Option<&str>) -> UsageRow {
        UsageRow {
            date: date.to_string(),
            model: "gpt-5".to_string(),
            kind: kind.to_string(),
            tokens: "1K".to_string(),
            cost: cost.to_string(),
            cost_detail: detail.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_cost() {
        assert_eq!(parse_cost("$1.20"), Some(1.2));
        assert_eq!(parse_cost("Cost: $0.0412 total"), Some(0.0412));
        assert_eq!(parse_cost("$0"), Some(0.0));
        assert_eq!(parse_cost("1.20"), None);
        assert_eq!(parse_cost("Included"), None);
        assert_eq!(parse_cost("$1.2.3"), Some(1.2));
        assert_eq!(parse_cost("$12..5"), Some(12.0));
        assert_eq!(parse_cost("$.5"), Some(0.5));
        assert_eq!(parse_cost("$."), None);
    }

    #[test]
    fn test_classify_category() {
        let categories = CategorySettings::default();
        assert_eq!(
            classify_category("Included in Pro", &categories),
            CostCategory::Included
        );
        assert_eq!(
            classify_category("Usage-based", &categories),
            CostCategory::Overage
        );
        assert_eq!(
            classify_category("Errored, Not Charged", &categories),
            CostCategory::Unknown
        );
    }

    #[test]
    fn test_extract_prefers_full_precision_title() {
        let mut doc = Document::new();
        let page = build_usage_page(
            &mut doc,
            "Filtered Usage Events",
            &[
                row("2024-01-01T10:15", "Included", "$0.04", Some("$0.0412")),
                row("2024-01-01T10:45", "Usage-based", "$2.30", None),
            ],
        )
        .unwrap();

        let records = extract_records(&doc, page.table, &settings());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cost, 0.0412);
        assert_eq!(records[0].category, CostCategory::Included);
        assert_eq!(
            records[0].time,
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 15, 0).unwrap()
        );
        assert_eq!(records[1].cost, 2.3);
        assert_eq!(records[1].category, CostCategory::Overage);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let mut doc = Document::new();
        let page = build_usage_page(
            &mut doc,
            "Filtered Usage Events",
            &[
                row("not a date", "Included", "$1.00", None),
                row("2024-01-01T10:15", "", "$1.00", None),
                row("2024-01-01T10:15", "Included", "-", None),
                row("2024-01-01T10:15", "Included", "$1.00", None),
            ],
        )
        .unwrap();

        let records = extract_records(&doc, page.table, &settings());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cost, 1.0);
    }

    #[test]
    fn test_row_without_date_title_is_skipped() {
        let mut doc = Document::new();
        let page = build_usage_page(&mut doc, "Filtered Usage Events", &[]).unwrap();
        let tr = doc.create_element("tr");
        let td = doc.create_element("td");
        doc.set_text_content(td, "$1.00").unwrap();
        doc.append_child(tr, td).unwrap();
        doc.append_child(page.tbody, tr).unwrap();

        assert!(extract_records(&doc, page.table, &settings()).is_empty());
    }

    #[test]
    fn test_uncategorized_mode_ignores_kind() {
        let mut doc = Document::new();
        let page = build_usage_page(
            &mut doc,
            "Filtered Usage Events",
            &[row("2024-01-01T10:15", "", "$1.00", None)],
        )
        .unwrap();
        let settings = Settings {
            categorized: false,
            ..settings()
        };

        let records = extract_records(&doc, page.table, &settings);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, CostCategory::Unknown);
    }

    #[test]
    fn test_marked_cells_are_not_cost_cells() {
        let mut doc = Document::new();
        let settings = settings();
        let page = build_usage_page(
            &mut doc,
            "Filtered Usage Events",
            &[row("2024-01-01T10:15", "Included", "$1.00", None)],
        )
        .unwrap();
        let tr = body_rows(&doc, page.table)[0];
        let injected = doc.create_element_with(
            "td",
            &[(settings.targets.marker_attribute.as_str(), "cost")],
        );
        doc.set_text_content(injected, "9.99").unwrap();
        doc.append_child(tr, injected).unwrap();

        let records = extract_records(&doc, page.table, &settings);
        assert_eq!(records[0].cost, 1.0);
    }
}
