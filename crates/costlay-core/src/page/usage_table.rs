//! Host-side markup of the usage events table.
//!
//! This mirrors what the dashboard renders so the demo, the CLI fixtures and
//! the tests exercise the overlay against the same structure: a heading
//! paragraph, then a table whose rows carry the timestamp in the first
//! cell's `title`, the kind in the third cell's `title`, and the cost in the
//! last cell (full precision in a nested span's `title`).

use serde::{Deserialize, Serialize};

use crate::dom::{Document, DomError, NodeId};

/// Column headers rendered by the host
const HEADERS: [&str; 5] = ["Date", "Model", "Kind", "Tokens", "Cost"];

/// One usage event as the host renders it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRow {
    /// Timestamp as shown in the date cell's tooltip
    pub date: String,
    #[serde(default)]
    pub model: String,
    /// Kind label (e.g. "Included in Pro", "Usage-based")
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub tokens: String,
    /// Visible cost text (e.g. "$0.04")
    #[serde(default)]
    pub cost: String,
    /// Full-precision cost tooltip (e.g. "$0.0412")
    #[serde(default)]
    pub cost_detail: Option<String>,
}

/// Handles to the host nodes of a built usage page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsagePage {
    pub container: NodeId,
    pub heading: NodeId,
    pub table: NodeId,
    pub tbody: NodeId,
}

/// Build the usage section under `<body>` and render `rows` into it
pub fn build_usage_page(
    doc: &mut Document,
    heading_text: &str,
    rows: &[UsageRow],
) -> Result<UsagePage, DomError> {
    let container = doc.create_element_with("div", &[("class", "flex flex-col gap-4")]);
    doc.append_child(doc.body(), container)?;

    let heading_wrap = doc.create_element_with("div", &[("class", "flex items-center")]);
    let heading = doc.create_element_with("p", &[("class", "text-sm font-medium")]);
    doc.set_text_content(heading, heading_text)?;
    doc.append_child(heading_wrap, heading)?;
    doc.append_child(container, heading_wrap)?;

    let scroll = doc.create_element_with("div", &[("class", "overflow-x-auto")]);
    let table = doc.create_element_with("table", &[("class", "w-full text-sm")]);
    let thead = doc.create_element("thead");
    let header_row = doc.create_element("tr");
    for label in HEADERS {
        let th = doc.create_element_with(
            "th",
            &[("scope", "col"), ("class", "px-3 py-2 font-semibold")],
        );
        doc.set_text_content(th, label)?;
        doc.append_child(header_row, th)?;
    }
    doc.append_child(thead, header_row)?;
    let tbody = doc.create_element("tbody");
    doc.append_child(table, thead)?;
    doc.append_child(table, tbody)?;
    doc.append_child(scroll, table)?;
    doc.append_child(container, scroll)?;

    render_usage_rows(doc, tbody, rows)?;

    Ok(UsagePage {
        container,
        heading,
        table,
        tbody,
    })
}

/// Re-render the body rows from scratch, the way the host framework does
pub fn render_usage_rows(
    doc: &mut Document,
    tbody: NodeId,
    rows: &[UsageRow],
) -> Result<(), DomError> {
    doc.clear_children(tbody)?;
    for row in rows {
        let tr = doc.create_element_with("tr", &[("class", "border-b")]);

        let date = doc.create_element_with("td", &[("title", row.date.as_str())]);
        doc.set_text_content(date, &row.date)?;
        doc.append_child(tr, date)?;

        let model = doc.create_element("td");
        doc.set_text_content(model, &row.model)?;
        doc.append_child(tr, model)?;

        let kind = doc.create_element_with("td", &[("title", row.kind.as_str())]);
        doc.set_text_content(kind, &row.kind)?;
        doc.append_child(tr, kind)?;

        let tokens = doc.create_element("td");
        doc.set_text_content(tokens, &row.tokens)?;
        doc.append_child(tr, tokens)?;

        let cost = doc.create_element_with("td", &[("class", "text-right")]);
        match &row.cost_detail {
            Some(detail) => {
                let span = doc.create_element_with("span", &[("title", detail.as_str())]);
                doc.set_text_content(span, &row.cost)?;
                doc.append_child(cost, span)?;
            }
            None => doc.set_text_content(cost, &row.cost)?,
        }
        doc.append_child(tr, cost)?;

        doc.append_child(tbody, tr)?;
    }
    Ok(())
}
