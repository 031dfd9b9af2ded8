use chrono::{Duration, NaiveDateTime};

use costlay_core::page::UsageRow;

const MODELS: [&str; 3] = ["claude-4-sonnet", "gpt-5", "gemini-2.5-pro"];

/// Kind labels as the dashboard shows them; cycled through by index
const KINDS: [&str; 4] = [
    "Included in Pro",
    "Usage-based",
    "Included in Pro",
    "Errored, Not Charged",
];

/// Layout of the dashboard's date tooltips
pub const TOOLTIP_FORMAT: &str = "%b %d, %Y, %I:%M:%S %p";

/// Deterministic usage event number `index` at `at`
pub fn usage_row(at: NaiveDateTime, index: usize) -> UsageRow {
    let kind = KINDS[index % KINDS.len()];
    let (cost, cost_detail) = if kind.starts_with("Errored") {
        ("$0.00".to_string(), None)
    } else {
        let cents = 4 + (index * 37) % 180;
        let full = cents as f64 / 100.0 + (index % 7) as f64 * 0.0013;
        (format!("${:.2}", full), Some(format!("${:.4}", full)))
    };

    UsageRow {
        date: at.format(TOOLTIP_FORMAT).to_string(),
        model: MODELS[index % MODELS.len()].to_string(),
        kind: kind.to_string(),
        tokens: format!("{}.{}K", 3 + index % 40, index % 10),
        cost,
        cost_detail,
    }
}

/// `count` events starting at `start`, `step` apart, newest first
pub fn usage_rows(start: NaiveDateTime, count: usize, step: Duration) -> Vec<UsageRow> {
    let mut rows: Vec<UsageRow> = (0..count)
        .map(|index| usage_row(start + step * index as i32, index))
        .collect();
    rows.reverse();
    rows
}
