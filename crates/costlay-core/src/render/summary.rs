//! One-line cost total for the visible date range.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::mount::{mount, remove_by_id, visualization_anchor, MountPoint};
use super::theme::inline_style;
use super::{RenderContext, RenderError, RenderOutcome};
use crate::config::HourBasis;
use crate::dom::Document;
use crate::usage::time::{format_in, same_day};
use crate::usage::UsageTotals;

const DAY_FORMAT: &str = "%a, %b %-d";
const TIME_FORMAT: &str = "%-I:%M %p";

/// `Mon, Jan 1, 10:15 AM - 10:45 AM` or `Mon, Jan 1 10:15 AM - Tue, Jan 2 9:05 AM`
pub fn format_range(earliest: DateTime<Utc>, latest: DateTime<Utc>, basis: HourBasis) -> String {
    let day = |ts| format_in(ts, basis, DAY_FORMAT);
    let time = |ts| format_in(ts, basis, TIME_FORMAT);
    if same_day(earliest, latest, basis) {
        format!("{}, {} - {}", day(earliest), time(earliest), time(latest))
    } else {
        format!(
            "{} {} - {} {}",
            day(earliest),
            time(earliest),
            day(latest),
            time(latest)
        )
    }
}

pub fn summary_text(totals: &UsageTotals, categorized: bool, basis: HourBasis) -> String {
    let range = format_range(totals.earliest, totals.latest, basis);
    if categorized {
        format!(
            "Total for visible range ({}): Included Value ${:.2} | Overage ${:.2}",
            range, totals.included, totals.overage
        )
    } else {
        format!("Total for visible range ({}): ${:.2}", range, totals.total)
    }
}

/// Mount, rewrite or remove the summary line.
///
/// Independent of which visualization is active; the text is compared before
/// writing so an unchanged total costs no mutation.
pub fn render_summary(
    doc: &mut Document,
    totals: Option<&UsageTotals>,
    ctx: &RenderContext<'_>,
) -> Result<RenderOutcome, RenderError> {
    let targets = &ctx.settings.targets;

    let Some(totals) = totals else {
        return Ok(if remove_by_id(doc, &targets.summary_id)? {
            debug!("Summary removed");
            RenderOutcome::Removed
        } else {
            RenderOutcome::Absent
        });
    };

    let text = summary_text(totals, ctx.settings.categorized, ctx.settings.hour_basis);

    match doc.get_element_by_id(&targets.summary_id) {
        Some(line) if doc.text_content(line) == text => Ok(RenderOutcome::Unchanged),
        Some(line) => {
            doc.set_text_content(line, &text)?;
            Ok(RenderOutcome::Updated)
        }
        None => {
            let style = inline_style(&[
                ("color", ctx.palette.summary_text),
                ("margin", "0 0 20px 0"),
                ("text-align", "center"),
                ("font-family", "sans-serif"),
                ("font-size", "14px"),
            ]);
            let line = doc.create_element_with(
                "p",
                &[("id", targets.summary_id.as_str()), ("style", style.as_str())],
            );
            doc.set_text_content(line, &text)?;

            let anchor = doc
                .get_element_by_id(&targets.chart_id)
                .or_else(|| doc.get_element_by_id(&targets.fallback_id))
                .map(MountPoint::After)
                .unwrap_or_else(|| visualization_anchor(doc, ctx.table, &ctx.settings.view.heading));
            mount(doc, line, anchor)?;
            debug!("Summary created: {}", text);
            Ok(RenderOutcome::Created)
        }
    }
}
