//! One cycle: extract, patch, aggregate, render.

use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

use crate::config::Settings;
use crate::page::Page;
use crate::patch::{inject_cost_column, PatchReport};
use crate::render::{
    destroy_chart, render_summary, render_visualization, teardown, RenderContext, RenderOutcome,
    RenderState, VisualizationReport,
};
use crate::usage::{aggregate_by_hour, extract_records, summarize};

/// What one cycle observed and wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// The location matched the usage view
    pub view_active: bool,
    pub table_found: bool,
    /// Records extracted from the table
    pub records: usize,
    /// `None` when patching is disabled, did not run, or failed
    pub patch: Option<PatchReport>,
    pub visualization: VisualizationReport,
    pub summary: RenderOutcome,
}

impl CycleReport {
    /// Whether the cycle changed the document
    pub fn wrote(&self) -> bool {
        self.patch.is_some_and(|p| !p.is_noop())
            || self.visualization.chart.wrote()
            || self.visualization.fallback.wrote()
            || self.summary.wrote()
    }
}

/// Run one cycle over `page`.
///
/// Stage failures, panics included, are logged and recorded as
/// [`RenderOutcome::Failed`]; they never stop the remaining stages.
pub fn run_cycle(page: &mut Page, settings: &Settings, state: &mut RenderState) -> CycleReport {
    let mut report = CycleReport {
        view_active: page.search().contains(settings.view.query.as_str()),
        ..CycleReport::default()
    };
    let dark = page.is_dark(&settings.theme.dark_class);
    let (doc, charting) = page.parts_mut();

    let table = if report.view_active {
        doc.find_first(doc.root(), "table")
    } else {
        None
    };
    let Some(table) = table else {
        let removed = teardown(doc, state, settings);
        report.visualization = VisualizationReport {
            chart: removed.chart,
            fallback: removed.fallback,
        };
        report.summary = removed.summary;
        debug!(
            "Cycle skipped (view_active={}): targets torn down",
            report.view_active
        );
        return report;
    };
    report.table_found = true;

    let records = extract_records(doc, table, settings);
    report.records = records.len();

    if settings.inject_cost_column {
        report.patch = match inject_cost_column(doc, table, settings) {
            Ok(patch) => Some(patch),
            Err(e) => {
                warn!("Failed to inject cost column: {}", e);
                None
            }
        };
    }

    if records.is_empty() {
        let removed = teardown(doc, state, settings);
        report.visualization = VisualizationReport {
            chart: removed.chart,
            fallback: removed.fallback,
        };
        report.summary = removed.summary;
        debug!("No usage records; targets torn down");
        return report;
    }

    let series = aggregate_by_hour(&records, settings.categorized, settings.hour_basis);
    let ctx = RenderContext::new(settings, table, dark);

    let charting_available = charting.is_some();
    report.visualization = guarded("visualization", || {
        render_visualization(doc, charting, state, &series, &ctx)
    })
    .unwrap_or_else(|| {
        if charting_available {
            // The instance may be half-built; drop it so the next cycle recreates it
            if let Err(e) = destroy_chart(doc, state, &settings.targets.chart_id) {
                warn!("Failed to remove chart after panic: {}", e);
            }
            VisualizationReport {
                chart: RenderOutcome::Failed,
                ..VisualizationReport::default()
            }
        } else {
            VisualizationReport {
                fallback: RenderOutcome::Failed,
                ..VisualizationReport::default()
            }
        }
    });

    let totals = summarize(&records);
    report.summary = match guarded("summary", || render_summary(doc, totals.as_ref(), &ctx)) {
        Some(Ok(outcome)) => outcome,
        Some(Err(e)) => {
            warn!("Could not render summary line: {}", e);
            RenderOutcome::Failed
        }
        None => RenderOutcome::Failed,
    };

    debug!(
        "Cycle: records={}, chart={:?}, fallback={:?}, summary={:?}",
        report.records, report.visualization.chart, report.visualization.fallback, report.summary
    );
    report
}

/// Run one stage, turning a panic into `None`
fn guarded<T>(stage: &str, body: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => Some(value),
        Err(payload) => {
            error!("{} stage panicked: {}", stage, panic_message(payload.as_ref()));
            None
        }
    }
}

pub(super) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
