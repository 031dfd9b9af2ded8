//! Chooses between the chart and the text fallback.
//!
//! Exactly one of the two is mounted after a cycle: the chart when the page
//! provides a charting capability, the fallback otherwise. Switching sides
//! tears the other one down.

use serde::Serialize;
use tracing::{debug, error};

use super::chart::{destroy_chart, render_chart};
use super::fallback::{remove_fallback, render_fallback};
use super::mount::remove_by_id;
use super::{ChartEngine, RenderContext, RenderOutcome, RenderState};
use crate::config::Settings;
use crate::dom::{Document, DomError};
use crate::usage::SeriesSet;

/// Outcomes of the visualization stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisualizationReport {
    pub chart: RenderOutcome,
    pub fallback: RenderOutcome,
}

/// Render `set` with the chart when `charting` is available, else as text
pub fn render_visualization(
    doc: &mut Document,
    charting: Option<&mut (dyn ChartEngine + 'static)>,
    state: &mut RenderState,
    set: &SeriesSet,
    ctx: &RenderContext<'_>,
) -> VisualizationReport {
    let targets = &ctx.settings.targets;
    let mut report = VisualizationReport::default();

    match charting {
        Some(engine) => {
            report.fallback = match remove_fallback(doc, state, &targets.fallback_id) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Failed to remove fallback rendering: {}", e);
                    RenderOutcome::Failed
                }
            };
            report.chart = match render_chart(doc, engine, state, set, ctx) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Failed to render chart: {}", e);
                    RenderOutcome::Failed
                }
            };
        }
        None => {
            // A later engine starts without global options
            state.global_options_applied = false;
            report.chart = match destroy_chart(doc, state, &targets.chart_id) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Failed to remove chart: {}", e);
                    RenderOutcome::Failed
                }
            };
            report.fallback = match render_fallback(doc, state, set, ctx) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Failed to render fallback: {}", e);
                    RenderOutcome::Failed
                }
            };
        }
    }

    debug!(
        "Visualization: chart={:?}, fallback={:?}",
        report.chart, report.fallback
    );
    report
}

/// Outcomes of removing every render target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub chart: RenderOutcome,
    pub fallback: RenderOutcome,
    pub summary: RenderOutcome,
}

/// Destroy the chart and remove all three render targets
pub fn teardown(doc: &mut Document, state: &mut RenderState, settings: &Settings) -> TeardownReport {
    let targets = &settings.targets;
    let outcome = |result: Result<RenderOutcome, DomError>, what: &str| {
        result.unwrap_or_else(|e| {
            error!("Failed to remove {}: {}", what, e);
            RenderOutcome::Failed
        })
    };

    let chart = outcome(destroy_chart(doc, state, &targets.chart_id), "chart");
    let fallback = outcome(remove_fallback(doc, state, &targets.fallback_id), "fallback");
    let summary = outcome(
        remove_by_id(doc, &targets.summary_id).map(|removed| {
            if removed {
                RenderOutcome::Removed
            } else {
                RenderOutcome::Absent
            }
        }),
        "summary",
    );

    TeardownReport {
        chart,
        fallback,
        summary,
    }
}
