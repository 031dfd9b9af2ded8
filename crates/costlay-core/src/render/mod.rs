//! Render targets: the chart, its text fallback and the summary line.
//!
//! Every renderer reports a [`RenderOutcome`]; chart and fallback compare a
//! [`RenderSignature`] against the previous cycle and skip identical writes.

mod chart;
mod engine;
mod fallback;
mod mount;
mod options;
mod selector;
mod signature;
mod summary;
mod theme;

pub use chart::{destroy_chart, render_chart};
pub use engine::{ChartEngine, ChartInstance, SnapshotChartEngine, SNAPSHOT_ATTRIBUTE};
pub use fallback::{remove_fallback, render_fallback, FALLBACK_TITLE};
pub use mount::{find_heading, mount, remove_by_id, visualization_anchor, MountPoint};
pub use options::{chart_options, global_options, CHART_TITLE};
pub use selector::{render_visualization, teardown, TeardownReport, VisualizationReport};
pub use signature::{RenderSignature, SeriesSignature};
pub use summary::{format_range, render_summary, summary_text};
pub use theme::Palette;

use serde::Serialize;
use thiserror::Error;

use crate::config::Settings;
use crate::dom::{DomError, NodeId};

/// Error type for render operations
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Dom(#[from] DomError),

    /// The charting library rejected an operation
    #[error("chart engine error: {0}")]
    Engine(String),

    /// A render target expected in the document is gone
    #[error("render target #{id} not found")]
    MissingTarget { id: String },

    #[error("failed to encode chart data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What a renderer did to its target in one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RenderOutcome {
    /// Nothing to show and nothing mounted
    #[default]
    Absent,
    /// Target mounted (or chart instantiated) in this cycle
    Created,
    /// Existing target rewritten
    Updated,
    /// Existing target already showed this data; no writes
    Unchanged,
    /// Target taken down
    Removed,
    /// The renderer failed; the error was logged
    Failed,
}

impl RenderOutcome {
    /// Whether the document was written to
    pub fn wrote(&self) -> bool {
        matches!(
            self,
            RenderOutcome::Created | RenderOutcome::Updated | RenderOutcome::Removed
        )
    }
}

/// Per-cycle inputs shared by the renderers
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub settings: &'a Settings,
    /// The host usage table
    pub table: NodeId,
    pub palette: Palette,
}

impl<'a> RenderContext<'a> {
    pub fn new(settings: &'a Settings, table: NodeId, dark: bool) -> Self {
        Self {
            settings,
            table,
            palette: Palette::for_theme(dark),
        }
    }
}

/// A chart instance and the data it currently shows
pub(crate) struct MountedChart {
    pub(crate) instance: Box<dyn ChartInstance>,
    pub(crate) signature: RenderSignature,
}

/// Render state carried from one cycle to the next
#[derive(Default)]
pub struct RenderState {
    pub(crate) chart: Option<MountedChart>,
    pub(crate) fallback_signature: Option<RenderSignature>,
    pub(crate) global_options_applied: bool,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a chart instance is retained
    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    pub fn chart_signature(&self) -> Option<&RenderSignature> {
        self.chart.as_ref().map(|c| &c.signature)
    }

    pub fn fallback_signature(&self) -> Option<&RenderSignature> {
        self.fallback_signature.as_ref()
    }
}

impl std::fmt::Debug for RenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderState")
            .field("chart", &self.chart_signature())
            .field("fallback", &self.fallback_signature)
            .field("global_options_applied", &self.global_options_applied)
            .finish()
    }
}
