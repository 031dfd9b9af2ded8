//! Charting capability seam.
//!
//! A page may or may not provide a charting library. The overlay talks to it
//! through [`ChartEngine`] (global options, instance creation) and the
//! [`ChartInstance`] handles it returns (incremental data updates, teardown).

use serde_json::Value;

use super::RenderError;
use crate::dom::{Document, NodeId};
use crate::usage::HourPoint;

/// A charting library available on the page
pub trait ChartEngine: Send {
    /// Apply library-wide options (e.g. local-time axes)
    fn set_global_options(&mut self, options: &Value);

    /// Instantiate a chart inside the element with `container_id`
    fn create(
        &mut self,
        doc: &mut Document,
        container_id: &str,
        options: &Value,
    ) -> Result<Box<dyn ChartInstance>, RenderError>;
}

/// One live chart created by a [`ChartEngine`]
pub trait ChartInstance: Send {
    /// Replace the points of series `series_index`; draw when `redraw` is set
    fn set_data(
        &mut self,
        doc: &mut Document,
        series_index: usize,
        points: &[HourPoint],
        redraw: bool,
    ) -> Result<(), RenderError>;

    /// Tear the chart down and release whatever it put into the document
    fn destroy(self: Box<Self>, doc: &mut Document);
}

/// Attribute marking the script node a snapshot chart draws into
pub const SNAPSHOT_ATTRIBUTE: &str = "data-chart-options";

/// Chart engine that "draws" by serializing the effective options into a
/// `<script type="application/json">` inside the container.
///
/// Used by the CLI and tests where no real charting library is present.
#[derive(Debug, Default)]
pub struct SnapshotChartEngine {
    global_options: Option<Value>,
}

impl SnapshotChartEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_options(&self) -> Option<&Value> {
        self.global_options.as_ref()
    }
}

impl ChartEngine for SnapshotChartEngine {
    fn set_global_options(&mut self, options: &Value) {
        self.global_options = Some(options.clone());
    }

    fn create(
        &mut self,
        doc: &mut Document,
        container_id: &str,
        options: &Value,
    ) -> Result<Box<dyn ChartInstance>, RenderError> {
        let container =
            doc.get_element_by_id(container_id)
                .ok_or_else(|| RenderError::MissingTarget {
                    id: container_id.to_string(),
                })?;

        let script = doc.create_element_with(
            "script",
            &[("type", "application/json"), (SNAPSHOT_ATTRIBUTE, "")],
        );
        doc.set_text_content(script, &serde_json::to_string(options)?)?;
        doc.append_child(container, script)?;

        Ok(Box::new(SnapshotChart {
            script,
            options: options.clone(),
        }))
    }
}

struct SnapshotChart {
    script: NodeId,
    options: Value,
}

impl ChartInstance for SnapshotChart {
    fn set_data(
        &mut self,
        doc: &mut Document,
        series_index: usize,
        points: &[HourPoint],
        redraw: bool,
    ) -> Result<(), RenderError> {
        let slot = self
            .options
            .get_mut("series")
            .and_then(|series| series.get_mut(series_index))
            .ok_or_else(|| RenderError::Engine(format!("no series at index {}", series_index)))?;
        slot["data"] = serde_json::to_value(points)?;

        if redraw {
            doc.set_text_content(self.script, &serde_json::to_string(&self.options)?)?;
        }
        Ok(())
    }

    fn destroy(self: Box<Self>, doc: &mut Document) {
        // The host may already have removed the container with the script in it
        let _ = doc.remove(self.script);
    }
}
