use tracing::debug;

use super::mount::{mount, remove_by_id, visualization_anchor};
use super::options::{chart_options, global_options};
use super::theme::inline_style;
use super::{
    ChartEngine, MountedChart, RenderContext, RenderError, RenderOutcome, RenderSignature,
    RenderState,
};
use crate::dom::{Document, DomError};
use crate::usage::SeriesSet;

/// Create, update or tear down the chart for `set`.
///
/// An existing instance whose container is still in the document gets
/// incremental `set_data` calls; a new one is only created after the previous
/// instance was destroyed.
pub fn render_chart(
    doc: &mut Document,
    engine: &mut dyn ChartEngine,
    state: &mut RenderState,
    set: &SeriesSet,
    ctx: &RenderContext<'_>,
) -> Result<RenderOutcome, RenderError> {
    let chart_id = ctx.settings.targets.chart_id.as_str();

    if set.is_empty() {
        return Ok(destroy_chart(doc, state, chart_id)?);
    }

    if !state.global_options_applied {
        engine.set_global_options(&global_options());
        state.global_options_applied = true;
    }

    let signature = RenderSignature::of(set);
    let container = doc.get_element_by_id(chart_id);

    if let (Some(mounted), Some(_)) = (state.chart.as_mut(), container) {
        if mounted.signature == signature {
            return Ok(RenderOutcome::Unchanged);
        }
        let last = set.series.len().saturating_sub(1);
        for (index, series) in set.series.iter().enumerate() {
            mounted
                .instance
                .set_data(doc, index, &series.points, index == last)?;
        }
        debug!("Chart updated: {}", signature);
        mounted.signature = signature;
        return Ok(RenderOutcome::Updated);
    }

    // The host dropped the container together with the chart
    if let Some(stale) = state.chart.take() {
        debug!("Chart container vanished; recreating");
        stale.instance.destroy(doc);
    }

    if container.is_none() {
        let style = inline_style(&[("height", "400px"), ("margin-bottom", "20px")]);
        let div = doc.create_element_with("div", &[("id", chart_id), ("style", style.as_str())]);
        let anchor = visualization_anchor(doc, ctx.table, &ctx.settings.view.heading);
        mount(doc, div, anchor)?;
    }

    let instance = engine.create(doc, chart_id, &chart_options(set, &ctx.palette))?;
    debug!("Chart created: {}", signature);
    state.chart = Some(MountedChart {
        instance,
        signature,
    });
    Ok(RenderOutcome::Created)
}

/// Destroy the retained instance and remove its container
pub fn destroy_chart(
    doc: &mut Document,
    state: &mut RenderState,
    chart_id: &str,
) -> Result<RenderOutcome, DomError> {
    let had_instance = match state.chart.take() {
        Some(mounted) => {
            mounted.instance.destroy(doc);
            true
        }
        None => false,
    };
    let had_container = remove_by_id(doc, chart_id)?;

    if had_instance || had_container {
        debug!("Chart removed");
        Ok(RenderOutcome::Removed)
    } else {
        Ok(RenderOutcome::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::page::build_usage_page;
    use crate::render::test_support::{categorized, point};
    use crate::render::SnapshotChartEngine;
    use serde_json::Value;

    struct Fixture {
        doc: Document,
        table: crate::dom::NodeId,
        settings: Settings,
        engine: SnapshotChartEngine,
        state: RenderState,
    }

    impl Fixture {
        fn new() -> Self {
            let mut doc = Document::new();
            let page = build_usage_page(&mut doc, "Filtered Usage Events", &[]).unwrap();
            Self {
                doc,
                table: page.table,
                settings: Settings::default(),
                engine: SnapshotChartEngine::new(),
                state: RenderState::new(),
            }
        }

        fn render(&mut self, set: &SeriesSet) -> RenderOutcome {
            let ctx = RenderContext::new(&self.settings, self.table, false);
            render_chart(&mut self.doc, &mut self.engine, &mut self.state, set, &ctx).unwrap()
        }

        fn snapshot(&self) -> Value {
            let container = self
                .doc
                .get_element_by_id(&self.settings.targets.chart_id)
                .unwrap();
            let script = self.doc.first_element_child(container).unwrap();
            serde_json::from_str(&self.doc.text_content(script)).unwrap()
        }
    }

    #[test]
    fn test_create_then_unchanged() {
        let mut fx = Fixture::new();
        let set = categorized(vec![point(1, 10, 3.5)], vec![]);

        assert_eq!(fx.render(&set), RenderOutcome::Created);
        assert!(fx.state.has_chart());
        assert_eq!(
            fx.engine.global_options().unwrap()["global"]["useUTC"],
            false
        );

        let mutations = fx.doc.mutation_count();
        assert_eq!(fx.render(&set), RenderOutcome::Unchanged);
        assert_eq!(fx.doc.mutation_count(), mutations);
    }

    #[test]
    fn test_update_uses_set_data() {
        let mut fx = Fixture::new();
        fx.render(&categorized(vec![point(1, 10, 3.5)], vec![]));

        let next = categorized(vec![point(1, 10, 3.5)], vec![point(1, 11, 1.25)]);
        assert_eq!(fx.render(&next), RenderOutcome::Updated);
        assert_eq!(
            fx.snapshot()["series"][1]["data"],
            serde_json::json!([[1704106800000_i64, 1.25]])
        );
        // Still a single container with a single instance
        let container = fx
            .doc
            .get_element_by_id(&fx.settings.targets.chart_id)
            .unwrap();
        assert_eq!(fx.doc.element_children(container).len(), 1);
    }

    #[test]
    fn test_mounted_after_heading_wrapper() {
        let mut fx = Fixture::new();
        fx.render(&categorized(vec![point(1, 10, 3.5)], vec![]));

        let container = fx
            .doc
            .get_element_by_id(&fx.settings.targets.chart_id)
            .unwrap();
        let heading = crate::render::find_heading(&fx.doc, "Filtered Usage Events").unwrap();
        let wrapper = fx.doc.parent(heading).unwrap();
        let siblings = fx.doc.children(fx.doc.parent(wrapper).unwrap()).to_vec();
        let idx = siblings.iter().position(|n| *n == wrapper).unwrap();
        assert_eq!(siblings[idx + 1], container);
    }

    #[test]
    fn test_empty_data_destroys() {
        let mut fx = Fixture::new();
        fx.render(&categorized(vec![point(1, 10, 3.5)], vec![]));

        assert_eq!(
            fx.render(&categorized(vec![], vec![])),
            RenderOutcome::Removed
        );
        assert!(!fx.state.has_chart());
        assert!(fx
            .doc
            .get_element_by_id(&fx.settings.targets.chart_id)
            .is_none());
        assert_eq!(
            fx.render(&categorized(vec![], vec![])),
            RenderOutcome::Absent
        );
    }

    #[test]
    fn test_recreated_when_host_removes_container() {
        let mut fx = Fixture::new();
        let set = categorized(vec![point(1, 10, 3.5)], vec![]);
        fx.render(&set);

        let container = fx
            .doc
            .get_element_by_id(&fx.settings.targets.chart_id)
            .unwrap();
        fx.doc.remove(container).unwrap();

        assert_eq!(fx.render(&set), RenderOutcome::Created);
        assert!(fx
            .doc
            .get_element_by_id(&fx.settings.targets.chart_id)
            .is_some());
    }
}
