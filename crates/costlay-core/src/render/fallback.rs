//! Text rendition of the hourly series for pages without a charting library.

use tracing::debug;

use super::mount::{mount, remove_by_id, visualization_anchor};
use super::theme::{inline_style, Palette};
use super::{RenderContext, RenderError, RenderOutcome, RenderSignature, RenderState};
use crate::config::HourBasis;
use crate::dom::{Document, DomError, NodeId};
use crate::usage::time::format_in;
use crate::usage::{HourPoint, SeriesSet};

pub const FALLBACK_TITLE: &str = "Hourly Usage Cost (Fallback)";

/// `Jan 1, 10:00 AM`
const LINE_HOUR_FORMAT: &str = "%b %-d, %I:%M %p";

/// Mount, rewrite or remove the text fallback for `set`
pub fn render_fallback(
    doc: &mut Document,
    state: &mut RenderState,
    set: &SeriesSet,
    ctx: &RenderContext<'_>,
) -> Result<RenderOutcome, RenderError> {
    let fallback_id = ctx.settings.targets.fallback_id.as_str();

    if set.is_empty() {
        return Ok(remove_fallback(doc, state, fallback_id)?);
    }

    let signature = RenderSignature::of(set);
    let existing = doc.get_element_by_id(fallback_id);
    if existing.is_some() && state.fallback_signature.as_ref() == Some(&signature) {
        return Ok(RenderOutcome::Unchanged);
    }

    let (block, outcome) = match existing {
        Some(block) => (block, RenderOutcome::Updated),
        None => {
            let style = block_style(&ctx.palette);
            let block =
                doc.create_element_with("div", &[("id", fallback_id), ("style", style.as_str())]);
            let anchor = visualization_anchor(doc, ctx.table, &ctx.settings.view.heading);
            mount(doc, block, anchor)?;
            (block, RenderOutcome::Created)
        }
    };

    write_content(doc, block, set, &ctx.palette, ctx.settings.hour_basis)?;
    debug!("Fallback {:?}: {}", outcome, signature);
    state.fallback_signature = Some(signature);
    Ok(outcome)
}

/// Remove the fallback block and forget its signature
pub fn remove_fallback(
    doc: &mut Document,
    state: &mut RenderState,
    fallback_id: &str,
) -> Result<RenderOutcome, DomError> {
    state.fallback_signature = None;
    if remove_by_id(doc, fallback_id)? {
        debug!("Fallback removed");
        Ok(RenderOutcome::Removed)
    } else {
        Ok(RenderOutcome::Absent)
    }
}

fn block_style(palette: &Palette) -> String {
    let border = format!("1px solid {}", palette.panel_border);
    inline_style(&[
        ("margin-bottom", "20px"),
        ("padding", "15px"),
        ("border", border.as_str()),
        ("border-radius", "5px"),
        ("background", palette.panel_background),
        ("color", palette.muted),
        ("font-family", "monospace"),
        ("font-size", "12px"),
        ("white-space", "pre-wrap"),
        ("max-height", "400px"),
        ("overflow-y", "auto"),
    ])
}

fn write_content(
    doc: &mut Document,
    block: NodeId,
    set: &SeriesSet,
    palette: &Palette,
    basis: HourBasis,
) -> Result<(), DomError> {
    doc.clear_children(block)?;

    let title_style = inline_style(&[("margin-top", "0"), ("color", palette.title)]);
    let title = doc.create_element_with("h3", &[("style", title_style.as_str())]);
    doc.set_text_content(title, FALLBACK_TITLE)?;
    doc.append_child(block, title)?;

    let heading_style = inline_style(&[("margin", "10px 0 5px"), ("color", palette.title)]);
    for series in set.series.iter().filter(|s| !s.points.is_empty()) {
        let heading = doc.create_element_with("h4", &[("style", heading_style.as_str())]);
        doc.set_text_content(heading, series.kind.display_name())?;
        doc.append_child(block, heading)?;

        let lines = series
            .points
            .iter()
            .map(|point| format_line(point, basis))
            .collect::<Vec<_>>()
            .join("\n");
        let body = doc.create_element("div");
        doc.set_text_content(body, &lines)?;
        doc.append_child(block, body)?;
    }
    Ok(())
}

/// `Jan 1, 10:00 AM: $3.50`
fn format_line(point: &HourPoint, basis: HourBasis) -> String {
    format!(
        "{}: ${:.2}",
        format_in(point.hour, basis, LINE_HOUR_FORMAT),
        point.cost
    )
}
