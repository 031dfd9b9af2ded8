//! Highcharts-style option documents for the hourly cost chart.

use serde_json::{json, Value};

use super::theme::Palette;
use crate::usage::SeriesSet;

pub const CHART_TITLE: &str = "Hourly Usage Cost";

/// Library-wide options applied once per engine: axes in local time
pub fn global_options() -> Value {
    json!({ "global": { "useUTC": false } })
}

/// Full options for a new chart over `set`.
///
/// More than one series means the categorized variant: shared tooltip with
/// series names and a visible legend.
pub fn chart_options(set: &SeriesSet, palette: &Palette) -> Value {
    let categorized = set.series.len() > 1;
    let point_format = if categorized {
        "{series.name}: <b>${point.y:.2f}</b><br/>"
    } else {
        "Cost: <b>${point.y:.2f}</b>"
    };

    let series: Vec<Value> = set
        .series
        .iter()
        .map(|s| {
            json!({
                "name": s.kind.display_name(),
                "data": s.points,
                "color": s.kind.color(),
            })
        })
        .collect();

    let label_style = json!({ "color": palette.muted });

    json!({
        "chart": {
            "type": "spline",
            "backgroundColor": "transparent",
            "zoomType": "x",
        },
        "title": {
            "text": CHART_TITLE,
            "style": { "color": palette.title },
        },
        "xAxis": {
            "type": "datetime",
            "labels": { "style": label_style },
            "lineColor": palette.axis_line,
            "tickColor": palette.axis_line,
        },
        "yAxis": {
            "title": { "text": "Cost ($)", "style": label_style },
            "labels": { "format": "${value:.2f}", "style": label_style },
            "gridLineColor": palette.grid_line,
            "min": 0,
        },
        "tooltip": {
            "xDateFormat": "%b %e, %Y %l:%M %p",
            "headerFormat": "<b>{point.key}</b><br/>",
            "pointFormat": point_format,
            "shared": categorized,
            "backgroundColor": palette.tooltip_background,
            "style": { "color": palette.title },
        },
        "legend": {
            "enabled": categorized,
            "itemStyle": label_style,
        },
        "plotOptions": {
            "spline": { "marker": { "enabled": true, "radius": 3 } },
        },
        "series": series,
        "credits": { "enabled": false },
        "accessibility": { "enabled": false },
    })
}
