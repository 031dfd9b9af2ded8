//! Hourly aggregation and whole-range totals.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::time::truncate_to_hour;
use super::types::{CostCategory, HourPoint, Series, SeriesKind, SeriesSet, UsageRecord, UsageTotals};
use crate::config::HourBasis;

/// Round to cents; applied once per bucket at emission
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bucket positive-cost records by hour.
///
/// Categorized mode yields `[Included, Overage]` (Unknown records are left
/// out); single mode yields `[Total]` over every record.
pub fn aggregate_by_hour(records: &[UsageRecord], categorized: bool, basis: HourBasis) -> SeriesSet {
    let kinds: &[SeriesKind] = if categorized {
        &[SeriesKind::Included, SeriesKind::Overage]
    } else {
        &[SeriesKind::Total]
    };

    let mut buckets: Vec<BTreeMap<DateTime<Utc>, f64>> = vec![BTreeMap::new(); kinds.len()];

    for record in records.iter().filter(|r| r.cost > 0.0) {
        let kind = match (categorized, record.category) {
            (false, _) => SeriesKind::Total,
            (true, CostCategory::Included) => SeriesKind::Included,
            (true, CostCategory::Overage) => SeriesKind::Overage,
            (true, CostCategory::Unknown) => continue,
        };
        let Some(idx) = kinds.iter().position(|k| *k == kind) else {
            continue;
        };
        *buckets[idx]
            .entry(truncate_to_hour(record.time, basis))
            .or_insert(0.0) += record.cost;
    }

    let series = kinds
        .iter()
        .zip(buckets)
        .map(|(kind, hours)| Series {
            kind: *kind,
            points: hours
                .into_iter()
                .map(|(hour, cost)| HourPoint {
                    hour,
                    cost: round_cents(cost),
                })
                .collect(),
        })
        .collect();

    SeriesSet { series }
}

/// Totals and time span over all records; `None` when there are none
pub fn summarize(records: &[UsageRecord]) -> Option<UsageTotals> {
    let first = records.first()?;
    let mut totals = UsageTotals {
        included: 0.0,
        overage: 0.0,
        unknown: 0.0,
        total: 0.0,
        earliest: first.time,
        latest: first.time,
    };
    for record in records {
        match record.category {
            CostCategory::Included => totals.included += record.cost,
            CostCategory::Overage => totals.overage += record.cost,
            CostCategory::Unknown => totals.unknown += record.cost,
        }
        totals.total += record.cost;
        totals.earliest = totals.earliest.min(record.time);
        totals.latest = totals.latest.max(record.time);
    }
    Some(totals)
}
