//! Usage data types extracted from the host table and derived from it.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Cost category of a usage event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CostCategory {
    /// Covered by the plan's included allowance
    Included,
    /// Billed on top of the plan
    Overage,
    /// Label matched neither known category (or categories are disabled)
    Unknown,
}

/// A single usage event read from one table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    /// When the event happened
    pub time: DateTime<Utc>,
    /// Cost in dollars (never negative)
    pub cost: f64,
    pub category: CostCategory,
}

/// Which series a set of hourly points belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeriesKind {
    Included,
    Overage,
    /// Single-series mode: every record regardless of category
    Total,
}

impl SeriesKind {
    /// Display name used by the chart legend and the fallback headings
    pub fn display_name(&self) -> &'static str {
        match self {
            SeriesKind::Included => "Included Cost",
            SeriesKind::Overage => "Overage Cost",
            SeriesKind::Total => "Cost",
        }
    }

    /// Fixed series color
    pub fn color(&self) -> &'static str {
        match self {
            SeriesKind::Included | SeriesKind::Total => "#88C0D0",
            SeriesKind::Overage => "#BF616A",
        }
    }
}

/// Summed cost of one hour for one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourPoint {
    /// Start of the hour
    pub hour: DateTime<Utc>,
    /// Sum rounded to cents
    pub cost: f64,
}

/// Serialized as `[epoch_millis, cost]`, the point shape charting libraries take
impl Serialize for HourPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.hour.timestamp_millis(), self.cost).serialize(serializer)
    }
}

/// Hourly points of one series, ascending by hour
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub kind: SeriesKind,
    pub points: Vec<HourPoint>,
}

/// All series of one cycle, in fixed display order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesSet {
    pub series: Vec<Series>,
}

impl SeriesSet {
    /// True when no series has any point
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    pub fn get(&self, kind: SeriesKind) -> Option<&Series> {
        self.series.iter().find(|s| s.kind == kind)
    }
}

/// Totals over every extracted record (zero-cost ones included)
#[derive(Debug, Clone, PartialEq)]
pub struct UsageTotals {
    pub included: f64,
    pub overage: f64,
    pub unknown: f64,
    /// Sum over all categories
    pub total: f64,
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}
