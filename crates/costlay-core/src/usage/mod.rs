//! Usage records: extraction from the host table and hourly aggregation.

pub mod aggregate;
pub mod parser;
pub mod time;
pub mod types;

pub use aggregate::{aggregate_by_hour, round_cents, summarize};
pub use parser::{extract_records, parse_cost, parse_row};
pub use types::{
    CostCategory, HourPoint, Series, SeriesKind, SeriesSet, UsageRecord, UsageTotals,
};
