//! Timestamp parsing, hour truncation and display formatting in the
//! configured [`HourBasis`].

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};

use crate::config::HourBasis;

/// Naive layouts the dashboard has been seen to use, most specific first
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%b %d, %Y, %I:%M:%S %p",
    "%b %d, %Y, %I:%M %p",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y, %I:%M %p",
];

/// Parse a date cell's tooltip. Naive values are read in `basis`.
pub fn parse_timestamp(text: &str, basis: HourBasis) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())?;
    from_naive(naive, basis)
}

fn from_naive(naive: NaiveDateTime, basis: HourBasis) -> Option<DateTime<Utc>> {
    match basis {
        HourBasis::Utc => Some(Utc.from_utc_datetime(&naive)),
        HourBasis::Local => resolve_local(&Local, naive),
    }
}

/// Read a wall-clock time in `tz`.
///
/// A repeated time takes its earlier instant. A time skipped by a forward
/// transition is read with the offset in effect before the gap, which lands
/// it the gap's length past the transition.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => Some(at.with_timezone(&Utc)),
        LocalResult::None => {
            let before = tz
                .from_local_datetime(&(naive - Duration::hours(3)))
                .earliest()?;
            let offset = i64::from(before.offset().fix().local_minus_utc());
            Some(Utc.from_utc_datetime(&(naive - Duration::seconds(offset))))
        }
    }
}

/// Start of the hour containing `ts`, as seen in `basis`
pub fn truncate_to_hour(ts: DateTime<Utc>, basis: HourBasis) -> DateTime<Utc> {
    match basis {
        HourBasis::Utc => hour_start_in(ts, &Utc),
        HourBasis::Local => hour_start_in(ts, &Local),
    }
}

/// Truncate with the offset `tz` has at `ts` itself, so repeated wall-clock
/// hours still map to distinct, aligned buckets.
fn hour_start_in<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let offset = i64::from(ts.with_timezone(tz).offset().fix().local_minus_utc());
    let into_hour = (ts.timestamp() + offset).rem_euclid(3600);
    let subsec = Duration::nanoseconds(i64::from(ts.timestamp_subsec_nanos()));
    ts - Duration::seconds(into_hour) - subsec
}

/// Format `ts` with a chrono format string in `basis`
pub fn format_in(ts: DateTime<Utc>, basis: HourBasis, fmt: &str) -> String {
    match basis {
        HourBasis::Utc => ts.format(fmt).to_string(),
        HourBasis::Local => ts.with_timezone(&Local).format(fmt).to_string(),
    }
}

/// Whether both timestamps fall on the same calendar day in `basis`
pub fn same_day(a: DateTime<Utc>, b: DateTime<Utc>, basis: HourBasis) -> bool {
    match basis {
        HourBasis::Utc => a.date_naive() == b.date_naive(),
        HourBasis::Local => {
            a.with_timezone(&Local).date_naive() == b.with_timezone(&Local).date_naive()
        }
    }
}
