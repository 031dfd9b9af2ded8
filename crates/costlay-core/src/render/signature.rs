use std::fmt;

use crate::usage::SeriesSet;

/// Length and boundary hours of one series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSignature {
    pub len: usize,
    /// First hour, epoch millis
    pub first: Option<i64>,
    /// Last hour, epoch millis
    pub last: Option<i64>,
}

/// Cheap fingerprint of a [`SeriesSet`].
///
/// Only lengths and endpoints are compared: a change to an interior bucket
/// that keeps both is not detected and the previous render stays in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSignature {
    parts: Vec<SeriesSignature>,
}

impl RenderSignature {
    pub fn of(set: &SeriesSet) -> Self {
        let parts = set
            .series
            .iter()
            .map(|series| SeriesSignature {
                len: series.points.len(),
                first: series.points.first().map(|p| p.hour.timestamp_millis()),
                last: series.points.last().map(|p| p.hour.timestamp_millis()),
            })
            .collect();
        Self { parts }
    }
}

impl fmt::Display for RenderSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", part.len)?;
            for bound in [part.first, part.last] {
                match bound {
                    Some(ms) => write!(f, ":{}", ms)?,
                    None => f.write_str(":-")?,
                }
            }
        }
        Ok(())
    }
}
