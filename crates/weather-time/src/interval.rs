//! Time intervals and the overlap merge used to accumulate them.

use chrono::{DateTime, Duration, Utc};
use log::trace;
use serde::Serialize;

/// A closed time interval `[from, to]` as absolute instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// The words of the slot this interval was first created from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<String>,
}

impl TimeInterval {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            raw_value: None,
        }
    }

    pub fn with_raw_value(mut self, raw_value: Option<String>) -> Self {
        self.raw_value = raw_value;
        self
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }
}

/// Two intervals overlap if they share at least one instant. Touching counts.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.from <= b.to && a.to >= b.from
}

/// Fold `candidate` into the first interval of `intervals` it overlaps.
///
/// The scan runs in insertion order and stops at the first overlap, whose
/// bounds are widened to the union; the existing interval keeps its raw text.
/// No second pass re-merges intervals that the widening made overlap. If
/// nothing overlaps, `candidate` is appended.
///
/// Returns `true` if the candidate was merged, `false` if it was appended.
pub fn merge_first_overlap(intervals: &mut Vec<TimeInterval>, candidate: TimeInterval) -> bool {
    match intervals.iter_mut().find(|existing| overlaps(existing, &candidate)) {
        Some(existing) => {
            existing.from = existing.from.min(candidate.from);
            existing.to = existing.to.max(candidate.to);
            trace!(
                "merged [{}, {}] into [{}, {}]",
                candidate.from,
                candidate.to,
                existing.from,
                existing.to
            );
            true
        }
        None => {
            intervals.push(candidate);
            false
        }
    }
}
