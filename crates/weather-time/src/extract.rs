//! Forecast time windows from NLU time slots.
//!
//! Turns the time expressions of an utterance into the list of intervals a
//! weather query should cover: each slot becomes a candidate interval, the
//! candidates are merged where they overlap and sorted chronologically. Any
//! candidate reaching outside the supported forecast window sets the
//! `truncated` flag; the candidate itself is kept as is, so the caller can
//! still answer with what the forecast covers and tell the user the rest was
//! cut off.
//!
//! The "now" anchor and the user's timezone are explicit inputs.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::calendar::{checked_shift, day_bounds, parse_timezone, start_of_day, Limits};
use crate::error::WeatherTimeError;
use crate::interval::{merge_first_overlap, TimeInterval};
use crate::slot::{SlotValue, TimeSlot};

/// Days ahead the forecast API reports on.
pub const DEFAULT_FORECAST_HORIZON_DAYS: u32 = 5;

/// Options for [`extract_time_intervals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Length of the supported forecast window past the end of today.
    pub forecast_horizon_days: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            forecast_horizon_days: DEFAULT_FORECAST_HORIZON_DAYS,
        }
    }
}

impl ExtractOptions {
    /// The horizon as an exact duration (multiples of 24 hours).
    pub fn horizon(&self) -> Duration {
        Duration::days(i64::from(self.forecast_horizon_days))
    }
}

/// The intervals an utterance refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalExtraction {
    /// Merged intervals, ascending by start.
    pub intervals: Vec<TimeInterval>,
    /// Whether any slot reached outside the supported forecast window.
    pub truncated: bool,
}

/// The supported query window: from the start of the anchor's local day to
/// that instant plus the horizon plus one day.
///
/// The end is computed with exact 24-hour durations and is not snapped back
/// to a local midnight, so a DST change inside the window shifts it by the
/// size of the change.
///
/// # Errors
///
/// Returns [`WeatherTimeError::InvalidTimezone`] if `timezone` is not a valid
/// IANA timezone name, or [`WeatherTimeError::InvalidDatetime`] if the window
/// end falls outside the representable range.
pub fn forecast_limits(
    anchor: DateTime<Utc>,
    timezone: &str,
    options: &ExtractOptions,
) -> Result<Limits, WeatherTimeError> {
    let tz = parse_timezone(timezone)?;
    limits_in(anchor, &tz, options)
}

/// Extract the merged, sorted intervals referred to by `slots`.
///
/// With no slots the whole of today (local midnight to midnight + 24h) is
/// returned. Otherwise each slot yields a candidate:
///
/// - an instant spans `[value, value + grain extent]` (a week, a day, an hour,
///   or nothing for any other grain);
/// - a range spans `[from, to]`, an open end standing for `anchor`.
///
/// Each candidate is folded into the first accumulated interval it overlaps
/// (touching counts) or appended, then the result is sorted by start.
///
/// # Errors
///
/// Returns [`WeatherTimeError::InvalidTimezone`] if `timezone` is not a valid
/// IANA timezone name, or [`WeatherTimeError::InvalidDatetime`] if a slot or
/// the forecast window extends past the representable range.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use weather_time::extract::{extract_time_intervals, ExtractOptions};
/// use weather_time::slot::parse_slots;
///
/// let anchor = Utc.with_ymd_and_hms(2019, 2, 22, 11, 43, 8).unwrap();
/// let slots = parse_slots(r#"[
///     { "rawValue": "tomorrow", "value": { "kind": "InstantTime", "value": "2019-02-23 00:00:00 +01:00", "grain": "Day" } },
///     { "rawValue": "today", "value": { "kind": "InstantTime", "value": "2019-02-22 00:00:00 +01:00", "grain": "Day" } }
/// ]"#).unwrap();
///
/// let result =
///     extract_time_intervals(anchor, &slots, "Europe/Paris", &ExtractOptions::default()).unwrap();
/// assert_eq!(result.intervals.len(), 1);
/// assert_eq!(result.intervals[0].duration(), chrono::Duration::days(2));
/// assert!(!result.truncated);
/// ```
pub fn extract_time_intervals(
    anchor: DateTime<Utc>,
    slots: &[TimeSlot],
    timezone: &str,
    options: &ExtractOptions,
) -> Result<IntervalExtraction, WeatherTimeError> {
    let tz = parse_timezone(timezone)?;

    if slots.is_empty() {
        let today = day_bounds(&anchor.with_timezone(&tz))?;
        debug!("no time slots, using today [{}, {}]", today.min, today.max);
        return Ok(IntervalExtraction {
            intervals: vec![TimeInterval::new(today.min, today.max)],
            truncated: false,
        });
    }

    let limits = limits_in(anchor, &tz, options)?;
    let mut intervals: Vec<TimeInterval> = Vec::with_capacity(slots.len());
    let mut truncated = false;

    for slot in slots {
        let candidate = candidate_interval(slot, anchor)?;

        if !limits.contains(&candidate.from) || !limits.contains(&candidate.to) {
            debug!(
                "interval [{}, {}] is outside the forecast window [{}, {}]",
                candidate.from, candidate.to, limits.min, limits.max
            );
            truncated = true;
        }

        merge_first_overlap(&mut intervals, candidate);
    }

    intervals.sort_by_key(|interval| interval.from);

    Ok(IntervalExtraction {
        intervals,
        truncated,
    })
}

/// The earliest interval referred to by `slots`, with the truncation flag.
///
/// Returns `None` if the extraction produced no interval.
///
/// # Errors
///
/// Same as [`extract_time_intervals`].
pub fn extract_time_interval(
    anchor: DateTime<Utc>,
    slots: &[TimeSlot],
    timezone: &str,
    options: &ExtractOptions,
) -> Result<Option<(TimeInterval, bool)>, WeatherTimeError> {
    let IntervalExtraction {
        intervals,
        truncated,
    } = extract_time_intervals(anchor, slots, timezone, options)?;
    Ok(intervals.into_iter().next().map(|first| (first, truncated)))
}

// ── Internal helpers ────────────────────────────────────────────────────────

fn limits_in(
    anchor: DateTime<Utc>,
    tz: &Tz,
    options: &ExtractOptions,
) -> Result<Limits, WeatherTimeError> {
    let start = start_of_day(&anchor.with_timezone(tz))?.with_timezone(&Utc);
    let max = checked_shift(start, options.horizon() + Duration::days(1))?;
    Ok(Limits::new(start, max))
}

fn candidate_interval(
    slot: &TimeSlot,
    anchor: DateTime<Utc>,
) -> Result<TimeInterval, WeatherTimeError> {
    let (from, to) = match &slot.value {
        SlotValue::InstantTime { value, grain, .. } => {
            let from = value.with_timezone(&Utc);
            (from, checked_shift(from, grain.extent())?)
        }
        SlotValue::TimeInterval { from, to } => (
            from.map_or(anchor, |from| from.with_timezone(&Utc)),
            to.map_or(anchor, |to| to.with_timezone(&Utc)),
        ),
    };
    Ok(TimeInterval::new(from, to).with_raw_value(slot.raw_value.clone()))
}

// ── Tests ───────────────────────────────────────────────────────────────────
