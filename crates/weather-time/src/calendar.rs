//! Calendar-day boundaries in a local timezone.
//!
//! All functions take the reference "now" instant explicitly (the `anchor`)
//! rather than reading the system clock, so "today" is whatever day the
//! caller says it is.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::WeatherTimeError;

/// Granularity used when stepping past a local midnight skipped by DST.
const DST_GAP_STEP_MINUTES: i64 = 15;

/// A closed window of supported instants, `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

impl Limits {
    pub fn new(min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        Self { min, max }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.min && *instant <= self.max
    }
}

/// The local midnight that starts the calendar day containing `instant`.
///
/// When DST skips midnight, the day starts at the first local time that
/// exists on that date.
///
/// # Errors
///
/// Returns [`WeatherTimeError::InvalidDatetime`] if no valid local time can
/// be found on the date.
pub fn start_of_day(instant: &DateTime<Tz>) -> Result<DateTime<Tz>, WeatherTimeError> {
    let tz = instant.timezone();
    let date = instant.date_naive();
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        WeatherTimeError::InvalidDatetime(format!("no midnight on {date}"))
    })?;

    (0..24 * 60 / DST_GAP_STEP_MINUTES)
        .map(|step| midnight + Duration::minutes(step * DST_GAP_STEP_MINUTES))
        .take_while(|local| local.date() == date)
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .ok_or_else(|| {
            WeatherTimeError::InvalidDatetime(format!(
                "no valid local time on {date} in {}",
                tz.name()
            ))
        })
}

/// The window `[local midnight, local midnight + 24h]` of the day containing `instant`.
pub fn day_bounds(instant: &DateTime<Tz>) -> Result<Limits, WeatherTimeError> {
    let start = start_of_day(instant)?.with_timezone(&Utc);
    Ok(Limits::new(start, checked_shift(start, Duration::days(1))?))
}

/// `instant + delta`, failing instead of overflowing chrono's supported range.
pub(crate) fn checked_shift(
    instant: DateTime<Utc>,
    delta: Duration,
) -> Result<DateTime<Utc>, WeatherTimeError> {
    instant.checked_add_signed(delta).ok_or_else(|| {
        WeatherTimeError::InvalidDatetime(format!("{instant} + {delta} is out of range"))
    })
}

/// Whether `instant` falls within the anchor's calendar day, midnight to
/// midnight inclusive.
///
/// # Errors
///
/// Returns [`WeatherTimeError::InvalidTimezone`] if `timezone` is not a valid
/// IANA timezone name.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use weather_time::calendar::is_today;
///
/// let anchor = Utc.with_ymd_and_hms(2019, 2, 22, 11, 43, 8).unwrap();
/// let evening = Utc.with_ymd_and_hms(2019, 2, 22, 20, 0, 0).unwrap();
/// assert!(is_today(anchor, &evening, "Europe/Paris").unwrap());
/// ```
pub fn is_today<T: TimeZone>(
    anchor: DateTime<Utc>,
    instant: &DateTime<T>,
    timezone: &str,
) -> Result<bool, WeatherTimeError> {
    let tz = parse_timezone(timezone)?;
    let today = day_bounds(&anchor.with_timezone(&tz))?;
    Ok(today.contains(&instant.with_timezone(&Utc)))
}

/// Whether `instant` falls within the day after the anchor's, midnight to
/// midnight inclusive.
///
/// "Tomorrow" is the local day containing `anchor + 24h`.
///
/// # Errors
///
/// Returns [`WeatherTimeError::InvalidTimezone`] if `timezone` is not a valid
/// IANA timezone name.
pub fn is_tomorrow<T: TimeZone>(
    anchor: DateTime<Utc>,
    instant: &DateTime<T>,
    timezone: &str,
) -> Result<bool, WeatherTimeError> {
    let tz = parse_timezone(timezone)?;
    let tomorrow = day_bounds(&checked_shift(anchor, Duration::days(1))?.with_timezone(&tz))?;
    Ok(tomorrow.contains(&instant.with_timezone(&Utc)))
}

/// Parse an IANA timezone name.
pub fn parse_timezone(s: &str) -> Result<Tz, WeatherTimeError> {
    s.parse::<Tz>()
        .map_err(|_| WeatherTimeError::InvalidTimezone(s.to_string()))
}
