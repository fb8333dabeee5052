//! Time slots as emitted by the NLU engine.
//!
//! A recognized time expression is either a single instant with a precision
//! [`Grain`] ("tomorrow", "at 5pm") or an explicit range ("between Monday and
//! Friday"). The engine reports them as JSON; [`parse_slot`] and
//! [`parse_slots`] decode that payload into [`TimeSlot`] values.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{de, Deserialize, Deserializer};

use crate::error::WeatherTimeError;

/// Timestamp layout used by the NLU engine (`2019-02-23 00:00:00 +01:00`).
const NLU_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

// ── Grain & precision ───────────────────────────────────────────────────────

/// Precision of a recognized instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Grain {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl Grain {
    /// How far an instant of this grain reaches forward.
    ///
    /// Only weeks, days and hours extend. Every other grain, the coarser
    /// month/quarter/year included, yields a zero-length interval.
    pub fn extent(self) -> Duration {
        match self {
            Grain::Week => Duration::days(7),
            Grain::Day => Duration::days(1),
            Grain::Hour => Duration::hours(1),
            Grain::Year | Grain::Quarter | Grain::Month | Grain::Minute | Grain::Second => {
                Duration::zero()
            }
        }
    }
}

/// Whether the engine resolved the expression exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Precision {
    #[default]
    Exact,
    Approximate,
}

// ── Slot model ──────────────────────────────────────────────────────────────

/// The resolved value of a time slot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind")]
pub enum SlotValue {
    /// A single point in time.
    InstantTime {
        #[serde(deserialize_with = "deserialize_timestamp")]
        value: DateTime<FixedOffset>,
        grain: Grain,
        #[serde(default)]
        precision: Precision,
    },
    /// An explicit range; either end may be open.
    TimeInterval {
        #[serde(default, deserialize_with = "deserialize_bound")]
        from: Option<DateTime<FixedOffset>>,
        #[serde(default, deserialize_with = "deserialize_bound")]
        to: Option<DateTime<FixedOffset>>,
    },
}

/// A time slot recognized in the user's utterance.
///
/// Fields of the NLU payload that do not affect interval extraction
/// (`entity`, `slotName`, `range`, ...) are ignored when decoding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// The words the user actually said, if the engine reported them.
    #[serde(default)]
    pub raw_value: Option<String>,
    pub value: SlotValue,
}

impl TimeSlot {
    /// An instant slot with exact precision.
    pub fn instant(value: DateTime<FixedOffset>, grain: Grain) -> Self {
        Self {
            raw_value: None,
            value: SlotValue::InstantTime {
                value,
                grain,
                precision: Precision::Exact,
            },
        }
    }

    /// A range slot. A missing bound is read as "now" during extraction.
    pub fn interval(from: Option<DateTime<FixedOffset>>, to: Option<DateTime<FixedOffset>>) -> Self {
        Self {
            raw_value: None,
            value: SlotValue::TimeInterval { from, to },
        }
    }

    pub fn with_raw_value(mut self, raw_value: impl Into<String>) -> Self {
        self.raw_value = Some(raw_value.into());
        self
    }
}

// ── Decoding ────────────────────────────────────────────────────────────────

/// Decode a single slot from its JSON representation.
///
/// # Errors
///
/// Returns [`WeatherTimeError::InvalidSlot`] if the payload is not valid JSON,
/// has an unknown `kind`, or carries a timestamp in neither the NLU layout
/// nor RFC 3339.
///
/// # Examples
///
/// ```
/// use weather_time::slot::{parse_slot, Grain, SlotValue};
///
/// let slot = parse_slot(r#"{
///     "rawValue": "tomorrow",
///     "value": { "kind": "InstantTime", "value": "2019-02-23 00:00:00 +01:00", "grain": "Day" }
/// }"#).unwrap();
///
/// assert_eq!(slot.raw_value.as_deref(), Some("tomorrow"));
/// assert!(matches!(slot.value, SlotValue::InstantTime { grain: Grain::Day, .. }));
/// ```
pub fn parse_slot(json: &str) -> Result<TimeSlot, WeatherTimeError> {
    serde_json::from_str(json).map_err(|e| WeatherTimeError::InvalidSlot(e.to_string()))
}

/// Decode a JSON array of slots, preserving the order the engine emitted them in.
///
/// # Errors
///
/// Returns [`WeatherTimeError::InvalidSlot`] if the payload is not an array of
/// valid slots.
pub fn parse_slots(json: &str) -> Result<Vec<TimeSlot>, WeatherTimeError> {
    serde_json::from_str(json).map_err(|e| WeatherTimeError::InvalidSlot(e.to_string()))
}

/// Parse a slot timestamp in the NLU layout, falling back to RFC 3339.
pub fn parse_slot_timestamp(s: &str) -> Result<DateTime<FixedOffset>, WeatherTimeError> {
    DateTime::parse_from_str(s, NLU_DATETIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map_err(|e| WeatherTimeError::InvalidDatetime(format!("'{s}': {e}")))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_slot_timestamp(&s).map_err(de::Error::custom)
}

fn deserialize_bound<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| parse_slot_timestamp(&s).map_err(de::Error::custom))
        .transpose()
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn paris(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    // ── Grain ───────────────────────────────────────────────────────────

    #[test]
    fn test_grain_extent_extends_week_day_hour() {
        assert_eq!(Grain::Week.extent(), Duration::days(7));
        assert_eq!(Grain::Day.extent(), Duration::hours(24));
        assert_eq!(Grain::Hour.extent(), Duration::minutes(60));
    }

    #[test]
    fn test_grain_extent_zero_for_other_grains() {
        for grain in [
            Grain::Year,
            Grain::Quarter,
            Grain::Month,
            Grain::Minute,
            Grain::Second,
        ] {
            assert_eq!(grain.extent(), Duration::zero(), "{grain:?}");
        }
    }

    // ── Decoding ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_instant_nlu_format() {
        let slot = parse_slot(
            r#"{
                "rawValue": "tomorrow",
                "entity": "snips/datetime",
                "slotName": "forecast_start_datetime",
                "range": { "start": 28, "end": 36 },
                "value": {
                    "kind": "InstantTime",
                    "value": "2019-02-23 00:00:00 +01:00",
                    "grain": "Day",
                    "precision": "Exact"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(slot.raw_value.as_deref(), Some("tomorrow"));
        assert_eq!(
            slot.value,
            SlotValue::InstantTime {
                value: paris(2019, 2, 23, 0),
                grain: Grain::Day,
                precision: Precision::Exact,
            }
        );
    }

    #[test]
    fn test_parse_instant_rfc3339() {
        let slot = parse_slot(
            r#"{ "value": { "kind": "InstantTime", "value": "2019-02-23T18:00:00+01:00", "grain": "Hour" } }"#,
        )
        .unwrap();
        match slot.value {
            SlotValue::InstantTime { value, grain, .. } => {
                assert_eq!(value, paris(2019, 2, 23, 18));
                assert_eq!(grain, Grain::Hour);
            }
            other => panic!("expected instant, got {other:?}"),
        }
        assert!(slot.raw_value.is_none());
    }

    #[test]
    fn test_parse_precision_defaults_to_exact() {
        let slot = parse_slot(
            r#"{ "value": { "kind": "InstantTime", "value": "2019-02-23 00:00:00 +01:00", "grain": "Week" } }"#,
        )
        .unwrap();
        assert!(matches!(
            slot.value,
            SlotValue::InstantTime {
                precision: Precision::Exact,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_approximate_precision() {
        let slot = parse_slot(
            r#"{ "value": { "kind": "InstantTime", "value": "2019-02-23 18:00:00 +01:00", "grain": "Hour", "precision": "Approximate" } }"#,
        )
        .unwrap();
        assert!(matches!(
            slot.value,
            SlotValue::InstantTime {
                precision: Precision::Approximate,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_interval_both_bounds() {
        let slot = parse_slot(
            r#"{
                "rawValue": "this weekend",
                "value": { "kind": "TimeInterval", "from": "2019-02-23 00:00:00 +01:00", "to": "2019-02-25 00:00:00 +01:00" }
            }"#,
        )
        .unwrap();
        assert_eq!(
            slot.value,
            SlotValue::TimeInterval {
                from: Some(paris(2019, 2, 23, 0)),
                to: Some(paris(2019, 2, 25, 0)),
            }
        );
    }

    #[test]
    fn test_parse_interval_null_and_missing_bounds() {
        let slot = parse_slot(
            r#"{ "value": { "kind": "TimeInterval", "from": "2019-02-23 18:00:00 +01:00", "to": null } }"#,
        )
        .unwrap();
        assert_eq!(
            slot.value,
            SlotValue::TimeInterval {
                from: Some(paris(2019, 2, 23, 18)),
                to: None,
            }
        );

        let slot = parse_slot(
            r#"{ "value": { "kind": "TimeInterval", "to": "2019-02-23 18:00:00 +01:00" } }"#,
        )
        .unwrap();
        assert_eq!(
            slot.value,
            SlotValue::TimeInterval {
                from: None,
                to: Some(paris(2019, 2, 23, 18)),
            }
        );
    }

    #[test]
    fn test_parse_slots_preserves_order() {
        let slots = parse_slots(
            r#"[
                { "rawValue": "friday", "value": { "kind": "InstantTime", "value": "2019-03-01 00:00:00 +01:00", "grain": "Day" } },
                { "rawValue": "tomorrow", "value": { "kind": "InstantTime", "value": "2019-02-23 00:00:00 +01:00", "grain": "Day" } }
            ]"#,
        )
        .unwrap();
        let raw: Vec<_> = slots.iter().map(|s| s.raw_value.as_deref()).collect();
        assert_eq!(raw, vec![Some("friday"), Some("tomorrow")]);
    }

    #[test]
    fn test_parse_unknown_kind_returns_error() {
        let result = parse_slot(r#"{ "value": { "kind": "Temperature", "value": 21.5 } }"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid slot"), "got: {err}");
    }

    #[test]
    fn test_parse_malformed_timestamp_returns_error() {
        let result = parse_slot(
            r#"{ "value": { "kind": "InstantTime", "value": "next tuesday", "grain": "Day" } }"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid slot"), "got: {err}");
        assert!(err.contains("next tuesday"), "got: {err}");
    }

    #[test]
    fn test_parse_unknown_grain_returns_error() {
        let result = parse_slot(
            r#"{ "value": { "kind": "InstantTime", "value": "2019-02-23 00:00:00 +01:00", "grain": "Fortnight" } }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_slots_rejects_non_array() {
        assert!(parse_slots(r#"{ "value": {} }"#).is_err());
    }

    #[test]
    fn test_parse_slot_timestamp_error() {
        let err = parse_slot_timestamp("2019-02-30 00:00:00 +01:00")
            .unwrap_err()
            .to_string();
        assert!(err.contains("Invalid datetime"), "got: {err}");
    }

    // ── Constructors ────────────────────────────────────────────────────

    #[test]
    fn test_constructors() {
        let slot = TimeSlot::instant(paris(2019, 2, 23, 0), Grain::Day).with_raw_value("tomorrow");
        assert_eq!(slot.raw_value.as_deref(), Some("tomorrow"));
        assert!(matches!(slot.value, SlotValue::InstantTime { .. }));

        let slot = TimeSlot::interval(None, Some(paris(2019, 2, 23, 0)));
        assert!(slot.raw_value.is_none());
        assert!(matches!(
            slot.value,
            SlotValue::TimeInterval { from: None, .. }
        ));
    }
}
