//! # weather-time
//!
//! Forecast time windows for a voice-assistant weather skill.
//!
//! Given the time expressions an NLU engine recognized in an utterance
//! ("tomorrow", "this weekend", "at 6pm"), works out which intervals a
//! weather query should cover, and whether the request reaches past what the
//! forecast supports. Everything here is a pure function of its inputs: the
//! current instant and the user's timezone are passed in, never read from the
//! system.
//!
//! ## Modules
//!
//! - [`slot`] - Time slot model and decoding of the NLU engine's JSON
//! - [`interval`] - Time intervals and first-overlap merging
//! - [`calendar`] - Local day boundaries, "is today" / "is tomorrow"
//! - [`extract`] - Slots → merged, sorted intervals with a truncation flag
//! - [`error`] - Error types

pub mod calendar;
pub mod error;
pub mod extract;
pub mod interval;
pub mod slot;

pub use calendar::{is_today, is_tomorrow, start_of_day, Limits};
pub use error::WeatherTimeError;
pub use extract::{
    extract_time_interval, extract_time_intervals, forecast_limits, ExtractOptions,
    IntervalExtraction,
};
pub use interval::{merge_first_overlap, overlaps, TimeInterval};
pub use slot::{parse_slot, parse_slots, Grain, Precision, SlotValue, TimeSlot};
