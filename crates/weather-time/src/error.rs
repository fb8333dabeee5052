//! Error types for weather-time operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherTimeError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid slot: {0}")]
    InvalidSlot(String),
}

pub type Result<T> = std::result::Result<T, WeatherTimeError>;
