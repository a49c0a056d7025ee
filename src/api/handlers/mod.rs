pub mod availability;
pub mod booking;
pub mod booking_management;
pub mod health;
pub mod service;

use chrono::{NaiveDate, NaiveTime};

use crate::error::AppError;

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

pub(crate) fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM or HH:MM:SS)".into()))
}
