//! Water year helpers.
//!
//! A water year is labelled by the calendar year in which it ends. With a
//! start month of 10, water year 2021 runs October 1 2020 through
//! September 30 2021. A start month of 1 means plain calendar years.

use crate::error::SeriesError;
use chrono::{Datelike, NaiveDate};

/// Acre-feet delivered by a flow of one cubic foot per second over one day.
pub const AF_PER_CFS_DAY: f64 = 1.983471;

/// Convert a mean daily flow in cfs into an acre-foot volume for that day.
pub fn cfs_to_acre_feet(cfs: f64) -> f64 {
    cfs * AF_PER_CFS_DAY
}

fn validate_month(water_year_month: u32) -> Result<u32, SeriesError> {
    if (1..=12).contains(&water_year_month) {
        Ok(water_year_month)
    } else {
        Err(SeriesError::InvalidMonth {
            month: water_year_month,
        })
    }
}

/// The water year a date belongs to.
pub fn water_year(date: &NaiveDate, water_year_month: u32) -> Result<i32, SeriesError> {
    let start_month = validate_month(water_year_month)?;
    if start_month == 1 {
        return Ok(date.year());
    }
    if date.month() >= start_month {
        Ok(date.year() + 1)
    } else {
        Ok(date.year())
    }
}

/// The first day of the given water year.
pub fn water_year_start(year: i32, water_year_month: u32) -> Result<NaiveDate, SeriesError> {
    let start_month = validate_month(water_year_month)?;
    let calendar_year = if start_month == 1 { year } else { year - 1 };
    NaiveDate::from_ymd_opt(calendar_year, start_month, 1).ok_or(SeriesError::InvalidMonth {
        month: start_month,
    })
}
