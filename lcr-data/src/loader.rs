//! CSV loading for populating the in-memory series store.
//!
//! # CSV Formats
//!
//! - **Annual** (no headers): `key,year,value`
//! - **Daily** (no headers): `key,date,value` with date as `YYYYMMDD` or `YYYY-MM-DD`
//!
//! Rows whose value is not numeric (`---`, `NaN`, blank) are skipped and counted.

use crate::Database;
use chrono::NaiveDate;
use lcr_series::AnnualSeries;
use rusqlite::params;

/// Storage format for dates in `daily_series`.
pub(crate) const DATE_FORMAT: &str = "%Y%m%d";

pub(crate) fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(date_str, "%Y-%m-%d"))
        .ok()
}

fn parse_value(value_str: &str) -> Option<f64> {
    value_str.parse::<f64>().ok().filter(|value| value.is_finite())
}

impl Database {
    /// Load annual values from a headerless `key,year,value` CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// mead.release,2020,8504000
    /// az.cap.cu,2020,1472000
    /// ```
    pub fn load_annual(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let key = r.get(0).unwrap_or("").trim();
            let year = r.get(1).unwrap_or("").trim().parse::<i32>();
            let value = parse_value(r.get(2).unwrap_or("").trim());

            let (year, value) = match (year, value) {
                (Ok(year), Some(value)) if !key.is_empty() => (year, value),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            conn.execute(
                "INSERT OR REPLACE INTO annual_series (key, year, value) VALUES (?1, ?2, ?3)",
                params![key, year, value],
            )?;
            count += 1;
        }
        log::info!(
            "loader: loaded {} annual values, skipped {} non-numeric",
            count,
            skipped
        );
        Ok(())
    }

    /// Load daily values from a headerless `key,date,value` CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// mead.storage,20201001,10175000
    /// usgs.grand_canyon,2020-10-01,9120
    /// ```
    pub fn load_daily(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let key = r.get(0).unwrap_or("").trim();
            let date = parse_date(r.get(1).unwrap_or("").trim());
            let value = parse_value(r.get(2).unwrap_or("").trim());

            let (date, value) = match (date, value) {
                (Some(date), Some(value)) if !key.is_empty() => (date, value),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            conn.execute(
                "INSERT OR REPLACE INTO daily_series (key, date, value) VALUES (?1, ?2, ?3)",
                params![key, date.format(DATE_FORMAT).to_string(), value],
            )?;
            count += 1;
        }
        log::info!(
            "loader: loaded {} daily values, skipped {} non-numeric",
            count,
            skipped
        );
        Ok(())
    }

    /// Store an in-memory annual series under `key`, replacing matching years.
    pub fn insert_annual(&self, key: &str, series: &AnnualSeries) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        for year_value in &series.0 {
            conn.execute(
                "INSERT OR REPLACE INTO annual_series (key, year, value) VALUES (?1, ?2, ?3)",
                params![key, year_value.year, year_value.value],
            )?;
        }
        Ok(())
    }
}
