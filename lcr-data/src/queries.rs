//! Typed queries returning series from the store.
//!
//! A key with no rows is reported as `None` rather than an empty series so
//! callers can tell "not loaded" apart from "loaded as zeros".

use crate::loader::{parse_date, DATE_FORMAT};
use crate::Database;
use lcr_series::{AnnualSeries, DailySeries};
use rusqlite::params;

impl Database {
    /// Annual series stored under `key`, ordered by year.
    pub fn query_annual(&self, key: &str) -> anyhow::Result<Option<AnnualSeries>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT year, value FROM annual_series
             WHERE key = ?1
             ORDER BY year",
        )?;
        let rows = stmt
            .query_map(params![key], |row| {
                Ok((row.get::<_, i32>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("query: query_annual({}) returned {} records", key, rows.len());
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(AnnualSeries::from_pairs(rows)))
    }

    /// Daily series stored under `key`, ordered by date.
    pub fn query_daily(&self, key: &str) -> anyhow::Result<Option<DailySeries>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT date, value FROM daily_series
             WHERE key = ?1
             ORDER BY date",
        )?;
        let raw_rows = stmt
            .query_map(params![key], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("query: query_daily({}) returned {} records", key, raw_rows.len());
        if raw_rows.is_empty() {
            return Ok(None);
        }
        let mut rows = Vec::with_capacity(raw_rows.len());
        for (date_str, value) in raw_rows {
            let date = parse_date(&date_str).ok_or_else(|| {
                anyhow::anyhow!("stored date '{}' is not {}", date_str, DATE_FORMAT)
            })?;
            rows.push((date, value));
        }
        Ok(Some(DailySeries::from_pairs(rows)))
    }

    /// Annual series at `key`, or the daily series at `key` (mean daily cfs)
    /// totalled into acre-feet per water year.
    pub fn annual_or_daily(
        &self,
        key: &str,
        water_year_month: u32,
    ) -> anyhow::Result<Option<AnnualSeries>> {
        if let Some(annual) = self.query_annual(key)? {
            return Ok(Some(annual));
        }
        match self.query_daily(key)? {
            Some(daily) => Ok(Some(daily.annual_acre_feet_from_cfs(water_year_month)?)),
            None => Ok(None),
        }
    }

    /// True when `key` has any annual or daily rows.
    pub fn has_series(&self, key: &str) -> anyhow::Result<bool> {
        let conn = self.conn.borrow();
        let count: i64 = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM annual_series WHERE key = ?1)
                  + (SELECT COUNT(*) FROM daily_series WHERE key = ?1)",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Every distinct key in the store, sorted.
    pub fn query_keys(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT key FROM annual_series
             UNION
             SELECT key FROM daily_series
             ORDER BY key",
        )?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("query: query_keys returned {} records", keys.len());
        Ok(keys)
    }
}
