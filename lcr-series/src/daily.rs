//! Daily-resolution series, used for reservoir storage and gauge flows.

use crate::annual::AnnualSeries;
use crate::error::SeriesError;
use crate::water_year::{cfs_to_acre_feet, water_year, water_year_start};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single day's reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// Daily readings sorted by date, at most one per day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySeries(pub Vec<DayValue>);

impl DailySeries {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let by_date: BTreeMap<NaiveDate, f64> = pairs.into_iter().collect();
        DailySeries(
            by_date
                .into_iter()
                .map(|(date, value)| DayValue { date, value })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.0
            .binary_search_by_key(date, |day| day.date)
            .ok()
            .map(|index| self.0[index].value)
    }

    /// Sum of daily values per water year.
    pub fn annual_sum(&self, water_year_month: u32) -> Result<AnnualSeries, SeriesError> {
        let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
        for day in &self.0 {
            *totals
                .entry(water_year(&day.date, water_year_month)?)
                .or_insert(0.0) += day.value;
        }
        Ok(AnnualSeries::from_pairs(totals))
    }

    /// Daily mean flows in cfs totalled into acre-feet per water year.
    pub fn annual_acre_feet_from_cfs(
        &self,
        water_year_month: u32,
    ) -> Result<AnnualSeries, SeriesError> {
        let converted = DailySeries(
            self.0
                .iter()
                .map(|day| DayValue {
                    date: day.date,
                    value: cfs_to_acre_feet(day.value),
                })
                .collect(),
        );
        converted.annual_sum(water_year_month)
    }

    /// Change in value across each water year: the reading on the first day
    /// of the following water year minus the reading on the first day of
    /// this one. A year with either endpoint missing is logged and set to 0.
    pub fn storage_delta(
        &self,
        year_begin: i32,
        year_end: i32,
        water_year_month: u32,
    ) -> Result<AnnualSeries, SeriesError> {
        let mut deltas = Vec::new();
        for year in year_begin..=year_end {
            let begin_date = water_year_start(year, water_year_month)?;
            let end_date = water_year_start(year + 1, water_year_month)?;
            let delta = match (self.get(&begin_date), self.get(&end_date)) {
                (Some(begin), Some(end)) => end - begin,
                (begin, end) => {
                    log::warn!(
                        "storage delta for {} failed: begin {} {}, end {} {}",
                        year,
                        begin_date,
                        if begin.is_some() { "found" } else { "missing" },
                        end_date,
                        if end.is_some() { "found" } else { "missing" },
                    );
                    0.0
                }
            };
            deltas.push((year, delta));
        }
        Ok(AnnualSeries::from_pairs(deltas))
    }
}
