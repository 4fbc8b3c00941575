//! Year-indexed series.

use crate::error::SeriesError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, Sub};

/// One year's value, in acre-feet unless noted otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// A series with at most one value per year, sorted by year.
///
/// Arithmetic between two series never aligns by position: the right-hand
/// operand is first reshaped onto the year range of the left-hand one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnualSeries(pub Vec<YearValue>);

impl AnnualSeries {
    /// Build a series from (year, value) pairs. Later duplicates win.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        let by_year: BTreeMap<i32, f64> = pairs.into_iter().collect();
        AnnualSeries(
            by_year
                .into_iter()
                .map(|(year, value)| YearValue { year, value })
                .collect(),
        )
    }

    /// Every year in `[year_begin, year_end]` set to `value`.
    pub fn constant(year_begin: i32, year_end: i32, value: f64) -> Self {
        AnnualSeries(
            (year_begin..=year_end)
                .map(|year| YearValue { year, value })
                .collect(),
        )
    }

    /// Every year in `[year_begin, year_end]` set to 0.
    pub fn zeros(year_begin: i32, year_end: i32) -> Self {
        Self::constant(year_begin, year_end, 0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.0
            .binary_search_by_key(&year, |year_value| year_value.year)
            .ok()
            .map(|index| self.0[index].value)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().map(|year_value| year_value.year)
    }

    pub fn values(&self) -> Vec<f64> {
        self.0.iter().map(|year_value| year_value.value).collect()
    }

    /// First and last year, or `None` for an empty series.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => Some((first.year, last.year)),
            _ => None,
        }
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().map(|year_value| year_value.value).sum()
    }

    /// Arithmetic mean over the entries present, 0 for an empty series.
    pub fn mean(&self) -> f64 {
        if self.0.is_empty() {
            0.0
        } else {
            self.sum() / self.0.len() as f64
        }
    }

    /// True when every value is exactly zero (or the series is empty).
    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|year_value| year_value.value == 0.0)
    }

    /// Cover exactly `[year_min, year_max]`, copying matching years and
    /// zero-filling the rest. This is not interpolation.
    pub fn reshape_annual_range(&self, year_min: i32, year_max: i32) -> Self {
        AnnualSeries(
            (year_min..=year_max)
                .map(|year| YearValue {
                    year,
                    value: self.get(year).unwrap_or(0.0),
                })
                .collect(),
        )
    }

    /// Zero-fill any gap between the first and last year.
    pub fn fill_missing_years(&self) -> Self {
        match self.year_range() {
            Some((year_min, year_max)) => self.reshape_annual_range(year_min, year_max),
            None => AnnualSeries::default(),
        }
    }

    /// Trailing average over up to `window` years ending at each year.
    /// The first `window - 1` points average over the years available so far.
    pub fn running_average(&self, window: usize) -> Result<Self, SeriesError> {
        if window == 0 {
            return Err(SeriesError::InvalidWindow);
        }
        let values = self.values();
        let averaged = self
            .0
            .iter()
            .enumerate()
            .map(|(index, year_value)| {
                let start = (index + 1).saturating_sub(window);
                let trailing = &values[start..=index];
                YearValue {
                    year: year_value.year,
                    value: trailing.iter().sum::<f64>() / trailing.len() as f64,
                }
            })
            .collect();
        Ok(AnnualSeries(averaged))
    }

    fn combine(&self, other: &AnnualSeries, op: impl Fn(f64, f64) -> f64) -> Self {
        AnnualSeries(
            self.0
                .iter()
                .map(|year_value| YearValue {
                    year: year_value.year,
                    value: op(year_value.value, other.get(year_value.year).unwrap_or(0.0)),
                })
                .collect(),
        )
    }
}

/// Element-wise sum over the year range of `a`. An empty `a` gives an
/// empty result, as for [`subtract_annual`].
pub fn add_annual(a: &AnnualSeries, b: &AnnualSeries) -> AnnualSeries {
    a.combine(b, |x, y| x + y)
}

/// Sum of several series over the year range of the first one.
pub fn add_annuals(series: &[AnnualSeries]) -> Result<AnnualSeries, SeriesError> {
    let (first, rest) = series.split_first().ok_or_else(|| {
        log::error!("add_annuals called with no series");
        SeriesError::EmptySeries
    })?;
    Ok(rest
        .iter()
        .fold(first.clone(), |total, next| add_annual(&total, next)))
}

/// Element-wise `a - b` over the year range of `a`.
pub fn subtract_annual(a: &AnnualSeries, b: &AnnualSeries) -> AnnualSeries {
    a.combine(b, |x, y| x - y)
}

impl Add for &AnnualSeries {
    type Output = AnnualSeries;

    fn add(self, rhs: &AnnualSeries) -> Self::Output {
        add_annual(self, rhs)
    }
}

impl Sub for &AnnualSeries {
    type Output = AnnualSeries;

    fn sub(self, rhs: &AnnualSeries) -> Self::Output {
        subtract_annual(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> AnnualSeries {
        AnnualSeries::from_pairs(vec![(2016, 10.0), (2018, 30.0), (2017, 20.0)])
    }

    #[test]
    fn test_from_pairs_sorts_years() {
        let series = sample();
        assert_eq!(series.years().collect::<Vec<_>>(), vec![2016, 2017, 2018]);
        assert_eq!(series.get(2017), Some(20.0));
        assert_eq!(series.get(2030), None);
    }

    #[test]
    fn test_reshape_zero_fills_and_truncates() {
        let reshaped = sample().reshape_annual_range(2015, 2017);
        assert_eq!(reshaped.values(), vec![0.0, 10.0, 20.0]);
        assert_eq!(reshaped.year_range(), Some((2015, 2017)));
    }

    #[test]
    fn test_reshape_length_matches_range() {
        for (begin, end) in [(2000, 2000), (1990, 2021), (2016, 2021)] {
            let reshaped = sample().reshape_annual_range(begin, end);
            assert_eq!(reshaped.len(), (end - begin + 1) as usize);
        }
    }

    #[test]
    fn test_reshape_is_idempotent() {
        let once = sample().reshape_annual_range(2014, 2019);
        let twice = once.reshape_annual_range(2014, 2019);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fill_missing_years() {
        let gappy = AnnualSeries::from_pairs(vec![(2000, 1.0), (2003, 4.0)]);
        assert_eq!(gappy.fill_missing_years().values(), vec![1.0, 0.0, 0.0, 4.0]);
    }

    #[test]
    fn test_add_annual_uses_first_range() {
        let a = AnnualSeries::constant(2016, 2018, 1.0);
        let b = AnnualSeries::from_pairs(vec![(2015, 100.0), (2017, 5.0), (2019, 100.0)]);
        let total = add_annual(&a, &b);
        assert_eq!(total.year_range(), Some((2016, 2018)));
        assert_eq!(total.values(), vec![1.0, 6.0, 1.0]);
    }

    #[test]
    fn test_empty_first_operand_gives_empty_result() {
        let empty = AnnualSeries::default();
        let b = AnnualSeries::constant(2016, 2018, 5.0);
        assert_eq!(add_annual(&empty, &b).year_range(), None);
        assert_eq!(subtract_annual(&empty, &b).year_range(), None);
        assert_eq!(add_annual(&b, &empty), b);
    }

    #[test]
    fn test_add_zero_is_identity() {
        let series = sample();
        assert_eq!(&series + &AnnualSeries::zeros(2016, 2018), series);
    }

    #[test]
    fn test_subtract_self_is_zero() {
        let series = sample();
        assert!((&series - &series).is_all_zero());
    }

    #[test]
    fn test_add_annuals_empty_is_error() {
        assert_eq!(add_annuals(&[]), Err(SeriesError::EmptySeries));
    }

    #[test]
    fn test_add_annuals() {
        let total = add_annuals(&[sample(), sample(), AnnualSeries::zeros(2016, 2018)]).unwrap();
        assert_eq!(total.values(), vec![20.0, 40.0, 60.0]);
    }

    #[test]
    fn test_running_average_grows_then_slides() {
        let series = AnnualSeries::from_pairs(vec![
            (2000, 2.0),
            (2001, 4.0),
            (2002, 6.0),
            (2003, 8.0),
        ]);
        let averaged = series.running_average(3).unwrap();
        let values = averaged.values();
        assert_abs_diff_eq!(values[0], 2.0);
        assert_abs_diff_eq!(values[1], 3.0);
        assert_abs_diff_eq!(values[2], 4.0);
        assert_abs_diff_eq!(values[3], 6.0);
        assert_eq!(series.running_average(0), Err(SeriesError::InvalidWindow));
    }

    #[test]
    fn test_mean_and_zero_detection() {
        assert_abs_diff_eq!(sample().mean(), 20.0);
        assert_abs_diff_eq!(AnnualSeries::default().mean(), 0.0);
        assert!(AnnualSeries::zeros(2000, 2005).is_all_zero());
        assert!(!sample().is_all_zero());
    }
}
