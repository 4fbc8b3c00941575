//! Year-indexed and daily series arithmetic for Lower Colorado River
//! water accounting.
//!
//! Every quantity the accounting engine handles (release, inflow,
//! consumptive use, evaporation) is an [`AnnualSeries`]: one value per
//! calendar or water year. Series are always aligned to an explicit
//! year range before they are combined; absent years become exactly 0.

pub mod annual;
pub mod daily;
pub mod error;
pub mod water_year;

pub use annual::{add_annual, add_annuals, subtract_annual, AnnualSeries, YearValue};
pub use daily::{DailySeries, DayValue};
pub use error::SeriesError;
pub use water_year::{cfs_to_acre_feet, water_year, water_year_start, AF_PER_CFS_DAY};
