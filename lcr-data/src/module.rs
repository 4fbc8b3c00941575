//! Per-state views over the store, resolving water-user series by name.

use crate::Database;
use lcr_series::AnnualSeries;
use std::fmt;

/// The three series a water user can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserSeries {
    Diversion,
    Returns,
    ConsumptiveUse,
}

impl UserSeries {
    pub fn suffix(&self) -> &'static str {
        match self {
            UserSeries::Diversion => "diversion",
            UserSeries::Returns => "returns",
            UserSeries::ConsumptiveUse => "cu",
        }
    }
}

impl fmt::Display for UserSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// The data module for one state: user series live at
/// `{state_code}.{user}.{diversion|returns|cu}`.
#[derive(Clone)]
pub struct StateModule {
    state_code: String,
    db: Database,
}

impl StateModule {
    pub fn new(state_code: &str, db: Database) -> Self {
        Self {
            state_code: state_code.to_string(),
            db,
        }
    }

    pub fn key(&self, user: &str, series: UserSeries) -> String {
        format!("{}.{}.{}", self.state_code, user, series.suffix())
    }

    /// The named series for `user`, or `None` when the module has none.
    pub fn user_series(
        &self,
        user: &str,
        series: UserSeries,
    ) -> anyhow::Result<Option<AnnualSeries>> {
        self.db.query_annual(&self.key(user, series))
    }
}
