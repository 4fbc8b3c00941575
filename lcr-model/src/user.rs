//! Water users: named diverters whose consumptive use drives apportionment.

use lcr_series::{subtract_annual, AnnualSeries};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// A zero-argument producer of a user's full-history series.
pub type SeriesFn = Rc<dyn Fn() -> AnnualSeries>;

/// Position of a user in the model: owning state, then registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UserId {
    pub state: usize,
    pub index: usize,
}

/// A water user. Each series producer is optional; `None` means the
/// user's data module has no such series.
#[derive(Clone)]
pub struct User {
    pub name: String,
    pub state_code: String,
    /// Reported individually rather than lumped into "other users".
    pub example: bool,
    diversion: Option<SeriesFn>,
    returns: Option<SeriesFn>,
    cu: Option<SeriesFn>,
}

impl User {
    pub fn new(name: &str, state_code: &str, example: bool) -> Self {
        Self {
            name: name.to_string(),
            state_code: state_code.to_string(),
            example,
            diversion: None,
            returns: None,
            cu: None,
        }
    }

    pub fn with_diversion(mut self, diversion: SeriesFn) -> Self {
        self.diversion = Some(diversion);
        self
    }

    pub fn with_returns(mut self, returns: SeriesFn) -> Self {
        self.returns = Some(returns);
        self
    }

    pub fn with_cu(mut self, cu: SeriesFn) -> Self {
        self.cu = Some(cu);
        self
    }

    pub fn diversion(&self) -> Option<AnnualSeries> {
        self.diversion.as_ref().map(|diversion| diversion())
    }

    pub fn returns(&self) -> Option<AnnualSeries> {
        self.returns.as_ref().map(|returns| returns())
    }

    /// Consumptive use; falls back to diversion minus returns.
    pub fn cu(&self) -> Option<AnnualSeries> {
        if let Some(cu) = &self.cu {
            return Some(cu());
        }
        match (self.diversion(), self.returns()) {
            (Some(diversion), Some(returns)) => Some(subtract_annual(&diversion, &returns)),
            _ => None,
        }
    }

    /// Consumptive use clipped to `[year_begin, year_end]`, or `None` when the
    /// user is inactive there (no series, or every year exactly zero).
    pub fn get_cu_for_years(&self, year_begin: i32, year_end: i32) -> Option<AnnualSeries> {
        let cu = self.cu()?.reshape_annual_range(year_begin, year_end);
        if cu.is_all_zero() {
            None
        } else {
            Some(cu)
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("state_code", &self.state_code)
            .field("example", &self.example)
            .field("diversion", &self.diversion.is_some())
            .field("returns", &self.returns.is_some())
            .field("cu", &self.cu.is_some())
            .finish()
    }
}
