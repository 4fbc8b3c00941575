//! Reaches: river segments between two control points.
//!
//! A [`Reach`] is the static part (its lakes, loss constant and registered
//! users). Each run produces a fresh [`ReachRun`] holding everything computed
//! for that year range, so nothing carries over between runs.

use crate::lake::{
    LakeRegistry, HAVASU, IMPERIAL, MEAD, MOHAVE, MORELOS, PALO_VERDE_DAM, POWELL, ROCK_DAM,
};
use crate::options::{LossConstants, ModelOptions};
use crate::state::StateRegistry;
use crate::user::UserId;
use lcr_series::{add_annuals, subtract_annual, AnnualSeries};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// First year with complete gauge records below Glen Canyon Dam.
pub const REACH1_GAUGE_RECORD_BEGIN: i32 = 1991;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ReachKind {
    Reach0,
    Reach1,
    Reach2,
    Reach3,
    Reach3a,
    Reach3b,
    Reach4,
    Reach5,
    Reach6,
}

impl ReachKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReachKind::Reach0 => "Reach0",
            ReachKind::Reach1 => "Reach1",
            ReachKind::Reach2 => "Reach2",
            ReachKind::Reach3 => "Reach3",
            ReachKind::Reach3a => "Reach3a",
            ReachKind::Reach3b => "Reach3b",
            ReachKind::Reach4 => "Reach4",
            ReachKind::Reach5 => "Reach5",
            ReachKind::Reach6 => "Reach6",
        }
    }

    /// The lake or dam closing this reach; the upper lake is the previous
    /// reach's lower one.
    pub fn lower_lake(&self) -> Option<&'static str> {
        match self {
            ReachKind::Reach0 => Some(POWELL),
            ReachKind::Reach1 => Some(MEAD),
            ReachKind::Reach2 => Some(MOHAVE),
            ReachKind::Reach3 => Some(HAVASU),
            ReachKind::Reach3a => Some(ROCK_DAM),
            ReachKind::Reach3b => Some(PALO_VERDE_DAM),
            ReachKind::Reach4 => Some(IMPERIAL),
            ReachKind::Reach5 => Some(MORELOS),
            ReachKind::Reach6 => None,
        }
    }
}

impl fmt::Display for ReachKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The reaches of a scenario, headwater first, with their loss constants.
pub fn reach_layout(options: &ModelOptions, losses: &LossConstants) -> Vec<(ReachKind, f64)> {
    let mead_evaporation = if options.grand_canyon_inflow_cancels_mead_evap {
        0.0
    } else {
        losses.lake_mead_evaporation
    };
    let havasu_evaporation = if options.havasu_evap_charge_to_havasu_users {
        0.0
    } else {
        losses.lake_havasu_evaporation
    };

    let mut layout = vec![
        (ReachKind::Reach0, 0.0),
        (ReachKind::Reach1, mead_evaporation),
        (ReachKind::Reach2, losses.lake_mohave_evaporation),
        (ReachKind::Reach3, losses.reach3_corridor + havasu_evaporation),
    ];
    if options.crit_in_reach_3a {
        layout.push((ReachKind::Reach3a, 0.0));
    }
    if options.palo_verde_in_reach_3b {
        let above_palo_verde = losses.reach4_corridor * losses.reach4_above_palo_verde_fraction;
        layout.push((ReachKind::Reach3b, above_palo_verde));
        layout.push((ReachKind::Reach4, losses.reach4_corridor - above_palo_verde));
    } else {
        layout.push((ReachKind::Reach4, losses.reach4_corridor));
    }
    layout.push((ReachKind::Reach5, losses.reach5_corridor));
    if options.reach6_for_mexico {
        layout.push((ReachKind::Reach6, 0.0));
    }
    layout
}

/// A segment of the river and the users diverting from it.
#[derive(Debug, Clone)]
pub struct Reach {
    pub kind: ReachKind,
    /// Index into the model's lake registry; `None` above the top lake.
    pub upper_lake: Option<usize>,
    /// `None` below the last lake.
    pub lower_lake: Option<usize>,
    /// Annual loss (AF) not attributable to any single user.
    pub loss: f64,
    pub users: Vec<UserId>,
}

impl Reach {
    pub fn new(kind: ReachKind, upper_lake: Option<usize>, lower_lake: Option<usize>, loss: f64) -> Self {
        Self {
            kind,
            upper_lake,
            lower_lake,
            loss,
            users: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn add_user(&mut self, user: UserId) {
        self.users.push(user);
    }

    /// Balance diagnostics and consumptive use for one year range.
    pub fn model(
        &self,
        index: usize,
        lakes: &LakeRegistry,
        states: &StateRegistry,
        year_begin: i32,
        year_end: i32,
    ) -> ReachRun {
        let balance = self.balance(lakes, year_begin, year_end);
        let active_users_in_reach = self.cu(states, year_begin, year_end);

        let mut per_user = vec![AnnualSeries::zeros(year_begin, year_end)];
        per_user.extend(active_users_in_reach.iter().map(|active| active.cu_for_years.clone()));
        // never empty: the zero series is always first
        let reach_cu = add_annuals(&per_user).unwrap_or_default();
        let number_of_years = (year_end - year_begin + 1).max(1) as f64;
        let cu_avg = reach_cu.sum() / number_of_years;

        log::debug!(
            "{}: {} active users, cu avg {:.0}",
            self.name(),
            active_users_in_reach.len(),
            cu_avg
        );

        ReachRun {
            kind: self.kind,
            index,
            loss: self.loss,
            balance,
            active_users_in_reach,
            reach_cu,
            cu_avg,
            active_users_through_reach: BTreeMap::new(),
            through_reach_cu_avg: 0.0,
            state_assessment: BTreeMap::new(),
        }
    }

    fn balance(&self, lakes: &LakeRegistry, year_begin: i32, year_end: i32) -> Option<ReachBalance> {
        let upper = self.upper_lake.and_then(|index| lakes.by_index(index));
        let lower = self.lower_lake.and_then(|index| lakes.by_index(index));
        let (upper, lower) = match (upper, lower) {
            (Some(upper), Some(lower)) => (upper, lower),
            _ => return None,
        };

        if self.kind == ReachKind::Reach1 && year_begin < REACH1_GAUGE_RECORD_BEGIN {
            log::warn!(
                "{}: side inflow gauges incomplete before {}, balance for {}..={} is approximate",
                self.name(),
                REACH1_GAUGE_RECORD_BEGIN,
                year_begin,
                year_end
            );
        }

        let reach_inflow = upper.release(year_begin, year_end).unwrap_or_else(|| {
            log::warn!("{}: {} release not modeled, using inflow", self.name(), upper.name);
            upper.inflow(year_begin, year_end)
        });
        let lower_lake_inflow = lower.inflow(year_begin, year_end);
        let reach_side_inflows = subtract_annual(&lower_lake_inflow, &reach_inflow);

        let (lower_lake_release, release_is_proxy) = match lower.release(year_begin, year_end) {
            Some(release) => (release, false),
            None => {
                log::warn!(
                    "{}: release modeling missing for {}, using its inflow",
                    self.name(),
                    lower.name
                );
                (lower_lake_inflow.clone(), true)
            }
        };
        let storage_delta = lower.storage_delta(year_begin, year_end);

        Some(ReachBalance {
            reach_inflow,
            lower_lake_inflow,
            reach_side_inflows,
            lower_lake_release,
            release_is_proxy,
            storage_delta,
        })
    }

    /// Registered users with nonzero consumptive use in the year range.
    pub fn cu(&self, states: &StateRegistry, year_begin: i32, year_end: i32) -> Vec<ActiveUser> {
        self.users
            .iter()
            .filter_map(|&id| {
                let user = states.user(id)?;
                let cu_for_years = user.get_cu_for_years(year_begin, year_end)?;
                Some(ActiveUser {
                    id,
                    state_code: user.state_code.clone(),
                    cu_avg: cu_for_years.mean(),
                    cu_for_years,
                })
            })
            .collect()
    }
}

/// Flow balance diagnostics; not part of the apportionment arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReachBalance {
    pub reach_inflow: AnnualSeries,
    pub lower_lake_inflow: AnnualSeries,
    pub reach_side_inflows: AnnualSeries,
    pub lower_lake_release: AnnualSeries,
    /// The lower lake has no release model; its inflow stands in.
    pub release_is_proxy: bool,
    pub storage_delta: AnnualSeries,
}

/// A user with consumptive use in the run's year range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveUser {
    pub id: UserId,
    pub state_code: String,
    pub cu_avg: f64,
    pub cu_for_years: AnnualSeries,
}

/// One state's share of a reach's loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateAssessment {
    /// Sum of the state's through-reach users' average consumptive use.
    pub cu_avg: f64,
    /// Fraction (0..=1) of the reach's through-reach consumptive use.
    pub percentage: f64,
    /// Share of the reach loss, acre-feet.
    pub assessment: f64,
    /// Lake evaporation charged directly to named users of this state.
    pub lake_evap: Option<f64>,
}

/// Everything computed for one reach in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReachRun {
    pub kind: ReachKind,
    pub index: usize,
    pub loss: f64,
    pub balance: Option<ReachBalance>,
    pub active_users_in_reach: Vec<ActiveUser>,
    pub reach_cu: AnnualSeries,
    pub cu_avg: f64,
    /// Active users in this reach or any reach below it, by state.
    pub active_users_through_reach: BTreeMap<String, Vec<ActiveUser>>,
    pub through_reach_cu_avg: f64,
    pub state_assessment: BTreeMap<String, StateAssessment>,
}

impl ReachRun {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Active users grouped by state, each list in registration order.
    pub fn users_in_reach_by_state(&self) -> BTreeMap<String, Vec<ActiveUser>> {
        let mut by_state: BTreeMap<String, Vec<ActiveUser>> = BTreeMap::new();
        for active in &self.active_users_in_reach {
            by_state
                .entry(active.state_code.clone())
                .or_default()
                .push(active.clone());
        }
        by_state
    }

    /// Sum of `cu_avg` over this reach and every reach below it.
    /// `downstream` holds the reaches after this one.
    pub fn compute_through_reach_cu_avg(&mut self, downstream: &[ReachRun]) {
        self.through_reach_cu_avg =
            self.cu_avg + downstream.iter().map(|reach| reach.cu_avg).sum::<f64>();
    }

    /// Split this reach's loss between states in proportion to their
    /// through-reach average consumptive use.
    pub fn compute_state_assessment(&mut self) {
        self.state_assessment.clear();
        if self.through_reach_cu_avg <= 0.0 {
            if self.loss > 0.0 {
                log::warn!(
                    "{}: no active users at or below reach, loss {:.0} unassessed",
                    self.name(),
                    self.loss
                );
            }
            return;
        }
        for (state_code, users) in &self.active_users_through_reach {
            let cu_avg: f64 = users.iter().map(|active| active.cu_avg).sum();
            let percentage = cu_avg / self.through_reach_cu_avg;
            self.state_assessment.insert(
                state_code.clone(),
                StateAssessment {
                    cu_avg,
                    percentage,
                    assessment: percentage * self.loss,
                    lake_evap: None,
                },
            );
        }
    }

    /// A user's share of this reach's loss: their average consumptive use
    /// relative to their state's, times the state's assessment.
    pub fn user_assessment(&self, active: &ActiveUser) -> f64 {
        match self.state_assessment.get(&active.state_code) {
            Some(state) if state.cu_avg > 0.0 => active.cu_avg / state.cu_avg * state.assessment,
            _ => 0.0,
        }
    }

    /// Total assessed across states, excluding lake evaporation charges.
    pub fn assessed_total(&self) -> f64 {
        self.state_assessment
            .values()
            .map(|state| state.assessment)
            .sum()
    }
}
