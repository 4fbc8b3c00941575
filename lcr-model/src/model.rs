//! The basin model: builds the lake and reach chain, registers the state
//! rosters, and apportions reach losses over a year range.

use crate::apportionment::{Apportionment, LakeEvapCharge, Summary};
use crate::error::ModelError;
use crate::lake::{Lake, LakeRegistry, LakeSpec};
use crate::options::{LossConstants, ModelOptions};
use crate::reach::{reach_layout, ActiveUser, Reach, ReachKind, ReachRun};
use crate::roster::{roster, STATES};
use crate::state::{State, StateRegistry};
use crate::user::UserId;
use lcr_data::{Database, StateModule};
use lcr_series::water_year_start;
use std::collections::BTreeMap;

/// The two users sharing Lake Havasu evaporation when it is charged directly.
pub const HAVASU_EVAP_USERS: [(&str, &str); 2] = [("az", "cap"), ("ca", "metropolitan")];

#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub options: ModelOptions,
    pub losses: LossConstants,
    lakes: LakeRegistry,
    reaches: Vec<Reach>,
    states: StateRegistry,
    water_year_month: u32,
    initialized: Option<(i32, i32)>,
    last_run: Option<Apportionment>,
}

impl Model {
    pub fn new(name: &str) -> Self {
        Self::with_options(name, ModelOptions::default(), LossConstants::default())
    }

    pub fn with_options(name: &str, options: ModelOptions, losses: LossConstants) -> Self {
        Self {
            name: name.to_string(),
            options,
            losses,
            lakes: LakeRegistry::new(),
            reaches: Vec::new(),
            states: StateRegistry::new(),
            water_year_month: 10,
            initialized: None,
            last_run: None,
        }
    }

    /// Build lakes (upstream first), reaches and state rosters from `db`.
    ///
    /// Lake series are derived for `[year_begin, year_end]`; later runs
    /// should stay inside that window. Any previous graph is discarded.
    ///
    /// Bad year ranges, unknown lakes, reaches or users come back as a
    /// [`ModelError`] inside the `anyhow::Error` (`downcast_ref` recovers
    /// it). Failures reading `db` are passed through as the store reports
    /// them.
    pub fn initialize(
        &mut self,
        db: &Database,
        year_begin: i32,
        year_end: i32,
        water_year_month: u32,
    ) -> anyhow::Result<()> {
        if year_begin > year_end {
            return Err(ModelError::InvalidYearRange {
                year_begin,
                year_end,
            }
            .into());
        }
        water_year_start(year_begin, water_year_month).map_err(ModelError::from)?;

        self.water_year_month = water_year_month;
        self.lakes = LakeRegistry::new();
        self.reaches.clear();
        self.states = StateRegistry::new();
        self.initialized = None;
        self.last_run = None;

        for spec in LakeSpec::chain(&self.options) {
            let lake = Lake::build(
                &spec,
                db,
                &self.lakes,
                &self.options,
                year_begin,
                year_end,
                water_year_month,
            )?;
            self.lakes.insert(lake);
        }

        let mut upper_lake = None;
        for (kind, loss) in reach_layout(&self.options, &self.losses) {
            let lower_lake = match kind.lower_lake() {
                Some(name) => Some(self.lakes.index_of(name)?),
                None => None,
            };
            self.reaches.push(Reach::new(kind, upper_lake, lower_lake, loss));
            upper_lake = lower_lake;
        }

        for (state_index, (state_name, code)) in STATES.iter().enumerate() {
            let module = StateModule::new(code, db.clone());
            let mut state = State::new(state_name, code);
            for (kind, user_name, example) in roster(code, &self.options) {
                let index = state.user(&module, user_name, example)?;
                let reach = self
                    .reaches
                    .iter_mut()
                    .find(|reach| reach.kind == kind)
                    .ok_or_else(|| ModelError::ReachNotFound {
                        name: kind.name().to_string(),
                    })?;
                reach.add_user(UserId {
                    state: state_index,
                    index,
                });
            }
            self.states.insert(state);
        }

        log::info!(
            "{}: initialized {} lakes, {} reaches, {} states for {}..={}",
            self.name,
            self.lakes.len(),
            self.reaches.len(),
            self.states.len(),
            year_begin,
            year_end
        );
        self.initialized = Some((year_begin, year_end));
        Ok(())
    }

    /// Apportion every reach's loss over `[year_begin, year_end]`.
    ///
    /// Each call builds a new [`Apportionment`]; repeated runs with the same
    /// range give identical results.
    pub fn run(&mut self, year_begin: i32, year_end: i32) -> Result<&Apportionment, ModelError> {
        let (init_begin, init_end) = self.initialized.ok_or_else(|| ModelError::NotInitialized {
            name: self.name.clone(),
        })?;
        if year_begin > year_end {
            return Err(ModelError::InvalidYearRange {
                year_begin,
                year_end,
            });
        }
        if year_begin < init_begin || year_end > init_end {
            log::warn!(
                "{}: run {}..={} outside initialized {}..={}, lake series zero-filled",
                self.name,
                year_begin,
                year_end,
                init_begin,
                init_end
            );
        }

        let mut runs: Vec<ReachRun> = self
            .reaches
            .iter()
            .enumerate()
            .map(|(index, reach)| reach.model(index, &self.lakes, &self.states, year_begin, year_end))
            .collect();

        self.model_active_users_through_reach(&mut runs);

        for index in 1..runs.len() {
            let (head, downstream) = runs.split_at_mut(index + 1);
            head[index].compute_through_reach_cu_avg(downstream);
        }
        for run in runs.iter_mut().skip(1) {
            run.compute_state_assessment();
        }

        let charges = if self.options.havasu_evap_charge_to_havasu_users {
            self.charge_havasu_evaporation(&mut runs, year_begin, year_end)
        } else {
            Vec::new()
        };

        let apportionment = Apportionment::new(
            &self.name,
            year_begin,
            year_end,
            runs,
            charges,
            &self.states,
        );
        log::info!(
            "{}: apportioned {:.0} af over {} reaches for {}..={}",
            self.name,
            apportionment.total_loss(),
            apportionment.reaches.len(),
            year_begin,
            year_end
        );
        Ok(self.last_run.insert(apportionment))
    }

    /// Give every reach below the top the active users of itself and every
    /// reach downstream of it.
    fn model_active_users_through_reach(&self, runs: &mut [ReachRun]) {
        let by_reach: Vec<BTreeMap<String, Vec<ActiveUser>>> =
            runs.iter().map(|run| run.users_in_reach_by_state()).collect();
        for index in 1..runs.len() {
            let mut through: BTreeMap<String, Vec<ActiveUser>> = BTreeMap::new();
            for by_state in &by_reach[index..] {
                for (code, users) in by_state {
                    through
                        .entry(code.clone())
                        .or_default()
                        .extend(users.iter().cloned());
                }
            }
            runs[index].active_users_through_reach = through;
        }
    }

    /// Add Lake Havasu evaporation to Reach3 and charge it to CAP and
    /// Metropolitan by their own average consumptive use. Skipped with a
    /// warning when either user or Reach3 is missing.
    fn charge_havasu_evaporation(
        &self,
        runs: &mut [ReachRun],
        year_begin: i32,
        year_end: i32,
    ) -> Vec<LakeEvapCharge> {
        let mut parties = Vec::with_capacity(HAVASU_EVAP_USERS.len());
        for (code, name) in HAVASU_EVAP_USERS {
            match self.states.user_id(code, name) {
                Ok(id) => parties.push(id),
                Err(e) => {
                    log::warn!("{}: Havasu evaporation not charged: {}", self.name, e);
                    return Vec::new();
                }
            }
        }
        let Some(reach3) = runs.iter_mut().find(|run| run.kind == ReachKind::Reach3) else {
            log::warn!("{}: Havasu evaporation not charged: no Reach3", self.name);
            return Vec::new();
        };

        let averages: Vec<f64> = parties
            .iter()
            .map(|&id| {
                self.states
                    .user(id)
                    .and_then(|user| user.get_cu_for_years(year_begin, year_end))
                    .map(|cu| cu.mean())
                    .unwrap_or(0.0)
            })
            .collect();
        let total: f64 = averages.iter().sum();
        if total <= 0.0 {
            log::warn!(
                "{}: Havasu evaporation not charged: no consumptive use by {:?}",
                self.name,
                HAVASU_EVAP_USERS
            );
            return Vec::new();
        }

        let evaporation = self.losses.lake_havasu_evaporation;
        reach3.loss += evaporation;
        let mut charges = Vec::with_capacity(parties.len());
        for (&id, average) in parties.iter().zip(averages) {
            let amount = average / total * evaporation;
            let state_code = self
                .states
                .by_index(id.state)
                .map(|state| state.code.clone())
                .unwrap_or_default();
            let entry = reach3.state_assessment.entry(state_code.clone()).or_default();
            *entry.lake_evap.get_or_insert(0.0) += amount;
            log::debug!("{}: Havasu evaporation {:.0} af to {}", self.name, amount, state_code);
            charges.push(LakeEvapCharge {
                user: id,
                state_code,
                reach_index: reach3.index,
                amount,
            });
        }
        charges
    }

    pub fn summary(&self) -> Result<Summary, ModelError> {
        self.last_run
            .as_ref()
            .map(Apportionment::summary)
            .ok_or_else(|| ModelError::NotRun {
                name: self.name.clone(),
            })
    }

    /// Print the last run's tables to stdout and return its summary.
    pub fn print(&self) -> Result<Summary, ModelError> {
        let apportionment = self.last_run.as_ref().ok_or_else(|| ModelError::NotRun {
            name: self.name.clone(),
        })?;
        println!("{}", apportionment);
        Ok(apportionment.summary())
    }

    pub fn last_run(&self) -> Option<&Apportionment> {
        self.last_run.as_ref()
    }

    pub fn lakes(&self) -> &LakeRegistry {
        &self.lakes
    }

    pub fn reaches(&self) -> &[Reach] {
        &self.reaches
    }

    pub fn states(&self) -> &StateRegistry {
        &self.states
    }

    pub fn water_year_month(&self) -> u32 {
        self.water_year_month
    }
}
