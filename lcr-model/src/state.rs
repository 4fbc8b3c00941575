//! States: political groupings of water users.

use crate::error::ModelError;
use crate::user::{SeriesFn, User, UserId};
use lcr_data::{StateModule, UserSeries};
use lcr_series::{add_annuals, AnnualSeries, SeriesError};
use std::collections::HashMap;
use std::rc::Rc;

/// A state and the users it has registered, in registration order.
#[derive(Debug, Clone)]
pub struct State {
    pub name: String,
    pub code: String,
    users: Vec<User>,
    by_name: HashMap<String, usize>,
}

impl State {
    pub fn new(name: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            users: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Build a user whose series are resolved from `module` by name and
    /// register it. Missing series are logged; the user simply lacks them.
    /// Registering an existing name returns the existing user's index.
    pub fn user(&mut self, module: &StateModule, name: &str, example: bool) -> anyhow::Result<usize> {
        if let Some(&index) = self.by_name.get(name) {
            return Ok(index);
        }
        let mut user = User::new(name, &self.code, example);
        for kind in [
            UserSeries::Diversion,
            UserSeries::Returns,
            UserSeries::ConsumptiveUse,
        ] {
            let series = match module.user_series(name, kind)? {
                Some(series) => series,
                None => {
                    log::warn!("{}: {} not available", self.code, module.key(name, kind));
                    continue;
                }
            };
            let producer: SeriesFn = Rc::new(move || series.clone());
            user = match kind {
                UserSeries::Diversion => user.with_diversion(producer),
                UserSeries::Returns => user.with_returns(producer),
                UserSeries::ConsumptiveUse => user.with_cu(producer),
            };
        }
        Ok(self.add_user(user))
    }

    /// Register an already-built user, returning its index.
    pub fn add_user(&mut self, user: User) -> usize {
        if let Some(&index) = self.by_name.get(&user.name) {
            return index;
        }
        let index = self.users.len();
        self.by_name.insert(user.name.clone(), index);
        self.users.push(user);
        index
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user_index_for_name(&self, name: &str) -> Result<usize, ModelError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UserNotFound {
                name: name.to_string(),
                state: self.code.clone(),
            })
    }

    pub fn user_for_name(&self, name: &str) -> Result<&User, ModelError> {
        self.user_index_for_name(name).map(|index| &self.users[index])
    }

    fn total(&self, series: impl Fn(&User) -> Option<AnnualSeries>) -> Result<AnnualSeries, SeriesError> {
        let available: Vec<AnnualSeries> = self.users.iter().filter_map(series).collect();
        add_annuals(&available)
    }

    /// Sum of registered users' diversions over the first such series' years.
    pub fn total_user_diversion(&self) -> Result<AnnualSeries, SeriesError> {
        self.total(User::diversion)
    }

    pub fn total_user_cu(&self) -> Result<AnnualSeries, SeriesError> {
        self.total(User::cu)
    }

    pub fn total_user_returns(&self) -> Result<AnnualSeries, SeriesError> {
        self.total(User::returns)
    }
}

/// The states of one model, looked up by abbreviation.
#[derive(Debug, Clone, Default)]
pub struct StateRegistry {
    states: Vec<State>,
    by_code: HashMap<String, usize>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: State) -> usize {
        if let Some(&index) = self.by_code.get(&state.code) {
            self.states[index] = state;
            return index;
        }
        let index = self.states.len();
        self.by_code.insert(state.code.clone(), index);
        self.states.push(state);
        index
    }

    pub fn index_of(&self, code: &str) -> Result<usize, ModelError> {
        self.by_code
            .get(code)
            .copied()
            .ok_or_else(|| ModelError::StateNotFound {
                code: code.to_string(),
            })
    }

    pub fn get(&self, code: &str) -> Result<&State, ModelError> {
        self.index_of(code).map(|index| &self.states[index])
    }

    pub fn by_index(&self, index: usize) -> Option<&State> {
        self.states.get(index)
    }

    /// The user at `id`. Ids are only handed out by this registry's states.
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.states
            .get(id.state)
            .and_then(|state| state.users.get(id.index))
    }

    /// Id of `name` in the state `code`.
    pub fn user_id(&self, code: &str, name: &str) -> Result<UserId, ModelError> {
        let state = self.index_of(code)?;
        let index = self.states[state].user_index_for_name(name)?;
        Ok(UserId { state, index })
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcr_data::Database;

    fn arizona() -> State {
        let db = Database::new().unwrap();
        db.load_annual(
            "\
az.cap.diversion,2020,1500000
az.cap.diversion,2021,1400000
az.cap.cu,2020,1500000
az.cap.cu,2021,1400000
az.yuma_mesa_idd.diversion,2020,250000
az.yuma_mesa_idd.returns,2020,130000
az.yuma_mesa_idd.diversion,2022,260000
",
        )
        .unwrap();
        let module = StateModule::new("az", db);
        let mut state = State::new("Arizona", "az");
        state.user(&module, "cap", true).unwrap();
        state.user(&module, "yuma_mesa_idd", false).unwrap();
        state.user(&module, "no_data", false).unwrap();
        state
    }

    #[test]
    fn test_user_registration_resolves_series() {
        let state = arizona();
        assert_eq!(state.users().len(), 3);
        let cap = state.user_for_name("cap").unwrap();
        assert!(cap.example);
        assert_eq!(cap.cu().unwrap().get(2021), Some(1400000.0));
        assert!(cap.returns().is_none());

        let yuma = state.user_for_name("yuma_mesa_idd").unwrap();
        assert_eq!(yuma.cu().unwrap().get(2020), Some(120000.0));
        assert!(state.user_for_name("no_data").unwrap().cu().is_none());
    }

    #[test]
    fn test_duplicate_registration_returns_same_index() {
        let mut state = arizona();
        let again = state.add_user(User::new("cap", "az", false));
        assert_eq!(again, 0);
        assert_eq!(state.users().len(), 3);
    }

    #[test]
    fn test_user_for_name_missing() {
        let state = arizona();
        assert_eq!(
            state.user_for_name("metropolitan").unwrap_err(),
            ModelError::UserNotFound {
                name: "metropolitan".to_string(),
                state: "az".to_string()
            }
        );
    }

    #[test]
    fn test_totals_use_first_users_years() {
        let state = arizona();
        let diversion = state.total_user_diversion().unwrap();
        assert_eq!(diversion.year_range(), Some((2020, 2021)));
        assert_eq!(diversion.values(), vec![1750000.0, 1400000.0]);

        let returns = state.total_user_returns().unwrap();
        assert_eq!(returns.values(), vec![130000.0]);
    }

    #[test]
    fn test_totals_without_any_series_is_error() {
        let state = State::new("Nevada", "nv");
        assert_eq!(state.total_user_cu(), Err(SeriesError::EmptySeries));
    }

    #[test]
    fn test_registry_user_ids() {
        let mut registry = StateRegistry::new();
        registry.insert(State::new("Nevada", "nv"));
        registry.insert(arizona());
        let id = registry.user_id("az", "yuma_mesa_idd").unwrap();
        assert_eq!(id, UserId { state: 1, index: 1 });
        assert_eq!(registry.user(id).unwrap().name, "yuma_mesa_idd");
        assert!(matches!(
            registry.user_id("mx", "mexico"),
            Err(ModelError::StateNotFound { .. })
        ));
    }
}
