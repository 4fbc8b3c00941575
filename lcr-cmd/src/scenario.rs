//! Named scenarios: option sets and loss constants read from JSON.

use anyhow::Context;
use lcr_data::Database;
use lcr_model::{LossConstants, ModelOptions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub options: ModelOptions,
    #[serde(default)]
    pub losses: LossConstants,
}

impl Scenario {
    pub fn new(name: &str, options: ModelOptions) -> Self {
        Self {
            name: name.to_string(),
            options,
            losses: LossConstants::default(),
        }
    }
}

pub fn parse_scenarios(json: &str) -> anyhow::Result<Vec<Scenario>> {
    let scenarios: Vec<Scenario> = serde_json::from_str(json)?;
    if scenarios.is_empty() {
        anyhow::bail!("scenario list is empty");
    }
    Ok(scenarios)
}

pub fn load_scenarios(path: &str) -> anyhow::Result<Vec<Scenario>> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    parse_scenarios(&json).with_context(|| format!("parsing scenarios in {}", path))
}

pub fn load_options(path: &str) -> anyhow::Result<ModelOptions> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&json).with_context(|| format!("parsing options in {}", path))
}

pub fn load_losses(path: &str) -> anyhow::Result<LossConstants> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&json).with_context(|| format!("parsing loss constants in {}", path))
}

/// Base case, each policy option on its own, then all of them together.
pub fn default_scenarios() -> Vec<Scenario> {
    let base = ModelOptions::default();
    vec![
        Scenario::new("base", base),
        Scenario::new(
            "grand canyon cancels mead evap",
            ModelOptions {
                grand_canyon_inflow_cancels_mead_evap: true,
                ..base
            },
        ),
        Scenario::new(
            "havasu evap to cap and mwd",
            ModelOptions {
                havasu_evap_charge_to_havasu_users: true,
                ..base
            },
        ),
        Scenario::new(
            "crit in reach 3a",
            ModelOptions {
                crit_in_reach_3a: true,
                ..base
            },
        ),
        Scenario::new(
            "palo verde in reach 3b",
            ModelOptions {
                palo_verde_in_reach_3b: true,
                ..base
            },
        ),
        Scenario::new(
            "yuma users in reach 4",
            ModelOptions {
                yuma_users_moved_to_reach_4: true,
                ..base
            },
        ),
        Scenario::new(
            "all",
            ModelOptions {
                grand_canyon_inflow_cancels_mead_evap: true,
                havasu_evap_charge_to_havasu_users: true,
                crit_in_reach_3a: true,
                palo_verde_in_reach_3b: true,
                reach6_for_mexico: true,
                yuma_users_moved_to_reach_4: true,
                ..base
            },
        ),
    ]
}

/// Load the annual CSV, and the daily CSV when given, into a fresh database.
pub fn load_database(annual_csv: &str, daily_csv: Option<&str>) -> anyhow::Result<Database> {
    let db = Database::new()?;
    let annual = std::fs::read_to_string(annual_csv).with_context(|| format!("reading {}", annual_csv))?;
    db.load_annual(&annual)?;
    if let Some(daily_csv) = daily_csv {
        let daily = std::fs::read_to_string(daily_csv).with_context(|| format!("reading {}", daily_csv))?;
        db.load_daily(&daily)?;
    }
    log::info!("loaded {} series", db.query_keys()?.len());
    Ok(db)
}
