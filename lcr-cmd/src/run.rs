//! Single-scenario run.

use crate::scenario::{load_database, load_losses, load_options, Scenario};
use lcr_data::Database;
use lcr_model::{LossConstants, Model, ModelOptions};
use log::info;

/// Initialize a model for `scenario` over `[begin, end]` and run it once.
pub fn run_model(
    db: &Database,
    scenario: &Scenario,
    begin: i32,
    end: i32,
    water_year_month: u32,
) -> anyhow::Result<Model> {
    let mut model = Model::with_options(&scenario.name, scenario.options, scenario.losses);
    model.initialize(db, begin, end, water_year_month)?;
    model.run(begin, end)?;
    Ok(model)
}

#[allow(clippy::too_many_arguments)]
pub fn run_scenario(
    annual_csv: &str,
    daily_csv: Option<&str>,
    options_json: Option<&str>,
    losses_json: Option<&str>,
    begin: i32,
    end: i32,
    water_year_month: u32,
    json: bool,
) -> anyhow::Result<()> {
    let db = load_database(annual_csv, daily_csv)?;
    let options = match options_json {
        Some(path) => load_options(path)?,
        None => ModelOptions::default(),
    };
    let losses = match losses_json {
        Some(path) => load_losses(path)?,
        None => LossConstants::default(),
    };
    let scenario = Scenario {
        name: "scenario".to_string(),
        options,
        losses,
    };

    info!("Running {} for {}..={}", scenario.name, begin, end);
    let model = run_model(&db, &scenario, begin, end, water_year_month)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&model.summary()?)?);
    } else {
        model.print()?;
    }
    Ok(())
}
