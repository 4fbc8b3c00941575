//! Cross-scenario comparison of state and major-user totals.

use crate::run::run_model;
use crate::scenario::{default_scenarios, load_database, load_scenarios, Scenario};
use lcr_data::Database;
use lcr_model::Summary;
use log::info;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub summary: Summary,
}

/// Run every scenario against the same data and year range.
pub fn compare(
    db: &Database,
    scenarios: &[Scenario],
    begin: i32,
    end: i32,
    water_year_month: u32,
) -> anyhow::Result<Vec<ScenarioSummary>> {
    scenarios
        .iter()
        .map(|scenario| -> anyhow::Result<ScenarioSummary> {
            info!("Running scenario {}", scenario.name);
            let model = run_model(db, scenario, begin, end, water_year_month)?;
            Ok(ScenarioSummary {
                name: scenario.name.clone(),
                summary: model.summary()?,
            })
        })
        .collect()
}

/// One row per state and per major user, one column per scenario.
pub struct Comparison<'a>(pub &'a [ScenarioSummary]);

impl fmt::Display for Comparison<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let results = self.0;
        write!(f, "{:<24}", "")?;
        for result in results {
            write!(f, " {:>14}", abbreviate(&result.name, 14))?;
        }
        writeln!(f)?;

        let Some(first) = results.first() else {
            return Ok(());
        };
        for (row, state) in first.summary.states.iter().enumerate() {
            write!(f, "{:<24}", state.code)?;
            for result in results {
                let value = result.summary.states.get(row).map_or(0.0, |s| s.value);
                write!(f, " {:>14.0}", value)?;
            }
            writeln!(f)?;
        }

        let mut users: Vec<(&str, &str)> = Vec::new();
        for result in results {
            for user in &result.summary.major_users {
                let key = (user.state_code.as_str(), user.name.as_str());
                if !users.contains(&key) {
                    users.push(key);
                }
            }
        }
        for (state_code, name) in users {
            write!(f, "{:<24}", format!("{} {}", state_code, name))?;
            for result in results {
                let value = result
                    .summary
                    .major_users
                    .iter()
                    .find(|user| user.state_code == state_code && user.name == name)
                    .map_or(0.0, |user| user.value);
                write!(f, " {:>14.0}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn format_comparison(results: &[ScenarioSummary]) -> String {
    Comparison(results).to_string()
}

fn abbreviate(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}

pub fn run_compare(
    annual_csv: &str,
    daily_csv: Option<&str>,
    scenarios_json: Option<&str>,
    begin: i32,
    end: i32,
    water_year_month: u32,
    json: bool,
) -> anyhow::Result<()> {
    let db = load_database(annual_csv, daily_csv)?;
    let scenarios = match scenarios_json {
        Some(path) => load_scenarios(path)?,
        None => default_scenarios(),
    };
    info!("Comparing {} scenarios for {}..={}", scenarios.len(), begin, end);

    let results = compare(&db, &scenarios, begin, end, water_year_month)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", format_comparison(&results));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lcr_model::ModelOptions;

    fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.load_annual(
            "\
nv.snwa.cu,2020,200000
az.cap.cu,2020,1500000
ca.metropolitan.cu,2020,1000000
mx.mexico.cu,2020,1500000
",
        )
        .unwrap();
        db
    }

    #[test]
    fn test_compare_scenarios() {
        let scenarios = vec![
            Scenario::new("base", ModelOptions::default()),
            Scenario::new(
                "no mead evap",
                ModelOptions {
                    grand_canyon_inflow_cancels_mead_evap: true,
                    ..ModelOptions::default()
                },
            ),
        ];
        let results = compare(&sample_db(), &scenarios, 2020, 2020, 10).unwrap();
        assert_eq!(results.len(), 2);
        let base_nv = results[0].summary.state("nv").unwrap();
        assert_abs_diff_eq!(base_nv, 200_000.0 / 4_200_000.0 * 580_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(results[1].summary.state("nv").unwrap(), 0.0);
    }

    #[test]
    fn test_default_scenarios_all_run() {
        let results = compare(&sample_db(), &default_scenarios(), 2020, 2020, 10).unwrap();
        assert_eq!(results.len(), default_scenarios().len());
    }

    #[test]
    fn test_format_comparison() {
        let scenarios = vec![Scenario::new("base", ModelOptions::default())];
        let results = compare(&sample_db(), &scenarios, 2020, 2020, 10).unwrap();
        let table = format_comparison(&results);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].contains("base"));
        assert!(lines[1].starts_with("nv"));
        assert!(table.contains("az cap"));
        assert!(table.contains("mx mexico"));
    }

    #[test]
    fn test_format_empty_comparison() {
        assert_eq!(format_comparison(&[]).lines().count(), 1);
    }

    #[test]
    fn test_comparison_display_matches_table() {
        let results = compare(&sample_db(), &default_scenarios(), 2020, 2020, 10).unwrap();
        let rendered = format!("{}", Comparison(&results));
        assert_eq!(rendered, format_comparison(&results));
        let width = 24 + 15 * results.len();
        assert!(rendered.lines().all(|line| line.len() == width));
    }
}
