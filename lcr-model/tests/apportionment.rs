use approx::assert_abs_diff_eq;
use lcr_data::Database;
use lcr_model::{Model, ModelError, ModelOptions, ReachKind};

const YEAR_BEGIN: i32 = 2016;
const YEAR_END: i32 = 2021;

fn rows(key: &str, value: f64) -> String {
    (YEAR_BEGIN..=YEAR_END)
        .map(|year| format!("{},{},{}\n", key, year, value))
        .collect()
}

fn database(annual: &[(&str, f64)]) -> Database {
    let db = Database::new().unwrap();
    let csv: String = annual.iter().map(|(key, value)| rows(key, *value)).collect();
    db.load_annual(&csv).unwrap();
    db
}

/// Lakes with release records and a handful of users in every reach.
fn basin() -> Database {
    let db = database(&[
        ("powell.release", 8_230_000.0),
        ("mead.side_inflow", 1_000.0),
        ("mead.release", 8_000_000.0),
        ("mohave.release", 7_800_000.0),
        ("havasu.release", 6_200_000.0),
        ("imperial.release", 2_000_000.0),
        ("morelos.release", 1_500_000.0),
        ("nv.snwa.cu", 250_000.0),
        ("nv.henderson.diversion", 30_000.0),
        ("nv.henderson.returns", 10_000.0),
        ("az.cap.cu", 1_500_000.0),
        ("az.crit.cu", 300_000.0),
        ("az.wellton_mohawk.cu", 280_000.0),
        ("az.cocopah.cu", 0.0),
        ("ca.metropolitan.cu", 1_000_000.0),
        ("ca.palo_verde_id.cu", 400_000.0),
        ("ca.imperial_id.cu", 2_500_000.0),
        ("mx.mexico.cu", 1_500_000.0),
    ]);
    let storage: String = (2015..=YEAR_END)
        .map(|year| format!("mead.storage,{}1001,{}\n", year, 10_000_000 - (year - 2015) * 500_000))
        .collect();
    db.load_daily(&storage).unwrap();
    db
}

fn model(name: &str, options: ModelOptions, db: &Database) -> Model {
    let mut model = Model::with_options(name, options, Default::default());
    model.initialize(db, YEAR_BEGIN, YEAR_END, 10).unwrap();
    model
}

fn reach_index(model: &Model, kind: ReachKind) -> usize {
    model
        .reaches()
        .iter()
        .position(|reach| reach.kind == kind)
        .unwrap()
}

#[test]
fn test_two_users_one_state_share_reach_loss() {
    let db = database(&[("nv.snwa.cu", 100.0), ("nv.henderson.cu", 300.0)]);
    let mut model = model("mead evap", ModelOptions::default(), &db);
    let result = model.run(YEAR_BEGIN, YEAR_END).unwrap();

    let reach1 = result.reach(ReachKind::Reach1).unwrap();
    assert_abs_diff_eq!(reach1.state_assessment["nv"].assessment, 580_000.0, epsilon = 1e-6);
    assert_abs_diff_eq!(reach1.state_assessment["nv"].percentage, 1.0);
    assert_abs_diff_eq!(result.user("nv", "snwa").unwrap().assessment, 145_000.0, epsilon = 1e-6);
    assert_abs_diff_eq!(
        result.user("nv", "henderson").unwrap().assessment,
        435_000.0,
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(result.state("nv").unwrap().loss_assessment, 580_000.0, epsilon = 1e-6);
}

#[test]
fn test_havasu_evaporation_split_between_cap_and_metropolitan() {
    let db = database(&[("az.cap.cu", 1_000_000.0), ("ca.metropolitan.cu", 1_000_000.0)]);
    let options = ModelOptions {
        havasu_evap_charge_to_havasu_users: true,
        ..ModelOptions::default()
    };
    let mut charged = model("havasu", options, &db);
    let reach3 = reach_index(&charged, ReachKind::Reach3);
    assert_abs_diff_eq!(charged.reaches()[reach3].loss, 191_000.0);

    let result = charged.run(YEAR_BEGIN, YEAR_END).unwrap();
    assert_eq!(result.lake_evap_charges.len(), 2);
    for charge in &result.lake_evap_charges {
        assert_abs_diff_eq!(charge.amount, 69_000.0, epsilon = 1e-6);
    }
    let reach3_run = &result.reaches[reach3];
    assert_abs_diff_eq!(reach3_run.loss, 329_000.0, epsilon = 1e-6);
    assert_eq!(reach3_run.state_assessment["az"].lake_evap, Some(69_000.0));
    assert_eq!(reach3_run.state_assessment["ca"].lake_evap, Some(69_000.0));

    for code in ["az", "ca"] {
        let cascade: f64 = result
            .reaches
            .iter()
            .filter_map(|run| run.state_assessment.get(code))
            .map(|state| state.assessment)
            .sum();
        let total = result.state(code).unwrap().loss_assessment;
        assert_abs_diff_eq!(total - cascade, 69_000.0, epsilon = 1e-6);
    }

    // with only these two users the direct charge lands where the
    // proportional split would have put it
    let mut base = model("base", ModelOptions::default(), &db);
    let base_az = base.run(YEAR_BEGIN, YEAR_END).unwrap().state("az").unwrap().loss_assessment;
    let charged_az = charged.summary().unwrap().state("az").unwrap();
    assert_abs_diff_eq!(base_az, charged_az, epsilon = 1e-6);
}

#[test]
fn test_havasu_charge_skipped_without_consumptive_use() {
    let db = database(&[("nv.snwa.cu", 100.0)]);
    let options = ModelOptions {
        havasu_evap_charge_to_havasu_users: true,
        ..ModelOptions::default()
    };
    let mut model = model("havasu", options, &db);
    let result = model.run(YEAR_BEGIN, YEAR_END).unwrap();
    assert!(result.lake_evap_charges.is_empty());
    assert_abs_diff_eq!(result.reach(ReachKind::Reach3).unwrap().loss, 191_000.0);
}

#[test]
fn test_intermediate_reaches_redistribute_loss() {
    let db = basin();
    let base = model("base", ModelOptions::default(), &db);
    let base_loss: f64 = base.reaches().iter().map(|reach| reach.loss).sum();

    let crit = model(
        "crit",
        ModelOptions {
            crit_in_reach_3a: true,
            ..ModelOptions::default()
        },
        &db,
    );
    assert_eq!(crit.reaches().len(), base.reaches().len() + 1);
    let crit_loss: f64 = crit.reaches().iter().map(|reach| reach.loss).sum();
    assert_abs_diff_eq!(crit_loss, base_loss, epsilon = 1e-6);

    let palo_verde = model(
        "palo verde",
        ModelOptions {
            palo_verde_in_reach_3b: true,
            ..ModelOptions::default()
        },
        &db,
    );
    assert_eq!(palo_verde.reaches().len(), base.reaches().len() + 1);
    let palo_verde_loss: f64 = palo_verde.reaches().iter().map(|reach| reach.loss).sum();
    assert_abs_diff_eq!(palo_verde_loss, base_loss, epsilon = 1e-6);
    assert_eq!(palo_verde.lakes().len(), base.lakes().len() + 1);
}

#[test]
fn test_repeated_runs_are_identical() {
    let db = basin();
    let mut model = model("base", ModelOptions::default(), &db);
    model.run(YEAR_BEGIN, YEAR_END).unwrap();
    let first = model.summary().unwrap();
    model.run(YEAR_BEGIN, YEAR_END).unwrap();
    assert_eq!(model.summary().unwrap(), first);

    model.run(2018, 2019).unwrap();
    model.run(YEAR_BEGIN, YEAR_END).unwrap();
    assert_eq!(model.summary().unwrap(), first);
}

#[test]
fn test_assessments_partition_losses() {
    let db = basin();
    let mut model = model("base", ModelOptions::default(), &db);
    let result = model.run(YEAR_BEGIN, YEAR_END).unwrap();

    for run in &result.reaches {
        if run.through_reach_cu_avg > 0.0 {
            assert_abs_diff_eq!(run.assessed_total(), run.loss, epsilon = 1e-6);
        }
    }

    // every reach with a loss has users at or below it
    let assessed: f64 = result.states.iter().map(|state| state.loss_assessment).sum();
    assert_abs_diff_eq!(assessed, 1_543_000.0, epsilon = 1e-3);
    assert_abs_diff_eq!(assessed, result.total_loss(), epsilon = 1e-3);

    for state in &result.states {
        let users: f64 = result
            .users
            .iter()
            .filter(|user| user.state_code == state.code)
            .map(|user| user.assessment)
            .sum();
        assert_abs_diff_eq!(users, state.loss_assessment, epsilon = 1e-3);
    }
}

#[test]
fn test_through_reach_accumulates_downstream() {
    let db = basin();
    let mut model = model("base", ModelOptions::default(), &db);
    let result = model.run(YEAR_BEGIN, YEAR_END).unwrap();

    let reach1 = result.reach(ReachKind::Reach1).unwrap();
    let total_cu: f64 = result.reaches.iter().map(|run| run.cu_avg).sum();
    assert_abs_diff_eq!(reach1.through_reach_cu_avg, total_cu, epsilon = 1e-6);
    assert_eq!(
        reach1.active_users_through_reach.keys().collect::<Vec<_>>(),
        vec!["az", "ca", "mx", "nv"]
    );

    let reach5 = result.reach(ReachKind::Reach5).unwrap();
    assert_abs_diff_eq!(reach5.through_reach_cu_avg, 280_000.0 + 1_500_000.0, epsilon = 1e-6);
    assert!(!reach5.state_assessment.contains_key("nv"));
}

#[test]
fn test_inactive_and_derived_users() {
    let db = basin();
    let mut model = model("base", ModelOptions::default(), &db);
    let result = model.run(YEAR_BEGIN, YEAR_END).unwrap();

    assert!(result.user("az", "cocopah").is_none());
    assert!(result.user("az", "yuma_mesa_idd").is_none());
    assert_abs_diff_eq!(result.user("nv", "henderson").unwrap().cu_avg, 20_000.0);
}

#[test]
fn test_every_series_covers_run_years() {
    let db = basin();
    let mut model = model("base", ModelOptions::default(), &db);
    let result = model.run(2017, 2020).unwrap();

    for run in &result.reaches {
        assert_eq!(run.reach_cu.len(), 4);
        if let Some(balance) = &run.balance {
            assert_eq!(balance.reach_inflow.len(), 4);
            assert_eq!(balance.lower_lake_inflow.len(), 4);
            assert_eq!(balance.reach_side_inflows.len(), 4);
            assert_eq!(balance.lower_lake_release.len(), 4);
            assert_eq!(balance.storage_delta.len(), 4);
        }
        for user in &run.active_users_in_reach {
            assert_eq!(user.cu_for_years.years().collect::<Vec<_>>(), vec![2017, 2018, 2019, 2020]);
        }
    }
}

#[test]
fn test_reach_balance_diagnostics() {
    let db = basin();
    let mut model = model("base", ModelOptions::default(), &db);
    let result = model.run(YEAR_BEGIN, YEAR_END).unwrap();

    assert!(result.reach(ReachKind::Reach0).unwrap().balance.is_none());
    let balance = result.reach(ReachKind::Reach1).unwrap().balance.as_ref().unwrap();
    assert_eq!(balance.reach_side_inflows.values(), vec![1_000.0; 6]);
    assert!(!balance.release_is_proxy);
    assert_eq!(balance.storage_delta.values(), vec![-500_000.0; 6]);
}

#[test]
fn test_yuma_users_and_mexico_placement() {
    let db = basin();
    let options = ModelOptions {
        yuma_users_moved_to_reach_4: true,
        reach6_for_mexico: true,
        ..ModelOptions::default()
    };
    let mut model = model("moved", options, &db);
    let reach4 = reach_index(&model, ReachKind::Reach4);
    let reach6 = reach_index(&model, ReachKind::Reach6);
    assert_eq!(reach6, model.reaches().len() - 1);
    let result = model.run(YEAR_BEGIN, YEAR_END).unwrap();

    assert_eq!(result.user("az", "wellton_mohawk").unwrap().reach_index, reach4);
    let mexico = result.user("mx", "mexico").unwrap();
    assert_eq!(mexico.reach_index, reach6);
    assert!(mexico.assessment > 0.0);
    // Reach5 keeps its loss but its only downstream user is Mexico
    let reach5 = result.reach(ReachKind::Reach5).unwrap();
    assert_abs_diff_eq!(reach5.state_assessment["mx"].assessment, 76_000.0, epsilon = 1e-6);
}

#[test]
fn test_models_do_not_share_registries() {
    let db = basin();
    let mut base = model("base", ModelOptions::default(), &db);
    let mut crit = model(
        "crit",
        ModelOptions {
            crit_in_reach_3a: true,
            ..ModelOptions::default()
        },
        &db,
    );
    let base_summary = base.run(YEAR_BEGIN, YEAR_END).unwrap().summary();
    crit.run(YEAR_BEGIN, YEAR_END).unwrap();
    assert_eq!(base.lakes().len() + 1, crit.lakes().len());
    assert_eq!(base.run(YEAR_BEGIN, YEAR_END).unwrap().summary(), base_summary);
}

#[test]
fn test_user_lookup_failure() {
    let db = basin();
    let model = model("base", ModelOptions::default(), &db);
    let arizona = model.states().get("az").unwrap();
    assert!(matches!(
        arizona.user_for_name("metropolitan"),
        Err(ModelError::UserNotFound { .. })
    ));
    assert!(model.states().get("ut").is_err());
}
