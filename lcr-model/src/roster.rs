//! Fixed state rosters: which users divert from which reach.

use crate::options::ModelOptions;
use crate::reach::ReachKind;

/// (name, code) of each state, in registration order.
pub const STATES: [(&str, &str); 4] = [
    ("Nevada", "nv"),
    ("Arizona", "az"),
    ("California", "ca"),
    ("Mexico", "mx"),
];

/// One roster line: reach, user name, example flag.
pub type RosterEntry = (ReachKind, &'static str, bool);

const ARIZONA_YUMA_USERS: [(&str, bool); 7] = [
    ("wellton_mohawk", true),
    ("yuma_mesa_idd", false),
    ("north_gila_valley", false),
    ("yuma_county_wua", false),
    ("unit_b", false),
    ("city_of_yuma", false),
    ("cocopah", false),
];

/// Users of state `code` with the reach each is registered against.
/// Unknown codes have an empty roster.
pub fn roster(code: &str, options: &ModelOptions) -> Vec<RosterEntry> {
    let yuma_reach = if options.yuma_users_moved_to_reach_4 {
        ReachKind::Reach4
    } else {
        ReachKind::Reach5
    };
    match code {
        "nv" => vec![
            (ReachKind::Reach1, "snwa", true),
            (ReachKind::Reach1, "basic_management", false),
            (ReachKind::Reach1, "henderson", false),
            (ReachKind::Reach3, "big_bend", false),
        ],
        "az" => {
            let crit_reach = if options.crit_in_reach_3a {
                ReachKind::Reach3a
            } else {
                ReachKind::Reach4
            };
            let mut entries = vec![
                (ReachKind::Reach1, "lake_mead_nra_az", false),
                (ReachKind::Reach3, "bullhead_city", false),
                (ReachKind::Reach3, "mohave_valley_idd", false),
                (ReachKind::Reach3, "fort_mojave_az", false),
                (ReachKind::Reach3, "lake_havasu_city", false),
                (ReachKind::Reach3, "cap", true),
                (crit_reach, "crit", true),
                (ReachKind::Reach4, "ehrenberg", false),
                (ReachKind::Reach4, "cibola_valley_idd", false),
            ];
            entries.extend(
                ARIZONA_YUMA_USERS
                    .iter()
                    .map(|&(name, example)| (yuma_reach, name, example)),
            );
            entries
        }
        "ca" => {
            let palo_verde_reach = if options.palo_verde_in_reach_3b {
                ReachKind::Reach3b
            } else {
                ReachKind::Reach4
            };
            vec![
                (ReachKind::Reach3, "needles", false),
                (ReachKind::Reach3, "metropolitan", true),
                (palo_verde_reach, "palo_verde_id", true),
                (ReachKind::Reach4, "imperial_id", true),
                (ReachKind::Reach4, "coachella_vwd", true),
                (yuma_reach, "bard_unit", false),
            ]
        }
        "mx" => {
            let mexico_reach = if options.reach6_for_mexico {
                ReachKind::Reach6
            } else {
                ReachKind::Reach5
            };
            vec![(mexico_reach, "mexico", true)]
        }
        _ => Vec::new(),
    }
}
