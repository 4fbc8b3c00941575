//! Results of one model run and their read-side rendering.

use crate::reach::{ReachKind, ReachRun};
use crate::state::StateRegistry;
use crate::user::UserId;
use serde::Serialize;
use std::fmt;

/// Lake evaporation charged straight to a named user, outside the
/// proportional reach cascade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LakeEvapCharge {
    pub user: UserId,
    pub state_code: String,
    pub reach_index: usize,
    pub amount: f64,
}

/// Total loss assessed to one active user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAssessment {
    pub id: UserId,
    pub name: String,
    pub state_code: String,
    pub example: bool,
    /// Reach the user diverts from.
    pub reach_index: usize,
    pub cu_avg: f64,
    pub assessment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTotals {
    pub code: String,
    pub name: String,
    pub loss_assessment: f64,
    /// Part of `loss_assessment` carried by users not reported individually.
    pub other_user_assessments: f64,
}

/// Everything a run produced. Built fresh each run; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Apportionment {
    pub model_name: String,
    pub year_begin: i32,
    pub year_end: i32,
    pub reaches: Vec<ReachRun>,
    pub lake_evap_charges: Vec<LakeEvapCharge>,
    pub users: Vec<UserAssessment>,
    pub states: Vec<StateTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTotal {
    pub code: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTotal {
    pub reach_index: usize,
    pub state_code: String,
    pub name: String,
    pub value: f64,
}

/// State totals, example-user totals and per-state "other users" totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub states: Vec<StateTotal>,
    pub major_users: Vec<UserTotal>,
    pub other_users: Vec<StateTotal>,
}

pub type SummaryParts = (
    Vec<(String, f64)>,
    Vec<(usize, String, String, f64)>,
    Vec<(String, f64)>,
);

impl Summary {
    /// Plain tuples: `(code, value)`, `(reach_index, state_code, name, value)`,
    /// `(code, value)`.
    pub fn into_parts(self) -> SummaryParts {
        (
            self.states.into_iter().map(|s| (s.code, s.value)).collect(),
            self.major_users
                .into_iter()
                .map(|u| (u.reach_index, u.state_code, u.name, u.value))
                .collect(),
            self.other_users.into_iter().map(|s| (s.code, s.value)).collect(),
        )
    }

    pub fn state(&self, code: &str) -> Option<f64> {
        self.states.iter().find(|s| s.code == code).map(|s| s.value)
    }
}

impl Apportionment {
    /// Roll per-reach state assessments and lake evaporation charges up to
    /// users and states.
    pub fn new(
        model_name: &str,
        year_begin: i32,
        year_end: i32,
        reaches: Vec<ReachRun>,
        lake_evap_charges: Vec<LakeEvapCharge>,
        states: &StateRegistry,
    ) -> Self {
        let mut users = Vec::new();
        for run in &reaches {
            for active in &run.active_users_in_reach {
                let Some(user) = states.user(active.id) else {
                    continue;
                };
                let cascade: f64 = reaches
                    .iter()
                    .filter(|upstream| upstream.index <= run.index)
                    .map(|upstream| upstream.user_assessment(active))
                    .sum();
                let charged: f64 = lake_evap_charges
                    .iter()
                    .filter(|charge| charge.user == active.id)
                    .map(|charge| charge.amount)
                    .sum();
                users.push(UserAssessment {
                    id: active.id,
                    name: user.name.clone(),
                    state_code: active.state_code.clone(),
                    example: user.example,
                    reach_index: run.index,
                    cu_avg: active.cu_avg,
                    assessment: cascade + charged,
                });
            }
        }

        let states: Vec<StateTotals> = states
            .iter()
            .map(|state| {
                let assessed: f64 = reaches
                    .iter()
                    .filter_map(|run| run.state_assessment.get(&state.code))
                    .map(|assessment| assessment.assessment)
                    .sum();
                let charged: f64 = lake_evap_charges
                    .iter()
                    .filter(|charge| charge.state_code == state.code)
                    .map(|charge| charge.amount)
                    .sum();
                let other_user_assessments: f64 = users
                    .iter()
                    .filter(|user| user.state_code == state.code && !user.example)
                    .map(|user| user.assessment)
                    .sum();
                StateTotals {
                    code: state.code.clone(),
                    name: state.name.clone(),
                    loss_assessment: assessed + charged,
                    other_user_assessments,
                }
            })
            .collect();

        Self {
            model_name: model_name.to_string(),
            year_begin,
            year_end,
            reaches,
            lake_evap_charges,
            users,
            states,
        }
    }

    pub fn reach(&self, kind: ReachKind) -> Option<&ReachRun> {
        self.reaches.iter().find(|run| run.kind == kind)
    }

    pub fn user(&self, state_code: &str, name: &str) -> Option<&UserAssessment> {
        self.users
            .iter()
            .find(|user| user.state_code == state_code && user.name == name)
    }

    pub fn state(&self, code: &str) -> Option<&StateTotals> {
        self.states.iter().find(|state| state.code == code)
    }

    /// Sum of every reach's loss, including lake evaporation added back
    /// for direct charges.
    pub fn total_loss(&self) -> f64 {
        self.reaches.iter().map(|run| run.loss).sum()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            states: self
                .states
                .iter()
                .map(|state| StateTotal {
                    code: state.code.clone(),
                    value: state.loss_assessment,
                })
                .collect(),
            major_users: self
                .users
                .iter()
                .filter(|user| user.example)
                .map(|user| UserTotal {
                    reach_index: user.reach_index,
                    state_code: user.state_code.clone(),
                    name: user.name.clone(),
                    value: user.assessment,
                })
                .collect(),
            other_users: self
                .states
                .iter()
                .map(|state| StateTotal {
                    code: state.code.clone(),
                    value: state.other_user_assessments,
                })
                .collect(),
        }
    }

    /// Text tables of the run.
    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Apportionment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: loss apportionment {}-{}",
            self.model_name, self.year_begin, self.year_end
        )?;
        writeln!(
            f,
            "{:<8} {:>12} {:>12} {:>16}",
            "reach", "loss", "cu avg", "through cu avg"
        )?;
        for run in &self.reaches {
            writeln!(
                f,
                "{:<8} {:>12.0} {:>12.0} {:>16.0}",
                run.name(),
                run.loss,
                run.cu_avg,
                run.through_reach_cu_avg
            )?;
            for (code, assessment) in &run.state_assessment {
                write!(
                    f,
                    "    {:<4} cu avg {:>12.0} {:>6.2}% assessment {:>10.0}",
                    code,
                    assessment.cu_avg,
                    assessment.percentage * 100.0,
                    assessment.assessment
                )?;
                match assessment.lake_evap {
                    Some(lake_evap) => writeln!(f, " lake evap {:>10.0}", lake_evap)?,
                    None => writeln!(f)?,
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "{:<12} {:>12} {:>12}", "state", "assessment", "other users")?;
        for state in &self.states {
            writeln!(
                f,
                "{:<12} {:>12.0} {:>12.0}",
                state.name, state.loss_assessment, state.other_user_assessments
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{:<8} {:<4} {:<20} {:>12} {:>12}", "reach", "st", "user", "cu avg", "assessment")?;
        for user in self.users.iter().filter(|user| user.example) {
            let reach = self
                .reaches
                .get(user.reach_index)
                .map(|run| run.name())
                .unwrap_or("?");
            writeln!(
                f,
                "{:<8} {:<4} {:<20} {:>12.0} {:>12.0}",
                reach, user.state_code, user.name, user.cu_avg, user.assessment
            )?;
        }
        Ok(())
    }
}
