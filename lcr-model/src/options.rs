//! Scenario configuration: policy toggles and physical loss constants.

use serde::{Deserialize, Serialize};

/// Policy switches for one scenario. All independent, all default off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelOptions {
    /// Zero the Lake Mead evaporation charged to Reach1.
    pub grand_canyon_inflow_cancels_mead_evap: bool,
    /// Leave Havasu evaporation out of Reach3's loss and charge it to the
    /// CAP and Metropolitan diversions afterwards.
    pub havasu_evap_charge_to_havasu_users: bool,
    /// Insert Reach3a ending at Headgate Rock Dam, where CRIT diverts.
    pub crit_in_reach_3a: bool,
    /// Insert Reach3b ending at Palo Verde Dam and split the Reach4 loss.
    pub palo_verde_in_reach_3b: bool,
    /// Append a terminal Reach6 holding the delivery to Mexico.
    pub reach6_for_mexico: bool,
    /// Derive Lake Mead inflow from USGS gauges instead of Powell release.
    pub usgs_lake_mead_inflow: bool,
    /// Prefer RISE release records over report records when loaded.
    pub use_rise_release_data_if_available: bool,
    /// Register Yuma-area users in Reach4 rather than Reach5.
    pub yuma_users_moved_to_reach_4: bool,
}

/// Annual loss figures in acre-feet (SNWA loss study values by default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LossConstants {
    pub lake_mead_evaporation: f64,
    pub lake_mohave_evaporation: f64,
    pub lake_havasu_evaporation: f64,
    pub reach3_corridor: f64,
    pub reach4_corridor: f64,
    pub reach5_corridor: f64,
    /// Share of the Reach4 corridor loss above Palo Verde Dam.
    pub reach4_above_palo_verde_fraction: f64,
}

impl Default for LossConstants {
    fn default() -> Self {
        Self {
            lake_mead_evaporation: 580_000.0,
            lake_mohave_evaporation: 193_000.0,
            lake_havasu_evaporation: 138_000.0,
            reach3_corridor: 191_000.0,
            reach4_corridor: 365_000.0,
            reach5_corridor: 76_000.0,
            reach4_above_palo_verde_fraction: 1.0 / 3.0,
        }
    }
}
