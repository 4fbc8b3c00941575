//! Lakes and diversion dams: the control points of the river chain.
//!
//! A [`Lake`] holds its derived series, computed once when it is built.
//! How each series is derived is described by a [`LakeSpec`]; a lake whose
//! inflow is the release of the lake above it reads that lake out of the
//! model's [`LakeRegistry`], so lakes must be built upstream to downstream.

use crate::error::ModelError;
use crate::options::ModelOptions;
use lcr_data::Database;
use lcr_series::{add_annuals, AnnualSeries, DailySeries};
use std::collections::HashMap;

pub const POWELL: &str = "powell";
pub const MEAD: &str = "mead";
pub const MOHAVE: &str = "mohave";
pub const HAVASU: &str = "havasu";
pub const ROCK_DAM: &str = "rock_dam";
pub const PALO_VERDE_DAM: &str = "palo_verde_dam";
pub const IMPERIAL: &str = "imperial";
pub const MORELOS: &str = "morelos";

/// USGS gauges whose sum is Lake Mead's measured inflow.
pub const MEAD_INFLOW_GAUGES: [&str; 3] = [
    "usgs.grand_canyon",
    "usgs.virgin_river",
    "usgs.las_vegas_wash",
];

/// Where a lake's inflow comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum InflowSource {
    /// `{lake}.inflow` from the store.
    Data,
    /// Release of an already-built lake, optionally plus `{lake}.side_inflow`.
    UpstreamRelease {
        upstream: String,
        plus_side_inflow: bool,
    },
    /// Sum of gauge series from the store.
    GaugeSum(Vec<String>),
}

/// How to derive one lake's series.
#[derive(Debug, Clone, PartialEq)]
pub struct LakeSpec {
    pub name: String,
    pub inflow: InflowSource,
}

impl LakeSpec {
    fn new(name: &str, inflow: InflowSource) -> Self {
        Self {
            name: name.to_string(),
            inflow,
        }
    }

    fn below(name: &str, upstream: &str) -> Self {
        Self::new(
            name,
            InflowSource::UpstreamRelease {
                upstream: upstream.to_string(),
                plus_side_inflow: false,
            },
        )
    }

    /// The lake chain for a scenario, upstream first.
    pub fn chain(options: &ModelOptions) -> Vec<LakeSpec> {
        let mead_inflow = if options.usgs_lake_mead_inflow {
            InflowSource::GaugeSum(MEAD_INFLOW_GAUGES.iter().map(|g| g.to_string()).collect())
        } else {
            InflowSource::UpstreamRelease {
                upstream: POWELL.to_string(),
                plus_side_inflow: true,
            }
        };
        let mut chain = vec![
            LakeSpec::new(POWELL, InflowSource::Data),
            LakeSpec::new(MEAD, mead_inflow),
            LakeSpec::below(MOHAVE, MEAD),
            LakeSpec::below(HAVASU, MOHAVE),
        ];
        let mut above_imperial = HAVASU;
        if options.crit_in_reach_3a {
            chain.push(LakeSpec::below(ROCK_DAM, above_imperial));
            above_imperial = ROCK_DAM;
        }
        if options.palo_verde_in_reach_3b {
            chain.push(LakeSpec::below(PALO_VERDE_DAM, above_imperial));
            above_imperial = PALO_VERDE_DAM;
        }
        chain.push(LakeSpec::below(IMPERIAL, above_imperial));
        chain.push(LakeSpec::below(MORELOS, IMPERIAL));
        chain
    }
}

/// A reservoir or diversion dam with its series for the initialized years.
#[derive(Debug, Clone)]
pub struct Lake {
    pub name: String,
    inflow: AnnualSeries,
    pub inflow_note: String,
    release: Option<AnnualSeries>,
    pub release_note: String,
    side_inflow: AnnualSeries,
    pub side_inflow_note: String,
    bypass: AnnualSeries,
    pub bypass_note: String,
    storage: Option<DailySeries>,
    pub storage_note: String,
    evaporation: Option<AnnualSeries>,
    pub evaporation_note: String,
    water_year_month: u32,
}

struct Loaded {
    series: Option<AnnualSeries>,
    note: String,
}

fn load(db: &Database, key: &str, water_year_month: u32) -> anyhow::Result<Loaded> {
    let series = db.annual_or_daily(key, water_year_month)?;
    let note = if series.is_some() {
        key.to_string()
    } else {
        format!("{} not loaded", key)
    };
    Ok(Loaded { series, note })
}

impl Lake {
    /// A lake with every series zero and no release, storage or evaporation model.
    pub fn unmodeled(name: &str, water_year_month: u32) -> Self {
        Self {
            name: name.to_string(),
            inflow: AnnualSeries::default(),
            inflow_note: "not modeled".to_string(),
            release: None,
            release_note: "not modeled".to_string(),
            side_inflow: AnnualSeries::default(),
            side_inflow_note: "not modeled".to_string(),
            bypass: AnnualSeries::default(),
            bypass_note: "not modeled".to_string(),
            storage: None,
            storage_note: "not modeled".to_string(),
            evaporation: None,
            evaporation_note: "not modeled".to_string(),
            water_year_month,
        }
    }

    /// Derive every series for `spec` over `[year_begin, year_end]`.
    pub fn build(
        spec: &LakeSpec,
        db: &Database,
        registry: &LakeRegistry,
        options: &ModelOptions,
        year_begin: i32,
        year_end: i32,
        water_year_month: u32,
    ) -> anyhow::Result<Lake> {
        let name = spec.name.as_str();
        let mut lake = Lake::unmodeled(name, water_year_month);
        let window = |series: AnnualSeries| series.reshape_annual_range(year_begin, year_end);

        let side_inflow = load(db, &format!("{}.side_inflow", name), water_year_month)?;
        lake.side_inflow = window(side_inflow.series.unwrap_or_default());
        lake.side_inflow_note = side_inflow.note;

        let bypass = load(db, &format!("{}.bypass", name), water_year_month)?;
        lake.bypass = window(bypass.series.unwrap_or_default());
        lake.bypass_note = bypass.note;

        match &spec.inflow {
            InflowSource::Data => {
                let inflow = load(db, &format!("{}.inflow", name), water_year_month)?;
                lake.inflow = window(inflow.series.unwrap_or_default());
                lake.inflow_note = inflow.note;
            }
            InflowSource::UpstreamRelease {
                upstream,
                plus_side_inflow,
            } => {
                let upstream_lake = registry.get(upstream)?;
                let release = upstream_lake
                    .release(year_begin, year_end)
                    .unwrap_or_else(|| {
                        log::warn!(
                            "{} inflow: {} release not modeled, using {} inflow",
                            name,
                            upstream,
                            upstream
                        );
                        upstream_lake.inflow(year_begin, year_end)
                    });
                if *plus_side_inflow {
                    lake.inflow = &release + &lake.side_inflow;
                    lake.inflow_note = format!("{} release + {}", upstream, lake.side_inflow_note);
                } else {
                    lake.inflow = release;
                    lake.inflow_note = format!("{} release", upstream);
                }
            }
            InflowSource::GaugeSum(gauges) => {
                let mut measured = Vec::with_capacity(gauges.len() + 1);
                measured.push(AnnualSeries::zeros(year_begin, year_end));
                for gauge in gauges {
                    match db.annual_or_daily(gauge, water_year_month)? {
                        Some(series) => measured.push(series),
                        None => log::warn!("{} inflow: gauge {} not loaded", name, gauge),
                    }
                }
                lake.inflow = add_annuals(&measured)?;
                lake.inflow_note = format!("sum of {}", gauges.join(", "));
            }
        }

        let primary_key = format!("{}.release", name);
        let alternate_key = format!("{}.release.rise", name);
        let alternate = if options.use_rise_release_data_if_available {
            db.annual_or_daily(&alternate_key, water_year_month)?
        } else {
            None
        };
        match alternate {
            Some(series) => {
                lake.release = Some(window(series));
                lake.release_note = alternate_key;
            }
            None => {
                let primary = load(db, &primary_key, water_year_month)?;
                lake.release = primary.series.map(window);
                lake.release_note = primary.note;
            }
        }

        let storage_key = format!("{}.storage", name);
        lake.storage = db.query_daily(&storage_key)?;
        lake.storage_note = if lake.storage.is_some() {
            storage_key
        } else {
            format!("{} not loaded", storage_key)
        };

        let evaporation = load(db, &format!("{}.evaporation", name), water_year_month)?;
        lake.evaporation = evaporation.series.map(window);
        lake.evaporation_note = evaporation.note;

        log::debug!(
            "built lake {}: inflow from {}, release from {}",
            lake.name,
            lake.inflow_note,
            lake.release_note
        );
        Ok(lake)
    }

    pub fn with_inflow(mut self, inflow: AnnualSeries, note: &str) -> Self {
        self.inflow = inflow;
        self.inflow_note = note.to_string();
        self
    }

    pub fn with_release(mut self, release: AnnualSeries, note: &str) -> Self {
        self.release = Some(release);
        self.release_note = note.to_string();
        self
    }

    pub fn with_storage(mut self, storage: DailySeries, note: &str) -> Self {
        self.storage = Some(storage);
        self.storage_note = note.to_string();
        self
    }

    pub fn inflow(&self, year_begin: i32, year_end: i32) -> AnnualSeries {
        self.inflow.reshape_annual_range(year_begin, year_end)
    }

    /// `None` when this lake has no release model.
    pub fn release(&self, year_begin: i32, year_end: i32) -> Option<AnnualSeries> {
        self.release
            .as_ref()
            .map(|release| release.reshape_annual_range(year_begin, year_end))
    }

    pub fn side_inflow(&self, year_begin: i32, year_end: i32) -> AnnualSeries {
        self.side_inflow.reshape_annual_range(year_begin, year_end)
    }

    pub fn bypass(&self, year_begin: i32, year_end: i32) -> AnnualSeries {
        self.bypass.reshape_annual_range(year_begin, year_end)
    }

    /// Daily storage readings, when loaded.
    pub fn storage(&self) -> Option<&DailySeries> {
        self.storage.as_ref()
    }

    /// Evaporation, zero when not modeled.
    pub fn evaporation(&self, year_begin: i32, year_end: i32) -> AnnualSeries {
        match &self.evaporation {
            Some(evaporation) => evaporation.reshape_annual_range(year_begin, year_end),
            None => AnnualSeries::zeros(year_begin, year_end),
        }
    }

    /// Water-year storage change; zero for every year when storage is not loaded.
    pub fn storage_delta(&self, year_begin: i32, year_end: i32) -> AnnualSeries {
        let storage = match &self.storage {
            Some(storage) => storage,
            None => {
                log::warn!("{} storage delta: storage not modeled", self.name);
                return AnnualSeries::zeros(year_begin, year_end);
            }
        };
        match storage.storage_delta(year_begin, year_end, self.water_year_month) {
            Ok(delta) => delta,
            Err(e) => {
                log::warn!("{} storage delta failed: {}", self.name, e);
                AnnualSeries::zeros(year_begin, year_end)
            }
        }
    }
}

/// Lakes of one model, looked up by name, kept in construction order.
#[derive(Debug, Clone, Default)]
pub struct LakeRegistry {
    lakes: Vec<Lake>,
    by_name: HashMap<String, usize>,
}

impl LakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lake, returning its index. A repeated name replaces the old entry.
    pub fn insert(&mut self, lake: Lake) -> usize {
        if let Some(&index) = self.by_name.get(&lake.name) {
            self.lakes[index] = lake;
            return index;
        }
        let index = self.lakes.len();
        self.by_name.insert(lake.name.clone(), index);
        self.lakes.push(lake);
        index
    }

    pub fn index_of(&self, name: &str) -> Result<usize, ModelError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::LakeNotFound {
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Result<&Lake, ModelError> {
        self.index_of(name).map(|index| &self.lakes[index])
    }

    pub fn by_index(&self, index: usize) -> Option<&Lake> {
        self.lakes.get(index)
    }

    pub fn len(&self) -> usize {
        self.lakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lakes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lake> {
        self.lakes.iter()
    }
}
