//! Configuration module for loading simulation inputs.
//!
//! A run is fully described by one [`SimulationConfig`]; there is no global
//! or ambient state.

mod parameters;

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use parameters::{ModelParameters, TimeSpan};

use crate::error::ConfigError;
use crate::kinetics::{State, SubstratePolicy};
use crate::solver::{SolverSettings, TimeGrid};

/// Default location of the run configuration used by the binary
pub const DEFAULT_CONFIG_PATH: &str = "data/parameters/mutualism.json";

/// Top-level run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Kinetic and thermodynamic constants
    pub parameters: ModelParameters,
    /// State at `time_span.start_hr`
    pub initial_state: State,
    /// Requested output schedule
    pub time_span: TimeSpan,
    /// Explicit output times; overrides the uniform schedule of `time_span`.
    /// The first time must equal `time_span.start_hr`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_times_hr: Option<Vec<f64>>,
    /// Integrator settings
    #[serde(default)]
    pub solver: SolverSettings,
    /// Handling of negative substrate values inside the rate law
    #[serde(default)]
    pub substrate_policy: SubstratePolicy,
}

impl SimulationConfig {
    /// Load from a JSON file, failing on a missing or malformed file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading simulation config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing simulation config {}", path.display()))?;
        log::info!("Loaded simulation config from {:?}", path);
        Ok(config)
    }

    /// Load from JSON file, or return defaults if there is no file
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("Simulation config file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate every section before any integration work starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parameters.validate()?;
        self.initial_state.validate()?;
        self.solver.validate()?;
        let grid = self.time_grid()?;
        if grid.start() != self.time_span.start_hr {
            return Err(ConfigError::InvalidTimeGrid(format!(
                "first output time {} must equal start_hr {}",
                grid.start(),
                self.time_span.start_hr
            )));
        }
        Ok(())
    }

    /// Requested output times: `output_times_hr` if given, else the uniform
    /// schedule of `time_span`
    pub fn time_grid(&self) -> Result<TimeGrid, ConfigError> {
        match &self.output_times_hr {
            Some(times) => TimeGrid::from_points(times.clone()),
            None => TimeGrid::uniform(
                self.time_span.start_hr,
                self.time_span.output_step_hr,
                self.time_span.end_hr,
            ),
        }
    }
}
