//! JSON summary of a simulation run.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use super::{timestamped_path, EXPORT_DIR};
use crate::config::{ModelParameters, SimulationConfig};
use crate::kinetics::{GrowthModel, ModelDiagnostics, State};
use crate::simulation::Trajectory;
use crate::solver::{IntegrationStats, Method};

/// Run summary export structure
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Export timestamp
    pub exported_at: String,
    /// Crate version that produced the run
    pub version: &'static str,
    /// Model constants used
    pub parameters: ModelParameters,
    /// Integration method used
    pub method: Method,
    /// Solver work counters
    pub stats: IntegrationStats,
    /// False if the run stopped before its last output time
    pub complete: bool,
    /// Number of trajectory rows
    pub rows: usize,
    /// Last sampled time (hr)
    pub final_time_hr: Option<f64>,
    /// State at the last sampled time
    pub final_state: Option<State>,
    /// Rate-law quantities at the last sampled state
    pub final_diagnostics: Option<ModelDiagnostics>,
}

impl RunSummary {
    pub fn new(
        config: &SimulationConfig,
        trajectory: &Trajectory,
        stats: IntegrationStats,
    ) -> Self {
        let last = trajectory.last();
        let model = GrowthModel::new(config.parameters, config.substrate_policy);
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            parameters: config.parameters,
            method: config.solver.method,
            stats,
            complete: trajectory.complete,
            rows: trajectory.len(),
            final_time_hr: last.map(|r| r.time_hr),
            final_state: last.map(|r| r.state),
            final_diagnostics: last.map(|r| model.diagnostics(&r.state)),
        }
    }
}

/// Write the summary as pretty JSON to any writer
pub fn write_summary_json<W: Write>(summary: &RunSummary, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}

/// Export the summary to `exports/summary_YYYYMMDD_HHMMSS.json`
///
/// Returns the path to the saved JSON file.
pub fn export_summary_json(summary: &RunSummary) -> Result<PathBuf> {
    let path = timestamped_path(EXPORT_DIR, "summary", "json", &Local::now())?;
    let file = std::fs::File::create(&path)?;
    write_summary_json(summary, file)?;

    log::info!("JSON summary exported: {}", path.display());
    Ok(path)
}
