//! CSV export of the sampled trajectory.
//!
//! Header `time,N,C,H,A`, one row per output time, suitable for spreadsheet
//! import and for plotting tools.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use super::{timestamped_path, EXPORT_DIR};
use crate::simulation::{Trajectory, TrajectoryRow};

/// One CSV row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryRecord {
    /// Time (hr)
    pub time: f64,
    /// Population density
    #[serde(rename = "N")]
    pub n: f64,
    /// CO2-equivalent substrate (mM)
    #[serde(rename = "C")]
    pub c: f64,
    /// H2-equivalent substrate (mM)
    #[serde(rename = "H")]
    pub h: f64,
    /// Acetate-equivalent product (mM)
    #[serde(rename = "A")]
    pub a: f64,
}

impl From<&TrajectoryRow> for TrajectoryRecord {
    fn from(row: &TrajectoryRow) -> Self {
        Self {
            time: row.time_hr,
            n: row.state.N,
            c: row.state.C,
            h: row.state.H,
            a: row.state.A,
        }
    }
}

/// Write the trajectory as CSV to any writer
pub fn write_trajectory_csv<W: Write>(trajectory: &Trajectory, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in trajectory {
        csv_writer.serialize(TrajectoryRecord::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export the trajectory to `exports/trajectory_YYYYMMDD_HHMMSS.csv`
///
/// Returns the path to the written file. A partial trajectory is written
/// under a `trajectory_partial_` prefix so it cannot be mistaken for a full run.
pub fn export_trajectory_csv(trajectory: &Trajectory) -> Result<PathBuf> {
    let prefix = if trajectory.complete {
        "trajectory"
    } else {
        "trajectory_partial"
    };
    let path = timestamped_path(EXPORT_DIR, prefix, "csv", &Local::now())?;
    let file = std::fs::File::create(&path)?;
    write_trajectory_csv(trajectory, file)?;

    log::info!(
        "CSV export completed: {} ({} rows)",
        path.display(),
        trajectory.len()
    );
    Ok(path)
}
