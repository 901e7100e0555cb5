//! Export functionality for simulation data.
//!
//! Provides CSV trajectory export and a JSON run summary.

mod csv_export;
mod json_export;

pub use csv_export::{export_trajectory_csv, write_trajectory_csv, TrajectoryRecord};
pub use json_export::{export_summary_json, write_summary_json, RunSummary};

use std::path::PathBuf;

use chrono::{DateTime, Local};

/// Directory timestamped exports are written to
pub const EXPORT_DIR: &str = "exports";

/// `<dir>/<prefix>_YYYYMMDD_HHMMSS.<extension>`, creating `dir` if needed
fn timestamped_path(
    dir: &str,
    prefix: &str,
    extension: &str,
    timestamp: &DateTime<Local>,
) -> std::io::Result<PathBuf> {
    let dir = PathBuf::from(dir);
    std::fs::create_dir_all(&dir)?;
    let filename = format!("{}_{}.{}", prefix, timestamp.format("%Y%m%d_%H%M%S"), extension);
    Ok(dir.join(filename))
}
