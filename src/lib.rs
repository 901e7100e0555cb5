//! Mutualism Sim - thermodynamically-limited Monod growth simulator
//!
//! Integrates a four-variable model of an H2/CO2 acetogen (population,
//! CO2, H2, acetate) whose dual-substrate Monod growth rate is throttled by
//! the Gibbs free energy of the reaction, and samples the trajectory at a
//! requested output schedule.

// Allow non-snake-case for unit suffixes and state symbols in names
// (N, C, H, A, kJ, mM, K). This follows the project convention of including
// units in names.
#![allow(non_snake_case)]

pub mod config;
pub mod error;
pub mod export;
pub mod kinetics;
pub mod simulation;
pub mod solver;

pub use config::{ModelParameters, SimulationConfig, TimeSpan};
pub use error::{ConfigError, SimulationError};
pub use kinetics::{GrowthModel, ModelDiagnostics, State, SubstratePolicy};
pub use simulation::{simulate, Simulation, SimulationOutput, Trajectory, TrajectoryRow};
pub use solver::{FailureReason, IntegrationStats, Method, SolverSettings, TimeGrid, Tolerance};
