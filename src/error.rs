//! Error types for configuration and simulation runs

use thiserror::Error;

use crate::kinetics::State;
use crate::simulation::Trajectory;
use crate::solver::FailureReason;

/// Input rejected before integration starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Model constant outside its physical domain
    #[error("invalid parameter {name} = {value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// Initial state component outside its physical domain
    #[error("invalid initial state {name} = {value}: {constraint}")]
    InvalidInitialState {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// Malformed output schedule
    #[error("invalid time grid: {0}")]
    InvalidTimeGrid(String),

    /// Integrator setting outside its accepted range
    #[error("invalid solver setting {name} = {value}: {constraint}")]
    InvalidSolverSetting {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// Vector input whose length does not match the system
    #[error("{what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Failure of a complete simulation run
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Configuration validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Numerical failure; `partial` holds every row sampled before it and is
    /// marked incomplete
    #[error("integration failed at t = {last_time} hr: {reason}")]
    Integration {
        reason: FailureReason,
        last_time: f64,
        last_state: State,
        partial: Trajectory,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SimulationError>;
