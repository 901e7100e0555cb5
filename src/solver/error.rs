//! Integration failures

use thiserror::Error;

use super::solution::{IntegrationStats, Solution};
use crate::error::ConfigError;

/// Why an integration stopped before the end of the time grid
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FailureReason {
    /// Step budget exhausted
    #[error("maximum number of steps ({0}) exceeded")]
    TooManySteps(usize),

    /// Step-size controller could not meet the tolerances
    #[error("tolerances not met after {0} consecutive rejected steps")]
    ToleranceNotMet(usize),

    /// Step size underflowed relative to t
    #[error("step size {h:e} too small at t = {t}")]
    StepSizeTooSmall { t: f64, h: f64 },

    /// Right-hand side returned NaN or infinity
    #[error("non-finite derivative evaluated at t = {0}")]
    NonFiniteDerivative(f64),
}

/// Numerical failure with everything integrated up to it
#[derive(Debug, Clone)]
pub struct IntegrationFailure {
    pub reason: FailureReason,
    /// Last successfully reached time
    pub last_time: f64,
    /// State at `last_time`
    pub last_state: Vec<f64>,
    /// Grid points sampled before the failure; incomplete
    pub partial: Solution,
    pub stats: IntegrationStats,
}

/// Errors returned by [`crate::solver::integrate`]
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Inputs rejected before stepping
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("integration failed at t = {}: {}", .0.last_time, .0.reason)]
    Failed(Box<IntegrationFailure>),
}
