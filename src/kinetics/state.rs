//! Four-component state of the culture.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of state variables
pub const STATE_DIM: usize = 4;

/// Population and metabolite concentrations at one instant
///
/// Flat layout for the integrator is `[N, C, H, A]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Population density (cells per unit volume)
    pub N: f64,
    /// CO2-equivalent substrate (mM)
    pub C: f64,
    /// H2-equivalent substrate (mM)
    pub H: f64,
    /// Acetate-equivalent product (mM)
    pub A: f64,
}

impl State {
    pub fn new(N: f64, C: f64, H: f64, A: f64) -> Self {
        Self { N, C, H, A }
    }

    /// Build from an `[N, C, H, A]` slice
    ///
    /// # Panics
    /// If `y` has fewer than four entries.
    #[inline]
    pub fn from_slice(y: &[f64]) -> Self {
        Self {
            N: y[0],
            C: y[1],
            H: y[2],
            A: y[3],
        }
    }

    #[inline]
    pub fn to_array(self) -> [f64; STATE_DIM] {
        [self.N, self.C, self.H, self.A]
    }

    /// Write into an `[N, C, H, A]` slice
    #[inline]
    pub fn write_to(&self, y: &mut [f64]) {
        y[0] = self.N;
        y[1] = self.C;
        y[2] = self.H;
        y[3] = self.A;
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Check the state is a physically meaningful starting point
    ///
    /// Population and substrates must be ≥ 0. Acetate must be strictly
    /// positive because the free-energy term takes its logarithm.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("N", self.N), ("C", self.C), ("H", self.H)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidInitialState {
                    name,
                    value,
                    constraint: "must be finite and >= 0",
                });
            }
        }
        if !(self.A.is_finite() && self.A > 0.0) {
            return Err(ConfigError::InvalidInitialState {
                name: "A",
                value: self.A,
                constraint: "must be finite and > 0",
            });
        }
        Ok(())
    }
}

impl Default for State {
    fn default() -> Self {
        // Single inoculated cell in fresh H2/CO2 medium; acetate held just
        // above zero.
        Self {
            N: 1.0,
            C: 100.0,
            H: 100.0,
            A: 1e-7,
        }
    }
}

impl From<[f64; STATE_DIM]> for State {
    fn from(y: [f64; STATE_DIM]) -> Self {
        Self::from_slice(&y)
    }
}
