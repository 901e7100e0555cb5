//! Settings for the adaptive integrators

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Integration method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Method {
    /// Linearly-implicit Rosenbrock 2(3), L-stable; for stiff transitions
    #[default]
    Rosenbrock23,
    /// Dormand–Prince 5(4) explicit Runge–Kutta with dense output
    Dopri5,
}

/// Scalar or per-component tolerance
///
/// Deserializes from either a number or an array of numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tolerance {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Tolerance {
    fn values(&self) -> &[f64] {
        match self {
            Tolerance::Scalar(v) => std::slice::from_ref(v),
            Tolerance::Vector(vs) => vs,
        }
    }

    fn fits(&self, n: usize) -> bool {
        match self {
            Tolerance::Scalar(_) => true,
            Tolerance::Vector(vs) => vs.len() == n,
        }
    }
}

impl From<f64> for Tolerance {
    fn from(val: f64) -> Self {
        Tolerance::Scalar(val)
    }
}

impl From<Vec<f64>> for Tolerance {
    fn from(val: Vec<f64>) -> Self {
        Tolerance::Vector(val)
    }
}

impl<const N: usize> From<[f64; N]> for Tolerance {
    fn from(val: [f64; N]) -> Self {
        Tolerance::Vector(val.to_vec())
    }
}

impl Index<usize> for Tolerance {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        match self {
            Tolerance::Scalar(v) => v,
            Tolerance::Vector(vs) => &vs[index],
        }
    }
}

/// Settings for the adaptive integrators
///
/// Defaults: Rosenbrock 2(3), `rtol = 1e-6`, `atol = 1e-10`, non-negative
/// state enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Integration method
    pub method: Method,
    /// Relative tolerance
    pub rtol: Tolerance,
    /// Absolute tolerance
    pub atol: Tolerance,
    /// Initial step size. None uses the Hairer starting-step heuristic.
    pub first_step: Option<f64>,
    /// Maximal step size. None allows a step across the whole span.
    pub max_step: Option<f64>,
    /// Maximum number of step attempts. Default is 100,000.
    pub max_steps: usize,
    /// Consecutive rejected attempts tolerated before giving up. Default is 50.
    pub max_rejections: usize,
    /// Safety factor in step-size prediction. Default is 0.9.
    pub safety_factor: f64,
    /// Lower bound of hnew/hold. Default is 0.2.
    pub scale_min: f64,
    /// Upper bound of hnew/hold. Default is 10.
    pub scale_max: f64,
    /// Lund stabilisation exponent. None picks the method default
    /// (0.04 for Dopri5, 0 for Rosenbrock23).
    pub beta: Option<f64>,
    /// Keep every component ≥ 0
    pub non_negative: bool,
    /// Accepted steps between Dopri5 stiffness tests. Default is 1000.
    pub stiffness_check_interval: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            method: Method::default(),
            rtol: Tolerance::Scalar(1e-6),
            atol: Tolerance::Scalar(1e-10),
            first_step: None,
            max_step: None,
            max_steps: 100_000,
            max_rejections: 50,
            safety_factor: 0.9,
            scale_min: 0.2,
            scale_max: 10.0,
            beta: None,
            non_negative: true,
            stiffness_check_interval: 1000,
        }
    }
}

impl SolverSettings {
    /// Settings for the given method with every other value at its default
    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Range checks independent of the system size
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(name: &'static str, value: f64, constraint: &'static str) -> ConfigError {
            ConfigError::InvalidSolverSetting {
                name,
                value,
                constraint,
            }
        }

        for &v in self.rtol.values() {
            if !(v.is_finite() && v > 0.0) {
                return Err(invalid("rtol", v, "must be finite and > 0"));
            }
        }
        for &v in self.atol.values() {
            if !(v.is_finite() && v > 0.0) {
                return Err(invalid("atol", v, "must be finite and > 0"));
            }
        }
        for (name, step) in [("first_step", self.first_step), ("max_step", self.max_step)] {
            if let Some(h) = step {
                if !(h.is_finite() && h > 0.0) {
                    return Err(invalid(name, h, "must be finite and > 0"));
                }
            }
        }
        if self.max_steps == 0 {
            return Err(invalid("max_steps", 0.0, "must be positive"));
        }
        if self.max_rejections == 0 {
            return Err(invalid("max_rejections", 0.0, "must be positive"));
        }
        if self.safety_factor >= 1.0 || self.safety_factor <= 1e-4 {
            return Err(invalid("safety_factor", self.safety_factor, "must be in (1e-4, 1)"));
        }
        if !(self.scale_min > 0.0 && self.scale_min < 1.0) {
            return Err(invalid("scale_min", self.scale_min, "must be in (0, 1)"));
        }
        if !(self.scale_max > 1.0 && self.scale_max.is_finite()) {
            return Err(invalid("scale_max", self.scale_max, "must be finite and > 1"));
        }
        if let Some(b) = self.beta {
            if !(0.0..=0.2).contains(&b) {
                return Err(invalid("beta", b, "must be in [0, 0.2]"));
            }
        }
        if self.stiffness_check_interval == 0 {
            return Err(invalid("stiffness_check_interval", 0.0, "must be positive"));
        }
        Ok(())
    }

    /// Full validation for a system of dimension `n`
    pub fn validate_for(&self, n: usize) -> Result<(), ConfigError> {
        self.validate()?;
        for (name, tol) in [("rtol", &self.rtol), ("atol", &self.atol)] {
            if !tol.fits(n) {
                return Err(ConfigError::DimensionMismatch {
                    what: name,
                    expected: n,
                    found: tol.values().len(),
                });
            }
        }
        Ok(())
    }
}
