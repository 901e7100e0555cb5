//! Parameter structures for the thermodynamically-limited growth model.
//!
//! Defaults reproduce the reference H2/CO2 acetogen scenario. Units are part of
//! the field names: concentrations in mM, energies in kJ/mol, time in hours.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Kinetic and thermodynamic constants of the growth model
///
/// Read-only for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Standard Gibbs free energy of the overall reaction (kJ/mol)
    /// 4 H2 + 2 CO2 → acetate + 2 H2O at pH 7
    pub dG0_kJ_per_mol: f64,

    /// Maximum specific growth rate (1/hr)
    pub u_max_per_hr: f64,

    /// Gas constant (kJ/(mol·K))
    pub gas_constant_kJ_per_mol_K: f64,

    /// Absolute temperature (K)
    pub temperature_K: f64,

    /// Yield on CO2 (cells per mM consumed)
    pub yield_c: f64,

    /// Yield on H2 (cells per mM consumed)
    pub yield_h: f64,

    /// Half-saturation constant for CO2 (mM)
    pub kc_mM: f64,

    /// Half-saturation constant for H2 (mM)
    pub kh_mM: f64,

    /// Acetate formed per unit of growth-linked turnover (mM per cell)
    pub fa: f64,
}

impl ModelParameters {
    /// Thermal energy R·T (kJ/mol)
    #[inline]
    pub fn rt_kJ_per_mol(&self) -> f64 {
        self.gas_constant_kJ_per_mol_K * self.temperature_K
    }

    /// Check every constant against its physical domain
    ///
    /// All rate, yield and saturation constants must be strictly positive;
    /// the standard free energy only has to be finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dG0_kJ_per_mol.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "dG0_kJ_per_mol",
                value: self.dG0_kJ_per_mol,
                constraint: "must be finite",
            });
        }

        let positive = [
            ("u_max_per_hr", self.u_max_per_hr),
            ("gas_constant_kJ_per_mol_K", self.gas_constant_kJ_per_mol_K),
            ("temperature_K", self.temperature_K),
            ("yield_c", self.yield_c),
            ("yield_h", self.yield_h),
            ("kc_mM", self.kc_mM),
            ("kh_mM", self.kh_mM),
            ("fa", self.fa),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    value,
                    constraint: "must be finite and > 0",
                });
            }
        }
        Ok(())
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            dG0_kJ_per_mol: -95.0,
            u_max_per_hr: 0.5,
            gas_constant_kJ_per_mol_K: 0.008314462618,
            temperature_K: 298.0,

            yield_c: 8.64e6,
            yield_h: 4.24e6,

            kc_mM: 0.0013,
            kh_mM: 0.082,

            fa: 5.48e-6,
        }
    }
}

/// Output schedule of a run (hours)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Initial time
    pub start_hr: f64,
    /// Last requested output time
    pub end_hr: f64,
    /// Spacing of requested output times
    pub output_step_hr: f64,
}

impl Default for TimeSpan {
    fn default() -> Self {
        Self {
            start_hr: 0.0,
            end_hr: 100.0,
            output_step_hr: 1.0,
        }
    }
}
