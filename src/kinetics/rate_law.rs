//! Rate law of the thermodynamically-limited growth model.
//!
//! u = uMax · C/(Kc+C) · H/(Kh+H) · F_T(ΔG)
//!
//! dN/dt = u·N
//! dC/dt = -(u·N / Yc) · C/(Kc+C)
//! dH/dt = -(u·N / Yh) · H/(Kh+H)
//! dA/dt = u·N · Fa · 0.5

use serde::{Deserialize, Serialize};

use super::monod::{monod_saturation, monod_saturation_raw};
use super::state::{State, STATE_DIM};
use super::thermodynamics::{gibbs_free_energy, thermodynamic_factor};
use crate::config::ModelParameters;
use crate::solver::OdeSystem;

/// Fixed stoichiometric share of growth-linked turnover that ends up as acetate
pub const ACETATE_PER_TURNOVER: f64 = 0.5;

/// How the rate law treats substrate values the integrator pushed below zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubstratePolicy {
    /// Negative concentrations are read as 0; growth stops once either
    /// substrate is exhausted.
    #[default]
    ZeroFloor,
    /// Raw values enter the formulas. A negative substrate makes the free
    /// energy non-finite, which the integrator reports as a failure.
    Strict,
}

/// Instantaneous quantities behind the growth rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelDiagnostics {
    /// Actual Gibbs free energy (kJ/mol)
    pub gibbs_kJ_per_mol: f64,
    /// Logistic thermodynamic factor
    pub thermodynamic_factor: f64,
    /// CO2 saturation C/(Kc+C)
    pub monod_c: f64,
    /// H2 saturation H/(Kh+H)
    pub monod_h: f64,
    /// Specific growth rate (1/hr)
    pub growth_rate_per_hr: f64,
}

/// The growth model: fixed parameters plus the substrate policy
///
/// Stateless; every method is a pure function of its arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthModel {
    pub params: ModelParameters,
    pub policy: SubstratePolicy,
}

impl GrowthModel {
    pub fn new(params: ModelParameters, policy: SubstratePolicy) -> Self {
        Self { params, policy }
    }

    /// Free energy, saturation factors and growth rate at `state`
    pub fn diagnostics(&self, state: &State) -> ModelDiagnostics {
        let p = &self.params;
        match self.policy {
            SubstratePolicy::ZeroFloor => {
                let c = state.C.max(0.0);
                let h = state.H.max(0.0);
                let a = state.A.max(0.0);
                let monod_c = monod_saturation(p.kc_mM, c);
                let monod_h = monod_saturation(p.kh_mM, h);

                if monod_c == 0.0 || monod_h == 0.0 {
                    // Exhausted substrate: the quotient diverges
                    return ModelDiagnostics {
                        gibbs_kJ_per_mol: f64::INFINITY,
                        thermodynamic_factor: 0.0,
                        monod_c,
                        monod_h,
                        growth_rate_per_hr: 0.0,
                    };
                }

                let gibbs = gibbs_free_energy(p.dG0_kJ_per_mol, p.rt_kJ_per_mol(), a, c, h);
                let factor = thermodynamic_factor(gibbs);
                ModelDiagnostics {
                    gibbs_kJ_per_mol: gibbs,
                    thermodynamic_factor: factor,
                    monod_c,
                    monod_h,
                    growth_rate_per_hr: p.u_max_per_hr * monod_c * monod_h * factor,
                }
            }
            SubstratePolicy::Strict => {
                let monod_c = monod_saturation_raw(p.kc_mM, state.C);
                let monod_h = monod_saturation_raw(p.kh_mM, state.H);
                let gibbs = gibbs_free_energy(
                    p.dG0_kJ_per_mol,
                    p.rt_kJ_per_mol(),
                    state.A,
                    state.C,
                    state.H,
                );
                let factor = thermodynamic_factor(gibbs);
                ModelDiagnostics {
                    gibbs_kJ_per_mol: gibbs,
                    thermodynamic_factor: factor,
                    monod_c,
                    monod_h,
                    growth_rate_per_hr: p.u_max_per_hr * monod_c * monod_h * factor,
                }
            }
        }
    }

    /// Specific growth rate u (1/hr)
    #[inline]
    pub fn growth_rate(&self, state: &State) -> f64 {
        self.diagnostics(state).growth_rate_per_hr
    }

    /// Time derivatives of all four state variables
    pub fn derivatives(&self, state: &State) -> State {
        let d = self.diagnostics(state);
        let growth = d.growth_rate_per_hr * state.N;
        State {
            N: growth,
            C: -(growth / self.params.yield_c) * d.monod_c,
            H: -(growth / self.params.yield_h) * d.monod_h,
            A: growth * self.params.fa * ACETATE_PER_TURNOVER,
        }
    }
}

impl OdeSystem for GrowthModel {
    fn dimension(&self) -> usize {
        STATE_DIM
    }

    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        self.derivatives(&State::from_slice(y)).write_to(dydt);
    }

    fn autonomous(&self) -> bool {
        true
    }
}
