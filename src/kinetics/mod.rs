//! Growth kinetics of an H2/CO2 acetogen under thermodynamic control.
//!
//! Classical dual-substrate Monod kinetics are multiplied by a logistic factor
//! of the reaction's actual Gibbs free energy, so growth halts as the
//! accumulating product pushes ΔG towards the energy needed for ATP synthesis.
//!
//! Everything here is pure: no I/O, no caching, no interior mutability.

pub mod monod;
pub mod rate_law;
pub mod state;
pub mod thermodynamics;

pub use monod::{dual_monod, monod_saturation};
pub use rate_law::{GrowthModel, ModelDiagnostics, SubstratePolicy, ACETATE_PER_TURNOVER};
pub use state::{State, STATE_DIM};
pub use thermodynamics::{gibbs_free_energy, thermodynamic_factor};
