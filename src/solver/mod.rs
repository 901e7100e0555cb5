//! Adaptive-step ODE integration with dense output.
//!
//! The driver advances an [`OdeSystem`] with error-controlled steps and samples
//! the solution at exactly the times of a [`TimeGrid`] by interpolating inside
//! accepted steps. Two steppers are available:
//! - Rosenbrock 2(3): L-stable and linearly implicit, for stiff stretches such
//!   as the approach to the energetic threshold (default)
//! - Dormand–Prince 5(4): explicit, higher order, cheaper on smooth stretches
//!
//! References:
//! - Hairer E, Nørsett SP, Wanner G. Solving Ordinary Differential Equations I. Springer; 1993
//! - Hairer E, Wanner G. Solving Ordinary Differential Equations II. Springer; 1996
//! - Shampine LF, Reichelt MW. SIAM J Sci Comput. 1997;18:1-22

mod dopri5;
mod driver;
pub mod error;
pub mod grid;
mod hinit;
mod linear;
mod rosenbrock;
pub mod settings;
pub mod solution;

pub use driver::integrate;
pub use error::{FailureReason, IntegrationError, IntegrationFailure};
pub use grid::TimeGrid;
pub use settings::{Method, SolverSettings, Tolerance};
pub use solution::{IntegrationStats, Solution};

/// Unit roundoff used for step-size underflow and difference quotients
pub const UROUND: f64 = 2.3e-16;

/// First-order system y' = f(t, y)
pub trait OdeSystem {
    /// Number of state components
    fn dimension(&self) -> usize;

    /// Evaluate f(t, y) into `dydt`
    fn rhs(&self, t: f64, y: &[f64], dydt: &mut [f64]);

    /// True if f does not depend on t explicitly
    fn autonomous(&self) -> bool {
        false
    }
}

/// Evaluate the right-hand side, count it and reject non-finite output
pub(crate) fn evaluate<S: OdeSystem>(
    system: &S,
    t: f64,
    y: &[f64],
    dydt: &mut [f64],
    stats: &mut IntegrationStats,
) -> Result<(), FailureReason> {
    system.rhs(t, y, dydt);
    stats.nfev += 1;
    if dydt.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(FailureReason::NonFiniteDerivative(t))
    }
}
