//! Adaptive stepping loop shared by all methods.
//!
//! The driver owns step-size control, rejection bookkeeping, non-negativity
//! and sampling onto the requested grid; a [`Stepper`] only knows how to take
//! one trial step and interpolate inside the last accepted one.

use super::dopri5::Dopri5;
use super::error::{FailureReason, IntegrationError, IntegrationFailure};
use super::grid::TimeGrid;
use super::hinit::hinit;
use super::rosenbrock::Rosenbrock23;
use super::settings::{Method, SolverSettings};
use super::solution::{IntegrationStats, Solution};
use super::{OdeSystem, UROUND};
use crate::error::ConfigError;

/// Result of one trial step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt {
    /// `y_new` and `err` are filled in
    Computed,
    /// Iteration matrix could not be factored for this step size
    Singular,
}

/// One-step method with an embedded error estimate and dense output
pub(crate) trait Stepper {
    /// Order of the embedded error estimate
    fn error_order(&self) -> usize;

    /// Lund stabilisation exponent used when the settings leave it unset
    fn default_beta(&self) -> f64;

    /// f(t, y) at the current accepted point
    fn derivative(&self) -> &[f64];

    fn initialize<S: OdeSystem>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64],
        stats: &mut IntegrationStats,
    ) -> Result<(), FailureReason>;

    /// Trial step of size `h` from (t, y); writes the new state and the local
    /// error estimate
    #[allow(clippy::too_many_arguments)]
    fn attempt<S: OdeSystem>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64],
        h: f64,
        y_new: &mut [f64],
        err: &mut [f64],
        stats: &mut IntegrationStats,
    ) -> Result<Attempt, FailureReason>;

    /// Commit the last trial step. `modified` is set when the driver changed
    /// `y_new` after the attempt.
    #[allow(clippy::too_many_arguments)]
    fn accept<S: OdeSystem>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64],
        h: f64,
        y_new: &[f64],
        modified: bool,
        stats: &mut IntegrationStats,
    ) -> Result<(), FailureReason>;

    /// State at t_old + theta·h inside the last accepted step
    fn interpolate(&self, theta: f64, yi: &mut [f64]);
}

/// PI step-size controller with Lund stabilisation
struct StepController {
    expo1: f64,
    beta: f64,
    safety: f64,
    facc1: f64,
    facc2: f64,
    facold: f64,
}

impl StepController {
    fn new(settings: &SolverSettings, error_order: usize, beta: f64) -> Self {
        Self {
            expo1: 1.0 / (error_order as f64 + 1.0) - beta * 0.75,
            beta,
            safety: settings.safety_factor,
            facc1: 1.0 / settings.scale_min,
            facc2: 1.0 / settings.scale_max,
            facold: 1e-4,
        }
    }

    fn after_accept(&mut self, h: f64, err: f64) -> f64 {
        let fac11 = err.powf(self.expo1);
        let fac = fac11 / self.facold.powf(self.beta);
        let fac = self.facc2.max(self.facc1.min(fac / self.safety));
        self.facold = err.max(1e-4);
        h / fac
    }

    fn after_reject(&self, h: f64, err: f64) -> f64 {
        if !err.is_finite() {
            return h / self.facc1;
        }
        let fac11 = err.powf(self.expo1);
        h / self.facc1.min(fac11 / self.safety)
    }
}

/// Integrate `system` from `y0` at `grid.start()` and sample at every grid point
///
/// The first sample is `y0` itself. On numerical failure the error carries
/// the last accepted time and state plus every sample taken so far.
pub fn integrate<S: OdeSystem>(
    system: &S,
    y0: &[f64],
    grid: &TimeGrid,
    settings: &SolverSettings,
) -> Result<Solution, IntegrationError> {
    let n = system.dimension();
    if y0.len() != n {
        return Err(ConfigError::DimensionMismatch {
            what: "initial state",
            expected: n,
            found: y0.len(),
        }
        .into());
    }
    settings.validate_for(n)?;

    match settings.method {
        Method::Rosenbrock23 => {
            let stepper = Rosenbrock23::new(n, system.autonomous());
            Run::new(system, stepper, y0, grid, settings).execute()
        }
        Method::Dopri5 => {
            let stepper = Dopri5::new(n, settings.stiffness_check_interval);
            Run::new(system, stepper, y0, grid, settings).execute()
        }
    }
}

struct Run<'a, S, M> {
    system: &'a S,
    stepper: M,
    grid: &'a TimeGrid,
    settings: &'a SolverSettings,
    t: f64,
    y: Vec<f64>,
    solution: Solution,
    stats: IntegrationStats,
}

impl<'a, S: OdeSystem, M: Stepper> Run<'a, S, M> {
    fn new(
        system: &'a S,
        stepper: M,
        y0: &[f64],
        grid: &'a TimeGrid,
        settings: &'a SolverSettings,
    ) -> Self {
        let mut solution = Solution::with_capacity(grid.len());
        solution.push(grid.start(), y0.to_vec());
        Self {
            system,
            stepper,
            grid,
            settings,
            t: grid.start(),
            y: y0.to_vec(),
            solution,
            stats: IntegrationStats::default(),
        }
    }

    fn execute(mut self) -> Result<Solution, IntegrationError> {
        match self.advance() {
            Ok(()) => {
                log::debug!(
                    "Integration finished: {} steps ({} accepted, {} rejected), {} rhs evaluations",
                    self.stats.nstep,
                    self.stats.naccpt,
                    self.stats.nrejct,
                    self.stats.nfev
                );
                self.solution.stats = self.stats;
                Ok(self.solution)
            }
            Err(reason) => {
                log::debug!("Integration stopped at t = {}: {}", self.t, reason);
                self.solution.stats = self.stats;
                Err(IntegrationError::Failed(Box::new(IntegrationFailure {
                    reason,
                    last_time: self.t,
                    last_state: self.y,
                    partial: self.solution,
                    stats: self.stats,
                })))
            }
        }
    }

    fn advance(&mut self) -> Result<(), FailureReason> {
        let n = self.y.len();
        let grid = self.grid;
        let times = grid.points();
        let t_end = grid.end();
        let settings = self.settings;

        let h_max = settings.max_step.unwrap_or(t_end - self.t).min(t_end - self.t);
        let beta = settings.beta.unwrap_or_else(|| self.stepper.default_beta());
        let mut controller = StepController::new(settings, self.stepper.error_order(), beta);

        let mut y_new = vec![0.0; n];
        let mut err = vec![0.0; n];
        let mut y_sample = vec![0.0; n];

        self.stepper
            .initialize(self.system, self.t, &self.y, &mut self.stats)?;

        let mut h = match settings.first_step {
            Some(h0) => h0.min(h_max),
            None => {
                let f0 = self.stepper.derivative().to_vec();
                hinit(
                    self.system,
                    self.t,
                    &self.y,
                    &f0,
                    &mut err,
                    &mut y_new,
                    self.stepper.error_order() + 1,
                    h_max,
                    &settings.atol,
                    &settings.rtol,
                    &mut self.stats,
                )?
            }
        };

        let mut next = 1;
        let mut rejections = 0;
        let mut reject = false;

        while next < times.len() {
            if self.stats.nstep >= settings.max_steps {
                return Err(FailureReason::TooManySteps(settings.max_steps));
            }
            if h.is_nan() || h <= 0.0 || 0.1 * h <= self.t.abs() * UROUND {
                return Err(FailureReason::StepSizeTooSmall { t: self.t, h });
            }

            // Land exactly on the final output time
            let mut last = false;
            if self.t + 1.01 * h >= t_end {
                h = t_end - self.t;
                last = true;
            }

            self.stats.nstep += 1;
            let attempt = self.stepper.attempt(
                self.system,
                self.t,
                &self.y,
                h,
                &mut y_new,
                &mut err,
                &mut self.stats,
            )?;
            let err_norm = match attempt {
                Attempt::Computed => self.error_norm(&y_new, &err),
                Attempt::Singular => f64::INFINITY,
            };

            if err_norm <= 1.0 {
                let modified = settings.non_negative && clamp_non_negative(&mut y_new);
                self.stepper.accept(
                    self.system,
                    self.t,
                    &self.y,
                    h,
                    &y_new,
                    modified,
                    &mut self.stats,
                )?;
                self.stats.naccpt += 1;

                let t_new = if last { t_end } else { self.t + h };
                while next < times.len() && times[next] <= t_new {
                    let tg = times[next];
                    if tg == t_new {
                        self.solution.push(tg, y_new.clone());
                    } else {
                        self.stepper.interpolate((tg - self.t) / h, &mut y_sample);
                        if settings.non_negative {
                            clamp_non_negative(&mut y_sample);
                        }
                        self.solution.push(tg, y_sample.clone());
                    }
                    next += 1;
                }

                self.t = t_new;
                self.y.copy_from_slice(&y_new);
                rejections = 0;

                let mut h_new = controller.after_accept(h, err_norm).min(h_max);
                // Prevent oscillations after a rejected step
                if reject {
                    h_new = h_new.min(h);
                    reject = false;
                }
                h = h_new;
            } else {
                self.stats.nrejct += 1;
                rejections += 1;
                if rejections > settings.max_rejections {
                    return Err(FailureReason::ToleranceNotMet(settings.max_rejections));
                }
                h = controller.after_reject(h, err_norm);
                reject = true;
            }
        }
        Ok(())
    }

    /// Scaled RMS norm of the local error
    ///
    /// With `non_negative` set, a component driven below zero counts as an
    /// error of its own size so the step is retried if the overshoot exceeds
    /// the tolerance.
    fn error_norm(&self, y_new: &[f64], err: &[f64]) -> f64 {
        let n = y_new.len();
        let rtol = &self.settings.rtol;
        let atol = &self.settings.atol;
        let mut sum = 0.0;
        let mut overshoot: f64 = 0.0;
        for i in 0..n {
            let sk = atol[i] + rtol[i] * self.y[i].abs().max(y_new[i].abs());
            let e = err[i] / sk;
            sum += e * e;
            if self.settings.non_negative && y_new[i] < 0.0 {
                overshoot = overshoot.max(-y_new[i] / sk);
            }
        }
        (sum / n as f64).sqrt().max(overshoot)
    }
}

/// Replace negative entries by zero; true if anything changed
fn clamp_non_negative(y: &mut [f64]) -> bool {
    let mut changed = false;
    for v in y.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
            changed = true;
        }
    }
    changed
}
