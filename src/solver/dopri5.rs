//! DOPRI5 - Dormand–Prince 5(4) explicit Runge–Kutta stepper
//!
//! First-same-as-last, embedded 4th-order error estimate, 4th-order
//! continuous extension and the Hairer stiffness test.
//!
//! Reference
//! - E. Hairer, S. P. Nørsett, and G. Wanner, "Solving Ordinary Differential
//!   Equations I. Nonstiff Problems", 2nd ed., Springer (1993).

use super::driver::{Attempt, Stepper};
use super::error::FailureReason;
use super::solution::IntegrationStats;
use super::{evaluate, OdeSystem};

pub(crate) struct Dopri5 {
    n: usize,
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    k5: Vec<f64>,
    k6: Vec<f64>,
    k7: Vec<f64>,
    ystage: Vec<f64>,
    ysti: Vec<f64>,
    cont: Vec<f64>,
    // Stiffness detection
    nstiff: usize,
    naccpt: usize,
    iasti: usize,
    nonstiff: usize,
    stiff_reported: bool,
}

impl Dopri5 {
    pub(crate) fn new(n: usize, nstiff: usize) -> Self {
        Self {
            n,
            k1: vec![0.0; n],
            k2: vec![0.0; n],
            k3: vec![0.0; n],
            k4: vec![0.0; n],
            k5: vec![0.0; n],
            k6: vec![0.0; n],
            k7: vec![0.0; n],
            ystage: vec![0.0; n],
            ysti: vec![0.0; n],
            cont: vec![0.0; 5 * n],
            nstiff,
            naccpt: 0,
            iasti: 0,
            nonstiff: 0,
            stiff_reported: false,
        }
    }

    /// Estimate |h·λ| of the dominant eigenvalue from the last two stages
    fn stiffness_test(&mut self, t: f64, h: f64, y_new: &[f64]) {
        let mut stnum = 0.0;
        let mut stden = 0.0;
        for i in 0..self.n {
            let d1 = self.k7[i] - self.k6[i];
            let d2 = y_new[i] - self.ysti[i];
            stnum += d1 * d1;
            stden += d2 * d2;
        }
        let hlamb = if stden > 0.0 {
            h.abs() * (stnum / stden).sqrt()
        } else {
            0.0
        };

        if hlamb > 3.25 {
            self.nonstiff = 0;
            self.iasti += 1;
            if self.iasti == 15 && !self.stiff_reported {
                log::warn!(
                    "Dopri5: problem seems to become stiff at t = {:.6}; consider Rosenbrock23",
                    t
                );
                self.stiff_reported = true;
            }
        } else {
            self.nonstiff += 1;
            if self.nonstiff == 6 {
                self.iasti = 0;
            }
        }
    }
}

impl Stepper for Dopri5 {
    fn error_order(&self) -> usize {
        4
    }

    fn default_beta(&self) -> f64 {
        0.04
    }

    fn derivative(&self) -> &[f64] {
        &self.k1
    }

    fn initialize<S: OdeSystem>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64],
        stats: &mut IntegrationStats,
    ) -> Result<(), FailureReason> {
        evaluate(system, t, y, &mut self.k1, stats)
    }

    fn attempt<S: OdeSystem>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64],
        h: f64,
        y_new: &mut [f64],
        err: &mut [f64],
        stats: &mut IntegrationStats,
    ) -> Result<Attempt, FailureReason> {
        let n = self.n;

        // Stage 2
        for i in 0..n {
            self.ystage[i] = y[i] + h * A21 * self.k1[i];
        }
        evaluate(system, t + C2 * h, &self.ystage, &mut self.k2, stats)?;

        // Stage 3
        for i in 0..n {
            self.ystage[i] = y[i] + h * (A31 * self.k1[i] + A32 * self.k2[i]);
        }
        evaluate(system, t + C3 * h, &self.ystage, &mut self.k3, stats)?;

        // Stage 4
        for i in 0..n {
            self.ystage[i] =
                y[i] + h * (A41 * self.k1[i] + A42 * self.k2[i] + A43 * self.k3[i]);
        }
        evaluate(system, t + C4 * h, &self.ystage, &mut self.k4, stats)?;

        // Stage 5
        for i in 0..n {
            self.ystage[i] = y[i]
                + h * (A51 * self.k1[i] + A52 * self.k2[i] + A53 * self.k3[i] + A54 * self.k4[i]);
        }
        evaluate(system, t + C5 * h, &self.ystage, &mut self.k5, stats)?;

        // Stage 6 (ysti)
        for i in 0..n {
            self.ysti[i] = y[i]
                + h * (A61 * self.k1[i]
                    + A62 * self.k2[i]
                    + A63 * self.k3[i]
                    + A64 * self.k4[i]
                    + A65 * self.k5[i]);
        }
        evaluate(system, t + h, &self.ysti, &mut self.k6, stats)?;

        // 5th-order solution and FSAL stage
        for i in 0..n {
            y_new[i] = y[i]
                + h * (A71 * self.k1[i]
                    + A73 * self.k3[i]
                    + A74 * self.k4[i]
                    + A75 * self.k5[i]
                    + A76 * self.k6[i]);
        }
        evaluate(system, t + h, y_new, &mut self.k7, stats)?;

        for i in 0..n {
            err[i] = h
                * (E1 * self.k1[i]
                    + E3 * self.k3[i]
                    + E4 * self.k4[i]
                    + E5 * self.k5[i]
                    + E6 * self.k6[i]
                    + E7 * self.k7[i]);
        }
        Ok(Attempt::Computed)
    }

    fn accept<S: OdeSystem>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64],
        h: f64,
        y_new: &[f64],
        modified: bool,
        stats: &mut IntegrationStats,
    ) -> Result<(), FailureReason> {
        let n = self.n;

        self.naccpt += 1;
        if self.naccpt % self.nstiff == 0 || self.iasti > 0 {
            self.stiffness_test(t + h, h, y_new);
        }

        if modified {
            evaluate(system, t + h, y_new, &mut self.k7, stats)?;
        }

        // Dense output coefficients
        for i in 0..n {
            let ydiff = y_new[i] - y[i];
            let bspl = h * self.k1[i] - ydiff;
            self.cont[i] = y[i];
            self.cont[n + i] = ydiff;
            self.cont[2 * n + i] = bspl;
            self.cont[3 * n + i] = -h * self.k7[i] + ydiff - bspl;
            self.cont[4 * n + i] = h
                * (D1 * self.k1[i]
                    + D3 * self.k3[i]
                    + D4 * self.k4[i]
                    + D5 * self.k5[i]
                    + D6 * self.k6[i]
                    + D7 * self.k7[i]);
        }

        std::mem::swap(&mut self.k1, &mut self.k7);
        Ok(())
    }

    fn interpolate(&self, theta: f64, yi: &mut [f64]) {
        let n = self.n;
        let cont = &self.cont;
        let theta1 = 1.0 - theta;
        for i in 0..n {
            yi[i] = cont[i]
                + theta
                    * (cont[n + i]
                        + theta1
                            * (cont[2 * n + i]
                                + theta * (cont[3 * n + i] + theta1 * cont[4 * n + i])));
        }
    }
}

// DOPRI5 Butcher tableau coefficients
const C2: f64 = 0.2;
const C3: f64 = 0.3;
const C4: f64 = 0.8;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 0.2;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;
const A71: f64 = 35.0 / 384.0;
const A73: f64 = 500.0 / 1113.0;
const A74: f64 = 125.0 / 192.0;
const A75: f64 = -2187.0 / 6784.0;
const A76: f64 = 11.0 / 84.0;

const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const D1: f64 = -12715105075.0 / 11282082432.0;
const D3: f64 = 87487479700.0 / 32700410799.0;
const D4: f64 = -10690763975.0 / 1880347072.0;
const D5: f64 = 701980252875.0 / 199316789632.0;
const D6: f64 = -1453857185.0 / 822651844.0;
const D7: f64 = 69997945.0 / 29380423.0;
