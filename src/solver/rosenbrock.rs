//! Rosenbrock 2(3) - linearly-implicit, L-stable stepper for stiff problems
//!
//! Three-stage modified Rosenbrock pair with a finite-difference Jacobian and
//! a free 2nd-order continuous extension. One LU decomposition of
//! W = I - h·d·J per attempted step.
//!
//! Reference
//! - L. F. Shampine and M. W. Reichelt, "The MATLAB ODE Suite",
//!   SIAM J. Sci. Comput. 18 (1997), 1-22.

use std::f64::consts::SQRT_2;

use super::driver::{Attempt, Stepper};
use super::error::FailureReason;
use super::linear::LuDecomposition;
use super::solution::IntegrationStats;
use super::{evaluate, OdeSystem, UROUND};

const D: f64 = 1.0 / (2.0 + SQRT_2);
const E32: f64 = 6.0 + SQRT_2;

pub(crate) struct Rosenbrock23 {
    n: usize,
    autonomous: bool,
    f0: Vec<f64>,
    f1: Vec<f64>,
    f2: Vec<f64>,
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    ytmp: Vec<f64>,
    jac: Vec<f64>,
    dfdt: Vec<f64>,
    jac_current: bool,
    lu: Option<(f64, LuDecomposition)>,
    // Dense output of the last accepted step
    y_old: Vec<f64>,
    dense_k1: Vec<f64>,
    dense_k2: Vec<f64>,
    dense_h: f64,
}

impl Rosenbrock23 {
    pub(crate) fn new(n: usize, autonomous: bool) -> Self {
        Self {
            n,
            autonomous,
            f0: vec![0.0; n],
            f1: vec![0.0; n],
            f2: vec![0.0; n],
            k1: vec![0.0; n],
            k2: vec![0.0; n],
            k3: vec![0.0; n],
            ytmp: vec![0.0; n],
            jac: vec![0.0; n * n],
            dfdt: vec![0.0; n],
            jac_current: false,
            lu: None,
            y_old: vec![0.0; n],
            dense_k1: vec![0.0; n],
            dense_k2: vec![0.0; n],
            dense_h: 0.0,
        }
    }

    /// Forward-difference Jacobian (and ∂f/∂t) at (t, y); `f0` must hold f(t, y)
    fn update_jacobian<S: OdeSystem>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64],
        stats: &mut IntegrationStats,
    ) -> Result<(), FailureReason> {
        let n = self.n;
        self.ytmp.copy_from_slice(y);
        for j in 0..n {
            let ysafe = y[j];
            let delt = (UROUND * 1e-5_f64.max(ysafe.abs())).sqrt();
            self.ytmp[j] = ysafe + delt;
            evaluate(system, t, &self.ytmp, &mut self.f1, stats)?;
            for i in 0..n {
                self.jac[i * n + j] = (self.f1[i] - self.f0[i]) / delt;
            }
            self.ytmp[j] = ysafe;
        }

        if self.autonomous {
            self.dfdt.fill(0.0);
        } else {
            let delt = (UROUND * 1e-5_f64.max(t.abs())).sqrt();
            evaluate(system, t + delt, y, &mut self.f1, stats)?;
            for i in 0..n {
                self.dfdt[i] = (self.f1[i] - self.f0[i]) / delt;
            }
        }

        stats.njev += 1;
        self.jac_current = true;
        self.lu = None;
        Ok(())
    }

    /// Factor W = I - h·d·J unless it is already factored for this `h`
    fn factor(&mut self, h: f64, stats: &mut IntegrationStats) -> bool {
        if matches!(&self.lu, Some((h_lu, _)) if *h_lu == h) {
            return true;
        }
        let n = self.n;
        let hd = h * D;
        let mut w = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                w[i * n + j] = -hd * self.jac[i * n + j];
            }
            w[i * n + i] += 1.0;
        }
        stats.ndec += 1;
        match LuDecomposition::factor(w, n) {
            Some(lu) => {
                self.lu = Some((h, lu));
                true
            }
            None => {
                self.lu = None;
                false
            }
        }
    }
}

impl Stepper for Rosenbrock23 {
    fn error_order(&self) -> usize {
        2
    }

    fn default_beta(&self) -> f64 {
        0.0
    }

    fn derivative(&self) -> &[f64] {
        &self.f0
    }

    fn initialize<S: OdeSystem>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64],
        stats: &mut IntegrationStats,
    ) -> Result<(), FailureReason> {
        self.jac_current = false;
        evaluate(system, t, y, &mut self.f0, stats)
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

        // A rejected step retries from the same point and keeps its Jacobian
        if !self.jac_current {
            self.update_jacobian(system, t, y, stats)?;
        }
        if !self.factor(h, stats) {
            return Ok(Attempt::Singular);
        }
        let lu = match &self.lu {
            Some((_, lu)) => lu,
            None => return Ok(Attempt::Singular),
        };
        let hd = h * D;

        // k1 = W⁻¹ (F0 + h·d·∂f/∂t)
        for i in 0..n {
            self.k1[i] = self.f0[i] + hd * self.dfdt[i];
        }
        lu.solve(&mut self.k1);

        // F1 = f(t + h/2, y + h/2·k1)
        for i in 0..n {
            self.ytmp[i] = y[i] + 0.5 * h * self.k1[i];
        }
        evaluate(system, t + 0.5 * h, &self.ytmp, &mut self.f1, stats)?;

        // k2 = W⁻¹ (F1 - k1) + k1
        for i in 0..n {
            self.k2[i] = self.f1[i] - self.k1[i];
        }
        lu.solve(&mut self.k2);
        for i in 0..n {
            self.k2[i] += self.k1[i];
        }

        for i in 0..n {
            y_new[i] = y[i] + h * self.k2[i];
        }
        evaluate(system, t + h, y_new, &mut self.f2, stats)?;

        // k3 = W⁻¹ (F2 - e32·(k2 - F1) - 2·(k1 - F0) + h·d·∂f/∂t)
        for i in 0..n {
            self.k3[i] = self.f2[i]
                - E32 * (self.k2[i] - self.f1[i])
                - 2.0 * (self.k1[i] - self.f0[i])
                + hd * self.dfdt[i];
        }
        lu.solve(&mut self.k3);

        for i in 0..n {
            err[i] = h / 6.0 * (self.k1[i] - 2.0 * self.k2[i] + self.k3[i]);
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
        if modified {
            evaluate(system, t + h, y_new, &mut self.f2, stats)?;
        }

        self.y_old.copy_from_slice(y);
        self.dense_k1.copy_from_slice(&self.k1);
        self.dense_k2.copy_from_slice(&self.k2);
        self.dense_h = h;

        std::mem::swap(&mut self.f0, &mut self.f2);
        self.jac_current = false;
        self.lu = None;
        Ok(())
    }

    fn interpolate(&self, theta: f64, yi: &mut [f64]) {
        let p1 = theta * (1.0 - theta) / (1.0 - 2.0 * D);
        let p2 = theta * (theta - 2.0 * D) / (1.0 - 2.0 * D);
        for i in 0..self.n {
            yi[i] = self.y_old[i] + self.dense_h * (p1 * self.dense_k1[i] + p2 * self.dense_k2[i]);
        }
    }
}
