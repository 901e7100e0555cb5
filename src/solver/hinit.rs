//! Compute an initial step size guess

use super::error::FailureReason;
use super::settings::Tolerance;
use super::solution::IntegrationStats;
use super::{evaluate, OdeSystem};

/// Starting step for a method of order `iord` (Hairer, Nørsett & Wanner,
/// Solving ODEs I, section II.4)
///
/// `f0` must hold f(t, y). `f1` and `y1` are scratch buffers.
#[allow(clippy::too_many_arguments)]
pub(crate) fn hinit<S: OdeSystem>(
    system: &S,
    t: f64,
    y: &[f64],
    f0: &[f64],
    f1: &mut [f64],
    y1: &mut [f64],
    iord: usize,
    hmax: f64,
    atol: &Tolerance,
    rtol: &Tolerance,
    stats: &mut IntegrationStats,
) -> Result<f64, FailureReason> {
    let n = y.len();
    let mut dnf = 0.0;
    let mut dny = 0.0;
    for i in 0..n {
        let sk = atol[i] + rtol[i] * y[i].abs();
        dnf += (f0[i] / sk) * (f0[i] / sk);
        dny += (y[i] / sk) * (y[i] / sk);
    }

    let mut h = if dnf <= 1e-10 || dny <= 1e-10 {
        1.0e-6
    } else {
        (dny / dnf).sqrt() * 0.01
    };
    h = h.min(hmax);

    // Explicit Euler step to estimate the second derivative
    for i in 0..n {
        y1[i] = y[i] + h * f0[i];
    }
    evaluate(system, t + h, y1, f1, stats)?;

    let mut der2 = 0.0;
    for i in 0..n {
        let sk = atol[i] + rtol[i] * y[i].abs();
        let df = (f1[i] - f0[i]) / sk;
        der2 += df * df;
    }
    der2 = der2.sqrt() / h;

    let der12 = der2.abs().max(dnf.sqrt());
    let h1 = if der12 <= 1.0e-15 {
        (1.0e-6_f64).max(h * 1.0e-3)
    } else {
        (0.01 / der12).powf(1.0 / iord as f64)
    };

    Ok((100.0 * h).min(h1).min(hmax))
}
