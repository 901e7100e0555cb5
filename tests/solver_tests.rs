//! Validation tests for the adaptive integrators.
//!
//! Reference problems with known solutions:
//! - Exponential decay y' = -y
//! - Harmonic oscillator y'' = -y
//! - Prothero-Robinson y' = -λ(y - cos t) - sin t (stiff, non-autonomous)
//! - Robertson chemical kinetics (stiff; Hairer & Wanner 1996, section IV.1)

use std::cell::Cell;

use mutualism_sim::solver::{
    integrate, FailureReason, IntegrationError, Method, OdeSystem, SolverSettings, TimeGrid,
};
use mutualism_sim::ConfigError;

struct Decay;

impl OdeSystem for Decay {
    fn dimension(&self) -> usize {
        1
    }

    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -y[0];
    }

    fn autonomous(&self) -> bool {
        true
    }
}

struct Oscillator;

impl OdeSystem for Oscillator {
    fn dimension(&self) -> usize {
        2
    }

    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = y[1];
        dydt[1] = -y[0];
    }
}

struct ProtheroRobinson {
    lambda: f64,
}

impl OdeSystem for ProtheroRobinson {
    fn dimension(&self) -> usize {
        1
    }

    fn rhs(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -self.lambda * (y[0] - t.cos()) - t.sin();
    }
}

struct Robertson;

impl OdeSystem for Robertson {
    fn dimension(&self) -> usize {
        3
    }

    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -0.04 * y[0] + 1.0e4 * y[1] * y[2];
        dydt[2] = 3.0e7 * y[1] * y[1];
        dydt[1] = -dydt[0] - dydt[2];
    }

    fn autonomous(&self) -> bool {
        true
    }
}

/// Returns NaN once t passes `t_bad`
struct Poisoned {
    t_bad: f64,
}

impl OdeSystem for Poisoned {
    fn dimension(&self) -> usize {
        1
    }

    fn rhs(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = if t > self.t_bad { f64::NAN } else { -y[0] };
    }
}

/// Derivative flips sign on every evaluation, so no step size passes the
/// error test
struct Chattering {
    calls: Cell<usize>,
}

impl OdeSystem for Chattering {
    fn dimension(&self) -> usize {
        1
    }

    fn rhs(&self, _t: f64, _y: &[f64], dydt: &mut [f64]) {
        let n = self.calls.get();
        self.calls.set(n + 1);
        dydt[0] = if n % 2 == 0 { 1.0e6 } else { -1.0e6 };
    }

    fn autonomous(&self) -> bool {
        true
    }
}

/// Derivative jumps from -f64::MAX to +f64::MAX across y = 1, so the
/// difference Jacobian overflows and W = I - h·d·J cannot be factored
struct Cliff;

impl OdeSystem for Cliff {
    fn dimension(&self) -> usize {
        1
    }

    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = if y[0] > 1.0 { f64::MAX } else { -f64::MAX };
    }

    fn autonomous(&self) -> bool {
        true
    }
}

fn settings(method: Method, rtol: f64, atol: f64) -> SolverSettings {
    SolverSettings {
        method,
        rtol: rtol.into(),
        atol: atol.into(),
        ..SolverSettings::with_method(method)
    }
}

// ============================================================================
// Accuracy
// ============================================================================

#[test]
fn test_exponential_decay_both_methods() {
    let grid = TimeGrid::uniform(0.0, 0.5, 5.0).unwrap();
    for (method, rtol, tol) in [(Method::Rosenbrock23, 1e-7, 1e-4), (Method::Dopri5, 1e-9, 1e-6)] {
        let solution = integrate(&Decay, &[1.0], &grid, &settings(method, rtol, 1e-12)).unwrap();
        assert_eq!(solution.len(), grid.len());
        for (t, y) in solution.iter() {
            let exact = (-t).exp();
            assert!(
                (y[0] - exact).abs() < tol,
                "{:?}: y({}) = {}, expected {}",
                method,
                t,
                y[0],
                exact
            );
        }
    }
}

#[test]
fn test_harmonic_oscillator_both_methods() {
    let grid = TimeGrid::uniform(0.0, 0.25, 2.0 * std::f64::consts::PI).unwrap();
    for (method, rtol, tol) in [(Method::Rosenbrock23, 1e-7, 1e-4), (Method::Dopri5, 1e-9, 1e-6)] {
        let mut s = settings(method, rtol, 1e-12);
        s.non_negative = false;
        let solution = integrate(&Oscillator, &[1.0, 0.0], &grid, &s).unwrap();
        for (t, y) in solution.iter() {
            assert!(
                (y[0] - t.cos()).abs() < tol && (y[1] + t.sin()).abs() < tol,
                "{:?}: state at t = {} is {:?}",
                method,
                t,
                y
            );
        }
    }
}

#[test]
fn test_samples_at_explicit_irregular_times() {
    let times = vec![0.0, 0.01, 0.3, 0.31, 1.7, 4.0];
    let grid = TimeGrid::from_points(times.clone()).unwrap();
    let s = settings(Method::Dopri5, 1e-9, 1e-12);
    let solution = integrate(&Decay, &[2.0], &grid, &s).unwrap();
    assert_eq!(solution.t, times);
    for (t, y) in solution.iter() {
        assert!((y[0] - 2.0 * (-t).exp()).abs() < 1e-6);
    }
}

#[test]
fn test_first_sample_is_initial_state_exactly() {
    let y0 = [0.123456789012345, 9.87654321e-3];
    let grid = TimeGrid::uniform(3.0, 1.0, 6.0).unwrap();
    for method in [Method::Rosenbrock23, Method::Dopri5] {
        let mut s = SolverSettings::with_method(method);
        s.non_negative = false;
        let solution = integrate(&Oscillator, &y0, &grid, &s).unwrap();
        assert_eq!(solution.t[0], 3.0);
        assert_eq!(solution.y[0], y0.to_vec());
        assert_eq!(*solution.t.last().unwrap(), 6.0);
    }
}

// ============================================================================
// Stiff problems
// ============================================================================

#[test]
fn test_rosenbrock_prothero_robinson() {
    let system = ProtheroRobinson { lambda: 1.0e4 };
    let grid = TimeGrid::uniform(0.0, 0.5, 10.0).unwrap();
    let mut s = SolverSettings::default();
    s.non_negative = false;
    let solution = integrate(&system, &[1.0], &grid, &s).unwrap();
    for (t, y) in solution.iter() {
        assert!(
            (y[0] - t.cos()).abs() < 1e-4,
            "y({}) = {}, expected {}",
            t,
            y[0],
            t.cos()
        );
    }
    // An explicit method needs tens of thousands of steps here
    assert!(solution.stats.naccpt < 5000, "{:?}", solution.stats);
}

#[test]
fn test_rosenbrock_robertson() {
    let grid = TimeGrid::from_points(vec![0.0, 0.4, 4.0, 40.0]).unwrap();
    let s = settings(Method::Rosenbrock23, 1e-6, 1e-10);
    let solution = integrate(&Robertson, &[1.0, 0.0, 0.0], &grid, &s).unwrap();

    let y = solution.y.last().unwrap();
    assert!((y[0] - 0.7158271).abs() < 1e-3, "y1(40) = {}", y[0]);
    assert!((y[1] - 9.185535e-6).abs() < 1e-7, "y2(40) = {}", y[1]);
    assert!((y[2] - 0.2841637).abs() < 1e-3, "y3(40) = {}", y[2]);

    for (_, y) in solution.iter() {
        let mass: f64 = y.iter().sum();
        assert!((mass - 1.0).abs() < 1e-6, "mass = {}", mass);
        assert!(y.iter().all(|&v| v >= 0.0));
    }
    assert!(solution.stats.njev > 0 && solution.stats.ndec > 0);
}

// ============================================================================
// Non-negativity
// ============================================================================

#[test]
fn test_loose_tolerance_decay_stays_non_negative() {
    let grid = TimeGrid::uniform(0.0, 1.0, 50.0).unwrap();
    for method in [Method::Rosenbrock23, Method::Dopri5] {
        let solution = integrate(&Decay, &[1.0], &grid, &settings(method, 1e-3, 1e-3)).unwrap();
        assert!(solution.iter().all(|(_, y)| y[0] >= 0.0), "{:?}", method);
    }
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_non_finite_derivative_reported_with_partial_solution() {
    let grid = TimeGrid::uniform(0.0, 0.25, 3.0).unwrap();
    for method in [Method::Rosenbrock23, Method::Dopri5] {
        let system = Poisoned { t_bad: 1.0 };
        let result = integrate(&system, &[1.0], &grid, &SolverSettings::with_method(method));
        match result {
            Err(IntegrationError::Failed(failure)) => {
                assert!(matches!(failure.reason, FailureReason::NonFiniteDerivative(t) if t > 1.0));
                assert!(failure.last_time <= 1.0 + 1e-12);
                assert!(!failure.partial.is_empty());
                assert!(failure.partial.len() < grid.len());
                assert!(failure.partial.t.iter().all(|&t| t <= failure.last_time));
                assert_eq!(failure.partial.y[0], vec![1.0]);
            }
            other => panic!("{:?}: expected failure, got {:?}", method, other),
        }
    }
}

#[test]
fn test_step_budget_exhausted() {
    let grid = TimeGrid::uniform(0.0, 1.0, 100.0).unwrap();
    let s = SolverSettings {
        max_steps: 10,
        max_step: Some(0.1),
        ..Default::default()
    };
    match integrate(&Decay, &[1.0], &grid, &s) {
        Err(IntegrationError::Failed(failure)) => {
            assert_eq!(failure.reason, FailureReason::TooManySteps(10));
            assert_eq!(failure.stats.nstep, 10);
            assert!(failure.last_time <= 1.0 + 1e-12);
        }
        other => panic!("expected TooManySteps, got {:?}", other),
    }
}

#[test]
fn test_tolerance_not_met_after_consecutive_rejections() {
    let grid = TimeGrid::uniform(0.0, 1.0, 5.0).unwrap();
    let system = Chattering {
        calls: Cell::new(0),
    };
    let s = SolverSettings {
        first_step: Some(0.1),
        max_rejections: 3,
        non_negative: false,
        ..SolverSettings::with_method(Method::Dopri5)
    };
    match integrate(&system, &[1.0], &grid, &s) {
        Err(IntegrationError::Failed(failure)) => {
            assert_eq!(failure.reason, FailureReason::ToleranceNotMet(3));
            assert_eq!(failure.stats.nrejct, 4);
            assert_eq!(failure.stats.naccpt, 0);
            assert_eq!(failure.last_time, 0.0);
            assert_eq!(failure.last_state, vec![1.0]);
            assert_eq!(failure.partial.t, vec![0.0]);
            assert_eq!(failure.partial.y, vec![vec![1.0]]);
        }
        other => panic!("expected ToleranceNotMet, got {:?}", other),
    }
}

#[test]
fn test_singular_iteration_matrix_counts_as_rejection() {
    let grid = TimeGrid::uniform(0.0, 1.0, 5.0).unwrap();
    let s = SolverSettings {
        first_step: Some(0.1),
        max_rejections: 3,
        ..SolverSettings::with_method(Method::Rosenbrock23)
    };
    match integrate(&Cliff, &[1.0], &grid, &s) {
        Err(IntegrationError::Failed(failure)) => {
            assert_eq!(failure.reason, FailureReason::ToleranceNotMet(3));
            // One Jacobian, one failed factorisation per shrinking step size
            assert_eq!(failure.stats.njev, 1);
            assert_eq!(failure.stats.ndec, 4);
            assert_eq!(failure.stats.nrejct, 4);
            assert_eq!(failure.last_time, 0.0);
            assert_eq!(failure.last_state, vec![1.0]);
            assert_eq!(failure.partial.len(), 1);
        }
        other => panic!("expected ToleranceNotMet, got {:?}", other),
    }
}

#[test]
fn test_step_size_underflow_at_large_time() {
    let grid = TimeGrid::from_points(vec![1.0e20, 2.0e20]).unwrap();
    for method in [Method::Rosenbrock23, Method::Dopri5] {
        match integrate(&Decay, &[1.0], &grid, &SolverSettings::with_method(method)) {
            Err(IntegrationError::Failed(failure)) => {
                assert!(
                    matches!(
                        failure.reason,
                        FailureReason::StepSizeTooSmall { t, .. } if t == 1.0e20
                    ),
                    "{:?}: {:?}",
                    method,
                    failure.reason
                );
                assert_eq!(failure.last_time, 1.0e20);
                assert_eq!(failure.last_state, vec![1.0]);
                assert_eq!(failure.partial.t, vec![1.0e20]);
                assert_eq!(failure.stats.naccpt, 0);
            }
            other => panic!("{:?}: expected StepSizeTooSmall, got {:?}", method, other),
        }
    }
}

#[test]
fn test_dimension_mismatch_rejected() {
    let grid = TimeGrid::uniform(0.0, 1.0, 2.0).unwrap();
    let result = integrate(&Oscillator, &[1.0], &grid, &SolverSettings::default());
    assert!(matches!(
        result,
        Err(IntegrationError::Config(ConfigError::DimensionMismatch {
            expected: 2,
            found: 1,
            ..
        }))
    ));
}

#[test]
fn test_invalid_settings_rejected() {
    let grid = TimeGrid::uniform(0.0, 1.0, 2.0).unwrap();
    let s = SolverSettings {
        rtol: (-1.0).into(),
        ..Default::default()
    };
    assert!(matches!(
        integrate(&Decay, &[1.0], &grid, &s),
        Err(IntegrationError::Config(ConfigError::InvalidSolverSetting { name: "rtol", .. }))
    ));
}

#[test]
fn test_identical_runs_are_identical() {
    let grid = TimeGrid::uniform(0.0, 0.1, 2.0).unwrap();
    let s = SolverSettings::default();
    let a = integrate(&Robertson, &[1.0, 0.0, 0.0], &grid, &s).unwrap();
    let b = integrate(&Robertson, &[1.0, 0.0, 0.0], &grid, &s).unwrap();
    assert_eq!(a.t, b.t);
    assert_eq!(a.y, b.y);
    assert_eq!(a.stats, b.stats);
}
