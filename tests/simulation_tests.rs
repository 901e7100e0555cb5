//! End-to-end tests of the reference H2/CO2 scenario.
//!
//! ΔG° = -95 kJ/mol, uMax = 0.5/hr, T = 298 K, Yc = 8.64e6, Yh = 4.24e6,
//! Kc = 0.0013 mM, Kh = 0.082 mM, Fa = 5.48e-6; N = 1, C = H = 100 mM,
//! A = 1e-7 mM; output every hour from 0 to 100 hr.
//!
//! The culture grows exponentially for about 40 hr, slows as acetate pushes ΔG
//! past the ATP threshold, and ends with N ≈ 4.27e8, C ≈ 50.5 mM, H nearly
//! exhausted and A ≈ 1170 mM.

use mutualism_sim::{
    simulate, FailureReason, Method, SimulationConfig, SimulationError, SolverSettings,
    SubstratePolicy, Trajectory,
};

/// Allowed backwards movement between consecutive rows of a monotone series
fn slack(a: f64, b: f64) -> f64 {
    1e-5 * a.abs().max(b.abs()) + 1e-8
}

fn reference_trajectory() -> Trajectory {
    simulate(SimulationConfig::default())
        .expect("reference scenario should integrate")
        .trajectory
}

#[test]
fn test_reference_scenario_completes_on_grid() {
    let trajectory = reference_trajectory();
    assert!(trajectory.complete);
    assert_eq!(trajectory.len(), 101);
    for (i, t) in trajectory.times().enumerate() {
        assert_eq!(t, i as f64);
    }
}

#[test]
fn test_first_row_equals_initial_state() {
    let config = SimulationConfig::default();
    let trajectory = simulate(config.clone()).unwrap().trajectory;
    let first = trajectory.first().unwrap();
    assert_eq!(first.time_hr, 0.0);
    assert_eq!(first.state, config.initial_state);
}

#[test]
fn test_states_stay_in_physical_domain() {
    for row in &reference_trajectory() {
        let s = row.state;
        assert!(s.is_finite(), "non-finite state at t = {}", row.time_hr);
        assert!(
            s.N >= 0.0 && s.C >= 0.0 && s.H >= 0.0,
            "negative state at t = {}: {:?}",
            row.time_hr,
            s
        );
        assert!(s.A > 0.0, "A must stay positive, got {} at t = {}", s.A, row.time_hr);
    }
}

#[test]
fn test_population_grows_and_substrates_are_consumed() {
    let trajectory = reference_trajectory();
    for pair in trajectory.rows.windows(2) {
        let (a, b) = (pair[0].state, pair[1].state);
        let t = pair[1].time_hr;
        assert!(b.N >= a.N - slack(a.N, b.N), "N decreased at t = {}: {} -> {}", t, a.N, b.N);
        assert!(b.C <= a.C + slack(a.C, b.C), "C increased at t = {}: {} -> {}", t, a.C, b.C);
        assert!(b.H <= a.H + slack(a.H, b.H), "H increased at t = {}: {} -> {}", t, a.H, b.H);
        assert!(b.A >= a.A - slack(a.A, b.A), "A decreased at t = {}: {} -> {}", t, a.A, b.A);
    }
}

#[test]
fn test_reference_end_state() {
    let last = reference_trajectory().last().copied().unwrap();
    let s = last.state;
    assert_eq!(last.time_hr, 100.0);
    assert!(s.N > 4.2e8 && s.N < 4.35e8, "N(100) = {:e}", s.N);
    assert!(s.C > 50.0 && s.C < 51.0, "C(100) = {}", s.C);
    assert!(s.H < 0.05, "H(100) = {}", s.H);
    assert!(s.A > 1160.0 && s.A < 1180.0, "A(100) = {}", s.A);
}

#[test]
fn test_early_growth_is_near_exponential() {
    let trajectory = reference_trajectory();
    // Thermodynamic factor is about 0.97 at the start and falls slowly
    let n10 = trajectory.rows[10].state.N;
    assert!(n10 > 80.0 && n10 < 150.0, "N(10) = {}", n10);
}

#[test]
fn test_methods_agree() {
    let rosenbrock = reference_trajectory();
    let config = SimulationConfig {
        solver: SolverSettings {
            rtol: 1e-8.into(),
            ..SolverSettings::with_method(Method::Dopri5)
        },
        ..Default::default()
    };
    let dopri = simulate(config).unwrap().trajectory;

    assert_eq!(rosenbrock.len(), dopri.len());
    for (r, d) in rosenbrock.iter().zip(dopri.iter()) {
        let (r, d) = (r.state, d.state);
        assert!((r.N - d.N).abs() <= 1e-3 * r.N.max(1.0), "N: {} vs {}", r.N, d.N);
        assert!((r.C - d.C).abs() <= 1e-3 * r.C.max(1.0), "C: {} vs {}", r.C, d.C);
        assert!((r.H - d.H).abs() <= 1e-3 * r.H.max(1.0), "H: {} vs {}", r.H, d.H);
        assert!((r.A - d.A).abs() <= 1e-3 * r.A.max(1.0), "A: {} vs {}", r.A, d.A);
    }
}

#[test]
fn test_identical_inputs_give_identical_tables() {
    let a = reference_trajectory();
    let b = reference_trajectory();
    assert_eq!(a, b);
}

#[test]
fn test_unfavourable_reaction_prevents_growth() {
    let mut config = SimulationConfig::default();
    config.parameters.dG0_kJ_per_mol = 200.0;
    let trajectory = simulate(config).unwrap().trajectory;
    let last = trajectory.last().unwrap().state;
    assert!(last.N < 1.01, "N should stay at the inoculum, got {}", last.N);
    assert!((last.C - 100.0).abs() < 1e-6 && (last.H - 100.0).abs() < 1e-6);
}

#[test]
fn test_invalid_parameters_rejected_before_integration() {
    let mut config = SimulationConfig::default();
    config.parameters.yield_h = 0.0;
    match simulate(config) {
        Err(SimulationError::Config(e)) => assert!(e.to_string().contains("yield_h")),
        other => panic!("expected config error, got {:?}", other.map(|o| o.stats)),
    }

    let mut config = SimulationConfig::default();
    config.initial_state.N = -1.0;
    assert!(matches!(simulate(config), Err(SimulationError::Config(_))));

    let mut config = SimulationConfig::default();
    config.time_span.output_step_hr = 0.0;
    assert!(matches!(simulate(config), Err(SimulationError::Config(_))));

    let mut config = SimulationConfig::default();
    config.output_times_hr = Some(vec![50.0, 60.0]);
    assert!(matches!(simulate(config), Err(SimulationError::Config(_))));
}

#[test]
fn test_failed_run_returns_marked_partial_trajectory() {
    let config = SimulationConfig {
        solver: SolverSettings {
            max_steps: 20,
            ..Default::default()
        },
        substrate_policy: SubstratePolicy::ZeroFloor,
        ..Default::default()
    };
    match simulate(config) {
        Err(SimulationError::Integration {
            reason,
            last_time,
            last_state,
            partial,
        }) => {
            assert_eq!(reason, FailureReason::TooManySteps(20));
            assert!(!partial.complete);
            assert!(partial.len() < 101);
            assert!(last_time < 100.0);
            assert!(last_state.N >= 1.0);
            assert!(partial.times().all(|t| t <= last_time));
        }
        other => panic!("expected integration failure, got {:?}", other.map(|o| o.stats)),
    }
}
