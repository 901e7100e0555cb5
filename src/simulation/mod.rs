//! One simulation run: validated configuration in, sampled trajectory out.
//!
//! Each run is a pure function of its [`SimulationConfig`]; nothing is shared
//! between runs.

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::error::{ConfigError, Result, SimulationError};
use crate::kinetics::{GrowthModel, ModelDiagnostics, State};
use crate::solver::{self, IntegrationError, IntegrationStats, Solution, TimeGrid};

/// One sampled output time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryRow {
    /// Time (hr)
    pub time_hr: f64,
    pub state: State,
}

/// Rows `(time, N, C, H, A)` in increasing time order
///
/// `complete` is false when the run failed before the last requested time;
/// the rows are then everything sampled up to the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub rows: Vec<TrajectoryRow>,
    pub complete: bool,
}

impl Trajectory {
    fn from_solution(solution: &Solution, complete: bool) -> Self {
        let rows = solution
            .iter()
            .map(|(t, y)| TrajectoryRow {
                time_hr: t,
                state: State::from_slice(y),
            })
            .collect();
        Self { rows, complete }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectoryRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&TrajectoryRow> {
        self.rows.last()
    }

    /// Sampled times (hr)
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.time_hr)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryRow> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryRow;
    type IntoIter = std::slice::Iter<'a, TrajectoryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub trajectory: Trajectory,
    pub stats: IntegrationStats,
}

/// A validated run, ready to integrate
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    model: GrowthModel,
    grid: TimeGrid,
}

impl Simulation {
    /// Validate `config` and derive the model and output grid
    ///
    /// Rejects the run before any integration work if a parameter, the
    /// initial state, the time grid or a solver setting is out of range.
    pub fn new(config: SimulationConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.time_grid()?;
        let model = GrowthModel::new(config.parameters, config.substrate_policy);
        Ok(Self {
            config,
            model,
            grid,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn model(&self) -> &GrowthModel {
        &self.model
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Model diagnostics at the initial state
    pub fn initial_diagnostics(&self) -> ModelDiagnostics {
        self.model.diagnostics(&self.config.initial_state)
    }

    /// Integrate once over the whole grid
    pub fn run(&self) -> Result<SimulationOutput> {
        let initial = self.config.initial_state;
        let d0 = self.initial_diagnostics();
        log::info!(
            "Starting run: {} output times over [{}, {}] hr, method {:?}",
            self.grid.len(),
            self.grid.start(),
            self.grid.end(),
            self.config.solver.method
        );
        log::debug!(
            "Initial ΔG = {:.3} kJ/mol, thermodynamic factor = {:.4}, u = {:.4}/hr",
            d0.gibbs_kJ_per_mol,
            d0.thermodynamic_factor,
            d0.growth_rate_per_hr
        );

        match solver::integrate(&self.model, &initial.to_array(), &self.grid, &self.config.solver) {
            Ok(solution) => {
                let trajectory = Trajectory::from_solution(&solution, true);
                if let Some(row) = trajectory.last() {
                    log::info!(
                        "Run finished at t = {} hr: N = {:.4e}, C = {:.4}, H = {:.4}, A = {:.4} mM",
                        row.time_hr,
                        row.state.N,
                        row.state.C,
                        row.state.H,
                        row.state.A
                    );
                }
                Ok(SimulationOutput {
                    trajectory,
                    stats: solution.stats,
                })
            }
            Err(IntegrationError::Config(e)) => Err(e.into()),
            Err(IntegrationError::Failed(failure)) => {
                log::error!(
                    "Run failed at t = {} hr: {}",
                    failure.last_time,
                    failure.reason
                );
                Err(SimulationError::Integration {
                    reason: failure.reason,
                    last_time: failure.last_time,
                    last_state: State::from_slice(&failure.last_state),
                    partial: Trajectory::from_solution(&failure.partial, false),
                })
            }
        }
    }
}

/// Validate `config` and run it once
pub fn simulate(config: SimulationConfig) -> Result<SimulationOutput> {
    Simulation::new(config)?.run()
}
