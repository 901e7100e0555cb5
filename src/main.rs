//! Mutualism Sim - Entry point
//!
//! Runs the configured scenario once and exports the trajectory.
//!
//! Usage:
//!   cargo run                         # Reference scenario, or data/parameters/mutualism.json
//!   RUST_LOG=debug cargo run          # With solver statistics

use anyhow::Result;
use mutualism_sim::{
    config::{SimulationConfig, DEFAULT_CONFIG_PATH},
    export::{export_summary_json, export_trajectory_csv, RunSummary},
    Simulation, SimulationError,
};

fn main() -> Result<()> {
    env_logger::init();

    let config = SimulationConfig::load_or_default(DEFAULT_CONFIG_PATH)?;
    let simulation = Simulation::new(config)?;

    println!("=== Mutualism Sim ===\n");
    let d0 = simulation.initial_diagnostics();
    println!("Initial ΔG: {:.3} kJ/mol", d0.gibbs_kJ_per_mol);
    println!("Initial growth rate: {:.4} /hr", d0.growth_rate_per_hr);
    println!(
        "Output times: {} over [{}, {}] hr\n",
        simulation.grid().len(),
        simulation.grid().start(),
        simulation.grid().end()
    );

    match simulation.run() {
        Ok(output) => {
            let csv_path = export_trajectory_csv(&output.trajectory)?;
            let summary = RunSummary::new(simulation.config(), &output.trajectory, output.stats);
            let json_path = export_summary_json(&summary)?;

            if let Some(row) = output.trajectory.last() {
                println!("Final state at t = {} hr:", row.time_hr);
                println!("  N: {:.6e}", row.state.N);
                println!("  C: {:.6} mM", row.state.C);
                println!("  H: {:.6} mM", row.state.H);
                println!("  A: {:.6} mM", row.state.A);
            }
            println!(
                "\nSteps: {} accepted, {} rejected, {} rhs evaluations",
                output.stats.naccpt, output.stats.nrejct, output.stats.nfev
            );
            println!("Trajectory: {}", csv_path.display());
            println!("Summary: {}", json_path.display());
            Ok(())
        }
        Err(SimulationError::Integration {
            reason,
            last_time,
            last_state,
            partial,
        }) => {
            // Keep what was integrated, clearly marked incomplete
            let csv_path = export_trajectory_csv(&partial)?;
            println!("Partial trajectory: {}", csv_path.display());
            Err(SimulationError::Integration {
                reason,
                last_time,
                last_state,
                partial,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}
