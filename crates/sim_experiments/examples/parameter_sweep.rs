//! Example: fleet size vs. carpool threshold sweep.
//!
//! Runs every grid point several times in parallel, exports the raw rows to
//! CSV and prints the mean paid fraction per grid point.

use sim_core::scenario::ScenarioParams;
use sim_experiments::replication::{DEFAULT_CONFIDENCE, DEFAULT_TARGET_PAID_FRACTION};
use sim_experiments::{
    export_to_csv, run_parallel_experiments, ParameterSpace, ReplicationSummary,
};

const REPLICATIONS: usize = 10;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting parameter sweep experiment...");

    let space = ParameterSpace::grid()
        .with_base(ScenarioParams::default().with_seed(7))
        .num_drivers(vec![5, 10, 20, 40])
        .carpool_threshold(vec![0, 3, 6])
        .replications(REPLICATIONS);

    let parameter_sets = space.generate();
    println!(
        "Generated {} runs over {} grid points",
        parameter_sets.len(),
        space.combinations()
    );

    let results = run_parallel_experiments(&parameter_sets, None)?;
    println!("Completed {} simulations", results.len());

    println!("\n=== Paid fraction by grid point ===");
    for (set, group) in parameter_sets
        .chunks(REPLICATIONS)
        .zip(results.chunks(REPLICATIONS))
        .map(|(sets, group)| (&sets[0], group))
    {
        if let Some(summary) = ReplicationSummary::from_results(
            group,
            DEFAULT_TARGET_PAID_FRACTION,
            DEFAULT_CONFIDENCE,
        ) {
            println!(
                "drivers={:3} threshold={} mean={:.3} CI=[{:.3}, {:.3}] reaching target={}/{}",
                set.params.num_drivers,
                set.params.carpool_threshold,
                summary.mean_paid_fraction,
                summary.ci_low,
                summary.ci_high,
                summary.runs_reaching_target,
                summary.runs
            );
        }
    }

    export_to_csv(&results, &parameter_sets, "parameter_sweep_results.csv")?;
    println!("\nResults exported to parameter_sweep_results.csv");

    Ok(())
}
