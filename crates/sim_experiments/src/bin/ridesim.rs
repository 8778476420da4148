use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use sim_core::entities::EntityStore;
use sim_core::profiling::EventMetrics;
use sim_core::scenario::ScenarioParams;
use sim_core::telemetry::EventTrace;
use sim_experiments::replication::{DEFAULT_CONFIDENCE, DEFAULT_TARGET_PAID_FRACTION};
use sim_experiments::runner::run_parallel_experiments_with_progress;
use sim_experiments::{
    export_event_log, export_reservations_csv, export_summary_json, export_to_csv,
    export_to_json, export_trace_csv, export_trace_json, extract_metrics, run_replications,
    run_to_completion, ParameterSpace, ReplicationSummary, SimulationResult,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "ridesim",
    about = "Discrete-event ride-sharing simulation on a square street grid"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation and write its event trace
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Directory for the trace, event log and reservation table
        #[arg(long, default_value = "ridesim-out")]
        out_dir: PathBuf,
        /// Print the first N event-log lines
        #[arg(long, default_value_t = 0)]
        print_events: usize,
    },
    /// Run independent seeded replications and summarize the paid fraction
    Replicate {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long, default_value_t = 100)]
        runs: usize,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Grid sweep over driver count, reservation goal and carpool threshold
    Sweep {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long, value_delimiter = ',')]
        driver_counts: Vec<usize>,
        #[arg(long, value_delimiter = ',')]
        reservation_counts: Vec<usize>,
        #[arg(long, value_delimiter = ',')]
        carpool_thresholds: Vec<u32>,
        /// Runs per grid point
        #[arg(long, default_value_t = 1)]
        replications: usize,
        #[command(flatten)]
        batch: BatchArgs,
    },
}

/// Scenario parameters: JSON config first, then flag overrides.
#[derive(Args)]
struct ScenarioArgs {
    /// JSON file with scenario parameters; missing fields take their defaults
    #[arg(long, env = "RIDESIM_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    drivers: Option<usize>,
    #[arg(long)]
    reservations: Option<usize>,
    #[arg(long)]
    carpool_threshold: Option<u32>,
    /// Generation horizon in simulated seconds
    #[arg(long)]
    duration_secs: Option<f64>,
    #[arg(long)]
    grid_size: Option<i32>,
}

impl ScenarioArgs {
    fn load(&self) -> Result<ScenarioParams, Box<dyn Error>> {
        let mut params = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => ScenarioParams::default(),
        };
        if let Some(seed) = self.seed {
            params = params.with_seed(seed);
        }
        if let Some(drivers) = self.drivers {
            params = params.with_drivers(drivers);
        }
        if let Some(reservations) = self.reservations {
            params = params.with_reservations(reservations);
        }
        if let Some(threshold) = self.carpool_threshold {
            params = params.with_carpool_threshold(threshold);
        }
        if let Some(secs) = self.duration_secs {
            params = params.with_total_simulated_time_secs(secs);
        }
        if let Some(grid_size) = self.grid_size {
            params.grid_size = grid_size;
        }
        params.validate()?;
        Ok(params)
    }
}

#[derive(Args)]
struct BatchArgs {
    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long, default_value = "ridesim-out")]
    out_dir: PathBuf,
    #[arg(long)]
    no_progress: bool,
}

// ── Entry point ────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,sim_experiments=info,ridesim=info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Run {
            scenario,
            out_dir,
            print_events,
        } => cmd_run(scenario.load()?, &out_dir, print_events),
        Commands::Replicate {
            scenario,
            runs,
            batch,
        } => cmd_replicate(scenario.load()?, runs, &batch),
        Commands::Sweep {
            scenario,
            driver_counts,
            reservation_counts,
            carpool_thresholds,
            replications,
            batch,
        } => {
            let space = ParameterSpace::grid()
                .with_base(scenario.load()?)
                .num_drivers(driver_counts)
                .num_reservations(reservation_counts)
                .carpool_threshold(carpool_thresholds)
                .replications(replications);
            cmd_sweep(&space, &batch)
        }
    }
}

// ── Commands ───────────────────────────────────────────────────────

fn cmd_run(
    params: ScenarioParams,
    out_dir: &Path,
    print_events: usize,
) -> Result<(), Box<dyn Error>> {
    let world = run_to_completion(params, "run", 0)?;
    let result = extract_metrics(&world).ok_or("simulation world has no entity store")?;
    let trace = world
        .get_resource::<EventTrace>()
        .ok_or("simulation world has no event trace")?;
    let store = world
        .get_resource::<EntityStore>()
        .ok_or("simulation world has no entity store")?;

    fs::create_dir_all(out_dir)?;
    export_trace_csv(trace, out_dir.join("trace.csv"))?;
    export_trace_json(trace, out_dir.join("trace.json"))?;
    export_event_log(trace, out_dir.join("events.txt"))?;
    export_reservations_csv(store, out_dir.join("reservations.csv"))?;
    export_to_json(std::slice::from_ref(&result), out_dir.join("metrics.json"))?;

    for line in trace.to_log_lines().lines().take(print_events) {
        println!("{line}");
    }
    print_result(&result);
    if let Some(metrics) = world.get_resource::<EventMetrics>() {
        metrics.print_summary();
    }
    info!(out_dir = %out_dir.display(), "run exported");
    Ok(())
}

fn cmd_replicate(
    params: ScenarioParams,
    runs: usize,
    batch: &BatchArgs,
) -> Result<(), Box<dyn Error>> {
    let report = run_replications(&params, runs, batch.threads, !batch.no_progress)?;

    fs::create_dir_all(&batch.out_dir)?;
    export_to_csv(
        &report.results,
        &report.parameter_sets,
        batch.out_dir.join("replications.csv"),
    )?;
    if let Some(summary) = &report.summary {
        export_summary_json(summary, batch.out_dir.join("summary.json"))?;
        print_summary("replications", summary);
    }
    info!(out_dir = %batch.out_dir.display(), "replications exported");
    Ok(())
}

fn cmd_sweep(space: &ParameterSpace, batch: &BatchArgs) -> Result<(), Box<dyn Error>> {
    let sets = space.generate();
    info!(
        grid_points = space.combinations(),
        runs = sets.len(),
        "starting sweep"
    );
    let results =
        run_parallel_experiments_with_progress(&sets, batch.threads, !batch.no_progress)?;

    fs::create_dir_all(&batch.out_dir)?;
    export_to_csv(&results, &sets, batch.out_dir.join("sweep.csv"))?;
    export_to_json(&results, batch.out_dir.join("sweep.json"))?;

    let mut by_experiment: BTreeMap<&str, Vec<SimulationResult>> = BTreeMap::new();
    for (set, result) in sets.iter().zip(&results) {
        by_experiment
            .entry(set.experiment_id.as_str())
            .or_default()
            .push(result.clone());
    }
    for (set, _) in sets.iter().zip(&results).filter(|(set, _)| set.run_id == 0) {
        let group = &by_experiment[set.experiment_id.as_str()];
        let Some(summary) = ReplicationSummary::from_results(
            group,
            DEFAULT_TARGET_PAID_FRACTION,
            DEFAULT_CONFIDENCE,
        ) else {
            continue;
        };
        let label = format!(
            "{} (drivers={}, reservations={}, carpool_threshold={})",
            set.experiment_id,
            set.params.num_drivers,
            set.params.num_reservations,
            set.params.carpool_threshold
        );
        print_summary(&label, &summary);
    }
    Ok(())
}

// ── Output ─────────────────────────────────────────────────────────

fn print_result(result: &SimulationResult) {
    println!("\n=== Run Summary ===");
    println!("Reservations: {}", result.total_reservations);
    println!("Drivers: {}", result.total_drivers);
    println!("Completed: {}", result.completed_reservations);
    println!("Unserved: {}", result.unserved_reservations);
    println!(
        "Free rides: {} ({} of {} passengers)",
        result.free_rides, result.free_ride_passengers, result.total_passengers
    );
    println!("Paid fraction: {:.3}", result.paid_fraction);
    println!(
        "Wait (s): avg {:.1}, median {:.1}, p90 {:.1}",
        result.avg_wait_secs, result.median_wait_secs, result.p90_wait_secs
    );
    println!("End time: {:.1}s", result.end_time_secs);
}

fn print_summary(label: &str, summary: &ReplicationSummary) {
    println!(
        "{label}: {} runs, mean paid fraction {:.3} (sd {:.3}), {:.0}% CI [{:.3}, {:.3}], {} runs >= {:.2}",
        summary.runs,
        summary.mean_paid_fraction,
        summary.std_dev,
        summary.confidence * 100.0,
        summary.ci_low,
        summary.ci_high,
        summary.runs_reaching_target,
        summary.target_paid_fraction
    );
}
