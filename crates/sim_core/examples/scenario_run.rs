//! Run the default 2h scenario (100 reservations, 20 drivers) and print its KPIs.
//!
//! Run with: cargo run -p sim_core --example scenario_run

use sim_core::entities::EntityStore;
use sim_core::profiling::EventMetrics;
use sim_core::runner::{run_until_empty, simulation_schedule};
use sim_core::scenario::{create_world, FreeRideThresholdSecs, ScenarioParams};
use sim_core::telemetry::{EventTrace, SimMetrics};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const SEED: u64 = 123;

    let mut world = create_world(ScenarioParams::default().with_seed(SEED))?;
    let mut schedule = simulation_schedule();
    let max_steps = 2_000_000;
    let steps = run_until_empty(&mut world, &mut schedule, max_steps);

    let threshold = world.resource::<FreeRideThresholdSecs>().0;
    let metrics = SimMetrics::from_store(world.resource::<EntityStore>(), threshold);
    let trace = world.resource::<EventTrace>();
    let sim_time_secs = trace.last_time().unwrap_or(0.0);

    println!("--- Scenario run (seed {SEED}) ---");
    println!("Steps executed: {steps}");
    println!("Simulation time: {sim_time_secs:.0} s ({:.1} min)", sim_time_secs / 60.0);
    println!(
        "Reservations: {}  completed: {}  unserved: {}",
        metrics.reservations, metrics.completed, metrics.unserved
    );
    println!(
        "Free rides: {} ({} of {} passengers), paid fraction {:.3}",
        metrics.free_rides,
        metrics.free_ride_passengers,
        metrics.total_passengers,
        metrics.paid_fraction
    );
    println!(
        "Wait: avg {:.0} s  median {:.0} s  p90 {:.0} s",
        metrics.wait.avg, metrics.wait.median, metrics.wait.p90
    );

    println!("\nFirst 20 events:");
    for record in trace.records.iter().take(20) {
        println!("  {}", record.describe());
    }

    println!("\nServiced per driver:");
    for history in &metrics.driver_histories {
        println!("  {}: {:?}", history.driver, history.serviced);
    }

    world.resource::<EventMetrics>().print_summary();
    Ok(())
}
