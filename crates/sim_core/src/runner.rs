//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! runs the schedule, then appends the processed event to [EventTrace].

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs};
use tracing::debug;

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::entities::EntityStore;
use crate::profiling::EventMetrics;
use crate::systems::{
    assignment_requested::assignment_requested_system, drop_off::drop_off_system,
    idle_arrival::idle_arrival_system, intersection_arrival::intersection_arrival_system,
    pick_up::pick_up_system, reservation_created::reservation_created_system,
};
use crate::telemetry::{EventTrace, TraceRecord};

fn current_kind(event: Option<Res<CurrentEvent>>) -> Option<EventKind> {
    event.map(|e| e.0.kind())
}

// Condition functions for each event kind
fn is_reservation_created(event: Option<Res<CurrentEvent>>) -> bool {
    current_kind(event) == Some(EventKind::ReservationCreated)
}

fn is_assignment_requested(event: Option<Res<CurrentEvent>>) -> bool {
    current_kind(event) == Some(EventKind::AssignmentRequested)
}

fn is_intersection_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    current_kind(event) == Some(EventKind::IntersectionArrival)
}

fn is_pick_up(event: Option<Res<CurrentEvent>>) -> bool {
    current_kind(event) == Some(EventKind::PickUp)
}

fn is_drop_off(event: Option<Res<CurrentEvent>>) -> bool {
    current_kind(event) == Some(EventKind::DropOff)
}

fn is_idle_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    current_kind(event) == Some(EventKind::IdleArrival)
}

/// Pops the next event, runs the schedule on it and records it. Returns the event.
fn step(world: &mut World, schedule: &mut Schedule) -> Option<Event> {
    let event = world.resource_mut::<SimulationClock>().pop_next()?;
    world.insert_resource(CurrentEvent(event));

    if let Some(mut metrics) = world.get_resource_mut::<EventMetrics>() {
        metrics.record_event(event.kind());
    }

    schedule.run(world);

    let driver_location = event.payload.driver().and_then(|id| {
        world
            .get_resource::<EntityStore>()
            .and_then(|store| store.driver(id))
            .map(|driver| driver.current_location)
    });
    if let Some(mut trace) = world.get_resource_mut::<EventTrace>() {
        let record = TraceRecord::new(trace.len() as u64, &event, driver_location);
        debug!("{}", record.describe());
        trace.push(record);
    }
    Some(event)
}

/// Runs one simulation step: pops the next event, inserts it as [CurrentEvent], then runs the schedule.
/// Returns `true` if an event was processed, `false` if the clock was empty.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    step(world, schedule).is_some()
}

/// Runs one simulation step and invokes `hook` after the event is recorded.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    match step(world, schedule) {
        Some(event) => {
            hook(world, &event);
            true
        }
        None => false,
    }
}

/// Runs simulation steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Runs simulation steps until empty and invokes `hook` after each step.
pub fn run_until_empty_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut hook: F,
) -> usize
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while steps < max_steps && run_next_event_with_hook(world, schedule, &mut hook) {
        steps += 1;
    }
    steps
}

/// Builds the simulation schedule: one handler per event kind, gated on [CurrentEvent].
///
/// The schedule runs on the single-threaded executor; exactly one handler runs per event.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);

    schedule.add_systems((
        reservation_created_system.run_if(is_reservation_created),
        assignment_requested_system.run_if(is_assignment_requested),
        intersection_arrival_system.run_if(is_intersection_arrival),
        pick_up_system.run_if(is_pick_up),
        drop_off_system.run_if(is_drop_off),
        idle_arrival_system.run_if(is_idle_arrival),
    ));

    schedule
}
