//! Future event list: a min-heap of scheduled events keyed by simulation time.
//!
//! Times are simulation seconds (`f64`). Events scheduled for the same instant
//! pop in insertion order, so a run is fully determined by its seed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::entities::{DriverId, ReservationId};

/// Discriminant of [`SimEvent`], used for schedule gating and per-kind counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    ReservationCreated,
    AssignmentRequested,
    IntersectionArrival,
    PickUp,
    DropOff,
    IdleArrival,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::ReservationCreated,
        EventKind::AssignmentRequested,
        EventKind::IntersectionArrival,
        EventKind::PickUp,
        EventKind::DropOff,
        EventKind::IdleArrival,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ReservationCreated => "reservation",
            EventKind::AssignmentRequested => "reservation_assignment",
            EventKind::IntersectionArrival => "intersection_arrival",
            EventKind::PickUp => "pick_up",
            EventKind::DropOff => "drop_off",
            EventKind::IdleArrival => "idle_arrival",
        }
    }
}

/// Event payload. Entities are referenced by id only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    ReservationCreated {
        reservation: ReservationId,
    },
    AssignmentRequested {
        driver: DriverId,
        reservation: ReservationId,
    },
    IntersectionArrival {
        driver: DriverId,
    },
    PickUp {
        driver: DriverId,
        reservation: ReservationId,
    },
    DropOff {
        driver: DriverId,
        reservation: ReservationId,
    },
    IdleArrival {
        driver: DriverId,
    },
}

impl SimEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::ReservationCreated { .. } => EventKind::ReservationCreated,
            SimEvent::AssignmentRequested { .. } => EventKind::AssignmentRequested,
            SimEvent::IntersectionArrival { .. } => EventKind::IntersectionArrival,
            SimEvent::PickUp { .. } => EventKind::PickUp,
            SimEvent::DropOff { .. } => EventKind::DropOff,
            SimEvent::IdleArrival { .. } => EventKind::IdleArrival,
        }
    }

    pub fn driver(&self) -> Option<DriverId> {
        match *self {
            SimEvent::ReservationCreated { .. } => None,
            SimEvent::AssignmentRequested { driver, .. }
            | SimEvent::IntersectionArrival { driver }
            | SimEvent::PickUp { driver, .. }
            | SimEvent::DropOff { driver, .. }
            | SimEvent::IdleArrival { driver } => Some(driver),
        }
    }

    pub fn reservation(&self) -> Option<ReservationId> {
        match *self {
            SimEvent::ReservationCreated { reservation }
            | SimEvent::AssignmentRequested { reservation, .. }
            | SimEvent::PickUp { reservation, .. }
            | SimEvent::DropOff { reservation, .. } => Some(reservation),
            SimEvent::IntersectionArrival { .. } | SimEvent::IdleArrival { .. } => None,
        }
    }
}

/// A scheduled event. `seq` is the insertion sequence number used to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: f64,
    pub seq: u64,
    pub payload: SimEvent,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// Heap entry ordered so that `BinaryHeap` behaves as a min-heap on `(timestamp, seq)`.
#[derive(Debug, Clone, Copy)]
struct Scheduled(Event);

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp.
        other
            .0
            .timestamp
            .total_cmp(&self.0.timestamp)
            .then_with(|| other.0.seq.cmp(&self.0.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

/// The event currently being handled; inserted by the runner before the schedule runs.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: f64,
    next_seq: u64,
    events: BinaryHeap<Scheduled>,
}

impl SimulationClock {
    /// Time of the most recently popped event.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule `payload` at absolute time `timestamp` and return the queued event.
    pub fn schedule_at(&mut self, timestamp: f64, payload: SimEvent) -> Event {
        assert!(timestamp.is_finite(), "event timestamp must be finite");
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let event = Event {
            timestamp,
            seq: self.next_seq,
            payload,
        };
        self.next_seq += 1;
        self.events.push(Scheduled(event));
        event
    }

    /// Schedule `payload` `delay_secs` after the current time.
    pub fn schedule_in(&mut self, delay_secs: f64, payload: SimEvent) -> Event {
        self.schedule_at(self.now + delay_secs, payload)
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let Scheduled(event) = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<f64> {
        self.events.peek().map(|scheduled| scheduled.0.timestamp)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
