#![allow(dead_code)]

use bevy_ecs::prelude::World;
use sim_core::clock::{SimEvent, SimulationClock};
use sim_core::entities::{DriverId, EntityStore, NewReservation, ReservationId};
use sim_core::spatial::GridPos;

/// Builder for driver fixtures.
#[derive(Clone, Debug)]
pub struct DriverBuilder {
    location: GridPos,
    capacity: u32,
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self {
            location: GridPos::new(0, 0),
            capacity: 4,
        }
    }
}

impl DriverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.location = GridPos::new(x, y);
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn spawn(self, world: &mut World) -> DriverId {
        world
            .resource_mut::<EntityStore>()
            .add_driver(self.location, self.capacity)
    }
}

/// Builder for reservation fixtures. `spawn` also schedules the creation event,
/// as scenario generation does.
#[derive(Clone, Debug)]
pub struct ReservationBuilder {
    party_size: u32,
    reserve_time: f64,
    pickup: GridPos,
    dropoff: GridPos,
    carpool: bool,
}

impl Default for ReservationBuilder {
    fn default() -> Self {
        Self {
            party_size: 1,
            reserve_time: 0.0,
            pickup: GridPos::new(0, 0),
            dropoff: GridPos::new(0, 4),
            carpool: false,
        }
    }
}

impl ReservationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_party_size(mut self, party_size: u32) -> Self {
        self.party_size = party_size;
        self
    }

    pub fn at_time(mut self, reserve_time: f64) -> Self {
        self.reserve_time = reserve_time;
        self
    }

    pub fn from(mut self, x: i32, y: i32) -> Self {
        self.pickup = GridPos::new(x, y);
        self
    }

    pub fn to(mut self, x: i32, y: i32) -> Self {
        self.dropoff = GridPos::new(x, y);
        self
    }

    pub fn carpool(mut self, carpool: bool) -> Self {
        self.carpool = carpool;
        self
    }

    pub fn spawn(self, world: &mut World) -> ReservationId {
        let reservation = world
            .resource_mut::<EntityStore>()
            .add_reservation(NewReservation {
                party_size: self.party_size,
                reserve_time: self.reserve_time,
                pickup: self.pickup,
                dropoff: self.dropoff,
                carpool: self.carpool,
            });
        world
            .resource_mut::<SimulationClock>()
            .schedule_at(self.reserve_time, SimEvent::ReservationCreated { reservation });
        reservation
    }
}
