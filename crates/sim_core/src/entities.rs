//! Drivers, reservations and the id-indexed store that owns them.
//!
//! Events and trace records only carry [`DriverId`] / [`ReservationId`]; handlers
//! resolve them through [`EntityStore`] when the event is dispatched.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::spatial::GridPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DriverId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub u32);

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "D{}", self.0)
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationState {
    Pending,
    Assigned,
    PickedUp,
    Completed,
}

/// A passenger party requesting a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub party_size: u32,
    /// Simulation seconds at which the request was made.
    pub reserve_time: f64,
    /// Where the party was picked up (or is waiting).
    pub pickup_coords: GridPos,
    /// Moves with the vehicle once the party is on board.
    pub current_location: GridPos,
    pub dropoff_coords: GridPos,
    /// Whether the party accepts sharing the vehicle.
    pub carpool: bool,
    pub assigned: bool,
    pub picked_up: bool,
    pub pickup_time: Option<f64>,
    pub dropoff_time: Option<f64>,
    pub driver_id: Option<DriverId>,
}

impl Reservation {
    pub fn state(&self) -> ReservationState {
        if self.dropoff_time.is_some() {
            ReservationState::Completed
        } else if self.picked_up {
            ReservationState::PickedUp
        } else if self.assigned {
            ReservationState::Assigned
        } else {
            ReservationState::Pending
        }
    }

    /// Seconds spent waiting between the request and the pickup.
    pub fn wait_time(&self) -> Option<f64> {
        self.pickup_time.map(|t| t - self.reserve_time)
    }
}

/// Attributes of a reservation before it is registered in the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewReservation {
    pub party_size: u32,
    pub reserve_time: f64,
    pub pickup: GridPos,
    pub dropoff: GridPos,
    pub carpool: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub initial_location: GridPos,
    pub current_location: GridPos,
    pub capacity: u32,
    pub seats_filled: u32,
    pub idle: bool,
    /// Assigned, not yet dropped off, in assignment order.
    pub current_reservations: Vec<ReservationId>,
    /// Every reservation this driver has dropped off, in completion order.
    pub serviced_passengers: Vec<ReservationId>,
    /// A movement chain (intersection arrivals, pickups, dropoffs) is outstanding.
    pub en_route: bool,
}

impl Driver {
    pub fn free_seats(&self) -> u32 {
        self.capacity.saturating_sub(self.seats_filled)
    }

    pub fn fits(&self, party_size: u32) -> bool {
        self.free_seats() >= party_size
    }
}

/// Exclusive owner of every driver and reservation in a run.
///
/// Ids are dense indices: the n-th created reservation has id `n`. Iteration is
/// always in id order, which the matching policy relies on for reproducibility.
#[derive(Debug, Default, Clone, Resource)]
pub struct EntityStore {
    drivers: Vec<Driver>,
    reservations: Vec<Reservation>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_driver(&mut self, location: GridPos, capacity: u32) -> DriverId {
        let id = DriverId(self.drivers.len() as u32);
        self.drivers.push(Driver {
            id,
            initial_location: location,
            current_location: location,
            capacity,
            seats_filled: 0,
            idle: true,
            current_reservations: Vec::new(),
            serviced_passengers: Vec::new(),
            en_route: false,
        });
        id
    }

    pub fn add_reservation(&mut self, new: NewReservation) -> ReservationId {
        let id = ReservationId(self.reservations.len() as u32);
        self.reservations.push(Reservation {
            id,
            party_size: new.party_size,
            reserve_time: new.reserve_time,
            pickup_coords: new.pickup,
            current_location: new.pickup,
            dropoff_coords: new.dropoff,
            carpool: new.carpool,
            assigned: false,
            picked_up: false,
            pickup_time: None,
            dropoff_time: None,
            driver_id: None,
        });
        id
    }

    pub fn driver(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.get(id.0 as usize)
    }

    pub fn driver_mut(&mut self, id: DriverId) -> Option<&mut Driver> {
        self.drivers.get_mut(id.0 as usize)
    }

    pub fn reservation(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations.get(id.0 as usize)
    }

    pub fn reservation_mut(&mut self, id: ReservationId) -> Option<&mut Reservation> {
        self.reservations.get_mut(id.0 as usize)
    }

    /// Borrow a driver and a reservation mutably at the same time.
    pub fn pair_mut(
        &mut self,
        driver: DriverId,
        reservation: ReservationId,
    ) -> Option<(&mut Driver, &mut Reservation)> {
        let driver = self.drivers.get_mut(driver.0 as usize)?;
        let reservation = self.reservations.get_mut(reservation.0 as usize)?;
        Some((driver, reservation))
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }

    /// First unassigned reservation (in id order) already requested at `now`.
    pub fn first_waiting(&self, now: f64) -> Option<ReservationId> {
        self.reservations
            .iter()
            .find(|reservation| !reservation.assigned && reservation.reserve_time <= now)
            .map(|reservation| reservation.id)
    }

    /// Sum of party sizes currently on the driver's books.
    pub fn booked_seats(&self, driver: &Driver) -> u32 {
        driver
            .current_reservations
            .iter()
            .filter_map(|id| self.reservation(*id))
            .map(|reservation| reservation.party_size)
            .sum()
    }
}
