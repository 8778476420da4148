use crate::entities::{Driver, DriverId, EntityStore, Reservation, ReservationId};

use super::policy::{nearest_by, MatchingPolicy};

/// Greedy nearest-neighbour dispatch by straight-line (Euclidean) grid distance.
///
/// Any driver with enough free seats is a candidate, busy or not. Among the
/// candidates the closest one to the party wins; on equal distance the lowest
/// driver id wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct NearestMatching;

impl MatchingPolicy for NearestMatching {
    fn find_driver(&self, reservation: &Reservation, drivers: &[Driver]) -> Option<DriverId> {
        let candidates = drivers
            .iter()
            .filter(|driver| driver.fits(reservation.party_size));
        nearest_by(candidates, |driver| {
            driver
                .current_location
                .euclidean_distance(reservation.current_location)
        })
        .map(|driver| driver.id)
    }

    fn active_target(&self, driver: &Driver, store: &EntityStore) -> Option<ReservationId> {
        let booked = driver
            .current_reservations
            .iter()
            .filter_map(|id| store.reservation(*id));
        nearest_by(booked, |reservation| {
            driver
                .current_location
                .euclidean_distance(reservation.current_location)
        })
        .map(|reservation| reservation.id)
    }
}
