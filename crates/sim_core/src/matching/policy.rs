use crate::entities::{Driver, DriverId, EntityStore, Reservation, ReservationId};

/// Dispatch decisions taken by the engine.
///
/// Implementations must be deterministic for a given store: candidates are
/// visited in id order and the first candidate reaching the best score wins.
///
/// # Examples
///
/// ```rust
/// use sim_core::entities::{EntityStore, NewReservation};
/// use sim_core::matching::{MatchingPolicy, NearestMatching};
/// use sim_core::spatial::GridPos;
///
/// let mut store = EntityStore::new();
/// store.add_driver(GridPos::new(0, 0), 4);
/// let near = store.add_driver(GridPos::new(5, 5), 4);
/// let id = store.add_reservation(NewReservation {
///     party_size: 2,
///     reserve_time: 0.0,
///     pickup: GridPos::new(6, 6),
///     dropoff: GridPos::new(1, 12),
///     carpool: false,
/// });
/// let reservation = store.reservation(id).unwrap();
/// assert_eq!(NearestMatching.find_driver(reservation, store.drivers()), Some(near));
/// ```
pub trait MatchingPolicy: Send + Sync {
    /// Pick the driver that should be asked to serve `reservation`.
    ///
    /// Drivers without enough free seats for the whole party are never considered.
    fn find_driver(&self, reservation: &Reservation, drivers: &[Driver]) -> Option<DriverId>;

    /// Pick which of the driver's current reservations to move toward next.
    fn active_target(&self, driver: &Driver, store: &EntityStore) -> Option<ReservationId>;

    /// Find one waiting reservation the driver can pick up on the way.
    fn carpool_candidate(
        &self,
        driver: &Driver,
        reservations: &[Reservation],
        threshold: u32,
        now: f64,
    ) -> Option<ReservationId> {
        reservations
            .iter()
            .find(|reservation| is_carpool_eligible(driver, reservation, threshold, now))
            .map(|reservation| reservation.id)
    }
}

/// Requested by `now` and still unassigned, accepts sharing, fits the remaining
/// seats, and lies within `threshold` blocks (Chebyshev) of the driver.
pub fn is_carpool_eligible(
    driver: &Driver,
    reservation: &Reservation,
    threshold: u32,
    now: f64,
) -> bool {
    !reservation.assigned
        && reservation.reserve_time <= now
        && reservation.carpool
        && driver.fits(reservation.party_size)
        && driver
            .current_location
            .chebyshev_distance(reservation.current_location)
            <= threshold
}

/// Element with the smallest `distance`. Ties keep the earliest element, since only
/// a strictly smaller value replaces the running minimum.
pub fn nearest_by<T, I, F>(items: I, mut distance: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> f64,
{
    let mut best: Option<(T, f64)> = None;
    for item in items {
        let d = distance(&item);
        match &best {
            Some((_, min)) if d >= *min => {}
            _ => best = Some((item, d)),
        }
    }
    best.map(|(item, _)| item)
}
