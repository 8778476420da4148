//! Movement model: advances a driver one block toward its active target.
//!
//! A step moves along the only axis with a non-zero offset, or along a randomly
//! chosen axis when both offsets are non-zero. Once the party is on board, the
//! driver and the reservation move together toward the dropoff.

use crate::distributions::RandomModel;
use crate::entities::{Driver, Reservation};
use crate::spatial::GridPos;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementOutcome {
    /// Driver is at the waiting party; no time elapses.
    ArrivedPickup,
    /// Driver and on-board party are at the dropoff; no time elapses.
    ArrivedDropoff,
    /// Driver moved one block; the next intersection is reached after `travel_time_secs`.
    Moved { to: GridPos, travel_time_secs: f64 },
}

/// One unit step from `from` toward `to`. Returns `from` when already there.
pub fn step_toward(from: GridPos, to: GridPos, rng: &mut RandomModel) -> GridPos {
    let (dx, dy) = from.delta_to(to);
    let move_x = match (dx, dy) {
        (0, 0) => return from,
        (_, 0) => true,
        (0, _) => false,
        _ => rng.choose_x_axis(),
    };
    if move_x {
        GridPos::new(from.x + dx.signum(), from.y)
    } else {
        GridPos::new(from.x, from.y + dy.signum())
    }
}

/// Advance `driver` toward `target`, mutating both locations as needed.
pub fn advance(
    driver: &mut Driver,
    target: &mut Reservation,
    rng: &mut RandomModel,
) -> MovementOutcome {
    if driver.current_location == target.current_location {
        if !target.picked_up {
            return MovementOutcome::ArrivedPickup;
        }
        if driver.current_location == target.dropoff_coords {
            return MovementOutcome::ArrivedDropoff;
        }
        let next = step_toward(driver.current_location, target.dropoff_coords, rng);
        driver.current_location = next;
        target.current_location = next;
        return MovementOutcome::Moved {
            to: next,
            travel_time_secs: rng.travel_time_secs(),
        };
    }

    let next = step_toward(driver.current_location, target.current_location, rng);
    driver.current_location = next;
    MovementOutcome::Moved {
        to: next,
        travel_time_secs: rng.travel_time_secs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::RandomModelConfig;
    use crate::entities::{EntityStore, NewReservation};

    fn rng() -> RandomModel {
        RandomModel::new(Some(42), RandomModelConfig::default()).expect("model")
    }

    fn store_with(driver_at: GridPos, pickup: GridPos, dropoff: GridPos) -> EntityStore {
        let mut store = EntityStore::new();
        store.add_driver(driver_at, 4);
        store.add_reservation(NewReservation {
            party_size: 1,
            reserve_time: 0.0,
            pickup,
            dropoff,
            carpool: false,
        });
        store
    }

    #[test]
    fn single_axis_offsets_step_along_that_axis() {
        let mut rng = rng();
        let from = GridPos::new(5, 5);
        assert_eq!(step_toward(from, GridPos::new(9, 5), &mut rng), GridPos::new(6, 5));
        assert_eq!(step_toward(from, GridPos::new(1, 5), &mut rng), GridPos::new(4, 5));
        assert_eq!(step_toward(from, GridPos::new(5, 0), &mut rng), GridPos::new(5, 4));
        assert_eq!(step_toward(from, GridPos::new(5, 6), &mut rng), GridPos::new(5, 6));
        assert_eq!(step_toward(from, from, &mut rng), from);
    }

    #[test]
    fn diagonal_offsets_move_one_block_closer() {
        let mut rng = rng();
        let from = GridPos::new(2, 2);
        let to = GridPos::new(6, 9);
        for _ in 0..50 {
            let next = step_toward(from, to, &mut rng);
            assert!(next == GridPos::new(3, 2) || next == GridPos::new(2, 3));
        }
    }

    #[test]
    fn co_located_waiting_party_signals_pickup() {
        let spot = GridPos::new(4, 4);
        let mut store = store_with(spot, spot, GridPos::new(8, 4));
        let mut rng = rng();
        let (driver, reservation) = store
            .pair_mut(crate::entities::DriverId(0), crate::entities::ReservationId(0))
            .expect("pair");
        assert_eq!(advance(driver, reservation, &mut rng), MovementOutcome::ArrivedPickup);
        assert_eq!(driver.current_location, spot);
    }

    #[test]
    fn on_board_party_moves_with_driver_until_dropoff() {
        let start = GridPos::new(4, 4);
        let dropoff = GridPos::new(6, 4);
        let mut store = store_with(start, start, dropoff);
        let mut rng = rng();
        let (driver, reservation) = store
            .pair_mut(crate::entities::DriverId(0), crate::entities::ReservationId(0))
            .expect("pair");
        reservation.picked_up = true;

        for expected_x in [5, 6] {
            match advance(driver, reservation, &mut rng) {
                MovementOutcome::Moved {
                    to,
                    travel_time_secs,
                } => {
                    assert_eq!(to, GridPos::new(expected_x, 4));
                    assert!(travel_time_secs >= 1.0);
                }
                other => panic!("expected a move, got {other:?}"),
            }
            assert_eq!(driver.current_location, reservation.current_location);
        }
        assert_eq!(advance(driver, reservation, &mut rng), MovementOutcome::ArrivedDropoff);
    }

    #[test]
    fn driver_approaches_waiting_party_without_moving_it() {
        let pickup = GridPos::new(0, 3);
        let mut store = store_with(GridPos::new(0, 0), pickup, GridPos::new(9, 9));
        let mut rng = rng();
        let (driver, reservation) = store
            .pair_mut(crate::entities::DriverId(0), crate::entities::ReservationId(0))
            .expect("pair");
        let outcome = advance(driver, reservation, &mut rng);
        assert!(matches!(outcome, MovementOutcome::Moved { to, .. } if to == GridPos::new(0, 1)));
        assert_eq!(reservation.current_location, pickup);
    }
}
