//! One system per event kind. Each reads [`crate::clock::CurrentEvent`] and
//! mutates the entity store and the future event list.

pub mod assignment_requested;
pub mod drop_off;
pub mod idle_arrival;
pub mod intersection_arrival;
pub mod pick_up;
pub mod reservation_created;
