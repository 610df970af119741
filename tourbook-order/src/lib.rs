pub mod models;
pub mod transition;

pub use models::{Reservation, ReservationStatus, ReservationWithTour};
pub use transition::{parse_target_status, plan_transition, TransitionError, TransitionPlan};
