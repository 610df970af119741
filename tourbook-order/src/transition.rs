use crate::models::ReservationStatus;

/// Outcome of a status change decision: what to write and how many seats
/// go back to the tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: ReservationStatus,
    pub to: ReservationStatus,
    pub release_seats: i32,
}

impl TransitionPlan {
    pub fn releases_capacity(&self) -> bool {
        self.release_seats > 0
    }
}

/// Parse a requested target. Only CONFIRMED and CANCELLED may be requested.
pub fn parse_target_status(raw: &str) -> Result<ReservationStatus, TransitionError> {
    match raw.parse::<ReservationStatus>()? {
        ReservationStatus::Pending => Err(TransitionError::InvalidStatus(raw.to_string())),
        status => Ok(status),
    }
}

/// Decide a transition.
///
/// Seats are released only on CONFIRMED -> CANCELLED. PENDING reservations
/// never consumed capacity, so cancelling them releases nothing. Repeating
/// the current status is a no-op, which makes a second concurrent cancel
/// harmless once the first has committed.
pub fn plan_transition(
    current: ReservationStatus,
    target: ReservationStatus,
    number_of_people: i32,
) -> Result<TransitionPlan, TransitionError> {
    if target == ReservationStatus::Pending {
        return Err(TransitionError::InvalidStatus(target.to_string()));
    }

    if current == ReservationStatus::Cancelled && target == ReservationStatus::Confirmed {
        return Err(TransitionError::InvalidTransition {
            from: current.to_string(),
            to: target.to_string(),
        });
    }

    let release_seats = match (current, target) {
        (ReservationStatus::Confirmed, ReservationStatus::Cancelled) => {
            if number_of_people <= 0 {
                return Err(TransitionError::InvalidPartySize(number_of_people));
            }
            number_of_people
        }
        _ => 0,
    };

    Ok(TransitionPlan {
        from: current,
        to: target,
        release_seats,
    })
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Reservation has an invalid party size: {0}")]
    InvalidPartySize(i32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationStatus::*;

    #[test]
    fn test_confirmed_to_cancelled_releases_party() {
        let plan = plan_transition(Confirmed, Cancelled, 2).unwrap();
        assert_eq!(plan.release_seats, 2);
        assert!(plan.releases_capacity());
    }

    #[test]
    fn test_other_pairs_release_nothing() {
        for (from, to) in [(Pending, Cancelled), (Pending, Confirmed), (Confirmed, Confirmed), (Cancelled, Cancelled)] {
            let plan = plan_transition(from, to, 4).unwrap();
            assert_eq!(plan.release_seats, 0, "{:?} -> {:?}", from, to);
        }
    }

    #[test]
    fn test_reopening_cancelled_is_rejected() {
        let result = plan_transition(Cancelled, Confirmed, 1);
        assert!(matches!(result, Err(TransitionError::InvalidTransition { .. })));
    }

    #[test]
    fn test_parse_target_status() {
        assert_eq!(parse_target_status("CONFIRMED"), Ok(Confirmed));
        assert_eq!(parse_target_status("CANCELLED"), Ok(Cancelled));
        assert!(parse_target_status("PENDING").is_err());
        assert!(parse_target_status("cancelled").is_err());
    }

    #[test]
    fn test_corrupt_party_size() {
        assert_eq!(plan_transition(Confirmed, Cancelled, 0), Err(TransitionError::InvalidPartySize(0)));
    }
}
