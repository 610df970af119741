use serde::Serialize;
use uuid::Uuid;

use tourbook_order::{
    parse_target_status, plan_transition, Reservation, ReservationStatus, ReservationWithTour,
    TransitionPlan,
};

use crate::identity::Caller;
use crate::repository::ReservationRepository;
use crate::CoreResult;

/// A committed status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub reservation: ReservationWithTour,
    #[serde(skip)]
    pub plan: TransitionPlan,
}

/// Authorization and transition planning, run by stores while the
/// reservation row is locked.
pub fn authorize_transition(
    caller: &Caller,
    reservation: &Reservation,
    target: ReservationStatus,
) -> CoreResult<TransitionPlan> {
    caller.authorize_reservation(reservation)?;
    Ok(plan_transition(
        reservation.status,
        target,
        reservation.number_of_people,
    )?)
}

/// Change a reservation's status on behalf of `caller`.
pub async fn change_status(
    repo: &dyn ReservationRepository,
    caller: &Caller,
    reservation_id: Uuid,
    requested: &str,
) -> CoreResult<StatusChange> {
    let target = parse_target_status(requested)?;
    repo.transition_status(reservation_id, caller, target).await
}

/// Cancel one of the caller's own bookings. Admins may cancel any booking.
pub async fn cancel_booking(
    repo: &dyn ReservationRepository,
    caller: &Caller,
    reservation_id: Uuid,
) -> CoreResult<StatusChange> {
    repo.transition_status(reservation_id, caller, ReservationStatus::Cancelled)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::CoreError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRepo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReservationRepository for CountingRepo {
        async fn get_reservation(&self, _id: Uuid) -> CoreResult<Option<ReservationWithTour>> {
            Ok(None)
        }

        async fn transition_status(
            &self,
            id: Uuid,
            _caller: &Caller,
            _target: ReservationStatus,
        ) -> CoreResult<StatusChange> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::NotFound(format!("Reservation {}", id)))
        }

        async fn list_for_requester(&self, _user_id: Uuid, _email: &str) -> CoreResult<Vec<ReservationWithTour>> {
            Ok(vec![])
        }

        async fn list_reservations(&self, _status: Option<ReservationStatus>) -> CoreResult<Vec<ReservationWithTour>> {
            Ok(vec![])
        }
    }

    fn caller(role: Role) -> Caller {
        Caller {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            name: None,
            role,
        }
    }

    #[tokio::test]
    async fn test_invalid_status_rejected_before_lookup() {
        let repo = CountingRepo { calls: AtomicUsize::new(0) };
        let result = change_status(&repo, &caller(Role::Admin), Uuid::new_v4(), "PENDING").await;
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_reservation_is_not_found() {
        let repo = CountingRepo { calls: AtomicUsize::new(0) };
        let result = change_status(&repo, &caller(Role::Admin), Uuid::new_v4(), "CANCELLED").await;
        assert!(matches!(result, Err(CoreError::NotFound(_))));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_authorize_transition_checks_owner_first() {
        let reservation = Reservation {
            id: Uuid::new_v4(),
            tour_id: Uuid::new_v4(),
            user_id: None,
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            phone: None,
            number_of_people: 3,
            total_price: 300.0,
            status: ReservationStatus::Confirmed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let denied = authorize_transition(&caller(Role::User), &reservation, ReservationStatus::Cancelled);
        assert!(matches!(denied, Err(CoreError::Forbidden(_))));

        let plan = authorize_transition(&caller(Role::Admin), &reservation, ReservationStatus::Cancelled).unwrap();
        assert_eq!(plan.release_seats, 3);
    }
}
