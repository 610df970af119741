use serde::Serialize;
use uuid::Uuid;

/// Audit events emitted after a state change has been committed.
pub trait DomainEvent: Serialize {
    const NAME: &'static str;
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationStatusChangedEvent {
    pub reservation_id: Uuid,
    pub tour_id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub released_seats: i32,
    pub actor_id: Uuid,
    pub timestamp: i64,
}

impl DomainEvent for ReservationStatusChangedEvent {
    const NAME: &'static str = "reservation.status_changed";
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct TourPricesAdjustedEvent {
    pub action: String,
    pub amount: f64,
    pub updated: usize,
    pub failed: usize,
    pub actor_id: Uuid,
    pub timestamp: i64,
}

impl DomainEvent for TourPricesAdjustedEvent {
    const NAME: &'static str = "tour.prices_adjusted";
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct UserRoleChangedEvent {
    pub user_id: Uuid,
    pub role: String,
    pub actor_id: Uuid,
    pub timestamp: i64,
}

impl DomainEvent for UserRoleChangedEvent {
    const NAME: &'static str = "user.role_changed";
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BulkEmailDispatchedEvent {
    pub subject: String,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub actor_id: Uuid,
    pub timestamp: i64,
}

impl DomainEvent for BulkEmailDispatchedEvent {
    const NAME: &'static str = "mail.bulk_dispatched";
}

/// Writes the event to the `tourbook::audit` tracing target as JSON.
pub fn record<E: DomainEvent>(event: &E) {
    match serde_json::to_string(event) {
        Ok(payload) => tracing::info!(target: "tourbook::audit", event = E::NAME, %payload),
        Err(e) => tracing::warn!(target: "tourbook::audit", event = E::NAME, "Failed to serialize event: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_shape() {
        let event = ReservationStatusChangedEvent {
            reservation_id: Uuid::nil(),
            tour_id: Uuid::nil(),
            from_status: "CONFIRMED".to_string(),
            to_status: "CANCELLED".to_string(),
            released_seats: 2,
            actor_id: Uuid::nil(),
            timestamp: 0,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["released_seats"], 2);
        assert_eq!(value["to_status"], "CANCELLED");
        assert_eq!(ReservationStatusChangedEvent::NAME, "reservation.status_changed");
    }
}
