use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use tourbook_catalog::TourSummary;

use crate::transition::TransitionError;

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ReservationStatus::Pending),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            other => Err(TransitionError::InvalidStatus(other.to_string())),
        }
    }
}

/// A customer's claim on seats of one tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub number_of_people: i32,
    pub total_price: f64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_requested_by(&self, user_id: Uuid, email: &str) -> bool {
        self.user_id == Some(user_id) || self.email.eq_ignore_ascii_case(email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationWithTour {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub tour: TourSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(user_id: Option<Uuid>, email: &str) -> Reservation {
        let now = Utc::now();
        Reservation {
            id: Uuid::new_v4(),
            tour_id: Uuid::new_v4(),
            user_id,
            name: "Ana".to_string(),
            email: email.to_string(),
            phone: None,
            number_of_people: 2,
            total_price: 200.0,
            status: ReservationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_requester_matches_by_email_or_id() {
        let user = Uuid::new_v4();
        assert!(reservation(Some(user), "x@example.com").is_requested_by(user, "other@example.com"));
        assert!(reservation(None, "Ana@Example.com").is_requested_by(Uuid::new_v4(), "ana@example.com"));
        assert!(!reservation(None, "ana@example.com").is_requested_by(user, "bob@example.com"));
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [ReservationStatus::Pending, ReservationStatus::Confirmed, ReservationStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<ReservationStatus>().unwrap(), status);
        }
        assert!("DONE".parse::<ReservationStatus>().is_err());
    }
}
