use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use tourbook_order::Reservation;

use crate::{CoreError, CoreResult};

/// Coarse authorization level. The only authorization signal in the system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(CoreError::InvalidInput(format!("Invalid role: {}", other))),
        }
    }
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The single capability check for privileged operations.
    pub fn require_admin(&self) -> CoreResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Admin privileges required".to_string()))
        }
    }

    /// Admins may act on any reservation, everyone else only on their own.
    pub fn authorize_reservation(&self, reservation: &Reservation) -> CoreResult<()> {
        if self.is_admin() || reservation.is_requested_by(self.id, &self.email) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "You are not allowed to modify this reservation".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tourbook_order::ReservationStatus;

    fn caller(role: Role) -> Caller {
        Caller {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            name: Some("Ana".to_string()),
            role,
        }
    }

    fn reservation_for(email: &str) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            tour_id: Uuid::new_v4(),
            user_id: None,
            name: "Someone".to_string(),
            email: email.to_string(),
            phone: None,
            number_of_people: 1,
            total_price: 10.0,
            status: ReservationStatus::Confirmed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(caller(Role::Admin).require_admin().is_ok());
        assert!(matches!(caller(Role::User).require_admin(), Err(CoreError::Forbidden(_))));
    }

    #[test]
    fn test_reservation_authorization() {
        let owner = caller(Role::User);
        assert!(owner.authorize_reservation(&reservation_for("ana@example.com")).is_ok());
        assert!(owner.authorize_reservation(&reservation_for("bob@example.com")).is_err());
        assert!(caller(Role::Admin).authorize_reservation(&reservation_for("bob@example.com")).is_ok());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("ROOT".parse::<Role>().is_err());
    }
}
