use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credentials::MIN_PASSWORD_LENGTH;
use crate::identity::Role;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user row together with its password hash. Never serialized.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> CoreResult<()> {
        if !is_valid_email(&self.email) {
            return Err(CoreError::InvalidInput("A valid email is required".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CoreError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

impl NewContactMessage {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() || self.message.trim().is_empty() {
            return Err(CoreError::InvalidInput("Name and message are required".to_string()));
        }
        if !is_valid_email(&self.email) {
            return Err(CoreError::InvalidInput("A valid email is required".to_string()));
        }
        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Emails are compared case-insensitively everywhere.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ana@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@@example.com"));
        assert!(!is_valid_email("an a@example.com"));
    }

    #[test]
    fn test_registration_password_length() {
        let reg = Registration {
            name: None,
            email: "ana@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(matches!(reg.validate(), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_contact_message_requires_body() {
        let msg = NewContactMessage {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            subject: None,
            message: "   ".to_string(),
        };
        assert!(msg.validate().is_err());
    }
}
