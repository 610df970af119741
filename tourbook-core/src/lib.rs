pub mod credentials;
pub mod identity;
pub mod mail;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod reservations;
pub mod users;

pub use identity::{Caller, Role};
pub use models::{ContactMessage, NewContactMessage, NewUser, Registration, User, UserRecord};

use tourbook_catalog::{CapacityError, CatalogError, PricingError};
use tourbook_order::TransitionError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Authentication required: {0}")]
    Unauthenticated(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<TransitionError> for CoreError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidStatus(_) => CoreError::InvalidInput(err.to_string()),
            TransitionError::InvalidTransition { .. } => CoreError::Conflict(err.to_string()),
            TransitionError::InvalidPartySize(_) => CoreError::Internal(err.to_string()),
        }
    }
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        CoreError::InvalidInput(err.to_string())
    }
}

impl From<PricingError> for CoreError {
    fn from(err: PricingError) -> Self {
        CoreError::InvalidInput(err.to_string())
    }
}

impl From<CapacityError> for CoreError {
    fn from(err: CapacityError) -> Self {
        CoreError::Internal(err.to_string())
    }
}
