use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use tourbook_catalog::{Category, NewCategory, Tour, TourDraft};
use tourbook_order::{ReservationStatus, ReservationWithTour};

use crate::identity::{Caller, Role};
use crate::models::{ContactMessage, NewContactMessage, NewUser, User, UserRecord};
use crate::reservations::StatusChange;
use crate::CoreResult;

/// Repository trait for reservation data access
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn get_reservation(&self, id: Uuid) -> CoreResult<Option<ReservationWithTour>>;

    /// Lock the reservation and its tour, authorize the caller, write the new
    /// status and any released capacity as one atomic unit.
    async fn transition_status(
        &self,
        id: Uuid,
        caller: &Caller,
        target: ReservationStatus,
    ) -> CoreResult<StatusChange>;

    async fn list_for_requester(&self, user_id: Uuid, email: &str) -> CoreResult<Vec<ReservationWithTour>>;

    async fn list_reservations(&self, status: Option<ReservationStatus>) -> CoreResult<Vec<ReservationWithTour>>;
}

/// Repository trait for tour catalog access
#[async_trait]
pub trait TourRepository: Send + Sync {
    async fn create_tour(&self, draft: TourDraft) -> CoreResult<Tour>;

    async fn get_tour(&self, id: Uuid) -> CoreResult<Option<Tour>>;

    async fn list_tours(&self, active_only: bool) -> CoreResult<Vec<Tour>>;

    async fn update_tour(&self, id: Uuid, draft: TourDraft) -> CoreResult<Tour>;

    async fn set_active(&self, id: Uuid, active: bool) -> CoreResult<Tour>;

    /// Fails with `Conflict` while any reservation references the tour.
    async fn delete_tour(&self, id: Uuid) -> CoreResult<()>;

    async fn current_prices(&self, ids: &[Uuid]) -> CoreResult<HashMap<Uuid, f64>>;

    async fn update_price(&self, id: Uuid, price: f64) -> CoreResult<()>;

    async fn create_category(&self, category: NewCategory) -> CoreResult<Category>;

    async fn list_categories(&self) -> CoreResult<Vec<Category>>;
}

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> CoreResult<User>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserRecord>>;

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>>;

    async fn list_users(&self, role: Option<Role>) -> CoreResult<Vec<User>>;

    async fn update_role(&self, id: Uuid, role: Role) -> CoreResult<User>;
}

/// Repository trait for contact form submissions
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create_message(&self, message: NewContactMessage) -> CoreResult<ContactMessage>;

    async fn list_messages(&self, unread_only: bool) -> CoreResult<Vec<ContactMessage>>;

    async fn set_read(&self, id: Uuid, is_read: bool) -> CoreResult<ContactMessage>;

    async fn set_read_many(&self, ids: &[Uuid], is_read: bool) -> CoreResult<u64>;

    async fn delete_message(&self, id: Uuid) -> CoreResult<()>;
}
