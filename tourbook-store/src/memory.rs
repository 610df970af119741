use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use tourbook_catalog::{Capacity, Category, NewCategory, Tour, TourDraft};
use tourbook_core::repository::{
    MessageRepository, ReservationRepository, TourRepository, UserRepository,
};
use tourbook_core::reservations::{authorize_transition, StatusChange};
use tourbook_core::{
    Caller, ContactMessage, CoreError, CoreResult, NewContactMessage, NewUser, Role, User,
    UserRecord,
};
use tourbook_order::{Reservation, ReservationStatus, ReservationWithTour};

#[derive(Default)]
struct MemoryState {
    tours: HashMap<Uuid, Tour>,
    categories: HashMap<Uuid, Category>,
    reservations: HashMap<Uuid, Reservation>,
    users: HashMap<Uuid, UserRecord>,
    messages: HashMap<Uuid, ContactMessage>,
}

impl MemoryState {
    fn details(&self, reservation: &Reservation) -> CoreResult<ReservationWithTour> {
        let tour = self.tours.get(&reservation.tour_id).ok_or_else(|| {
            CoreError::Internal(format!("Reservation {} references a missing tour", reservation.id))
        })?;
        Ok(ReservationWithTour {
            reservation: reservation.clone(),
            tour: tour.summary(),
        })
    }

    fn with_tours<'a>(
        &self,
        reservations: impl Iterator<Item = &'a Reservation>,
    ) -> CoreResult<Vec<ReservationWithTour>> {
        let mut out = reservations
            .map(|r| self.details(r))
            .collect::<CoreResult<Vec<_>>>()?;
        out.sort_by(|a, b| b.reservation.created_at.cmp(&a.reservation.created_at));
        Ok(out)
    }

    fn check_category(&self, category_id: Option<Uuid>) -> CoreResult<()> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => {
                Err(CoreError::InvalidInput("Unknown category".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Store backed by process memory. Implements every repository trait with the
/// same semantics as the PostgreSQL store; one async mutex stands in for row
/// locks, so every operation is serialised.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_tour(&self, tour: Tour) {
        self.state.lock().await.tours.insert(tour.id, tour);
    }

    pub async fn insert_reservation(&self, reservation: Reservation) {
        self.state
            .lock()
            .await
            .reservations
            .insert(reservation.id, reservation);
    }

    pub async fn insert_user(&self, user: User, password_hash: &str) {
        self.state.lock().await.users.insert(
            user.id,
            UserRecord {
                user,
                password_hash: password_hash.to_string(),
            },
        );
    }

    pub async fn tour(&self, id: Uuid) -> Option<Tour> {
        self.state.lock().await.tours.get(&id).cloned()
    }

    pub async fn reservation(&self, id: Uuid) -> Option<Reservation> {
        self.state.lock().await.reservations.get(&id).cloned()
    }

    pub async fn user(&self, id: Uuid) -> Option<User> {
        self.state.lock().await.users.get(&id).map(|r| r.user.clone())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn get_reservation(&self, id: Uuid) -> CoreResult<Option<ReservationWithTour>> {
        let state = self.state.lock().await;
        state
            .reservations
            .get(&id)
            .map(|r| state.details(r))
            .transpose()
    }

    async fn transition_status(
        &self,
        id: Uuid,
        caller: &Caller,
        target: ReservationStatus,
    ) -> CoreResult<StatusChange> {
        let mut state = self.state.lock().await;

        let reservation = state
            .reservations
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Reservation {} not found", id)))?;
        let plan = authorize_transition(caller, &reservation, target)?;

        // Compute everything before writing so a failure leaves no partial update.
        let released = if plan.releases_capacity() {
            let tour = state.tours.get(&reservation.tour_id).ok_or_else(|| {
                CoreError::Internal(format!("Reservation {} references a missing tour", id))
            })?;
            let mut capacity = Capacity::new(tour.available)?;
            capacity.release(plan.release_seats)?;
            Some(capacity.available())
        } else {
            None
        };

        let now = Utc::now();
        if let Some(available) = released {
            if let Some(tour) = state.tours.get_mut(&reservation.tour_id) {
                tour.available = available;
                tour.updated_at = now;
            }
        }

        let updated = state
            .reservations
            .get_mut(&id)
            .map(|r| {
                r.status = plan.to;
                r.updated_at = now;
                r.clone()
            })
            .ok_or_else(|| CoreError::NotFound(format!("Reservation {} not found", id)))?;

        Ok(StatusChange {
            reservation: state.details(&updated)?,
            plan,
        })
    }

    async fn list_for_requester(&self, user_id: Uuid, email: &str) -> CoreResult<Vec<ReservationWithTour>> {
        let state = self.state.lock().await;
        state.with_tours(
            state
                .reservations
                .values()
                .filter(|r| r.is_requested_by(user_id, email)),
        )
    }

    async fn list_reservations(&self, status: Option<ReservationStatus>) -> CoreResult<Vec<ReservationWithTour>> {
        let state = self.state.lock().await;
        state.with_tours(
            state
                .reservations
                .values()
                .filter(|r| status.map_or(true, |s| r.status == s)),
        )
    }
}

#[async_trait]
impl TourRepository for InMemoryStore {
    async fn create_tour(&self, draft: TourDraft) -> CoreResult<Tour> {
        draft.validate()?;
        let mut state = self.state.lock().await;
        state.check_category(draft.category_id)?;

        let tour = Tour::from_draft(Uuid::new_v4(), draft);
        state.tours.insert(tour.id, tour.clone());
        Ok(tour)
    }

    async fn get_tour(&self, id: Uuid) -> CoreResult<Option<Tour>> {
        Ok(self.state.lock().await.tours.get(&id).cloned())
    }

    async fn list_tours(&self, active_only: bool) -> CoreResult<Vec<Tour>> {
        let state = self.state.lock().await;
        let mut tours: Vec<Tour> = state
            .tours
            .values()
            .filter(|t| !active_only || t.is_active)
            .cloned()
            .collect();
        tours.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.title.cmp(&b.title)));
        Ok(tours)
    }

    async fn update_tour(&self, id: Uuid, draft: TourDraft) -> CoreResult<Tour> {
        draft.validate()?;
        let mut state = self.state.lock().await;
        state.check_category(draft.category_id)?;

        let tour = state
            .tours
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("Tour {} not found", id)))?;
        tour.apply_draft(draft);
        Ok(tour.clone())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> CoreResult<Tour> {
        let mut state = self.state.lock().await;
        let tour = state
            .tours
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("Tour {} not found", id)))?;
        tour.is_active = active;
        tour.updated_at = Utc::now();
        Ok(tour.clone())
    }

    async fn delete_tour(&self, id: Uuid) -> CoreResult<()> {
        let mut state = self.state.lock().await;
        if !state.tours.contains_key(&id) {
            return Err(CoreError::NotFound(format!("Tour {} not found", id)));
        }

        let reservations = state.reservations.values().filter(|r| r.tour_id == id).count();
        if reservations > 0 {
            return Err(CoreError::Conflict(format!(
                "Tour {} has {} reservation(s) and cannot be deleted",
                id, reservations
            )));
        }

        state.tours.remove(&id);
        Ok(())
    }

    async fn current_prices(&self, ids: &[Uuid]) -> CoreResult<HashMap<Uuid, f64>> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.tours.get(id).map(|t| (*id, t.price)))
            .collect())
    }

    async fn update_price(&self, id: Uuid, price: f64) -> CoreResult<()> {
        let mut state = self.state.lock().await;
        let tour = state
            .tours
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("Tour {} not found", id)))?;
        tour.price = price;
        tour.updated_at = Utc::now();
        Ok(())
    }

    async fn create_category(&self, category: NewCategory) -> CoreResult<Category> {
        category.validate()?;
        let mut state = self.state.lock().await;
        if state.categories.values().any(|c| c.slug == category.slug) {
            return Err(CoreError::Conflict("Resource already exists".to_string()));
        }

        let created = Category {
            id: Uuid::new_v4(),
            name: category.name.trim().to_string(),
            slug: category.slug,
            description: category.description,
        };
        state.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        let state = self.state.lock().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|r| r.user.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(CoreError::Conflict("Email is already registered".to_string()));
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            role: user.role,
            phone: None,
            created_at: Utc::now(),
        };
        state.users.insert(
            created.id,
            UserRecord {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|r| r.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.user(id).await)
    }

    async fn list_users(&self, role: Option<Role>) -> CoreResult<Vec<User>> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|r| role.map_or(true, |role| r.user.role == role))
            .map(|r| r.user.clone())
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> CoreResult<User> {
        let mut state = self.state.lock().await;
        let record = state
            .users
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("User {} not found", id)))?;
        record.user.role = role;
        Ok(record.user.clone())
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn create_message(&self, message: NewContactMessage) -> CoreResult<ContactMessage> {
        message.validate()?;
        let created = ContactMessage {
            id: Uuid::new_v4(),
            name: message.name.trim().to_string(),
            email: message.email.trim().to_string(),
            subject: message.subject,
            message: message.message.trim().to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .await
            .messages
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_messages(&self, unread_only: bool) -> CoreResult<Vec<ContactMessage>> {
        let state = self.state.lock().await;
        let mut messages: Vec<ContactMessage> = state
            .messages
            .values()
            .filter(|m| !unread_only || !m.is_read)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn set_read(&self, id: Uuid, is_read: bool) -> CoreResult<ContactMessage> {
        let mut state = self.state.lock().await;
        let message = state
            .messages
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("Message {} not found", id)))?;
        message.is_read = is_read;
        Ok(message.clone())
    }

    async fn set_read_many(&self, ids: &[Uuid], is_read: bool) -> CoreResult<u64> {
        let mut state = self.state.lock().await;
        let mut updated = 0;
        for id in ids {
            if let Some(message) = state.messages.get_mut(id) {
                message.is_read = is_read;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_message(&self, id: Uuid) -> CoreResult<()> {
        let mut state = self.state.lock().await;
        state
            .messages
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("Message {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn draft(price: f64, available: i32) -> TourDraft {
        TourDraft {
            title: "Fjord Kayak".to_string(),
            description: None,
            location: None,
            price,
            available,
            start_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 7, 4).unwrap(),
            is_active: None,
            category_id: None,
            itinerary: vec![],
            images: vec![],
        }
    }

    fn reservation(tour_id: Uuid, email: &str, people: i32, status: ReservationStatus) -> Reservation {
        let now = Utc::now();
        Reservation {
            id: Uuid::new_v4(),
            tour_id,
            user_id: None,
            name: "Guest".to_string(),
            email: email.to_string(),
            phone: None,
            number_of_people: people,
            total_price: 100.0 * people as f64,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn admin() -> Caller {
        Caller {
            id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            name: None,
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_cancel_confirmed_restores_capacity() {
        let store = InMemoryStore::new();
        let tour = store.create_tour(draft(500.0, 5)).await.unwrap();
        let r = reservation(tour.id, "ana@example.com", 2, ReservationStatus::Confirmed);
        store.insert_reservation(r.clone()).await;

        let change = store
            .transition_status(r.id, &admin(), ReservationStatus::Cancelled)
            .await
            .unwrap();

        assert_eq!(change.reservation.reservation.status, ReservationStatus::Cancelled);
        assert_eq!(change.reservation.tour.available, 7);
        assert_eq!(store.tour(tour.id).await.unwrap().available, 7);
    }

    #[tokio::test]
    async fn test_concurrent_cancels_release_once() {
        let store = Arc::new(InMemoryStore::new());
        let tour = store.create_tour(draft(500.0, 5)).await.unwrap();
        let r = reservation(tour.id, "ana@example.com", 3, ReservationStatus::Confirmed);
        store.insert_reservation(r.clone()).await;
        let reservation_id = r.id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .transition_status(reservation_id, &admin(), ReservationStatus::Cancelled)
                        .await
                })
            })
            .collect();

        let mut released = 0;
        for handle in handles {
            let change = handle.await.unwrap().unwrap();
            released += change.plan.release_seats;
        }

        assert_eq!(released, 3);
        assert_eq!(store.tour(tour.id).await.unwrap().available, 8);
    }

    #[tokio::test]
    async fn test_forbidden_transition_leaves_state_untouched() {
        let store = InMemoryStore::new();
        let tour = store.create_tour(draft(500.0, 5)).await.unwrap();
        let r = reservation(tour.id, "ana@example.com", 2, ReservationStatus::Confirmed);
        store.insert_reservation(r.clone()).await;

        let stranger = Caller {
            id: Uuid::new_v4(),
            email: "mallory@example.com".to_string(),
            name: None,
            role: Role::User,
        };
        let result = store
            .transition_status(r.id, &stranger, ReservationStatus::Cancelled)
            .await;

        assert!(matches!(result, Err(CoreError::Forbidden(_))));
        assert_eq!(store.reservation(r.id).await.unwrap().status, ReservationStatus::Confirmed);
        assert_eq!(store.tour(tour.id).await.unwrap().available, 5);
    }

    #[tokio::test]
    async fn test_capacity_overflow_leaves_reservation_untouched() {
        let store = InMemoryStore::new();
        let tour = store.create_tour(draft(500.0, i32::MAX)).await.unwrap();
        let r = reservation(tour.id, "ana@example.com", 2, ReservationStatus::Confirmed);
        store.insert_reservation(r.clone()).await;

        let result = store
            .transition_status(r.id, &admin(), ReservationStatus::Cancelled)
            .await;

        assert!(matches!(result, Err(CoreError::Internal(_))));
        assert_eq!(store.reservation(r.id).await.unwrap().status, ReservationStatus::Confirmed);
        assert_eq!(store.tour(tour.id).await.unwrap().available, i32::MAX);
    }

    #[tokio::test]
    async fn test_delete_tour_with_reservations_conflicts() {
        let store = InMemoryStore::new();
        let tour = store.create_tour(draft(100.0, 5)).await.unwrap();
        store
            .insert_reservation(reservation(tour.id, "ana@example.com", 1, ReservationStatus::Cancelled))
            .await;

        assert!(matches!(store.delete_tour(tour.id).await, Err(CoreError::Conflict(_))));

        let empty = store.create_tour(draft(100.0, 5)).await.unwrap();
        store.delete_tour(empty.id).await.unwrap();
        assert!(store.tour(empty.id).await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        let new_user = |email: &str| NewUser {
            name: None,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        };

        store.create_user(new_user("ana@example.com")).await.unwrap();
        let dup = store.create_user(new_user("ANA@example.com")).await;
        assert!(matches!(dup, Err(CoreError::Conflict(_))));
    }
}
