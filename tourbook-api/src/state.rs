use std::sync::Arc;

use tourbook_core::mail::Mailer;
use tourbook_core::repository::{
    MessageRepository, ReservationRepository, TourRepository, UserRepository,
};
use tourbook_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct RateLimit {
    pub requests: i64,
    pub window_seconds: i64,
}

/// Everything a handler may touch. Clients are built once at startup and
/// shared; handlers hold no other state between requests.
#[derive(Clone)]
pub struct AppState {
    pub reservations: Arc<dyn ReservationRepository>,
    pub tours: Arc<dyn TourRepository>,
    pub users: Arc<dyn UserRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub redis: Option<Arc<RedisClient>>,
    pub auth: AuthConfig,
    pub rate_limit: RateLimit,
}

impl AppState {
    /// Build a state whose repositories are all served by one store.
    pub fn with_store<S>(store: Arc<S>, mailer: Arc<dyn Mailer>, auth: AuthConfig) -> Self
    where
        S: ReservationRepository + TourRepository + UserRepository + MessageRepository + 'static,
    {
        Self {
            reservations: store.clone(),
            tours: store.clone(),
            users: store.clone(),
            messages: store,
            mailer,
            redis: None,
            auth,
            rate_limit: RateLimit {
                requests: 100,
                window_seconds: 60,
            },
        }
    }
}
