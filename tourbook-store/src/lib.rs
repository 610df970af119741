pub mod app_config;
pub mod database;
pub mod mailer;
pub mod memory;
pub mod message_repo;
pub mod redis_repo;
pub mod reservation_repo;
pub mod tour_repo;
pub mod user_repo;

pub use database::DbClient;
pub use mailer::SmtpMailer;
pub use memory::InMemoryStore;
pub use message_repo::StoreMessageRepository;
pub use redis_repo::RedisClient;
pub use reservation_repo::StoreReservationRepository;
pub use tour_repo::StoreTourRepository;
pub use user_repo::StoreUserRepository;
