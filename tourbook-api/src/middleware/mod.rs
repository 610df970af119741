pub mod auth;
pub mod rate_limit;

pub use auth::{issue_token, session_middleware, SessionClaims};
pub use rate_limit::rate_limit_middleware;
