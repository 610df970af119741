use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tourbook_core::{Caller, User};

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub exp: usize,
}

pub fn issue_token(auth: &AuthConfig, user: &User) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.to_string(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

/// Bearer header first, then the session cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    })
}

fn unauthenticated() -> AppError {
    AppError::AuthenticationError("Authentication required".to_string())
}

/// Resolve the caller behind a request. The role comes from the user row,
/// not the token, so a role change applies to sessions already issued.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Caller, AppError> {
    let token = session_token(headers).ok_or_else(unauthenticated)?;

    let token_data = decode::<SessionClaims>(
        &token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        unauthenticated()
    })?;

    let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| unauthenticated())?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(unauthenticated)?;

    Ok(Caller {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    })
}

/// Rejects anonymous requests with 401 and makes the `Caller` available to
/// handlers as an extension.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, req.headers()).await?;
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}
