use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use tourbook_store::redis_repo::rate_limit_key;

use crate::state::AppState;

/// Per-IP fixed window. Fails open when Redis is absent or erroring.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(redis) = state.redis.as_ref() else {
        return next.run(req).await;
    };
    let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>().copied() else {
        return next.run(req).await;
    };

    let key = rate_limit_key(&addr.ip().to_string());
    match redis
        .check_rate_limit(&key, state.rate_limit.requests, state.rate_limit.window_seconds)
        .await
    {
        Ok(true) => next.run(req).await,
        Ok(false) => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded").into_response(),
        Err(e) => {
            tracing::warn!("Rate limiter unavailable: {}", e);
            next.run(req).await
        },
    }
}
