use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tourbook_api::{
    app,
    state::{AppState, AuthConfig, RateLimit},
};
use tourbook_core::mail::{LogMailer, Mailer};
use tourbook_store::{
    app_config::Config, DbClient, RedisClient, SmtpMailer, StoreMessageRepository,
    StoreReservationRepository, StoreTourRepository, StoreUserRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourbook_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Tourbook API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    // Optional: without Redis the rate limiter lets everything through.
    let redis = match &config.redis {
        Some(redis) => Some(Arc::new(
            RedisClient::new(&redis.url)
                .await
                .context("Failed to configure Redis")?,
        )),
        None => {
            tracing::warn!("No Redis configured, rate limiting disabled");
            None
        },
    };

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => Arc::new(SmtpMailer::new(mail)),
        None => {
            tracing::warn!("No SMTP relay configured, outgoing mail will only be logged");
            Arc::new(LogMailer)
        },
    };

    let app_state = AppState {
        reservations: Arc::new(StoreReservationRepository::new(db.pool.clone())),
        tours: Arc::new(StoreTourRepository::new(db.pool.clone())),
        users: Arc::new(StoreUserRepository::new(db.pool.clone())),
        messages: Arc::new(StoreMessageRepository::new(db.pool.clone())),
        mailer,
        redis,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        rate_limit: RateLimit {
            requests: config.rate_limit.requests,
            window_seconds: config.rate_limit.window_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Server error")?;

    Ok(())
}
