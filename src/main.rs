//! shopcore — order-management backend.

use anyhow::Result;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopcore::config::Config;
use shopcore::events::EventPublisher;
use shopcore::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let events = match &config.nats_url {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => EventPublisher::new(Some(client)),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, events disabled");
                EventPublisher::disabled()
            }
        },
        None => EventPublisher::disabled(),
    };

    let state = AppState::new(db, events, Duration::hours(config.token_ttl_hours));
    let app = shopcore::app(state);

    let addr = config.addr();
    tracing::info!("shopcore listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
