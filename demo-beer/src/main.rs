use std::sync::Arc;

use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beer_auth::{AuthConfig, AuthContext, BroadcastNotifier};
use beer_auth_axum::beer_auth_router;

mod server;
mod stores;

use crate::server::{bind_addr, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,beer_auth=debug,tower_http=info", env!("CARGO_CRATE_NAME"))
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AuthConfig::from_env().await?);
    let users = stores::users_repository().await?;
    let notifier = Arc::new(BroadcastNotifier::default());
    stores::spawn_announcement_logger(notifier.subscribe());

    let ctx = AuthContext::new(config, users, notifier)?;

    let app = Router::new()
        .route("/", get(|| async { "beer gifting service" }))
        .merge(beer_auth_router(ctx));

    serve(bind_addr(), app).await?;
    Ok(())
}
