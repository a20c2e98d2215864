//! Router for the authentication endpoints

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use beer_auth::AuthContext;

/// Router serving every authentication endpoint under `/auth`:
/// - `GET /auth/url` (bearer required)
/// - `GET /auth/login`
/// - `GET /auth/google/callback`
/// - `GET|POST /auth/token`
/// - `GET /auth/user`
///
/// Requests are traced at INFO with millisecond latency.
pub fn beer_auth_router(ctx: AuthContext) -> Router {
    beer_auth_router_no_trace(ctx).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`beer_auth_router`] without the HTTP trace layer.
pub fn beer_auth_router_no_trace(ctx: AuthContext) -> Router {
    Router::new().nest("/auth", super::auth::router(ctx))
}
