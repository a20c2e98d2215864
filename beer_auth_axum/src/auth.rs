use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    middleware::from_fn_with_state,
    response::Redirect,
    routing::get,
};
use axum_extra::{TypedHeader, headers};

use beer_auth::{
    AuthContext, CallbackQuery, ConsentUrlResponse, TokenResponse, User, callback_core,
    consent_url_core, find_or_create_from_bearer_core, login_core, token_core,
};

use super::error::IntoResponseError;
use super::middleware::require_bearer;

pub(super) fn router(ctx: AuthContext) -> Router {
    Router::new()
        .route(
            "/url",
            get(consent_url).route_layer(from_fn_with_state(ctx.clone(), require_bearer)),
        )
        .route("/login", get(login))
        .route("/google/callback", get(callback))
        .route("/token", get(token).post(token))
        .route("/user", get(find_or_create_user))
        .with_state(ctx)
}

async fn consent_url(
    State(ctx): State<AuthContext>,
) -> Result<Json<ConsentUrlResponse>, StatusCode> {
    consent_url_core(&ctx).map(Json).into_response_error()
}

async fn login(State(ctx): State<AuthContext>) -> Result<(HeaderMap, Redirect), StatusCode> {
    let (headers, url) = login_core(&ctx).into_response_error()?;
    Ok((headers, Redirect::temporary(&url)))
}

async fn callback(
    State(ctx): State<AuthContext>,
    Query(query): Query<CallbackQuery>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Result<(HeaderMap, Json<TokenResponse>), StatusCode> {
    let cookie_state = cookies
        .as_ref()
        .and_then(|TypedHeader(c)| c.get(&ctx.config.state_cookie_name));

    let (headers, token) = callback_core(&ctx, &query, cookie_state)
        .await
        .into_response_error()?;
    Ok((headers, Json(token)))
}

// GET with a JSON body is accepted as well.
async fn token(
    State(ctx): State<AuthContext>,
    body: Bytes,
) -> Result<Json<TokenResponse>, StatusCode> {
    token_core(&ctx, &body)
        .await
        .map(Json)
        .into_response_error()
}

async fn find_or_create_user(
    State(ctx): State<AuthContext>,
    headers: HeaderMap,
) -> Result<Json<User>, StatusCode> {
    find_or_create_from_bearer_core(&ctx, &headers)
        .await
        .map(Json)
        .into_response_error()
}
