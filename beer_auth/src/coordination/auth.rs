use http::HeaderMap;
use http::header::AUTHORIZATION;

use crate::oauth2::{
    PLATFORM_HEADER, Platform, ProviderClient, VerifiedToken, extract_identity, generate_state,
    state_matches,
};
use crate::userdb::User;
use crate::utils::{CookieSpec, header_set_cookie};

use super::context::AuthContext;
use super::errors::CoordinationError;
use super::reconcile::reconcile_identity;
use super::types::{CallbackQuery, ConsentUrlResponse, TokenRequest, TokenResponse};

/// Consent URL for native clients, which keep the unbound `state` themselves.
pub fn consent_url_core(ctx: &AuthContext) -> Result<ConsentUrlResponse, CoordinationError> {
    let state = generate_state()?;
    let url = ctx.provider.build_consent_url(&state, true)?;
    Ok(ConsentUrlResponse { url })
}

/// Browser login: binds a fresh `state` to a cookie and returns the redirect target.
pub fn login_core(ctx: &AuthContext) -> Result<(HeaderMap, String), CoordinationError> {
    let state = generate_state()?;
    let url = ctx.provider.build_consent_url(&state, false)?;

    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        &CookieSpec {
            name: &ctx.config.state_cookie_name,
            value: &state,
            max_age: ctx.config.state_cookie_max_age,
            secure: ctx.config.secure_cookies,
        },
    )?;

    Ok((headers, url))
}

/// Exchange the code in a `{"code": ...}` body for the provider's ID token.
pub async fn token_core(ctx: &AuthContext, body: &[u8]) -> Result<TokenResponse, CoordinationError> {
    let request: TokenRequest = serde_json::from_slice(body)
        .map_err(|e| CoordinationError::DecodeRequest(e.to_string()).log())?;

    let token = redeem_code(ctx, &request.code).await?;
    Ok(TokenResponse { token })
}

/// Provider redirect target. The returned `state` must match the cookie set by [`login_core`].
///
/// On success the state cookie is cleared so it cannot be replayed.
pub async fn callback_core(
    ctx: &AuthContext,
    query: &CallbackQuery,
    cookie_state: Option<&str>,
) -> Result<(HeaderMap, TokenResponse), CoordinationError> {
    if !state_matches(&query.state, cookie_state.unwrap_or_default()) {
        return Err(CoordinationError::InvalidState(format!(
            "state does not match {} cookie",
            ctx.config.state_cookie_name
        ))
        .log());
    }

    let token = redeem_code(ctx, &query.code).await?;

    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        &CookieSpec {
            name: &ctx.config.state_cookie_name,
            value: "",
            max_age: 0,
            secure: ctx.config.secure_cookies,
        },
    )?;

    Ok((headers, TokenResponse { token }))
}

/// Resolve the caller's bearer ID token to a local user, creating it on first sight.
pub async fn find_or_create_from_bearer_core(
    ctx: &AuthContext,
    headers: &HeaderMap,
) -> Result<User, CoordinationError> {
    let verified = verify_bearer_core(ctx, headers)
        .await
        .map_err(CoordinationError::log)?;
    let identity = extract_identity(&verified)?;
    reconcile_identity(ctx, &identity).await
}

/// Verify the `Authorization: Bearer` ID token against the client id of the caller's platform.
///
/// Errors are returned without being logged.
pub async fn verify_bearer_core(
    ctx: &AuthContext,
    headers: &HeaderMap,
) -> Result<VerifiedToken, CoordinationError> {
    let platform = Platform::from_header(
        headers
            .get(PLATFORM_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    let client_id = ctx.provider.client_id_for(platform);
    tracing::debug!(%platform, client_id, "Verifying bearer token");

    let raw = bearer_token(headers).ok_or(CoordinationError::MissingBearer)?;
    ctx.provider
        .verify(raw, client_id)
        .await
        .map_err(CoordinationError::OAuth2)
}

/// Code → token → verified identity → local user. Returns the raw ID token.
async fn redeem_code(ctx: &AuthContext, code: &str) -> Result<String, CoordinationError> {
    if code.is_empty() {
        return Err(CoordinationError::DecodeRequest("code is empty".to_string()).log());
    }

    let token = ctx.provider.exchange_code(code).await?;
    let raw_id_token = ProviderClient::extract_id_token(&token)?;
    let verified = ctx
        .provider
        .verify(&raw_id_token, ctx.provider.default_client_id())
        .await?;
    let identity = extract_identity(&verified)?;
    let user = reconcile_identity(ctx, &identity).await?;
    tracing::debug!(user_id = %user.id, "Authorization code redeemed");

    Ok(raw_id_token)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}
