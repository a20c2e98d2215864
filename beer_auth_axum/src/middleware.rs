use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use beer_auth::{AuthContext, verify_bearer_core};

/// Rejects requests without a valid bearer ID token with a bare 401.
///
/// On success the [`beer_auth::VerifiedToken`] is stored in the request extensions.
pub async fn require_bearer(
    State(ctx): State<AuthContext>,
    mut req: Request,
    next: Next,
) -> Response {
    match verify_bearer_core(&ctx, req.headers()).await {
        Ok(verified) => {
            tracing::debug!(subject = %verified.subject, "Bearer token accepted");
            req.extensions_mut().insert(verified);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Bearer token rejected");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}
