//! Axum-based mock OpenID provider
//!
//! Serves discovery, a token endpoint and an HS256 key set on an ephemeral port.
//! Authorization codes must be registered up front; each one is single use.

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

pub const MOCK_KID: &str = "mock_key_id";
pub const MOCK_SECRET: &[u8] = b"mock_provider_secret";

pub const WEB_CLIENT_ID: &str = "web-client.apps.example.com";
pub const ANDROID_CLIENT_ID: &str = "android-client.apps.example.com";
pub const CLIENT_SECRET: &str = "mock-client-secret";

#[derive(Clone, Default)]
struct MockState {
    base_url: String,
    /// code -> subject
    codes: Arc<Mutex<HashMap<String, String>>>,
    issued: Arc<Mutex<Vec<String>>>,
    jwks_fetches: Arc<AtomicUsize>,
    /// Issuer advertised by discovery when it differs from `base_url`.
    advertised_issuer: Option<String>,
}

pub struct MockProvider {
    pub base_url: String,
    state: MockState,
}

impl MockProvider {
    pub async fn start() -> Self {
        Self::start_with(None).await
    }

    /// Start a provider whose discovery document names `issuer` instead of its own URL.
    pub async fn start_advertising_issuer(issuer: &str) -> Self {
        Self::start_with(Some(issuer.to_string())).await
    }

    async fn start_with(advertised_issuer: Option<String>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock provider");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = MockState {
            base_url: base_url.clone(),
            advertised_issuer,
            ..Default::default()
        };

        let app = Router::new()
            .route("/.well-known/openid-configuration", get(discovery))
            .route("/token", post(token))
            .route("/certs", get(jwks))
            .with_state(state.clone());

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock provider stopped: {e}");
            }
        });

        Self { base_url, state }
    }

    /// Make `code` redeemable once for an ID token about `subject`.
    pub fn register_code(&self, code: &str, subject: &str) {
        self.state
            .codes
            .lock()
            .unwrap()
            .insert(code.to_string(), subject.to_string());
    }

    /// ID tokens handed out by the token endpoint, oldest first.
    pub fn issued_tokens(&self) -> Vec<String> {
        self.state.issued.lock().unwrap().clone()
    }

    /// Number of requests served by the key set endpoint.
    pub fn jwks_fetch_count(&self) -> usize {
        self.state.jwks_fetches.load(Ordering::SeqCst)
    }

    pub fn sign_id_token(&self, subject: &str, audience: &str) -> String {
        sign_id_token(&self.base_url, subject, audience)
    }

    /// Token signed with the provider secret but naming a key the provider never published.
    pub fn sign_id_token_with_kid(&self, subject: &str, audience: &str, kid: &str) -> String {
        sign_with_kid(&self.base_url, subject, audience, kid)
    }
}

pub fn sign_id_token(issuer: &str, subject: &str, audience: &str) -> String {
    sign_with_kid(issuer, subject, audience, MOCK_KID)
}

fn sign_with_kid(issuer: &str, subject: &str, audience: &str, kid: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = json!({
        "iss": issuer,
        "sub": subject,
        "aud": audience,
        "iat": now,
        "exp": now + 3600,
        "email": format!("{subject}@example.com"),
        "name": "Test User",
        "picture": "https://example.com/photo.jpg"
    });

    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(kid.to_string());
    encode(&header, &claims, &EncodingKey::from_secret(MOCK_SECRET)).unwrap()
}

async fn discovery(State(state): State<MockState>) -> Json<Value> {
    let base = &state.base_url;
    let issuer = state.advertised_issuer.as_deref().unwrap_or(base);
    Json(json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{base}/auth"),
        "token_endpoint": format!("{base}/token"),
        "jwks_uri": format!("{base}/certs"),
        "id_token_signing_alg_values_supported": ["HS256"]
    }))
}

async fn token(
    State(state): State<MockState>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    if params.get("grant_type").map(String::as_str) != Some("authorization_code")
        || params.get("client_secret").map(String::as_str) != Some(CLIENT_SECRET)
    {
        return Err(StatusCode::BAD_REQUEST);
    }
    let client_id = params.get("client_id").ok_or(StatusCode::BAD_REQUEST)?;
    let code = params.get("code").ok_or(StatusCode::BAD_REQUEST)?;

    let subject = state
        .codes
        .lock()
        .unwrap()
        .remove(code)
        .ok_or(StatusCode::BAD_REQUEST)?;

    let id_token = sign_id_token(&state.base_url, &subject, client_id);
    state.issued.lock().unwrap().push(id_token.clone());

    Ok(Json(json!({
        "access_token": "mock_access_token",
        "id_token": id_token,
        "token_type": "Bearer",
        "expires_in": 3600
    })))
}

async fn jwks(State(state): State<MockState>) -> Json<Value> {
    state.jwks_fetches.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "keys": [{
            "kty": "oct",
            "kid": MOCK_KID,
            "alg": "HS256",
            "k": URL_SAFE_NO_PAD.encode(MOCK_SECRET)
        }]
    }))
}
