pub mod mock_provider;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
};
use beer_auth::{
    AuthConfig, AuthContext, BroadcastNotifier, InMemoryUserStore, Message, OAuth2Config,
    PlatformClientIds, ProviderEndpoints,
};
use beer_auth_axum::beer_auth_router;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use tower::ServiceExt;

pub use mock_provider::{ANDROID_CLIENT_ID, CLIENT_SECRET, MockProvider, WEB_CLIENT_ID};

pub const ORIGIN: &str = "https://beer.example.com";

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserStore>,
    pub events: Receiver<Message>,
    pub provider: MockProvider,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

pub async fn spawn_app() -> TestApp {
    let provider = MockProvider::start().await;
    let base = provider.base_url.clone();

    let oauth2 = OAuth2Config {
        client_ids: PlatformClientIds {
            web: WEB_CLIENT_ID.to_string(),
            android: Some(ANDROID_CLIENT_ID.to_string()),
            ios: None,
        },
        client_secret: CLIENT_SECRET.to_string(),
        redirect_uri: format!("{ORIGIN}/auth/google/callback"),
        scope: "openid email profile".to_string(),
        endpoints: ProviderEndpoints {
            auth_url: format!("{base}/auth"),
            token_url: format!("{base}/token"),
            jwks_url: format!("{base}/certs"),
            issuer: base.clone(),
        },
    };

    let users = Arc::new(InMemoryUserStore::new());
    let notifier = Arc::new(BroadcastNotifier::default());
    let events = notifier.subscribe();
    let ctx = AuthContext::new(
        Arc::new(AuthConfig::new(ORIGIN, oauth2)),
        users.clone(),
        notifier,
    )
    .expect("auth context");

    TestApp {
        router: beer_auth_router(ctx),
        users,
        events,
        provider,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Next notification, if one arrives shortly.
    pub async fn next_event(&mut self) -> Option<Message> {
        tokio::time::timeout(Duration::from_millis(300), self.events.recv())
            .await
            .ok()
            .and_then(Result::ok)
    }
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_bearer(uri: &str, token: &str, platform: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"));
    if let Some(platform) = platform {
        builder = builder.header("platform", platform);
    }
    builder.body(Body::empty()).unwrap()
}

/// Value of `key` in the query string of `url`. Values here are never percent-encoded.
pub fn query_value(url: &str, key: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}
