//! Shared test harness
//!
//! Builds the full router over an in-memory database with scripted
//! collaborators, and drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use http_body_util::BodyExt;
use logicgrid_applications::{
    ActionSuggester, ApplicationError, ApplicationResult, CodeExchanger, SuggestedAction,
    SuggestionResponse, TokenResponse,
};
use logicgrid_core::{AppConfig, FederationSettings, HashingConfig};
use logicgrid_web::{create_app, AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use tower::ServiceExt;

pub const STRONG_PASSWORD: &str = "Sup3r$ecret";
pub const OTHER_PASSWORD: &str = "An0ther!pass";
pub const FEDERATED_EMAIL: &str = "fed@example.com";

static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// Suggester that answers with one column and counts calls
#[derive(Default)]
pub struct ScriptedSuggester {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl ActionSuggester for ScriptedSuggester {
    async fn suggest(&self, _prompt: &str, _protocol: &Value) -> ApplicationResult<SuggestionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApplicationError::Suggestion {
                message: "upstream unavailable".to_string(),
            });
        }
        Ok(SuggestionResponse {
            actions: vec![SuggestedAction::Noop],
        })
    }
}

/// Exchanger that returns an id token for [`FEDERATED_EMAIL`]
#[derive(Default)]
pub struct ScriptedExchanger {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CodeExchanger for ScriptedExchanger {
    async fn exchange(&self, _code: &str) -> ApplicationResult<TokenResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TokenResponse {
            access_token: Some("access".to_string()),
            id_token: Some(id_token(FEDERATED_EMAIL)),
            token_type: Some("Bearer".to_string()),
        })
    }
}

/// Unsigned three-part token carrying `email`
pub fn id_token(email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let claims = URL_SAFE_NO_PAD.encode(json!({ "email": email }).to_string());
    format!("{}.{}.sig", header, claims)
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.hashing = HashingConfig::fast();
    config
}

pub fn federation_settings() -> FederationSettings {
    FederationSettings {
        domain: "idp.example.com".to_string(),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: "http://localhost:8080/oauth/callback".to_string(),
        post_logout_redirect_uri: "http://localhost:8080/".to_string(),
    }
}

/// Router plus handles on its scripted collaborators
pub struct TestApp {
    pub router: Router,
    pub suggester: Arc<ScriptedSuggester>,
    pub exchanger: Arc<ScriptedExchanger>,
}

impl TestApp {
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookies: HashMap::new(),
        }
    }

    /// Client logged in as a freshly signed-up account
    pub async fn signed_up(&self, email: &str) -> TestClient {
        let mut client = self.client();
        let response = client
            .post("/signup", json!({ "email": email, "password": STRONG_PASSWORD }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "signup failed: {}", response.body);
        client
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    LazyLock::force(&TRACING);

    let mut config = test_config();
    configure(&mut config);

    let suggester = Arc::new(ScriptedSuggester::default());
    let exchanger = Arc::new(ScriptedExchanger::default());

    let state = AppState::with_collaborators(
        config,
        suggester.clone(),
        Some(exchanger.clone() as Arc<dyn CodeExchanger>),
    )
    .await
    .expect("Failed to build application state");

    TestApp {
        router: create_app(state),
        suggester,
        exchanger,
    }
}

/// Collected response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }
}

/// Browser-like client that replays cookies it was given
pub struct TestClient {
    router: Router,
    cookies: HashMap<String, String>,
}

impl TestClient {
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    /// Send a hand-built request; stored cookies are not attached
    pub async fn send_request(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        let response = TestResponse {
            status,
            headers,
            body,
        };
        self.store_cookies(&response);
        response
    }

    fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Some(pairs.join("; "))
    }

    fn store_cookies(&mut self, response: &TestResponse) {
        for raw in response.set_cookies() {
            let (name, value, expired) = parse_set_cookie(raw);
            if value.is_empty() || expired {
                self.cookies.remove(&name);
            } else {
                self.cookies.insert(name, value);
            }
        }
    }
}

/// Name, value and whether the cookie is being removed
pub fn parse_set_cookie(raw: &str) -> (String, String, bool) {
    let mut segments = raw.split(';').map(str::trim);
    let (name, value) = segments
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .unwrap_or_default();
    let expired = segments.any(|attr| attr.eq_ignore_ascii_case("Max-Age=0"));
    (name, value, expired)
}
