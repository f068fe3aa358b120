//! Shared test helpers: an in-process mock auth API and a wired session.

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use portal_auth::rbac::{RoutePermissionGate, RoutePolicy};
use portal_auth::session::{CredentialPair, CredentialStore, RenewalCoordinator, SessionManager};
use portal_client::HttpAuthClient;
use portal_core::config::{ApiConfig, RenewalConfig};
use portal_core::traits::{AccessTokenSource, CredentialStorage};
use portal_storage::audit::MemoryAuditSink;
use portal_storage::memory::MemoryCredentialStorage;

/// Builds an unsigned token for `sub` expiring `secs` from now.
pub fn token_expiring_in(sub: &str, secs: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = json!({
        "sub": sub,
        "type": "access",
        "iat": chrono::Utc::now().timestamp(),
        "exp": chrono::Utc::now().timestamp() + secs,
    });
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{header}.{body}.signature")
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Scripted behavior and recorded traffic of the mock API.
#[derive(Debug)]
pub struct MockState {
    pub refresh_calls: AtomicUsize,
    pub refresh_status: AtomicU16,
    pub refresh_tokens_seen: Mutex<Vec<String>>,
    pub permission_calls: AtomicUsize,
    pub permission_status: AtomicU16,
    pub grant: AtomicBool,
    pub permission_requests: Mutex<Vec<Value>>,
    pub bearer_seen: Mutex<Vec<Option<String>>>,
    pub logout_calls: AtomicUsize,
    pub logout_status: AtomicU16,
    pub logout_tokens_seen: Mutex<Vec<String>>,
    pub delay_ms: AtomicU64,
    pub rotation: AtomicUsize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            refresh_status: AtomicU16::new(200),
            refresh_tokens_seen: Mutex::new(Vec::new()),
            permission_calls: AtomicUsize::new(0),
            permission_status: AtomicU16::new(200),
            grant: AtomicBool::new(true),
            permission_requests: Mutex::new(Vec::new()),
            bearer_seen: Mutex::new(Vec::new()),
            logout_calls: AtomicUsize::new(0),
            logout_status: AtomicU16::new(200),
            logout_tokens_seen: Mutex::new(Vec::new()),
            delay_ms: AtomicU64::new(0),
            rotation: AtomicUsize::new(0),
        }
    }
}

impl MockState {
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn permission_calls(&self) -> usize {
        self.permission_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    async fn pause(&self) {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

fn status(code: &AtomicU16) -> StatusCode {
    StatusCode::from_u16(code.load(Ordering::SeqCst)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let refresh_token = body["refresh_token"].as_str().unwrap_or_default().to_string();
    state
        .refresh_tokens_seen
        .lock()
        .unwrap()
        .push(refresh_token);
    state.pause().await;

    let code = status(&state.refresh_status);
    if !code.is_success() {
        return (code, Json(json!({ "detail": "refresh rejected" }))).into_response();
    }

    let n = state.rotation.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "access_token": token_expiring_in("user-1", 3_600),
        "refresh_token": format!("refresh-rotated-{n}"),
        "token_type": "bearer",
        "expires_in": 3_600,
        "refresh_expires_in": 86_400,
    }))
    .into_response()
}

async fn logout(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    let refresh_token = body["refresh_token"].as_str().unwrap_or_default().to_string();
    state.logout_tokens_seen.lock().unwrap().push(refresh_token);

    let code = status(&state.logout_status);
    (code, Json(json!({ "message": "ok" }))).into_response()
}

async fn check(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.permission_calls.fetch_add(1, Ordering::SeqCst);
    state.bearer_seen.lock().unwrap().push(bearer(&headers));
    state.permission_requests.lock().unwrap().push(body);
    state.pause().await;

    let code = status(&state.permission_status);
    if !code.is_success() {
        return (code, Json(json!({ "detail": "permission service down" }))).into_response();
    }
    Json(json!({ "has_access": state.grant.load(Ordering::SeqCst) })).into_response()
}

/// Mock auth API served on an ephemeral local port.
pub struct MockAuthServer {
    pub base_url: String,
    pub state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockAuthServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/auth/refresh", post(refresh))
            .route("/api/auth/logout", post(logout))
            .route("/api/route-permissions/check", post(check))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            handle,
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout_seconds: 1,
            ..ApiConfig::default()
        }
    }
}

impl Drop for MockAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A session wired against a mock API.
pub struct TestContext {
    pub server: MockAuthServer,
    pub storage: Arc<dyn CredentialStorage>,
    pub session: Arc<SessionManager>,
    pub audit: Arc<MemoryAuditSink>,
    pub coordinator: Arc<RenewalCoordinator>,
    pub gate: RoutePermissionGate,
}

impl TestContext {
    pub async fn new() -> Self {
        let storage: Arc<dyn CredentialStorage> = Arc::new(MemoryCredentialStorage::new());
        Self::with_storage(storage).await
    }

    pub async fn with_storage(storage: Arc<dyn CredentialStorage>) -> Self {
        let server = MockAuthServer::start().await;
        let store = CredentialStore::load(storage.clone(), "")
            .await
            .expect("load store");

        let client = Arc::new(HttpAuthClient::new(server.api_config()).expect("client"));
        let session = Arc::new(
            SessionManager::new(Arc::new(store), RenewalConfig::default())
                .with_logout_endpoint(client.clone()),
        );
        let source: Weak<dyn AccessTokenSource> = Arc::downgrade(&session) as Weak<SessionManager>;
        client.bind_token_source(source);

        let audit = Arc::new(MemoryAuditSink::default());
        let coordinator = Arc::new(RenewalCoordinator::new(
            session.clone(),
            client.clone(),
            audit.clone(),
            RenewalConfig::default(),
        ));
        let gate = RoutePermissionGate::new(
            session.clone(),
            client,
            audit.clone(),
            RoutePolicy::default(),
        );

        Self {
            server,
            storage,
            session,
            audit,
            coordinator,
            gate,
        }
    }

    /// Seeds a pair whose access token expires in `access_secs`.
    pub async fn seed(&self, access_secs: i64, refresh_in_ms: i64) -> CredentialPair {
        let pair = CredentialPair {
            access_token: token_expiring_in("user-1", access_secs),
            refresh_token: "refresh-1".to_string(),
            access_expires_at: now_ms() + access_secs * 1000,
            refresh_expires_at: now_ms() + refresh_in_ms,
        };
        self.session
            .store()
            .set(pair.clone())
            .await
            .expect("seed credentials");
        pair
    }
}
