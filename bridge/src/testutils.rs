use crate::credentials::{CredentialError, CredentialStore};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::routing::get;
use crm::types::Credentials;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;

/// Wraps a credential store and counts resolutions, for asserting that
/// validation failures never reach the store.
pub struct CountingStore<S> {
    inner: S,
    pub calls: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        CountingStore {
            inner,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<S: CredentialStore> CredentialStore for CountingStore<S> {
    async fn resolve(&self, tenant_id: &str) -> Result<Credentials, CredentialError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(tenant_id).await
    }
}

#[derive(Clone)]
struct CannedResponses {
    search: (StatusCode, Value),
    create: (StatusCode, Value),
    search_calls: Arc<AtomicUsize>,
    create_calls: Arc<AtomicUsize>,
}

/// A mock CRM contact API bound on a random local port, with per-endpoint
/// canned responses and call counters.
pub struct MockCrm {
    pub base_url: String,
    pub search_calls: Arc<AtomicUsize>,
    pub create_calls: Arc<AtomicUsize>,
}

pub struct MockCrmBuilder {
    search: (StatusCode, Value),
    create: (StatusCode, Value),
}

impl MockCrm {
    pub fn builder() -> MockCrmBuilder {
        MockCrmBuilder {
            search: (StatusCode::OK, serde_json::json!({"contacts": []})),
            create: (
                StatusCode::OK,
                serde_json::json!({"contact": {"id": "created"}}),
            ),
        }
    }
}

impl MockCrmBuilder {
    pub fn search(mut self, body: Value) -> Self {
        self.search = (StatusCode::OK, body);
        self
    }

    pub fn search_status(mut self, status: StatusCode, body: Value) -> Self {
        self.search = (status, body);
        self
    }

    pub fn create(mut self, status: StatusCode, body: Value) -> Self {
        self.create = (status, body);
        self
    }

    pub async fn start(self) -> MockCrm {
        let canned = CannedResponses {
            search: self.search,
            create: self.create,
            search_calls: Arc::new(AtomicUsize::new(0)),
            create_calls: Arc::new(AtomicUsize::new(0)),
        };
        let search_calls = canned.search_calls.clone();
        let create_calls = canned.create_calls.clone();

        let app = Router::new()
            .route(
                "/contacts/",
                get(|State(canned): State<CannedResponses>| async move {
                    canned.search_calls.fetch_add(1, Ordering::SeqCst);
                    let (status, body) = canned.search.clone();
                    (status, axum::Json(body))
                })
                .post(|State(canned): State<CannedResponses>| async move {
                    canned.create_calls.fetch_add(1, Ordering::SeqCst);
                    let (status, body) = canned.create.clone();
                    (status, axum::Json(body))
                }),
            )
            .with_state(canned);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockCrm {
            base_url: format!("http://{addr}"),
            search_calls,
            create_calls,
        }
    }
}

/// Build a JSON POST to the tool endpoint.
pub fn post_json(body: Value) -> Request<Body> {
    Request::post("/tools/find_or_create_contact")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect a response body into bytes.
pub async fn read_body(response: Response<Body>) -> axum::body::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Collect a response body and parse it as JSON.
pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = read_body(response).await;
    serde_json::from_slice(&bytes).unwrap()
}
