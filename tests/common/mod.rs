#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tableside_api::{
    config::AppConfig,
    db::{self, DbConfig},
    errors::ServiceError,
    events::{self, EventSender},
    handlers::AppServices,
    services::checkout::{
        CreateSessionRequest, PaymentProvider, ProviderSession, ProviderSessionStatus,
    },
    AppState,
};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// In-memory stand-in for the checkout provider. Sessions start unpaid
/// and tests flip them with `mark_paid`.
#[derive(Default)]
pub struct MockPaymentProvider {
    counter: AtomicUsize,
    sessions: Mutex<HashMap<String, ProviderSessionStatus>>,
}

impl MockPaymentProvider {
    pub fn mark_paid(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.get_mut(session_id) {
            session.paid = true;
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<ProviderSession, ServiceError> {
        let id = format!("cs_test_{}", self.counter.fetch_add(1, Ordering::SeqCst));
        self.sessions.lock().unwrap().insert(
            id.clone(),
            ProviderSessionStatus {
                paid: false,
                metadata: request.metadata,
            },
        );
        Ok(ProviderSession {
            id,
            url: Some("https://pay.example.test/session".to_string()),
        })
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<ProviderSessionStatus, ServiceError> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| ServiceError::ExternalServiceError("unknown session".to_string()))
    }
}

/// Application harness over an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub provider: Arc<MockPaymentProvider>,
    admin_token: String,
    employee_token: String,
    _event_task: tokio::task::JoinHandle<()>,
    _upload_dir: TempDir,
}

impl TestApp {
    /// Harness with a seeded admin and employee account.
    pub async fn new() -> Self {
        Self::build(true).await
    }

    /// Harness with an empty users table (first-run scenarios).
    pub async fn new_unseeded() -> Self {
        Self::build(false).await
    }

    async fn build(seed_staff: bool) -> Self {
        let upload_dir = TempDir::new().expect("create upload dir");

        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.upload_dir = upload_dir.path().to_string_lossy().to_string();
        cfg.payment_webhook_secret = Some("whsec_test".to_string());

        // A single connection keeps the in-memory database alive and shared.
        let db_cfg = DbConfig {
            url: cfg.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let provider = Arc::new(MockPaymentProvider::default());

        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(event_sender.clone()),
            provider.clone(),
            &cfg,
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services: services.clone(),
        };

        let (admin_token, employee_token) = if seed_staff {
            let admin = services
                .auth
                .register(tableside_api::auth::RegisterRequest {
                    username: "admin".to_string(),
                    password: "correct-horse-battery".to_string(),
                    is_admin: true,
                    is_employee: false,
                })
                .await
                .expect("seed admin");
            let employee = services
                .auth
                .register(tableside_api::auth::RegisterRequest {
                    username: "waiter".to_string(),
                    password: "correct-horse-battery".to_string(),
                    is_admin: false,
                    is_employee: true,
                })
                .await
                .expect("seed employee");

            (
                services.auth.issue_token(&admin).expect("admin token"),
                services.auth.issue_token(&employee).expect("employee token"),
            )
        } else {
            (String::new(), String::new())
        };

        let router = tableside_api::api_routes().with_state(state.clone());

        Self {
            router,
            state,
            provider,
            admin_token,
            employee_token,
            _event_task: event_task,
            _upload_dir: upload_dir,
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    pub fn employee_token(&self) -> &str {
        &self.employee_token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Raw request with caller-controlled headers and body bytes.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::from(body)).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seeds a menu item through the catalog service.
    pub async fn seed_menu_item(
        &self,
        name: &str,
        category: &str,
        price: Decimal,
    ) -> tableside_api::entities::menu_item::Model {
        self.state
            .services
            .catalog
            .create_item(tableside_api::services::catalog::CreateMenuItemRequest {
                name: name.to_string(),
                description: format!("{name} seeded for tests"),
                price,
                category: category.to_string(),
                customizable: false,
                contains_alcohol: false,
                display_date: None,
                image_filename: None,
            })
            .await
            .expect("seed menu item")
    }

    /// Seeds `count` dining tables.
    pub async fn seed_tables(&self, count: i32) {
        self.state
            .services
            .tables
            .set_table_count(count)
            .await
            .expect("seed tables");
    }
}

/// Parses a decimal JSON field regardless of the scale it was
/// serialized with.
pub fn decimal_field(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("not a decimal value: {other:?}"),
    }
}

/// Reads a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}

/// Asserts the status and returns the parsed body.
pub async fn expect_json(response: axum::response::Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status, "unexpected response status");
    body_json(response).await
}
