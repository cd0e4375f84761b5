//! tableside-api library
//!
//! Backend for a table-service restaurant: QR table ordering, kitchen
//! and waiter dashboards, menu administration, and delegated checkout.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod media;
pub mod migrator;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
}

fn default_page() -> u64 {
    1
}

// Common response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
        }
    }
}

impl ApiResponse<()> {
    /// Success with a human-readable message and no payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            errors: None,
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Assembles every route group. Static image serving and the ambient
/// tower layers are attached in `main`.
pub fn api_routes() -> Router<AppState> {
    // Customer-facing ordering endpoints
    let ordering = Router::new()
        .route("/orders", post(handlers::orders::place_order))
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route("/orders/{id}/status", get(handlers::orders::order_status))
        .route(
            "/orders/{id}/call-waiter",
            post(handlers::orders::call_waiter),
        )
        .route(
            "/orders/{id}/request-bill",
            post(handlers::orders::request_bill),
        );

    // Public browse endpoints
    let browse = Router::new()
        .route("/menu/online", get(handlers::catalog::online_menu))
        .route("/menu/{table_id}", get(handlers::catalog::table_menu))
        .route("/storefront/{page}", get(handlers::catalog::storefront_page))
        .route("/events/upcoming", get(handlers::promotions::upcoming_events))
        .route("/popup", get(handlers::popups::current_popup))
        .route("/check-location", post(handlers::geo::check_location));

    // Checkout delegation
    let checkout = Router::new()
        .route(
            "/checkout/session",
            post(handlers::payments::create_checkout_session),
        )
        .route(
            "/checkout/success",
            get(handlers::payments::checkout_success),
        )
        .route("/checkout/cancel", get(handlers::payments::checkout_cancel))
        .route(
            "/checkout/webhook",
            post(handlers::payments::checkout_webhook),
        );

    // Staff dashboards (capability checks live in the extractors)
    let staff = Router::new()
        .route("/staff/orders/active", get(handlers::orders::active_orders))
        .route(
            "/staff/orders/accepted",
            get(handlers::orders::accepted_orders),
        )
        .route(
            "/staff/orders/history",
            get(handlers::orders::order_history),
        )
        .route(
            "/staff/orders/{id}/accept",
            post(handlers::orders::accept_order),
        )
        .route(
            "/staff/orders/{id}/start-preparation",
            post(handlers::orders::start_preparation),
        )
        .route("/staff/orders/{id}/ready", post(handlers::orders::mark_ready))
        .route(
            "/staff/orders/{id}/complete",
            post(handlers::orders::complete_order),
        )
        .route("/staff/calls", get(handlers::orders::waiter_calls))
        .route(
            "/staff/orders/{id}/dismiss-call",
            post(handlers::orders::dismiss_call),
        )
        .route(
            "/staff/orders/{id}/dismiss-bill",
            post(handlers::orders::dismiss_bill),
        );

    // Administration
    let admin = Router::new()
        .route(
            "/admin/menu-items",
            get(handlers::catalog::list_menu_items).post(handlers::catalog::create_menu_item),
        )
        .route(
            "/admin/menu-items/{id}",
            put(handlers::catalog::update_menu_item)
                .delete(handlers::catalog::delete_menu_item),
        )
        .route(
            "/admin/tables",
            get(handlers::tables::list_tables).put(handlers::tables::set_table_count),
        )
        .route(
            "/admin/events",
            get(handlers::promotions::list_events).post(handlers::promotions::create_event),
        )
        .route(
            "/admin/events/{id}",
            put(handlers::promotions::update_event).delete(handlers::promotions::delete_event),
        )
        .route("/admin/popup", post(handlers::popups::set_popup))
        .route("/admin/popup/toggle", post(handlers::popups::toggle_popup));

    // Staff session endpoints
    let auth = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/me", get(handlers::auth::me));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(ordering)
        .merge(browse)
        .merge(checkout)
        .merge(staff)
        .merge(admin)
        .merge(auth)
}

/// Bare liveness probe; the body carries no semantics.
async fn healthz() -> &'static str {
    "OK"
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "tableside-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
