use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::checkout::{CartCheckout, CheckoutSessionResponse};
use crate::services::orders::PlacedOrder;
use crate::{errors::ServiceError, ApiResponse, AppState};

type HmacSha256 = Hmac<Sha256>;

/// Either an existing order to pay for, or a cart that becomes an
/// order once payment completes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CheckoutSessionRequest {
    Order { order_id: Uuid },
    Cart(CartCheckout),
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

/// POST /checkout/session
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutSessionRequest>,
) -> Result<Json<ApiResponse<CheckoutSessionResponse>>, ServiceError> {
    let session = match request {
        CheckoutSessionRequest::Order { order_id } => {
            state
                .services
                .checkout
                .create_session_for_order(order_id)
                .await?
        }
        CheckoutSessionRequest::Cart(cart) => {
            state.services.checkout.create_session_for_cart(cart).await?
        }
    };

    Ok(Json(ApiResponse::success(session)))
}

/// GET /checkout/success?session_id= — the provider redirects the
/// customer here; the paid cart becomes a real order.
pub async fn checkout_success(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<ApiResponse<PlacedOrder>>, ServiceError> {
    let placed = state.services.checkout.complete(&query.session_id).await?;
    Ok(Json(ApiResponse::success(placed)))
}

/// GET /checkout/cancel
pub async fn checkout_cancel() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Payment was cancelled"))
}

/// POST /checkout/webhook — signed provider notification; completes
/// the session server-to-server when the redirect never lands.
pub async fn checkout_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(secret) = state.config.payment_webhook_secret.clone() {
        let tolerance = state.config.payment_webhook_tolerance_secs.unwrap_or(300);
        if !verify_signature(&headers, &body, &secret, tolerance) {
            warn!("payment webhook signature verification failed");
            return Err(ServiceError::Unauthorized(
                "invalid webhook signature".to_string(),
            ));
        }
    }

    let json: Value = serde_json::from_slice(&body)
        .map_err(|e| ServiceError::ValidationError(format!("invalid json: {e}")))?;

    let event_type = json.get("type").and_then(|v| v.as_str()).unwrap_or("");
    match event_type {
        "checkout.session.completed" | "payment.succeeded" => {
            let session_id = json
                .get("session_id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    ServiceError::ValidationError("notification is missing session_id".to_string())
                })?;
            let placed = state.services.checkout.complete(session_id).await?;
            info!(order_id = %placed.order_id, "webhook-completed payment");
        }
        other => {
            info!(event_type = %other, "unhandled payment notification type");
        }
    }

    Ok((StatusCode::OK, "ok"))
}

/// Generic HMAC scheme: `x-timestamp` and `x-signature` headers, the
/// signature being hex HMAC-SHA256 over `"{timestamp}.{body}"`.
fn verify_signature(headers: &HeaderMap, payload: &Bytes, secret: &str, tolerance_secs: u64) -> bool {
    let (Some(ts), Some(sig)) = (headers.get("x-timestamp"), headers.get("x-signature")) else {
        return false;
    };
    let (Ok(ts), Ok(sig)) = (ts.to_str(), sig.to_str()) else {
        return false;
    };

    if let Ok(ts_i) = ts.parse::<i64>() {
        let now = chrono::Utc::now().timestamp();
        if (now - ts_i).unsigned_abs() > tolerance_secs {
            return false;
        }
    } else {
        return false;
    }

    let signed = format!("{}.{}", ts, std::str::from_utf8(payload).unwrap_or(""));
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(signed.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    constant_time_eq(&expected, sig)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}
