use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders::{OrderService, PlaceOrderRequest, PlacedOrder},
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Everything the provider needs to open a hosted checkout page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Amount in minor units (grosze)
    pub amount_minor: i64,
    pub currency: String,
    /// Line shown on the provider's payment page
    pub label: String,
    /// Opaque payload echoed back on completion
    pub metadata: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSession {
    pub id: String,
    /// Hosted page the customer is redirected to
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSessionStatus {
    pub paid: bool,
    #[serde(default)]
    pub metadata: Value,
}

/// Third-party checkout provider. The wire protocol behind this trait
/// is not this crate's concern; tests substitute their own impl.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<ProviderSession, ServiceError>;

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<ProviderSessionStatus, ServiceError>;
}

/// HTTP-backed provider client.
pub struct HttpPaymentProvider {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl HttpPaymentProvider {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }
}

#[async_trait]
impl PaymentProvider for HttpPaymentProvider {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<ProviderSession, ServiceError> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("checkout provider: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "checkout provider returned {}",
                response.status()
            )));
        }

        response
            .json::<ProviderSession>()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("checkout provider: {e}")))
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<ProviderSessionStatus, ServiceError> {
        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.base_url, session_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("checkout provider: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "checkout provider returned {}",
                response.status()
            )));
        }

        response
            .json::<ProviderSessionStatus>()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("checkout provider: {e}")))
    }
}

/// Stand-in used when no provider is configured; every call fails with
/// a gateway error so the rest of the app keeps working.
pub struct UnconfiguredPaymentProvider;

#[async_trait]
impl PaymentProvider for UnconfiguredPaymentProvider {
    async fn create_session(
        &self,
        _request: CreateSessionRequest,
    ) -> Result<ProviderSession, ServiceError> {
        Err(ServiceError::ExternalServiceError(
            "checkout provider is not configured".to_string(),
        ))
    }

    async fn retrieve_session(
        &self,
        _session_id: &str,
    ) -> Result<ProviderSessionStatus, ServiceError> {
        Err(ServiceError::ExternalServiceError(
            "checkout provider is not configured".to_string(),
        ))
    }
}

/// Cart contents carried through the provider as session metadata and
/// turned into an order once payment completes.
pub type CartCheckout = PlaceOrderRequest;

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: Option<String>,
}

/// Delegates payment to the configured provider and places the order
/// when the provider confirms the session is paid.
#[derive(Clone)]
pub struct CheckoutService {
    provider: Arc<dyn PaymentProvider>,
    orders: Arc<OrderService>,
    event_sender: Option<Arc<EventSender>>,
    currency: String,
}

impl CheckoutService {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        orders: Arc<OrderService>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            provider,
            orders,
            event_sender,
            currency: "pln".to_string(),
        }
    }

    fn minor_units(amount: Decimal) -> Result<i64, ServiceError> {
        use rust_decimal::prelude::ToPrimitive;

        (amount * Decimal::from(100))
            .round()
            .to_i64()
            .ok_or_else(|| ServiceError::InternalError("Order total out of range".to_string()))
    }

    /// Opens a provider session for an already-placed order (pay at the
    /// table after eating).
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn create_session_for_order(
        &self,
        order_id: uuid::Uuid,
    ) -> Result<CheckoutSessionResponse, ServiceError> {
        let order = self.orders.get_order(order_id).await?;

        let session = self
            .provider
            .create_session(CreateSessionRequest {
                amount_minor: Self::minor_units(order.total_price)?,
                currency: self.currency.clone(),
                label: format!("Order #{}", order.order_number),
                metadata: serde_json::json!({ "order_id": order.order_id }),
            })
            .await?;

        Ok(CheckoutSessionResponse {
            session_id: session.id,
            url: session.url,
        })
    }

    /// Opens a provider session for a prepaid cart (online ordering).
    /// The cart rides along as session metadata; the order is only
    /// created once the payment completes.
    #[instrument(skip(self, cart), fields(lines = cart.items.len()))]
    pub async fn create_session_for_cart(
        &self,
        cart: CartCheckout,
    ) -> Result<CheckoutSessionResponse, ServiceError> {
        let total = self.orders.price_items(&cart.items).await?;
        if total <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Cart has no payable items".to_string(),
            ));
        }

        let metadata = serde_json::to_value(&cart)
            .map_err(|e| ServiceError::InternalError(format!("cart encoding failed: {e}")))?;

        let session = self
            .provider
            .create_session(CreateSessionRequest {
                amount_minor: Self::minor_units(total)?,
                currency: self.currency.clone(),
                label: "Online order".to_string(),
                metadata,
            })
            .await?;

        Ok(CheckoutSessionResponse {
            session_id: session.id,
            url: session.url,
        })
    }

    /// Completion callback: verifies the session is paid, then places
    /// the order carried in the session metadata.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn complete(&self, session_id: &str) -> Result<PlacedOrder, ServiceError> {
        let status = self.provider.retrieve_session(session_id).await?;

        if !status.paid {
            warn!("payment session not paid");
            return Err(ServiceError::InvalidOperation(
                "Payment has not been completed".to_string(),
            ));
        }

        let cart: CartCheckout = serde_json::from_value(status.metadata).map_err(|e| {
            ServiceError::ExternalServiceError(format!("session metadata unreadable: {e}"))
        })?;

        let placed = self.orders.place_order(cart).await?;

        info!(order_id = %placed.order_id, "paid order placed");
        if let Some(sender) = &self.event_sender {
            sender
                .send_logged(Event::PaymentCompleted {
                    session_id: session_id.to_string(),
                    order_id: placed.order_id,
                })
                .await;
        }

        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn minor_units_rounds_to_grosze() {
        assert_eq!(CheckoutService::minor_units(dec!(49.99)).unwrap(), 4999);
        assert_eq!(CheckoutService::minor_units(dec!(10)).unwrap(), 1000);
        assert_eq!(CheckoutService::minor_units(dec!(0.005)).unwrap(), 1);
    }
}
