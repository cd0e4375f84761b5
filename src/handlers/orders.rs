use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::EmployeeUser;
use crate::services::orders::{
    BillRequest, OrderDetail, OrderHistoryPage, OrderStatusView, OrderSummary, PlaceOrderRequest,
    PlacedOrder, WaiterCall,
};
use crate::{errors::ServiceError, ApiResponse, AppState, ListQuery};

#[derive(Debug, Deserialize)]
pub struct AcceptOrderRequest {
    /// Expected realization time in minutes
    pub realization_time: i64,
}

#[derive(Debug, Deserialize)]
pub struct RequestBillBody {
    pub payment_method: String,
    #[serde(default)]
    pub invoice_required: bool,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub tip: Option<Decimal>,
}

// ---- Customer endpoints ----

/// POST /orders
pub async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PlacedOrder>>), ServiceError> {
    let placed = state.services.orders.place_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(placed))))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderDetail>>, ServiceError> {
    let order = state.services.orders.get_order(order_id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// GET /orders/{id}/status
pub async fn order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderStatusView>>, ServiceError> {
    let status = state.services.orders.order_status(order_id).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// POST /orders/{id}/call-waiter
pub async fn call_waiter(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.services.orders.call_waiter(order_id).await?;
    Ok(Json(ApiResponse::message("The waiter has been notified")))
}

/// POST /orders/{id}/request-bill
pub async fn request_bill(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<RequestBillBody>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    // The tax id only matters when the customer asked for an invoice.
    let tax_id = if body.invoice_required {
        body.tax_id
    } else {
        None
    };

    state
        .services
        .orders
        .request_bill(
            order_id,
            BillRequest {
                payment_method: body.payment_method,
                tip: body.tip,
                tax_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::message("The bill has been requested")))
}

// ---- Staff endpoints ----

/// GET /staff/orders/active
pub async fn active_orders(
    State(state): State<AppState>,
    _staff: EmployeeUser,
) -> Result<Json<ApiResponse<Vec<OrderSummary>>>, ServiceError> {
    let orders = state.services.orders.active_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /staff/orders/accepted
pub async fn accepted_orders(
    State(state): State<AppState>,
    _staff: EmployeeUser,
) -> Result<Json<ApiResponse<Vec<OrderSummary>>>, ServiceError> {
    let orders = state.services.orders.accepted_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /staff/orders/history?page=
pub async fn order_history(
    State(state): State<AppState>,
    _staff: EmployeeUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<OrderHistoryPage>>, ServiceError> {
    let page = state.services.orders.order_history(query.page).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// POST /staff/orders/{id}/accept
pub async fn accept_order(
    State(state): State<AppState>,
    _staff: EmployeeUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<AcceptOrderRequest>,
) -> Result<Json<ApiResponse<OrderStatusView>>, ServiceError> {
    let order = state
        .services
        .orders
        .accept_order(order_id, request.realization_time)
        .await?;

    let status = state.services.orders.order_status(order.id).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// POST /staff/orders/{id}/start-preparation
pub async fn start_preparation(
    State(state): State<AppState>,
    _staff: EmployeeUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.services.orders.start_preparation(order_id).await?;
    Ok(Json(ApiResponse::message("Order moved to preparation")))
}

/// POST /staff/orders/{id}/ready
pub async fn mark_ready(
    State(state): State<AppState>,
    _staff: EmployeeUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.services.orders.mark_ready(order_id).await?;
    Ok(Json(ApiResponse::message("Order marked as ready")))
}

/// POST /staff/orders/{id}/complete
pub async fn complete_order(
    State(state): State<AppState>,
    _staff: EmployeeUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.services.orders.complete_order(order_id).await?;
    Ok(Json(ApiResponse::message("Order completed")))
}

/// GET /staff/calls
pub async fn waiter_calls(
    State(state): State<AppState>,
    _staff: EmployeeUser,
) -> Result<Json<ApiResponse<Vec<WaiterCall>>>, ServiceError> {
    let calls = state.services.orders.waiter_calls().await?;
    Ok(Json(ApiResponse::success(calls)))
}

/// POST /staff/orders/{id}/dismiss-call
pub async fn dismiss_call(
    State(state): State<AppState>,
    _staff: EmployeeUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.services.orders.dismiss_call(order_id).await?;
    Ok(Json(ApiResponse::message("Waiter call dismissed")))
}

/// POST /staff/orders/{id}/dismiss-bill
pub async fn dismiss_bill(
    State(state): State<AppState>,
    _staff: EmployeeUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.services.orders.dismiss_bill(order_id).await?;
    Ok(Json(ApiResponse::message("Bill request dismissed")))
}
