use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{bearer_token, AuthUser, LoginRequest, LoginResponse, RegisterRequest};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct StaffAccount {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub is_employee: bool,
}

#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub username: String,
    pub is_admin: bool,
    pub is_employee: bool,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ServiceError> {
    let response = state.services.auth.login(request).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// POST /auth/logout — tokens are stateless, so logout is client-side;
/// the endpoint exists for dashboard symmetry.
pub async fn logout(_user: AuthUser) -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Logged out"))
}

/// GET /auth/me
pub async fn me(user: AuthUser) -> Json<ApiResponse<CurrentUser>> {
    Json(ApiResponse::success(CurrentUser {
        username: user.username,
        is_admin: user.is_admin,
        is_employee: user.is_employee,
    }))
}

/// POST /auth/register — admin-gated, except on first run: while the
/// users table is empty, the endpoint is open so the initial
/// administrator can be created.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StaffAccount>>), ServiceError> {
    let caller_is_admin = bearer_token(&headers)
        .and_then(|token| state.services.auth.validate_token(token).ok())
        .map(|claims| claims.is_admin)
        .unwrap_or(false);

    if !caller_is_admin && state.services.auth.user_count().await? > 0 {
        return Err(ServiceError::Forbidden(
            "Administrator access required".to_string(),
        ));
    }

    let created = state.services.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(StaffAccount {
            id: created.id,
            username: created.username,
            is_admin: created.is_admin,
            is_employee: created.is_employee,
        })),
    ))
}
