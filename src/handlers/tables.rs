use axum::{extract::State, response::Json};
use serde::Deserialize;

use crate::auth::AdminUser;
use crate::entities::dining_table::Model as TableModel;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub struct SetTableCountRequest {
    pub table_count: i32,
}

/// GET /admin/tables
pub async fn list_tables(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<TableModel>>>, ServiceError> {
    let tables = state.services.tables.list_tables().await?;
    Ok(Json(ApiResponse::success(tables)))
}

/// PUT /admin/tables — reconcile the table set to a target count.
pub async fn set_table_count(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<SetTableCountRequest>,
) -> Result<Json<ApiResponse<Vec<TableModel>>>, ServiceError> {
    let tables = state
        .services
        .tables
        .set_table_count(request.table_count)
        .await?;
    Ok(Json(ApiResponse::success(tables)))
}
