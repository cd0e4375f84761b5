use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::entities::menu_item::Model as MenuItemModel;
use crate::handlers::common::collect_multipart;
use crate::services::catalog::{CategorySection, CreateMenuItemRequest, UpdateMenuItemRequest};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct MenuView {
    /// Absent for the online-order menu
    pub table_id: Option<i32>,
    /// Local wall clock, for date-limited specials on the client
    pub current_time: String,
    pub categories: Vec<CategorySection>,
}

async fn menu_view(
    state: &AppState,
    table_id: Option<i32>,
) -> Result<MenuView, ServiceError> {
    let categories = state.services.catalog.menu_by_category(true).await?;
    let current_time = chrono::Utc::now()
        .with_timezone(&state.config.tz())
        .to_rfc3339();

    Ok(MenuView {
        table_id,
        current_time,
        categories,
    })
}

/// GET /menu/{table_id} — the dine-in menu behind the table QR code.
/// Unknown tables 404 so stale QR codes stop working when the table
/// count shrinks.
pub async fn table_menu(
    State(state): State<AppState>,
    Path(table_id): Path<i32>,
) -> Result<Json<ApiResponse<MenuView>>, ServiceError> {
    if !state.services.tables.table_exists(table_id).await? {
        return Err(ServiceError::NotFound(format!(
            "Table {} does not exist",
            table_id
        )));
    }

    let view = menu_view(&state, Some(table_id)).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /menu/online — delivery/pickup menu, no table attached.
pub async fn online_menu(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MenuView>>, ServiceError> {
    let view = menu_view(&state, None).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /storefront/{page} — public per-category pages.
pub async fn storefront_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<ApiResponse<Vec<CategorySection>>>, ServiceError> {
    let sections = state.services.catalog.storefront_page(&page).await?;
    Ok(Json(ApiResponse::success(sections)))
}

// ---- Admin endpoints ----

/// GET /admin/menu-items — unfiltered listing for the admin panel.
pub async fn list_menu_items(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<MenuItemModel>>>, ServiceError> {
    let items = state.services.catalog.list_all().await?;
    Ok(Json(ApiResponse::success(items)))
}

/// POST /admin/menu-items (multipart form with optional image)
pub async fn create_menu_item(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<MenuItemModel>>), ServiceError> {
    let form = collect_multipart(multipart).await?;

    let image_filename = match form.file("image") {
        Some(upload) => Some(
            state
                .services
                .media
                .save(&upload.filename, &upload.data)
                .await?,
        ),
        None => None,
    };

    let request = CreateMenuItemRequest {
        name: form.require("name")?.to_string(),
        description: form.field("description").unwrap_or_default().to_string(),
        price: form.decimal("price")?,
        category: form.require("category")?.to_string(),
        customizable: form.checkbox("customizable"),
        contains_alcohol: form.checkbox("contains_alcohol"),
        display_date: form.date("display_date")?,
        image_filename,
    };

    let item = state.services.catalog.create_item(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// PUT /admin/menu-items/{id} (multipart form, image optional)
pub async fn update_menu_item(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(item_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<MenuItemModel>>, ServiceError> {
    let form = collect_multipart(multipart).await?;

    let image_filename = match form.file("image") {
        Some(upload) => Some(
            state
                .services
                .media
                .save(&upload.filename, &upload.data)
                .await?,
        ),
        None => None,
    };

    let request = UpdateMenuItemRequest {
        name: form.require("name")?.to_string(),
        description: form.field("description").unwrap_or_default().to_string(),
        price: form.decimal("price")?,
        category: form.require("category")?.to_string(),
        customizable: form.checkbox("customizable"),
        available: form.checkbox("available"),
        display_date: form.date("display_date")?,
        image_filename,
    };

    let mutation = state.services.catalog.update_item(item_id, request).await?;
    if let Some(old_image) = mutation.replaced_image {
        state.services.media.delete(&old_image).await;
    }

    Ok(Json(ApiResponse::success(mutation.item)))
}

/// DELETE /admin/menu-items/{id}
pub async fn delete_menu_item(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    let mutation = state.services.catalog.delete_item(item_id).await?;
    if let Some(image) = mutation.replaced_image {
        state.services.media.delete(&image).await;
    }

    Ok(Json(ApiResponse::message("Menu item deleted")))
}
