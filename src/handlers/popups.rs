use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::Serialize;

use crate::auth::AdminUser;
use crate::entities::popup::Model as PopupModel;
use crate::handlers::common::collect_multipart;
use crate::{errors::ServiceError, ApiResponse, AppState};

/// Public view of the popup; the image URL points at the static mount.
#[derive(Debug, Serialize)]
pub struct PopupView {
    pub image_url: Option<String>,
    pub is_active: bool,
}

/// GET /popup
pub async fn current_popup(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PopupView>>, ServiceError> {
    let view = match state.services.popups.current().await? {
        Some(popup) => PopupView {
            image_url: Some(format!("/images/{}", popup.image_filename)),
            is_active: popup.is_active,
        },
        None => PopupView {
            image_url: None,
            is_active: false,
        },
    };

    Ok(Json(ApiResponse::success(view)))
}

// ---- Admin endpoints ----

/// POST /admin/popup (multipart form with the image)
pub async fn set_popup(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PopupModel>>, ServiceError> {
    let form = collect_multipart(multipart).await?;

    let upload = form.file("popup_image").ok_or_else(|| {
        ServiceError::ValidationError("No popup image was uploaded".to_string())
    })?;

    let filename = state
        .services
        .media
        .save(&upload.filename, &upload.data)
        .await?;

    let (popup, replaced_image) = state.services.popups.set_popup(filename).await?;
    if let Some(old_image) = replaced_image {
        state.services.media.delete(&old_image).await;
    }

    Ok(Json(ApiResponse::success(popup)))
}

/// POST /admin/popup/toggle
pub async fn toggle_popup(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<PopupModel>>, ServiceError> {
    let popup = state.services.popups.toggle().await?;
    Ok(Json(ApiResponse::success(popup)))
}
