use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::entities::event::Model as EventModel;
use crate::handlers::common::collect_multipart;
use crate::services::promotions::{CreateEventRequest, UpdateEventRequest};
use crate::{errors::ServiceError, ApiResponse, AppState};

/// Landing-page view: the headline event plus the one after it.
#[derive(Debug, Serialize)]
pub struct UpcomingEvents {
    pub upcoming_event: Option<EventModel>,
    pub next_event: Option<EventModel>,
}

/// GET /events/upcoming
pub async fn upcoming_events(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UpcomingEvents>>, ServiceError> {
    let today = chrono::Utc::now()
        .with_timezone(&state.config.tz())
        .date_naive();

    let mut events = state.services.promotions.upcoming(today).await?.into_iter();

    Ok(Json(ApiResponse::success(UpcomingEvents {
        upcoming_event: events.next(),
        next_event: events.next(),
    })))
}

// ---- Admin endpoints ----

/// GET /admin/events
pub async fn list_events(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<EventModel>>>, ServiceError> {
    let events = state.services.promotions.list_all().await?;
    Ok(Json(ApiResponse::success(events)))
}

/// POST /admin/events (multipart form with optional banner image)
pub async fn create_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<EventModel>>), ServiceError> {
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

    let request = CreateEventRequest {
        title: form.require("title")?.to_string(),
        description: form.field("description").unwrap_or_default().to_string(),
        start_date: form.require_date("start_date")?,
        end_date: form.require_date("end_date")?,
        image_filename,
        display_title: form.checkbox("display_title"),
        display_description: form.checkbox("display_description"),
    };

    let event = state.services.promotions.create_event(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(event))))
}

/// PUT /admin/events/{id} (multipart form, image optional)
pub async fn update_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(event_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<EventModel>>, ServiceError> {
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

    let request = UpdateEventRequest {
        title: form.require("title")?.to_string(),
        description: form.field("description").unwrap_or_default().to_string(),
        start_date: form.require_date("start_date")?,
        end_date: form.require_date("end_date")?,
        display_title: form.checkbox("display_title"),
        display_description: form.checkbox("display_description"),
        image_filename,
    };

    let (event, replaced_image) = state
        .services
        .promotions
        .update_event(event_id, request)
        .await?;
    if let Some(old_image) = replaced_image {
        state.services.media.delete(&old_image).await;
    }

    Ok(Json(ApiResponse::success(event)))
}

/// DELETE /admin/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    let image = state.services.promotions.delete_event(event_id).await?;
    if let Some(image) = image {
        state.services.media.delete(&image).await;
    }

    Ok(Json(ApiResponse::message("Event deleted")))
}
