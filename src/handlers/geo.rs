use axum::{extract::State, response::Json};

use crate::services::geo::{Coordinates, GeofenceResult};
use crate::{errors::ServiceError, ApiResponse, AppState};

/// POST /check-location — client-reported coordinates against the
/// configured service radius.
pub async fn check_location(
    State(state): State<AppState>,
    Json(position): Json<Coordinates>,
) -> Result<Json<ApiResponse<GeofenceResult>>, ServiceError> {
    let result = state.services.geo.check(position);
    Ok(Json(ApiResponse::success(result)))
}
