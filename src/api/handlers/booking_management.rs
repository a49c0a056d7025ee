use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::dtos::requests::{CancelBookingRequest, RescheduleBookingRequest};
use crate::api::handlers::{parse_date, parse_time};
use crate::domain::services::lifecycle::enforce_cutoff;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let token = params.get("token").ok_or(AppError::InvalidToken)?;
    let booking = state.lifecycle.authorize(&booking_id, token).await?;

    let service = state
        .service_repo
        .find_by_id(&booking.service_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok(Json(serde_json::json!({
        "booking": booking,
        "service": { "id": service.id, "name": service.name },
    })))
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_date = parse_date(&payload.date)?;
    let new_time = parse_time(&payload.time)?;

    // Cutoff is a precondition of the calling layer, checked before the
    // state machine runs.
    let booking = state.lifecycle.authorize(&booking_id, &payload.token).await?;
    if let Some(service) = state.service_repo.find_by_id(&booking.service_id).await? {
        enforce_cutoff(&service.config()?, &booking)?;
    }

    let updated = state
        .lifecycle
        .modify(&booking_id, &payload.token, new_date, new_time)
        .await?;

    Ok(Json(updated))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.lifecycle.authorize(&booking_id, &payload.token).await?;
    if booking.is_active() {
        if let Some(service) = state.service_repo.find_by_id(&booking.service_id).await? {
            enforce_cutoff(&service.config()?, &booking)?;
        }
    }

    let cancelled = state.lifecycle.cancel(&booking_id, &payload.token).await?;
    Ok(Json(cancelled))
}
