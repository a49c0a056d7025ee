use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::CreateBookingRequest;
use crate::api::handlers::{parse_date, parse_time};
use crate::domain::services::lifecycle::BookingRequest;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("create_booking: service {}", service_id);

    let date = parse_date(&payload.date)?;
    let start = parse_time(&payload.time)?;

    let booking = state
        .lifecycle
        .create(
            &service_id,
            BookingRequest {
                date,
                start,
                participants: payload.participants.unwrap_or(1),
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Json(booking))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_service(&service_id).await?;
    Ok(Json(bookings))
}
