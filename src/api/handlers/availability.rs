use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::dtos::responses::{CalendarResponse, SlotsResponse};
use crate::api::handlers::parse_date;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let date_str = params.get("date").ok_or(AppError::Validation("date required".into()))?;
    let date = parse_date(date_str)?;

    let slots = state.resolver.available_slots(&service_id, date).await?;

    Ok(Json(SlotsResponse { date, slots }))
}

pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let year: i32 = params
        .get("year")
        .ok_or(AppError::Validation("year required".into()))?
        .parse()
        .map_err(|_| AppError::Validation("Invalid year".into()))?;
    let month: u32 = params
        .get("month")
        .ok_or(AppError::Validation("month required".into()))?
        .parse()
        .map_err(|_| AppError::Validation("Invalid month".into()))?;

    if !(1..=12).contains(&month) {
        return Err(AppError::Validation("month must be 1-12".into()));
    }

    let weeks = state.resolver.month_grid(&service_id, year, month).await?;

    Ok(Json(CalendarResponse { year, month, weeks }))
}
