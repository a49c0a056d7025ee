use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::{availability, booking, booking_management, health, service};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Service administration
        .route("/api/v1/services", post(service::create_service).get(service::list_services))
        .route(
            "/api/v1/services/{service_id}",
            get(service::get_service)
                .put(service::update_service)
                .delete(service::delete_service),
        )

        // Availability
        .route("/api/v1/services/{service_id}/slots", get(availability::get_slots))
        .route("/api/v1/services/{service_id}/calendar", get(availability::get_calendar))

        // Booking flow
        .route(
            "/api/v1/services/{service_id}/bookings",
            post(booking::create_booking).get(booking::list_bookings),
        )

        // Customer self-service (capability token)
        .route("/api/v1/bookings/{booking_id}", get(booking_management::get_booking))
        .route("/api/v1/bookings/{booking_id}/reschedule", post(booking_management::reschedule_booking))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking_management::cancel_booking))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                }),
        )
        .with_state(state)
}
