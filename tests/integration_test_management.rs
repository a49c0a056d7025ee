mod common;

use chrono::{Duration, Utc};
use common::{bookable_date, open_week, TestApp};
use serde_json::{json, Value};

async fn booked_app() -> (TestApp, String, String, String, String) {
    let app = TestApp::new().await;
    let service_id = app
        .create_service(
            "Consultation",
            json!({
                "max_participants": 1,
                "mode": "fixed_duration",
                "slot_duration_min": 60,
                "daily_windows": open_week("09:00:00", "17:00:00")
            }),
        )
        .await;

    let date = bookable_date(3).to_string();
    let (status, booking) = app.book(&service_id, &date, "09:00", 1).await;
    assert_eq!(status, 200);

    let id = booking["id"].as_str().unwrap().to_string();
    let token = booking["token"].as_str().unwrap().to_string();
    (app, service_id, date, id, token)
}

async fn reschedule(app: &TestApp, id: &str, token: &str, date: &str, time: &str) -> (u16, Value) {
    app.request(
        "POST",
        &format!("/api/v1/bookings/{}/reschedule", id),
        Some(json!({ "token": token, "date": date, "time": time })),
    )
    .await
}

#[tokio::test]
async fn test_reschedule_preserves_duration_and_marks_changed() {
    let (app, _service_id, date, id, token) = booked_app().await;

    let (status, updated) = reschedule(&app, &id, &token, &date, "11:00").await;
    assert_eq!(status, 200, "{}", updated);
    assert_eq!(updated["status"], "changed");
    assert_eq!(updated["start_time"], "11:00:00");
    assert_eq!(updated["end_time"], "12:00:00");
    assert_eq!(updated["modification_count"], 1);
    assert_eq!(updated["token"], token, "token survives modification");

    // The old slot frees up, the new one is taken.
    let slots = app.get_slots(updated["service_id"].as_str().unwrap(), &date).await;
    assert!(slots.iter().any(|s| s["start"] == "09:00:00"));
    assert!(!slots.iter().any(|s| s["start"] == "11:00:00"));
}

#[tokio::test]
async fn test_reschedule_rate_limit() {
    let (app, _service_id, date, id, token) = booked_app().await;

    let (status, _) = reschedule(&app, &id, &token, &date, "11:00").await;
    assert_eq!(status, 200);

    let (status, _) = reschedule(&app, &id, &token, &date, "13:00").await;
    assert_eq!(status, 429, "second change within 5 minutes is rate limited");

    // Simulate the cooldown elapsing.
    sqlx::query("UPDATE bookings SET last_modification = ? WHERE id = ?")
        .bind(Utc::now() - Duration::minutes(6))
        .bind(&id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, updated) = reschedule(&app, &id, &token, &date, "13:00").await;
    assert_eq!(status, 200, "{}", updated);
    assert_eq!(updated["modification_count"], 2);
}

#[tokio::test]
async fn test_modification_limit() {
    let (app, _service_id, date, id, token) = booked_app().await;

    sqlx::query("UPDATE bookings SET modification_count = 5 WHERE id = ?")
        .bind(&id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = reschedule(&app, &id, &token, &date, "11:00").await;
    assert_eq!(status, 409, "{}", body);
    assert!(body["error"].as_str().unwrap().contains("modification limit"));
}

#[tokio::test]
async fn test_token_mismatch_never_mutates_and_never_leaks() {
    let (app, _service_id, date, id, token) = booked_app().await;

    let (status, wrong_body) = reschedule(&app, &id, "wrong-token", &date, "11:00").await;
    assert_eq!(status, 403);

    let (status, missing_body) = reschedule(&app, "no-such-booking", &token, &date, "11:00").await;
    assert_eq!(status, 403);
    assert_eq!(
        wrong_body, missing_body,
        "unknown booking and bad token must be indistinguishable"
    );

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/bookings/{}/cancel", id),
            Some(json!({ "token": "wrong-token" })),
        )
        .await;
    assert_eq!(status, 403);

    // Nothing changed.
    let (status, body) = app
        .request(
            "GET",
            &format!("/api/v1/bookings/{}?token={}", id, token),
            None,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["booking"]["start_time"], "09:00:00");
    assert_eq!(body["booking"]["modification_count"], 0);
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let (app, _service_id, _date, id, token) = booked_app().await;

    let uri = format!("/api/v1/bookings/{}/cancel", id);

    let (status, body) = app
        .request("POST", &uri, Some(json!({ "token": token })))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = app
        .request("POST", &uri, Some(json!({ "token": token })))
        .await;
    assert_eq!(status, 200, "cancelling twice is a no-op");
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
async fn test_cancelled_booking_cannot_be_rescheduled() {
    let (app, _service_id, date, id, token) = booked_app().await;

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/bookings/{}/cancel", id),
            Some(json!({ "token": token })),
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = reschedule(&app, &id, &token, &date, "11:00").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_cutoff_blocks_self_service_changes() {
    let app = TestApp::new().await;
    // A one-year cutoff puts every bookable date inside the blocked window.
    let service_id = app
        .create_service(
            "Consultation",
            json!({
                "max_participants": 1,
                "mode": "fixed_duration",
                "slot_duration_min": 60,
                "daily_windows": open_week("09:00:00", "17:00:00"),
                "cutoff_hours": 8760
            }),
        )
        .await;

    let date = bookable_date(3).to_string();
    let (status, booking) = app.book(&service_id, &date, "09:00", 1).await;
    assert_eq!(status, 200);
    let id = booking["id"].as_str().unwrap();
    let token = booking["token"].as_str().unwrap();

    let (status, body) = reschedule(&app, id, token, &date, "11:00").await;
    assert_eq!(status, 409, "{}", body);

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/bookings/{}/cancel", id),
            Some(json!({ "token": token })),
        )
        .await;
    assert_eq!(status, 409);
}

#[tokio::test]
async fn test_reschedule_across_dates_invalidates_both_days() {
    let (app, service_id, date, id, token) = booked_app().await;

    // Warm the cache for both days.
    let other_date = bookable_date(4).to_string();
    app.get_slots(&service_id, &date).await;
    app.get_slots(&service_id, &other_date).await;

    let (status, _) = reschedule(&app, &id, &token, &other_date, "10:00").await;
    assert_eq!(status, 200);

    let old_day = app.get_slots(&service_id, &date).await;
    assert!(old_day.iter().any(|s| s["start"] == "09:00:00"), "old slot restored");

    let new_day = app.get_slots(&service_id, &other_date).await;
    assert!(!new_day.iter().any(|s| s["start"] == "10:00:00"), "new slot taken");
}
