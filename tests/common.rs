use appointment_backend::{
    api::router::create_router,
    config::Config,
    domain::models::{booking::Booking, service::Service},
    domain::ports::NotificationService,
    domain::services::availability::AvailabilityResolver,
    domain::services::lifecycle::BookingLifecycle,
    error::AppError,
    infra::cache::AvailabilityCache,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo, sqlite_service_repo::SqliteServiceRepo,
    },
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub struct MockNotifier;

#[async_trait]
impl NotificationService for MockNotifier {
    async fn booking_created(&self, _service: &Service, _booking: &Booking) -> Result<(), AppError> {
        Ok(())
    }
    async fn booking_modified(&self, _service: &Service, _booking: &Booking) -> Result<(), AppError> {
        Ok(())
    }
    async fn booking_cancelled(&self, _service: &Service, _booking: &Booking) -> Result<(), AppError> {
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            notify_url: "http://localhost".to_string(),
            notify_token: "token".to_string(),
            cache_ttl_secs: 300,
        };

        let service_repo = Arc::new(SqliteServiceRepo::new(pool.clone()));
        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
        let notifier = Arc::new(MockNotifier);
        let cache = AvailabilityCache::new(std::time::Duration::from_secs(config.cache_ttl_secs));

        let resolver = Arc::new(AvailabilityResolver::new(
            service_repo.clone(),
            booking_repo.clone(),
            cache.clone(),
        ));
        let lifecycle = Arc::new(BookingLifecycle::new(
            service_repo.clone(),
            booking_repo.clone(),
            cache.clone(),
            notifier.clone(),
        ));

        let state = Arc::new(AppState {
            config,
            service_repo,
            booking_repo,
            notifier,
            cache,
            resolver,
            lifecycle,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (u16, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        let request = match body {
            Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    pub async fn create_service(&self, name: &str, config: Value) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/services",
                Some(json!({ "name": name, "config": config })),
            )
            .await;
        assert_eq!(status, 200, "service creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn get_slots(&self, service_id: &str, date: &str) -> Vec<Value> {
        let (status, body) = self
            .request(
                "GET",
                &format!("/api/v1/services/{}/slots?date={}", service_id, date),
                None,
            )
            .await;
        assert_eq!(status, 200, "slot query failed: {}", body);
        body["slots"].as_array().unwrap().clone()
    }

    pub async fn book(
        &self,
        service_id: &str,
        date: &str,
        time: &str,
        participants: i32,
    ) -> (u16, Value) {
        self.request(
            "POST",
            &format!("/api/v1/services/{}/bookings", service_id),
            Some(json!({
                "date": date,
                "time": time,
                "name": "Test Customer",
                "email": "customer@example.com",
                "participants": participants
            })),
        )
        .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// Every weekday open with a single window.
#[allow(dead_code)]
pub fn open_week(start: &str, end: &str) -> Value {
    let day = json!({ "windows": [{ "start": start, "end": end }] });
    json!({
        "monday": day.clone(), "tuesday": day.clone(), "wednesday": day.clone(),
        "thursday": day.clone(), "friday": day.clone(), "saturday": day.clone(),
        "sunday": day
    })
}

/// A date safely inside the default booking window.
#[allow(dead_code)]
pub fn bookable_date(days_from_now: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days_from_now)
}
