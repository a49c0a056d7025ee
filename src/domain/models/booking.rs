use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub mod status {
    pub const CONFIRMED: &str = "confirmed";
    pub const CHANGED: &str = "changed";
    pub const CANCELLED: &str = "cancelled";
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub service_id: String,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub participants: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub token: String,
    pub modification_count: i32,
    pub last_modification: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub service_id: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub participants: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            service_id: params.service_id,
            appointment_date: params.date,
            start_time: params.start,
            end_time: params.end,
            participants: params.participants,
            customer_name: params.name,
            customer_email: params.email,
            customer_phone: params.phone,
            notes: params.notes,
            status: status::CONFIRMED.to_string(),
            token,
            modification_count: 0,
            last_modification: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == status::CONFIRMED || self.status == status::CHANGED
    }
}

/// A booked time range as seen by the availability resolver. Only active
/// bookings (confirmed or changed) are ever materialized into this shape.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct BookedInterval {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub participants: i32,
}

impl BookedInterval {
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time < end && self.end_time > start
    }

    pub fn matches_exactly(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time == start && self.end_time == end
    }
}
