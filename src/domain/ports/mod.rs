use crate::domain::models::{
    booking::{BookedInterval, Booking},
    service::Service,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Service>, AppError>;
    async fn list(&self) -> Result<Vec<Service>, AppError>;
    async fn update(&self, service: &Service) -> Result<Service, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// How the transactional capacity guard counts existing commitments against
/// the target slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityRule {
    /// Sum participants over every active booking overlapping the slot.
    Overlap,
    /// Sum participants over exact (start, end) matches only; any other
    /// overlapping active booking is a hard conflict.
    ExactMatch,
}

#[derive(Debug, Clone, Copy)]
pub struct CapacityCheck {
    pub capacity: i64,
    pub rule: CapacityRule,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert the booking iff the slot still has room, inside one
    /// transaction. Overbooking attempts fail with `CapacityExceeded`.
    async fn create(&self, booking: &Booking, check: CapacityCheck) -> Result<Booking, AppError>;

    /// Persist a modified booking (new date/time, status, modification
    /// bookkeeping) under the same transactional capacity guard; the
    /// booking's own participants are excluded from the overlap sum.
    async fn reschedule(&self, booking: &Booking, check: CapacityCheck) -> Result<Booking, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_service(&self, service_id: &str) -> Result<Vec<Booking>, AppError>;

    /// Active (confirmed or changed) intervals for a date, ordered by start.
    async fn list_for_date(
        &self,
        service_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<BookedInterval>, AppError>;

    /// Sum of participants over active bookings overlapping [start, end).
    async fn sum_overlapping(
        &self,
        service_id: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<i64, AppError>;

    async fn cancel(&self, id: &str) -> Result<Booking, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn booking_created(&self, service: &Service, booking: &Booking) -> Result<(), AppError>;
    async fn booking_modified(&self, service: &Service, booking: &Booking) -> Result<(), AppError>;
    async fn booking_cancelled(&self, service: &Service, booking: &Booking) -> Result<(), AppError>;
}
