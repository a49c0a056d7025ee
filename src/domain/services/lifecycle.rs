use chrono::{Duration, NaiveDate, NaiveTime, Timelike, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::booking::{status, Booking, NewBookingParams};
use crate::domain::models::service::{Service, ServiceConfig, SlotPlan};
use crate::domain::models::slot::Slot;
use crate::domain::ports::{
    BookingRepository, CapacityCheck, CapacityRule, NotificationService, ServiceRepository,
};
use crate::domain::services::availability::date_is_bookable;
use crate::domain::services::slots::generate_slots;
use crate::error::AppError;
use crate::infra::cache::AvailabilityCache;

/// Minimum wait between self-service modifications of one booking.
pub const MODIFY_COOLDOWN_MINUTES: i64 = 5;
/// Lifetime cap on self-service modifications of one booking.
pub const MAX_MODIFICATIONS: i32 = 5;

pub struct BookingRequest {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub participants: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

pub struct BookingLifecycle {
    services: Arc<dyn ServiceRepository>,
    bookings: Arc<dyn BookingRepository>,
    cache: AvailabilityCache,
    notifier: Arc<dyn NotificationService>,
}

impl BookingLifecycle {
    pub fn new(
        services: Arc<dyn ServiceRepository>,
        bookings: Arc<dyn BookingRepository>,
        cache: AvailabilityCache,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self { services, bookings, cache, notifier }
    }

    pub async fn create(&self, service_id: &str, req: BookingRequest) -> Result<Booking, AppError> {
        if req.participants < 1 {
            return Err(AppError::Validation("participants must be at least 1".into()));
        }
        if req.name.trim().is_empty() || req.email.trim().is_empty() {
            return Err(AppError::Validation("name and email are required".into()));
        }

        let service = self
            .services
            .find_by_id(service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".into()))?;
        let config = service.config()?;

        if !date_is_bookable(&config, req.date, Utc::now().date_naive()) {
            return Err(AppError::Validation("the selected date is not bookable".into()));
        }

        let slot = find_candidate(&config, req.date, req.start)?;
        if req.participants as i64 > slot.capacity as i64 {
            return Err(AppError::CapacityExceeded);
        }

        let booking = Booking::new(NewBookingParams {
            service_id: service.id.clone(),
            date: req.date,
            start: slot.start,
            end: slot.end,
            participants: req.participants,
            name: req.name,
            email: req.email,
            phone: req.phone,
            notes: req.notes,
        });

        let created = self.bookings.create(&booking, capacity_check(&config, &slot)).await?;
        self.cache.invalidate_date(&created.service_id, created.appointment_date).await;

        info!("Booking confirmed: {} for service {}", created.id, created.service_id);
        self.notify_created(service, created.clone());
        Ok(created)
    }

    pub async fn modify(
        &self,
        booking_id: &str,
        token: &str,
        new_date: NaiveDate,
        new_time: NaiveTime,
    ) -> Result<Booking, AppError> {
        let booking = self.authorize(booking_id, token).await?;

        if booking.status == status::CANCELLED {
            return Err(AppError::Validation("cannot modify a cancelled booking".into()));
        }

        let now = Utc::now();
        if let Some(last) = booking.last_modification {
            if now - last < Duration::minutes(MODIFY_COOLDOWN_MINUTES) {
                return Err(AppError::RateLimited);
            }
        }
        if booking.modification_count >= MAX_MODIFICATIONS {
            return Err(AppError::ModificationLimit);
        }

        let service = self
            .services
            .find_by_id(&booking.service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".into()))?;
        let config = service.config()?;

        if !date_is_bookable(&config, new_date, now.date_naive()) {
            return Err(AppError::Validation("the selected date is not bookable".into()));
        }

        let slot = find_candidate(&config, new_date, new_time)?;

        // The slot grid may have been reconfigured since the original
        // booking; the customer keeps the duration they paid for.
        let duration = seconds_of_day(booking.end_time) as i64 - seconds_of_day(booking.start_time) as i64;
        let new_end = seconds_of_day(new_time) as i64 + duration;
        let new_end = NaiveTime::from_num_seconds_from_midnight_opt(new_end as u32, 0)
            .filter(|_| new_end < 86_400)
            .ok_or_else(|| AppError::Validation("appointment would run past midnight".into()))?;

        let old_date = booking.appointment_date;

        let mut updated = booking;
        updated.appointment_date = new_date;
        updated.start_time = new_time;
        updated.end_time = new_end;
        updated.status = status::CHANGED.to_string();
        updated.modification_count += 1;
        updated.last_modification = Some(now);
        updated.updated_at = now;

        let updated = self.bookings.reschedule(&updated, capacity_check(&config, &slot)).await?;

        self.cache.invalidate_date(&updated.service_id, old_date).await;
        self.cache.invalidate_date(&updated.service_id, new_date).await;

        info!("Booking modified: {} -> {} {}", updated.id, new_date, new_time);
        self.notify_modified(service, updated.clone());
        Ok(updated)
    }

    pub async fn cancel(&self, booking_id: &str, token: &str) -> Result<Booking, AppError> {
        let booking = self.authorize(booking_id, token).await?;

        // Cancelling twice is a no-op, not an error.
        if booking.status == status::CANCELLED {
            return Ok(booking);
        }

        let cancelled = self.bookings.cancel(&booking.id).await?;
        self.cache
            .invalidate_date(&cancelled.service_id, cancelled.appointment_date)
            .await;

        info!("Booking cancelled: {}", cancelled.id);
        if let Ok(Some(service)) = self.services.find_by_id(&cancelled.service_id).await {
            self.notify_cancelled(service, cancelled.clone());
        }
        Ok(cancelled)
    }

    /// Load a booking for a self-service action. A missing booking and a
    /// token mismatch are indistinguishable to the caller.
    pub async fn authorize(&self, booking_id: &str, token: &str) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !token_matches(&booking.token, token) {
            return Err(AppError::InvalidToken);
        }

        Ok(booking)
    }

    fn notify_created(&self, service: Service, booking: Booking) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.booking_created(&service, &booking).await {
                warn!("confirmation notification failed for {}: {}", booking.id, e);
            }
        });
    }

    fn notify_modified(&self, service: Service, booking: Booking) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.booking_modified(&service, &booking).await {
                warn!("modification notification failed for {}: {}", booking.id, e);
            }
        });
    }

    fn notify_cancelled(&self, service: Service, booking: Booking) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.booking_cancelled(&service, &booking).await {
                warn!("cancellation notification failed for {}: {}", booking.id, e);
            }
        });
    }
}

/// Cutoff precondition for self-service changes, applied by the HTTP layer
/// before invoking modify/cancel. Appointment times are service-local.
pub fn enforce_cutoff(config: &ServiceConfig, booking: &Booking) -> Result<(), AppError> {
    if config.cutoff_hours == 0 {
        return Ok(());
    }

    let appointment = booking.appointment_date.and_time(booking.start_time);
    let cutoff = appointment - Duration::hours(config.cutoff_hours as i64);
    if cutoff <= Utc::now().naive_utc() {
        return Err(AppError::CutoffPassed(config.cutoff_hours));
    }
    Ok(())
}

fn find_candidate(
    config: &ServiceConfig,
    date: NaiveDate,
    start: NaiveTime,
) -> Result<Slot, AppError> {
    generate_slots(config, date)?
        .into_iter()
        .find(|s| s.start == start)
        .ok_or_else(|| AppError::Conflict("the selected time slot is not available".into()))
}

fn capacity_check(config: &ServiceConfig, slot: &Slot) -> CapacityCheck {
    let rule = match config.plan {
        SlotPlan::FixedDuration { .. } => CapacityRule::Overlap,
        SlotPlan::Custom { .. } => CapacityRule::ExactMatch,
    };
    CapacityCheck { capacity: slot.capacity as i64, rule }
}

/// Token equality without early exit: comparing fixed-size digests instead
/// of the raw strings keeps the comparison time independent of where the
/// first mismatching byte sits.
fn token_matches(stored: &str, presented: &str) -> bool {
    Sha256::digest(stored.as_bytes()) == Sha256::digest(presented.as_bytes())
}

fn seconds_of_day(t: NaiveTime) -> u32 {
    t.num_seconds_from_midnight()
}
