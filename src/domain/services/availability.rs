use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::domain::models::booking::BookedInterval;
use crate::domain::models::service::{BookingBound, Service, ServiceConfig, SlotPlan};
use crate::domain::models::slot::{DayCell, MonthGrid, Slot, SlotAvailability};
use crate::domain::ports::{BookingRepository, ServiceRepository};
use crate::domain::services::slots::generate_slots;
use crate::error::AppError;
use crate::infra::cache::{AvailabilityCache, DayKey, SlotCountKey};

pub struct AvailabilityResolver {
    services: Arc<dyn ServiceRepository>,
    bookings: Arc<dyn BookingRepository>,
    cache: AvailabilityCache,
}

impl AvailabilityResolver {
    pub fn new(
        services: Arc<dyn ServiceRepository>,
        bookings: Arc<dyn BookingRepository>,
        cache: AvailabilityCache,
    ) -> Self {
        Self { services, bookings, cache }
    }

    /// Slots with remaining capacity for a service on a date. An unknown
    /// service or an out-of-window date resolves to an empty list; a
    /// malformed configuration is a hard error.
    pub async fn available_slots(
        &self,
        service_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, AppError> {
        let Some(service) = self.services.find_by_id(service_id).await? else {
            debug!("availability requested for unknown service {}", service_id);
            return Ok(Vec::new());
        };

        let config = service.config()?;

        if !date_is_bookable(&config, date, Utc::now().date_naive()) {
            return Ok(Vec::new());
        }

        self.resolve_slots(&service, &config, date).await
    }

    async fn resolve_slots(
        &self,
        service: &Service,
        config: &ServiceConfig,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, AppError> {
        let candidates = generate_slots(config, date)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        match &config.plan {
            SlotPlan::FixedDuration { .. } => {
                let mut out = Vec::new();
                for slot in candidates {
                    let booked = self.booked_count(&service.id, date, slot.start, slot.end).await?;
                    let remaining = slot.capacity as i64 - booked;
                    if remaining > 0 {
                        out.push(availability(slot, remaining));
                    }
                }
                Ok(out)
            }
            SlotPlan::Custom { .. } => {
                let booked = self.day_bookings(&service.id, date).await?;
                let mut out = Vec::new();
                for slot in candidates {
                    if let Some(remaining) = custom_remaining(&slot, &booked) {
                        out.push(availability(slot, remaining));
                    }
                }
                Ok(out)
            }
        }
    }

    /// Month grid of week rows, Monday in column 0. Cells outside the month
    /// are empty placeholders; every in-month cell carries its resolved
    /// slot list.
    pub async fn month_grid(
        &self,
        service_id: &str,
        year: i32,
        month: u32,
    ) -> Result<MonthGrid, AppError> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::Validation("invalid year/month".into()))?;
        let days_in_month = days_in_month(year, month);
        let leading = first_day.weekday().num_days_from_monday() as usize;

        let mut grid: MonthGrid = Vec::new();
        let mut week: Vec<Option<DayCell>> = vec![None; leading];

        for day in 1..=days_in_month {
            let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(AppError::Internal)?;
            let slots = self.available_slots(service_id, date).await?;
            week.push(Some(DayCell { date, day, slots }));

            if week.len() == 7 {
                grid.push(week);
                week = Vec::new();
            }
        }

        if !week.is_empty() {
            week.resize(7, None);
            grid.push(week);
        }

        Ok(grid)
    }

    async fn booked_count(
        &self,
        service_id: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<i64, AppError> {
        let key = SlotCountKey {
            service_id: service_id.to_string(),
            date,
            start,
            end,
        };

        if let Some(count) = self.cache.get_slot_count(&key).await {
            return Ok(count);
        }

        let count = self.bookings.sum_overlapping(service_id, date, start, end).await?;
        self.cache.put_slot_count(key, count).await;
        Ok(count)
    }

    async fn day_bookings(
        &self,
        service_id: &str,
        date: NaiveDate,
    ) -> Result<Arc<Vec<BookedInterval>>, AppError> {
        let key = DayKey { service_id: service_id.to_string(), date };

        if let Some(booked) = self.cache.get_day_bookings(&key).await {
            return Ok(booked);
        }

        let booked = Arc::new(self.bookings.list_for_date(service_id, date).await?);
        self.cache.put_day_bookings(key, booked.clone()).await;
        Ok(booked)
    }
}

fn availability(slot: Slot, remaining: i64) -> SlotAvailability {
    SlotAvailability {
        start: slot.start,
        end: slot.end,
        remaining,
        price: slot.price,
    }
}

/// Remaining capacity of a custom slot, or None when the slot must be
/// hidden. Exact-match bookings consume capacity; any other overlapping
/// booking conflicts with the slot and suppresses it entirely.
fn custom_remaining(slot: &Slot, booked: &[BookedInterval]) -> Option<i64> {
    let mut consumed: i64 = 0;
    for interval in booked {
        if interval.matches_exactly(slot.start, slot.end) {
            consumed += interval.participants as i64;
        } else if interval.overlaps(slot.start, slot.end) {
            return None;
        }
    }

    let remaining = slot.capacity as i64 - consumed;
    (remaining > 0).then_some(remaining)
}

/// Booking-window gate: strictly after today, at or past the minimum bound,
/// at or before the maximum bound, and not excluded.
pub fn date_is_bookable(config: &ServiceConfig, date: NaiveDate, today: NaiveDate) -> bool {
    if date <= today {
        return false;
    }

    if config.excluded_dates.contains(&date) {
        return false;
    }

    let min_date = match config.booking_window.min {
        BookingBound::DaysAhead(days) => today + Duration::days(days as i64),
        BookingBound::FixedDate(fixed) => fixed,
    };
    if date < min_date {
        return false;
    }

    let max_date = match config.booking_window.max {
        BookingBound::DaysAhead(days) => today + Duration::days(days as i64),
        BookingBound::FixedDate(fixed) => fixed,
    };
    date <= max_date
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(first_of_next) => first_of_next.pred_opt().map(|d| d.day()).unwrap_or(0),
        None => 0,
    }
}
