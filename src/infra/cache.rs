use chrono::{NaiveDate, NaiveTime};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::models::booking::BookedInterval;

/// Key for the per-date booked-interval list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DayKey {
    pub service_id: String,
    pub date: NaiveDate,
}

/// Key for the per-slot booked-participant count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotCountKey {
    pub service_id: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Short-TTL memoization of availability reads. The TTL bounds staleness if
/// an explicit invalidation is ever missed; booking mutations call
/// `invalidate_date` synchronously before reporting success.
#[derive(Clone)]
pub struct AvailabilityCache {
    day_bookings: Cache<DayKey, Arc<Vec<BookedInterval>>>,
    slot_counts: Cache<SlotCountKey, i64>,
}

impl AvailabilityCache {
    pub fn new(ttl: Duration) -> Self {
        let day_bookings = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        let slot_counts = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();

        Self { day_bookings, slot_counts }
    }

    pub async fn get_day_bookings(&self, key: &DayKey) -> Option<Arc<Vec<BookedInterval>>> {
        self.day_bookings.get(key).await
    }

    pub async fn put_day_bookings(&self, key: DayKey, value: Arc<Vec<BookedInterval>>) {
        self.day_bookings.insert(key, value).await;
    }

    pub async fn get_slot_count(&self, key: &SlotCountKey) -> Option<i64> {
        self.slot_counts.get(key).await
    }

    pub async fn put_slot_count(&self, key: SlotCountKey, value: i64) {
        self.slot_counts.insert(key, value).await;
    }

    /// Drop every cached read for (service, date): the day interval list and
    /// all per-slot counts keyed under that pair.
    pub async fn invalidate_date(&self, service_id: &str, date: NaiveDate) {
        self.day_bookings
            .invalidate(&DayKey { service_id: service_id.to_string(), date })
            .await;

        let service_id = service_id.to_string();
        if let Err(e) = self
            .slot_counts
            .invalidate_entries_if(move |key, _| key.service_id == service_id && key.date == date)
        {
            warn!("slot-count cache invalidation failed: {:?}", e);
        }
    }
}
