use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub config_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(name: String, description: String, config: &ServiceConfig) -> Result<Self, AppError> {
        config.validate()?;
        let config_json = serde_json::to_string(config)
            .map_err(|_| AppError::Config("config is not serializable".into()))?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            config_json,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn config(&self) -> Result<ServiceConfig, AppError> {
        let config: ServiceConfig = serde_json::from_str(&self.config_json)
            .map_err(|e| AppError::Config(format!("malformed service configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DaySchedule {
    pub closed: bool,
    pub windows: Vec<TimeWindow>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct WeekSchedule {
    pub monday: Option<DaySchedule>,
    pub tuesday: Option<DaySchedule>,
    pub wednesday: Option<DaySchedule>,
    pub thursday: Option<DaySchedule>,
    pub friday: Option<DaySchedule>,
    pub saturday: Option<DaySchedule>,
    pub sunday: Option<DaySchedule>,
}

impl WeekSchedule {
    pub fn day(&self, weekday: Weekday) -> Option<&DaySchedule> {
        match weekday {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// ISO weekdays 1-7 this slot applies to. Empty means every day.
    #[serde(default)]
    pub weekdays: BTreeSet<u8>,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

fn default_capacity() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SlotPlan {
    FixedDuration {
        slot_duration_min: u32,
        #[serde(default)]
        buffer_min: u32,
        daily_windows: WeekSchedule,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lunch_break: Option<TimeWindow>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price: Option<String>,
    },
    Custom {
        slots: Vec<CustomSlot>,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BookingBound {
    DaysAhead(u32),
    FixedDate(NaiveDate),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingWindow {
    #[serde(default = "default_min_bound")]
    pub min: BookingBound,
    #[serde(default = "default_max_bound")]
    pub max: BookingBound,
}

impl Default for BookingWindow {
    fn default() -> Self {
        Self {
            min: default_min_bound(),
            max: default_max_bound(),
        }
    }
}

fn default_min_bound() -> BookingBound {
    BookingBound::DaysAhead(1)
}

fn default_max_bound() -> BookingBound {
    BookingBound::DaysAhead(60)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_capacity")]
    pub max_participants: u32,
    #[serde(flatten)]
    pub plan: SlotPlan,
    #[serde(default)]
    pub booking_window: BookingWindow,
    #[serde(default)]
    pub excluded_dates: BTreeSet<NaiveDate>,
    /// Self-service changes are blocked within this many hours of the
    /// appointment start. Zero disables the cutoff.
    #[serde(default)]
    pub cutoff_hours: u32,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_participants == 0 {
            return Err(AppError::Config("max_participants must be at least 1".into()));
        }

        match &self.plan {
            SlotPlan::FixedDuration { slot_duration_min, .. } => {
                if *slot_duration_min == 0 {
                    return Err(AppError::Config("slot duration must be positive".into()));
                }
            }
            SlotPlan::Custom { slots } => {
                for slot in slots {
                    if slot.capacity == 0 {
                        return Err(AppError::Config("custom slot capacity must be at least 1".into()));
                    }
                    if let Some(day) = slot.weekdays.iter().find(|d| **d < 1 || **d > 7) {
                        return Err(AppError::Config(format!("invalid weekday {} in custom slot", day)));
                    }
                }
            }
        }

        Ok(())
    }
}
