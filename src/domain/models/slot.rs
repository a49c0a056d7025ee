use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Time,
    Custom,
}

/// A candidate bookable interval produced by the slot generator. Not
/// persisted; (start, end) is the capacity-sharing identity.
#[derive(Debug, Serialize, Clone)]
pub struct Slot {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub kind: SlotKind,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SlotAvailability {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub slots: Vec<SlotAvailability>,
}

pub type MonthGrid = Vec<Vec<Option<DayCell>>>;
