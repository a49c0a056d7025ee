use crate::domain::models::slot::{MonthGrid, SlotAvailability};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub slots: Vec<SlotAvailability>,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub weeks: MonthGrid,
}
