use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::domain::models::service::{CustomSlot, ServiceConfig, SlotPlan, TimeWindow};
use crate::domain::models::slot::{Slot, SlotKind};
use crate::error::AppError;

/// Generate the candidate slots for a service on a date. Pure: no store
/// access, no capacity accounting. All arithmetic is seconds-of-day, so no
/// calendar rollover can occur.
pub fn generate_slots(config: &ServiceConfig, date: NaiveDate) -> Result<Vec<Slot>, AppError> {
    match &config.plan {
        SlotPlan::FixedDuration {
            slot_duration_min,
            buffer_min,
            daily_windows,
            lunch_break,
            price,
        } => {
            if *slot_duration_min == 0 {
                return Err(AppError::Config("slot duration must be positive".into()));
            }

            let day = match daily_windows.day(date.weekday()) {
                Some(day) if !day.closed => day,
                _ => return Ok(Vec::new()),
            };

            let mut slots = Vec::new();
            for window in &day.windows {
                step_window(
                    window,
                    *slot_duration_min,
                    *buffer_min,
                    lunch_break.as_ref(),
                    config.max_participants,
                    price.clone(),
                    &mut slots,
                );
            }

            slots.sort_by_key(|s| (s.start, s.end));
            Ok(slots)
        }
        SlotPlan::Custom { slots } => {
            let weekday = date.weekday().number_from_monday() as u8;

            let mut out: Vec<Slot> = slots
                .iter()
                .filter(|s| s.weekdays.is_empty() || s.weekdays.contains(&weekday))
                .map(custom_slot)
                .collect();

            out.sort_by_key(|s| (s.start, s.end));
            Ok(out)
        }
    }
}

fn custom_slot(config: &CustomSlot) -> Slot {
    Slot {
        start: config.start,
        end: config.end,
        kind: SlotKind::Custom,
        capacity: config.capacity,
        price: config.price.clone(),
    }
}

fn step_window(
    window: &TimeWindow,
    duration_min: u32,
    buffer_min: u32,
    lunch_break: Option<&TimeWindow>,
    capacity: u32,
    price: Option<String>,
    out: &mut Vec<Slot>,
) {
    let duration = duration_min * 60;
    let buffer = buffer_min * 60;

    let mut cursor = seconds_of_day(window.start);
    let end = seconds_of_day(window.end);
    let lunch = lunch_break.map(|b| (seconds_of_day(b.start), seconds_of_day(b.end)));

    // Inverted or zero-length windows produce nothing.
    while cursor < end {
        let slot_end = cursor + duration;

        // A slot intersecting the break is dropped and the cursor resumes
        // at the break's end.
        if let Some((break_start, break_end)) = lunch {
            if break_start < break_end && cursor < break_end && slot_end > break_start {
                cursor = break_end;
                continue;
            }
        }

        if slot_end <= end {
            if let (Some(start_t), Some(end_t)) = (time_of_day(cursor), time_of_day(slot_end)) {
                out.push(Slot {
                    start: start_t,
                    end: end_t,
                    kind: SlotKind::Time,
                    capacity,
                    price: price.clone(),
                });
            }
        }

        cursor = slot_end + buffer;
    }
}

fn seconds_of_day(t: NaiveTime) -> u32 {
    t.num_seconds_from_midnight()
}

fn time_of_day(seconds: u32) -> Option<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::service::{BookingWindow, DaySchedule, WeekSchedule};
    use std::collections::BTreeSet;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn every_day(windows: Vec<TimeWindow>) -> WeekSchedule {
        let day = Some(DaySchedule { closed: false, windows });
        WeekSchedule {
            monday: day.clone(),
            tuesday: day.clone(),
            wednesday: day.clone(),
            thursday: day.clone(),
            friday: day.clone(),
            saturday: day.clone(),
            sunday: day,
        }
    }

    fn fixed_config(windows: Vec<TimeWindow>, duration: u32, buffer: u32, lunch: Option<TimeWindow>) -> ServiceConfig {
        ServiceConfig {
            max_participants: 1,
            plan: SlotPlan::FixedDuration {
                slot_duration_min: duration,
                buffer_min: buffer,
                daily_windows: every_day(windows),
                lunch_break: lunch,
                price: None,
            },
            booking_window: BookingWindow::default(),
            excluded_dates: BTreeSet::new(),
            cutoff_hours: 0,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 3).unwrap()
    }

    #[test]
    fn full_day_window_yields_contiguous_slots() {
        let config = fixed_config(
            vec![TimeWindow { start: t(9, 0), end: t(17, 0) }],
            30,
            0,
            None,
        );
        let slots = generate_slots(&config, monday()).unwrap();

        assert_eq!(slots.len(), 16);
        assert_eq!(slots[0].start, t(9, 0));
        assert_eq!(slots[0].end, t(9, 30));
        assert_eq!(slots[15].start, t(16, 30));
        assert_eq!(slots[15].end, t(17, 0));
        for pair in slots.windows(2) {
            assert!(pair[0].end <= pair[1].start, "slots must not overlap");
        }
    }

    #[test]
    fn lunch_break_removes_overlapping_slots_and_resumes_after() {
        let config = fixed_config(
            vec![TimeWindow { start: t(9, 0), end: t(17, 0) }],
            30,
            0,
            Some(TimeWindow { start: t(12, 0), end: t(13, 0) }),
        );
        let slots = generate_slots(&config, monday()).unwrap();

        assert_eq!(slots.len(), 14);
        assert!(slots.iter().all(|s| s.end <= t(12, 0) || s.start >= t(13, 0)));
        assert!(slots.iter().any(|s| s.start == t(11, 30)));
        assert!(slots.iter().any(|s| s.start == t(13, 0)));
        assert!(!slots.iter().any(|s| s.start == t(12, 0) || s.start == t(12, 30)));
    }

    #[test]
    fn buffer_spaces_out_slots() {
        let config = fixed_config(
            vec![TimeWindow { start: t(9, 0), end: t(11, 0) }],
            30,
            15,
            None,
        );
        let slots = generate_slots(&config, monday()).unwrap();

        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![t(9, 0), t(9, 45), t(10, 30)]);
    }

    #[test]
    fn trailing_partial_slot_is_not_emitted() {
        let config = fixed_config(
            vec![TimeWindow { start: t(9, 0), end: t(10, 15) }],
            30,
            0,
            None,
        );
        let slots = generate_slots(&config, monday()).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots.last().unwrap().end, t(10, 0));
    }

    #[test]
    fn inverted_window_yields_nothing() {
        let config = fixed_config(
            vec![TimeWindow { start: t(17, 0), end: t(9, 0) }],
            30,
            0,
            None,
        );
        assert!(generate_slots(&config, monday()).unwrap().is_empty());
    }

    #[test]
    fn closed_or_missing_weekday_yields_nothing() {
        let mut config = fixed_config(
            vec![TimeWindow { start: t(9, 0), end: t(17, 0) }],
            30,
            0,
            None,
        );
        if let SlotPlan::FixedDuration { daily_windows, .. } = &mut config.plan {
            daily_windows.monday = None;
            daily_windows.tuesday.as_mut().unwrap().closed = true;
        }

        assert!(generate_slots(&config, monday()).unwrap().is_empty());
        let tuesday = monday().succ_opt().unwrap();
        assert!(generate_slots(&config, tuesday).unwrap().is_empty());
    }

    #[test]
    fn zero_duration_is_a_config_error() {
        let config = fixed_config(
            vec![TimeWindow { start: t(9, 0), end: t(17, 0) }],
            0,
            0,
            None,
        );
        assert!(matches!(
            generate_slots(&config, monday()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn multiple_windows_merge_sorted() {
        let config = fixed_config(
            vec![
                TimeWindow { start: t(14, 0), end: t(16, 0) },
                TimeWindow { start: t(9, 0), end: t(11, 0) },
            ],
            60,
            0,
            None,
        );
        let slots = generate_slots(&config, monday()).unwrap();
        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![t(9, 0), t(10, 0), t(14, 0), t(15, 0)]);
    }

    #[test]
    fn custom_slots_filter_by_weekday() {
        let config = ServiceConfig {
            max_participants: 1,
            plan: SlotPlan::Custom {
                slots: vec![
                    CustomSlot {
                        start: t(10, 0),
                        end: t(12, 0),
                        weekdays: BTreeSet::from([1]),
                        capacity: 4,
                        price: Some("25.00".into()),
                    },
                    CustomSlot {
                        start: t(14, 0),
                        end: t(15, 0),
                        weekdays: BTreeSet::from([6, 7]),
                        capacity: 2,
                        price: None,
                    },
                    CustomSlot {
                        start: t(8, 0),
                        end: t(9, 0),
                        weekdays: BTreeSet::new(),
                        capacity: 1,
                        price: None,
                    },
                ],
            },
            booking_window: BookingWindow::default(),
            excluded_dates: BTreeSet::new(),
            cutoff_hours: 0,
        };

        let slots = generate_slots(&config, monday()).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start, t(8, 0));
        assert_eq!(slots[1].start, t(10, 0));
        assert_eq!(slots[1].capacity, 4);
        assert_eq!(slots[1].price.as_deref(), Some("25.00"));

        let saturday = NaiveDate::from_ymd_opt(2030, 6, 8).unwrap();
        let slots = generate_slots(&config, saturday).unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().any(|s| s.start == t(14, 0)));
    }
}
