use crate::domain::models::{booking::Booking, service::Service};
use icalendar::{Calendar, CalendarDateTime, Component, Event as IcalEvent, EventLike};

/// Generates an iCalendar (.ics) string for a booking. Times are floating
/// (service-local), matching how appointments are stored.
pub fn generate_ics(service: &Service, booking: &Booking) -> String {
    let start = booking.appointment_date.and_time(booking.start_time);
    let end = booking.appointment_date.and_time(booking.end_time);

    let mut calendar = Calendar::new();

    let ical_event = IcalEvent::new()
        .summary(&service.name)
        .description(&service.description)
        .starts(CalendarDateTime::Floating(start))
        .ends(CalendarDateTime::Floating(end))
        .uid(&booking.id)
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
