/// Per-member dashboard counters.
///
/// `upcoming_bookings` skips cancelled bookings; `past_bookings` does not.
/// `total_events` counts every active future event, booked or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Stats {
    pub total_bookings: i64,
    pub upcoming_bookings: i64,
    pub past_bookings: i64,
    pub total_events: i64,
}
