use super::*;
use booking_core::ID;
use booking_core::Unique;
use time::OffsetDateTime;

/// A bookable event.
///
/// Capacity is tracked on the row itself: `current_participants` counts
/// confirmed bookings and moves in the same statement as the booking row.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Event {
    pub id: ID<Self>,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Minutes.
    pub duration: i32,
    pub location: String,
    pub price: f64,
    pub max_participants: i32,
    pub current_participants: i32,
    pub facilitator_id: ID<Facilitator>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip)]
    pub active: bool,
}

impl Event {
    pub fn full(&self) -> bool {
        self.current_participants >= self.max_participants
    }
    /// Started or finished; the boundary instant counts as past.
    pub fn past(&self, now: OffsetDateTime) -> bool {
        self.date <= now
    }
    /// Listed on the events page and counted in dashboard totals.
    pub fn upcoming(&self, now: OffsetDateTime) -> bool {
        self.active && !self.past(now)
    }
    /// Whether a new seat may be taken, checked capacity first.
    pub fn admits(&self, now: OffsetDateTime) -> Result<(), BookingError> {
        if self.full() {
            return Err(BookingError::FullyBooked);
        }
        if self.past(now) {
            return Err(BookingError::PastEvent);
        }
        Ok(())
    }
}

impl Unique for Event {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// An event as shown on the events page.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Listing {
    #[serde(flatten)]
    pub event: Event,
    pub facilitator_name: String,
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use booking_pg::*;

    impl Schema for Event {
        fn name() -> &'static str {
            EVENTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                EVENTS,
                " (
                    id                   BIGSERIAL PRIMARY KEY,
                    title                VARCHAR(200) NOT NULL,
                    description          TEXT NOT NULL DEFAULT '',
                    date                 TIMESTAMPTZ NOT NULL,
                    duration             INTEGER NOT NULL,
                    location             VARCHAR(200) NOT NULL,
                    price                DOUBLE PRECISION NOT NULL,
                    max_participants     INTEGER NOT NULL,
                    current_participants INTEGER NOT NULL DEFAULT 0,
                    facilitator_id       BIGINT NOT NULL REFERENCES ",
                FACILITATORS,
                "(id),
                    type                 VARCHAR(50) NOT NULL,
                    status               VARCHAR(50) NOT NULL DEFAULT 'active',
                    created_at           TIMESTAMPTZ NOT NULL DEFAULT now(),
                    CHECK (current_participants >= 0)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_events_date ON ",
                EVENTS,
                " (date);
                 CREATE INDEX IF NOT EXISTS idx_events_facilitator ON ",
                EVENTS,
                " (facilitator_id);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2030-01-01 12:00 UTC);

    fn event(max: i32, current: i32, date: OffsetDateTime) -> Event {
        Event {
            id: ID::from(1),
            title: "Morning Meditation Session".into(),
            description: String::new(),
            date,
            duration: 60,
            location: "Zen Studio, Downtown".into(),
            price: 25.0,
            max_participants: max,
            current_participants: current,
            facilitator_id: ID::from(1),
            kind: "session".into(),
            active: true,
        }
    }

    #[test]
    fn capacity_is_checked_before_date() {
        let full_and_past = event(1, 1, NOW - Duration::days(1));
        assert!(matches!(full_and_past.admits(NOW), Err(BookingError::FullyBooked)));
    }

    #[test]
    fn event_at_now_is_past() {
        let e = event(10, 0, NOW);
        assert!(e.past(NOW));
        assert!(!e.upcoming(NOW));
        assert!(matches!(e.admits(NOW), Err(BookingError::PastEvent)));
        assert!(event(10, 0, NOW + Duration::seconds(1)).admits(NOW).is_ok());
    }

    #[test]
    fn inactive_events_are_not_upcoming() {
        let mut e = event(10, 0, NOW + Duration::days(3));
        e.active = false;
        assert!(!e.upcoming(NOW));
    }

    #[test]
    fn listing_serializes_flat() {
        let listing = Listing {
            event: event(15, 2, NOW),
            facilitator_name: "Dr. Sarah Johnson".into(),
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["type"], "session");
        assert_eq!(json["facilitator_name"], "Dr. Sarah Johnson");
        assert_eq!(json["facilitator_id"], 1);
        assert_eq!(json["date"], "2030-01-01T12:00:00Z");
        assert!(json.get("active").is_none());
    }
}
