use super::*;
use booking_auth::Member;
use booking_core::ID;
use booking_core::Unique;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Confirmed,
    Cancelled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        match s {
            "cancelled" => Self::Cancelled,
            _ => Self::Confirmed,
        }
    }
}

/// A member's seat at an event. At most one per (member, event), whatever
/// its status: a cancelled booking still blocks rebooking.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: ID<Self>,
    pub user_id: ID<Member>,
    pub event_id: ID<Event>,
    pub booking_date: OffsetDateTime,
    pub status: Status,
}

impl Unique for Booking {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// A booking joined with its event and facilitator, as listed to its owner.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Reservation {
    pub id: ID<Booking>,
    pub event_id: ID<Event>,
    pub event_title: String,
    pub event_description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub event_date: OffsetDateTime,
    pub event_duration: i32,
    pub event_location: String,
    pub event_price: f64,
    pub event_type: String,
    pub facilitator_name: String,
    pub status: Status,
    #[serde(with = "time::serde::rfc3339")]
    pub booking_date: OffsetDateTime,
}

impl Reservation {
    pub fn new(booking: &Booking, event: &Event, facilitator: &str) -> Self {
        Self {
            id: booking.id,
            event_id: event.id,
            event_title: event.title.clone(),
            event_description: event.description.clone(),
            event_date: event.date,
            event_duration: event.duration,
            event_location: event.location.clone(),
            event_price: event.price,
            event_type: event.kind.clone(),
            facilitator_name: facilitator.to_string(),
            status: booking.status,
            booking_date: booking.booking_date,
        }
    }
}

/// CRM payload for a freshly committed booking.
pub fn notice(booking: ID<Booking>, member: &Member, event: &Event) -> booking_crm::Notice {
    booking_crm::Notice {
        booking_id: booking.inner(),
        user: booking_crm::Attendee {
            id: member.id().inner(),
            name: member.name().to_string(),
            email: member.email().to_string(),
        },
        event: booking_crm::Occasion {
            id: event.id.inner(),
            title: event.title.clone(),
            date: event
                .date
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            kind: event.kind.clone(),
        },
        facilitator_id: event.facilitator_id.inner(),
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use booking_pg::*;

    impl Schema for Booking {
        fn name() -> &'static str {
            BOOKINGS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                BOOKINGS,
                " (
                    id              BIGSERIAL PRIMARY KEY,
                    user_id         BIGINT NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE,
                    event_id        BIGINT NOT NULL REFERENCES ",
                EVENTS,
                "(id),
                    booking_date    TIMESTAMPTZ NOT NULL DEFAULT now(),
                    status          VARCHAR(50) NOT NULL DEFAULT 'confirmed',
                    CONSTRAINT unique_user_event UNIQUE (user_id, event_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_bookings_user ON ",
                BOOKINGS,
                " (user_id);"
            )
        }
    }
}
