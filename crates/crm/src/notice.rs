use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Booking notification sent from the backend to the CRM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub booking_id: i64,
    pub user: Attendee,
    pub event: Occasion,
    pub facilitator_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// `date` is carried verbatim as the backend formatted it (RFC 3339).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occasion {
    pub id: i64,
    pub title: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Shape errors reported back to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid user object")]
    InvalidUser,
    #[error("Invalid event object")]
    InvalidEvent,
}

impl Malformed {
    /// Field names the sender must supply at the level that failed.
    pub fn required(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::MissingFields => ("required", Notice::FIELDS),
            Self::InvalidUser => ("required_user_fields", Attendee::FIELDS),
            Self::InvalidEvent => ("required_event_fields", Occasion::FIELDS),
        }
    }
}

impl Attendee {
    const FIELDS: &'static [&'static str] = &["id", "name", "email"];
}

impl Occasion {
    const FIELDS: &'static [&'static str] = &["id", "title", "date", "type"];
}

impl Notice {
    const FIELDS: &'static [&'static str] = &["booking_id", "user", "event", "facilitator_id"];

    /// Validates an untrusted body level by level so the sender learns
    /// which object was wrong, then decodes it.
    pub fn parse(body: &Value) -> Result<Self, Malformed> {
        fn complete(value: Option<&Value>, fields: &[&str]) -> bool {
            value
                .and_then(Value::as_object)
                .is_some_and(|object| fields.iter().all(|f| object.contains_key(*f)))
        }
        if !complete(Some(body), Self::FIELDS) {
            return Err(Malformed::MissingFields);
        }
        if !complete(body.get("user"), Attendee::FIELDS) {
            return Err(Malformed::InvalidUser);
        }
        if !complete(body.get("event"), Occasion::FIELDS) {
            return Err(Malformed::InvalidEvent);
        }
        let user = serde_json::from_value(body["user"].clone()).map_err(|_| Malformed::InvalidUser)?;
        let event =
            serde_json::from_value(body["event"].clone()).map_err(|_| Malformed::InvalidEvent)?;
        let booking_id = body["booking_id"].as_i64().ok_or(Malformed::MissingFields)?;
        let facilitator_id = body["facilitator_id"]
            .as_i64()
            .ok_or(Malformed::MissingFields)?;
        Ok(Self {
            booking_id,
            user,
            event,
            facilitator_id,
        })
    }
}
