use super::*;
use booking_auth::Member;
use booking_core::ID;
use std::sync::PoisonError;
use std::sync::RwLock;
use time::OffsetDateTime;

#[derive(Debug, Default)]
struct Tables {
    facilitators: Vec<Facilitator>,
    events: Vec<Event>,
    bookings: Vec<Booking>,
}

impl Tables {
    fn event(&self, id: ID<Event>) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }
    fn host(&self, event: &Event) -> &str {
        self.facilitators
            .iter()
            .find(|f| f.id == event.facilitator_id)
            .map(|f| f.name.as_str())
            .unwrap_or_default()
    }
}

/// In-memory ledger. One lock guards all three tables, so every check
/// and its write happen under the same guard.
#[derive(Debug, Default)]
pub struct Agenda {
    tables: RwLock<Tables>,
}

impl Agenda {
    /// Adds an event with the next free id, ignoring `event.id`.
    pub fn schedule(&self, mut event: Event) -> ID<Event> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        event.id = ID::from(tables.events.len() as i64 + 1);
        let id = event.id;
        tables.events.push(event);
        id
    }
}

#[async_trait::async_trait]
impl Ledger for Agenda {
    async fn events(&self, now: OffsetDateTime) -> anyhow::Result<Vec<Listing>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut listings = tables
            .events
            .iter()
            .filter(|e| e.upcoming(now))
            .map(|e| Listing {
                event: e.clone(),
                facilitator_name: tables.host(e).to_string(),
            })
            .collect::<Vec<_>>();
        listings.sort_by_key(|l| l.event.date);
        Ok(listings)
    }
    async fn book(
        &self,
        user: ID<Member>,
        id: ID<Event>,
        now: OffsetDateTime,
    ) -> Result<(ID<Booking>, Event), BookingError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let event = tables.event(id).cloned().ok_or(BookingError::EventNotFound)?;
        event.admits(now)?;
        if tables
            .bookings
            .iter()
            .any(|b| b.user_id == user && b.event_id == id)
        {
            return Err(BookingError::AlreadyBooked);
        }
        let booking = ID::from(tables.bookings.len() as i64 + 1);
        tables.bookings.push(Booking {
            id: booking,
            user_id: user,
            event_id: id,
            booking_date: now,
            status: Status::Confirmed,
        });
        if let Some(seat) = tables.events.iter_mut().find(|e| e.id == id) {
            seat.current_participants += 1;
        }
        Ok((booking, event))
    }
    async fn bookings(
        &self,
        user: ID<Member>,
        limit: Option<usize>,
    ) -> anyhow::Result<Vec<Reservation>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut reservations = tables
            .bookings
            .iter()
            .filter(|b| b.user_id == user)
            .filter_map(|b| {
                tables
                    .event(b.event_id)
                    .map(|e| Reservation::new(b, e, tables.host(e)))
            })
            .collect::<Vec<_>>();
        reservations.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        reservations.truncate(limit.unwrap_or(usize::MAX));
        Ok(reservations)
    }
    async fn cancel(
        &self,
        user: ID<Member>,
        id: ID<Booking>,
        now: OffsetDateTime,
    ) -> Result<(), BookingError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let booking = tables
            .bookings
            .iter()
            .find(|b| b.id == id && b.user_id == user)
            .cloned()
            .ok_or(BookingError::BookingNotFound)?;
        if booking.status == Status::Cancelled {
            return Err(BookingError::AlreadyCancelled);
        }
        let event = tables
            .event(booking.event_id)
            .ok_or(BookingError::EventNotFound)?;
        if event.past(now) {
            return Err(BookingError::PastCancellation);
        }
        if let Some(b) = tables.bookings.iter_mut().find(|b| b.id == id) {
            b.status = Status::Cancelled;
        }
        if let Some(e) = tables.events.iter_mut().find(|e| e.id == booking.event_id) {
            e.current_participants -= 1;
        }
        Ok(())
    }
    async fn stats(&self, user: ID<Member>, now: OffsetDateTime) -> anyhow::Result<Stats> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mine = tables
            .bookings
            .iter()
            .filter(|b| b.user_id == user)
            .filter_map(|b| tables.event(b.event_id).map(|e| (b, e)))
            .collect::<Vec<_>>();
        Ok(Stats {
            total_bookings: mine.len() as i64,
            upcoming_bookings: mine
                .iter()
                .filter(|(b, e)| !e.past(now) && b.status != Status::Cancelled)
                .count() as i64,
            past_bookings: mine.iter().filter(|(_, e)| e.past(now)).count() as i64,
            total_events: tables.events.iter().filter(|e| e.upcoming(now)).count() as i64,
        })
    }
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
    async fn seed(&self, now: OffsetDateTime) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if !tables.facilitators.is_empty() {
            return Ok(false);
        }
        for (i, p) in seed::PROFILES.iter().enumerate() {
            tables.facilitators.push(Facilitator {
                id: ID::from(i as i64 + 1),
                name: p.name.to_string(),
                email: p.email.to_string(),
                specialization: p.specialization.to_string(),
                bio: p.bio.to_string(),
            });
        }
        for o in seed::OFFERINGS.iter() {
            let id = ID::from(tables.events.len() as i64 + 1);
            let host = tables.facilitators[o.host].id;
            tables.events.push(Event {
                id,
                title: o.title.to_string(),
                description: o.description.to_string(),
                date: o.date(now),
                duration: o.duration,
                location: o.location.to_string(),
                price: o.price,
                max_participants: o.capacity,
                current_participants: 0,
                facilitator_id: host,
                kind: o.kind.to_string(),
                active: true,
            });
        }
        log::info!(
            "seeded {} facilitators and {} events in memory",
            tables.facilitators.len(),
            tables.events.len()
        );
        Ok(true)
    }
}
