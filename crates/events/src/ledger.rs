use super::*;
use booking_auth::Member;
use booking_core::ID;
use time::OffsetDateTime;

/// Event and booking store.
///
/// Every time-dependent rule takes `now` from the caller so handlers and
/// tests agree on a single clock reading per request. Seat accounting is
/// the store's job: a booking and its participant increment (or a
/// cancellation and its decrement) land together or not at all.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    /// Active future events, soonest first.
    async fn events(&self, now: OffsetDateTime) -> anyhow::Result<Vec<Listing>>;
    /// Takes a seat. Returns the new booking id and the event as it was
    /// before the seat was taken.
    async fn book(
        &self,
        user: ID<Member>,
        event: ID<Event>,
        now: OffsetDateTime,
    ) -> Result<(ID<Booking>, Event), BookingError>;
    /// The member's bookings, latest event first.
    async fn bookings(
        &self,
        user: ID<Member>,
        limit: Option<usize>,
    ) -> anyhow::Result<Vec<Reservation>>;
    /// Releases a seat. Only the booking's owner may cancel it.
    async fn cancel(
        &self,
        user: ID<Member>,
        booking: ID<Booking>,
        now: OffsetDateTime,
    ) -> Result<(), BookingError>;
    async fn stats(&self, user: ID<Member>, now: OffsetDateTime) -> anyhow::Result<Stats>;
    /// Round trip to the backing store.
    async fn ping(&self) -> anyhow::Result<()>;
    /// Writes the sample facilitators and events if none exist.
    /// Returns whether anything was written.
    async fn seed(&self, now: OffsetDateTime) -> anyhow::Result<bool>;
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use booking_pg::*;
    use const_format::concatcp;
    use tokio_postgres::Client;
    use tokio_postgres::Row;
    use tokio_postgres::error::SqlState;

    const EVENT: &str = concatcp!(
        "e.id, e.title, e.description, e.date, e.duration, e.location, e.price, ",
        "e.max_participants, e.current_participants, e.facilitator_id, e.type, e.status"
    );

    fn event(row: &Row) -> Event {
        Event {
            id: ID::from(row.get::<_, i64>(0)),
            title: row.get(1),
            description: row.get(2),
            date: row.get(3),
            duration: row.get(4),
            location: row.get(5),
            price: row.get(6),
            max_participants: row.get(7),
            current_participants: row.get(8),
            facilitator_id: ID::from(row.get::<_, i64>(9)),
            kind: row.get(10),
            active: row.get::<_, &str>(11) == "active",
        }
    }

    /// Prechecks that pick the refusal message for a booking attempt.
    async fn eligible(
        client: &Client,
        user: ID<Member>,
        id: ID<Event>,
        now: OffsetDateTime,
    ) -> Result<Event, BookingError> {
        const EVENT_SQL: &str = concatcp!("SELECT ", EVENT, " FROM ", EVENTS, " e WHERE e.id = $1");
        const HELD_SQL: &str = concatcp!(
            "SELECT 1 FROM ", BOOKINGS, " WHERE user_id = $1 AND event_id = $2"
        );
        let event = client
            .query_opt(EVENT_SQL, &[&id.inner()])
            .await
            .map_err(anyhow::Error::from)?
            .map(|row| event(&row))
            .ok_or(BookingError::EventNotFound)?;
        event.admits(now)?;
        match client
            .query_opt(HELD_SQL, &[&user.inner(), &id.inner()])
            .await
            .map_err(anyhow::Error::from)?
        {
            Some(_) => Err(BookingError::AlreadyBooked),
            None => Ok(event),
        }
    }

    /// Prechecks that pick the refusal message for a cancellation.
    async fn cancellable(
        client: &Client,
        user: ID<Member>,
        id: ID<Booking>,
        now: OffsetDateTime,
    ) -> Result<(), BookingError> {
        const SQL: &str = concatcp!(
            "SELECT b.status, e.date ",
            "FROM   ", BOOKINGS, " b ",
            "JOIN   ", EVENTS, " e ON e.id = b.event_id ",
            "WHERE  b.id = $1 AND b.user_id = $2"
        );
        let row = client
            .query_opt(SQL, &[&id.inner(), &user.inner()])
            .await
            .map_err(anyhow::Error::from)?
            .ok_or(BookingError::BookingNotFound)?;
        if Status::from(row.get::<_, &str>(0)) == Status::Cancelled {
            return Err(BookingError::AlreadyCancelled);
        }
        if row.get::<_, OffsetDateTime>(1) <= now {
            return Err(BookingError::PastCancellation);
        }
        Ok(())
    }

    #[rustfmt::skip]
    #[async_trait::async_trait]
    impl Ledger for Client {
        async fn events(&self, now: OffsetDateTime) -> anyhow::Result<Vec<Listing>> {
            const SQL: &str = concatcp!(
                "SELECT ", EVENT, ", f.name ",
                "FROM   ", EVENTS, " e ",
                "JOIN   ", FACILITATORS, " f ON f.id = e.facilitator_id ",
                "WHERE  e.status = 'active' AND e.date > $1 ",
                "ORDER BY e.date"
            );
            Ok(self
                .query(SQL, &[&now])
                .await?
                .iter()
                .map(|row| Listing { event: event(row), facilitator_name: row.get(12) })
                .collect())
        }
        async fn book(&self, user: ID<Member>, id: ID<Event>, now: OffsetDateTime) -> Result<(ID<Booking>, Event), BookingError> {
            // guards repeat inside the UPDATE; the prechecks only pick the message
            const SQL: &str = concatcp!(
                "WITH seat AS ( ",
                    "UPDATE ", EVENTS, " ",
                    "SET    current_participants = current_participants + 1 ",
                    "WHERE  id = $2 ",
                    "AND    date > $3 ",
                    "AND    current_participants < max_participants ",
                    "AND    NOT EXISTS (SELECT 1 FROM ", BOOKINGS, " WHERE user_id = $1 AND event_id = $2) ",
                    "RETURNING id ",
                ") ",
                "INSERT INTO ", BOOKINGS, " (user_id, event_id, booking_date, status) ",
                "SELECT $1, id, $3, 'confirmed' FROM seat ",
                "RETURNING id"
            );
            let event = eligible(self, user, id, now).await?;
            match self.query_opt(SQL, &[&user.inner(), &id.inner(), &now]).await {
                Ok(Some(row)) => Ok((ID::from(row.get::<_, i64>(0)), event)),
                Ok(None) => eligible(self, user, id, now).await.and(Err(BookingError::AlreadyBooked)),
                Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => Err(BookingError::AlreadyBooked),
                Err(e) => Err(BookingError::Internal(e.into())),
            }
        }
        async fn bookings(&self, user: ID<Member>, limit: Option<usize>) -> anyhow::Result<Vec<Reservation>> {
            const SQL: &str = concatcp!(
                "SELECT b.id, e.id, e.title, e.description, e.date, e.duration, e.location, ",
                       "e.price, e.type, f.name, b.status, b.booking_date ",
                "FROM   ", BOOKINGS, " b ",
                "JOIN   ", EVENTS, " e ON e.id = b.event_id ",
                "JOIN   ", FACILITATORS, " f ON f.id = e.facilitator_id ",
                "WHERE  b.user_id = $1 ",
                "ORDER BY e.date DESC ",
                "LIMIT  $2"
            );
            let limit = limit.map(|n| n as i64);
            Ok(self
                .query(SQL, &[&user.inner(), &limit])
                .await?
                .iter()
                .map(|row| Reservation {
                    id: ID::from(row.get::<_, i64>(0)),
                    event_id: ID::from(row.get::<_, i64>(1)),
                    event_title: row.get(2),
                    event_description: row.get(3),
                    event_date: row.get(4),
                    event_duration: row.get(5),
                    event_location: row.get(6),
                    event_price: row.get(7),
                    event_type: row.get(8),
                    facilitator_name: row.get(9),
                    status: Status::from(row.get::<_, &str>(10)),
                    booking_date: row.get(11),
                })
                .collect())
        }
        async fn cancel(&self, user: ID<Member>, id: ID<Booking>, now: OffsetDateTime) -> Result<(), BookingError> {
            const SQL: &str = concatcp!(
                "WITH flip AS ( ",
                    "UPDATE ", BOOKINGS, " b ",
                    "SET    status = 'cancelled' ",
                    "FROM   ", EVENTS, " e ",
                    "WHERE  b.id = $1 ",
                    "AND    b.user_id = $2 ",
                    "AND    b.status <> 'cancelled' ",
                    "AND    e.id = b.event_id ",
                    "AND    e.date > $3 ",
                    "RETURNING b.event_id ",
                ") ",
                "UPDATE ", EVENTS, " ",
                "SET    current_participants = current_participants - 1 ",
                "WHERE  id IN (SELECT event_id FROM flip) ",
                "RETURNING id"
            );
            cancellable(self, user, id, now).await?;
            match self
                .query_opt(SQL, &[&id.inner(), &user.inner(), &now])
                .await
                .map_err(anyhow::Error::from)?
            {
                Some(_) => Ok(()),
                None => cancellable(self, user, id, now).await.and(Err(BookingError::AlreadyCancelled)),
            }
        }
        async fn stats(&self, user: ID<Member>, now: OffsetDateTime) -> anyhow::Result<Stats> {
            const SQL: &str = concatcp!(
                "SELECT ",
                "(SELECT COUNT(*) FROM ", BOOKINGS, " WHERE user_id = $1), ",
                "(SELECT COUNT(*) FROM ", BOOKINGS, " b JOIN ", EVENTS, " e ON e.id = b.event_id ",
                    "WHERE b.user_id = $1 AND e.date > $2 AND b.status <> 'cancelled'), ",
                "(SELECT COUNT(*) FROM ", BOOKINGS, " b JOIN ", EVENTS, " e ON e.id = b.event_id ",
                    "WHERE b.user_id = $1 AND e.date <= $2), ",
                "(SELECT COUNT(*) FROM ", EVENTS, " WHERE status = 'active' AND date > $2)"
            );
            let row = self.query_one(SQL, &[&user.inner(), &now]).await?;
            Ok(Stats {
                total_bookings: row.get(0),
                upcoming_bookings: row.get(1),
                past_bookings: row.get(2),
                total_events: row.get(3),
            })
        }
        async fn ping(&self) -> anyhow::Result<()> {
            self.simple_query("SELECT 1").await?;
            Ok(())
        }
        async fn seed(&self, now: OffsetDateTime) -> anyhow::Result<bool> {
            const ANY: &str = concatcp!("SELECT 1 FROM ", FACILITATORS, " LIMIT 1");
            const HOST: &str = concatcp!(
                "INSERT INTO ", FACILITATORS, " (name, email, specialization, bio) ",
                "VALUES ($1, $2, $3, $4) ",
                "RETURNING id"
            );
            const OFFERING: &str = concatcp!(
                "INSERT INTO ", EVENTS, " ",
                "(title, description, date, duration, location, price, max_participants, facilitator_id, type) ",
                "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
            );
            if self.query_opt(ANY, &[]).await?.is_some() {
                log::info!("sample data already present");
                return Ok(false);
            }
            let mut hosts = Vec::with_capacity(seed::PROFILES.len());
            for p in seed::PROFILES.iter() {
                let row = self.query_one(HOST, &[&p.name, &p.email, &p.specialization, &p.bio]).await?;
                hosts.push(row.get::<_, i64>(0));
            }
            for o in seed::OFFERINGS.iter() {
                self.execute(
                    OFFERING,
                    &[&o.title, &o.description, &o.date(now), &o.duration, &o.location, &o.price, &o.capacity, &hosts[o.host], &o.kind],
                )
                .await?;
            }
            log::info!("seeded {} facilitators and {} events", hosts.len(), seed::OFFERINGS.len());
            Ok(true)
        }
    }
}
