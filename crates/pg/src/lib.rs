//! PostgreSQL integration for the booking backend.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection from a connection URL
//!
//! ## Tables
//!
//! - [`Schema`] — Table metadata and DDL generation
//! - [`create`] — Idempotent table creation at startup
//!
//! Constants name every persistent entity: users, facilitators, events
//! and bookings.
mod schema;

pub use schema::*;

use std::sync::Arc;
use tokio_postgres::Client;

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Establishes a database connection.
///
/// Returns an `Arc<Client>` suitable for sharing across request handlers.
/// The connection task is spawned onto the current runtime.
pub async fn db(url: &str) -> Result<Arc<Client>, PgErr> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}

/// Table for registered user accounts.
#[rustfmt::skip]
pub const USERS:        &str = "users";
/// Table for event facilitators.
#[rustfmt::skip]
pub const FACILITATORS: &str = "facilitators";
/// Table for bookable events.
#[rustfmt::skip]
pub const EVENTS:       &str = "events";
/// Table for user bookings of events.
#[rustfmt::skip]
pub const BOOKINGS:     &str = "bookings";
