//! Events, bookings, and the member dashboard.
//!
//! Every endpoint here except [`health`] sits behind the
//! [`booking_auth::Auth`] gate and acts on the gate's resolved member.
//!
//! ## Domain
//!
//! - [`Facilitator`] — Person running events
//! - [`Event`], [`Listing`] — Bookable events and their public view
//! - [`Booking`], [`Reservation`] — Seats and their owner's view
//! - [`Stats`] — Dashboard counters
//! - [`BookingError`] — Refusals with their HTTP statuses
//!
//! ## Storage
//!
//! - [`Ledger`] — Store seam, implemented for `tokio_postgres::Client`
//!   under feature `database`
//! - [`Agenda`] — In-memory ledger
//! - [`seed`] — Sample facilitators and events
mod agenda;
mod booking;
mod error;
mod event;
mod facilitator;
mod ledger;
mod stats;
pub mod seed;

pub use agenda::*;
pub use booking::*;
pub use error::*;
pub use event::*;
pub use facilitator::*;
pub use ledger::*;
pub use stats::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
pub use handlers::*;
