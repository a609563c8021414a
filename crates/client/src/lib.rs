//! Session client for the booking backend.
//!
//! Holds the bearer token and the signed-in user, attaches the token to
//! every request from a single place, and drops to unauthenticated when
//! the backend refuses the token.
//!
//! ## Session
//!
//! - [`Client`] — Ticketed session state machine
//! - [`Session`], [`Phase`] — Snapshot of the session
//! - [`ClientError`] — Outcomes a caller must handle
//!
//! ## Seams
//!
//! - [`Transport`], [`Http`] — Request delivery
//! - [`Vault`], [`FileVault`], [`MemoryVault`] — Token persistence
mod client;
mod error;
mod session;
mod transport;
mod vault;

pub use client::*;
pub use error::*;
pub use session::*;
pub use transport::*;
pub use vault::*;
