//! Authentication and identity management.
//!
//! Stateless JWT authentication with Argon2 password hashing. Tokens carry
//! the member id and an expiry; nothing is recorded server-side, so a token
//! stays valid until it expires or the client discards it.
//!
//! ## Identity
//!
//! - [`Member`] — Registered user, also the public profile
//! - [`AuthRepository`] — Credential store seam
//! - [`Roster`] — In-memory credential store
//!
//! ## Tokens
//!
//! - [`Crypto`] — JWT issuing and verification
//! - [`Claims`] — JWT payload structure
//! - [`Rejection`] — Why a presented token was refused
//! - [`password`] — Argon2 hashing and verification
//!
//! ## HTTP (feature `server`)
//!
//! - [`Auth`] — Extractor gating every protected endpoint
//! - [`register`], [`login`], [`me`] — `/auth` handlers
mod claims;
mod crypto;
mod dto;
mod error;
mod member;
pub mod password;
mod rejection;
mod repository;
mod roster;

pub use claims::*;
pub use crypto::*;
pub use dto::*;
pub use error::*;
pub use member::*;
pub use rejection::*;
pub use repository::*;
pub use roster::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;
