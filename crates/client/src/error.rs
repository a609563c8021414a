use booking_auth::Rejection;

/// What a session call can end in.
///
/// `Unauthorized` always leaves the session unauthenticated unless a newer
/// transition was already accepted. `Transport` and `Server` leave identity
/// state as it was.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    BadCredentials(String),
    #[error("{0}")]
    DuplicateEmail(String),
    #[error("{0}")]
    Invalid(String),
    #[error("unauthorized: {0}")]
    Unauthorized(Rejection),
    #[error("response arrived after a newer session change")]
    Superseded,
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("transport: {0:#}")]
    Transport(anyhow::Error),
}
