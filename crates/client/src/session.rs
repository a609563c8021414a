use booking_auth::Member;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unauthenticated,
    /// A login, registration or identity check is in flight.
    Authenticating,
    Authenticated,
}

/// Point-in-time view of the client's session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub phase: Phase,
    pub token: Option<String>,
    pub user: Option<Member>,
}
