use super::*;
use booking_auth::AuthResponse;
use booking_auth::Failure;
use booking_auth::MeResponse;
use booking_auth::Member;
use booking_auth::Rejection;
use booking_core::TOKEN_KEY;
use serde_json::Value;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

#[derive(Debug, Default)]
struct State {
    token: Option<String>,
    user: Option<Member>,
    /// Last ticket handed out.
    issued: u64,
    /// Ticket of the last accepted transition. Identity responses at or
    /// below it are stale.
    settled: u64,
    /// Bumped whenever `token` changes. A response only speaks for the
    /// token it was sent with.
    generation: u64,
    /// Identity calls still waiting on the transport.
    pending: BTreeSet<u64>,
}

impl State {
    fn phase(&self) -> Phase {
        let waiting = self.pending.iter().any(|t| *t > self.settled);
        match (self.user.is_some(), waiting) {
            (true, _) => Phase::Authenticated,
            (false, true) => Phase::Authenticating,
            (false, false) => Phase::Unauthenticated,
        }
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What `prepare` stamped on an outbound request.
#[derive(Debug, Clone, Copy)]
struct Stamp {
    ticket: u64,
    generation: u64,
    bearer: bool,
}

/// Drops the ticket from `pending` however the call ends, cancellation included.
struct Inflight<'a> {
    state: &'a Mutex<State>,
    ticket: u64,
}

impl Drop for Inflight<'_> {
    fn drop(&mut self) {
        lock(self.state).pending.remove(&self.ticket);
    }
}

/// Session client: the only owner of the token and the user profile.
///
/// Every call is stamped with a ticket and the token generation it was
/// sent under. Login and register apply only if their ticket is newer than
/// the last accepted transition. Whoami and any 401 apply only if the token
/// they were sent with is still the current one. Responses that lose a race
/// resolve to [`ClientError::Superseded`] instead of overwriting newer
/// state. The session lock is never held across an await.
pub struct Client<T, V> {
    transport: T,
    vault: V,
    state: Mutex<State>,
}

impl<T: Transport, V: Vault> Client<T, V> {
    pub fn new(transport: T, vault: V) -> Self {
        Self {
            transport,
            vault,
            state: Mutex::default(),
        }
    }
    pub fn transport(&self) -> &T {
        &self.transport
    }
    pub fn vault(&self) -> &V {
        &self.vault
    }
    pub fn session(&self) -> Session {
        let state = lock(&self.state);
        Session {
            phase: state.phase(),
            token: state.token.clone(),
            user: state.user.clone(),
        }
    }
    pub fn phase(&self) -> Phase {
        lock(&self.state).phase()
    }
    pub fn user(&self) -> Option<Member> {
        lock(&self.state).user.clone()
    }
    pub fn token(&self) -> Option<String> {
        lock(&self.state).token.clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Member, ClientError> {
        let body = json!({ "email": email, "password": password });
        self.authenticate("/auth/login", body).await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Member, ClientError> {
        let body = json!({ "name": name, "email": email, "password": password });
        self.authenticate("/auth/register", body).await
    }

    /// Resolves the stored token, if any, to a user. Run once at startup.
    ///
    /// A refused token is discarded and the call settles with `Ok(None)`.
    /// A transport failure keeps the token for a later attempt.
    pub async fn bootstrap(&self) -> Result<Option<Member>, ClientError> {
        let Some(token) = self.vault.load(TOKEN_KEY) else {
            log::debug!("[session] no stored token");
            return Ok(None);
        };
        {
            let mut state = lock(&self.state);
            if state.token.is_none() {
                state.token = Some(token);
                state.generation += 1;
            }
        }
        match self.whoami().await {
            Ok(user) => Ok(Some(user)),
            Err(ClientError::Unauthorized(kind)) => {
                log::info!("[session] stored token refused: {}", kind);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolves the current token to its user.
    pub async fn whoami(&self) -> Result<Member, ClientError> {
        let (stamp, response) = self.dispatch(Method::Get, "/auth/me", None, true).await;
        let response = response?;
        match response.status {
            200 => {
                let status = response.status;
                let MeResponse { user } = decode(status, response.body)?;
                self.accept(stamp, None, user)
            }
            401 => {
                let kind = rejection(&response);
                match self.reject(stamp) || !stamp.bearer {
                    true => Err(ClientError::Unauthorized(kind)),
                    false => Err(ClientError::Superseded),
                }
            }
            status => Err(ClientError::Server {
                status,
                message: response.message(),
            }),
        }
    }

    /// Forgets the token and user. Responses to anything already in flight
    /// become stale.
    pub fn logout(&self) {
        let mut state = lock(&self.state);
        let floor = state.issued + 1;
        state.issued = floor;
        state.settled = floor;
        state.generation += 1;
        state.token = None;
        state.user = None;
        self.forget();
        log::info!("[session] logged out");
    }

    /// Calls an endpoint with the session's token attached.
    ///
    /// A 401 clears the session only when the call carried the token that
    /// is still current. Successes never touch the session.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let (stamp, response) = self.dispatch(method, path, body, false).await;
        let response = response?;
        match response.status {
            _ if response.success() => Ok(response.body),
            401 => {
                let kind = rejection(&response);
                if self.reject(stamp) {
                    log::info!("[session] cleared by {} on {}", kind, path);
                }
                Err(ClientError::Unauthorized(kind))
            }
            400 => Err(ClientError::Invalid(response.message())),
            status => Err(ClientError::Server {
                status,
                message: response.message(),
            }),
        }
    }

    async fn authenticate(&self, path: &str, body: Value) -> Result<Member, ClientError> {
        let (stamp, response) = self.dispatch(Method::Post, path, Some(body), true).await;
        let response = response?;
        if !response.success() {
            return Err(credentials(response));
        }
        let status = response.status;
        let AuthResponse { token, user } = decode(status, response.body)?;
        self.accept(stamp, Some(token), user)
    }

    /// The one place a request is built, and so the one place the bearer
    /// token is read from the session.
    fn prepare(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        identity: bool,
    ) -> (Stamp, Request) {
        let mut state = lock(&self.state);
        state.issued += 1;
        let ticket = state.issued;
        if identity {
            state.pending.insert(ticket);
        }
        let stamp = Stamp {
            ticket,
            generation: state.generation,
            bearer: state.token.is_some(),
        };
        let request = Request {
            method,
            path: path.to_string(),
            bearer: state.token.clone(),
            body,
        };
        (stamp, request)
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        identity: bool,
    ) -> (Stamp, Result<Response, ClientError>) {
        let (stamp, request) = self.prepare(method, path, body, identity);
        let _inflight = Inflight {
            state: &self.state,
            ticket: stamp.ticket,
        };
        log::debug!("[session] #{} {:?} {}", stamp.ticket, method, path);
        let response = self
            .transport
            .send(request)
            .await
            .map_err(ClientError::Transport);
        (stamp, response)
    }

    /// A fresh `token` replaces the session's. Without one, the user is
    /// only accepted for the token the request carried.
    fn accept(
        &self,
        stamp: Stamp,
        token: Option<String>,
        user: Member,
    ) -> Result<Member, ClientError> {
        let mut state = lock(&self.state);
        if stamp.ticket <= state.settled {
            log::debug!("[session] #{} superseded by #{}", stamp.ticket, state.settled);
            return Err(ClientError::Superseded);
        }
        if token.is_none() && stamp.generation != state.generation {
            log::debug!("[session] #{} answered for a replaced token", stamp.ticket);
            return Err(ClientError::Superseded);
        }
        state.settled = stamp.ticket;
        if let Some(token) = token {
            if let Err(e) = self.vault.store(TOKEN_KEY, &token) {
                log::warn!("[session] token not persisted: {}", e);
            }
            state.token = Some(token);
            state.generation += 1;
        }
        state.user = Some(user.clone());
        Ok(user)
    }

    /// Clears the session if the refused call carried the current token.
    /// Leaves `settled` alone so logins already in flight still land.
    /// Returns whether the session was cleared.
    fn reject(&self, stamp: Stamp) -> bool {
        let mut state = lock(&self.state);
        if !stamp.bearer || stamp.generation != state.generation {
            return false;
        }
        state.generation += 1;
        state.token = None;
        state.user = None;
        self.forget();
        true
    }

    fn forget(&self) {
        if let Err(e) = self.vault.clear(TOKEN_KEY) {
            log::warn!("[session] stored token not removed: {}", e);
        }
    }
}

fn decode<D: serde::de::DeserializeOwned>(status: u16, body: Value) -> Result<D, ClientError> {
    serde_json::from_value(body).map_err(|e| ClientError::Server {
        status,
        message: format!("unreadable response: {}", e),
    })
}

/// Kind of a gate refusal; an unreadable body counts as an invalid token.
fn rejection(response: &Response) -> Rejection {
    serde_json::from_value::<Failure>(response.body.clone())
        .map(|f| f.error)
        .unwrap_or(Rejection::InvalidToken)
}

fn credentials(response: Response) -> ClientError {
    let message = response.message();
    match response.status {
        401 => ClientError::BadCredentials(message),
        409 => ClientError::DuplicateEmail(message),
        400 => ClientError::Invalid(message),
        status => ClientError::Server { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::ID;
    use booking_core::Unique;
    use std::future::Future;
    use tokio::sync::oneshot;

    type Reply = oneshot::Sender<anyhow::Result<Response>>;

    /// Transport whose calls wait until the test answers them, in any order.
    #[derive(Default)]
    struct Scripted {
        calls: Mutex<Vec<(Request, Option<Reply>)>>,
    }

    impl Scripted {
        fn requests(&self) -> Vec<Request> {
            self.calls.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
        }
        fn answer(&self, index: usize, reply: anyhow::Result<Response>) {
            let tx = self.calls.lock().unwrap()[index].1.take().unwrap();
            tx.send(reply).ok();
        }
        fn reply(&self, index: usize, status: u16, body: Value) {
            self.answer(index, Ok(Response { status, body }));
        }
        fn last(&self) -> usize {
            self.calls.lock().unwrap().len() - 1
        }
    }

    #[async_trait::async_trait]
    impl Transport for Scripted {
        async fn send(&self, request: Request) -> anyhow::Result<Response> {
            let (tx, rx) = oneshot::channel();
            self.calls.lock().unwrap().push((request, Some(tx)));
            rx.await?
        }
    }

    type Subject = Client<Scripted, MemoryVault>;

    fn client() -> Subject {
        Client::new(Scripted::default(), MemoryVault::default())
    }

    fn member(id: i64) -> Member {
        Member::new(ID::from(id), "A".into(), "a@x.com".into())
    }

    fn issued(token: &str, id: i64) -> Value {
        json!({ "token": token, "user": member(id) })
    }

    fn refused(kind: &str) -> Value {
        json!({ "error": kind, "message": "refused" })
    }

    /// Drives `fut` until it is waiting on the transport, answers that call,
    /// then runs it to completion.
    async fn answered<F: Future>(client: &Subject, fut: F, status: u16, body: Value) -> F::Output {
        futures::pin_mut!(fut);
        assert!(futures::poll!(&mut fut).is_pending());
        client.transport().reply(client.transport().last(), status, body);
        fut.await
    }

    async fn logged_in(client: &Subject, token: &str) {
        answered(client, client.login("a@x.com", "secret1"), 200, issued(token, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn login_stores_token_and_user() {
        let client = client();
        assert_eq!(client.phase(), Phase::Unauthenticated);
        logged_in(&client, "T1").await;
        let session = client.session();
        assert_eq!(session.phase, Phase::Authenticated);
        assert_eq!(session.token.as_deref(), Some("T1"));
        assert_eq!(session.user, Some(member(1)));
        assert_eq!(client.vault().load(TOKEN_KEY).as_deref(), Some("T1"));
        let sent = &client.transport().requests()[0];
        assert_eq!(sent.path, "/auth/login");
        assert_eq!(sent.method, Method::Post);
    }

    #[tokio::test]
    async fn bad_credentials_store_nothing() {
        let client = client();
        let login = client.login("a@x.com", "wrong");
        let result = answered(&client, login, 401, json!({ "message": "Invalid credentials" })).await;
        assert!(matches!(result, Err(ClientError::BadCredentials(m)) if m == "Invalid credentials"));
        assert_eq!(client.phase(), Phase::Unauthenticated);
        assert_eq!(client.token(), None);
        assert_eq!(client.vault().load(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn registration_failures_are_distinguished() {
        let client = client();
        let register = client.register("A", "a@x.com", "secret1");
        let result = answered(&client, register, 409, json!({ "message": "Email already registered" })).await;
        assert!(matches!(result, Err(ClientError::DuplicateEmail(_))));
        let register = client.register("", "a@x.com", "secret1");
        let result = answered(&client, register, 400, json!({ "message": "Missing required fields" })).await;
        assert!(matches!(result, Err(ClientError::Invalid(m)) if m == "Missing required fields"));
        let register = client.register("A", "a@x.com", "secret1");
        let user = answered(&client, register, 201, issued("T1", 1)).await.unwrap();
        assert_eq!(user.id(), ID::from(1));
    }

    #[tokio::test]
    async fn requests_carry_the_current_token() {
        let client = client();
        logged_in(&client, "T1").await;
        let events = client.request(Method::Get, "/events", None);
        answered(&client, events, 200, json!({ "events": [] })).await.unwrap();
        assert_eq!(client.transport().requests()[1].bearer.as_deref(), Some("T1"));
        client.logout();
        assert_eq!(client.user(), None);
        assert_eq!(client.vault().load(TOKEN_KEY), None);
        let events = client.request(Method::Get, "/events", None);
        let result = answered(&client, events, 401, refused("missing_token")).await;
        assert!(matches!(result, Err(ClientError::Unauthorized(Rejection::MissingToken))));
        assert_eq!(client.transport().requests()[2].bearer, None);
    }

    #[tokio::test]
    async fn out_of_order_logins_keep_the_newest_accepted() {
        let client = client();
        let first = client.login("a@x.com", "secret1");
        let second = client.login("a@x.com", "secret1");
        futures::pin_mut!(first, second);
        assert!(futures::poll!(&mut first).is_pending());
        assert!(futures::poll!(&mut second).is_pending());
        assert_eq!(client.phase(), Phase::Authenticating);
        client.transport().reply(1, 200, issued("T2", 1));
        assert!(second.await.is_ok());
        client.transport().reply(0, 200, issued("T1", 1));
        assert!(matches!(first.await, Err(ClientError::Superseded)));
        assert_eq!(client.token().as_deref(), Some("T2"));
        assert_eq!(client.vault().load(TOKEN_KEY).as_deref(), Some("T2"));
        assert_eq!(client.phase(), Phase::Authenticated);
    }

    #[tokio::test]
    async fn logout_makes_inflight_logins_stale() {
        let client = client();
        let login = client.login("a@x.com", "secret1");
        futures::pin_mut!(login);
        assert!(futures::poll!(&mut login).is_pending());
        client.logout();
        assert_eq!(client.phase(), Phase::Unauthenticated);
        client.transport().reply(0, 200, issued("T1", 1));
        assert!(matches!(login.await, Err(ClientError::Superseded)));
        assert_eq!(client.session().user, None);
        assert_eq!(client.vault().load(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn stale_identity_success_does_not_resurrect_the_user() {
        let client = client();
        logged_in(&client, "T1").await;
        let whoami = client.whoami();
        futures::pin_mut!(whoami);
        assert!(futures::poll!(&mut whoami).is_pending());
        client.logout();
        client.transport().reply(1, 200, json!({ "user": member(1) }));
        assert!(matches!(whoami.await, Err(ClientError::Superseded)));
        assert_eq!(client.user(), None);
        assert_eq!(client.token(), None);
    }

    #[tokio::test]
    async fn unauthorized_response_wins_over_a_concurrent_success() {
        let client = client();
        logged_in(&client, "T1").await;
        let a = client.request(Method::Get, "/bookings", None);
        let b = client.request(Method::Get, "/dashboard/stats", None);
        futures::pin_mut!(a, b);
        assert!(futures::poll!(&mut a).is_pending());
        assert!(futures::poll!(&mut b).is_pending());
        client.transport().reply(2, 401, refused("token_expired"));
        assert!(matches!(b.await, Err(ClientError::Unauthorized(Rejection::ExpiredToken))));
        assert_eq!(client.phase(), Phase::Unauthenticated);
        assert_eq!(client.vault().load(TOKEN_KEY), None);
        client.transport().reply(1, 200, json!({ "bookings": [] }));
        assert!(a.await.is_ok());
        assert_eq!(client.user(), None);
        assert_eq!(client.token(), None);
    }

    #[tokio::test]
    async fn unauthorized_response_older_than_a_new_login_is_ignored() {
        let client = client();
        logged_in(&client, "T1").await;
        let stale = client.request(Method::Get, "/events", None);
        futures::pin_mut!(stale);
        assert!(futures::poll!(&mut stale).is_pending());
        answered(&client, client.login("a@x.com", "secret1"), 200, issued("T2", 1))
            .await
            .unwrap();
        client.transport().reply(1, 401, refused("token_expired"));
        assert!(matches!(stale.await, Err(ClientError::Unauthorized(_))));
        assert_eq!(client.phase(), Phase::Authenticated);
        assert_eq!(client.token().as_deref(), Some("T2"));
    }

    #[tokio::test]
    async fn unauthorized_for_a_replaced_token_keeps_the_relogin() {
        let client = client();
        logged_in(&client, "T1").await;
        let relogin = client.login("a@x.com", "secret1");
        let fetch = client.request(Method::Get, "/bookings", None);
        futures::pin_mut!(relogin, fetch);
        assert!(futures::poll!(&mut relogin).is_pending());
        assert!(futures::poll!(&mut fetch).is_pending());
        assert_eq!(client.transport().requests()[2].bearer.as_deref(), Some("T1"));
        client.transport().reply(1, 200, issued("T2", 1));
        assert!(relogin.await.is_ok());
        client.transport().reply(2, 401, refused("token_expired"));
        assert!(matches!(fetch.await, Err(ClientError::Unauthorized(Rejection::ExpiredToken))));
        assert_eq!(client.token().as_deref(), Some("T2"));
        assert_eq!(client.vault().load(TOKEN_KEY).as_deref(), Some("T2"));
        assert_eq!(client.phase(), Phase::Authenticated);
    }

    #[tokio::test]
    async fn tokenless_unauthorized_does_not_block_a_login() {
        let client = client();
        let login = client.login("a@x.com", "secret1");
        let fetch = client.request(Method::Get, "/events", None);
        futures::pin_mut!(login, fetch);
        assert!(futures::poll!(&mut login).is_pending());
        assert!(futures::poll!(&mut fetch).is_pending());
        assert_eq!(client.transport().requests()[1].bearer, None);
        client.transport().reply(1, 401, refused("missing_token"));
        assert!(matches!(fetch.await, Err(ClientError::Unauthorized(Rejection::MissingToken))));
        assert_eq!(client.phase(), Phase::Authenticating);
        client.transport().reply(0, 200, issued("T1", 1));
        assert_eq!(login.await.unwrap(), member(1));
        assert_eq!(client.token().as_deref(), Some("T1"));
        assert_eq!(client.vault().load(TOKEN_KEY).as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn unauthorized_for_the_current_token_lets_a_pending_login_land() {
        let client = client();
        logged_in(&client, "T1").await;
        let fetch = client.request(Method::Get, "/events", None);
        let relogin = client.login("a@x.com", "secret1");
        let whoami = client.whoami();
        futures::pin_mut!(fetch, relogin, whoami);
        assert!(futures::poll!(&mut fetch).is_pending());
        assert!(futures::poll!(&mut relogin).is_pending());
        assert!(futures::poll!(&mut whoami).is_pending());
        client.transport().reply(1, 401, refused("token_expired"));
        assert!(matches!(fetch.await, Err(ClientError::Unauthorized(_))));
        assert_eq!(client.token(), None);
        assert_eq!(client.vault().load(TOKEN_KEY), None);
        client.transport().reply(3, 200, json!({ "user": member(1) }));
        assert!(matches!(whoami.await, Err(ClientError::Superseded)));
        assert_eq!(client.user(), None);
        client.transport().reply(2, 200, issued("T2", 1));
        assert!(relogin.await.is_ok());
        assert_eq!(client.token().as_deref(), Some("T2"));
        assert_eq!(client.phase(), Phase::Authenticated);
    }

    #[tokio::test]
    async fn bootstrap_without_a_stored_token_sends_nothing() {
        let client = client();
        assert_eq!(client.bootstrap().await.unwrap(), None);
        assert!(client.transport().requests().is_empty());
        assert_eq!(client.phase(), Phase::Unauthenticated);
    }

    #[tokio::test]
    async fn bootstrap_resolves_a_stored_token() {
        let vault = MemoryVault::default();
        vault.store(TOKEN_KEY, "T1").unwrap();
        let client = Client::new(Scripted::default(), vault);
        let bootstrap = client.bootstrap();
        futures::pin_mut!(bootstrap);
        assert!(futures::poll!(&mut bootstrap).is_pending());
        assert_eq!(client.phase(), Phase::Authenticating);
        let sent = &client.transport().requests()[0];
        assert_eq!(sent.path, "/auth/me");
        assert_eq!(sent.bearer.as_deref(), Some("T1"));
        client.transport().reply(0, 200, json!({ "user": member(1) }));
        assert_eq!(bootstrap.await.unwrap(), Some(member(1)));
        assert_eq!(client.phase(), Phase::Authenticated);
        assert_eq!(client.token().as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn bootstrap_discards_a_refused_token() {
        let vault = MemoryVault::default();
        vault.store(TOKEN_KEY, "T1x").unwrap();
        let client = Client::new(Scripted::default(), vault);
        let result = answered(&client, client.bootstrap(), 401, refused("invalid_token")).await;
        assert_eq!(result.unwrap(), None);
        assert_eq!(client.token(), None);
        assert_eq!(client.vault().load(TOKEN_KEY), None);
        assert_eq!(client.phase(), Phase::Unauthenticated);
    }

    #[tokio::test]
    async fn bootstrap_keeps_the_token_when_unreachable() {
        let vault = MemoryVault::default();
        vault.store(TOKEN_KEY, "T1").unwrap();
        let client = Client::new(Scripted::default(), vault);
        let bootstrap = client.bootstrap();
        futures::pin_mut!(bootstrap);
        assert!(futures::poll!(&mut bootstrap).is_pending());
        client.transport().answer(0, Err(anyhow::anyhow!("connection refused")));
        assert!(matches!(bootstrap.await, Err(ClientError::Transport(_))));
        assert_eq!(client.token().as_deref(), Some("T1"));
        assert_eq!(client.user(), None);
        assert_eq!(client.phase(), Phase::Unauthenticated);
        assert_eq!(client.vault().load(TOKEN_KEY).as_deref(), Some("T1"));
    }
}
