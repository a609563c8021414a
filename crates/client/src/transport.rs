use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// A fully built outbound call. `bearer` is filled in by the client from
/// the session, never by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Status and JSON body; a body that is not JSON reads as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn success(&self) -> bool {
        (200..300).contains(&self.status)
    }
    /// The `message` field servers attach to failures.
    pub fn message(&self) -> String {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// Moves requests to the backend. Errors here mean nothing was heard back.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> anyhow::Result<Response>;
}

/// reqwest transport against a base URL such as `http://localhost:5000/api`.
#[derive(Debug, Clone)]
pub struct Http {
    client: reqwest::Client,
    base: String,
}

impl Http {
    pub fn new(base: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base: base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Transport for Http {
    async fn send(&self, request: Request) -> anyhow::Result<Response> {
        let url = format!("{}{}", self.base, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(token) = request.bearer.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Ok(Response {
            status,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Client;
    use crate::ClientError;
    use crate::MemoryVault;
    use crate::Phase;
    use actix_web::App;
    use actix_web::HttpServer;
    use booking_auth::Crypto;
    use booking_auth::Rejection;
    use booking_auth::Roster;
    use booking_core::Unique;
    use booking_crm::Silent;
    use booking_events::Agenda;
    use booking_server::Services;
    use std::sync::Arc;
    use std::time::Duration;

    /// Runs the backend on in-memory stores and an ephemeral port.
    fn backend() -> (std::net::SocketAddr, actix_web::dev::ServerHandle) {
        let services = Services::new(
            Crypto::new(b"transport-secret", Duration::from_secs(3600)),
            Arc::new(Roster::default()),
            Arc::new(Agenda::default()),
            Arc::new(Silent),
        );
        let server = HttpServer::new(move || {
            let services = services.clone();
            App::new()
                .configure(|cfg| services.mount(cfg))
                .configure(booking_server::routes)
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        (addr, handle)
    }

    #[actix_web::test]
    async fn session_round_trip_over_http() {
        let (addr, handle) = backend();
        let http = Http::new(&format!("http://{}/api/", addr)).unwrap();
        let client = Client::new(http, MemoryVault::default());

        let user = client.register("A", "a@x.com", "secret1").await.unwrap();
        assert_eq!(user.id().inner(), 1);
        assert_eq!(client.phase(), Phase::Authenticated);
        assert_eq!(client.whoami().await.unwrap(), user);
        let events = client.request(Method::Get, "/events", None).await.unwrap();
        assert_eq!(events["events"], serde_json::json!([]));

        client.logout();
        let result = client.request(Method::Get, "/events", None).await;
        assert!(matches!(result, Err(ClientError::Unauthorized(Rejection::MissingToken))));
        assert_eq!(client.phase(), Phase::Unauthenticated);
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn bearer_is_attached_and_bodies_without_json_read_as_null() {
        let (addr, handle) = backend();
        let http = Http::new(&format!("http://{}/api", addr)).unwrap();
        let register = http
            .send(Request {
                method: Method::Post,
                path: "/auth/register".into(),
                bearer: None,
                body: Some(serde_json::json!({ "name": "A", "email": "a@x.com", "password": "secret1" })),
            })
            .await
            .unwrap();
        assert_eq!(register.status, 201);
        let token = register.body["token"].as_str().unwrap().to_string();

        let me = http
            .send(Request {
                method: Method::Get,
                path: "/auth/me".into(),
                bearer: Some(token),
                body: None,
            })
            .await
            .unwrap();
        assert!(me.success());
        assert_eq!(me.body["user"]["email"], "a@x.com");

        let missing = http
            .send(Request {
                method: Method::Delete,
                path: "/nowhere".into(),
                bearer: None,
                body: None,
            })
            .await
            .unwrap();
        assert_eq!(missing.status, 404);
        assert_eq!(missing.body, Value::Null);
        handle.stop(true).await;
    }
}
