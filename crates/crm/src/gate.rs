use actix_web::FromRequest;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::web;
use std::future::Ready;
use std::future::ready;
use subtle::ConstantTimeEq;

/// The static token callers must present.
pub struct Secret(pub String);

/// Proof that the request carried the CRM's static bearer token.
pub struct Caller;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("Authorization header missing")]
    Missing,
    #[error("Invalid authorization header format")]
    Format,
    #[error("Invalid token type")]
    Scheme,
    #[error("Invalid bearer token")]
    Token,
}

impl actix_web::ResponseError for Refusal {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// Header checks in order: present, `<scheme> <token>`, scheme is bearer,
/// token matches. The token comparison runs in constant time.
pub fn admit(header: Option<&str>, secret: &str) -> Result<Caller, Refusal> {
    let header = header.ok_or(Refusal::Missing)?;
    let (scheme, token) = header.split_once(' ').ok_or(Refusal::Format)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Refusal::Scheme);
    }
    match bool::from(token.as_bytes().ct_eq(secret.as_bytes())) {
        true => Ok(Caller),
        false => Err(Refusal::Token),
    }
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(secret) = req.app_data::<web::Data<Secret>>() else {
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "bearer token not configured",
            )));
        };
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .map(|h| h.to_str().unwrap_or_default());
        ready(admit(header, &secret.0).map_err(actix_web::Error::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_checks_in_order() {
        assert_eq!(admit(None, "s").err(), Some(Refusal::Missing));
        assert_eq!(admit(Some("Bearer"), "s").err(), Some(Refusal::Format));
        assert_eq!(admit(Some("Basic s"), "s").err(), Some(Refusal::Scheme));
        assert_eq!(admit(Some("Bearer t"), "s").err(), Some(Refusal::Token));
        assert_eq!(admit(Some("Bearer ss"), "s").err(), Some(Refusal::Token));
        assert_eq!(admit(Some("Bearer "), "s").err(), Some(Refusal::Token));
        assert!(admit(Some("bearer s"), "s").is_ok());
    }
}
