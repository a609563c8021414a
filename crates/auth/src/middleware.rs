use super::*;
use booking_core::ID;
use booking_core::Unique;
use actix_web::FromRequest;
use actix_web::HttpRequest;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::web;
use std::future::Future;
use std::pin::Pin;

/// Extractor for authenticated requests.
///
/// Taking `Auth` as a handler argument is what makes an endpoint protected:
/// the header is checked, the token verified and its subject resolved
/// before the handler body runs. Any [`Rejection`] ends the request with
/// a 401 carrying the rejection kind.
pub struct Auth(pub Member);

impl Auth {
    pub fn member(&self) -> &Member {
        &self.0
    }
    pub fn user(&self) -> ID<Member> {
        self.0.id()
    }
}

impl FromRequest for Auth {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let crypto = req.app_data::<web::Data<Crypto>>().cloned();
        let members = req.app_data::<web::Data<dyn AuthRepository>>().cloned();
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_owned());
        Box::pin(async move {
            let crypto = crypto.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("token service not configured")
            })?;
            let members = members.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("credential store not configured")
            })?;
            let id = crypto.check(authorization.as_deref())?;
            let member = members
                .member(id)
                .await
                .map_err(|e| {
                    log::error!("subject lookup failed: {:#}", e);
                    actix_web::error::ErrorInternalServerError("database error")
                })?
                .ok_or(Rejection::UnknownSubject)?;
            Ok(Auth(member))
        })
    }
}
