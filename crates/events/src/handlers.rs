use super::*;
use actix_web::HttpResponse;
use actix_web::web;
use booking_auth::Auth;
use booking_core::ID;
use booking_crm::Outbox;
use serde_json::json;
use time::OffsetDateTime;

#[derive(Debug, serde::Deserialize)]
pub struct BookRequest {
    #[serde(default)]
    pub event_id: Option<i64>,
}

/// `?limit=n`. Anything that is not a non-negative integer means no limit.
#[derive(Debug, serde::Deserialize)]
pub struct Limit {
    #[serde(default)]
    pub limit: Option<String>,
}

impl Limit {
    pub fn get(&self) -> Option<usize> {
        self.limit.as_deref().and_then(|n| n.trim().parse().ok())
    }
}

pub async fn events(_: Auth, ledger: web::Data<dyn Ledger>) -> Result<HttpResponse, BookingError> {
    let events = ledger.events(OffsetDateTime::now_utc()).await?;
    Ok(HttpResponse::Ok().json(json!({ "events": events })))
}

/// A missing or unreadable body is the same refusal as a missing id.
pub async fn book(
    auth: Auth,
    ledger: web::Data<dyn Ledger>,
    outbox: web::Data<dyn Outbox>,
    req: Option<web::Json<BookRequest>>,
) -> Result<HttpResponse, BookingError> {
    let event = req
        .and_then(|r| r.event_id)
        .filter(|id| *id != 0)
        .map(ID::<Event>::from)
        .ok_or(BookingError::MissingEvent)?;
    let (booking, event) = ledger
        .book(auth.user(), event, OffsetDateTime::now_utc())
        .await?;
    log::info!("member {} booked event {} ({})", auth.user(), event.id, booking);
    outbox.dispatch(notice(booking, auth.member(), &event));
    Ok(HttpResponse::Created().json(json!({
        "message": "Booking created successfully",
        "booking_id": booking,
    })))
}

pub async fn bookings(
    auth: Auth,
    ledger: web::Data<dyn Ledger>,
    query: web::Query<Limit>,
) -> Result<HttpResponse, BookingError> {
    let bookings = ledger.bookings(auth.user(), query.get()).await?;
    Ok(HttpResponse::Ok().json(json!({ "bookings": bookings })))
}

pub async fn cancel(
    auth: Auth,
    ledger: web::Data<dyn Ledger>,
    path: web::Path<i64>,
) -> Result<HttpResponse, BookingError> {
    let booking = ID::<Booking>::from(path.into_inner());
    ledger
        .cancel(auth.user(), booking, OffsetDateTime::now_utc())
        .await?;
    log::info!("member {} cancelled booking {}", auth.user(), booking);
    Ok(HttpResponse::Ok().json(booking_auth::Message::from("Booking cancelled successfully")))
}

pub async fn stats(auth: Auth, ledger: web::Data<dyn Ledger>) -> Result<HttpResponse, BookingError> {
    let stats = ledger.stats(auth.user(), OffsetDateTime::now_utc()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub async fn health(ledger: web::Data<dyn Ledger>) -> HttpResponse {
    match ledger.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "database": "connected",
        })),
        Err(e) => {
            log::error!("health check failed: {:#}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string(),
            }))
        }
    }
}
