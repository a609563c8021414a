/// Why a booking or cancellation was refused.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Event ID is required")]
    MissingEvent,
    #[error("Event not found")]
    EventNotFound,
    #[error("Event is fully booked")]
    FullyBooked,
    #[error("Cannot book past events")]
    PastEvent,
    #[error("You have already booked this event")]
    AlreadyBooked,
    #[error("Booking not found")]
    BookingNotFound,
    #[error("Booking already cancelled")]
    AlreadyCancelled,
    #[error("Cannot cancel past events")]
    PastCancellation,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[cfg(feature = "server")]
impl actix_web::ResponseError for BookingError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            Self::EventNotFound | Self::BookingNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
    fn error_response(&self) -> actix_web::HttpResponse {
        let message = match self {
            Self::Internal(e) => {
                log::error!("booking request failed: {:#}", e);
                booking_auth::Message::from("Internal server error")
            }
            other => booking_auth::Message {
                message: other.to_string(),
            },
        };
        actix_web::HttpResponse::build(self.status_code()).json(message)
    }
}
