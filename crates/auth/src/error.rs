/// Login and registration failures the user can correct, plus the
/// catch-all for store and signing trouble.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    MissingFields(&'static str),
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Invalid credentials")]
    BadCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[cfg(feature = "server")]
impl actix_web::ResponseError for AuthError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            Self::MissingFields(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::BadCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
    fn error_response(&self) -> actix_web::HttpResponse {
        let message = match self {
            Self::Internal(e) => {
                log::error!("auth request failed: {:#}", e);
                super::Message::from("Internal server error")
            }
            other => super::Message {
                message: other.to_string(),
            },
        };
        actix_web::HttpResponse::build(self.status_code()).json(message)
    }
}
