/// Why a protected request was refused.
///
/// The serialized form is the machine-readable `error` field of a 401 body,
/// so clients can tell "log in again" apart from "session corrupted".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error, serde::Serialize, serde::Deserialize,
)]
pub enum Rejection {
    #[serde(rename = "missing_token")]
    #[error("Authorization token is required")]
    MissingToken,
    #[serde(rename = "invalid_token")]
    #[error("Invalid token")]
    InvalidToken,
    #[serde(rename = "token_expired")]
    #[error("Token has expired")]
    ExpiredToken,
    #[serde(rename = "unknown_subject")]
    #[error("User not found")]
    UnknownSubject,
}

impl Rejection {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::ExpiredToken => "token_expired",
            Self::UnknownSubject => "unknown_subject",
        }
    }
}

#[cfg(feature = "server")]
impl actix_web::ResponseError for Rejection {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::UNAUTHORIZED
    }
    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::Unauthorized().json(super::Failure::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_wire_names() {
        for rejection in [
            Rejection::MissingToken,
            Rejection::InvalidToken,
            Rejection::ExpiredToken,
            Rejection::UnknownSubject,
        ] {
            let wire = serde_json::to_value(rejection).unwrap();
            assert_eq!(wire, serde_json::Value::from(rejection.kind()));
        }
    }
}
