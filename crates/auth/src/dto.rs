use super::*;
use serde::Deserialize;
use serde::Serialize;

/// Missing fields deserialize as empty so handlers can answer with a
/// `{message}` body instead of the framework's plain-text 400.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Member,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: Member,
}

/// Human-readable failure body shared by every non-gate error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl From<&str> for Message {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Body of a gate refusal: machine-readable kind plus explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Failure {
    pub error: Rejection,
    pub message: String,
}

impl From<Rejection> for Failure {
    fn from(error: Rejection) -> Self {
        Self {
            error,
            message: error.to_string(),
        }
    }
}
