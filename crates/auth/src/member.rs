use booking_core::ID;
use booking_core::Unique;

/// Registered user with verified identity.
///
/// Serializes as the public profile `{id, name, email}`; the password
/// hash is a store-only column and never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Member {
    id: ID<Self>,
    name: String,
    email: String,
}

impl Member {
    pub fn new(id: ID<Self>, name: String, email: String) -> Self {
        Self { id, name, email }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Unique for Member {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use booking_pg::*;

    /// Schema implementation for Member (users table).
    /// Note: hashword is a database-only field, not part of Member domain type.
    impl Schema for Member {
        fn name() -> &'static str {
            USERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id          BIGSERIAL PRIMARY KEY,
                    name        VARCHAR(100) NOT NULL,
                    email       VARCHAR(120) UNIQUE NOT NULL,
                    hashword    TEXT NOT NULL,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_users_email ON ",
                USERS,
                " (email);"
            )
        }
    }
}
