use booking_core::ID;
use booking_core::Unique;

/// Person running events; the CRM routes booking notices by this id.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Facilitator {
    pub id: ID<Self>,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub bio: String,
}

impl Unique for Facilitator {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use booking_pg::*;

    impl Schema for Facilitator {
        fn name() -> &'static str {
            FACILITATORS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                FACILITATORS,
                " (
                    id              BIGSERIAL PRIMARY KEY,
                    name            VARCHAR(100) NOT NULL,
                    email           VARCHAR(120) UNIQUE NOT NULL,
                    specialization  VARCHAR(200) NOT NULL DEFAULT '',
                    bio             TEXT NOT NULL DEFAULT '',
                    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_facilitators_email ON ",
                FACILITATORS,
                " (email);"
            )
        }
    }
}
