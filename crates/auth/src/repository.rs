use super::*;
use booking_core::ID;

/// Credential store for authentication.
/// Abstracts SQL from the handlers and the gate; the server holds it as
/// `Arc<dyn AuthRepository>` so an in-memory [`Roster`] can stand in.
#[async_trait::async_trait]
pub trait AuthRepository: Send + Sync {
    /// Inserts a member, or returns `None` when the email is taken.
    async fn create(&self, name: &str, email: &str, hashword: &str)
    -> anyhow::Result<Option<Member>>;
    /// Member and password hash by email.
    async fn lookup(&self, email: &str) -> anyhow::Result<Option<(Member, String)>>;
    /// Member by id, for resolving token subjects.
    async fn member(&self, id: ID<Member>) -> anyhow::Result<Option<Member>>;
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use booking_pg::*;
    use const_format::concatcp;
    use tokio_postgres::Client;

    #[rustfmt::skip]
    #[async_trait::async_trait]
    impl AuthRepository for Client {
        async fn create(&self, name: &str, email: &str, hashword: &str) -> anyhow::Result<Option<Member>> {
            const SQL: &str = concatcp!(
                "INSERT INTO ", USERS, " (name, email, hashword) ",
                "VALUES ($1, $2, $3) ",
                "ON CONFLICT (email) DO NOTHING ",
                "RETURNING id"
            );
            Ok(self
                .query_opt(SQL, &[&name, &email, &hashword])
                .await?
                .map(|row| Member::new(ID::from(row.get::<_, i64>(0)), name.to_string(), email.to_string())))
        }
        async fn lookup(&self, email: &str) -> anyhow::Result<Option<(Member, String)>> {
            const SQL: &str = concatcp!(
                "SELECT id, name, email, hashword ",
                "FROM   ", USERS, " ",
                "WHERE  email = $1"
            );
            Ok(self.query_opt(SQL, &[&email]).await?.map(|row| {
                (
                    Member::new(
                        ID::from(row.get::<_, i64>(0)),
                        row.get::<_, String>(1),
                        row.get::<_, String>(2),
                    ),
                    row.get::<_, String>(3),
                )
            }))
        }
        async fn member(&self, id: ID<Member>) -> anyhow::Result<Option<Member>> {
            const SQL: &str = concatcp!(
                "SELECT id, name, email ",
                "FROM   ", USERS, " ",
                "WHERE  id = $1"
            );
            Ok(self.query_opt(SQL, &[&id.inner()]).await?.map(|row| {
                Member::new(
                    ID::from(row.get::<_, i64>(0)),
                    row.get::<_, String>(1),
                    row.get::<_, String>(2),
                )
            }))
        }
    }
}
