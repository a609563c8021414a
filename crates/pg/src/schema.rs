/// Schema metadata for PostgreSQL tables.
///
/// Provides compile-time SQL generation for table creation and indexing.
/// All methods return `&'static str` so statements can be assembled with
/// `const_format::concatcp!` next to the domain type they describe.
///
/// This trait contains no I/O; [`create`] runs the statements.
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
}

/// Idempotently creates the table and its indices.
pub async fn create<S: Schema>(client: &tokio_postgres::Client) -> Result<(), super::PgErr> {
    log::debug!("ensuring table ({})", S::name());
    client.batch_execute(S::creates()).await?;
    client.batch_execute(S::indices()).await
}
