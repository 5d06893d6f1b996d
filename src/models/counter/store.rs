use async_trait::async_trait;
use scylla::client::caching_session::CachingSession;
use scylla::client::session::Session;
use scylla::response::query_result::QueryResult;
use scylla::value::{CqlValue, Row};

use crate::errors::CounterError;
use crate::models::counter::VisitCount;

/// Store operations the increment cycle is built from. Conditional writes
/// report whether the store applied them.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// The counter row, if one exists.
    async fn read(&self, id: &str) -> Result<Option<VisitCount>, CounterError>;

    /// Writes the row only if no row with `id` exists yet.
    async fn create(&self, id: &str, count: i64) -> Result<bool, CounterError>;

    /// Replaces the stored count only if it still equals `expected`.
    async fn replace(&self, id: &str, expected: i64, count: i64) -> Result<bool, CounterError>;
}

pub struct ScyllaCounterStore {
    session: CachingSession,
    table: String,
}

impl ScyllaCounterStore {
    pub fn new(session: CachingSession, table: String) -> Self {
        ScyllaCounterStore { session, table }
    }
}

#[async_trait]
impl CounterStore for ScyllaCounterStore {
    async fn read(&self, id: &str) -> Result<Option<VisitCount>, CounterError> {
        let result = self
            .session
            .execute_unpaged(
                format!("SELECT id, count FROM {} WHERE id = ?", self.table),
                (id,),
            )
            .await?;

        result
            .into_rows_result()
            .map_err(|e| CounterError::InternalServerError(e.to_string()))?
            .maybe_first_row::<VisitCount>()
            .map_err(|e| CounterError::InternalServerError(e.to_string()))
    }

    async fn create(&self, id: &str, count: i64) -> Result<bool, CounterError> {
        let result = self
            .session
            .execute_unpaged(
                format!(
                    "INSERT INTO {} (id, count) VALUES (?, ?) IF NOT EXISTS",
                    self.table
                ),
                (id, count),
            )
            .await?;

        lwt_applied(result)
    }

    async fn replace(&self, id: &str, expected: i64, count: i64) -> Result<bool, CounterError> {
        let result = self
            .session
            .execute_unpaged(
                format!("UPDATE {} SET count = ? WHERE id = ? IF count = ?", self.table),
                (count, id, expected),
            )
            .await?;

        lwt_applied(result)
    }
}

/// Counter table bootstrap. Runs against the bare session once at startup,
/// before it is wrapped for statement caching.
pub(crate) async fn ensure_counter_table(
    session: &Session,
    table: &str,
) -> Result<(), CounterError> {
    session
        .query_unpaged(
            format!(
                "CREATE TABLE IF NOT EXISTS {} (id text PRIMARY KEY, count bigint)",
                table
            ),
            (),
        )
        .await?;

    Ok(())
}

/// A conditional write answers a single row whose first column is the
/// `[applied]` flag.
fn lwt_applied(result: QueryResult) -> Result<bool, CounterError> {
    let row = result
        .into_rows_result()
        .map_err(|e| CounterError::InternalServerError(e.to_string()))?
        .first_row::<Row>()
        .map_err(|e| CounterError::InternalServerError(e.to_string()))?;

    match row.columns.first() {
        Some(Some(CqlValue::Boolean(applied))) => Ok(*applied),
        _ => Err(CounterError::InternalServerError(
            "conditional write result carried no [applied] column".to_string(),
        )),
    }
}
