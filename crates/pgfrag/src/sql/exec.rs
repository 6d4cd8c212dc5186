use tokio_postgres::types::FromSql;
use tokio_postgres::Row;

use super::builder::Fragment;
use super::compile::CompiledQuery;
use super::{starts_with_keyword, strip_sql_prefix};
use crate::client::{GenericClient, RowStream, StreamingClient};
use crate::contract::{enforce, ensure_single_column, Cardinality};
use crate::error::{QueryError, QueryResult};

fn trace_query(compiled: &CompiledQuery) {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        sql = compiled.sql(),
        params = compiled.param_count(),
        "executing statement"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = compiled;
}

fn scalar_from_row<T>(row: &Row) -> QueryResult<T>
where
    T: for<'a> FromSql<'a>,
{
    row.try_get(0)
        .map_err(|e| QueryError::decode("0", e.to_string()))
}

impl Fragment {
    /// Compile and execute, returning the raw rows in driver order.
    ///
    /// Composition failures surface here, before anything is sent to the
    /// driver.
    async fn run(&self, conn: &impl GenericClient) -> QueryResult<Vec<Row>> {
        let compiled = self.compile()?;
        trace_query(&compiled);
        conn.query(compiled.sql(), &compiled.params_ref()).await
    }

    /// Execute and return all rows, however many there are.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> QueryResult<Vec<Row>> {
        let rows = self.run(conn).await?;
        Ok(enforce(Cardinality::Any, rows)?.expect_rows())
    }

    /// Execute and require **one or more** rows.
    ///
    /// Semantics:
    /// - 0 rows: returns [`QueryError::NotFound`]
    /// - otherwise: returns the rows in driver order
    pub async fn fetch_many(&self, conn: &impl GenericClient) -> QueryResult<Vec<Row>> {
        let rows = self.run(conn).await?;
        Ok(enforce(Cardinality::AtLeastOne, rows)?.expect_rows())
    }

    /// Execute and require **exactly one** row.
    ///
    /// Semantics:
    /// - 0 rows: returns [`QueryError::NotFound`]
    /// - 1 row: returns that row
    /// - multiple rows: returns [`QueryError::DataIntegrity`]
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> QueryResult<Row> {
        let rows = self.run(conn).await?;
        Ok(enforce(Cardinality::ExactlyOne, rows)?.expect_row())
    }

    /// Execute and require **at most one** row.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 row: returns `Ok(Some(row))`
    /// - multiple rows: returns [`QueryError::DataIntegrity`]
    pub async fn fetch_maybe_one(&self, conn: &impl GenericClient) -> QueryResult<Option<Row>> {
        let rows = self.run(conn).await?;
        Ok(enforce(Cardinality::AtMostOne, rows)?.expect_maybe_row())
    }

    /// Execute and require exactly one row with exactly one column,
    /// returning that column's value.
    ///
    /// A NULL column is a valid result when `T` is an `Option<_>`; for other
    /// `T` it surfaces as a decode error.
    ///
    /// # Example
    /// ```ignore
    /// let count: i64 = frag("SELECT COUNT(*) FROM users WHERE status = ")
    ///     .push_bind("active")
    ///     .fetch_one_value(&client)
    ///     .await?;
    /// ```
    pub async fn fetch_one_value<T>(&self, conn: &impl GenericClient) -> QueryResult<T>
    where
        T: for<'a> FromSql<'a> + Send + Sync,
    {
        let rows = self.run(conn).await?;
        let row = enforce(Cardinality::ExactlyOneValue, rows)?.expect_row();
        scalar_from_row(&row)
    }

    /// Execute and require at most one row with exactly one column,
    /// returning that column's value if a row came back.
    pub async fn fetch_maybe_one_value<T>(
        &self,
        conn: &impl GenericClient,
    ) -> QueryResult<Option<T>>
    where
        T: for<'a> FromSql<'a> + Send + Sync,
    {
        let rows = self.run(conn).await?;
        match enforce(Cardinality::AtMostOneValue, rows)?.expect_maybe_row() {
            Some(row) => scalar_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    /// Execute and require one or more single-column rows, returning the
    /// column values in driver order.
    pub async fn fetch_many_values<T>(&self, conn: &impl GenericClient) -> QueryResult<Vec<T>>
    where
        T: for<'a> FromSql<'a> + Send + Sync,
    {
        let rows = self.run(conn).await?;
        let rows = enforce(Cardinality::AtLeastOne, rows)?.expect_rows();
        ensure_single_column(&rows)?;
        rows.iter().map(|row| scalar_from_row(row)).collect()
    }

    /// Execute and return the single-column values of all rows, however many
    /// there are.
    pub async fn fetch_any_values<T>(&self, conn: &impl GenericClient) -> QueryResult<Vec<T>>
    where
        T: for<'a> FromSql<'a> + Send + Sync,
    {
        let rows = self.run(conn).await?;
        let rows = enforce(Cardinality::Any, rows)?.expect_rows();
        ensure_single_column(&rows)?;
        rows.iter().map(|row| scalar_from_row(row)).collect()
    }

    /// Check if any rows exist for this SELECT query.
    ///
    /// Wraps the statement in `SELECT EXISTS(...)` for efficient existence
    /// checking. Only works with SELECT statements (including
    /// `WITH ... SELECT`).
    pub async fn exists(&self, conn: &impl GenericClient) -> QueryResult<bool> {
        let compiled = self.compile()?;

        let trimmed = strip_sql_prefix(compiled.sql());
        if !starts_with_keyword(trimmed, "SELECT") && !starts_with_keyword(trimmed, "WITH") {
            return Err(QueryError::composition(
                "exists() only works with SELECT statements (including WITH ... SELECT)",
            ));
        }

        trace_query(&compiled);
        let wrapped_sql = format!("SELECT EXISTS({})", compiled.sql());
        let rows = conn.query(&wrapped_sql, &compiled.params_ref()).await?;
        let row = enforce(Cardinality::ExactlyOneValue, rows)?.expect_row();
        scalar_from_row(&row)
    }

    /// Execute the statement and return the number of affected rows.
    pub async fn execute(&self, conn: &impl GenericClient) -> QueryResult<u64> {
        let compiled = self.compile()?;
        trace_query(&compiled);
        conn.execute(compiled.sql(), &compiled.params_ref()).await
    }

    /// Execute and return a [`RowStream`] for incremental consumption.
    ///
    /// Cardinality contracts do not apply to streams; rows are handed to the
    /// caller as the driver produces them.
    pub async fn fetch_stream(&self, conn: &impl StreamingClient) -> QueryResult<RowStream> {
        let compiled = self.compile()?;
        trace_query(&compiled);
        conn.query_stream(compiled.sql(), &compiled.params_ref())
            .await
    }
}
