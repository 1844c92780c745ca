//! Execution facade
//!
//! The crate never talks to a database directly. An [`Executor`] adapts some
//! physical access layer (a driver, a pool, a test double); [`SqlClient`]
//! wires statement builders to it and feeds result rows through the mapper.

use tracing::debug;

use crate::error::{SqlError, SqlResult};
use crate::mapper::RowMapper;
use crate::stmt::{Delete, Insert, Select, Update};
use crate::value::{FromValue, Row, Value};
use crate::entity::Entity;

/// Adapter over a physical database access layer.
///
/// Implementations surface their failures as [`SqlError::Execution`]; the
/// crate passes them through without interpretation or retries.
pub trait Executor {
    /// Run a query and return its rows in result order
    fn execute_query(&mut self, sql: &str, params: &[Value]) -> SqlResult<Vec<Row>>;

    /// Run a mutation and return the affected row count
    fn execute_update(&mut self, sql: &str, params: &[Value]) -> SqlResult<u64>;

    /// Run one statement repeatedly with a parameter matrix, returning
    /// per-row affected counts
    fn execute_batch(&mut self, sql: &str, batch: &[Vec<Value>]) -> SqlResult<Vec<u64>>;

    /// Run a single-row insert and return the generated key columns.
    /// Optional; the default reports the capability as unsupported.
    fn insert_returning_keys(&mut self, sql: &str, params: &[Value]) -> SqlResult<Row> {
        let _ = (sql, params);
        Err(SqlError::execution(
            "generated key retrieval is not supported by this executor",
        ))
    }

    /// Run `work` inside a transaction scope. Implementations commit on
    /// `Ok` and roll back on `Err`; the default just runs the closure.
    fn transaction<R>(
        &mut self,
        work: impl FnOnce(&mut Self) -> SqlResult<R>,
    ) -> SqlResult<R>
    where
        Self: Sized,
    {
        work(self)
    }
}

impl<E: Executor> Executor for &mut E {
    fn execute_query(&mut self, sql: &str, params: &[Value]) -> SqlResult<Vec<Row>> {
        (**self).execute_query(sql, params)
    }

    fn execute_update(&mut self, sql: &str, params: &[Value]) -> SqlResult<u64> {
        (**self).execute_update(sql, params)
    }

    fn execute_batch(&mut self, sql: &str, batch: &[Vec<Value>]) -> SqlResult<Vec<u64>> {
        (**self).execute_batch(sql, batch)
    }

    fn insert_returning_keys(&mut self, sql: &str, params: &[Value]) -> SqlResult<Row> {
        (**self).insert_returning_keys(sql, params)
    }

    // `transaction` keeps the trait default (run the closure directly):
    // forwarding to `E::transaction` is unwritable here because `&mut`
    // invariance rejects passing the closure's `&'short mut E` where
    // `&mut &'long mut E` is required.
}

/// High-level entry point tying builders, mapper and executor together
pub struct SqlClient<E> {
    executor: E,
}

impl<E: Executor> SqlClient<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Direct access to the underlying executor
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Query and map every row onto an entity
    pub fn query_list<T: Entity>(&mut self, query: &Select) -> SqlResult<Vec<T>> {
        self.query_list_with(query, &RowMapper::new())
    }

    /// Query and map every row with a configured mapper
    pub fn query_list_with<T: Entity>(
        &mut self,
        query: &Select,
        mapper: &RowMapper,
    ) -> SqlResult<Vec<T>> {
        let rows = self.run_query(query)?;
        mapper.map_list(&rows)
    }

    /// Query and map the first row, if any
    pub fn query_one<T: Entity>(&mut self, query: &Select) -> SqlResult<Option<T>> {
        self.query_one_with(query, &RowMapper::new())
    }

    /// Query and map the first row with a configured mapper
    pub fn query_one_with<T: Entity>(
        &mut self,
        query: &Select,
        mapper: &RowMapper,
    ) -> SqlResult<Option<T>> {
        let rows = self.run_query(query)?;
        mapper.map_one(&rows)
    }

    /// Query and return the raw rows without any coercion
    pub fn query_maps(&mut self, query: &Select) -> SqlResult<Vec<Row>> {
        self.run_query(query)
    }

    /// Query and coerce the first column of the first row
    pub fn query_scalar<T: FromValue>(&mut self, query: &Select) -> SqlResult<Option<T>> {
        let rows = self.run_query(query)?;
        RowMapper::new().map_scalar(&rows)
    }

    /// Count the rows the query would return, ignoring ORDER BY and LIMIT
    pub fn count(&mut self, query: &Select) -> SqlResult<i64> {
        let sql = query.total_row_sql();
        let params = query.params()?;
        debug!(sql = %sql, params = params.len(), "executing count query");
        let rows = self.executor.execute_query(&sql, &params)?;
        Ok(RowMapper::new().map_scalar(&rows)?.unwrap_or(0))
    }

    /// Evaluate the query's summary columns over the filtered rows
    pub fn summary(&mut self, query: &Select) -> SqlResult<Option<Row>> {
        let sql = query.summary_sql()?;
        let params = query.params()?;
        debug!(sql = %sql, params = params.len(), "executing summary query");
        let mut rows = self.executor.execute_query(&sql, &params)?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Execute a single-row insert
    pub fn insert(&mut self, statement: &Insert) -> SqlResult<u64> {
        let sql = statement.to_sql()?;
        let params = statement.params()?;
        debug!(sql = %sql, params = params.len(), "executing insert");
        self.executor.execute_update(&sql, &params)
    }

    /// Execute a batch insert, one statement run per row
    pub fn insert_batch(&mut self, statement: &Insert) -> SqlResult<Vec<u64>> {
        let sql = statement.to_sql()?;
        let batch = statement.batch_params()?;
        debug!(sql = %sql, rows = batch.len(), "executing batch insert");
        self.executor.execute_batch(&sql, &batch)
    }

    /// Execute a single-row insert and return its generated key columns
    pub fn insert_returning_keys(&mut self, statement: &Insert) -> SqlResult<Row> {
        let sql = statement.to_sql()?;
        let params = statement.params()?;
        debug!(sql = %sql, params = params.len(), "executing insert returning keys");
        self.executor.insert_returning_keys(&sql, &params)
    }

    /// Execute an update
    pub fn update(&mut self, statement: &Update) -> SqlResult<u64> {
        let sql = statement.to_sql()?;
        let params = statement.params()?;
        debug!(sql = %sql, params = params.len(), "executing update");
        self.executor.execute_update(&sql, &params)
    }

    /// Execute a batch update, resolving field references per record
    pub fn update_batch(&mut self, statement: &Update) -> SqlResult<Vec<u64>> {
        let sql = statement.to_sql()?;
        let batch = statement.batch_params()?;
        debug!(sql = %sql, rows = batch.len(), "executing batch update");
        self.executor.execute_batch(&sql, &batch)
    }

    /// Execute a delete
    pub fn delete(&mut self, statement: &Delete) -> SqlResult<u64> {
        let sql = statement.to_sql()?;
        let params = statement.params()?;
        debug!(sql = %sql, params = params.len(), "executing delete");
        self.executor.execute_update(&sql, &params)
    }

    /// Execute a batch delete, resolving field references per record
    pub fn delete_batch(&mut self, statement: &Delete) -> SqlResult<Vec<u64>> {
        let sql = statement.to_sql()?;
        let batch = statement.batch_params()?;
        debug!(sql = %sql, rows = batch.len(), "executing batch delete");
        self.executor.execute_batch(&sql, &batch)
    }

    /// Run `work` inside the executor's transaction scope
    pub fn transaction<R>(
        &mut self,
        work: impl FnOnce(&mut SqlClient<&mut E>) -> SqlResult<R>,
    ) -> SqlResult<R> {
        self.executor.transaction(|ex| {
            let mut client = SqlClient::new(ex);
            work(&mut client)
        })
    }

    fn run_query(&mut self, query: &Select) -> SqlResult<Vec<Row>> {
        let sql = query.to_sql();
        let params = query.params()?;
        debug!(sql = %sql, params = params.len(), "executing query");
        self.executor.execute_query(&sql, &params)
    }
}
