//! DELETE statement builder

use crate::cond::{Cond, Op};
use crate::entity::Reflect;
use crate::error::{SqlError, SqlResult};
use crate::param::Record;
use crate::value::Value;

/// Builder for DELETE statements.
///
/// Like [`Update`](crate::stmt::Update), rendering refuses a statement
/// without a WHERE clause unless [`allow_delete_all`](Self::allow_delete_all)
/// was called.
#[derive(Debug)]
pub struct Delete {
    table: String,
    where_clause: Cond,
    dataset: Vec<Record>,
    batch: bool,
    allow_delete_all: bool,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: Cond::new(),
            dataset: Vec::new(),
            batch: false,
            allow_delete_all: false,
        }
    }

    /// Delete driven by a batch of entity records; WHERE field references
    /// resolve per record
    pub fn batch<T: Reflect + 'static>(table: impl Into<String>, entities: Vec<T>) -> Self {
        let mut this = Self::new(table);
        this.dataset = entities.into_iter().map(Record::entity).collect();
        this.batch = true;
        this
    }

    /// Delete driven by a batch of map or entity records
    pub fn batch_records(table: impl Into<String>, records: Vec<Record>) -> Self {
        let mut this = Self::new(table);
        this.dataset = records;
        this.batch = true;
        this
    }

    /// Append a WHERE fragment joined with `AND`
    pub fn and_where(mut self, column: &str, op: Op) -> Self {
        self.where_clause.and(column, op);
        self
    }

    /// Append a WHERE fragment, skipped when the parameter is blank
    pub fn and_where_ex(mut self, column: &str, op: Op) -> Self {
        self.where_clause.and_ex(column, op);
        self
    }

    /// Splice a sub-condition into WHERE (empty = no-op)
    pub fn and_where_cond(mut self, cond: Cond) -> Self {
        self.where_clause.and_cond(cond);
        self
    }

    /// Edit the WHERE chain through a closure
    pub fn where_with(mut self, f: impl FnOnce(&mut Cond)) -> Self {
        f(&mut self.where_clause);
        self
    }

    /// Permit rendering without a WHERE clause
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
        self
    }

    /// Render the statement text
    pub fn to_sql(&self) -> SqlResult<String> {
        self.check()?;
        let mut sql = format!("DELETE FROM {}", self.table);
        if !self.where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause.to_sql());
        }
        sql.push(';');
        Ok(sql)
    }

    /// Parameters for the first (or only) row
    pub fn params(&self) -> SqlResult<Vec<Value>> {
        let mut rows = self.batch_params()?;
        Ok(rows.remove(0))
    }

    /// The full parameter matrix, one vector per batch record
    pub fn batch_params(&self) -> SqlResult<Vec<Vec<Value>>> {
        self.check()?;
        let records: Vec<Option<&Record>> = if self.dataset.is_empty() {
            vec![None]
        } else {
            self.dataset.iter().map(Some).collect()
        };
        records
            .into_iter()
            .map(|record| self.where_clause.resolve_params(record))
            .collect()
    }

    fn check(&self) -> SqlResult<()> {
        if self.where_clause.is_empty() && !self.allow_delete_all {
            return Err(SqlError::builder(
                "delete without WHERE requires allow_delete_all",
            ));
        }
        if self.batch && self.dataset.is_empty() {
            return Err(SqlError::builder("delete batch dataset is empty"));
        }
        Ok(())
    }
}
