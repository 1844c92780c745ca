//! UPDATE statement builder

use crate::cond::{Cond, Op};
use crate::entity::Reflect;
use crate::error::{SqlError, SqlResult};
use crate::param::{field_ref, Param, Record};
use crate::value::Value;

/// Builder for UPDATE statements.
///
/// Rendering refuses to produce a statement without a WHERE clause unless
/// [`allow_update_all`](Self::allow_update_all) was called. SET assignments
/// may reference batch record fields through [`set_ref`](Self::set_ref);
/// each batch row resolves its own values.
#[derive(Debug)]
pub struct Update {
    table: String,
    sets: Vec<(String, Param)>,
    where_clause: Cond,
    dataset: Vec<Record>,
    batch: bool,
    allow_update_all: bool,
}

impl Update {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            sets: Vec::new(),
            where_clause: Cond::new(),
            dataset: Vec::new(),
            batch: false,
            allow_update_all: false,
        }
    }

    /// Update driven by a single entity record
    pub fn entity(table: impl Into<String>, entity: impl Reflect + 'static) -> Self {
        let mut this = Self::new(table);
        this.dataset.push(Record::entity(entity));
        this
    }

    /// Update driven by a batch of entity records
    pub fn batch<T: Reflect + 'static>(table: impl Into<String>, entities: Vec<T>) -> Self {
        let mut this = Self::new(table);
        this.dataset = entities.into_iter().map(Record::entity).collect();
        this.batch = true;
        this
    }

    /// Update driven by a batch of map or entity records
    pub fn batch_records(table: impl Into<String>, records: Vec<Record>) -> Self {
        let mut this = Self::new(table);
        this.dataset = records;
        this.batch = true;
        this
    }

    /// Assign a column; accepts a literal or a [`field_ref`]
    pub fn set(mut self, column: &str, value: impl Into<Param>) -> Self {
        self.sets.push((column.to_owned(), value.into()));
        self
    }

    /// Assign a column from the batch record field of the same name
    pub fn set_ref(mut self, column: &str) -> Self {
        self.sets.push((column.to_owned(), field_ref(column)));
        self
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
    pub fn allow_update_all(mut self, allow: bool) -> Self {
        self.allow_update_all = allow;
        self
    }

    /// Render the statement text
    pub fn to_sql(&self) -> SqlResult<String> {
        self.check()?;
        let assignments: Vec<String> = self
            .sets
            .iter()
            .map(|(column, _)| format!("{column}=?"))
            .collect();
        let mut sql = format!("UPDATE {} SET {}", self.table, assignments.join(","));
        if !self.where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause.to_sql());
        }
        sql.push(';');
        Ok(sql)
    }

    /// Parameters for the first (or only) row: SET values then WHERE values
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
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let mut row = Vec::with_capacity(self.sets.len());
            for (_, param) in &self.sets {
                row.push(param.resolve(record)?);
            }
            row.extend(self.where_clause.resolve_params(record)?);
            out.push(row);
        }
        Ok(out)
    }

    fn check(&self) -> SqlResult<()> {
        if self.sets.is_empty() {
            return Err(SqlError::builder("update has no SET assignments"));
        }
        if self.where_clause.is_empty() && !self.allow_update_all {
            return Err(SqlError::builder(
                "update without WHERE requires allow_update_all",
            ));
        }
        if self.batch && self.dataset.is_empty() {
            return Err(SqlError::builder("update batch dataset is empty"));
        }
        Ok(())
    }
}
