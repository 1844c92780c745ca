//! SELECT statement builder

use crate::cond::{Cond, Op};
use crate::error::{SqlError, SqlResult};
use crate::param::Param;
use crate::value::Value;

/// Builder for SELECT statements with joins, unions, grouping and paging.
///
/// Rendering is a pure function of the builder state; `to_sql` and `params`
/// can be called any number of times with identical results.
#[derive(Debug, Clone, Default)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    summary_columns: Vec<String>,
    from_params: Vec<Param>,
    joins: Vec<String>,
    join_params: Vec<Param>,
    unions: Vec<(&'static str, String)>,
    union_params: Vec<Param>,
    where_clause: Cond,
    group_by: Vec<String>,
    having: Cond,
    order_by: Vec<String>,
    limit: Option<(u64, u64)>,
}

impl Select {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn new_as(table: impl Into<String>, alias: &str) -> Self {
        Self::new(format!("{} {alias}", table.into()))
    }

    /// Select from a subquery, absorbing its parameters
    pub fn from_sub(sub: Select, alias: &str) -> Self {
        let table = format!("({}) {alias}", sub.to_sql());
        let mut this = Self::new(table);
        this.from_params = sub.collect_params();
        this
    }

    /// Append one projected column
    pub fn column(mut self, column: &str) -> Self {
        self.columns.push(column.to_owned());
        self
    }

    /// Append a projected column under an alias
    pub fn column_as(mut self, column: &str, alias: &str) -> Self {
        self.columns.push(format!("{column} AS {alias}"));
        self
    }

    /// Append several projected columns
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| (*c).to_owned()));
        self
    }

    /// Replace the projected column list
    pub fn reselect(mut self, columns: &[&str]) -> Self {
        self.columns.clear();
        self.columns(columns)
    }

    /// Append an aggregate column used by [`summary_sql`](Self::summary_sql)
    pub fn summary(mut self, column: &str) -> Self {
        self.summary_columns.push(column.to_owned());
        self
    }

    /// Append an aggregate column under an alias
    pub fn summary_as(mut self, column: &str, alias: &str) -> Self {
        self.summary_columns.push(format!("{column} AS {alias}"));
        self
    }

    pub fn join(self, table: &str, alias: &str, on: &str) -> Self {
        self.push_join(format!(" JOIN {table} {alias} ON {on}"))
    }

    pub fn left_join(self, table: &str, alias: &str, on: &str) -> Self {
        self.push_join(format!(" LEFT JOIN {table} {alias} ON {on}"))
    }

    pub fn right_join(self, table: &str, alias: &str, on: &str) -> Self {
        self.push_join(format!(" RIGHT JOIN {table} {alias} ON {on}"))
    }

    /// Join a subquery, absorbing its parameters in declaration order
    pub fn join_sub(self, sub: Select, alias: &str, on: &str) -> Self {
        self.push_join_sub(" JOIN", sub, alias, on)
    }

    pub fn left_join_sub(self, sub: Select, alias: &str, on: &str) -> Self {
        self.push_join_sub(" LEFT JOIN", sub, alias, on)
    }

    pub fn right_join_sub(self, sub: Select, alias: &str, on: &str) -> Self {
        self.push_join_sub(" RIGHT JOIN", sub, alias, on)
    }

    /// UNION with another table sharing this builder's column list
    pub fn union(mut self, table: &str) -> Self {
        self.unions.push((" UNION", table.to_owned()));
        self
    }

    /// UNION ALL with another table sharing this builder's column list
    pub fn union_all(mut self, table: &str) -> Self {
        self.unions.push((" UNION ALL", table.to_owned()));
        self
    }

    /// UNION with a subquery source
    pub fn union_sub(mut self, sub: Select, alias: &str) -> Self {
        self.union_params.extend(sub.collect_params());
        self.unions
            .push((" UNION", format!("({}) {alias}", sub.to_sql())));
        self
    }

    /// UNION ALL with a subquery source
    pub fn union_all_sub(mut self, sub: Select, alias: &str) -> Self {
        self.union_params.extend(sub.collect_params());
        self.unions
            .push((" UNION ALL", format!("({}) {alias}", sub.to_sql())));
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

    /// Append a parenthesized WHERE fragment joined with `OR`
    pub fn or_where(mut self, column: &str, op: Op) -> Self {
        self.where_clause.or(column, op);
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

    /// Append a HAVING fragment joined with `AND`
    pub fn and_having(mut self, column: &str, op: Op) -> Self {
        self.having.and(column, op);
        self
    }

    /// Splice a sub-condition into HAVING (empty = no-op)
    pub fn and_having_cond(mut self, cond: Cond) -> Self {
        self.having.and_cond(cond);
        self
    }

    /// Edit the HAVING chain through a closure
    pub fn having_with(mut self, f: impl FnOnce(&mut Cond)) -> Self {
        f(&mut self.having);
        self
    }

    /// Append GROUP BY columns
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.group_by.extend(columns.iter().map(|c| (*c).to_owned()));
        self
    }

    /// Replace the GROUP BY column list
    pub fn regroup_by(mut self, columns: &[&str]) -> Self {
        self.group_by.clear();
        self.group_by(columns)
    }

    /// Append an ascending ORDER BY column; empty names are ignored
    pub fn order_by(mut self, column: &str) -> Self {
        if !column.trim().is_empty() {
            self.order_by.push(column.to_owned());
        }
        self
    }

    /// Append a descending ORDER BY column; empty names are ignored
    pub fn order_by_desc(mut self, column: &str) -> Self {
        if !column.trim().is_empty() {
            self.order_by.push(format!("{column} DESC"));
        }
        self
    }

    /// Replace the ORDER BY list with one ascending column
    pub fn reorder_by(mut self, column: &str) -> Self {
        self.order_by.clear();
        self.order_by(column)
    }

    /// Replace the ORDER BY list with one descending column
    pub fn reorder_by_desc(mut self, column: &str) -> Self {
        self.order_by.clear();
        self.order_by_desc(column)
    }

    /// `LIMIT 0, count`
    pub fn limit(self, count: u64) -> Self {
        self.limit_offset(0, count)
    }

    /// `LIMIT offset, count`
    pub fn limit_offset(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some((offset, count));
        self
    }

    /// Render the statement text
    pub fn to_sql(&self) -> String {
        format!("SELECT {}{}", self.columns_sql(), self.tail_sql(true))
    }

    /// Materialize the bound parameters, in placeholder order:
    /// FROM subquery, joins, WHERE, HAVING, unions
    pub fn params(&self) -> SqlResult<Vec<Value>> {
        let mut out = Vec::new();
        for param in self.collect_params() {
            out.push(param.resolve(None)?);
        }
        Ok(out)
    }

    /// A statement counting the rows this query would return, ignoring
    /// ORDER BY and LIMIT. Grouped or union queries are wrapped so the
    /// count covers the whole result set rather than each group.
    pub fn total_row_sql(&self) -> String {
        if self.group_by.is_empty() && self.having.is_empty() && self.unions.is_empty() {
            format!("SELECT count(*){}", self.tail_sql(false))
        } else {
            format!(
                "SELECT count(*) FROM (SELECT {}{}) t0",
                self.columns_sql(),
                self.tail_sql(false)
            )
        }
    }

    /// A one-row statement evaluating the summary columns over the
    /// filtered rows. Requires at least one summary column and no HAVING
    /// clause; use [`summary_sql_with`](Self::summary_sql_with) otherwise.
    pub fn summary_sql(&self) -> SqlResult<String> {
        self.summary_sql_with(&[])
    }

    /// Summary statement for grouped queries: the grouped result (with its
    /// HAVING filter) is wrapped and `outer_columns` aggregate over it.
    pub fn summary_sql_with(&self, outer_columns: &[&str]) -> SqlResult<String> {
        if self.summary_columns.is_empty() {
            return Err(SqlError::builder("summary requires summary columns"));
        }
        if self.having.is_empty() {
            let summary = self.summary_columns.join(",");
            return Ok(format!("SELECT {summary}{} LIMIT 1", self.base_sql(false)));
        }
        if self.group_by.is_empty() {
            return Err(SqlError::builder(
                "summary over a HAVING clause requires GROUP BY",
            ));
        }
        if outer_columns.is_empty() {
            return Err(SqlError::builder(
                "summary over a HAVING clause requires outer summary columns",
            ));
        }
        let inner = format!("SELECT {}{}", self.columns_sql(), self.base_sql(true));
        Ok(format!(
            "SELECT {} FROM ({inner}) t0 LIMIT 1",
            outer_columns.join(",")
        ))
    }

    /// Raw parameters in placeholder order, before resolution
    pub(crate) fn collect_params(&self) -> Vec<Param> {
        let mut out = Vec::new();
        out.extend(self.from_params.iter().cloned());
        out.extend(self.join_params.iter().cloned());
        out.extend(self.where_clause.params().iter().cloned());
        out.extend(self.having.params().iter().cloned());
        out.extend(self.union_params.iter().cloned());
        out
    }

    fn push_join(mut self, join: String) -> Self {
        self.joins.push(join);
        self
    }

    fn push_join_sub(mut self, keyword: &str, sub: Select, alias: &str, on: &str) -> Self {
        self.join_params.extend(sub.collect_params());
        self.joins
            .push(format!("{keyword} ({}) {alias} ON {on}", sub.to_sql()));
        self
    }

    fn columns_sql(&self) -> String {
        let all: Vec<&str> = self
            .columns
            .iter()
            .chain(self.summary_columns.iter())
            .map(String::as_str)
            .collect();
        if all.is_empty() {
            "*".to_owned()
        } else {
            all.join(",")
        }
    }

    /// FROM/JOIN/WHERE plus optionally GROUP BY and HAVING
    fn base_sql(&self, with_grouping: bool) -> String {
        let mut sql = format!(" FROM {}", self.table);
        for join in &self.joins {
            sql.push_str(join);
        }
        if !self.where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause.to_sql());
        }
        if with_grouping {
            if !self.group_by.is_empty() {
                sql.push_str(" GROUP BY ");
                sql.push_str(&self.group_by.join(","));
            }
            if !self.having.is_empty() {
                sql.push_str(" HAVING ");
                sql.push_str(&self.having.to_sql());
            }
        }
        sql
    }

    /// Everything after the projected columns
    fn tail_sql(&self, with_order_limit: bool) -> String {
        let mut sql = self.base_sql(true);
        let columns = self.columns_sql();
        for (keyword, source) in &self.unions {
            // unions share this builder's column list
            sql.push_str(&format!("{keyword} SELECT {columns} FROM {source}"));
        }
        if with_order_limit {
            if !self.order_by.is_empty() {
                sql.push_str(" ORDER BY ");
                sql.push_str(&self.order_by.join(","));
            }
            if let Some((offset, count)) = self.limit {
                sql.push_str(&format!(" LIMIT {offset}, {count}"));
            }
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cond::{eq, gt, in_select};

    #[test]
    fn test_plain_select() {
        let q = Select::new("account");
        assert_eq!(q.to_sql(), "SELECT * FROM account");
        assert!(q.params().unwrap().is_empty());
    }

    #[test]
    fn test_columns_and_where() {
        let q = Select::new("account")
            .columns(&["id", "name"])
            .column_as("balance", "b")
            .and_where("id", eq(1))
            .and_where("name", eq("x"));
        assert_eq!(
            q.to_sql(),
            "SELECT id,name,balance AS b FROM account WHERE id=? AND name=?"
        );
        assert_eq!(
            q.params().unwrap(),
            vec![Value::Int(1), Value::Text("x".into())]
        );
    }

    #[test]
    fn test_reselect_resets() {
        let q = Select::new("account")
            .columns(&["a", "b"])
            .reselect(&["c"]);
        assert_eq!(q.to_sql(), "SELECT c FROM account");
    }

    #[test]
    fn test_joins() {
        let q = Select::new_as("account", "a")
            .column("a.id")
            .column("t.name")
            .left_join("tenant", "t", "a.tenant_id=t.id")
            .and_where("a.id", gt(0));
        assert_eq!(
            q.to_sql(),
            "SELECT a.id,t.name FROM account a LEFT JOIN tenant t ON a.tenant_id=t.id WHERE a.id>?"
        );
    }

    #[test]
    fn test_join_sub_params_precede_where_params() {
        let sub = Select::new("tenant").column("id").and_where("region", eq("eu"));
        let q = Select::new_as("account", "a")
            .join_sub(sub, "t", "a.tenant_id=t.id")
            .and_where("a.id", eq(5));
        assert_eq!(
            q.to_sql(),
            "SELECT * FROM account a JOIN (SELECT id FROM tenant WHERE region=?) t ON a.tenant_id=t.id WHERE a.id=?"
        );
        assert_eq!(
            q.params().unwrap(),
            vec![Value::Text("eu".into()), Value::Int(5)]
        );
    }

    #[test]
    fn test_from_sub() {
        let inner = Select::new("payment").column("order_id").and_where("state", eq("paid"));
        let q = Select::from_sub(inner, "p").and_where("p.order_id", gt(100));
        assert_eq!(
            q.to_sql(),
            "SELECT * FROM (SELECT order_id FROM payment WHERE state=?) p WHERE p.order_id>?"
        );
        assert_eq!(
            q.params().unwrap(),
            vec![Value::Text("paid".into()), Value::Int(100)]
        );
    }

    #[test]
    fn test_union_shares_column_list() {
        let q = Select::new("account")
            .columns(&["id", "name"])
            .and_where("id", gt(0))
            .union("archived_account")
            .order_by("id");
        assert_eq!(
            q.to_sql(),
            "SELECT id,name FROM account WHERE id>? UNION SELECT id,name FROM archived_account ORDER BY id"
        );
        assert_eq!(q.params().unwrap(), vec![Value::Int(0)]);
    }

    #[test]
    fn test_group_having_order_limit() {
        let q = Select::new("payment")
            .column("tenant_id")
            .summary("sum(amount) AS total")
            .group_by(&["tenant_id"])
            .and_having("sum(amount)", gt(1000))
            .order_by_desc("total")
            .limit_offset(20, 10);
        assert_eq!(
            q.to_sql(),
            "SELECT tenant_id,sum(amount) AS total FROM payment GROUP BY tenant_id HAVING sum(amount)>? ORDER BY total DESC LIMIT 20, 10"
        );
        assert_eq!(q.params().unwrap(), vec![Value::Int(1000)]);
    }

    #[test]
    fn test_in_subselect() {
        let sub = Select::new("tenant").column("id").and_where("active", eq(true));
        let q = Select::new("account").and_where("tenant_id", in_select(sub));
        assert_eq!(
            q.to_sql(),
            "SELECT * FROM account WHERE tenant_id IN (SELECT id FROM tenant WHERE active=?)"
        );
        assert_eq!(q.params().unwrap(), vec![Value::Bool(true)]);
    }

    #[test]
    fn test_total_row_sql_plain() {
        let q = Select::new("account")
            .columns(&["id"])
            .and_where("id", gt(0))
            .order_by("id")
            .limit(10);
        assert_eq!(
            q.total_row_sql(),
            "SELECT count(*) FROM account WHERE id>?"
        );
    }

    #[test]
    fn test_total_row_sql_wraps_grouped_queries() {
        let q = Select::new("payment")
            .column("tenant_id")
            .group_by(&["tenant_id"])
            .and_having("count(*)", gt(1));
        assert_eq!(
            q.total_row_sql(),
            "SELECT count(*) FROM (SELECT tenant_id FROM payment GROUP BY tenant_id HAVING count(*)>?) t0"
        );
    }

    #[test]
    fn test_summary_sql_simple() {
        let q = Select::new("payment")
            .summary("sum(amount) AS total")
            .and_where("state", eq("paid"));
        assert_eq!(
            q.summary_sql().unwrap(),
            "SELECT sum(amount) AS total FROM payment WHERE state=? LIMIT 1"
        );
    }

    #[test]
    fn test_summary_requires_summary_columns() {
        let err = Select::new("payment").summary_sql().unwrap_err();
        assert!(err.is_builder());
    }

    #[test]
    fn test_summary_with_having_requires_group_by() {
        let q = Select::new("payment")
            .summary("sum(amount) AS total")
            .and_having("sum(amount)", gt(10));
        let err = q.summary_sql_with(&["sum(total)"]).unwrap_err();
        assert!(err.is_builder());
    }

    #[test]
    fn test_summary_with_having_wraps() {
        let q = Select::new("payment")
            .column("tenant_id")
            .summary("sum(amount) AS total")
            .group_by(&["tenant_id"])
            .and_having("sum(amount)", gt(10));
        assert_eq!(
            q.summary_sql_with(&["sum(total) AS grand_total"]).unwrap(),
            "SELECT sum(total) AS grand_total FROM (SELECT tenant_id,sum(amount) AS total FROM payment GROUP BY tenant_id HAVING sum(amount)>?) t0 LIMIT 1"
        );
    }

    #[test]
    fn test_render_idempotence() {
        let q = Select::new("account")
            .and_where("id", eq(1))
            .and_having("count(*)", gt(2))
            .group_by(&["id"]);
        let sql1 = q.to_sql();
        let p1 = q.params().unwrap();
        assert_eq!(q.to_sql(), sql1);
        assert_eq!(q.params().unwrap(), p1);
    }

    #[test]
    fn test_placeholder_param_parity() {
        let sub = Select::new("tenant").column("id").and_where("active", eq(true));
        let q = Select::new_as("account", "a")
            .join_sub(
                Select::new("audit").column("account_id").and_where("ok", eq(1)),
                "au",
                "au.account_id=a.id",
            )
            .and_where("a.tenant_id", in_select(sub))
            .and_where("a.id", gt(7))
            .and_having("count(*)", gt(1))
            .group_by(&["a.id"]);
        let placeholders = q.to_sql().matches('?').count();
        assert_eq!(placeholders, q.params().unwrap().len());
    }
}
