//! INSERT statement builder with batch column derivation

use crate::error::{SqlError, SqlResult};
use crate::escape::escape;
use crate::param::Record;
use crate::entity::Reflect;
use crate::value::{ToValue, Value};

#[derive(Debug, Clone)]
enum ColumnValues {
    /// One value replicated across every row
    One(Value),
    /// One value per row; the list length must match the row count
    Many(Vec<Value>),
}

/// Builder for INSERT statements.
///
/// Columns come from two sources: explicit `value`/`values` calls, and
/// derivation from the batch dataset. Derived columns missing on some
/// records are padded with null; derived columns that are null on every
/// record are dropped. Explicitly set columns are always retained.
#[derive(Debug)]
pub struct Insert {
    table: String,
    explicit: Vec<(String, ColumnValues)>,
    dataset: Vec<Record>,
    batch: bool,
}

impl Insert {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            explicit: Vec::new(),
            dataset: Vec::new(),
            batch: false,
        }
    }

    /// Insert a single entity; its scalar fields become the column set
    pub fn entity(table: impl Into<String>, entity: impl Reflect + 'static) -> Self {
        let mut this = Self::new(table);
        this.dataset.push(Record::entity(entity));
        this
    }

    /// Insert a batch of entities
    pub fn batch<T: Reflect + 'static>(table: impl Into<String>, entities: Vec<T>) -> Self {
        let mut this = Self::new(table);
        this.dataset = entities.into_iter().map(Record::entity).collect();
        this.batch = true;
        this
    }

    /// Insert a batch of map or entity records
    pub fn batch_records(table: impl Into<String>, records: Vec<Record>) -> Self {
        let mut this = Self::new(table);
        this.dataset = records;
        this.batch = true;
        this
    }

    /// Set a column to one value, replicated across every row
    pub fn value(mut self, column: &str, value: impl ToValue) -> Self {
        self.explicit
            .push((column.to_owned(), ColumnValues::One(value.to_value())));
        self
    }

    /// Set a column to one value per row
    pub fn values<T: ToValue>(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let values = values.into_iter().map(|v| v.to_value()).collect();
        self.explicit
            .push((column.to_owned(), ColumnValues::Many(values)));
        self
    }

    /// Render a single-row-group statement, executed per batch row
    pub fn to_sql(&self) -> SqlResult<String> {
        let columns = self.resolved_columns()?;
        let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
        let placeholders = vec!["?"; columns.len()].join(",");
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.table,
            names.join(","),
            placeholders
        ))
    }

    /// Render one statement carrying every row as its own VALUES group
    pub fn to_multi_values_sql(&self) -> SqlResult<String> {
        let columns = self.resolved_columns()?;
        let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
        let group = format!("({})", vec!["?"; columns.len()].join(","));
        let groups = vec![group; self.row_count(&columns)].join(",");
        Ok(format!(
            "INSERT INTO {} ({}) VALUES {};",
            self.table,
            names.join(","),
            groups
        ))
    }

    /// Parameters for the first (or only) row, in column order
    pub fn params(&self) -> SqlResult<Vec<Value>> {
        let mut rows = self.batch_params()?;
        Ok(rows.remove(0))
    }

    /// The full parameter matrix, one vector per row
    pub fn batch_params(&self) -> SqlResult<Vec<Vec<Value>>> {
        let columns = self.resolved_columns()?;
        let rows = self.row_count(&columns);
        let mut out = Vec::with_capacity(rows);
        for row in 0..rows {
            out.push(
                columns
                    .iter()
                    .map(|(_, values)| escape(values[row].clone()))
                    .collect(),
            );
        }
        Ok(out)
    }

    /// Row-major flattened parameters for
    /// [`to_multi_values_sql`](Self::to_multi_values_sql)
    pub fn multi_values_params(&self) -> SqlResult<Vec<Value>> {
        Ok(self.batch_params()?.into_iter().flatten().collect())
    }

    fn row_count(&self, columns: &[(String, Vec<Value>)]) -> usize {
        columns.first().map_or(0, |(_, values)| values.len())
    }

    /// Resolve the final column set with per-row values, unescaped
    fn resolved_columns(&self) -> SqlResult<Vec<(String, Vec<Value>)>> {
        if self.batch && self.dataset.is_empty() {
            return Err(SqlError::builder("insert batch dataset is empty"));
        }

        let rows = if self.dataset.is_empty() {
            self.explicit
                .iter()
                .find_map(|(_, v)| match v {
                    ColumnValues::Many(values) => Some(values.len()),
                    ColumnValues::One(_) => None,
                })
                .unwrap_or(1)
        } else {
            self.dataset.len()
        };
        if rows == 0 {
            return Err(SqlError::builder("insert value lists are empty"));
        }

        let mut out: Vec<(String, Vec<Value>)> = Vec::new();
        for (name, values) in &self.explicit {
            let expanded = match values {
                ColumnValues::One(value) => vec![value.clone(); rows],
                ColumnValues::Many(values) => {
                    if values.len() != rows {
                        return Err(SqlError::builder(format!(
                            "column '{name}' has {} values but the insert has {rows} rows",
                            values.len()
                        )));
                    }
                    values.clone()
                }
            };
            out.push((name.clone(), expanded));
        }

        // Derive remaining columns from the dataset, ordered by first
        // appearance across records; pad records lacking a column with null.
        let record_columns: Vec<Vec<(String, Value)>> =
            self.dataset.iter().map(Record::columns).collect();
        let mut derived_names: Vec<String> = Vec::new();
        for record in &record_columns {
            for (name, _) in record {
                let taken = out.iter().any(|(n, _)| n == name)
                    || derived_names.iter().any(|n| n == name);
                if !taken {
                    derived_names.push(name.clone());
                }
            }
        }
        for name in derived_names {
            let values: Vec<Value> = record_columns
                .iter()
                .map(|record| {
                    record
                        .iter()
                        .find(|(n, _)| *n == name)
                        .map(|(_, v)| v.clone())
                        .unwrap_or(Value::Null)
                })
                .collect();
            if values.iter().all(Value::is_null) {
                continue;
            }
            out.push((name, values));
        }

        if out.is_empty() {
            return Err(SqlError::builder("insert has no columns"));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testutil::Gadget;

    #[test]
    fn test_single_row_explicit() {
        let ins = Insert::new("account").value("id", 1).value("name", "a");
        assert_eq!(
            ins.to_sql().unwrap(),
            "INSERT INTO account (id,name) VALUES (?,?);"
        );
        assert_eq!(
            ins.params().unwrap(),
            vec![Value::Int(1), Value::Text("a".into())]
        );
    }

    #[test]
    fn test_no_columns_is_an_error() {
        assert!(Insert::new("account").to_sql().unwrap_err().is_builder());
    }

    #[test]
    fn test_mismatched_value_lists() {
        let ins = Insert::new("account")
            .values("id", [1, 2, 3])
            .values("name", ["a", "b"]);
        assert!(ins.to_sql().unwrap_err().is_builder());
    }

    #[test]
    fn test_empty_batch_fails_at_render() {
        let ins = Insert::batch("gadget", Vec::<Gadget>::new());
        assert!(ins.to_sql().unwrap_err().is_builder());
    }

    #[test]
    fn test_entity_derivation_drops_all_null_columns() {
        let ins = Insert::entity(
            "gadget",
            Gadget {
                id: 1,
                gadget_name: Some("bolt".into()),
                price: None,
            },
        );
        assert_eq!(
            ins.to_sql().unwrap(),
            "INSERT INTO gadget (id,gadget_name) VALUES (?,?);"
        );
        assert_eq!(
            ins.params().unwrap(),
            vec![Value::Int(1), Value::Text("bolt".into())]
        );
    }

    #[test]
    fn test_batch_null_padding() {
        let records = vec![
            Record::map(vec![
                ("id".into(), Value::Int(1)),
                ("name".into(), Value::Text("a".into())),
            ]),
            Record::map(vec![("id".into(), Value::Int(2))]),
        ];
        let ins = Insert::batch_records("account", records);
        assert_eq!(
            ins.to_sql().unwrap(),
            "INSERT INTO account (id,name) VALUES (?,?);"
        );
        assert_eq!(
            ins.batch_params().unwrap(),
            vec![
                vec![Value::Int(1), Value::Text("a".into())],
                vec![Value::Int(2), Value::Null],
            ]
        );
    }

    #[test]
    fn test_explicit_columns_survive_even_when_all_null() {
        let ins = Insert::batch("gadget", vec![Gadget { id: 1, ..Default::default() }])
            .value("audit_note", Value::Null);
        assert_eq!(
            ins.to_sql().unwrap(),
            "INSERT INTO gadget (audit_note,id) VALUES (?,?);"
        );
    }

    #[test]
    fn test_explicit_value_replicates_across_batch() {
        let records = vec![
            Record::map(vec![("id".into(), Value::Int(1))]),
            Record::map(vec![("id".into(), Value::Int(2))]),
        ];
        let ins = Insert::batch_records("account", records).value("tenant_id", 7);
        assert_eq!(
            ins.batch_params().unwrap(),
            vec![
                vec![Value::Int(7), Value::Int(1)],
                vec![Value::Int(7), Value::Int(2)],
            ]
        );
    }

    #[test]
    fn test_multi_values_statement() {
        let ins = Insert::new("account")
            .values("id", [1, 2])
            .values("name", ["a", "b"]);
        assert_eq!(
            ins.to_multi_values_sql().unwrap(),
            "INSERT INTO account (id,name) VALUES (?,?),(?,?);"
        );
        assert_eq!(
            ins.multi_values_params().unwrap(),
            vec![
                Value::Int(1),
                Value::Text("a".into()),
                Value::Int(2),
                Value::Text("b".into()),
            ]
        );
    }
}
