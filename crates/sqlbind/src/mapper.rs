//! Binding result rows onto entities
//!
//! Columns map to fields by normalized name. Dotted column names such as
//! `tenant.name` walk into nested entities, allocating each intermediate
//! once per row so every segment under the same prefix lands on a single
//! shared instance.

use std::collections::HashMap;

use crate::entity::{self, Entity, FieldKind, Reflect};
use crate::error::{SqlError, SqlResult};
use crate::value::{FromValue, Row, Value};

/// Maps result rows onto entity values
#[derive(Debug, Clone, Default)]
pub struct RowMapper {
    aliases: HashMap<String, String>,
    ignore_unknown: bool,
}

impl RowMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remap a column path segment to a field name before lookup
    pub fn alias(mut self, segment: &str, field: &str) -> Self {
        self.aliases.insert(segment.to_owned(), field.to_owned());
        self
    }

    /// Skip columns with no matching field instead of failing the row
    pub fn ignore_unknown(mut self, ignore: bool) -> Self {
        self.ignore_unknown = ignore;
        self
    }

    /// Map every row onto a fresh entity
    pub fn map_list<T: Entity>(&self, rows: &[Row]) -> SqlResult<Vec<T>> {
        rows.iter().map(|row| self.map_row(row)).collect()
    }

    /// Map the first row, if any
    pub fn map_one<T: Entity>(&self, rows: &[Row]) -> SqlResult<Option<T>> {
        match rows.first() {
            Some(row) => Ok(Some(self.map_row(row)?)),
            None => Ok(None),
        }
    }

    /// Coerce the first column of the first row, if any. A null or
    /// unconvertible value maps to `None`.
    pub fn map_scalar<T: FromValue>(&self, rows: &[Row]) -> SqlResult<Option<T>> {
        let value = rows.first().and_then(|row| row.iter().next());
        Ok(value.and_then(|(_, v)| T::from_value(v)))
    }

    fn map_row<T: Entity>(&self, row: &Row) -> SqlResult<T> {
        let mut target = T::default();
        for (column, value) in row.iter() {
            if column.contains('.') {
                self.bind_nested(&mut target, column, value)?;
            } else {
                self.bind_scalar(&mut target, column, value)?;
            }
        }
        Ok(target)
    }

    fn bind_scalar(
        &self,
        target: &mut dyn Reflect,
        column: &str,
        value: &Value,
    ) -> SqlResult<()> {
        let field = self.aliases.get(column).map(String::as_str).unwrap_or(column);
        match entity::resolve_field(target, field) {
            Some(def) if def.kind == FieldKind::Scalar => {
                target.set(def.name, value.clone());
                Ok(())
            }
            // a flat column naming a nested field has nothing to bind
            Some(_) => Ok(()),
            None if self.ignore_unknown => Ok(()),
            None => Err(SqlError::field_not_found(target.entity_name(), column)),
        }
    }

    fn bind_nested(
        &self,
        target: &mut dyn Reflect,
        column: &str,
        value: &Value,
    ) -> SqlResult<()> {
        let segments: Vec<&str> = column.split('.').collect();
        let mut current = target;
        for segment in &segments[..segments.len() - 1] {
            let name = self.aliases.get(*segment).map(String::as_str).unwrap_or(segment);
            let def = match entity::resolve_field(current, name) {
                Some(def) if def.kind == FieldKind::Nested => def,
                Some(_) => return Ok(()),
                None if self.ignore_unknown => return Ok(()),
                None => {
                    return Err(SqlError::field_not_found(current.entity_name(), column));
                }
            };
            current = match current.nested_mut(def.name) {
                Some(nested) => nested,
                None => return Ok(()),
            };
        }
        let leaf = segments[segments.len() - 1];
        let field = self.aliases.get(leaf).map(String::as_str).unwrap_or(leaf);
        match entity::resolve_field(current, field) {
            Some(def) if def.kind == FieldKind::Scalar => {
                current.set(def.name, value.clone());
                Ok(())
            }
            Some(_) => Ok(()),
            None if self.ignore_unknown => Ok(()),
            None => Err(SqlError::field_not_found(current.entity_name(), column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testutil::Gadget;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("id", 1).with("gadget_name", "bolt").with("price", 2.5),
            Row::new().with("id", 2).with("gadgetName", "nut").with("price", Value::Null),
        ]
    }

    #[test]
    fn test_map_list() {
        let list: Vec<Gadget> = RowMapper::new().map_list(&rows()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].gadget_name.as_deref(), Some("bolt"));
        assert_eq!(list[0].price, Some(2.5));
        // camelCase column matched the snake_case field
        assert_eq!(list[1].gadget_name.as_deref(), Some("nut"));
        assert_eq!(list[1].price, None);
    }

    #[test]
    fn test_map_one() {
        let one: Option<Gadget> = RowMapper::new().map_one(&rows()).unwrap();
        assert_eq!(one.unwrap().id, 1);
        let none: Option<Gadget> = RowMapper::new().map_one(&[]).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_map_scalar() {
        let rows = vec![Row::new().with("count(*)", 42)];
        let n: Option<i64> = RowMapper::new().map_scalar(&rows).unwrap();
        assert_eq!(n, Some(42));
        let none: Option<i64> = RowMapper::new().map_scalar(&[]).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_unknown_column_strict_and_lenient() {
        let rows = vec![Row::new().with("id", 1).with("mystery", "x")];
        let err = RowMapper::new().map_list::<Gadget>(&rows).unwrap_err();
        match err {
            SqlError::FieldNotFound { entity, column } => {
                assert_eq!(entity, "Gadget");
                assert_eq!(column, "mystery");
            }
            other => panic!("unexpected error: {other}"),
        }

        let list: Vec<Gadget> = RowMapper::new()
            .ignore_unknown(true)
            .map_list(&rows)
            .unwrap();
        assert_eq!(list[0].id, 1);
    }

    #[test]
    fn test_alias_remaps_columns() {
        let rows = vec![Row::new().with("gname", "bolt")];
        let list: Vec<Gadget> = RowMapper::new()
            .alias("gname", "gadget_name")
            .map_list(&rows)
            .unwrap();
        assert_eq!(list[0].gadget_name.as_deref(), Some("bolt"));
    }

    #[test]
    fn test_coercion_failure_yields_null_not_error() {
        let rows = vec![Row::new().with("id", 1).with("price", "not a number")];
        let list: Vec<Gadget> = RowMapper::new().map_list(&rows).unwrap();
        assert_eq!(list[0].price, None);
    }
}
