//! Static per-type field descriptors
//!
//! Entities declare their bindable surface up front as a table of
//! [`FieldDef`]s plus `get`/`set`/`nested_mut` accessors, normally generated
//! by `#[derive(Entity)]`. A process-global cache memoizes the normalized
//! column-name -> descriptor lookup per entity type.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::value::Value;

/// Whether a field holds a scalar value or a nested entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Nested,
}

/// A single declared field of an entity type
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Canonical field name (snake_case column name)
    pub name: &'static str,
    pub kind: FieldKind,
}

/// The bindable surface of an entity type
///
/// `set` coerces the incoming value to the field's type and returns whether
/// the field was known; an unparseable value leaves the field at its current
/// (default) state. `nested_mut` allocates the nested entity on first access
/// so repeated dotted-path writes within one row share a single instance.
pub trait Reflect {
    fn entity_name(&self) -> &'static str;

    fn fields(&self) -> &'static [FieldDef];

    /// Read a scalar field by canonical name
    fn get(&self, field: &str) -> Option<Value>;

    /// Write a scalar field by canonical name, coercing the value
    fn set(&mut self, field: &str, value: Value) -> bool;

    /// Borrow a nested entity field, allocating it if absent
    fn nested_mut(&mut self, field: &str) -> Option<&mut dyn Reflect>;
}

/// A mappable entity: reflectable and constructible from nothing
pub trait Entity: Reflect + Default + 'static {}

impl<T: Reflect + Default + 'static> Entity for T {}

/// Normalize a column or field name for matching: lowercase with
/// underscores removed, so `tenant_id`, `tenantId` and `TENANTID` collide.
pub(crate) fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

type FieldTable = Arc<HashMap<String, &'static FieldDef>>;

static FIELD_CACHE: OnceLock<RwLock<HashMap<&'static str, FieldTable>>> = OnceLock::new();

fn field_table(entity: &dyn Reflect) -> FieldTable {
    let cache = FIELD_CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    if let Some(table) = cache.read().expect("field cache poisoned").get(entity.entity_name()) {
        return Arc::clone(table);
    }
    // Duplicate concurrent builds are benign; last writer wins.
    let table: FieldTable = Arc::new(
        entity
            .fields()
            .iter()
            .map(|def| (normalize(def.name), def))
            .collect(),
    );
    cache
        .write()
        .expect("field cache poisoned")
        .insert(entity.entity_name(), Arc::clone(&table));
    table
}

/// Resolve a result-set column against an entity's declared fields
pub(crate) fn resolve_field(entity: &dyn Reflect, column: &str) -> Option<&'static FieldDef> {
    field_table(entity).get(&normalize(column)).copied()
}

/// Snapshot the scalar fields of an entity in declaration order
pub(crate) fn scalar_values(entity: &dyn Reflect) -> Vec<(String, Value)> {
    entity
        .fields()
        .iter()
        .filter(|def| def.kind == FieldKind::Scalar)
        .map(|def| {
            let value = entity.get(def.name).unwrap_or(Value::Null);
            (def.name.to_owned(), value)
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::convert;

    /// Hand-written entity used by unit tests across the crate
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Gadget {
        pub id: i64,
        pub gadget_name: Option<String>,
        pub price: Option<f64>,
    }

    impl Reflect for Gadget {
        fn entity_name(&self) -> &'static str {
            "Gadget"
        }

        fn fields(&self) -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[
                FieldDef { name: "id", kind: FieldKind::Scalar },
                FieldDef { name: "gadget_name", kind: FieldKind::Scalar },
                FieldDef { name: "price", kind: FieldKind::Scalar },
            ];
            FIELDS
        }

        fn get(&self, field: &str) -> Option<Value> {
            match field {
                "id" => Some(Value::Int(self.id)),
                "gadget_name" => Some(
                    self.gadget_name
                        .as_ref()
                        .map(|s| Value::Text(s.clone()))
                        .unwrap_or(Value::Null),
                ),
                "price" => Some(self.price.map(Value::Float).unwrap_or(Value::Null)),
                _ => None,
            }
        }

        fn set(&mut self, field: &str, value: Value) -> bool {
            match field {
                "id" => {
                    if let Some(v) = convert::to_i64(&value) {
                        self.id = v;
                    }
                    true
                }
                "gadget_name" => {
                    self.gadget_name = convert::to_text(&value);
                    true
                }
                "price" => {
                    self.price = convert::to_f64(&value);
                    true
                }
                _ => false,
            }
        }

        fn nested_mut(&mut self, _field: &str) -> Option<&mut dyn Reflect> {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::Gadget;
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("tenant_id"), "tenantid");
        assert_eq!(normalize("TenantId"), "tenantid");
        assert_eq!(normalize("TENANT_ID"), "tenantid");
    }

    #[test]
    fn test_resolve_field_fuzzy_match() {
        let g = Gadget::default();
        assert_eq!(resolve_field(&g, "gadget_name").map(|d| d.name), Some("gadget_name"));
        assert_eq!(resolve_field(&g, "gadgetName").map(|d| d.name), Some("gadget_name"));
        assert_eq!(resolve_field(&g, "GADGETNAME").map(|d| d.name), Some("gadget_name"));
        assert!(resolve_field(&g, "nope").is_none());
    }

    #[test]
    fn test_cache_reuse() {
        let g = Gadget::default();
        let first = field_table(&g);
        let second = field_table(&g);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_scalar_snapshot_order() {
        let g = Gadget {
            id: 3,
            gadget_name: Some("wrench".into()),
            price: None,
        };
        let snap = scalar_values(&g);
        assert_eq!(
            snap,
            vec![
                ("id".to_owned(), Value::Int(3)),
                ("gadget_name".to_owned(), Value::Text("wrench".into())),
                ("price".to_owned(), Value::Null),
            ]
        );
    }
}
