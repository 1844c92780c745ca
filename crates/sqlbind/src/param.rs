//! Bound parameters and batch records
//!
//! A parameter is either a literal value or a tagged reference to a field of
//! the batch record being rendered. References resolve once, at parameter
//! materialization, and a miss aborts the whole render.

use crate::entity::{self, Reflect};
use crate::error::{SqlError, SqlResult};
use crate::escape::escape;
use crate::value::{ToValue, Value};

/// A bound statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// A concrete value, bound as-is
    Literal(Value),
    /// A per-record reference, resolved against the current batch record
    FieldRef(String),
}

/// Create a parameter that resolves to the named field of each batch record
pub fn field_ref(name: impl Into<String>) -> Param {
    Param::FieldRef(name.into())
}

macro_rules! impl_param_from {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for Param {
            fn from(value: $ty) -> Self {
                Param::Literal(value.to_value())
            }
        })*
    };
}

impl_param_from!(
    Value,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    rust_decimal::Decimal,
    String,
    &str,
    Vec<u8>,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
);

impl<T: ToValue> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        Param::Literal(value.to_value())
    }
}

impl Param {
    /// Wrap any convertible value as a literal parameter
    pub fn literal(value: impl ToValue) -> Self {
        Param::Literal(value.to_value())
    }

    /// Materialize this parameter against an optional batch record
    pub(crate) fn resolve(&self, record: Option<&Record>) -> SqlResult<Value> {
        match self {
            Param::Literal(value) => Ok(escape(value.clone())),
            Param::FieldRef(name) => {
                let record = record.ok_or_else(|| {
                    SqlError::ref_resolution(format!(
                        "field reference '{name}' used without a batch record"
                    ))
                })?;
                let value = record.get(name).ok_or_else(|| {
                    SqlError::ref_resolution(format!(
                        "batch record has no field matching '{name}'"
                    ))
                })?;
                Ok(escape(value))
            }
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        match self {
            Param::Literal(value) => value.is_blank(),
            Param::FieldRef(_) => false,
        }
    }
}

/// One element of a batch dataset
pub enum Record {
    /// Ordered column -> value pairs, matched by exact key
    Map(Vec<(String, Value)>),
    /// An entity, matched through its field descriptors
    Entity(Box<dyn Reflect>),
}

impl Record {
    pub fn map(entries: Vec<(String, Value)>) -> Self {
        Record::Map(entries)
    }

    pub fn entity(entity: impl Reflect + 'static) -> Self {
        Record::Entity(Box::new(entity))
    }

    /// Look up a field value. Map records match keys exactly; entity records
    /// go through the descriptor table (case/underscore-insensitive).
    pub fn get(&self, name: &str) -> Option<Value> {
        match self {
            Record::Map(entries) => entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            Record::Entity(e) => {
                let def = entity::resolve_field(e.as_ref(), name)?;
                e.get(def.name)
            }
        }
    }

    /// The columns this record contributes to a derived insert column set,
    /// in declaration order
    pub(crate) fn columns(&self) -> Vec<(String, Value)> {
        match self {
            Record::Map(entries) => entries.clone(),
            Record::Entity(e) => entity::scalar_values(e.as_ref()),
        }
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Record::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Record::Entity(e) => f.debug_tuple("Entity").field(&e.entity_name()).finish(),
        }
    }
}
