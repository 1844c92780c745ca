//! Programmatic SQL construction and typed result binding.
//!
//! sqlbind builds parameterized SQL statements from fluent builders and maps
//! result rows back onto plain Rust structs. Values never appear in the SQL
//! text; every literal travels as a `?` placeholder with a matching entry in
//! the parameter vector. Execution is delegated to an [`Executor`]
//! implementation supplied by the application.
//!
//! ```
//! use sqlbind::{select, eq, gt, in_list};
//!
//! let query = select("account")
//!     .columns(&["id", "name"])
//!     .and_where("tenant_id", eq(7))
//!     .and_where("state", in_list(["open", "frozen"]))
//!     .and_where_ex("balance", gt(sqlbind::Value::Null))
//!     .order_by_desc("id")
//!     .limit(20);
//!
//! assert_eq!(
//!     query.to_sql(),
//!     "SELECT id,name FROM account WHERE tenant_id=? AND state IN (?,?) ORDER BY id DESC LIMIT 0, 20"
//! );
//! assert_eq!(query.params().unwrap().len(), 3);
//! ```
//!
//! Entities derive [`Entity`](derive@Entity) to take part in batch
//! statements and row mapping:
//!
//! ```ignore
//! #[derive(Debug, Default, sqlbind::Entity)]
//! struct Account {
//!     id: i64,
//!     name: Option<String>,
//!     #[entity(nested)]
//!     tenant: Option<Tenant>,
//! }
//! ```

pub mod client;
pub mod cond;
pub mod convert;
pub mod entity;
pub mod error;
pub mod escape;
pub mod mapper;
pub mod param;
pub mod stmt;
pub mod value;
pub mod wrapper;

pub use client::{Executor, SqlClient};
pub use cond::{
    between, eq, gt, gte, in_list, in_select, is_not_null, is_null, like, like_contains,
    like_ends, like_starts, lt, lte, ne, not_in, not_in_select, Cond, Op,
};
pub use entity::{Entity, FieldDef, FieldKind, Reflect};
pub use error::{SqlError, SqlResult};
pub use escape::scrub;
pub use mapper::RowMapper;
pub use param::{field_ref, Param, Record};
pub use stmt::{delete_from, insert_into, select, select_as, update, Delete, Insert, Select, Update};
pub use value::{FromValue, Row, ToValue, Value};
pub use wrapper::Tracked;

#[cfg(feature = "derive")]
pub use sqlbind_derive::Entity;
