//! Statement builders for SELECT, INSERT, UPDATE and DELETE
//!
//! Builders are assembled fluently and rendered on demand into SQL text
//! with `?` placeholders plus a matching parameter vector. Rendering never
//! touches an execution layer.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;

/// Start a SELECT from a table
pub fn select(table: impl Into<String>) -> Select {
    Select::new(table)
}

/// Start a SELECT from an aliased table
pub fn select_as(table: impl Into<String>, alias: &str) -> Select {
    Select::new_as(table, alias)
}

/// Start an INSERT into a table
pub fn insert_into(table: impl Into<String>) -> Insert {
    Insert::new(table)
}

/// Start an UPDATE of a table
pub fn update(table: impl Into<String>) -> Update {
    Update::new(table)
}

/// Start a DELETE from a table
pub fn delete_from(table: impl Into<String>) -> Delete {
    Delete::new(table)
}
