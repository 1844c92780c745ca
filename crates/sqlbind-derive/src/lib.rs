//! Derive macros for sqlbind
//!
//! Provides `#[derive(Entity)]`, which generates the static field
//! descriptors and accessors the mapper and batch builders work through.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity;

/// Derive the `Reflect` impl backing sqlbind's `Entity` trait.
///
/// # Example
///
/// ```ignore
/// use sqlbind::Entity;
///
/// #[derive(Debug, Default, Entity)]
/// struct Account {
///     id: i64,
///     name: Option<String>,
///     #[entity(column = "acct_balance")]
///     balance: Option<f64>,
///     #[entity(nested)]
///     tenant: Option<Tenant>,
///     #[entity(skip)]
///     dirty: bool,
/// }
/// ```
///
/// # Attributes
///
/// - `#[entity(column = "name")]` - Bind the field to a different column name
/// - `#[entity(nested)]` - Mark an `Option<T: Entity>` field as a nested
///   entity reachable through dotted column paths
/// - `#[entity(skip)]` - Exclude the field from binding entirely
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
