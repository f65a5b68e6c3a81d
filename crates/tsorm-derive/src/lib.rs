//! Derive macros for tsorm
//!
//! Provides `#[derive(Entity)]`, `#[derive(Record)]` and `#[derive(SqlEnum)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity;
mod sql_enum;

/// Derive `Entity` (and `Record`) for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use tsorm::Entity;
///
/// #[derive(Debug, Entity)]
/// #[orm(table = "Orders", schema = "sales", soft_delete = false)]
/// struct Order {
///     #[orm(column = "Id", primary_key)]
///     id: i32,
///     #[orm(column = "PersonId")]
///     person_id: i32,
///     #[orm(column, enum_as = "string")]
///     status: Status,
///     // unmapped, still readable by name
///     note: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// Struct level:
/// - `#[orm(table = "name")]` - Table name (omit for types that only join or project)
/// - `#[orm(schema = "name")]` - Schema name (default `dbo`)
/// - `#[orm(soft_delete = false)]` - Physically delete rows in scripts (default soft delete)
///
/// Field level:
/// - `#[orm(column = "Name")]` - Map the field to a column
/// - `#[orm(column)]` - Map the field to the UpperCamelCase of its name
/// - `#[orm(primary_key)]` - Mark the column as (part of) the primary key
/// - `#[orm(insert_update = "only_insert" | "insert_and_update" | "neither")]`
/// - `#[orm(enum_as = "int" | "string")]` - Enum literal rendering (default `int`)
/// - `#[orm(json)]` - Serialize the field with serde and render it as a JSON document
/// - `#[orm(auto_generate)]` - Fill an unset GUID or timestamp when writing
/// - `#[orm(ignore)]` - Leave the field out entirely
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand_entity(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `Record` only: member access by name, without a table mapping.
///
/// Useful for captured objects whose members feed expression literals.
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand_record(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `SqlEnum` and `SqlType` for a fieldless enum.
///
/// # Example
///
/// ```ignore
/// use tsorm::SqlEnum;
///
/// #[derive(Debug, Clone, Copy, SqlEnum)]
/// enum Status {
///     Active = 1,
///     #[orm(rename = "Disabled")]
///     Inactive = 2,
/// }
/// ```
///
/// Discriminants follow the enum's own (`Status::Inactive as i64`). The variant name is
/// what `enum_as = "string"` columns render.
#[proc_macro_derive(SqlEnum, attributes(orm))]
pub fn derive_sql_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    sql_enum::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
