//! T-SQL identifier quoting.
//!
//! Every table, schema and column reference is rendered bracket-quoted. A closing
//! bracket inside a name is escaped as `]]`.
//!
//! # Example
//! ```ignore
//! use tsorm::ident;
//!
//! assert_eq!(ident::quote("Order Lines")?, "[Order Lines]");
//! assert_eq!(ident::qualified("dbo", "Person")?, "[dbo].[Person]");
//! # Ok::<(), tsorm::OrmError>(())
//! ```

use crate::error::{OrmError, OrmResult};

/// Quote a single identifier part as `[name]`.
pub fn quote(name: &str) -> OrmResult<String> {
    validate(name)?;
    Ok(quote_unchecked(name))
}

/// Quote a `schema.table` pair as `[schema].[table]`.
pub fn qualified(schema: &str, table: &str) -> OrmResult<String> {
    Ok(format!("{}.{}", quote(schema)?, quote(table)?))
}

/// Check that a name can be used as an identifier part.
pub fn validate(name: &str) -> OrmResult<()> {
    if name.trim().is_empty() {
        return Err(OrmError::argument("Identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(OrmError::argument(
            "Identifier cannot contain NUL character",
        ));
    }
    Ok(())
}

/// Quote a name that has already been validated (discovered schema names).
pub(crate) fn quote_unchecked(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Compare two identifiers the way SQL Server does under its default collation.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
