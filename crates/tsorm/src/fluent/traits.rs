//! Trait shared by the fluent builders.

use crate::config::SqlConfig;
use crate::error::{OrmError, OrmResult};

/// A builder that renders one SQL statement (or a batch for multi-row UPDATE).
pub trait StatementBuilder {
    /// Statement label used in logs (`SELECT`, `INSERT`, ...).
    const KIND: &'static str;

    /// Render the statement. Does not log and does not look at the deferred error.
    fn build_sql(&self) -> OrmResult<String>;

    fn config(&self) -> &SqlConfig;

    /// First error recorded while the builder was configured.
    fn build_error(&self) -> Option<&OrmError> {
        None
    }

    /// Validate builder state before rendering.
    fn validate(&self) -> OrmResult<()> {
        match self.build_error() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Validate, render and log the statement.
    ///
    /// Calling `build` repeatedly on an unchanged builder yields the same text.
    fn build(&self) -> OrmResult<String> {
        self.validate()?;
        let sql = self.build_sql()?;
        self.config().trace_statement(Self::KIND, &sql);
        Ok(sql)
    }
}
