//! INSERT ... SELECT builder.

use crate::config::SqlConfig;
use crate::entity::{Entity, EntityType};
use crate::error::{OrmError, OrmResult};
use crate::fluent::clauses::{AdditionalColumns, StatementCore};
use crate::fluent::select::SelectBuilder;
use crate::fluent::traits::StatementBuilder;
use crate::value::Value;

/// Marker for a builder whose source query has not been bound yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuery;

/// `INSERT INTO [s].[t] ( [A],[B] ) SELECT ...`
///
/// The source query is bound exactly once with [`from_query`](Self::from_query); only a
/// bound builder can be built.
///
/// ```ignore
/// let sql = InsertFromQueryBuilder::into_table::<Archive>()
///     .with_additional_columns([("ArchivedBy", "job")])
///     .from_query(SelectBuilder::from::<Person>().select_table::<Person>())
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct InsertFromQueryBuilder<Q = NoQuery> {
    core: StatementCore,
    additional: AdditionalColumns,
    query: Q,
}

impl InsertFromQueryBuilder<NoQuery> {
    /// Start an INSERT into `T`.
    pub fn into_table<T: Entity>() -> Self {
        Self {
            core: StatementCore::new(EntityType::of::<T>()),
            additional: AdditionalColumns::default(),
            query: NoQuery,
        }
    }

    /// Bind the SELECT that produces the rows.
    pub fn from_query(self, query: SelectBuilder) -> InsertFromQueryBuilder<SelectBuilder> {
        InsertFromQueryBuilder {
            core: self.core,
            additional: self.additional,
            query,
        }
    }
}

impl<Q> InsertFromQueryBuilder<Q> {
    pub fn with_config(mut self, config: SqlConfig) -> Self {
        self.core.config = config;
        self
    }

    /// Columns written with a constant value; the value is injected into the source query.
    pub fn with_additional_columns<I, K, V>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.additional.merge(columns);
        self
    }
}

impl StatementBuilder for InsertFromQueryBuilder<SelectBuilder> {
    const KIND: &'static str = "INSERT";

    fn build_sql(&self) -> OrmResult<String> {
        let table = self.core.primary()?;

        let mut names: Vec<String> = table
            .metadata
            .insertable_columns()
            .map(|c| c.quoted_name())
            .collect();
        names.extend(self.additional.quoted_names()?);
        if names.is_empty() {
            return Err(OrmError::invalid_operation(format!(
                "{} has no insertable columns",
                table.qualified_name()
            )));
        }

        let query = if self.additional.map().is_empty() {
            self.query.clone()
        } else {
            self.query
                .clone()
                .inject_additional_values(self.additional.map())
        };
        query.validate()?;

        Ok(format!(
            "INSERT INTO {} ( {} ) {}",
            table.qualified_name(),
            names.join(","),
            query.build_sql()?
        ))
    }

    fn config(&self) -> &SqlConfig {
        &self.core.config
    }

    fn build_error(&self) -> Option<&OrmError> {
        self.core.error().or_else(|| self.query.build_error())
    }
}
