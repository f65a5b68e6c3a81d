//! Multi-row INSERT builder.

use crate::config::SqlConfig;
use crate::entity::{Entity, EntityType};
use crate::error::{OrmError, OrmResult};
use crate::fluent::clauses::{AdditionalColumns, StatementCore};
use crate::fluent::traits::StatementBuilder;
use crate::value::Value;

/// `INSERT INTO [s].[t] ( [A],[B] ) VALUES ( 1,2 ),( 3,4 );`
///
/// Every column except `NeitherInsertNorUpdate` ones is written, followed by the
/// additional columns.
#[derive(Debug)]
pub struct InsertBuilder<T: Entity> {
    core: StatementCore,
    items: Vec<T>,
    additional: AdditionalColumns,
}

impl<T: Entity> InsertBuilder<T> {
    pub fn begin() -> Self {
        Self {
            core: StatementCore::new(EntityType::of::<T>()),
            items: Vec::new(),
            additional: AdditionalColumns::default(),
        }
    }

    pub fn with_config(mut self, config: SqlConfig) -> Self {
        self.core.config = config;
        self
    }

    pub fn add_item(mut self, item: T) -> Self {
        self.items.push(item);
        self
    }

    pub fn add_items(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.items.extend(items);
        self
    }

    /// Columns written with the same value on every row.
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

impl<T: Entity> StatementBuilder for InsertBuilder<T> {
    const KIND: &'static str = "INSERT";

    fn build_sql(&self) -> OrmResult<String> {
        let table = self.core.primary()?;
        if self.items.is_empty() {
            return Err(OrmError::invalid_operation(format!(
                "no rows were added to the INSERT into {}",
                table.qualified_name()
            )));
        }

        let columns: Vec<_> = table.metadata.insertable_columns().collect();
        let mut names: Vec<String> = columns.iter().map(|c| c.quoted_name()).collect();
        names.extend(self.additional.quoted_names()?);
        if names.is_empty() {
            return Err(OrmError::invalid_operation(format!(
                "{} has no insertable columns",
                table.qualified_name()
            )));
        }

        let extra = self.additional.rendered_values()?;
        let mut rows = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let mut values = columns
                .iter()
                .map(|c| c.render(item))
                .collect::<OrmResult<Vec<_>>>()?;
            values.extend(extra.iter().cloned());
            rows.push(format!("( {} )", values.join(",")));
        }

        Ok(format!(
            "INSERT INTO {} ( {} ) VALUES {};",
            table.qualified_name(),
            names.join(","),
            rows.join(",")
        ))
    }

    fn config(&self) -> &SqlConfig {
        &self.core.config
    }

    fn build_error(&self) -> Option<&OrmError> {
        self.core.error()
    }
}
