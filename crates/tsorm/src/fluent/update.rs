//! Per-row UPDATE builder.

use crate::config::SqlConfig;
use crate::entity::{Entity, EntityType};
use crate::error::{OrmError, OrmResult};
use crate::fluent::clauses::{AdditionalColumns, StatementCore};
use crate::fluent::traits::StatementBuilder;
use crate::value::Value;

/// One `UPDATE` per added row, joined with `;` and a newline:
///
/// ```text
/// UPDATE t0 SET [Name] = 'Ann',[Status] = 'Active' FROM [dbo].[Person] t0 WHERE (t0.[Id] = 1)
/// ```
///
/// SET lists the updatable columns (`InsertAndUpdate`, not a key) and the additional
/// columns. Primary keys pin each statement to its row; user conditions are AND-ed on.
#[derive(Debug)]
pub struct UpdateBuilder<T: Entity> {
    core: StatementCore,
    items: Vec<T>,
    additional: AdditionalColumns,
}

impl<T: Entity> UpdateBuilder<T> {
    pub fn begin() -> Self {
        Self {
            core: StatementCore::new(EntityType::of::<T>()),
            items: Vec::new(),
            additional: AdditionalColumns::default(),
        }
    }

    impl_filter_methods!();
    impl_join_methods!();

    pub fn add_item(mut self, item: T) -> Self {
        self.items.push(item);
        self
    }

    pub fn add_items(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.items.extend(items);
        self
    }

    /// Columns set to the same value on every row.
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

impl<T: Entity> StatementBuilder for UpdateBuilder<T> {
    const KIND: &'static str = "UPDATE";

    fn build_sql(&self) -> OrmResult<String> {
        let table = self.core.primary()?;
        if self.items.is_empty() {
            return Err(OrmError::invalid_operation(format!(
                "no rows were added to the UPDATE of {}",
                table.qualified_name()
            )));
        }

        let updatable: Vec<_> = table.metadata.updatable_columns().collect();
        let keys: Vec<_> = table.metadata.primary_keys().collect();
        let extra = self.additional.assignments()?;
        if updatable.is_empty() && extra.is_empty() {
            return Err(OrmError::invalid_operation(format!(
                "{} has no updatable columns",
                table.qualified_name()
            )));
        }

        let joins = self.core.render_joins();
        let mut statements = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let mut sets = Vec::with_capacity(updatable.len() + extra.len());
            for column in &updatable {
                sets.push(format!("{} = {}", column.quoted_name(), column.render(item)?));
            }
            sets.extend(extra.iter().cloned());

            let mut conditions = Vec::with_capacity(keys.len() + 1);
            for key in &keys {
                conditions.push(format!(
                    "({}.{} = {})",
                    table.alias,
                    key.quoted_name(),
                    key.render(item)?
                ));
            }
            if !self.core.filters.is_empty() {
                conditions.push(format!("({})", self.core.filters.as_str()));
            }

            let mut parts = vec![
                format!("UPDATE {} SET {}", table.alias, sets.join(",")),
                format!("FROM {} {}", table.qualified_name(), table.alias),
            ];
            parts.extend(joins.iter().cloned());
            if !conditions.is_empty() {
                parts.push(format!("WHERE {}", conditions.join(" AND ")));
            }
            statements.push(parts.join(" "));
        }

        Ok(statements.join(";\n"))
    }

    fn config(&self) -> &SqlConfig {
        &self.core.config
    }

    fn build_error(&self) -> Option<&OrmError> {
        self.core.error()
    }
}
