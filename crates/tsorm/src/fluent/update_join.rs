//! UPDATE ... FROM ... JOIN builder.

use crate::config::SqlConfig;
use crate::entity::{Entity, EntityType, TypeKey};
use crate::error::{OrmError, OrmResult};
use crate::expr::{Expr, param};
use crate::fluent::clauses::{AdditionalColumns, StatementCore};
use crate::fluent::traits::StatementBuilder;
use crate::value::Value;

/// Copy values from joined tables into the primary table:
///
/// ```text
/// UPDATE t0 SET t0.[Total] = t1.[Amount] FROM [sales].[Orders] t0 INNER JOIN ... WHERE ...
/// ```
#[derive(Debug, Clone)]
pub struct UpdateWithJoinBuilder {
    core: StatementCore,
    mappings: Vec<String>,
    additional: AdditionalColumns,
}

impl UpdateWithJoinBuilder {
    /// Start an UPDATE of `T`.
    pub fn into_table<T: Entity>() -> Self {
        Self {
            core: StatementCore::new(EntityType::of::<T>()),
            mappings: Vec::new(),
            additional: AdditionalColumns::default(),
        }
    }

    impl_filter_methods!();
    impl_join_methods!();

    /// Map columns of the joined table `J` onto columns of the primary table `P`.
    ///
    /// `P` must be the table passed to [`into_table`](Self::into_table) and `J` must have
    /// been joined already. Each pair is `(target on P, source expression)`.
    pub fn set<P, J>(mut self, pairs: impl FnOnce(Expr, Expr) -> Vec<(Expr, Expr)>) -> Self
    where
        P: Entity,
        J: Entity,
    {
        let pairs = pairs(param::<P>(), param::<J>());
        self.core.attempt(|core| {
            let primary_key = TypeKey::of::<P>();
            let join_key = TypeKey::of::<J>();
            if primary_key == join_key {
                return Err(OrmError::argument(format!(
                    "`{}` must be different from `{}`",
                    primary_key.name(),
                    join_key.name()
                )));
            }
            match core.registry.get(&primary_key) {
                Some(entry) if entry.is_primary => {}
                _ => {
                    return Err(OrmError::argument(format!(
                        "`{}` should have been added with `into_table()`",
                        primary_key.name()
                    )));
                }
            }
            match core.registry.get(&join_key) {
                Some(entry) if !entry.is_primary => {}
                _ => {
                    return Err(OrmError::argument(format!(
                        "`{}` should have been added with a join",
                        join_key.name()
                    )));
                }
            }

            let compiler = core.compiler();
            let primary_alias = core.primary()?.alias.as_str();
            for (target, source) in &pairs {
                let (alias, column) = compiler.column(target)?;
                if alias != primary_alias {
                    return Err(OrmError::argument(format!(
                        "SET target `{}` is not a column of `{}`",
                        column.name,
                        primary_key.name()
                    )));
                }
                let value = compiler.compile_expr(source)?;
                self.mappings
                    .push(format!("{alias}.{} = {value}", column.quoted_name()));
            }
            Ok(())
        });
        self
    }

    /// Columns set to a constant value.
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

impl StatementBuilder for UpdateWithJoinBuilder {
    const KIND: &'static str = "UPDATE";

    fn build_sql(&self) -> OrmResult<String> {
        let table = self.core.primary()?;

        let mut sets = self.mappings.clone();
        sets.extend(self.additional.assignments()?);
        if sets.is_empty() {
            return Err(OrmError::invalid_operation(format!(
                "no SET mappings were added to the UPDATE of {}",
                table.qualified_name()
            )));
        }

        let mut parts = vec![
            format!("UPDATE {} SET {}", table.alias, sets.join(",")),
            format!("FROM {} {}", table.qualified_name(), table.alias),
        ];
        parts.extend(self.core.render_joins());
        if !self.core.filters.is_empty() {
            parts.push(format!("WHERE {}", self.core.filters.as_str()));
        }
        Ok(parts.join(" "))
    }

    fn config(&self) -> &SqlConfig {
        &self.core.config
    }

    fn build_error(&self) -> Option<&OrmError> {
        self.core.error()
    }
}
