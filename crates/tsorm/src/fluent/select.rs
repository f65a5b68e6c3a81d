//! SELECT builder.

use indexmap::IndexMap;

use crate::config::SqlConfig;
use crate::entity::{Entity, EntityType, TypeKey};
use crate::error::{OrmError, OrmResult};
use crate::expr::Lambda;
use crate::fluent::clauses::{SortOrder, StatementCore};
use crate::fluent::traits::StatementBuilder;
use crate::ident;
use crate::literal;
use crate::value::Value;

/// SELECT query builder.
///
/// Clause order is fixed: `SELECT [DISTINCT] [TOP n] <columns> FROM <primary> <alias> WITH
/// (<hint>) <joins> [WHERE ...] [ORDER BY ...]`.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    core: StatementCore,
    columns: Vec<String>,
    injected: Vec<String>,
    select_all: bool,
    distinct: bool,
    top: Option<u32>,
    order_by: Vec<String>,
}

impl SelectBuilder {
    /// Start a query over `T`, the FROM table.
    pub fn from<T: Entity>() -> Self {
        Self {
            core: StatementCore::new(EntityType::of::<T>()),
            columns: Vec::new(),
            injected: Vec::new(),
            select_all: false,
            distinct: false,
            top: None,
            order_by: Vec::new(),
        }
    }

    impl_filter_methods!();
    impl_join_methods!();

    /// Project the lambda body. Object constructions project each member `AS [name]`.
    pub fn select(mut self, projection: Lambda) -> Self {
        self.core.attempt(|core| {
            if self.select_all {
                return Err(all_columns_locked());
            }
            core.register_params(&projection)?;
            let sql = core.compiler().with_member_aliases().compile(&projection)?;
            push_column(&mut self.columns, sql);
            Ok(())
        });
        self
    }

    /// Project every mapped column of `T`.
    pub fn select_table<T: Entity>(mut self) -> Self {
        self.core.attempt(|core| {
            if self.select_all {
                return Err(all_columns_locked());
            }
            let entry = core.registry.register(EntityType::of::<T>(), false)?;
            for column in &entry.metadata.columns {
                push_column(
                    &mut self.columns,
                    format!("{}.{}", entry.alias, column.quoted_name()),
                );
            }
            Ok(())
        });
        self
    }

    /// Project every mapped column of every type registered so far, replacing earlier
    /// projections.
    pub fn select_registered(mut self) -> Self {
        self.core.attempt(|core| {
            if self.select_all {
                return Err(all_columns_locked());
            }
            self.columns.clear();
            for entry in core.registry.iter() {
                for column in &entry.metadata.columns {
                    push_column(
                        &mut self.columns,
                        format!("{}.{}", entry.alias, column.quoted_name()),
                    );
                }
            }
            Ok(())
        });
        self
    }

    /// Project `*`. Further column selection fails.
    pub fn select_all(mut self) -> Self {
        self.select_all = true;
        self.columns.clear();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// `TOP n`. Zero is valid and returns only the result schema.
    pub fn top(mut self, count: u32) -> Self {
        self.top = Some(count);
        self
    }

    pub fn order_by(mut self, selector: Lambda, order: SortOrder) -> Self {
        self.core.attempt(|core| {
            let sql = core.compile(&selector)?;
            self.order_by.push(format!("{sql} {}", order.to_sql()));
            Ok(())
        });
        self
    }

    /// Append `<literal> AS [column]` for each value, after the projected columns
    /// (or after `*`).
    pub fn inject_additional_values(mut self, values: &IndexMap<String, Value>) -> Self {
        self.core.attempt(|_| {
            for (name, value) in values {
                let column = format!("{} AS {}", literal::render(value)?, ident::quote(name)?);
                push_column(&mut self.injected, column);
            }
            Ok(())
        });
        self
    }

    /// Whether `T` takes part in this query.
    pub fn is_registered<T: Entity>(&self) -> bool {
        self.core.registry.get(&TypeKey::of::<T>()).is_some()
    }
}

impl StatementBuilder for SelectBuilder {
    const KIND: &'static str = "SELECT";

    fn build_sql(&self) -> OrmResult<String> {
        let primary = self.core.primary()?;

        let mut parts = vec!["SELECT".to_string()];
        if self.distinct {
            parts.push("DISTINCT".to_string());
        }
        if let Some(n) = self.top {
            parts.push(format!("TOP {n}"));
        }
        let mut projection = if self.select_all || self.columns.is_empty() {
            vec!["*".to_string()]
        } else {
            self.columns.clone()
        };
        projection.extend(self.injected.iter().cloned());
        parts.push(projection.join(","));

        parts.push("FROM".to_string());
        parts.push(format!(
            "{} {}{}",
            primary.qualified_name(),
            primary.alias,
            self.core.config.read_hint_suffix()
        ));
        parts.extend(self.core.render_joins());

        if !self.core.filters.is_empty() {
            parts.push("WHERE".to_string());
            parts.push(self.core.filters.as_str().to_string());
        }
        if !self.order_by.is_empty() {
            parts.push("ORDER BY".to_string());
            parts.push(self.order_by.join(","));
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

fn all_columns_locked() -> OrmError {
    OrmError::invalid_operation("column selection has already been set to `*` (all columns)")
}

/// Append unless an equal column (ignoring ASCII case) is already projected.
fn push_column(columns: &mut Vec<String>, column: String) {
    if !columns.iter().any(|c| c.eq_ignore_ascii_case(&column)) {
        columns.push(column);
    }
}
