//! Clause collections shared by the builders.

use indexmap::IndexMap;

use crate::alias::{TableAliasEntry, TableAliasRegistry};
use crate::compiler::ExpressionCompiler;
use crate::config::SqlConfig;
use crate::entity::{Entity, EntityType, TypeKey};
use crate::error::{OrmError, OrmResult};
use crate::expr::{Expr, Lambda, lambda2};
use crate::ident;
use crate::literal;
use crate::operand::{ConditionBuilder, ConditionalOperator};
use crate::value::Value;

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn to_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Rendered WHERE text, joined with AND/OR as fragments arrive.
#[derive(Debug, Clone, Default)]
pub(crate) struct WhereClause {
    text: String,
}

impl WhereClause {
    pub(crate) fn push(&mut self, fragment: &str, op: ConditionalOperator) {
        if !self.text.is_empty() {
            self.text.push_str(op.to_sql());
        }
        self.text.push_str(fragment);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone)]
struct JoinEntry {
    kind: JoinKind,
    table: String,
    alias: String,
    condition: String,
}

/// Extra `[column] = value` pairs appended after the mapped columns.
#[derive(Debug, Clone, Default)]
pub(crate) struct AdditionalColumns {
    values: IndexMap<String, Value>,
}

impl AdditionalColumns {
    /// Later values replace earlier ones for the same column.
    pub(crate) fn merge<I, K, V>(&mut self, columns: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in columns {
            self.values.insert(name.into(), value.into());
        }
    }

    pub(crate) fn map(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// `[A]`, `[B]`, ...
    pub(crate) fn quoted_names(&self) -> OrmResult<Vec<String>> {
        self.values.keys().map(|name| ident::quote(name)).collect()
    }

    /// Rendered literals in column order.
    pub(crate) fn rendered_values(&self) -> OrmResult<Vec<String>> {
        self.values.values().map(literal::render).collect()
    }

    /// `[A] = 1`, `[B] = 'x'`, ...
    pub(crate) fn assignments(&self) -> OrmResult<Vec<String>> {
        self.values
            .iter()
            .map(|(name, value)| Ok(format!("{} = {}", ident::quote(name)?, literal::render(value)?)))
            .collect()
    }
}

/// State every builder carries: aliases, WHERE, JOINs, config and the deferred error.
#[derive(Debug, Clone)]
pub(crate) struct StatementCore {
    pub(crate) registry: TableAliasRegistry,
    pub(crate) filters: WhereClause,
    pub(crate) config: SqlConfig,
    joins: Vec<JoinEntry>,
    error: Option<OrmError>,
}

impl StatementCore {
    /// Fresh state with `primary` registered as the statement's target.
    pub(crate) fn new(primary: EntityType) -> Self {
        let mut core = Self {
            registry: TableAliasRegistry::new(),
            filters: WhereClause::default(),
            config: SqlConfig::default(),
            joins: Vec::new(),
            error: None,
        };
        core.attempt(|core| core.registry.register(primary, true).map(|_| ()));
        core
    }

    /// Run `step` unless an earlier step failed; keep its error otherwise.
    pub(crate) fn attempt(&mut self, step: impl FnOnce(&mut Self) -> OrmResult<()>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = step(self) {
            self.error = Some(err);
        }
    }

    pub(crate) fn error(&self) -> Option<&OrmError> {
        self.error.as_ref()
    }

    /// The first recorded error, if any.
    pub(crate) fn check(&self) -> OrmResult<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub(crate) fn primary(&self) -> OrmResult<&TableAliasEntry> {
        self.registry.primary_table()
    }

    pub(crate) fn compiler(&self) -> ExpressionCompiler<'_> {
        ExpressionCompiler::new(&self.registry)
    }

    /// Register the lambda's parameter types, then lower its body.
    pub(crate) fn compile(&mut self, lambda: &Lambda) -> OrmResult<String> {
        self.register_params(lambda)?;
        self.compiler().compile(lambda)
    }

    pub(crate) fn register_params(&mut self, lambda: &Lambda) -> OrmResult<()> {
        for ty in &lambda.params {
            self.registry.register(*ty, false)?;
        }
        Ok(())
    }

    pub(crate) fn add_filter(&mut self, condition: &Lambda, op: ConditionalOperator) {
        self.attempt(|core| {
            let sql = core.compile(condition)?;
            core.filters.push(&sql, op);
            Ok(())
        });
    }

    pub(crate) fn add_condition(&mut self, condition: &ConditionBuilder, op: ConditionalOperator) {
        self.attempt(|core| {
            if condition.as_str().trim().is_empty() {
                return Err(OrmError::missing_operand("empty condition"));
            }
            core.filters.push(&format!("({})", condition.as_str()), op);
            Ok(())
        });
    }

    pub(crate) fn add_join<L: Entity, R: Entity>(
        &mut self,
        on: impl FnOnce(Expr, Expr) -> Expr,
        kind: JoinKind,
    ) {
        let lambda = lambda2::<L, R>(on);
        self.attempt(|core| {
            let right_key = TypeKey::of::<R>();
            if TypeKey::of::<L>() == right_key {
                return Err(OrmError::argument(format!(
                    "cannot join `{}` to itself; the two sides must be different types",
                    right_key.name()
                )));
            }

            let condition = core.compile(&lambda)?;
            let right = core.registry.get(&right_key).ok_or_else(|| {
                OrmError::InvariantViolation(format!("`{}` was not registered", right_key.name()))
            })?;
            let entry = JoinEntry {
                kind,
                table: right.qualified_name(),
                alias: right.alias.clone(),
                condition,
            };
            core.joins.push(entry);
            Ok(())
        });
    }

    pub(crate) fn add_raw_join(&mut self, table: &str, condition: &str, kind: JoinKind) {
        self.attempt(|core| {
            if condition.trim().is_empty() {
                return Err(OrmError::argument(format!(
                    "join to `{table}` needs an ON condition"
                )));
            }

            let (table, alias) = match core.registry.by_table_name(table) {
                Some(entry) => (entry.qualified_name(), entry.alias.clone()),
                None => {
                    let quoted = match table.split_once('.') {
                        Some((schema, name)) => ident::qualified(schema, name)?,
                        None => ident::quote(table)?,
                    };
                    (quoted, format!("j{}", core.joins.len()))
                }
            };
            core.joins.push(JoinEntry {
                kind,
                table,
                alias,
                condition: condition.to_string(),
            });
            Ok(())
        });
    }

    /// `INNER JOIN [s].[t] t1 WITH (NOLOCK) ON ...`, one per join.
    pub(crate) fn render_joins(&self) -> Vec<String> {
        let hint = self.config.read_hint_suffix();
        self.joins
            .iter()
            .map(|j| {
                format!(
                    "{} {} {}{hint} ON {}",
                    j.kind.to_sql(),
                    j.table,
                    j.alias,
                    j.condition
                )
            })
            .collect()
    }
}
