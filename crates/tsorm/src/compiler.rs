//! Lowering of expression trees to T-SQL fragments.
//!
//! The compiler is a single recursive function over [`Expr`] that returns SQL text.
//! Column context travels explicitly: when one side of a binary node is a mapped
//! column, the other side is lowered with that column's literal policy, so a constant
//! compared against an enum column renders the same way the column stores it,
//! whichever side it appears on.

use crate::alias::TableAliasRegistry;
use crate::error::{OrmError, OrmResult};
use crate::expr::{BinaryOp, Expr, Lambda, UnaryOp};
use crate::literal::{LiteralOptions, render_literal};
use crate::schema::{ColumnDescriptor, EnumBehavior};
use crate::value::{EnumInfo, Value};

/// Literal policy borrowed from a sibling column.
#[derive(Debug, Clone, Copy)]
struct ColumnHint {
    options: LiteralOptions,
    enum_info: Option<&'static EnumInfo>,
}

impl ColumnHint {
    fn of(column: &ColumnDescriptor) -> Self {
        Self {
            options: column.literal_options(),
            enum_info: column.kind.enum_info(),
        }
    }
}

/// Lowers [`Lambda`] bodies against the aliases of one statement.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionCompiler<'a> {
    registry: &'a TableAliasRegistry,
    alias_members: bool,
}

impl<'a> ExpressionCompiler<'a> {
    pub fn new(registry: &'a TableAliasRegistry) -> Self {
        Self {
            registry,
            alias_members: false,
        }
    }

    /// Suffix each member of an object construction with `AS [member]`.
    pub fn with_member_aliases(mut self) -> Self {
        self.alias_members = true;
        self
    }

    /// Lower a lambda body. Every parameter type must already be registered.
    pub fn compile(&self, lambda: &Lambda) -> OrmResult<String> {
        self.lower(&lambda.body, None)
    }

    /// Lower a single expression.
    pub fn compile_expr(&self, expr: &Expr) -> OrmResult<String> {
        self.lower(expr, None)
    }

    /// Resolve an expression that must be a mapped column of a parameter.
    pub fn column(&self, expr: &Expr) -> OrmResult<(&'a str, &'a ColumnDescriptor)> {
        let inner = match expr {
            Expr::Unary {
                op: UnaryOp::Convert,
                operand,
            } => operand,
            other => other,
        };
        self.column_of(inner)?.ok_or_else(|| {
            OrmError::unsupported_expression(format!(
                "expected a column of a lambda parameter, found a {}",
                inner.kind_name()
            ))
        })
    }

    fn lower(&self, expr: &Expr, hint: Option<ColumnHint>) -> OrmResult<String> {
        match expr {
            Expr::Parameter(ty) => Err(OrmError::unsupported_expression(format!(
                "parameter `{}` used as a value; select one of its members",
                ty.name()
            ))),
            Expr::Constant(value) => self.literal(value, hint),
            Expr::Member { .. } => match self.column_of(expr)? {
                Some((alias, column)) => Ok(format!("{alias}.{}", column.quoted_name())),
                None => {
                    let value = self.evaluate(expr)?;
                    self.literal(&value, hint)
                }
            },
            Expr::Binary { op, left, right } => self.lower_binary(*op, left, right),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Negate => Ok(format!("(-({}))", self.lower(operand, hint)?)),
                UnaryOp::Not => Ok(format!("NOT {}", self.lower(operand, None)?)),
                UnaryOp::Convert => self.lower(operand, hint),
                UnaryOp::OnesComplement | UnaryOp::ArrayLength => Err(
                    OrmError::unsupported_expression(format!("unary operator {op:?}")),
                ),
            },
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => Ok(format!(
                "CASE WHEN ({}) THEN {} ELSE {} END",
                self.lower(test, None)?,
                self.lower(if_true, hint)?,
                self.lower(if_false, hint)?
            )),
            Expr::New { members } => {
                let mut parts = Vec::with_capacity(members.len());
                for (name, member) in members {
                    let sql = self.lower(member, None)?;
                    if self.alias_members {
                        parts.push(format!("{sql} AS [{}]", name.replace(']', "]]")));
                    } else {
                        parts.push(sql);
                    }
                }
                Ok(parts.join(","))
            }
            Expr::Call {
                method,
                target,
                args,
            } => self.lower_call(method, target.as_deref(), args),
        }
    }

    fn lower_binary(&self, op: BinaryOp, left: &Expr, right: &Expr) -> OrmResult<String> {
        let sql_op = op.to_sql().ok_or_else(|| {
            OrmError::unsupported_expression(format!("binary operator {op:?}"))
        })?;

        let left_sql = self.lower(left, self.hint_of(right))?;
        let right_sql = self.lower(right, self.hint_of(left))?;

        if matches!(op, BinaryOp::Equal | BinaryOp::NotEqual) {
            let test = if op == BinaryOp::Equal {
                "IS NULL"
            } else {
                "IS NOT NULL"
            };
            if right_sql == "NULL" {
                return Ok(format!("({left_sql} {test})"));
            }
            if left_sql == "NULL" {
                return Ok(format!("({right_sql} {test})"));
            }
        }

        Ok(format!("({left_sql} {sql_op} {right_sql})"))
    }

    fn lower_call(&self, method: &str, target: Option<&Expr>, args: &[Expr]) -> OrmResult<String> {
        if method != "Contains" {
            return Err(OrmError::unsupported_expression(format!(
                "method call `{method}`"
            )));
        }

        let (collection, needle) = match (target, args) {
            (Some(collection), [needle]) => (collection, needle),
            (None, [collection, needle]) => (collection, needle),
            _ => {
                return Err(OrmError::unsupported_expression(format!(
                    "`Contains` with {} argument(s)",
                    args.len()
                )));
            }
        };

        let needle_sql = self.lower(needle, None)?;
        let items = match self.evaluate(collection)? {
            Value::List(items) => items,
            other => {
                return Err(OrmError::unsupported_expression(format!(
                    "`Contains` over a {} value",
                    other.type_name()
                )));
            }
        };
        if items.is_empty() {
            return Ok("(1=0)".to_string());
        }

        let hint = self.hint_of(needle);
        let rendered = items
            .iter()
            .map(|item| self.literal(item, hint))
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(format!("{needle_sql} IN ({})", rendered.join(",")))
    }

    /// Column behind a member access rooted at a registered lambda parameter.
    ///
    /// `Ok(None)` means the member is not a column reference and must be folded.
    fn column_of(&self, expr: &Expr) -> OrmResult<Option<(&'a str, &'a ColumnDescriptor)>> {
        let Expr::Member {
            declaring: Some(key),
            target,
            name,
        } = expr
        else {
            return Ok(None);
        };
        if !matches!(target.as_ref(), Expr::Parameter(_)) {
            return Ok(None);
        }

        let registry: &'a TableAliasRegistry = self.registry;
        let entry = registry.get(key).ok_or_else(|| {
            OrmError::unsupported_expression(format!(
                "type `{}` is not part of this statement",
                key.name()
            ))
        })?;
        let column = entry.metadata.column_for_member(name).ok_or_else(|| {
            OrmError::unsupported_expression(format!(
                "member `{}.{name}` is not mapped to a column",
                key.name()
            ))
        })?;
        Ok(Some((entry.alias.as_str(), column)))
    }

    fn hint_of(&self, expr: &Expr) -> Option<ColumnHint> {
        match expr {
            Expr::Member { .. } => self.column_of(expr).ok().flatten().map(|(_, c)| ColumnHint::of(c)),
            Expr::Unary {
                op: UnaryOp::Convert,
                operand,
            } => self.hint_of(operand),
            _ => None,
        }
    }

    /// Fold a captured member chain down to its runtime value.
    fn evaluate(&self, expr: &Expr) -> OrmResult<Value> {
        match expr {
            Expr::Constant(value) => Ok(value.clone()),
            Expr::Member { target, name, .. } => match self.evaluate(target)? {
                Value::Record(record) => record.try_member(name)?.ok_or_else(|| {
                    OrmError::unsupported_expression(format!(
                        "`{}` has no member `{name}`",
                        record.type_key().name()
                    ))
                }),
                other => Err(OrmError::unsupported_expression(format!(
                    "member `{name}` read from a {} value",
                    other.type_name()
                ))),
            },
            Expr::Unary {
                op: UnaryOp::Convert,
                operand,
            } => self.evaluate(operand),
            Expr::Parameter(ty) => Err(OrmError::unsupported_expression(format!(
                "member chain rooted at parameter `{}` cannot be folded",
                ty.name()
            ))),
            other => Err(OrmError::unsupported_expression(format!(
                "cannot fold a {} node into a value",
                other.kind_name()
            ))),
        }
    }

    fn literal(&self, value: &Value, hint: Option<ColumnHint>) -> OrmResult<String> {
        let Some(hint) = hint else {
            return render_literal(value, LiteralOptions::default());
        };
        match hint.enum_info {
            Some(info) => render_literal(&coerce_enum(value, info, hint.options)?, hint.options),
            None => render_literal(value, hint.options),
        }
    }
}

/// Interpret a constant compared against an enum column as that enum.
fn coerce_enum(value: &Value, info: &'static EnumInfo, options: LiteralOptions) -> OrmResult<Value> {
    if let Some(n) = value.as_i64() {
        return match info.by_discriminant(n) {
            Some(v) => Ok(Value::Enum(v)),
            None if options.enum_behavior == EnumBehavior::AsInt => Ok(Value::I64(n)),
            None => Err(OrmError::unsupported_type(format!(
                "`{}` has no variant with discriminant {n}",
                info.name
            ))),
        };
    }
    match value {
        Value::String(name) => info.by_name(name).map(Value::Enum).ok_or_else(|| {
            OrmError::unsupported_type(format!("`{}` has no variant named `{name}`", info.name))
        }),
        other => Ok(other.clone()),
    }
}
