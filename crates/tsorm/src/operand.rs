//! Declarative conditions.
//!
//! An explicitly constructed alternative to lambda expressions that renders the same
//! fragment language: [`Operand`]s joined by an [`ExprOperator`] form a
//! [`SqlExpression`], and a [`ConditionBuilder`] chains expressions with AND/OR.
//!
//! # Example
//! ```ignore
//! use tsorm::operand::{ConditionBuilder, ConditionalOperator, ExprOperator, Operand, SqlExpression};
//!
//! let cond = ConditionBuilder::begin_with(SqlExpression::new(
//!     Operand::field("Status")?,
//!     ExprOperator::Equal,
//!     Operand::constant(1),
//! ))?
//! .add(
//!     ConditionalOperator::Or,
//!     SqlExpression::is_null(Operand::field("DeletedAt")?),
//! )?
//! .group();
//!
//! assert_eq!(cond.as_str(), "(([Status] = 1) OR ([DeletedAt] IS NULL))");
//! # Ok::<(), tsorm::OrmError>(())
//! ```

use std::fmt;

use crate::error::{OrmError, OrmResult};
use crate::ident;
use crate::literal;
use crate::value::Value;

/// One side of a declarative expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal value (enums always render as integers).
    Constant(Value),
    /// A bracket-quoted column name.
    FieldName(String),
    /// A nested expression, parenthesized.
    Expression(Box<SqlExpression>),
    /// Raw sub-query text, inserted verbatim.
    SubQuery(String),
    /// Comma-separated literals, the right side of IN/NOT IN.
    ValueList(Vec<Value>),
}

impl Operand {
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    pub fn field(name: impl Into<String>) -> OrmResult<Self> {
        let name = name.into();
        ident::validate(&name)?;
        Ok(Self::FieldName(name))
    }

    pub fn expression(expr: SqlExpression) -> Self {
        Self::Expression(Box::new(expr))
    }

    pub fn sub_query(sql: impl Into<String>) -> OrmResult<Self> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(OrmError::argument("Sub-query text cannot be empty"));
        }
        Ok(Self::SubQuery(sql))
    }

    pub fn values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::ValueList(values.into_iter().map(Into::into).collect())
    }

    pub fn render(&self) -> OrmResult<String> {
        match self {
            Self::Constant(value) => literal::render(value),
            Self::FieldName(name) => ident::quote(name),
            Self::Expression(expr) => Ok(format!("({})", expr.render()?)),
            Self::SubQuery(sql) => Ok(sql.clone()),
            Self::ValueList(values) => Ok(values
                .iter()
                .map(literal::render)
                .collect::<OrmResult<Vec<_>>>()?
                .join(",")),
        }
    }
}

/// Operators of a declarative expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl ExprOperator {
    pub fn to_sql(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

/// One operator applied to up to two operands.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlExpression {
    pub operator: ExprOperator,
    pub left: Option<Operand>,
    pub right: Option<Operand>,
}

impl SqlExpression {
    /// `left OP right`
    pub fn new(left: Operand, operator: ExprOperator, right: Operand) -> Self {
        Self {
            operator,
            left: Some(left),
            right: Some(right),
        }
    }

    /// `operand IS NULL`
    pub fn is_null(operand: Operand) -> Self {
        Self {
            operator: ExprOperator::IsNull,
            left: Some(operand),
            right: None,
        }
    }

    /// `operand IS NOT NULL`
    pub fn is_not_null(operand: Operand) -> Self {
        Self {
            operator: ExprOperator::IsNotNull,
            left: Some(operand),
            right: None,
        }
    }

    /// `field IN (values)`
    pub fn in_list(field: Operand, values: Operand) -> Self {
        Self::new(field, ExprOperator::In, values)
    }

    /// `field NOT IN (values)`
    pub fn not_in_list(field: Operand, values: Operand) -> Self {
        Self::new(field, ExprOperator::NotIn, values)
    }

    pub fn render(&self) -> OrmResult<String> {
        let left = render_side(self.left.as_ref())?;
        let right = render_side(self.right.as_ref())?;
        let op = self.operator.to_sql();

        match self.operator {
            ExprOperator::IsNull | ExprOperator::IsNotNull => match (left, right) {
                (Some(side), None) | (None, Some(side)) => Ok(format!("({side} {op})")),
                (None, None) => Err(OrmError::missing_operand(format!(
                    "{op} requires an operand"
                ))),
                (Some(_), Some(_)) => Err(OrmError::argument(format!(
                    "{op} takes exactly one operand"
                ))),
            },
            ExprOperator::In | ExprOperator::NotIn => {
                let (left, right) = both(self.operator, left, right)?;
                Ok(format!("({left} {op} ({right}))"))
            }
            _ => {
                let (left, right) = both(self.operator, left, right)?;
                Ok(format!("({left} {op} {right})"))
            }
        }
    }
}

fn render_side(operand: Option<&Operand>) -> OrmResult<Option<String>> {
    Ok(operand
        .map(Operand::render)
        .transpose()?
        .filter(|s| !s.trim().is_empty()))
}

fn both(op: ExprOperator, left: Option<String>, right: Option<String>) -> OrmResult<(String, String)> {
    match (left, right) {
        (Some(l), Some(r)) => Ok((l, r)),
        (None, _) => Err(OrmError::missing_operand(format!(
            "{} requires a left operand",
            op.to_sql()
        ))),
        (_, None) => Err(OrmError::missing_operand(format!(
            "{} requires a right operand",
            op.to_sql()
        ))),
    }
}

/// How a condition joins the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalOperator {
    And,
    Or,
}

impl ConditionalOperator {
    pub fn to_sql(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Append-only chain of rendered expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionBuilder {
    text: String,
}

impl ConditionBuilder {
    /// Start a chain with its first expression.
    pub fn begin_with(expr: SqlExpression) -> OrmResult<Self> {
        Ok(Self {
            text: expr.render()?,
        })
    }

    /// Append `OP expr`.
    pub fn add(mut self, op: ConditionalOperator, expr: SqlExpression) -> OrmResult<Self> {
        let rendered = expr.render()?;
        self.text.push_str(op.to_sql());
        self.text.push_str(&rendered);
        Ok(self)
    }

    /// Parenthesize everything accumulated so far.
    pub fn group(self) -> Self {
        Self {
            text: format!("({})", self.text),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ConditionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
