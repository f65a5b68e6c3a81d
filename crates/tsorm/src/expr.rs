//! Typed expression trees.
//!
//! A [`Lambda`] is the host-side description of a predicate or projection over one or
//! more mapped types. Parameters stand for rows of those types; members read from a
//! parameter become column references, while members read from captured objects are
//! folded into literals by the compiler.
//!
//! ```ignore
//! use tsorm::expr::{capture, lambda1, lambda2};
//!
//! // p => p.Name == "Ann" && p.Status != Status.Inactive
//! let filter = lambda1::<Person>(|p| {
//!     p.member("name").equals("Ann").and(p.member("status").not_equals(Status::Inactive))
//! });
//!
//! // (p, o) => p.Id == o.PersonId
//! let on = lambda2::<Person, Order>(|p, o| p.member("id").equals(o.member("person_id")));
//!
//! // p => p.Total > filter.MinTotal
//! let env = capture(Filter { min_total: 10.0 });
//! let rich = lambda1::<Order>(|o| o.member("total").gt(env.member("min_total")));
//! ```

use std::ops;

use crate::entity::{Entity, EntityType, Record, TypeKey};
use crate::value::{SqlType, Value};

/// Binary node operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitAnd,
    BitOr,
    ExclusiveOr,
    LeftShift,
    RightShift,
    Coalesce,
    Power,
}

impl BinaryOp {
    /// SQL spelling, or `None` when the operator has no lowering.
    pub fn to_sql(self) -> Option<&'static str> {
        match self {
            Self::Equal => Some("="),
            Self::NotEqual => Some("<>"),
            Self::LessThan => Some("<"),
            Self::LessThanOrEqual => Some("<="),
            Self::GreaterThan => Some(">"),
            Self::GreaterThanOrEqual => Some(">="),
            Self::AndAlso => Some("AND"),
            Self::OrElse => Some("OR"),
            Self::Add => Some("+"),
            Self::Subtract => Some("-"),
            Self::Multiply => Some("*"),
            Self::Divide => Some("/"),
            Self::Modulo => Some("%"),
            Self::BitAnd
            | Self::BitOr
            | Self::ExclusiveOr
            | Self::LeftShift
            | Self::RightShift
            | Self::Coalesce
            | Self::Power => None,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }
}

/// Unary node operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
    /// Type conversion; transparent in SQL.
    Convert,
    OnesComplement,
    ArrayLength,
}

/// One node of an expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A lambda parameter: one row of a mapped type.
    Parameter(EntityType),
    Constant(Value),
    /// `target.name`; `declaring` is the statically known type of `target`, if any.
    Member {
        declaring: Option<TypeKey>,
        target: Box<Expr>,
        name: String,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `test ? if_true : if_false`
    Conditional {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    /// Anonymous object construction: named members in order.
    New { members: Vec<(String, Expr)> },
    /// Method call, instance (`target` set) or static.
    Call {
        method: String,
        target: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
}

/// A lambda over mapped types.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub params: Vec<EntityType>,
    pub body: Expr,
}

impl Lambda {
    pub fn new(params: Vec<EntityType>, body: Expr) -> Self {
        Self { params, body }
    }
}

/// A parameter standing for a row of `T`.
pub fn param<T: Entity>() -> Expr {
    Expr::Parameter(EntityType::of::<T>())
}

/// A literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Constant(value.into())
}

/// A captured object whose members are folded into literals.
pub fn capture<R: Record>(record: R) -> Expr {
    Expr::Constant(Value::record(record))
}

/// `a => body`
pub fn lambda1<A: Entity>(body: impl FnOnce(Expr) -> Expr) -> Lambda {
    Lambda::new(vec![EntityType::of::<A>()], body(param::<A>()))
}

/// `(a, b) => body`
pub fn lambda2<A: Entity, B: Entity>(body: impl FnOnce(Expr, Expr) -> Expr) -> Lambda {
    Lambda::new(
        vec![EntityType::of::<A>(), EntityType::of::<B>()],
        body(param::<A>(), param::<B>()),
    )
}

impl Expr {
    /// Access a member of this expression.
    pub fn member(&self, name: impl Into<String>) -> Expr {
        let declaring = match self {
            Expr::Parameter(ty) => Some(ty.key()),
            Expr::Constant(Value::Record(record)) => Some(record.type_key()),
            _ => None,
        };
        Expr::Member {
            declaring,
            target: Box::new(self.clone()),
            name: name.into(),
        }
    }

    pub fn binary(op: BinaryOp, left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    pub fn unary(op: UnaryOp, operand: impl Into<Expr>) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand.into()),
        }
    }

    pub fn equals(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Equal, self, rhs)
    }

    pub fn not_equals(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::NotEqual, self, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::LessThan, self, rhs)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::LessThanOrEqual, self, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::GreaterThan, self, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::GreaterThanOrEqual, self, rhs)
    }

    pub fn is_null(self) -> Expr {
        Expr::binary(BinaryOp::Equal, self, Value::Null)
    }

    pub fn is_not_null(self) -> Expr {
        Expr::binary(BinaryOp::NotEqual, self, Value::Null)
    }

    /// Logical AND (`&&`).
    pub fn and(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::AndAlso, self, rhs)
    }

    /// Logical OR (`||`).
    pub fn or(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::OrElse, self, rhs)
    }

    /// Type conversion wrapper.
    pub fn convert(self) -> Expr {
        Expr::unary(UnaryOp::Convert, self)
    }

    /// `self.Contains(needle)` where `self` is a value collection.
    pub fn contains(self, needle: impl Into<Expr>) -> Expr {
        Expr::Call {
            method: "Contains".to_string(),
            target: Some(Box::new(self)),
            args: vec![needle.into()],
        }
    }

    /// `test ? if_true : if_false`
    pub fn when(test: Expr, if_true: impl Into<Expr>, if_false: impl Into<Expr>) -> Expr {
        Expr::Conditional {
            test: Box::new(test),
            if_true: Box::new(if_true.into()),
            if_false: Box::new(if_false.into()),
        }
    }

    /// `new { Name = expr, ... }`
    pub fn new_object<I, S>(members: I) -> Expr
    where
        I: IntoIterator<Item = (S, Expr)>,
        S: Into<String>,
    {
        Expr::New {
            members: members.into_iter().map(|(n, e)| (n.into(), e)).collect(),
        }
    }

    /// A literal value collection.
    pub fn list<I>(values: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Expr::Constant(Value::list(values))
    }

    /// Node kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Parameter(_) => "parameter",
            Expr::Constant(_) => "constant",
            Expr::Member { .. } => "member access",
            Expr::Binary { .. } => "binary",
            Expr::Unary { .. } => "unary",
            Expr::Conditional { .. } => "conditional",
            Expr::New { .. } => "object construction",
            Expr::Call { .. } => "method call",
        }
    }
}

impl<T: SqlType> From<T> for Expr {
    fn from(value: T) -> Self {
        Expr::Constant(value.to_value())
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Constant(value)
    }
}

macro_rules! impl_arith {
    ($($trait:ident :: $method:ident => $op:ident;)*) => {
        $(
            impl<R: Into<Expr>> ops::$trait<R> for Expr {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    Expr::binary(BinaryOp::$op, self, rhs)
                }
            }
        )*
    };
}

impl_arith! {
    Add::add => Add;
    Sub::sub => Subtract;
    Mul::mul => Multiply;
    Div::div => Divide;
    Rem::rem => Modulo;
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Negate, self)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self)
    }
}
