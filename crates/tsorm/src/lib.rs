//! # tsorm
//!
//! A T-SQL object mapper: compiles typed expressions and object graphs into SQL Server
//! statements. tsorm never talks to a database; it produces SQL text for whatever
//! execution layer you use.
//!
//! ## Features
//!
//! - **Declarative schema**: `#[derive(Entity)]` maps a struct to `[schema].[table]`
//! - **Expression compiler**: lambda-style predicates and projections lowered to T-SQL
//! - **Declarative conditions**: build the same fragments explicitly with operands
//! - **Fluent builders**: SELECT, INSERT, INSERT ... SELECT, UPDATE, UPDATE ... JOIN, DELETE
//! - **Scripts**: single-row INSERT/UPDATE/MERGE/DELETE with soft-delete support
//! - **Inline literals**: every value is rendered and escaped, no parameter placeholders
//!
//! ## Example
//!
//! ```ignore
//! use tsorm::{Entity, SqlEnum, StatementBuilder};
//! use tsorm::expr::lambda1;
//! use tsorm::fluent::{SelectBuilder, SortOrder};
//!
//! #[derive(Debug, Clone, Copy, SqlEnum)]
//! enum Status {
//!     Active = 1,
//!     Inactive = 2,
//! }
//!
//! #[derive(Debug, Entity)]
//! #[orm(table = "Person")]
//! struct Person {
//!     #[orm(column = "Id", primary_key)]
//!     id: i32,
//!     #[orm(column = "Name")]
//!     name: String,
//!     #[orm(column = "Status", enum_as = "string")]
//!     status: Status,
//! }
//!
//! let sql = SelectBuilder::from::<Person>()
//!     .select_table::<Person>()
//!     .filter(lambda1::<Person>(|p| p.member("status").equals(Status::Active)))
//!     .order_by(lambda1::<Person>(|p| p.member("name")), SortOrder::Asc)
//!     .build()?;
//! // SELECT t0.[Id],t0.[Name],t0.[Status] FROM [dbo].[Person] t0 WITH (NOLOCK)
//! //   WHERE (t0.[Status] = 'Active') ORDER BY t0.[Name] ASC
//!
//! let insert = tsorm::script::insert_statement(&person)?;
//! // INSERT INTO [dbo].[Person] ( [Id],[Name],[Status] ) VALUES ( 1,'O''Brien','Active' );
//! ```

pub mod alias;
pub mod compiler;
pub mod config;
pub mod entity;
pub mod error;
pub mod expr;
pub mod fluent;
pub mod ident;
pub mod literal;
pub mod operand;
pub mod schema;
pub mod script;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use alias::{TableAliasEntry, TableAliasRegistry};
pub use compiler::ExpressionCompiler;
pub use config::SqlConfig;
pub use entity::{Entity, EntityType, Record, TypeKey};
pub use error::{OrmError, OrmResult};
pub use expr::{BinaryOp, Expr, Lambda, UnaryOp, capture, lambda1, lambda2, lit, param};
pub use fluent::{
    DeleteBuilder, InsertBuilder, InsertFromQueryBuilder, JoinKind, SelectBuilder, SortOrder,
    StatementBuilder, UpdateBuilder, UpdateWithJoinBuilder,
};
pub use literal::{LiteralOptions, render_literal};
pub use operand::{
    ConditionBuilder, ConditionalOperator, ExprOperator, Operand, SqlExpression,
};
pub use schema::{
    ColumnAttr, ColumnDescriptor, EntityDescriptor, EnumBehavior, InsertUpdateBehavior,
    KeyBehavior, MemberDescriptor, TableAttr, TypeMetadata, discover,
};
pub use script::{ScriptGenerator, SelectOptions, StatementKind};
pub use value::{EnumInfo, EnumValue, EnumVariant, SqlEnum, SqlKind, SqlType, Value};

#[cfg(feature = "derive")]
pub use tsorm_derive::{Entity, Record, SqlEnum};
