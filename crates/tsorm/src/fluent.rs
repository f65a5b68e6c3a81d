//! Fluent statement builders.
//!
//! Each builder owns a fresh [`TableAliasRegistry`](crate::alias::TableAliasRegistry),
//! registers its primary type in a static factory, and assembles the final statement in
//! [`StatementBuilder::build`]. Builders are consuming: every step takes `self` and
//! returns the builder. A failing step records its error, later steps are skipped, and
//! `build()` reports the first failure before any SQL is produced.
//!
//! # Usage
//!
//! ```ignore
//! use tsorm::expr::lambda1;
//! use tsorm::fluent::{JoinKind, SelectBuilder, SortOrder, StatementBuilder};
//!
//! let sql = SelectBuilder::from::<Person>()
//!     .select_table::<Person>()
//!     .inner_join::<Person, Order>(|p, o| p.member("id").equals(o.member("person_id")))
//!     .filter(lambda1::<Order>(|o| o.member("total").gt(100)))
//!     .order_by(lambda1::<Person>(|p| p.member("name")), SortOrder::Asc)
//!     .top(10)
//!     .build()?;
//! ```

/// Config and WHERE methods shared by the builders. Expects a `core: StatementCore` field.
macro_rules! impl_filter_methods {
    () => {
        /// Use `config` instead of the default [`SqlConfig`](crate::config::SqlConfig).
        pub fn with_config(mut self, config: $crate::config::SqlConfig) -> Self {
            self.core.config = config;
            self
        }

        /// Add a WHERE condition, AND-ed with the existing ones.
        pub fn filter(self, condition: $crate::expr::Lambda) -> Self {
            self.filter_with(condition, $crate::operand::ConditionalOperator::And)
        }

        /// Add a WHERE condition, OR-ed with the existing ones.
        pub fn or_filter(self, condition: $crate::expr::Lambda) -> Self {
            self.filter_with(condition, $crate::operand::ConditionalOperator::Or)
        }

        /// Add a WHERE condition joined with `op`.
        ///
        /// The lambda's parameter types are registered first.
        pub fn filter_with(
            mut self,
            condition: $crate::expr::Lambda,
            op: $crate::operand::ConditionalOperator,
        ) -> Self {
            self.core.add_filter(&condition, op);
            self
        }

        /// Add a declarative condition joined with `op`.
        pub fn filter_condition(
            mut self,
            condition: &$crate::operand::ConditionBuilder,
            op: $crate::operand::ConditionalOperator,
        ) -> Self {
            self.core.add_condition(condition, op);
            self
        }
    };
}

/// JOIN methods shared by the builders. Expects a `core: StatementCore` field.
macro_rules! impl_join_methods {
    () => {
        /// Join `R` using a condition over `L` and `R`.
        pub fn join<L, R>(
            mut self,
            on: impl FnOnce($crate::expr::Expr, $crate::expr::Expr) -> $crate::expr::Expr,
            kind: $crate::fluent::JoinKind,
        ) -> Self
        where
            L: $crate::entity::Entity,
            R: $crate::entity::Entity,
        {
            self.core.add_join::<L, R>(on, kind);
            self
        }

        pub fn inner_join<L, R>(
            self,
            on: impl FnOnce($crate::expr::Expr, $crate::expr::Expr) -> $crate::expr::Expr,
        ) -> Self
        where
            L: $crate::entity::Entity,
            R: $crate::entity::Entity,
        {
            self.join::<L, R>(on, $crate::fluent::JoinKind::Inner)
        }

        pub fn left_join<L, R>(
            self,
            on: impl FnOnce($crate::expr::Expr, $crate::expr::Expr) -> $crate::expr::Expr,
        ) -> Self
        where
            L: $crate::entity::Entity,
            R: $crate::entity::Entity,
        {
            self.join::<L, R>(on, $crate::fluent::JoinKind::Left)
        }

        /// Join a table by name with a raw ON condition (inserted verbatim).
        ///
        /// A table already registered in this statement reuses its alias; any other table
        /// gets `j<N>`.
        pub fn join_table(
            mut self,
            table: &str,
            condition: &str,
            kind: $crate::fluent::JoinKind,
        ) -> Self {
            self.core.add_raw_join(table, condition, kind);
            self
        }
    };
}

pub(crate) mod clauses;
mod delete;
mod insert;
mod insert_from_query;
mod select;
mod traits;
mod update;
mod update_join;

pub use clauses::{JoinKind, SortOrder};
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use insert_from_query::{InsertFromQueryBuilder, NoQuery};
pub use select::SelectBuilder;
pub use traits::StatementBuilder;
pub use update::UpdateBuilder;
pub use update_join::UpdateWithJoinBuilder;

#[cfg(test)]
mod tests;
