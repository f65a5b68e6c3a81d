//! DELETE builder.

use std::marker::PhantomData;

use crate::config::SqlConfig;
use crate::entity::{Entity, EntityType};
use crate::error::{OrmError, OrmResult};
use crate::fluent::clauses::StatementCore;
use crate::fluent::traits::StatementBuilder;

/// `DELETE t0 FROM [s].[t] t0 <joins> WHERE ...`
///
/// Always a physical delete. A DELETE without WHERE conditions fails to build unless
/// [`allow_delete_all`](Self::allow_delete_all) is set.
#[derive(Debug, Clone)]
pub struct DeleteBuilder<T: Entity> {
    core: StatementCore,
    allow_delete_all: bool,
    _table: PhantomData<fn() -> T>,
}

impl<T: Entity> DeleteBuilder<T> {
    pub fn begin() -> Self {
        Self {
            core: StatementCore::new(EntityType::of::<T>()),
            allow_delete_all: false,
            _table: PhantomData,
        }
    }

    impl_filter_methods!();
    impl_join_methods!();

    /// Allow DELETE without WHERE conditions (dangerous!).
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
        self
    }
}

impl<T: Entity> StatementBuilder for DeleteBuilder<T> {
    const KIND: &'static str = "DELETE";

    fn build_sql(&self) -> OrmResult<String> {
        let table = self.core.primary()?;
        if self.core.filters.is_empty() && !self.allow_delete_all {
            return Err(OrmError::invalid_operation(format!(
                "DELETE from {} has no WHERE conditions; call allow_delete_all(true) to delete every row",
                table.qualified_name()
            )));
        }

        let mut parts = vec![
            format!("DELETE {}", table.alias),
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
