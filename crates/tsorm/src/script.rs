//! Single-row SQL scripts.
//!
//! Unlike the fluent builders, scripts address tables by their qualified name without
//! aliases and write one statement per object:
//!
//! ```text
//! INSERT INTO [dbo].[Person] ( [Id],[Name],[Status] ) VALUES ( 1,'O''Brien','Active' );
//! UPDATE [dbo].[Person] SET [Name] = 'Ann',[Status] = 'Active' WHERE ([Id] = 1) ;
//! UPDATE [dbo].[Person] SET [IsDeleted] = 1 WHERE ([Id] = 1) ;
//! ```
//!
//! Soft-delete tables are "deleted" by setting the configured flag column.

use indexmap::IndexMap;

use crate::config::SqlConfig;
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::fluent::SortOrder;
use crate::fluent::clauses::AdditionalColumns;
use crate::ident;
use crate::literal;
use crate::operand::ConditionBuilder;
use crate::schema::{ColumnDescriptor, TypeMetadata, discover};
use crate::value::Value;

/// Statement kinds generated per object by [`ScriptGenerator::statements_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Update,
    /// MERGE: update when the key matches, insert otherwise.
    Upsert,
    Delete,
}

impl StatementKind {
    fn label(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Upsert => "MERGE",
            Self::Delete => "DELETE",
        }
    }
}

/// Sorting and row limit of a script SELECT.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    sorting: IndexMap<String, SortOrder>,
    row_count: Option<u32>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by a column. Columns are applied in the order they were added.
    pub fn order_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sorting.insert(column.into(), order);
        self
    }

    /// Return at most `count` rows. Zero means no limit.
    pub fn top(mut self, count: u32) -> Self {
        self.row_count = Some(count);
        self
    }
}

/// Generates single-object statements.
#[derive(Debug, Clone, Default)]
pub struct ScriptGenerator {
    config: SqlConfig,
}

impl ScriptGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SqlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SqlConfig {
        &self.config
    }

    // ==================== SELECT ====================

    /// `SELECT [TOP n] <columns> FROM [s].[t] WITH (NOLOCK) [WHERE ...] [ORDER BY ...]`
    ///
    /// `where_clause` is inserted verbatim.
    pub fn select_statement<T: Entity>(
        &self,
        where_clause: Option<&str>,
        options: &SelectOptions,
    ) -> OrmResult<String> {
        let metadata = discover::<T>()?;

        // computed columns (neither inserted nor updated) are left out of the projection
        let columns: Vec<String> = metadata
            .insertable_columns()
            .map(|c| c.quoted_name())
            .collect();
        let mut parts = vec!["SELECT".to_string()];
        if let Some(n) = options.row_count.filter(|n| *n > 0) {
            parts.push(format!("TOP {n}"));
        }
        parts.push(columns.join(","));
        parts.push(format!(
            "FROM {}{}",
            metadata.qualified_name(),
            self.config.read_hint_suffix()
        ));

        if let Some(clause) = where_clause.map(str::trim).filter(|c| !c.is_empty()) {
            parts.push(format!("WHERE {clause}"));
        }
        if !options.sorting.is_empty() {
            let sort = options
                .sorting
                .iter()
                .map(|(column, order)| Ok(format!("{} {}", ident::quote(column)?, order.to_sql())))
                .collect::<OrmResult<Vec<_>>>()?;
            parts.push(format!("ORDER BY {}", sort.join(",")));
        }

        let sql = parts.join(" ");
        self.config.trace_statement("SELECT", &sql);
        Ok(sql)
    }

    /// SELECT filtered by column equality: `([A] = 1) AND ([B] IS NULL)`.
    pub fn select_by_values<T: Entity>(
        &self,
        parameters: &IndexMap<String, Value>,
        options: &SelectOptions,
    ) -> OrmResult<String> {
        let mut conditions = Vec::with_capacity(parameters.len());
        for (column, value) in parameters {
            let column = ident::quote(column)?;
            if value.is_null() {
                conditions.push(format!("({column} IS NULL)"));
            } else {
                conditions.push(format!("({column} = {})", literal::render(value)?));
            }
        }
        let where_clause = conditions.join(" AND ");
        self.select_statement::<T>(Some(&where_clause), options)
    }

    /// SELECT filtered by a declarative condition.
    pub fn select_by_condition<T: Entity>(
        &self,
        condition: &ConditionBuilder,
        options: &SelectOptions,
    ) -> OrmResult<String> {
        self.select_statement::<T>(Some(condition.as_str()), options)
    }

    // ==================== INSERT ====================

    pub fn insert_statement<T: Entity>(&self, item: &T) -> OrmResult<String> {
        self.insert_statement_with(item, &IndexMap::new())
    }

    /// INSERT of every insertable column plus `additional` columns.
    pub fn insert_statement_with<T: Entity>(
        &self,
        item: &T,
        additional: &IndexMap<String, Value>,
    ) -> OrmResult<String> {
        let metadata = discover::<T>()?;
        let extra = additional_columns(additional);

        let columns: Vec<&ColumnDescriptor> = metadata.insertable_columns().collect();
        let mut names: Vec<String> = columns.iter().map(|c| c.quoted_name()).collect();
        names.extend(extra.quoted_names()?);
        if names.is_empty() {
            return Err(no_columns(&metadata, "insertable"));
        }

        let mut values = render_all(&columns, item)?;
        values.extend(extra.rendered_values()?);

        let sql = format!(
            "INSERT INTO {} ( {} ) VALUES ( {} );",
            metadata.qualified_name(),
            names.join(","),
            values.join(",")
        );
        self.config.trace_statement("INSERT", &sql);
        Ok(sql)
    }

    // ==================== UPDATE ====================

    pub fn update_statement<T: Entity>(&self, item: &T) -> OrmResult<String> {
        self.update_statement_with(item, &IndexMap::new(), &[])
    }

    /// UPDATE of every updatable column plus `additional` columns, keyed by the primary
    /// keys and AND-ed with `conditions` (raw SQL).
    pub fn update_statement_with<T: Entity>(
        &self,
        item: &T,
        additional: &IndexMap<String, Value>,
        conditions: &[String],
    ) -> OrmResult<String> {
        let metadata = discover::<T>()?;

        let mut sets = Vec::new();
        for column in metadata.updatable_columns() {
            sets.push(format!("{} = {}", column.quoted_name(), column.render(item)?));
        }
        sets.extend(additional_columns(additional).assignments()?);
        if sets.is_empty() {
            return Err(no_columns(&metadata, "updatable"));
        }

        let filter = row_filter(&metadata, item, conditions)?;
        let sql = format!(
            "UPDATE {} SET {} WHERE {filter} ;",
            metadata.qualified_name(),
            sets.join(",")
        );
        self.config.trace_statement("UPDATE", &sql);
        Ok(sql)
    }

    // ==================== MERGE ====================

    /// MERGE keyed by the primary keys.
    ///
    /// Matched rows get every updatable column; unmatched rows are inserted with every
    /// insertable column.
    pub fn merge_statement<T: Entity>(&self, item: &T) -> OrmResult<String> {
        let metadata = discover::<T>()?;

        let columns: Vec<&ColumnDescriptor> = metadata.insertable_columns().collect();
        if columns.is_empty() {
            return Err(no_columns(&metadata, "insertable"));
        }
        let keys: Vec<String> = metadata
            .primary_keys()
            .map(|k| {
                let name = k.quoted_name();
                format!("(target.{name} = source.{name})")
            })
            .collect();
        if keys.is_empty() {
            return Err(OrmError::invalid_operation(format!(
                "MERGE into {} needs a primary key",
                metadata.qualified_name()
            )));
        }

        let names: Vec<String> = columns.iter().map(|c| c.quoted_name()).collect();
        let values = render_all(&columns, item)?;
        let updates: Vec<String> = columns
            .iter()
            .filter(|c| c.is_updatable())
            .map(|c| {
                let name = c.quoted_name();
                format!("{name} = source.{name}")
            })
            .collect();
        let sources: Vec<String> = names.iter().map(|n| format!("source.{n}")).collect();

        let mut parts = vec![
            format!("MERGE {} as target", metadata.qualified_name()),
            format!("USING (VALUES({})) AS source ({})", values.join(","), names.join(",")),
            format!("ON ({})", keys.join(" AND ")),
        ];
        if !updates.is_empty() {
            parts.push(format!("WHEN MATCHED THEN UPDATE SET {}", updates.join(",")));
        }
        parts.push(format!(
            "WHEN NOT MATCHED THEN INSERT ( {} ) VALUES ( {} );",
            names.join(","),
            sources.join(",")
        ));

        let sql = parts.join(" ");
        self.config.trace_statement("MERGE", &sql);
        Ok(sql)
    }

    // ==================== DELETE ====================

    pub fn delete_statement<T: Entity>(&self, item: &T) -> OrmResult<String> {
        self.delete_statement_with(item, &[])
    }

    /// Soft delete (`SET [IsDeleted] = 1`) or physical DELETE, keyed by the primary keys
    /// and AND-ed with `conditions` (raw SQL).
    pub fn delete_statement_with<T: Entity>(
        &self,
        item: &T,
        conditions: &[String],
    ) -> OrmResult<String> {
        let metadata = discover::<T>()?;
        let filter = row_filter(&metadata, item, conditions)?;

        let sql = if metadata.soft_delete {
            format!(
                "UPDATE {} SET {} = 1 WHERE {filter} ;",
                metadata.qualified_name(),
                ident::quote(&self.config.soft_delete_column)?
            )
        } else {
            format!("DELETE FROM {} WHERE {filter} ;", metadata.qualified_name())
        };
        self.config.trace_statement("DELETE", &sql);
        Ok(sql)
    }

    // ==================== Batches ====================

    /// One statement per item.
    ///
    /// `additional` applies to INSERT and UPDATE, `conditions` to UPDATE and DELETE.
    /// Upserts take neither.
    pub fn statements_for<T: Entity>(
        &self,
        kind: StatementKind,
        items: &[T],
        additional: &IndexMap<String, Value>,
        conditions: &[String],
    ) -> OrmResult<Vec<String>> {
        tracing::trace!(
            target: "tsorm::sql",
            statement = kind.label(),
            rows = items.len(),
            "generating statements"
        );
        items
            .iter()
            .map(|item| match kind {
                StatementKind::Insert => self.insert_statement_with(item, additional),
                StatementKind::Update => self.update_statement_with(item, additional, conditions),
                StatementKind::Upsert => self.merge_statement(item),
                StatementKind::Delete => self.delete_statement_with(item, conditions),
            })
            .collect()
    }
}

/// [`ScriptGenerator::select_statement`] with the default configuration.
pub fn select_statement<T: Entity>(
    where_clause: Option<&str>,
    options: &SelectOptions,
) -> OrmResult<String> {
    ScriptGenerator::default().select_statement::<T>(where_clause, options)
}

/// [`ScriptGenerator::insert_statement`] with the default configuration.
pub fn insert_statement<T: Entity>(item: &T) -> OrmResult<String> {
    ScriptGenerator::default().insert_statement(item)
}

/// [`ScriptGenerator::update_statement`] with the default configuration.
pub fn update_statement<T: Entity>(item: &T) -> OrmResult<String> {
    ScriptGenerator::default().update_statement(item)
}

/// [`ScriptGenerator::merge_statement`] with the default configuration.
pub fn merge_statement<T: Entity>(item: &T) -> OrmResult<String> {
    ScriptGenerator::default().merge_statement(item)
}

/// [`ScriptGenerator::delete_statement`] with the default configuration.
pub fn delete_statement<T: Entity>(item: &T) -> OrmResult<String> {
    ScriptGenerator::default().delete_statement(item)
}

fn additional_columns(map: &IndexMap<String, Value>) -> AdditionalColumns {
    let mut extra = AdditionalColumns::default();
    extra.merge(map.iter().map(|(k, v)| (k.clone(), v.clone())));
    extra
}

fn render_all<T: Entity>(columns: &[&ColumnDescriptor], item: &T) -> OrmResult<Vec<String>> {
    columns.iter().map(|c| c.render(item)).collect()
}

/// `([Id] = 1) AND (<condition>)`. A statement that would touch every row is rejected.
fn row_filter<T: Entity>(
    metadata: &TypeMetadata,
    item: &T,
    conditions: &[String],
) -> OrmResult<String> {
    let mut parts = Vec::new();
    for key in metadata.primary_keys() {
        parts.push(format!("({} = {})", key.quoted_name(), key.render(item)?));
    }
    parts.extend(
        conditions
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| format!("({c})")),
    );
    if parts.is_empty() {
        return Err(OrmError::invalid_operation(format!(
            "{} has no primary key and no conditions were given; the statement would affect every row",
            metadata.qualified_name()
        )));
    }
    Ok(parts.join(" AND "))
}

fn no_columns(metadata: &TypeMetadata, what: &str) -> OrmError {
    OrmError::invalid_operation(format!(
        "{} has no {what} columns",
        metadata.qualified_name()
    ))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::fixtures::{Audit, Draft, Order, Person, Status};
    use crate::operand::{ConditionalOperator, ExprOperator, Operand, SqlExpression};

    fn order() -> Order {
        Order {
            id: 3,
            person_id: 1,
            total: 12.5,
            status: Status::Inactive,
        }
    }

    #[test]
    fn insert_statement_escapes_and_uses_column_policy() {
        let sql = insert_statement(&Person::new(1, "O'Brien", Status::Active)).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO [dbo].[Person] ( [Id],[Name],[Status] ) VALUES ( 1,'O''Brien','Active' );"
        );
    }

    #[test]
    fn insert_with_additional_columns() {
        let mut extra = IndexMap::new();
        extra.insert("CreatedBy".to_string(), Value::from("api"));
        let sql = ScriptGenerator::new()
            .insert_statement_with(&order(), &extra)
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO [sales].[Orders] ( [Id],[PersonId],[Total],[Status],[CreatedBy] ) \
             VALUES ( 3,1,12.5,2,'api' );"
        );
    }

    #[test]
    fn update_statement_keys_on_primary_key() {
        let sql = update_statement(&Person::new(1, "Ann", Status::Inactive)).unwrap();
        assert_eq!(
            sql,
            "UPDATE [dbo].[Person] SET [Name] = 'Ann',[Status] = 'Inactive' WHERE ([Id] = 1) ;"
        );
    }

    #[test]
    fn update_with_additional_data_and_conditions() {
        let mut extra = IndexMap::new();
        extra.insert("ModifiedBy".to_string(), Value::from("ops"));
        let sql = ScriptGenerator::new()
            .update_statement_with(&order(), &extra, &["[Total] > 0".to_string()])
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE [sales].[Orders] SET [PersonId] = 1,[Total] = 12.5,[Status] = 2,[ModifiedBy] = 'ops' \
             WHERE ([Id] = 3) AND ([Total] > 0) ;"
        );
    }

    #[test]
    fn soft_delete_sets_flag() {
        let sql = delete_statement(&Person::new(1, "Ann", Status::Active)).unwrap();
        assert_eq!(sql, "UPDATE [dbo].[Person] SET [IsDeleted] = 1 WHERE ([Id] = 1) ;");

        let config = SqlConfig::new().with_soft_delete_column("Removed");
        let sql = ScriptGenerator::with_config(config)
            .delete_statement(&Person::new(1, "Ann", Status::Active))
            .unwrap();
        assert_eq!(sql, "UPDATE [dbo].[Person] SET [Removed] = 1 WHERE ([Id] = 1) ;");
    }

    #[test]
    fn hard_delete_with_conditions() {
        let sql = ScriptGenerator::new()
            .delete_statement_with(&order(), &["[Status] = 2".to_string(), " ".to_string()])
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM [sales].[Orders] WHERE ([Id] = 3) AND ([Status] = 2) ;"
        );
    }

    #[test]
    fn merge_statement_shape() {
        let sql = merge_statement(&Person::new(1, "Ann", Status::Active)).unwrap();
        assert_eq!(
            sql,
            "MERGE [dbo].[Person] as target \
             USING (VALUES(1,'Ann','Active')) AS source ([Id],[Name],[Status]) \
             ON ((target.[Id] = source.[Id])) \
             WHEN MATCHED THEN UPDATE SET [Name] = source.[Name],[Status] = source.[Status] \
             WHEN NOT MATCHED THEN INSERT ( [Id],[Name],[Status] ) \
             VALUES ( source.[Id],source.[Name],source.[Status] );"
        );
    }

    #[test]
    fn merge_skips_insert_only_columns_on_update() {
        let id = Uuid::new_v4();
        let audit = Audit {
            id,
            created_at: chrono::NaiveDateTime::default(),
            payload: serde_json::json!([1, 2]),
            row_version: 1,
        };
        let sql = merge_statement(&audit).unwrap();
        assert!(sql.contains("AS source ([Id],[CreatedAt],[Payload])"));
        assert!(sql.contains("WHEN MATCHED THEN UPDATE SET [Payload] = source.[Payload] WHEN"));
        assert!(sql.contains(&format!("USING (VALUES('{id}',")));
        assert!(sql.contains("'[1,2]')) AS source"));
    }

    #[test]
    fn select_statement_shapes() {
        let sql = select_statement::<Person>(None, &SelectOptions::new()).unwrap();
        assert_eq!(sql, "SELECT [Id],[Name],[Status] FROM [dbo].[Person] WITH (NOLOCK)");

        let options = SelectOptions::new()
            .order_by("Name", SortOrder::Asc)
            .order_by("Id", SortOrder::Desc)
            .top(10);
        let sql = select_statement::<Person>(Some("[Status] = 'Active'"), &options).unwrap();
        assert_eq!(
            sql,
            "SELECT TOP 10 [Id],[Name],[Status] FROM [dbo].[Person] WITH (NOLOCK) \
             WHERE [Status] = 'Active' ORDER BY [Name] ASC,[Id] DESC"
        );

        let sql = select_statement::<Person>(Some("  "), &SelectOptions::new().top(0)).unwrap();
        assert_eq!(sql, "SELECT [Id],[Name],[Status] FROM [dbo].[Person] WITH (NOLOCK)");
    }

    #[test]
    fn select_statement_skips_computed_columns() {
        let sql = select_statement::<Audit>(None, &SelectOptions::new()).unwrap();
        assert_eq!(sql, "SELECT [Id],[CreatedAt],[Payload] FROM [dbo].[Audit] WITH (NOLOCK)");
        assert!(!sql.contains("[RowVersion]"));
    }

    #[test]
    fn select_by_values_and_condition() {
        let mut params = IndexMap::new();
        params.insert("Name".to_string(), Value::from("Ann"));
        params.insert("Nickname".to_string(), Value::Null);
        let sql = ScriptGenerator::new()
            .select_by_values::<Person>(&params, &SelectOptions::new())
            .unwrap();
        assert!(sql.ends_with("WHERE ([Name] = 'Ann') AND ([Nickname] IS NULL)"));

        let condition = ConditionBuilder::begin_with(SqlExpression::new(
            Operand::field("Id").unwrap(),
            ExprOperator::Equal,
            Operand::constant(1),
        ))
        .unwrap()
        .add(
            ConditionalOperator::Or,
            SqlExpression::new(
                Operand::field("Id").unwrap(),
                ExprOperator::Equal,
                Operand::constant(2),
            ),
        )
        .unwrap()
        .group();
        let sql = ScriptGenerator::new()
            .select_by_condition::<Person>(&condition, &SelectOptions::new())
            .unwrap();
        assert!(sql.ends_with("WHERE (([Id] = 1) OR ([Id] = 2))"));
    }

    #[test]
    fn batches_produce_one_statement_per_item() {
        let people = [
            Person::new(1, "Ann", Status::Active),
            Person::new(2, "Bo", Status::Inactive),
        ];
        let none = IndexMap::new();

        let inserts = ScriptGenerator::new()
            .statements_for(StatementKind::Insert, &people, &none, &[])
            .unwrap();
        assert_eq!(inserts.len(), 2);
        assert!(inserts[1].ends_with("VALUES ( 2,'Bo','Inactive' );"));

        let deletes = ScriptGenerator::new()
            .statements_for(StatementKind::Delete, &people, &none, &["[Name] <> ''".to_string()])
            .unwrap();
        assert_eq!(
            deletes[0],
            "UPDATE [dbo].[Person] SET [IsDeleted] = 1 WHERE ([Id] = 1) AND ([Name] <> '') ;"
        );

        let upserts = ScriptGenerator::new()
            .statements_for(StatementKind::Upsert, &people, &none, &[])
            .unwrap();
        assert!(upserts.iter().all(|s| s.starts_with("MERGE [dbo].[Person] as target")));

        let empty: [Person; 0] = [];
        let updates = ScriptGenerator::new()
            .statements_for(StatementKind::Update, &empty, &none, &[])
            .unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn unmapped_type_fails() {
        assert!(insert_statement(&Draft).unwrap_err().is_schema());
        assert!(select_statement::<Draft>(None, &SelectOptions::new()).unwrap_err().is_schema());
    }
}
