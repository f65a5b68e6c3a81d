use indexmap::IndexMap;
use uuid::Uuid;

use super::*;
use crate::config::SqlConfig;
use crate::error::OrmError;
use crate::expr::{Expr, lambda1, lambda2, lit};
use crate::fixtures::{Audit, Draft, Order, Person, Status};
use crate::operand::{ConditionBuilder, ConditionalOperator, ExprOperator, Operand, SqlExpression};
use crate::value::Value;

fn order(id: i32, person_id: i32, total: f64, status: Status) -> Order {
    Order {
        id,
        person_id,
        total,
        status,
    }
}

fn person_orders_join() -> impl FnOnce(Expr, Expr) -> Expr {
    |p, o| p.member("id").equals(o.member("person_id"))
}

fn order_person_join() -> impl FnOnce(Expr, Expr) -> Expr {
    |o, p| o.member("person_id").equals(p.member("id"))
}

// ==================== SELECT ====================

#[test]
fn select_without_projection_uses_star() {
    let sql = SelectBuilder::from::<Person>().build().unwrap();
    assert_eq!(sql, "SELECT * FROM [dbo].[Person] t0 WITH (NOLOCK)");
}

#[test]
fn select_clause_order() {
    let sql = SelectBuilder::from::<Person>()
        .order_by(lambda1::<Person>(|p| p.member("name")), SortOrder::Desc)
        .filter(lambda1::<Person>(|p| p.member("status").equals(Status::Active)))
        .top(5)
        .select_table::<Person>()
        .distinct()
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT DISTINCT TOP 5 t0.[Id],t0.[Name],t0.[Status] FROM [dbo].[Person] t0 WITH (NOLOCK) \
         WHERE (t0.[Status] = 'Active') ORDER BY t0.[Name] DESC"
    );
}

#[test]
fn select_with_join_and_projection() {
    let sql = SelectBuilder::from::<Person>()
        .inner_join::<Person, Order>(person_orders_join())
        .select(lambda2::<Person, Order>(|p, o| {
            Expr::new_object([("Name", p.member("name")), ("Total", o.member("total"))])
        }))
        .filter(lambda1::<Order>(|o| o.member("total").gt(100)))
        .or_filter(lambda1::<Order>(|o| o.member("status").equals(Status::Inactive)))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT t0.[Name] AS [Name],t1.[Total] AS [Total] FROM [dbo].[Person] t0 WITH (NOLOCK) \
         INNER JOIN [sales].[Orders] t1 WITH (NOLOCK) ON (t0.[Id] = t1.[PersonId]) \
         WHERE (t1.[Total] > 100) OR (t1.[Status] = 2)"
    );
}

#[test]
fn left_join_and_order_by_ascending() {
    let sql = SelectBuilder::from::<Order>()
        .left_join::<Order, Person>(order_person_join())
        .order_by(lambda1::<Order>(|o| o.member("total")), SortOrder::Asc)
        .order_by(lambda1::<Person>(|p| p.member("name")), SortOrder::Desc)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM [sales].[Orders] t0 WITH (NOLOCK) \
         LEFT JOIN [dbo].[Person] t1 WITH (NOLOCK) ON (t0.[PersonId] = t1.[Id]) \
         ORDER BY t0.[Total] ASC,t1.[Name] DESC"
    );
}

#[test]
fn duplicate_columns_are_suppressed() {
    let sql = SelectBuilder::from::<Person>()
        .select(lambda1::<Person>(|p| p.member("name")))
        .select_table::<Person>()
        .select(lambda1::<Person>(|p| p.member("id")))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT t0.[Name],t0.[Id],t0.[Status] FROM [dbo].[Person] t0 WITH (NOLOCK)"
    );
}

#[test]
fn select_registered_projects_every_table() {
    let sql = SelectBuilder::from::<Person>()
        .select(lambda1::<Person>(|p| p.member("name")))
        .inner_join::<Person, Order>(person_orders_join())
        .select_registered()
        .build()
        .unwrap();
    assert!(sql.starts_with(
        "SELECT t0.[Id],t0.[Name],t0.[Status],t1.[Id],t1.[PersonId],t1.[Total],t1.[Status] FROM"
    ));
}

#[test]
fn select_all_locks_projection() {
    let sql = SelectBuilder::from::<Person>().select_all().build().unwrap();
    assert_eq!(sql, "SELECT * FROM [dbo].[Person] t0 WITH (NOLOCK)");

    let err = SelectBuilder::from::<Person>()
        .select_all()
        .select(lambda1::<Person>(|p| p.member("id")))
        .build()
        .unwrap_err();
    assert!(matches!(err, OrmError::InvalidOperation(_)));

    let err = SelectBuilder::from::<Person>()
        .select_all()
        .select_table::<Person>()
        .build()
        .unwrap_err();
    assert!(matches!(err, OrmError::InvalidOperation(_)));
}

#[test]
fn top_zero_is_kept() {
    let sql = SelectBuilder::from::<Person>().top(0).build().unwrap();
    assert_eq!(sql, "SELECT TOP 0 * FROM [dbo].[Person] t0 WITH (NOLOCK)");
}

#[test]
fn contains_filter() {
    let sql = SelectBuilder::from::<Person>()
        .filter(lambda1::<Person>(|p| Expr::list([1, 2]).contains(p.member("id"))))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM [dbo].[Person] t0 WITH (NOLOCK) WHERE t0.[Id] IN (1,2)"
    );
}

#[test]
fn declarative_conditions_mix_with_lambdas() {
    let condition = ConditionBuilder::begin_with(SqlExpression::new(
        Operand::field("Name").unwrap(),
        ExprOperator::Like,
        Operand::constant("A%"),
    ))
    .unwrap();

    let sql = SelectBuilder::from::<Person>()
        .filter(lambda1::<Person>(|p| p.member("id").gt(10)))
        .filter_condition(&condition, ConditionalOperator::Or)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM [dbo].[Person] t0 WITH (NOLOCK) WHERE (t0.[Id] > 10) OR (([Name] LIKE 'A%'))"
    );
}

#[test]
fn declarative_chain_is_grouped_in_where() {
    let name_is = |name: &str| {
        SqlExpression::new(
            Operand::field("Name").unwrap(),
            ExprOperator::Equal,
            Operand::constant(name),
        )
    };
    let either = ConditionBuilder::begin_with(name_is("A"))
        .unwrap()
        .add(ConditionalOperator::Or, name_is("B"))
        .unwrap();

    let sql = DeleteBuilder::<Person>::begin()
        .filter(lambda1::<Person>(|p| p.member("id").equals(1)))
        .filter_condition(&either, ConditionalOperator::And)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "DELETE t0 FROM [dbo].[Person] t0 \
         WHERE (t0.[Id] = 1) AND (([Name] = 'A') OR ([Name] = 'B'))"
    );
}

#[test]
fn filters_register_new_types() {
    let qb = SelectBuilder::from::<Person>()
        .filter(lambda1::<Order>(|o| o.member("total").gt(1)));
    assert!(qb.is_registered::<Order>());
    assert!(qb.build().unwrap().ends_with("WHERE (t1.[Total] > 1)"));
}

#[test]
fn raw_joins_reuse_or_invent_aliases() {
    let sql = SelectBuilder::from::<Person>()
        .join_table("Invoices", "j0.[PersonId] = t0.[Id]", JoinKind::Left)
        .filter(lambda1::<Order>(|o| o.member("total").gt(1)))
        .join_table("sales.Orders", "t1.[PersonId] = t0.[Id]", JoinKind::Full)
        .join_table("archive.Notes", "j2.[PersonId] = t0.[Id]", JoinKind::Right)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM [dbo].[Person] t0 WITH (NOLOCK) \
         LEFT JOIN [Invoices] j0 WITH (NOLOCK) ON j0.[PersonId] = t0.[Id] \
         FULL JOIN [sales].[Orders] t1 WITH (NOLOCK) ON t1.[PersonId] = t0.[Id] \
         RIGHT JOIN [archive].[Notes] j2 WITH (NOLOCK) ON j2.[PersonId] = t0.[Id] \
         WHERE (t1.[Total] > 1)"
    );
}

#[test]
fn raw_join_requires_condition() {
    let err = SelectBuilder::from::<Person>()
        .join_table("Invoices", "  ", JoinKind::Inner)
        .build()
        .unwrap_err();
    assert!(matches!(err, OrmError::Argument(_)));
}

#[test]
fn self_join_is_rejected() {
    let err = SelectBuilder::from::<Person>()
        .join::<Person, Person>(|a, b| a.member("id").equals(b.member("id")), JoinKind::Inner)
        .build()
        .unwrap_err();
    assert!(matches!(err, OrmError::Argument(_)));
}

#[test]
fn read_hint_follows_config() {
    let sql = SelectBuilder::from::<Person>()
        .inner_join::<Person, Order>(person_orders_join())
        .with_config(SqlConfig::new().without_read_hint())
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM [dbo].[Person] t0 INNER JOIN [sales].[Orders] t1 ON (t0.[Id] = t1.[PersonId])"
    );

    let sql = SelectBuilder::from::<Person>()
        .with_config(SqlConfig::new().with_read_hint("READUNCOMMITTED"))
        .build()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM [dbo].[Person] t0 WITH (READUNCOMMITTED)");
}

#[test]
fn build_is_idempotent() {
    let qb = SelectBuilder::from::<Person>()
        .select_table::<Person>()
        .inner_join::<Person, Order>(person_orders_join())
        .filter(lambda1::<Person>(|p| p.member("name").is_not_null()));
    assert_eq!(qb.build().unwrap(), qb.build().unwrap());
}

#[test]
fn unmapped_primary_type_fails_with_schema_error() {
    let err = SelectBuilder::from::<Draft>().build().unwrap_err();
    assert!(err.is_schema());
}

#[test]
fn first_error_wins() {
    let qb = SelectBuilder::from::<Person>()
        .filter(lambda1::<Person>(|p| p.member("nickname").equals("x")))
        .select_table::<Draft>();
    assert!(matches!(qb.build_error(), Some(OrmError::UnsupportedExpression(_))));
    assert!(matches!(qb.build(), Err(OrmError::UnsupportedExpression(_))));
}

#[test]
fn injected_values_follow_columns() {
    let mut extra = IndexMap::new();
    extra.insert("Source".to_string(), Value::from("web"));
    extra.insert("Batch".to_string(), Value::from(7));

    let sql = SelectBuilder::from::<Person>()
        .select(lambda1::<Person>(|p| p.member("id")))
        .inject_additional_values(&extra)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT t0.[Id],'web' AS [Source],7 AS [Batch] FROM [dbo].[Person] t0 WITH (NOLOCK)"
    );

    let sql = SelectBuilder::from::<Person>()
        .select_all()
        .inject_additional_values(&extra)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT *,'web' AS [Source],7 AS [Batch] FROM [dbo].[Person] t0 WITH (NOLOCK)"
    );

    // injected values do not replace the implicit `*`
    let sql = SelectBuilder::from::<Person>()
        .inject_additional_values(&extra)
        .build()
        .unwrap();
    assert!(sql.starts_with("SELECT *,'web' AS [Source],7 AS [Batch] FROM"));
}

// ==================== INSERT ====================

#[test]
fn insert_single_row() {
    let sql = InsertBuilder::<Person>::begin()
        .add_item(Person::new(1, "O'Brien", Status::Active))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO [dbo].[Person] ( [Id],[Name],[Status] ) VALUES ( 1,'O''Brien','Active' );"
    );
}

#[test]
fn insert_many_rows_with_additional_columns() {
    let sql = InsertBuilder::<Order>::begin()
        .add_items([
            order(1, 7, 9.5, Status::Active),
            order(2, 7, 20.0, Status::Inactive),
        ])
        .with_additional_columns([("CreatedBy", "seed")])
        .with_additional_columns([("CreatedBy", "system")])
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO [sales].[Orders] ( [Id],[PersonId],[Total],[Status],[CreatedBy] ) \
         VALUES ( 1,7,9.5,1,'system' ),( 2,7,20,2,'system' );"
    );
}

#[test]
fn insert_skips_computed_columns_and_fills_generated_values() {
    let sql = InsertBuilder::<Audit>::begin()
        .add_item(Audit {
            id: Uuid::nil(),
            created_at: chrono::NaiveDateTime::default(),
            payload: serde_json::json!({ "op": "it's" }),
            row_version: 3,
        })
        .build()
        .unwrap();

    assert!(sql.starts_with("INSERT INTO [dbo].[Audit] ( [Id],[CreatedAt],[Payload] ) VALUES ( '"));
    assert!(sql.ends_with(r#"'{"op":"it''s"}' );"#));
    assert!(!sql.contains("00000000-0000-0000-0000-000000000000"));
    assert!(!sql.contains("1970-01-01"));
    assert!(!sql.contains("RowVersion"));
}

#[test]
fn insert_without_rows_is_invalid() {
    let err = InsertBuilder::<Person>::begin().build().unwrap_err();
    assert!(matches!(err, OrmError::InvalidOperation(_)));
}

#[test]
fn insert_rejects_blank_additional_column() {
    let err = InsertBuilder::<Person>::begin()
        .add_item(Person::new(1, "A", Status::Active))
        .with_additional_columns([(" ", 1)])
        .build()
        .unwrap_err();
    assert!(matches!(err, OrmError::Argument(_)));
}

// ==================== INSERT ... SELECT ====================

#[test]
fn insert_from_query() {
    let query = SelectBuilder::from::<Person>()
        .select(lambda1::<Person>(|p| {
            Expr::new_object([
                ("Id", p.member("id")),
                ("PersonId", p.member("id")),
                ("Total", lit(0)),
                ("Status", lit(Status::Active)),
            ])
        }))
        .filter(lambda1::<Person>(|p| p.member("status").equals(Status::Active)));

    let sql = InsertFromQueryBuilder::into_table::<Order>()
        .with_additional_columns([("CreatedBy", "job")])
        .from_query(query)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO [sales].[Orders] ( [Id],[PersonId],[Total],[Status],[CreatedBy] ) \
         SELECT t0.[Id] AS [Id],t0.[Id] AS [PersonId],0 AS [Total],1 AS [Status],'job' AS [CreatedBy] \
         FROM [dbo].[Person] t0 WITH (NOLOCK) WHERE (t0.[Status] = 'Active')"
    );
}

#[test]
fn insert_from_query_reports_query_errors() {
    let err = InsertFromQueryBuilder::into_table::<Order>()
        .from_query(SelectBuilder::from::<Draft>())
        .build()
        .unwrap_err();
    assert!(err.is_schema());
}

#[test]
fn insert_from_query_with_all_columns_source() {
    let sql = InsertFromQueryBuilder::into_table::<Order>()
        .with_additional_columns([("CreatedBy", "job")])
        .from_query(SelectBuilder::from::<Order>().select_all())
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO [sales].[Orders] ( [Id],[PersonId],[Total],[Status],[CreatedBy] ) \
         SELECT *,'job' AS [CreatedBy] FROM [sales].[Orders] t0 WITH (NOLOCK)"
    );
}

#[test]
fn insert_from_query_is_idempotent() {
    let qb = InsertFromQueryBuilder::into_table::<Order>()
        .with_additional_columns([("CreatedBy", "job")])
        .from_query(SelectBuilder::from::<Order>().select_table::<Order>());
    assert_eq!(qb.build().unwrap(), qb.build().unwrap());
}

// ==================== UPDATE ====================

#[test]
fn update_single_row() {
    let sql = UpdateBuilder::<Person>::begin()
        .add_item(Person::new(1, "Ann", Status::Active))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE t0 SET [Name] = 'Ann',[Status] = 'Active' FROM [dbo].[Person] t0 WHERE (t0.[Id] = 1)"
    );
}

#[test]
fn update_batch_with_filter_and_additional_columns() {
    let sql = UpdateBuilder::<Person>::begin()
        .add_items([
            Person::new(1, "Ann", Status::Active),
            Person::new(2, "Bo", Status::Inactive),
        ])
        .with_additional_columns([("ModifiedBy", "ops")])
        .filter(lambda1::<Person>(|p| p.member("status").not_equals(Status::Inactive)))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE t0 SET [Name] = 'Ann',[Status] = 'Active',[ModifiedBy] = 'ops' FROM [dbo].[Person] t0 \
         WHERE (t0.[Id] = 1) AND ((t0.[Status] <> 'Inactive'));\n\
         UPDATE t0 SET [Name] = 'Bo',[Status] = 'Inactive',[ModifiedBy] = 'ops' FROM [dbo].[Person] t0 \
         WHERE (t0.[Id] = 2) AND ((t0.[Status] <> 'Inactive'))"
    );
}

#[test]
fn update_sets_only_updatable_columns() {
    let id = Uuid::new_v4();
    let sql = UpdateBuilder::<Audit>::begin()
        .add_item(Audit {
            id,
            created_at: chrono::NaiveDateTime::default(),
            payload: serde_json::json!({ "a": 1 }),
            row_version: 9,
        })
        .build()
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "UPDATE t0 SET [Payload] = '{{\"a\":1}}' FROM [dbo].[Audit] t0 WHERE (t0.[Id] = '{id}')"
        )
    );
}

#[test]
fn update_without_rows_is_invalid() {
    let err = UpdateBuilder::<Person>::begin().build().unwrap_err();
    assert!(matches!(err, OrmError::InvalidOperation(_)));
}

// ==================== UPDATE ... JOIN ====================

#[test]
fn update_with_join() {
    let sql = UpdateWithJoinBuilder::into_table::<Order>()
        .inner_join::<Order, Person>(order_person_join())
        .set::<Order, Person>(|o, p| vec![(o.member("status"), p.member("status"))])
        .with_additional_columns([("Total", 0)])
        .filter(lambda1::<Person>(|p| p.member("name").equals("Ann")))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE t0 SET t0.[Status] = t1.[Status],[Total] = 0 FROM [sales].[Orders] t0 \
         INNER JOIN [dbo].[Person] t1 WITH (NOLOCK) ON (t0.[PersonId] = t1.[Id]) \
         WHERE (t1.[Name] = 'Ann')"
    );
}

#[test]
fn update_with_join_validates_pairing() {
    let same = UpdateWithJoinBuilder::into_table::<Order>()
        .set::<Order, Order>(|a, b| vec![(a.member("total"), b.member("total"))])
        .build()
        .unwrap_err();
    assert!(matches!(same, OrmError::Argument(_)));

    let not_joined = UpdateWithJoinBuilder::into_table::<Order>()
        .set::<Order, Person>(|o, p| vec![(o.member("status"), p.member("status"))])
        .build()
        .unwrap_err();
    assert!(matches!(not_joined, OrmError::Argument(_)));

    let not_primary = UpdateWithJoinBuilder::into_table::<Order>()
        .inner_join::<Order, Person>(order_person_join())
        .set::<Person, Order>(|p, o| vec![(p.member("name"), o.member("id"))])
        .build()
        .unwrap_err();
    assert!(matches!(not_primary, OrmError::Argument(_)));

    let wrong_target = UpdateWithJoinBuilder::into_table::<Order>()
        .inner_join::<Order, Person>(order_person_join())
        .set::<Order, Person>(|o, p| vec![(p.member("name"), o.member("id"))])
        .build()
        .unwrap_err();
    assert!(matches!(wrong_target, OrmError::Argument(_)));
}

#[test]
fn update_with_join_needs_mappings() {
    let err = UpdateWithJoinBuilder::into_table::<Order>()
        .inner_join::<Order, Person>(order_person_join())
        .build()
        .unwrap_err();
    assert!(matches!(err, OrmError::InvalidOperation(_)));
}

// ==================== DELETE ====================

#[test]
fn delete_with_filter() {
    let sql = DeleteBuilder::<Order>::begin()
        .filter(lambda1::<Order>(|o| o.member("total").lt(5)))
        .build()
        .unwrap();
    assert_eq!(sql, "DELETE t0 FROM [sales].[Orders] t0 WHERE (t0.[Total] < 5)");
}

#[test]
fn delete_with_join() {
    let sql = DeleteBuilder::<Order>::begin()
        .inner_join::<Order, Person>(order_person_join())
        .filter(lambda1::<Person>(|p| p.member("name").equals("Ann")))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "DELETE t0 FROM [sales].[Orders] t0 \
         INNER JOIN [dbo].[Person] t1 WITH (NOLOCK) ON (t0.[PersonId] = t1.[Id]) \
         WHERE (t1.[Name] = 'Ann')"
    );
}

#[test]
fn delete_all_requires_opt_in() {
    let err = DeleteBuilder::<Order>::begin().build().unwrap_err();
    assert!(matches!(err, OrmError::InvalidOperation(_)));

    let sql = DeleteBuilder::<Order>::begin()
        .allow_delete_all(true)
        .build()
        .unwrap();
    assert_eq!(sql, "DELETE t0 FROM [sales].[Orders] t0");
}
