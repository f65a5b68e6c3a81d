use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tsorm::expr::lambda1;
use tsorm::fluent::{InsertBuilder, SelectBuilder, SortOrder};
use tsorm::operand::{ConditionBuilder, ConditionalOperator, ExprOperator, Operand, SqlExpression};
use tsorm::{Entity, SqlEnum, StatementBuilder};

#[derive(Debug, Clone, Copy, SqlEnum)]
enum Status {
    Active = 1,
    Inactive = 2,
}

#[derive(Debug, Clone, Entity)]
#[orm(table = "Person")]
struct Person {
    #[orm(column, primary_key)]
    id: i32,
    #[orm(column)]
    name: String,
    #[orm(column, enum_as = "string")]
    status: Status,
}

#[derive(Debug, Clone, Entity)]
#[orm(table = "Orders", schema = "sales")]
struct Order {
    #[orm(column, primary_key)]
    id: i32,
    #[orm(column)]
    person_id: i32,
    #[orm(column)]
    total: f64,
}

fn person(i: usize) -> Person {
    Person {
        id: i as i32,
        name: format!("O'Name {i}"),
        status: if i % 2 == 0 {
            Status::Active
        } else {
            Status::Inactive
        },
    }
}

/// SELECT with a join and `n` OR-ed filters.
fn build_select(n: usize) -> SelectBuilder {
    let mut qb = SelectBuilder::from::<Person>()
        .select_table::<Person>()
        .inner_join::<Person, Order>(|p, o| p.member("id").equals(o.member("person_id")))
        .order_by(lambda1::<Person>(|p| p.member("name")), SortOrder::Asc);
    for i in 0..n {
        qb = qb.or_filter(lambda1::<Order>(move |o| o.member("total").gt(i as f64)));
    }
    qb
}

fn bench_select_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/select_build");

    for n in [1, 5, 10, 50] {
        let qb = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.build()));
        });
    }

    group.finish();
}

fn bench_select_compile_and_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/select_compile_and_build");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).build()));
        });
    }

    group.finish();
}

fn bench_insert_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/insert_rows");

    for n in [1, 10, 100, 500] {
        let rows: Vec<Person> = (0..n).map(person).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| black_box(InsertBuilder::begin().add_items(rows.iter().cloned()).build()));
        });
    }

    group.finish();
}

fn bench_condition_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/condition_append");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let eq = |i: usize| {
                    SqlExpression::new(
                        Operand::field(format!("col{i}")).unwrap(),
                        ExprOperator::Equal,
                        Operand::constant(i as i64),
                    )
                };
                let mut cond = ConditionBuilder::begin_with(eq(0)).unwrap();
                for i in 1..n {
                    cond = cond.add(ConditionalOperator::And, eq(i)).unwrap();
                }
                black_box(cond.group().as_str().len())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_select_build,
    bench_select_compile_and_build,
    bench_insert_rows,
    bench_condition_append
);
criterion_main!(benches);
