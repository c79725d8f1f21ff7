use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use sqlbind::{DatabaseError, Error, Indicator, Memory, Session, TypeConversion, Values};
use sqlbind_test::{assert_eq_fp, new, TableCreator, TestContext};

fn date_time(day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2005, 11, day)
        .and_then(|date| date.and_hms_opt(hour, min, sec))
        .unwrap()
}

#[test]
fn it_binds_vectors_of_ints() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let v = vec![-2_000_000_000_i32, 0, 1, 2_000_000_000];

    let mut statement = sql
        .prepare("insert into soci_test(id) values(:i)")?
        .bind_bulk(&v);

    statement.execute(true)?;
    assert_eq!(statement.rows_affected(), 4);
    drop(statement);

    let mut v2 = vec![0_i32; 10];
    sql.prepare("select id from soci_test order by id")?
        .bind_into_bulk(&mut v2)
        .execute(true)?;

    assert_eq!(v2, v);

    Ok(())
}

#[test]
fn it_binds_vectors_of_unsigned_ints() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let v = [0_u32, 1, 123, 1000];

    sql.prepare("insert into soci_test(ul) values(:ul)")?
        .bind_bulk(&v)
        .execute(true)?;

    let mut v2 = vec![0_u32; 10];
    sql.prepare("select ul from soci_test order by ul")?
        .bind_into_bulk(&mut v2)
        .execute(true)?;

    assert_eq!(v2, v);

    Ok(())
}

#[test]
fn it_binds_vectors_of_doubles() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let v = [0.0_f64, -0.0001, 0.0001, 3.1415926];

    sql.prepare("insert into soci_test(d) values(:d)")?
        .bind_bulk(&v)
        .execute(true)?;

    let mut v2 = vec![0.0_f64; 10];
    sql.prepare("select d from soci_test order by d")?
        .bind_into_bulk(&mut v2)
        .execute(true)?;

    assert_eq!(v2.len(), 4);
    assert_eq_fp!(ctx, v2[0], -0.0001);
    assert_eq_fp!(ctx, v2[1], 0.0);
    assert_eq_fp!(ctx, v2[2], 0.0001);
    assert_eq_fp!(ctx, v2[3], 3.1415926);

    Ok(())
}

#[test]
fn it_binds_vectors_of_date_times() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let v = [
        date_time(26, 22, 45, 17),
        date_time(26, 22, 45, 37),
        date_time(25, 22, 45, 17),
    ];

    sql.prepare("insert into soci_test(tm) values(:tm)")?
        .bind_bulk(&v)
        .execute(true)?;

    // a vector of four is shrunk to the three rows there are
    let mut v2 = vec![NaiveDateTime::default(); 4];
    sql.prepare("select tm from soci_test order by tm")?
        .bind_into_bulk(&mut v2)
        .execute(true)?;

    assert_eq!(v2, [v[2], v[0], v[1]]);

    Ok(())
}

#[test]
fn it_binds_vectors_of_strings() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let names: Vec<String> = (0..1000).map(|i| format!("name {i}")).collect();

    sql.prepare("insert into soci_test(str) values(:s)")?
        .bind_bulk(&names)
        .execute(true)?;

    let count: i64 = sql.prepare("select count(*) from soci_test")?.fetch_one()?;
    assert_eq!(count, 1000);

    let longest: Vec<i64> = sql
        .prepare(&format!(
            "select {} from soci_test where str = 'name 999'",
            ctx.sql_length("str")
        ))?
        .fetch_all()?;

    assert_eq!(longest, [8]);

    Ok(())
}

#[test]
fn it_binds_a_vector_and_a_scalar_together() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let ids = [1_i32, 2, 3];
    let name = String::from("shared");

    sql.prepare("insert into soci_test(id, name) values(:id, :name)")?
        .bind_bulk_named("id", &ids)
        .bind_named("name", &name)
        .execute(true)?;

    let rows: Vec<Values> = sql
        .prepare("select id, name from soci_test order by id")?
        .fetch_all()?;

    assert_eq!(rows.len(), 3);

    for (row, id) in rows.iter().zip(ids) {
        assert_eq!(row.get::<i32>("id")?, id);
        assert_eq!(row.get::<String>("name")?, "shared");
    }

    Ok(())
}

#[test]
fn it_binds_vectors_with_indicators() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let ids = [1_i32, 2, 3];
    let vals = [10_i32, 20, 30];
    let inds = [Indicator::Ok, Indicator::Null, Indicator::Ok];

    sql.prepare("insert into soci_test(id, val) values(:id, :val)")?
        .bind_bulk(&ids)
        .bind_bulk_with_indicators(&vals, &inds)
        .execute(true)?;

    let mut out: Vec<i32> = Vec::new();
    let mut out_inds = Vec::new();

    sql.prepare("select val from soci_test order by id")?
        .bind_into_bulk_with_indicators(&mut out, &mut out_inds)
        .execute(true)?;

    assert_eq!(out_inds, [Indicator::Ok, Indicator::Null, Indicator::Ok]);
    assert_eq!(out, [10, 0, 30]);

    let nulls: i64 = sql
        .prepare("select count(*) from soci_test where val is null")?
        .fetch_one()?;
    assert_eq!(nulls, 1);

    Ok(())
}

#[test]
fn it_executes_nothing_for_empty_vectors() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_4(&mut session)?;

    let empty: Vec<i32> = Vec::new();

    let mut statement = sql
        .prepare("insert into soci_test(val) values(:val)")?
        .bind_bulk(&empty);

    assert!(!statement.execute(true)?);
    assert_eq!(statement.rows_affected(), 0);
    drop(statement);

    let count: i64 = sql.prepare("select count(*) from soci_test")?.fetch_one()?;
    assert_eq!(count, 0);

    Ok(())
}

#[test]
fn it_rejects_vectors_of_different_sizes() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let ids = [1_i32, 2, 3];
    let names = [String::from("a"), String::from("b")];

    let err = sql
        .prepare("insert into soci_test(id, name) values(:id, :name)")?
        .bind_bulk(&ids)
        .bind_bulk(&names)
        .execute(true)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::BulkSizeMismatch {
            expected: 3,
            actual: 2
        }
    ));

    let count: i64 = sql.prepare("select count(*) from soci_test")?.fetch_one()?;
    assert_eq!(count, 0);

    Ok(())
}

#[test]
fn it_fetches_in_batches_into_a_smaller_vector() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_4(&mut session)?;

    let rows: Vec<i32> = (1..=10).collect();
    sql.prepare("insert into soci_test(val) values(:val)")?
        .bind_bulk(&rows)
        .execute(true)?;

    let mut v = vec![0_i32; 4];

    {
        let mut statement = sql
            .prepare("select val from soci_test order by val")?
            .bind_into_bulk(&mut v);

        let mut batches = usize::from(statement.execute(true)?);

        while statement.fetch()? {
            batches += 1;
        }

        assert_eq!(batches, 3);
    }

    // the exhausted result set leaves nothing behind
    assert!(v.is_empty());

    let mut statement = sql.prepare("select val from soci_test order by val")?;
    statement.execute(false)?;

    let mut batch = vec![0_i32; 4];
    let mut seen = Vec::new();
    let mut sizes = Vec::new();

    while statement.fetch_into(&mut batch)? {
        sizes.push(batch.len());
        seen.extend_from_slice(&batch);
    }

    assert_eq!(sizes, [4, 4, 2]);
    assert_eq!(seen, rows);

    Ok(())
}

#[test]
fn it_grows_an_empty_vector_to_the_whole_result() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_4(&mut session)?;

    sql.execute("insert into soci_test(val) values (3), (1), (2)")?;

    let mut v: Vec<i32> = Vec::new();
    let got_data = sql
        .prepare("select val from soci_test order by val desc")?
        .bind_into_bulk(&mut v)
        .execute(true)?;

    assert!(got_data);
    assert_eq!(v, [3, 2, 1]);

    Ok(())
}

#[test]
fn it_fetches_parallel_vectors() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    sql.execute("insert into soci_test(id, str) values (1, 'one'), (2, 'two'), (3, 'three')")?;

    let mut ids = vec![0_i32; 2];
    let mut strs = vec![String::new(); 2];

    sql.prepare("select id, str from soci_test order by id")?
        .bind_into_bulk(&mut ids)
        .bind_into_bulk(&mut strs)
        .execute(true)?;

    assert_eq!(ids, [1, 2]);
    assert_eq!(strs, ["one", "two"]);

    let mut ids = vec![0_i32; 2];
    let mut strs = vec![String::new(); 3];

    let err = sql
        .prepare("select id, str from soci_test order by id")?
        .bind_into_bulk(&mut ids)
        .bind_into_bulk(&mut strs)
        .execute(true)
        .unwrap_err();

    assert!(matches!(err, Error::BulkSizeMismatch { .. }));

    Ok(())
}

#[test]
fn it_falls_back_to_row_by_row_execution() -> anyhow::Result<()> {
    let values: Vec<i32> = (0..50).map(|i| i * 7 % 13).collect();
    let mut tables = Vec::new();

    for url in ["memory:", "memory:?bulk=false"] {
        let mut session = Session::<Memory>::connect(url)?;
        let mut sql = TestContext::from_env().table_creator_4(&mut session)?;

        let mut statement = sql
            .prepare("insert into soci_test(val) values(?)")?
            .bind_bulk(&values);

        statement.execute(true)?;
        assert_eq!(statement.rows_affected(), 50);
        drop(statement);

        let rows: Vec<Values> = sql.prepare("select * from soci_test")?.fetch_all()?;
        tables.push(rows);
    }

    assert_eq!(tables[0], tables[1]);

    Ok(())
}

#[test]
fn it_keeps_rows_before_a_failing_row() -> anyhow::Result<()> {
    for url in ["memory:", "memory:?bulk=false"] {
        let mut session = Session::<Memory>::connect(url)?;
        let mut sql = TableCreator::new(
            &mut session,
            "soci_test",
            "create table soci_test(id integer unique)",
        )?;

        let ids = [1_i32, 2, 2, 3];

        let err = sql
            .prepare("insert into soci_test(id) values(?)")?
            .bind_bulk(&ids)
            .execute(true)
            .unwrap_err();

        assert!(err
            .as_database_error()
            .is_some_and(|err| err.is_unique_violation()));

        let kept: Vec<i32> = sql
            .prepare("select id from soci_test order by id")?
            .fetch_all()?;
        assert_eq!(kept, [1, 2], "{url}");
    }

    Ok(())
}

#[test]
fn it_rejects_bulk_queries_in_either_mode() -> anyhow::Result<()> {
    let mut results = Vec::new();

    for url in ["memory:", "memory:?bulk=false"] {
        let mut session = Session::<Memory>::connect(url)?;
        let mut sql = TestContext::from_env().table_creator_4(&mut session)?;

        sql.execute("insert into soci_test(val) values (1), (2), (3)")?;

        let ids = [1_i32, 2, 3];

        let err = sql
            .prepare("select val from soci_test where val = ?")?
            .bind_bulk(&ids)
            .fetch_all::<i32>()
            .unwrap_err();
        assert!(matches!(err, Error::Bind(_)), "{url}");

        let err = sql
            .prepare("select val from soci_test where val = ?")?
            .bind_bulk(&ids)
            .fetch_optional::<i32>()
            .unwrap_err();
        assert!(matches!(err, Error::Bind(_)), "{url}");

        let mut batch = vec![0_i32; 4];
        let err = sql
            .prepare("select val from soci_test where val = ?")?
            .bind_bulk(&ids)
            .fetch_into(&mut batch)
            .unwrap_err();
        assert!(matches!(err, Error::Bind(_)), "{url}");

        let err = sql
            .prepare("select count(*) from soci_test where val > ?")?
            .bind_bulk(&ids)
            .execute(false)
            .unwrap_err();
        assert!(matches!(err, Error::Bind(_)), "{url}");

        // a single row is a plain query
        let one = [2_i32];
        let rows: Vec<i32> = sql
            .prepare("select val from soci_test where val >= ? order by val")?
            .bind_bulk(&one)
            .fetch_all()?;

        results.push(rows);
    }

    assert_eq!(results[0], [2, 3]);
    assert_eq!(results[0], results[1]);

    Ok(())
}

#[test]
fn it_keeps_rows_decoded_before_a_failing_one() -> anyhow::Result<()> {
    let mut session = new::<Memory>()?;
    let mut sql = TableCreator::new(
        &mut session,
        "soci_test",
        "create table soci_test(id integer, val bigint)",
    )?;

    sql.execute("insert into soci_test(id, val) values (1, 10), (2, 20), (3, 5000000000), (4, 40)")?;

    let mut ids = vec![0_i32; 4];
    let mut vals = vec![0_i32; 4];
    let mut inds = vec![Indicator::Ok; 4];

    let err = sql
        .prepare("select id, val from soci_test order by id")?
        .bind_into_bulk(&mut ids)
        .bind_into_bulk_with_indicators(&mut vals, &mut inds)
        .execute(true)
        .unwrap_err();

    assert!(matches!(err, Error::ColumnDecode { ref index, .. } if index == "val"));

    assert_eq!(ids, [1, 2]);
    assert_eq!(vals, [10, 20]);
    assert_eq!(inds, [Indicator::Ok, Indicator::Ok]);

    Ok(())
}

// inserts `values` in bulk and checks they come back in the order `compare` gives them
fn check_sorted_round_trip<T>(
    sql_type: &str,
    mut values: Vec<T>,
    compare: impl FnMut(&T, &T) -> Ordering,
) -> anyhow::Result<()>
where
    T: TypeConversion + PartialEq + Debug,
{
    let mut session = new::<Memory>()?;
    let mut sql = TableCreator::new(
        &mut session,
        "soci_test",
        &format!("create table soci_test(val {sql_type})"),
    )?;

    sql.prepare("insert into soci_test(val) values(?)")?
        .bind_bulk(&values)
        .execute(true)?;

    let mut fetched: Vec<T> = Vec::new();
    sql.prepare("select val from soci_test order by val")?
        .bind_into_bulk(&mut fetched)
        .execute(true)?;

    values.sort_by(compare);
    assert_eq!(fetched, values, "{sql_type}");

    Ok(())
}

fn rng() -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(0x5eed)
}

#[test]
fn it_sorts_random_ints() -> anyhow::Result<()> {
    let mut rng = rng();

    let values: Vec<i32> = (0..500).map(|_| rng.gen()).collect();
    check_sorted_round_trip("integer", values, Ord::cmp)?;

    let values: Vec<i64> = (0..500)
        .map(|_| rng.gen_range(-1_000_000_000_000..1_000_000_000_000))
        .collect();
    check_sorted_round_trip("bigint", values, Ord::cmp)
}

#[test]
fn it_sorts_random_doubles() -> anyhow::Result<()> {
    let mut rng = rng();

    let values: Vec<f64> = (0..500).map(|_| rng.gen_range(-1e9..1e9)).collect();
    check_sorted_round_trip("double precision", values, f64::total_cmp)
}

#[test]
fn it_sorts_random_strings() -> anyhow::Result<()> {
    let mut rng = rng();

    let values: Vec<String> = (0..500)
        .map(|_| {
            let len = rng.gen_range(0..=20);

            (&mut rng)
                .sample_iter(Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        })
        .collect();
    check_sorted_round_trip("varchar(20)", values, Ord::cmp)
}

#[test]
fn it_sorts_random_date_times() -> anyhow::Result<()> {
    let mut rng = rng();
    let epoch = date_time(1, 0, 0, 0);

    let values: Vec<NaiveDateTime> = (0..500)
        .map(|_| epoch + Duration::seconds(rng.gen_range(-1_000_000_000..1_000_000_000)))
        .collect();
    check_sorted_round_trip("datetime", values, Ord::cmp)
}

#[test]
fn it_inserts_multiple_tuples() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_2(&mut session)?;

    let names = [String::from("a"), String::from("b")];
    let ints = [1_i32, 2];

    let mut statement = sql
        .prepare("insert into soci_test(num_int, name) values(:i, :n), (100, 'fixed')")?
        .bind_bulk_named("i", &ints)
        .bind_bulk_named("n", &names);

    statement.execute(true)?;
    assert_eq!(statement.rows_affected(), 4);
    drop(statement);

    let rows: Vec<(i32, String)> = sql
        .prepare("select num_int, name from soci_test order by num_int")?
        .fetch_all::<Values>()?
        .into_iter()
        .map(|row| Ok((row.get("num_int")?, row.get("name")?)))
        .collect::<sqlbind::Result<_>>()?;

    assert_eq!(
        rows,
        [
            (1, "a".to_owned()),
            (2, "b".to_owned()),
            (100, "fixed".to_owned()),
            (100, "fixed".to_owned()),
        ]
    );

    Ok(())
}
