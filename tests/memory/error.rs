use sqlbind::{DatabaseError, Error, ErrorKind, Memory, MemoryError, MemoryErrorCode, Values};
use sqlbind_test::{new, TableCreator, TestContext};

#[test]
fn it_fails_with_unique_violation() -> anyhow::Result<()> {
    let mut session = new::<Memory>()?;
    let mut sql = TableCreator::new(
        &mut session,
        "soci_test",
        "create table soci_test(id integer primary key, name text)",
    )?;

    sql.execute("insert into soci_test(id, name) values (1, 'a')")?;

    let err = sql
        .execute("insert into soci_test(id, name) values (1, 'b')")
        .unwrap_err();

    let err = err
        .into_database_error()
        .ok_or_else(|| anyhow::anyhow!("expected a database error"))?;

    assert_eq!(err.kind(), ErrorKind::UniqueViolation);
    assert!(err.is_unique_violation());
    assert_eq!(err.code().as_deref(), Some("unique"));

    let err = err
        .try_downcast::<MemoryError>()
        .map_err(|_| anyhow::anyhow!("expected a MemoryError"))?;
    assert_eq!(err.error_code(), MemoryErrorCode::Unique);

    Ok(())
}

#[test]
fn it_fails_with_not_null_violation() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_3(&mut session)?;

    let err = sql
        .execute("insert into soci_test(phone) values ('123')")
        .unwrap_err();

    assert!(err
        .as_database_error()
        .is_some_and(|err| err.is_not_null_violation()));

    Ok(())
}

#[test]
fn it_fails_on_missing_tables_and_columns() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;

    let err = session.prepare("select * from nope").map(|_| ()).unwrap_err();
    let code = err.as_database_error().and_then(|err| err.code());
    assert_eq!(code.as_deref(), Some("no_such_table"));

    let mut sql = ctx.table_creator_4(&mut session)?;

    let err = sql
        .prepare("select nope from soci_test")
        .map(|_| ())
        .unwrap_err();
    let code = err.as_database_error().and_then(|err| err.code());
    assert_eq!(code.as_deref(), Some("no_such_column"));

    Ok(())
}

#[test]
fn it_fails_on_type_mismatch() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let err = sql
        .execute("insert into soci_test(val) values ('not a number')")
        .unwrap_err();
    let code = err.as_database_error().and_then(|err| err.code());
    assert_eq!(code.as_deref(), Some("type_mismatch"));

    sql.execute("insert into soci_test(id, name) values (1, 'Ann')")?;

    let err = sql
        .prepare("select name from soci_test")?
        .fetch_one::<i32>()
        .unwrap_err();

    assert!(matches!(err, Error::ColumnDecode { ref index, .. } if index == "name"));

    Ok(())
}

#[test]
fn it_fails_on_unexpected_null() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    sql.execute("insert into soci_test(id) values (1)")?;

    let err = sql
        .prepare("select name from soci_test")?
        .fetch_one::<String>()
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedNull(_)));

    let mut name = String::from("unchanged");
    let err = sql
        .prepare("select name from soci_test")?
        .bind_into(&mut name)
        .execute(true)
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedNull(_)));

    let row: Values = sql.prepare("select id, name from soci_test")?.fetch_one()?;
    assert!(matches!(
        row.get::<String>("name"),
        Err(Error::UnexpectedNull(ref field)) if field == "name"
    ));
    assert!(matches!(
        row.get::<i32>("missing"),
        Err(Error::ColumnNotFound(ref field)) if field == "missing"
    ));

    Ok(())
}

#[test]
fn it_fails_on_mismatched_bindings() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    // a value too many
    let err = sql
        .prepare("insert into soci_test(id) values (?)")?
        .bind(&1_i32)
        .bind(&2_i32)
        .execute(true)
        .unwrap_err();
    assert!(matches!(err, Error::Bind(_)));

    // a value too few
    let err = sql
        .prepare("insert into soci_test(id, val) values (?, ?)")?
        .bind(&1_i32)
        .execute(true)
        .unwrap_err();
    assert!(matches!(err, Error::Bind(_)));

    // a name with no placeholder
    let err = sql
        .prepare("insert into soci_test(id) values (:id)")?
        .bind_named("nope", &1_i32)
        .execute(true)
        .unwrap_err();
    assert!(matches!(err, Error::Bind(_)));

    // bulk input with output bindings
    let ids = [1_i32, 2];
    let mut out = 0_i32;
    let err = sql
        .prepare("select id from soci_test where id = ?")?
        .bind_bulk(&ids)
        .bind_into(&mut out)
        .execute(true)
        .unwrap_err();
    assert!(matches!(err, Error::Bind(_)));

    // row mapping on a statement that already has into bindings
    let err = sql
        .prepare("select id from soci_test")?
        .bind_into(&mut out)
        .fetch_all::<i32>()
        .unwrap_err();
    assert!(matches!(err, Error::Bind(_)));

    let count: i64 = sql.prepare("select count(*) from soci_test")?.fetch_one()?;
    assert_eq!(count, 0);

    Ok(())
}

#[test]
fn it_fails_to_bind_a_null_record() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_3(&mut session)?;

    let record: Option<Values> = None;
    let err = sql
        .prepare("insert into soci_test(name, phone) values (:name, :phone)")?
        .bind(&record)
        .execute(true)
        .unwrap_err();

    assert!(matches!(err, Error::Encode(_)));

    Ok(())
}

#[test]
fn it_fails_on_out_of_range_values() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    // does not fit `integer`
    let err = sql
        .prepare("insert into soci_test(val) values (?)")?
        .bind(&5_000_000_000_i64)
        .execute(true)
        .unwrap_err();
    assert!(err.as_database_error().is_some());

    sql.execute("insert into soci_test(ul) values (18446744073709551615)")?;

    let err = sql
        .prepare("select ul from soci_test")?
        .fetch_one::<i64>()
        .unwrap_err();
    assert!(matches!(err, Error::ColumnDecode { .. }));

    Ok(())
}

#[test]
fn it_fails_when_no_row_is_found() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_4(&mut session)?;

    let err = sql
        .prepare("select val from soci_test")?
        .fetch_one::<i32>()
        .unwrap_err();
    assert!(matches!(err, Error::RowNotFound));

    let missing: Option<i32> = sql.prepare("select val from soci_test")?.fetch_optional()?;
    assert_eq!(missing, None);

    Ok(())
}

#[test]
fn it_rejects_unknown_statements() -> anyhow::Result<()> {
    let mut session = new::<Memory>()?;

    for sql in [
        "SEELCT 1",
        "select from",
        "insert into t values (1",
        "create table t (x widget)",
        "select * from t; select * from t",
    ] {
        let err = session.execute(sql).unwrap_err();
        let code = err.as_database_error().and_then(|err| err.code());

        assert_eq!(code.as_deref(), Some("syntax"), "{sql}");
    }

    Ok(())
}
