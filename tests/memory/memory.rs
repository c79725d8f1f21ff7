use sqlbind::{
    Connection, DatabaseError, Error, Indicated, Indicator, Memory, MemoryError, MemoryErrorCode,
    Session, Values,
};
use sqlbind_test::{new, TestContext};

#[test]
fn it_connects() -> anyhow::Result<()> {
    let mut session = new::<Memory>()?;

    session.ping()?;
    assert_eq!(session.backend_name(), "Memory");

    Ok(session.close()?)
}

#[test]
fn it_reaches_the_backend_connection() -> anyhow::Result<()> {
    let mut session = Session::<Memory>::connect("memory:")?;
    assert!(session.connection_mut().supports_bulk());

    let mut session = Session::<Memory>::connect("memory:?bulk=false")?;
    assert!(!session.connection_mut().supports_bulk());

    Ok(())
}

#[test]
fn it_fails_to_connect() -> anyhow::Result<()> {
    assert!(matches!(
        Session::<Memory>::connect("memory:?bulk=sometimes"),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        Session::<Memory>::connect("postgres://localhost/db"),
        Err(Error::Configuration(_))
    ));

    Ok(())
}

#[test]
fn it_fails_to_parse() -> anyhow::Result<()> {
    let mut session = new::<Memory>()?;
    let err = session.execute("SEELCT 1").unwrap_err();

    let err = err
        .into_database_error()
        .ok_or_else(|| anyhow::anyhow!("expected a database error"))?;

    assert_eq!(err.code().as_deref(), Some("syntax"));
    assert_eq!(
        err.downcast_ref::<MemoryError>().error_code(),
        MemoryErrorCode::Syntax
    );

    Ok(())
}

#[test]
fn it_executes() -> anyhow::Result<()> {
    let mut session = new::<Memory>()?;

    session.execute("create table users (id integer primary key)")?;

    for index in 1..=10_i32 {
        let mut statement = session
            .prepare("insert into users (id) values (?)")?
            .bind(&index);

        statement.execute(true)?;
        assert_eq!(statement.rows_affected(), 1);
    }

    let ids: Vec<i32> = session.prepare("select id from users")?.fetch_all()?;
    assert_eq!(ids.iter().sum::<i32>(), 55);

    let count: i64 = session.prepare("select count(*) from users")?.fetch_one()?;
    assert_eq!(count, 10);

    assert_eq!(session.execute("delete from users where id > 5")?, 5);
    assert_eq!(session.execute("update users set id = 0 where id = 1")?, 1);

    Ok(())
}

#[test]
fn it_remembers_the_last_query() -> anyhow::Result<()> {
    let mut session = new::<Memory>()?;
    assert_eq!(session.last_query(), None);

    let ctx = TestContext::from_env();
    let mut table = ctx.table_creator_4(&mut session)?;

    table
        .prepare("insert into soci_test(val) values(:val)")?
        .bind(&7_i32)
        .execute(true)?;

    assert_eq!(
        table.last_query(),
        Some("insert into soci_test(val) values(:val)")
    );

    Ok(())
}

#[test]
fn it_binds_named_placeholders_in_any_order() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    let id = 10_i32;
    let name = String::from("John");

    sql.prepare("insert into soci_test(id, name, val) values(:id, :name, :id)")?
        .bind_named("name", &name)
        .bind_named("ID", &id)
        .execute(true)?;

    let row: Values = sql
        .prepare("select id, name, val from soci_test")?
        .fetch_one()?;

    assert_eq!(row.get::<i32>("id")?, 10);
    assert_eq!(row.get::<String>("name")?, "John");
    assert_eq!(row.get::<i32>("val")?, 10);
    assert_eq!(row.names().collect::<Vec<_>>(), ["id", "name", "val"]);

    Ok(())
}

#[test]
fn it_fetches_into_scalars() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_1(&mut session)?;

    sql.execute("insert into soci_test(id, name, d) values(1, 'Alice', 3.5)")?;
    sql.execute("insert into soci_test(id, name) values(2, 'Bob')")?;

    let mut name = String::new();
    let mut d = 0.0_f64;

    let got_data = sql
        .prepare("select name, d from soci_test where id = 1")?
        .bind_into(&mut name)
        .bind_into(&mut d)
        .execute(true)?;

    assert!(got_data);
    assert_eq!(name, "Alice");
    sqlbind_test::assert_eq_fp!(ctx, d, 3.5);

    let mut d = -1.0_f64;
    let mut indicator = Indicator::Ok;

    sql.prepare("select d from soci_test where id = 2")?
        .bind_into_with_indicator(&mut d, &mut indicator)
        .execute(true)?;

    assert_eq!(indicator, Indicator::Null);
    sqlbind_test::assert_eq_exact!(d, -1.0);

    // an `f32` is widened on the way in
    sql.prepare("update soci_test set d = ? where id = 2")?
        .bind(&3.1_f32)
        .execute(true)?;

    let d: f64 = sql
        .prepare("select d from soci_test where id = 2")?
        .fetch_one()?;
    sqlbind_test::assert_eq_approx!(d, 3.1);

    let mut count = 0_i64;
    let got_data = sql
        .prepare("select count(*) from soci_test where id > 100")?
        .bind_into(&mut count)
        .execute(true)?;

    assert!(got_data);
    assert_eq!(count, 0);

    let mut missing = 0_i32;
    let got_data = sql
        .prepare("select id from soci_test where id > 100")?
        .bind_into(&mut missing)
        .execute(true)?;

    assert!(!got_data);

    Ok(())
}

#[test]
fn it_steps_through_rows_without_into_bindings() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_4(&mut session)?;

    sql.execute("insert into soci_test(val) values (1), (2), (3)")?;

    let mut statement = sql.prepare("select val from soci_test")?;
    statement.execute(false)?;

    let mut rows = 0;
    while statement.fetch()? {
        rows += 1;
    }

    assert_eq!(rows, 3);
    assert!(!statement.got_data());
    assert_eq!(statement.rows_returned(), 3);
    assert_eq!(statement.columns()[0].name(), "val");

    Ok(())
}

#[test]
fn it_discards_unfetched_rows_on_reexecution() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_4(&mut session)?;

    sql.execute("insert into soci_test(val) values (1), (2), (3)")?;

    let mut statement = sql.prepare("select val from soci_test order by val")?;
    let mut batch = vec![0_i32; 2];

    statement.execute(false)?;
    assert!(statement.fetch_into(&mut batch)?);
    assert_eq!(batch, [1, 2]);

    statement.execute(false)?;
    assert!(statement.fetch_into(&mut batch)?);
    assert_eq!(batch, [1, 2]);

    assert!(statement.fetch_into(&mut batch)?);
    assert_eq!(batch, [3]);

    assert!(!statement.fetch_into(&mut batch)?);
    assert!(batch.is_empty());

    Ok(())
}

#[test]
fn it_truncates_to_the_fetch_buffer() -> anyhow::Result<()> {
    let mut session = Session::<Memory>::connect("memory:?fetch_buffer=4")?;
    let ctx = TestContext::from_env();
    let mut sql = ctx.table_creator_1(&mut session)?;

    sql.execute("insert into soci_test(id, str) values(1, 'abcdefgh')")?;
    sql.execute("insert into soci_test(id, str) values(2, 'abc')")?;
    sql.execute("insert into soci_test(id, str) values(3, 'ab\u{e9}cd')")?;

    let values: Vec<Indicated<String>> = sql
        .prepare("select str from soci_test order by id")?
        .fetch_all()?;

    assert_eq!(
        values,
        [
            Indicated::Truncated("abcd".to_owned()),
            Indicated::Ok("abc".to_owned()),
            Indicated::Truncated("ab\u{e9}".to_owned()),
        ]
    );

    let mut text = String::new();
    let mut indicator = Indicator::Ok;

    sql.prepare("select str from soci_test where id = 1")?
        .bind_into_with_indicator(&mut text, &mut indicator)
        .execute(true)?;

    assert_eq!(indicator, Indicator::Truncated);
    assert_eq!(text, "abcd");

    Ok(())
}

#[test]
fn it_executes_with_statement_logging_disabled() -> anyhow::Result<()> {
    let mut session = Session::<Memory>::connect("memory:?statement_logging=off")?;

    session.execute("create table t (id integer)")?;
    assert_eq!(session.execute("insert into t values (1)")?, 1);

    Ok(())
}

#[test]
fn it_counts_rows_returned_on_every_fetch_path() -> anyhow::Result<()> {
    let ctx = TestContext::from_env();
    let mut session = ctx.connect::<Memory>()?;
    let mut sql = ctx.table_creator_4(&mut session)?;

    sql.execute("insert into soci_test(val) values (1), (2), (3), (4), (5)")?;

    let mut statement = sql.prepare("select val from soci_test order by val")?;

    let all: Vec<i32> = statement.fetch_all()?;
    assert_eq!(all.len(), 5);
    assert_eq!(statement.rows_returned(), 5);

    let first: i32 = statement.fetch_one()?;
    assert_eq!(first, 1);
    assert_eq!(statement.rows_returned(), 1);

    statement.execute(false)?;
    assert_eq!(statement.rows_returned(), 0);

    let mut batch = vec![0_i32; 2];
    let mut sizes = Vec::new();

    while statement.fetch_into(&mut batch)? {
        sizes.push(batch.len());
    }

    assert_eq!(sizes, [2, 2, 1]);
    assert_eq!(statement.rows_returned(), 5);
    drop(statement);

    let mut out = vec![0_i32; 2];
    let mut statement = sql
        .prepare("select val from soci_test order by val")?
        .bind_into_bulk(&mut out);

    statement.execute(true)?;
    assert_eq!(statement.rows_returned(), 2);

    while statement.fetch()? {}
    assert_eq!(statement.rows_returned(), 5);
    drop(statement);

    let mut statement = sql.prepare("insert into soci_test(val) values (6)")?;
    statement.execute(true)?;
    assert_eq!(statement.rows_affected(), 1);
    assert_eq!(statement.rows_returned(), 0);

    Ok(())
}
