use std::env;
use std::ops::{Deref, DerefMut};

use anyhow::bail;
use sqlbind::{Database, Session};

mod float;

pub use float::{are_doubles_approx_equal, are_doubles_equal, are_doubles_exactly_equal};

#[doc(hidden)]
pub use paste;

/// The URL used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "memory:";

pub fn setup_if_needed() {
    let _ = dotenvy::dotenv();
    let _ = env_logger::builder().is_test(true).try_init();
}

fn database_url() -> String {
    env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned())
}

// Make a new session
// Ensure [dotenvy] and [env_logger] have been setup
pub fn new<DB>() -> anyhow::Result<Session<DB>>
where
    DB: Database,
{
    setup_if_needed();

    Ok(Session::connect(&database_url())?)
}

/// What the tests need to know about the backend they run against.
///
/// Passed explicitly to every test that depends on backend quirks or backend-specific SQL.
#[derive(Debug, Clone)]
pub struct TestContext {
    url: String,
    fp_bug: bool,
}

impl TestContext {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fp_bug: false,
        }
    }

    /// A context for the in-memory backend, which has none of the known quirks.
    pub fn memory() -> Self {
        Self::new(DEFAULT_DATABASE_URL)
    }

    /// A context for `DATABASE_URL`, falling back to the in-memory backend.
    pub fn from_env() -> Self {
        setup_if_needed();

        Self::new(database_url())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn connect<DB>(&self) -> anyhow::Result<Session<DB>>
    where
        DB: Database,
    {
        Ok(Session::connect(&self.url)?)
    }

    /// The backend does not read back floating point values exactly as written.
    pub fn with_fp_bug(mut self, fp_bug: bool) -> Self {
        self.fp_bug = fp_bug;
        self
    }

    pub fn has_fp_bug(&self) -> bool {
        self.fp_bug
    }

    /// A SQL literal for a `YYYY-MM-DD HH:MM:SS` date-time.
    pub fn to_date_time(&self, date_time: &str) -> String {
        format!("'{}'", date_time.replace('\'', "''"))
    }

    /// A SQL expression giving the length of the string expression `expr`.
    pub fn sql_length(&self, expr: &str) -> String {
        format!("length({expr})")
    }

    /// `soci_test` with a column for each of the common scalar types.
    pub fn table_creator_1<'s, DB: Database>(
        &self,
        session: &'s mut Session<DB>,
    ) -> anyhow::Result<TableCreator<'s, DB>> {
        TableCreator::new(
            session,
            "soci_test",
            "create table soci_test(id integer, val integer, c char(1), str varchar(20), \
             sh smallint, ul bigint unsigned, d double precision, num76 numeric(7,6), \
             tm datetime, i1 integer, i2 integer, i3 integer, name varchar(20))",
        )
    }

    pub fn table_creator_2<'s, DB: Database>(
        &self,
        session: &'s mut Session<DB>,
    ) -> anyhow::Result<TableCreator<'s, DB>> {
        TableCreator::new(
            session,
            "soci_test",
            "create table soci_test(num_float float, num_int integer, name varchar(20), \
             sometime datetime, chr char(1))",
        )
    }

    /// The phonebook table.
    pub fn table_creator_3<'s, DB: Database>(
        &self,
        session: &'s mut Session<DB>,
    ) -> anyhow::Result<TableCreator<'s, DB>> {
        TableCreator::new(
            session,
            "soci_test",
            "create table soci_test(name varchar(100) not null, phone varchar(15))",
        )
    }

    pub fn table_creator_4<'s, DB: Database>(
        &self,
        session: &'s mut Session<DB>,
    ) -> anyhow::Result<TableCreator<'s, DB>> {
        TableCreator::new(session, "soci_test", "create table soci_test(val integer)")
    }
}

/// Creates a fixture table for the duration of a test.
///
/// Any table of the same name is dropped first, and the table is dropped again when the
/// creator goes out of scope. Failures to drop are ignored. The creator derefs to the session
/// it was created on.
pub struct TableCreator<'s, DB: Database> {
    session: &'s mut Session<DB>,
    table: String,
}

impl<'s, DB: Database> TableCreator<'s, DB> {
    pub fn new(session: &'s mut Session<DB>, table: &str, ddl: &str) -> anyhow::Result<Self> {
        let mut creator = Self {
            session,
            table: table.to_owned(),
        };

        creator.drop_table();
        creator.session.execute(ddl)?;

        Ok(creator)
    }

    fn drop_table(&mut self) {
        if let Err(err) = self.session.execute(&format!("drop table {}", self.table)) {
            log::trace!("ignoring failure to drop {}: {err}", self.table);
        }
    }
}

impl<DB: Database> Deref for TableCreator<'_, DB> {
    type Target = Session<DB>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl<DB: Database> DerefMut for TableCreator<'_, DB> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl<DB: Database> Drop for TableCreator<'_, DB> {
    fn drop(&mut self) {
        self.drop_table();
    }
}

/// Checks a value read from a `CHAR(N)` column: it must start with `expected` and may only be
/// padded with spaces after that.
pub fn check_equal_padded(padded: &str, expected: &str) -> anyhow::Result<()> {
    let Some(rest) = padded.strip_prefix(expected) else {
        bail!("expected string {expected:?} is different from the padded string {padded:?}");
    };

    if rest.chars().any(|c| c != ' ') {
        bail!("{padded:?} starts with {expected:?} but non-space characters are found afterwards");
    }

    Ok(())
}

// Test type encoding and decoding
//
// test_type!(int<i32>(Memory, "integer", "94101" == 94101_i32));
//
// For every pair, the SQL literal is inserted and read back as the Rust type, then the Rust
// value is bound, inserted and read back.
#[macro_export]
macro_rules! test_type {
    ($name:ident<$ty:ty>($db:ident, $sql_type:literal, $($text:literal == $value:expr),+ $(,)?)) => {
        $crate::paste::item! {
            #[test]
            fn [< test_type_ $name >] () -> anyhow::Result<()> {
                let mut session = $crate::new::<$db>()?;
                let mut table = $crate::TableCreator::new(
                    &mut session,
                    "soci_test",
                    &format!("create table soci_test(val {})", $sql_type),
                )?;

                $(
                    let expected: $ty = $value;

                    table.execute("delete from soci_test")?;
                    table.execute(&format!("insert into soci_test(val) values ({})", $text))?;

                    let decoded: $ty = table.prepare("select val from soci_test")?.fetch_one()?;
                    assert_eq!(decoded, expected, "decoding {}", $text);

                    table.execute("delete from soci_test")?;
                    table
                        .prepare("insert into soci_test(val) values (?)")?
                        .bind(&expected)
                        .execute(true)?;

                    let decoded: $ty = table.prepare("select val from soci_test")?.fetch_one()?;
                    assert_eq!(decoded, expected, "round trip of {:?}", expected);
                )+

                Ok(())
            }
        }
    };

    ($name:ident($db:ident, $sql_type:literal, $($text:literal == $value:expr),+ $(,)?)) => {
        $crate::test_type!($name<$name>($db, $sql_type, $($text == $value),+));
    };
}

/// Panics unless `a` and `b` are within a relative epsilon of each other.
#[macro_export]
macro_rules! assert_eq_approx {
    ($a:expr, $b:expr $(,)?) => {{
        let (a, b): (f64, f64) = ($a, $b);

        if !$crate::are_doubles_approx_equal(a, b) {
            panic!("approximate equality check failed: {:.17} != {:.17}", a, b);
        }
    }};
}

/// Panics unless `a` and `b` are the exact same double.
#[macro_export]
macro_rules! assert_eq_exact {
    ($a:expr, $b:expr $(,)?) => {{
        let (a, b): (f64, f64) = ($a, $b);

        if !$crate::are_doubles_exactly_equal(a, b) {
            panic!("exact equality check failed: {:.17} != {:.17}", a, b);
        }
    }};
}

/// Compares exactly, or approximately if the context reports floating point issues.
#[macro_export]
macro_rules! assert_eq_fp {
    ($ctx:expr, $a:expr, $b:expr $(,)?) => {{
        let (a, b): (f64, f64) = ($a, $b);

        if !$crate::are_doubles_equal(&$ctx, a, b) {
            panic!("equality check failed: {:.17} != {:.17}", a, b);
        }
    }};
}
