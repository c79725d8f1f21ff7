use crate::database::{Connection, Database};
use crate::error::Result;
use crate::options::{ConnectOptions, LogSettings};
use crate::statement::Statement;

/// An open connection to a backend, and the entry point for running statements.
///
/// ```rust,ignore
/// let mut session = Session::<Memory>::connect("memory:")?;
///
/// session.execute("create table soci_test (id integer, name varchar(100))")?;
///
/// let count: i64 = session
///     .prepare("select count(*) from soci_test")?
///     .fetch_one()?;
/// ```
pub struct Session<DB: Database> {
    pub(crate) conn: DB::Connection,
    pub(crate) log_settings: LogSettings,
    pub(crate) last_query: Option<String>,
}

impl<DB: Database> Session<DB> {
    /// Establish a new session from a database URL.
    pub fn connect(url: &str) -> Result<Self> {
        let options: DB::Options = url.parse()?;

        Self::connect_with(&options)
    }

    /// Establish a new session with the provided options.
    pub fn connect_with(options: &DB::Options) -> Result<Self> {
        let conn = options.connect()?;

        tracing::debug!(backend = DB::NAME, "session established");

        Ok(Self {
            conn,
            log_settings: options.log_settings().clone(),
            last_query: None,
        })
    }

    /// Prepares `sql` for binding and execution.
    pub fn prepare<'c, 'b>(&'c mut self, sql: &str) -> Result<Statement<'c, 'b, DB>> {
        let handle = self.conn.prepare(sql)?;
        self.last_query = Some(sql.to_owned());

        Ok(Statement::new(self, handle))
    }

    /// Prepares and executes a statement without any bindings, returning the number of
    /// rows affected.
    pub fn execute(&mut self, sql: &str) -> Result<u64> {
        let mut statement = self.prepare(sql)?;
        statement.execute(true)?;

        Ok(statement.rows_affected())
    }

    /// The text of the statement most recently prepared on this session.
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn backend_name(&self) -> &'static str {
        DB::NAME
    }

    /// Checks if the connection to the backend is still valid.
    pub fn ping(&mut self) -> Result<()> {
        self.conn.ping()
    }

    /// Explicitly close the session.
    pub fn close(self) -> Result<()> {
        self.conn.close()
    }

    /// Access to the backend connection, for backend-specific extensions.
    pub fn connection_mut(&mut self) -> &mut DB::Connection {
        &mut self.conn
    }
}
