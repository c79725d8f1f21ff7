//! Traits to represent a backend driver.
//!
//! # Support
//!
//! The binding engine in this crate never talks to a database itself. A backend plugs in by
//! implementing [`Database`] together with its [`Connection`] and [`StatementHandle`].
//! `sqlbind-memory` is the in-process reference implementation.
//!
//! A backend only ever sees [`Arguments`] laid out per placeholder slot and hands back
//! [`Row`]s; user types and their conversions are resolved before and after that.

use std::fmt::Debug;

use crate::arguments::Arguments;
use crate::error::Result;
use crate::options::ConnectOptions;
use crate::placeholders::Placeholder;
use crate::query_result::QueryResult;
use crate::row::{Column, Row};

/// A database driver.
///
/// This trait encapsulates a complete set of traits that implement a driver for a
/// specific database.
pub trait Database: 'static + Sized + Send + Debug {
    /// The concrete `Connection` implementation for this database.
    type Connection: Connection<Database = Self>;

    /// The concrete prepared statement handle for this database.
    type Statement: StatementHandle;

    /// The concrete `ConnectOptions` implementation for this database.
    type Options: ConnectOptions<Connection = Self::Connection>;

    /// The display name for this database driver.
    const NAME: &'static str;

    /// The schemes for database URLs that should match this driver.
    const URL_SCHEMES: &'static [&'static str];
}

/// Represents a single open connection to a backend.
///
/// All methods block until the backend has answered.
pub trait Connection: Send {
    type Database: Database<Connection = Self>;

    /// Prepares `sql`, resolving its placeholders.
    fn prepare(&mut self, sql: &str) -> Result<<Self::Database as Database>::Statement>;

    /// Executes a prepared statement for every row of `arguments`.
    ///
    /// Any result set left over from a previous execution of `statement` is discarded first.
    /// Unless [`supports_bulk`](Connection::supports_bulk) returns `true`, the engine only
    /// ever passes a single row.
    fn execute(
        &mut self,
        statement: &mut <Self::Database as Database>::Statement,
        arguments: &Arguments,
    ) -> Result<QueryResult>;

    /// Fetches the next row of the current result set of `statement`, or `None` once it
    /// is exhausted.
    fn fetch(
        &mut self,
        statement: &mut <Self::Database as Database>::Statement,
    ) -> Result<Option<Row>>;

    /// Whether [`execute`](Connection::execute) accepts more than one row of arguments at once.
    fn supports_bulk(&self) -> bool {
        false
    }

    /// Checks if a connection to the database is still valid.
    fn ping(&mut self) -> Result<()>;

    /// Explicitly close this database connection.
    ///
    /// This notifies the database server that the connection is closing so that it can
    /// free up any server-side resources in use.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// A statement prepared by a backend.
pub trait StatementHandle: Send + Debug {
    /// The original SQL text of the statement.
    fn sql(&self) -> &str;

    /// The placeholder slots of the statement, in order.
    fn parameters(&self) -> &[Placeholder];

    /// The columns of the result set, if the statement produces one.
    fn columns(&self) -> &[Column];
}
