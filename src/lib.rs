//! Typed data binding and bulk statement execution over pluggable SQL backends.
//!
//! ```rust,ignore
//! use sqlbind::{Memory, Session};
//!
//! let mut session = Session::<Memory>::connect("memory:")?;
//! session.execute("create table soci_test (id integer)")?;
//!
//! let ids = vec![-2_000_000_000, 0, 1, 2_000_000_000];
//! session
//!     .prepare("insert into soci_test (id) values (:id)")?
//!     .bind_bulk(&ids)
//!     .execute(true)?;
//!
//! let mut out = vec![0_i32; 4];
//! session
//!     .prepare("select id from soci_test order by id")?
//!     .bind_into_bulk(&mut out)
//!     .execute(true)?;
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

// Modules
pub use sqlbind_core::{
    arguments, conversion, database, decode, encode, error, indicator, logger, options,
    placeholders, query_result, row, session, statement, type_info, types, value, values,
};

// Types
pub use sqlbind_core::conversion::TypeConversion;
pub use sqlbind_core::database::{Connection, Database, StatementHandle};
pub use sqlbind_core::error::{BoxDynError, DatabaseError, ErrorKind, UnexpectedNullError};
pub use sqlbind_core::indicator::{Indicated, Indicator};
pub use sqlbind_core::options::{ConnectOptions, LogSettings};
pub use sqlbind_core::row::{Column, ColumnIndex, Row};
pub use sqlbind_core::session::Session;
pub use sqlbind_core::statement::Statement;
pub use sqlbind_core::type_info::DataType;
pub use sqlbind_core::value::ValueKind;
pub use sqlbind_core::values::Values;
pub use sqlbind_core::{Error, Result};

#[cfg(feature = "memory")]
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
pub use sqlbind_memory::{
    self as memory, Memory, MemoryConnectOptions, MemoryConnection, MemoryError,
    MemoryErrorCode, MemorySession,
};

/// Convenience re-export of common traits.
pub mod prelude {
    pub use super::ConnectOptions;
    pub use super::Connection;
    pub use super::Database;
    pub use super::StatementHandle;
    pub use super::TypeConversion;
}
