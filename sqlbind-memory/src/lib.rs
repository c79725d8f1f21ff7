//! **In-memory** database driver.
//!
//! Tables live inside the connection and vanish with it. The driver understands a small SQL
//! dialect (`CREATE TABLE`, `DROP TABLE`, `INSERT`, `SELECT`, `UPDATE`, `DELETE`) with `?` and
//! `:name` placeholders, which is enough to exercise every part of the binding engine without
//! a server.
#![warn(future_incompatible, rust_2018_idioms)]

#[macro_use]
extern crate sqlbind_core;

#[macro_use]
mod error;

mod connection;
mod database;
mod engine;
mod options;
mod sql;
mod statement;

pub use connection::MemoryConnection;
pub use database::Memory;
pub use error::{MemoryError, MemoryErrorCode};
pub use options::MemoryConnectOptions;
pub use statement::MemoryStatement;

/// An alias for [`Session`][sqlbind_core::session::Session], specialized for the in-memory
/// backend.
pub type MemorySession = sqlbind_core::session::Session<Memory>;
