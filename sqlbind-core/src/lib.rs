//! Core of sqlbind, the typed data binding layer. Not intended to be used directly.
//!
//! This crate holds everything that does not depend on a particular backend: the indicator
//! model, the [`TypeConversion`](conversion::TypeConversion) extension point, the
//! [`Values`](values::Values) record, and the binding engine behind
//! [`Statement`](statement::Statement). Backends implement the traits in [`database`].
#![recursion_limit = "512"]
#![warn(future_incompatible, rust_2018_idioms)]
#![allow(clippy::needless_doctest_main, clippy::type_complexity)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
pub mod error;

pub mod arguments;
mod bind;
pub mod conversion;
pub mod database;
pub mod decode;
pub mod encode;
pub mod indicator;
pub mod logger;
pub mod options;
pub mod placeholders;
pub mod query_result;
pub mod row;
pub mod session;
pub mod statement;
pub mod type_info;
pub mod types;
pub mod value;
pub mod values;

pub use error::{Error, Result};

// Re-exported for use by backends without pulling the crates in directly.
#[doc(hidden)]
pub use log;
#[doc(hidden)]
pub use tracing;
#[doc(hidden)]
pub use url;
