use sqlbind_core::database::Database;

use crate::{MemoryConnectOptions, MemoryConnection, MemoryStatement};

/// The in-process database driver.
#[derive(Debug)]
pub struct Memory;

impl Database for Memory {
    type Connection = MemoryConnection;

    type Statement = MemoryStatement;

    type Options = MemoryConnectOptions;

    const NAME: &'static str = "Memory";

    const URL_SCHEMES: &'static [&'static str] = &["memory"];
}
