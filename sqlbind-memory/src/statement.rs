use std::collections::VecDeque;
use std::sync::Arc;

use sqlbind_core::database::StatementHandle;
use sqlbind_core::placeholders::{parse_placeholders, Placeholder};
use sqlbind_core::row::Column;
use sqlbind_core::value::ValueKind;

use crate::engine::Catalog;
use crate::error::Error;
use crate::sql::{self, Command};

/// A statement prepared against an in-memory database.
#[derive(Debug)]
pub struct MemoryStatement {
    sql: String,
    pub(crate) command: Command,
    parameters: Vec<Placeholder>,
    pub(crate) columns: Arc<[Column]>,
    // rows of the current result set not yet fetched
    pub(crate) pending: VecDeque<Vec<ValueKind>>,
}

impl MemoryStatement {
    pub(crate) fn prepare(catalog: &Catalog, sql: &str) -> Result<Self, Error> {
        let parsed = sql::parse(sql)?;
        let parameters = parse_placeholders(sql);

        if parameters.len() != parsed.parameters {
            return Err(err_protocol!(
                "found {} placeholders but the statement uses {}",
                parameters.len(),
                parsed.parameters
            ));
        }

        let columns = catalog.describe(&parsed.command)?.unwrap_or_default();

        Ok(Self {
            sql: sql.to_owned(),
            command: parsed.command,
            parameters,
            columns: columns.into(),
            pending: VecDeque::new(),
        })
    }

    pub(crate) fn returns_rows(&self) -> bool {
        matches!(self.command, Command::Select { .. })
    }
}

impl StatementHandle for MemoryStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn parameters(&self) -> &[Placeholder] {
        &self.parameters
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }
}
