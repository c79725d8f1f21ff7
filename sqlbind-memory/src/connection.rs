use std::sync::Arc;

use sqlbind_core::arguments::Arguments;
use sqlbind_core::database::{Connection, StatementHandle};
use sqlbind_core::query_result::QueryResult;
use sqlbind_core::row::Row;
use sqlbind_core::value::ValueKind;

use crate::engine::Catalog;
use crate::error::Error;
use crate::options::MemoryConnectOptions;
use crate::statement::MemoryStatement;
use crate::Memory;

/// A connection to a private, in-process database.
#[derive(Debug)]
pub struct MemoryConnection {
    catalog: Catalog,
    bulk: bool,
    fetch_buffer: Option<usize>,
}

impl MemoryConnection {
    pub(crate) fn establish(options: &MemoryConnectOptions) -> Self {
        tracing::debug!(
            bulk = options.bulk,
            fetch_buffer = ?options.fetch_buffer,
            "opened in-memory database"
        );

        Self {
            catalog: Catalog::default(),
            bulk: options.bulk,
            fetch_buffer: options.fetch_buffer,
        }
    }

    // cuts text and blobs down to the fetch buffer, returning the columns that were cut
    fn apply_fetch_buffer(&self, values: &mut [ValueKind]) -> Vec<usize> {
        let Some(limit) = self.fetch_buffer else {
            return Vec::new();
        };

        let mut truncated = Vec::new();

        for (index, value) in values.iter_mut().enumerate() {
            match value {
                ValueKind::Text(text) if text.len() > limit => {
                    let mut end = limit;
                    while !text.is_char_boundary(end) {
                        end -= 1;
                    }

                    text.truncate(end);
                    truncated.push(index);
                }

                ValueKind::Blob(blob) if blob.len() > limit => {
                    blob.truncate(limit);
                    truncated.push(index);
                }

                _ => {}
            }
        }

        truncated
    }
}

impl Connection for MemoryConnection {
    type Database = Memory;

    fn prepare(&mut self, sql: &str) -> Result<MemoryStatement, Error> {
        MemoryStatement::prepare(&self.catalog, sql)
    }

    fn execute(
        &mut self,
        statement: &mut MemoryStatement,
        arguments: &Arguments,
    ) -> Result<QueryResult, Error> {
        statement.pending.clear();

        if arguments.len() != statement.parameters().len() {
            return Err(err_memory!(
                Parameter,
                "statement has {} placeholders but {} were bound",
                statement.parameters().len(),
                arguments.len()
            ));
        }

        let mut rows_affected = 0;

        for row in 0..arguments.rows() {
            let values = arguments.row(row).collect::<Vec<_>>();
            let outcome = self.catalog.evaluate(&statement.command, &values)?;

            rows_affected += outcome.rows_affected;

            if let Some(columns) = outcome.columns {
                statement.columns = columns.into();
            }

            statement.pending.extend(outcome.rows);
        }

        if arguments.rows() > 1 {
            tracing::trace!(rows = arguments.rows(), rows_affected, "executed batch");
        }

        Ok(QueryResult::new(rows_affected, statement.returns_rows()))
    }

    fn fetch(&mut self, statement: &mut MemoryStatement) -> Result<Option<Row>, Error> {
        let Some(mut values) = statement.pending.pop_front() else {
            return Ok(None);
        };

        let truncated = self.apply_fetch_buffer(&mut values);
        let mut row = Row::new(Arc::clone(&statement.columns), values)?;

        for index in truncated {
            row.mark_truncated(index);
        }

        Ok(Some(row))
    }

    fn supports_bulk(&self) -> bool {
        self.bulk
    }

    fn ping(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn close(self) -> Result<(), Error> {
        tracing::debug!("closed in-memory database");

        Ok(())
    }
}
