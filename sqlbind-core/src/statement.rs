use std::sync::Arc;

use crate::arguments::Arguments;
use crate::bind::{IntoBulk, IntoElement, IntoOne, UseBulk, UseElement, UseOne};
use crate::conversion::{BaseType, EncodedBase, TypeConversion};
use crate::database::{Connection, Database, StatementHandle};
use crate::error::{Error, Result};
use crate::indicator::Indicator;
use crate::logger::QueryLogger;
use crate::placeholders::Placeholder;
use crate::row::{Column, Row};
use crate::session::Session;
use crate::value::ValueKind;

/// A prepared statement together with its use and into bindings.
///
/// Created by [`Session::prepare`]. Bindings borrow the host values for as long as the
/// statement lives, so the values cannot change or be read behind its back while a fetch
/// cycle is in progress.
///
/// ```rust,ignore
/// let ids = vec![1, 2, 3];
/// session
///     .prepare("insert into soci_test (id) values (?)")?
///     .bind_bulk(&ids)
///     .execute(true)?;
///
/// let mut out = vec![0_i32; 2];
/// let mut stmt = session
///     .prepare("select id from soci_test order by id")?
///     .bind_into_bulk(&mut out);
///
/// stmt.execute(true)?;
/// while stmt.fetch()? {}
/// ```
#[must_use = "a statement does nothing until executed"]
pub struct Statement<'c, 'b, DB: Database> {
    session: &'c mut Session<DB>,
    handle: DB::Statement,
    sql: Arc<str>,
    uses: Vec<Box<dyn UseElement + 'b>>,
    intos: Vec<Box<dyn IntoElement + 'b>>,
    rows_affected: u64,
    got_data: bool,
    executed: bool,
    results: ResultSet,
}

/// Progress through the rows produced by the last execution.
#[derive(Default)]
struct ResultSet {
    exhausted: bool,
    rows_returned: u64,
    logger: Option<QueryLogger>,
}

impl ResultSet {
    fn returned(&mut self) {
        self.rows_returned += 1;

        if let Some(logger) = &mut self.logger {
            logger.increment_rows_returned();
        }
    }

    fn exhaust(&mut self) {
        self.exhausted = true;
        // logs the execution
        self.logger = None;
    }
}

impl<'c, 'b, DB: Database> Statement<'c, 'b, DB> {
    pub(crate) fn new(session: &'c mut Session<DB>, handle: DB::Statement) -> Self {
        let sql = Arc::from(handle.sql());

        Self {
            session,
            handle,
            sql,
            uses: Vec::new(),
            intos: Vec::new(),
            rows_affected: 0,
            got_data: false,
            executed: false,
            results: ResultSet::default(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind a value to the next positional placeholder.
    ///
    /// A value whose conversion produces a [`Values`](crate::values::Values) record fills
    /// placeholders by field name instead.
    pub fn bind<T>(self, value: &'b T) -> Self
    where
        T: TypeConversion + 'b,
    {
        self.push_use(UseOne {
            value,
            indicator: None,
            name: None,
        })
    }

    /// Bind a value to every `:name` placeholder.
    pub fn bind_named<T>(self, name: &str, value: &'b T) -> Self
    where
        T: TypeConversion + 'b,
    {
        self.push_use(UseOne {
            value,
            indicator: None,
            name: Some(name.to_owned()),
        })
    }

    /// Bind a value to the next positional placeholder; [`Indicator::Null`] binds SQL `NULL`.
    pub fn bind_with_indicator<T>(self, value: &'b T, indicator: Indicator) -> Self
    where
        T: TypeConversion + 'b,
    {
        self.push_use(UseOne {
            value,
            indicator: Some(indicator),
            name: None,
        })
    }

    /// Bind one value per row to the next positional placeholder.
    ///
    /// The statement is executed once for every element; all bulk bindings of a statement
    /// must have the same length.
    pub fn bind_bulk<T>(self, values: &'b [T]) -> Self
    where
        T: TypeConversion + 'b,
    {
        self.push_use(UseBulk {
            values,
            indicators: None,
            name: None,
        })
    }

    pub fn bind_bulk_named<T>(self, name: &str, values: &'b [T]) -> Self
    where
        T: TypeConversion + 'b,
    {
        self.push_use(UseBulk {
            values,
            indicators: None,
            name: Some(name.to_owned()),
        })
    }

    pub fn bind_bulk_with_indicators<T>(self, values: &'b [T], indicators: &'b [Indicator]) -> Self
    where
        T: TypeConversion + 'b,
    {
        self.push_use(UseBulk {
            values,
            indicators: Some(indicators),
            name: None,
        })
    }

    /// Bind a destination for the next column(s) of a fetched row.
    ///
    /// A scalar takes one column; a [`Values`](crate::values::Values) based type takes every
    /// remaining column.
    pub fn bind_into<T>(self, target: &'b mut T) -> Self
    where
        T: TypeConversion + 'b,
    {
        self.push_into(IntoOne {
            target,
            indicator: None,
        })
    }

    /// Like [`bind_into`](Self::bind_into), but reports the state of the fetched value through
    /// `indicator`. On `NULL`, `target` is left untouched.
    pub fn bind_into_with_indicator<T>(self, target: &'b mut T, indicator: &'b mut Indicator) -> Self
    where
        T: TypeConversion + 'b,
    {
        self.push_into(IntoOne {
            target,
            indicator: Some(indicator),
        })
    }

    /// Bind a vector that receives a batch of rows per fetch.
    ///
    /// A vector of length `K > 0` receives at most `K` rows per fetch and is truncated to the
    /// number of rows actually fetched. An empty vector receives the whole result set.
    pub fn bind_into_bulk<T>(self, target: &'b mut Vec<T>) -> Self
    where
        T: TypeConversion + 'b,
    {
        self.push_into(IntoBulk::new(target))
    }

    /// Like [`bind_into_bulk`](Self::bind_into_bulk), reporting per-row indicators. A `NULL`
    /// leaves the element in place, or appends `T::default()` when the vector has to grow.
    pub fn bind_into_bulk_with_indicators<T>(
        self,
        target: &'b mut Vec<T>,
        indicators: &'b mut Vec<Indicator>,
    ) -> Self
    where
        T: TypeConversion + Default + 'b,
    {
        self.push_into(IntoBulk::with_indicators(target, indicators))
    }

    fn push_use(mut self, element: impl UseElement + 'b) -> Self {
        self.uses.push(Box::new(element));
        self
    }

    fn push_into(mut self, element: impl IntoElement + 'b) -> Self {
        self.intos.push(Box::new(element));
        self
    }

    /// Executes the statement for every row of its use bindings.
    ///
    /// With `exchange_data`, the first batch of results is fetched into the into bindings
    /// right away. Returns `true` if the into bindings received data.
    ///
    /// If the backend cannot execute a batch in one go, the rows are executed one at a time
    /// in order; the first failure aborts the batch and rows executed before it stay applied.
    /// A statement that returns rows accepts bulk use bindings of at most one row.
    pub fn execute(&mut self, exchange_data: bool) -> Result<bool> {
        self.executed = true;
        self.results = ResultSet::default();
        self.got_data = false;
        self.rows_affected = 0;

        for element in &self.uses {
            element.check()?;
        }

        let (rows, bulk_use) = self.batch_rows()?;
        self.check_intos(bulk_use)?;

        if bulk_use && rows > 1 && !self.handle.columns().is_empty() {
            return Err(Error::bind(
                "a statement that returns rows cannot take bulk use bindings of more than one row",
            ));
        }

        if rows == 0 {
            self.results.exhaust();
            return Ok(false);
        }

        let arguments = self.arguments(rows)?;

        self.session.last_query = Some(self.sql.to_string());

        let mut logger = QueryLogger::new(
            Arc::clone(&self.sql),
            rows,
            self.session.log_settings.clone(),
        );

        let conn = &mut self.session.conn;
        let mut returns_rows = false;

        if rows > 1 && !conn.supports_bulk() {
            tracing::trace!(rows, "backend has no bulk execution; executing row by row");

            for row in 0..rows {
                let done = conn.execute(&mut self.handle, &arguments.single_row(row))?;

                logger.increase_rows_affected(done.rows_affected());
                self.rows_affected += done.rows_affected();
                returns_rows |= done.returns_rows();
            }
        } else {
            let done = conn.execute(&mut self.handle, &arguments)?;

            logger.increase_rows_affected(done.rows_affected());
            self.rows_affected = done.rows_affected();
            returns_rows = done.returns_rows();
        }

        // statements without rows are logged right away
        if returns_rows {
            self.results.logger = Some(logger);
        }

        if exchange_data && !self.intos.is_empty() {
            self.fetch_batch()?;
        }

        Ok(self.got_data)
    }

    /// Fetches the next batch of rows into the into bindings.
    ///
    /// Executes the statement first if that has not happened yet. Returns `false` once the
    /// result set is exhausted, at which point bulk targets are truncated to zero length.
    pub fn fetch(&mut self) -> Result<bool> {
        if !self.executed {
            self.execute(false)?;
        }

        if self.intos.is_empty() {
            let row = self.next_row()?;
            self.got_data = row.is_some();

            return Ok(self.got_data);
        }

        self.fetch_batch()?;

        Ok(self.got_data)
    }

    /// Fetches up to `buf.len()` rows into `buf` (the whole remaining result set if `buf` is
    /// empty), truncating it to the number of rows fetched.
    ///
    /// Unlike an into binding, `buf` is only borrowed for the duration of the call, so it can
    /// be inspected between batches.
    pub fn fetch_into<T>(&mut self, buf: &mut Vec<T>) -> Result<bool>
    where
        T: TypeConversion,
    {
        if !self.executed {
            self.execute(false)?;
        }

        let mut into = IntoBulk::new(buf);
        let limit = batch_limit(into.capacity);

        let count = fill_batch::<DB>(
            &mut self.session.conn,
            &mut self.handle,
            &mut self.results,
            limit,
            |index, row| into.write(index, &row, &mut 0),
        )?;

        into.finish(count);
        self.got_data = count > 0;

        Ok(self.got_data)
    }

    /// Executes the statement and decodes every remaining row through `T`'s conversion.
    pub fn fetch_all<T>(&mut self) -> Result<Vec<T>>
    where
        T: TypeConversion,
    {
        self.prepare_fetch()?;

        let mut rows = Vec::new();

        while let Some(row) = self.next_row()? {
            rows.push(decode_row::<T>(&row)?);
        }

        self.got_data = !rows.is_empty();

        Ok(rows)
    }

    /// Executes the statement and decodes exactly one row, failing with
    /// [`Error::RowNotFound`] if there is none.
    pub fn fetch_one<T>(&mut self) -> Result<T>
    where
        T: TypeConversion,
    {
        self.fetch_optional()?.ok_or(Error::RowNotFound)
    }

    /// Executes the statement and decodes at most one row.
    pub fn fetch_optional<T>(&mut self) -> Result<Option<T>>
    where
        T: TypeConversion,
    {
        self.prepare_fetch()?;

        let row = self.next_row()?;
        self.got_data = row.is_some();

        row.as_ref().map(decode_row::<T>).transpose()
    }

    /// Number of rows changed by the last execution, summed over the whole batch.
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Number of rows fetched so far from the result set of the last execution.
    pub fn rows_returned(&self) -> u64 {
        self.results.rows_returned
    }

    /// Whether the last execute or fetch delivered any rows.
    pub fn got_data(&self) -> bool {
        self.got_data
    }

    pub fn columns(&self) -> &[Column] {
        self.handle.columns()
    }

    pub fn parameters(&self) -> &[Placeholder] {
        self.handle.parameters()
    }

    fn prepare_fetch(&mut self) -> Result<()> {
        if !self.intos.is_empty() {
            return Err(Error::bind(
                "row mapping cannot be used on a statement with into bindings",
            ));
        }

        self.execute(false)?;

        Ok(())
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        let mut next = None;

        fill_batch::<DB>(
            &mut self.session.conn,
            &mut self.handle,
            &mut self.results,
            1,
            |_, row| {
                next = Some(row);
                Ok(())
            },
        )?;

        Ok(next)
    }

    fn fetch_batch(&mut self) -> Result<usize> {
        let capacity = match self.intos.first() {
            Some(into) => into.capacity(),
            None => return Ok(0),
        };

        let limit = capacity.map_or(1, batch_limit);
        let intos = &mut self.intos;
        let mut written = 0;

        let fetched = fill_batch::<DB>(
            &mut self.session.conn,
            &mut self.handle,
            &mut self.results,
            limit,
            |index, row| {
                let mut position = 0;

                for into in intos.iter_mut() {
                    into.write(index, &row, &mut position)?;
                }

                written = index + 1;

                Ok(())
            },
        );

        // a failed row leaves every vector with the rows written before it
        let count = match fetched {
            Ok(count) => count,
            Err(err) => {
                if capacity.is_some() {
                    for into in &mut self.intos {
                        into.finish(written);
                    }
                }

                return Err(err);
            }
        };

        if capacity.is_some() {
            for into in &mut self.intos {
                into.finish(count);
            }
        }

        self.got_data = count > 0;

        Ok(count)
    }

    /// The number of rows to execute, and whether any use binding is a bulk one.
    fn batch_rows(&self) -> Result<(usize, bool)> {
        let mut rows = None;

        for len in self.uses.iter().filter_map(|element| element.rows()) {
            match rows {
                None => rows = Some(len),
                Some(expected) if expected != len => {
                    return Err(Error::BulkSizeMismatch {
                        expected,
                        actual: len,
                    });
                }
                Some(_) => {}
            }
        }

        Ok((rows.unwrap_or(1), rows.is_some()))
    }

    fn check_intos(&self, bulk_use: bool) -> Result<()> {
        if self.intos.is_empty() {
            return Ok(());
        }

        if bulk_use {
            return Err(Error::bind(
                "bulk use bindings cannot be combined with into bindings",
            ));
        }

        let mut capacities = self.intos.iter().map(|into| into.capacity());
        let first = capacities.next().flatten();

        for capacity in capacities {
            match (first, capacity) {
                (Some(expected), Some(actual)) if expected != actual => {
                    return Err(Error::BulkSizeMismatch { expected, actual });
                }
                (Some(_), None) | (None, Some(_)) => {
                    return Err(Error::bind(
                        "scalar and vector into bindings cannot be mixed",
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Resolves every use binding onto the placeholder slots of the statement.
    fn arguments(&self, rows: usize) -> Result<Arguments> {
        let parameters = self.handle.parameters();
        let named_style = parameters.iter().any(Placeholder::is_named);

        let mut slots: Vec<Vec<ValueKind>> = vec![Vec::with_capacity(rows); parameters.len()];

        for row in 0..rows {
            let mut filled: Vec<Option<ValueKind>> = vec![None; parameters.len()];
            let mut positional = Vec::new();

            for element in &self.uses {
                match (element.name(), element.encode(row)?) {
                    (Some(name), EncodedBase::Scalar(value)) => {
                        let mut matched = false;

                        for (slot, parameter) in filled.iter_mut().zip(parameters) {
                            if parameter.matches(name) {
                                *slot = Some(value.clone());
                                matched = true;
                            }
                        }

                        if !matched {
                            return Err(Error::Bind(format!(
                                "no placeholder named `:{name}` in statement"
                            )));
                        }
                    }

                    (None, EncodedBase::Scalar(value)) => positional.push(value),

                    (_, EncodedBase::Record(fields)) if named_style => {
                        for (name, value) in fields {
                            for (slot, parameter) in filled.iter_mut().zip(parameters) {
                                if parameter.matches(&name) {
                                    *slot = Some(value.clone());
                                }
                            }
                        }
                    }

                    (_, EncodedBase::Record(fields)) => {
                        positional.extend(fields.into_iter().map(|(_, value)| value));
                    }
                }
            }

            let mut positional = positional.into_iter();

            for slot in filled.iter_mut().filter(|slot| slot.is_none()) {
                match positional.next() {
                    Some(value) => *slot = Some(value),
                    None => break,
                }
            }

            if positional.next().is_some() {
                return Err(Error::Bind(format!(
                    "statement has {} placeholders but more values were bound",
                    parameters.len()
                )));
            }

            for ((slot, value), parameter) in slots.iter_mut().zip(filled).zip(parameters) {
                let value = value.ok_or_else(|| match &parameter.name {
                    Some(name) => Error::Bind(format!("no value bound for placeholder `:{name}`")),
                    None => Error::Bind(format!(
                        "no value bound for placeholder #{}",
                        parameter.position + 1
                    )),
                })?;

                slot.push(value);
            }
        }

        Ok(Arguments::new(slots, rows))
    }
}

fn batch_limit(capacity: usize) -> usize {
    if capacity == 0 {
        usize::MAX
    } else {
        capacity
    }
}

fn fill_batch<DB: Database>(
    conn: &mut DB::Connection,
    handle: &mut DB::Statement,
    results: &mut ResultSet,
    limit: usize,
    mut write: impl FnMut(usize, Row) -> Result<()>,
) -> Result<usize> {
    let mut count = 0;

    while count < limit && !results.exhausted {
        match conn.fetch(handle)? {
            Some(row) => {
                results.returned();
                write(count, row)?;
                count += 1;
            }

            None => results.exhaust(),
        }
    }

    Ok(count)
}

fn decode_row<T>(row: &Row) -> Result<T>
where
    T: TypeConversion,
{
    let base = T::Base::decode_base(row, &mut 0)?;

    T::from_base(base).map_err(|source| Error::decode_for(row.column_label(0), source))
}
