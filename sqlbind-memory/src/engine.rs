//! Tables and statement evaluation for the in-memory backend.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use sqlbind_core::row::Column;
use sqlbind_core::type_info::DataType;
use sqlbind_core::value::ValueKind;

use crate::error::Error;
use crate::sql::{
    ColumnDef, Command, CompareOp, Condition, Expr, OrderBy, Predicate, Projection,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug)]
pub(crate) struct Table {
    name: String,
    columns: Vec<ColumnDef>,
    rows: Vec<Vec<ValueKind>>,
}

impl Table {
    fn new(name: String, columns: Vec<ColumnDef>) -> Self {
        Self {
            name,
            columns,
            rows: Vec::new(),
        }
    }

    fn column_index(&self, name: &str) -> Result<usize, Error> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                err_memory!(
                    NoSuchColumn,
                    "table `{}` has no column named `{name}`",
                    self.name
                )
            })
    }

    // checks NOT NULL and UNIQUE for `values` about to be stored at row `skip`
    fn check_constraints(&self, values: &[ValueKind], skip: Option<usize>) -> Result<(), Error> {
        for (index, (column, value)) in self.columns.iter().zip(values).enumerate() {
            if value.is_null() {
                if column.not_null {
                    return Err(err_memory!(
                        NotNull,
                        "NOT NULL constraint failed: {}.{}",
                        self.name,
                        column.name
                    ));
                }

                continue;
            }

            if !column.unique {
                continue;
            }

            let duplicate = self
                .rows
                .iter()
                .enumerate()
                .filter(|(row, _)| Some(*row) != skip)
                .any(|(_, row)| row[index].sort_cmp(value) == Ordering::Equal);

            if duplicate {
                return Err(err_memory!(
                    Unique,
                    "UNIQUE constraint failed: {}.{}",
                    self.name,
                    column.name
                ));
            }
        }

        Ok(())
    }

    fn matches(&self, row: &[ValueKind], filter: &[Resolved<'_>]) -> bool {
        filter.iter().all(|term| term.test(&row[term.column]))
    }
}

/// A `WHERE` term resolved against a table and a row of arguments.
struct Resolved<'a> {
    column: usize,
    predicate: &'a Predicate,
    operand: Option<ValueKind>,
}

impl Resolved<'_> {
    fn test(&self, value: &ValueKind) -> bool {
        match (self.predicate, &self.operand) {
            (Predicate::IsNull, _) => value.is_null(),
            (Predicate::IsNotNull, _) => !value.is_null(),

            (Predicate::Compare(op, _), Some(operand)) => {
                if value.is_null() || operand.is_null() {
                    return false;
                }

                let ordering = value.sort_cmp(operand);

                match op {
                    CompareOp::Eq => ordering == Ordering::Equal,
                    CompareOp::NotEq => ordering != Ordering::Equal,
                    CompareOp::Lt => ordering == Ordering::Less,
                    CompareOp::LtEq => ordering != Ordering::Greater,
                    CompareOp::Gt => ordering == Ordering::Greater,
                    CompareOp::GtEq => ordering != Ordering::Less,
                }
            }

            (Predicate::Compare(..), None) => false,
        }
    }
}

/// What one evaluation of a command produced.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub(crate) rows_affected: u64,
    pub(crate) columns: Option<Vec<Column>>,
    pub(crate) rows: Vec<Vec<ValueKind>>,
}

/// Every table of one connection, keyed by lowercased name.
#[derive(Debug, Default)]
pub(crate) struct Catalog {
    tables: IndexMap<String, Table>,
}

impl Catalog {
    fn table(&self, name: &str) -> Result<&Table, Error> {
        self.tables
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| err_memory!(NoSuchTable, "no such table: {name}"))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, Error> {
        self.tables
            .get_mut(&name.to_ascii_lowercase())
            .ok_or_else(|| err_memory!(NoSuchTable, "no such table: {name}"))
    }

    /// The result columns `command` would produce, or `None` if it produces no result set.
    pub(crate) fn describe(&self, command: &Command) -> Result<Option<Vec<Column>>, Error> {
        let Command::Select {
            table, projection, ..
        } = command
        else {
            return Ok(None);
        };

        let table = self.table(table)?;

        let columns: Vec<Column> = match projection {
            Projection::All => table
                .columns
                .iter()
                .enumerate()
                .map(|(ordinal, column)| Column::new(ordinal, &column.name, column.data_type))
                .collect(),

            Projection::Count { alias } => vec![Column::new(
                0,
                alias.as_deref().unwrap_or("count"),
                DataType::BigInt,
            )],

            Projection::Items(items) => items
                .iter()
                .enumerate()
                .map(|(ordinal, item)| {
                    let column = &table.columns[table.column_index(&item.column)?];

                    let (name, data_type) = if item.length {
                        (format!("length({})", column.name), DataType::BigInt)
                    } else {
                        (column.name.clone(), column.data_type)
                    };

                    Ok(Column::new(
                        ordinal,
                        item.alias.clone().unwrap_or(name),
                        data_type,
                    ))
                })
                .collect::<Result<_, Error>>()?,
        };

        Ok(Some(columns))
    }

    /// Evaluates `command` once, with `arguments` standing in for its placeholders.
    pub(crate) fn evaluate(
        &mut self,
        command: &Command,
        arguments: &[&ValueKind],
    ) -> Result<Outcome, Error> {
        match command {
            Command::CreateTable {
                name,
                if_not_exists,
                columns,
            } => {
                let key = name.to_ascii_lowercase();

                if self.tables.contains_key(&key) {
                    if *if_not_exists {
                        return Ok(Outcome::default());
                    }

                    return Err(err_memory!(TableExists, "table {name} already exists"));
                }

                for (index, column) in columns.iter().enumerate() {
                    if columns[..index]
                        .iter()
                        .any(|other| other.name.eq_ignore_ascii_case(&column.name))
                    {
                        return Err(err_memory!(
                            Syntax,
                            "duplicate column name: {}",
                            column.name
                        ));
                    }
                }

                tracing::debug!(table = %name, columns = columns.len(), "created table");

                self.tables
                    .insert(key, Table::new(name.clone(), columns.clone()));

                Ok(Outcome::default())
            }

            Command::DropTable { name, if_exists } => {
                match self.tables.shift_remove(&name.to_ascii_lowercase()) {
                    Some(_) => tracing::debug!(table = %name, "dropped table"),
                    None if *if_exists => {}
                    None => return Err(err_memory!(NoSuchTable, "no such table: {name}")),
                }

                Ok(Outcome::default())
            }

            Command::Insert {
                table,
                columns,
                rows,
            } => {
                let table = self.table_mut(table)?;
                let width = rows.first().map_or(0, Vec::len);

                let targets = match columns {
                    Some(names) => names
                        .iter()
                        .map(|name| table.column_index(name))
                        .collect::<Result<Vec<_>, _>>()?,

                    None if rows.iter().all(|values| values.len() == table.columns.len()) => {
                        (0..width).collect()
                    }

                    None => {
                        return Err(err_memory!(
                            Syntax,
                            "table {} has {} columns but {} values were supplied",
                            table.name,
                            table.columns.len(),
                            width
                        ));
                    }
                };

                for values in rows {
                    let mut row: Vec<ValueKind> = table
                        .columns
                        .iter()
                        .map(|column| ValueKind::Null(column.data_type))
                        .collect();

                    for (&target, expr) in targets.iter().zip(values) {
                        let column = &table.columns[target];
                        row[target] = coerce(resolve(expr, arguments)?, column)?;
                    }

                    table.check_constraints(&row, None)?;
                    table.rows.push(row);
                }

                Ok(Outcome {
                    rows_affected: rows.len() as u64,
                    ..Outcome::default()
                })
            }

            Command::Select {
                table: name,
                projection,
                filter,
                order_by,
            } => {
                let columns = self.describe(command)?;
                let table = self.table(name)?;
                let filter = resolve_filter(table, filter, arguments)?;

                let mut rows: Vec<&Vec<ValueKind>> = table
                    .rows
                    .iter()
                    .filter(|row| table.matches(row, &filter))
                    .collect();

                if let Projection::Count { .. } = projection {
                    return Ok(Outcome {
                        rows_affected: 0,
                        columns,
                        rows: vec![vec![ValueKind::BigInt(saturating_i64(rows.len()))]],
                    });
                }

                sort_rows(table, &mut rows, order_by)?;

                let rows = rows
                    .into_iter()
                    .map(|row| project(table, projection, row))
                    .collect::<Result<_, _>>()?;

                Ok(Outcome {
                    rows_affected: 0,
                    columns,
                    rows,
                })
            }

            Command::Update {
                table,
                assignments,
                filter,
            } => {
                let table = self.table_mut(table)?;
                let filter = resolve_filter(table, filter, arguments)?;

                let mut changes = Vec::with_capacity(assignments.len());

                for (name, expr) in assignments {
                    let index = table.column_index(name)?;
                    let value = coerce(resolve(expr, arguments)?, &table.columns[index])?;

                    changes.push((index, value));
                }

                let mut rows_affected = 0;

                for position in 0..table.rows.len() {
                    if !table.matches(&table.rows[position], &filter) {
                        continue;
                    }

                    let mut updated = table.rows[position].clone();

                    for (index, value) in &changes {
                        updated[*index] = value.clone();
                    }

                    table.check_constraints(&updated, Some(position))?;
                    table.rows[position] = updated;
                    rows_affected += 1;
                }

                Ok(Outcome {
                    rows_affected,
                    ..Outcome::default()
                })
            }

            Command::Delete { table, filter } => {
                let table = self.table_mut(table)?;
                let filter = resolve_filter(table, filter, arguments)?;

                let rows = std::mem::take(&mut table.rows);
                let (removed, kept): (Vec<_>, Vec<_>) = rows
                    .into_iter()
                    .partition(|row| table.matches(row, &filter));

                table.rows = kept;

                Ok(Outcome {
                    rows_affected: removed.len() as u64,
                    ..Outcome::default()
                })
            }
        }
    }
}

fn resolve(expr: &Expr, arguments: &[&ValueKind]) -> Result<ValueKind, Error> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Param(slot) => arguments
            .get(*slot)
            .map(|value| (*value).clone())
            .ok_or_else(|| err_memory!(Parameter, "no value for placeholder #{}", slot + 1)),
    }
}

fn resolve_filter<'a>(
    table: &Table,
    filter: &'a [Condition],
    arguments: &[&ValueKind],
) -> Result<Vec<Resolved<'a>>, Error> {
    filter
        .iter()
        .map(|condition| {
            let column = table.column_index(&condition.column)?;

            let operand = match &condition.predicate {
                Predicate::Compare(_, expr) => {
                    let value = resolve(expr, arguments)?;

                    // compare in the column's type where the operand allows it
                    Some(coerce(value.clone(), &table.columns[column]).unwrap_or(value))
                }
                Predicate::IsNull | Predicate::IsNotNull => None,
            };

            Ok(Resolved {
                column,
                predicate: &condition.predicate,
                operand,
            })
        })
        .collect()
}

fn sort_rows(table: &Table, rows: &mut [&Vec<ValueKind>], order_by: &[OrderBy]) -> Result<(), Error> {
    if order_by.is_empty() {
        return Ok(());
    }

    let keys = order_by
        .iter()
        .map(|key| Ok((table.column_index(&key.column)?, key.descending)))
        .collect::<Result<Vec<_>, Error>>()?;

    // `sort_by` is stable, so rows with equal keys keep their insertion order
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|&(index, descending)| {
                let ordering = a[index].sort_cmp(&b[index]);

                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    Ok(())
}

fn project(table: &Table, projection: &Projection, row: &[ValueKind]) -> Result<Vec<ValueKind>, Error> {
    match projection {
        Projection::All => Ok(row.to_vec()),
        Projection::Count { .. } => Err(err_memory!(Syntax, "count cannot be projected per row")),
        Projection::Items(items) => items
            .iter()
            .map(|item| {
                let value = &row[table.column_index(&item.column)?];

                if !item.length {
                    return Ok(value.clone());
                }

                Ok(match value {
                    ValueKind::Null(_) => ValueKind::Null(DataType::BigInt),
                    ValueKind::Text(text) => ValueKind::BigInt(saturating_i64(text.chars().count())),
                    ValueKind::Blob(blob) => ValueKind::BigInt(saturating_i64(blob.len())),
                    other => {
                        return Err(err_memory!(
                            TypeMismatch,
                            "length() of a {} value",
                            other.data_type()
                        ));
                    }
                })
            })
            .collect(),
    }
}

/// Converts `value` to the declared type of `column`.
///
/// Integers are range-checked, integers widen to doubles, and text parses into dates and
/// date-times. Anything else that does not fit is a `type_mismatch` error.
pub(crate) fn coerce(value: ValueKind, column: &ColumnDef) -> Result<ValueKind, Error> {
    use ValueKind::*;

    let mismatch = |value: &ValueKind| {
        err_memory!(
            TypeMismatch,
            "cannot store {} value {value:?} in column {} of type {}",
            value.data_type(),
            column.name,
            column.data_type
        )
    };

    let coerced = match (column.data_type, &value) {
        (target, Null(_)) => Null(target),

        (DataType::Integer, Integer(_))
        | (DataType::BigInt, BigInt(_))
        | (DataType::UnsignedBigInt, UnsignedBigInt(_))
        | (DataType::Double, Double(_))
        | (DataType::Text, Text(_))
        | (DataType::Blob, Blob(_))
        | (DataType::Bool, Bool(_))
        | (DataType::Date, Date(_))
        | (DataType::DateTime, DateTime(_)) => value,

        (DataType::Integer, _) => Integer(as_integer(&value).ok_or_else(|| mismatch(&value))?),
        (DataType::BigInt, _) => BigInt(as_integer(&value).ok_or_else(|| mismatch(&value))?),
        (DataType::UnsignedBigInt, _) => {
            UnsignedBigInt(as_integer(&value).ok_or_else(|| mismatch(&value))?)
        }

        (DataType::Double, Integer(v)) => Double(f64::from(*v)),
        #[allow(clippy::cast_precision_loss)]
        (DataType::Double, BigInt(v)) => Double(*v as f64),
        #[allow(clippy::cast_precision_loss)]
        (DataType::Double, UnsignedBigInt(v)) => Double(*v as f64),
        (DataType::Double, Text(text)) => {
            Double(text.trim().parse().map_err(|_| mismatch(&value))?)
        }

        (DataType::Text, Integer(v)) => Text(v.to_string()),
        (DataType::Text, BigInt(v)) => Text(v.to_string()),
        (DataType::Text, UnsignedBigInt(v)) => Text(v.to_string()),
        (DataType::Text, Double(v)) => Text(v.to_string()),

        (DataType::Blob, Text(text)) => Blob(text.as_bytes().to_vec()),

        (DataType::Bool, _) => Bool(
            as_integer::<i64>(&value).ok_or_else(|| mismatch(&value))? != 0,
        ),

        (DataType::Date, DateTime(v)) => Date(v.date()),
        (DataType::Date, Text(text)) => Date(parse_date(text).ok_or_else(|| mismatch(&value))?),

        (DataType::DateTime, Date(v)) => DateTime(v.and_time(NaiveTime::MIN)),
        (DataType::DateTime, Text(text)) => {
            DateTime(parse_date_time(text).ok_or_else(|| mismatch(&value))?)
        }

        _ => return Err(mismatch(&value)),
    };

    Ok(coerced)
}

fn as_integer<T>(value: &ValueKind) -> Option<T>
where
    T: TryFrom<i32> + TryFrom<i64> + TryFrom<u64>,
{
    match value {
        ValueKind::Integer(v) => <T as TryFrom<i32>>::try_from(*v).ok(),
        ValueKind::BigInt(v) => <T as TryFrom<i64>>::try_from(*v).ok(),
        ValueKind::UnsignedBigInt(v) => <T as TryFrom<u64>>::try_from(*v).ok(),
        ValueKind::Bool(v) => <T as TryFrom<i32>>::try_from(i32::from(*v)).ok(),
        ValueKind::Text(text) => {
            let text = text.trim();

            text.parse::<i64>()
                .ok()
                .and_then(|v| <T as TryFrom<i64>>::try_from(v).ok())
                .or_else(|| {
                    text.parse::<u64>()
                        .ok()
                        .and_then(|v| <T as TryFrom<u64>>::try_from(v).ok())
                })
        }
        _ => None,
    }
}

fn saturating_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .ok()
        .or_else(|| parse_date_time(text).map(|v| v.date()))
}

fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
