//! The SQL dialect understood by the in-memory backend.

use sqlbind_core::type_info::DataType;
use sqlbind_core::value::ValueKind;

mod lexer;
mod parser;

pub(crate) use parser::parse;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    CreateTable {
        name: String,
        if_not_exists: bool,
        columns: Vec<ColumnDef>,
    },
    DropTable {
        name: String,
        if_exists: bool,
    },
    Insert {
        table: String,
        columns: Option<Vec<String>>,
        /// One or more `VALUES` tuples.
        rows: Vec<Vec<Expr>>,
    },
    Select {
        table: String,
        projection: Projection,
        filter: Vec<Condition>,
        order_by: Vec<OrderBy>,
    },
    Update {
        table: String,
        assignments: Vec<(String, Expr)>,
        filter: Vec<Condition>,
    },
    Delete {
        table: String,
        filter: Vec<Condition>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnDef {
    pub(crate) name: String,
    pub(crate) data_type: DataType,
    pub(crate) not_null: bool,
    pub(crate) unique: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(ValueKind),
    /// Zero-based placeholder slot.
    Param(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Projection {
    All,
    Count { alias: Option<String> },
    Items(Vec<SelectItem>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectItem {
    pub(crate) column: String,
    pub(crate) length: bool,
    pub(crate) alias: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    Compare(CompareOp, Expr),
    IsNull,
    IsNotNull,
}

/// One term of a `WHERE` clause; terms are joined by `AND`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Condition {
    pub(crate) column: String,
    pub(crate) predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderBy {
    pub(crate) column: String,
    pub(crate) descending: bool,
}

/// A parsed statement and the number of placeholders it holds.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Parsed {
    pub(crate) command: Command,
    pub(crate) parameters: usize,
}
