/// The outcome of a single execution on the backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryResult {
    pub(crate) rows_affected: u64,
    pub(crate) returns_rows: bool,
}

impl QueryResult {
    pub fn new(rows_affected: u64, returns_rows: bool) -> Self {
        Self {
            rows_affected,
            returns_rows,
        }
    }

    /// Rows changed, deleted, or inserted by an `UPDATE`, `DELETE` or `INSERT`.
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Whether the statement produced a result set that can be fetched.
    pub fn returns_rows(&self) -> bool {
        self.returns_rows
    }
}

impl Extend<QueryResult> for QueryResult {
    fn extend<T: IntoIterator<Item = QueryResult>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            self.returns_rows |= elem.returns_rows;
        }
    }
}
