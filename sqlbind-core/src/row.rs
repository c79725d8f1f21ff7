use std::fmt::Debug;
use std::sync::Arc;

use crate::conversion::{decode_indicated, TypeConversion};
use crate::decode::Decode;
use crate::error::{Error, Result};
use crate::indicator::Indicator;
use crate::type_info::DataType;
use crate::value::{ValueKind, ValueRef};

/// Describes one column of a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub(crate) ordinal: usize,
    pub(crate) name: String,
    pub(crate) data_type: DataType,
}

impl Column {
    pub fn new(ordinal: usize, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            ordinal,
            name: name.into(),
            data_type,
        }
    }

    /// Gets the column ordinal.
    ///
    /// This can be used to unambiguously refer to this column within a row in case more than
    /// one column have the same name
    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type of the column; individual values may still be `NULL`.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// A type that can be used to index into a [`Row`].
///
/// The [`get`](Row::try_get) and [`try_get_raw`](Row::try_get_raw) methods of [`Row`] accept
/// any type that implements `ColumnIndex`. This trait is implemented for strings which are
/// used to look up a column by name, and for `usize` which is used as a positional index into
/// the row.
pub trait ColumnIndex: Debug {
    /// Returns a valid positional index into the row, [`ColumnIndexOutOfBounds`], or,
    /// [`ColumnNotFound`].
    ///
    /// [`ColumnNotFound`]: Error::ColumnNotFound
    /// [`ColumnIndexOutOfBounds`]: Error::ColumnIndexOutOfBounds
    fn index(&self, row: &Row) -> Result<usize>;
}

impl ColumnIndex for usize {
    fn index(&self, row: &Row) -> Result<usize> {
        let len = row.len();

        if *self >= len {
            return Err(Error::ColumnIndexOutOfBounds { len, index: *self });
        }

        Ok(*self)
    }
}

impl ColumnIndex for &'_ str {
    fn index(&self, row: &Row) -> Result<usize> {
        let columns = row.columns();

        columns
            .iter()
            .position(|column| column.name == *self)
            .or_else(|| {
                columns
                    .iter()
                    .position(|column| column.name.eq_ignore_ascii_case(self))
            })
            .ok_or_else(|| Error::ColumnNotFound((*self).into()))
    }
}

/// A single row of a result set, as produced by a backend.
#[derive(Debug, Clone)]
pub struct Row {
    pub(crate) columns: Arc<[Column]>,
    pub(crate) values: Vec<ValueKind>,
    pub(crate) indicators: Vec<Indicator>,
}

impl Row {
    /// Creates a row; every value starts out [`Indicator::Ok`], or [`Indicator::Null`] when
    /// it is a `NULL`.
    pub fn new(columns: Arc<[Column]>, values: Vec<ValueKind>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(err_protocol!(
                "row has {} values for {} columns",
                values.len(),
                columns.len()
            ));
        }

        let indicators = values
            .iter()
            .map(|value| {
                if value.is_null() {
                    Indicator::Null
                } else {
                    Indicator::Ok
                }
            })
            .collect();

        Ok(Self {
            columns,
            values,
            indicators,
        })
    }

    /// Flags the value at `index` as cut short by the backend.
    pub fn mark_truncated(&mut self, index: usize) {
        if let Some(indicator) = self.indicators.get_mut(index) {
            if !indicator.is_null() {
                *indicator = Indicator::Truncated;
            }
        }
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn try_get_raw<I>(&self, index: I) -> Result<ValueRef<'_>>
    where
        I: ColumnIndex,
    {
        let index = index.index(self)?;

        Ok(ValueRef::new(&self.values[index], self.indicators[index]))
    }

    pub fn indicator<I>(&self, index: I) -> Result<Indicator>
    where
        I: ColumnIndex,
    {
        Ok(self.try_get_raw(index)?.indicator())
    }

    /// Index into the database row and decode a single value through `T`'s conversion.
    ///
    /// ```rust,ignore
    /// let id: i64 = row.try_get(0)?;
    /// let phone: Option<String> = row.try_get("phone")?;
    /// ```
    ///
    /// # Errors
    ///
    ///  * [`ColumnNotFound`] if the column by the given name was not found.
    ///  * [`ColumnIndexOutOfBounds`] if the `usize` index was greater than the number of columns in the row.
    ///  * [`ColumnDecode`] if the value could not be decoded into the requested type.
    ///  * [`UnexpectedNull`] if the value is `NULL` and `T` cannot represent it.
    ///
    /// [`ColumnDecode`]: Error::ColumnDecode
    /// [`ColumnNotFound`]: Error::ColumnNotFound
    /// [`ColumnIndexOutOfBounds`]: Error::ColumnIndexOutOfBounds
    /// [`UnexpectedNull`]: Error::UnexpectedNull
    pub fn try_get<T, I>(&self, index: I) -> Result<T>
    where
        T: TypeConversion,
        T::Base: Decode,
        I: ColumnIndex,
    {
        let index = index.index(self)?;
        let value = ValueRef::new(&self.values[index], self.indicators[index]);

        decode_indicated::<T::Base>(value)
            .and_then(T::from_base)
            .map_err(|source| Error::decode_for(self.column_label(index), source))
    }

    // used in error messages
    pub(crate) fn column_label(&self, index: usize) -> String {
        match self.columns.get(index) {
            Some(column) if !column.name.is_empty() => column.name.clone(),
            _ => index.to_string(),
        }
    }
}
