//! Types for working with errors produced by sqlbind.

use std::any::type_name;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::Display;

use crate::type_info::DataType;
use crate::types::Type;

/// A specialized `Result` type for sqlbind.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// The error type produced by value encoders and decoders.
pub type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// An unexpected `NULL` was encountered during decoding.
///
/// Returned from a conversion if the value from the database is `NULL`,
/// and the target type has no way to represent it.
#[derive(thiserror::Error, Debug)]
#[error("unexpected null; try decoding as an `Option` or `Indicated`")]
pub struct UnexpectedNullError;

/// Represents all the ways a method can fail within sqlbind.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error occurred while parsing a connection string or applying an option.
    #[error("error with configuration: {0}")]
    Configuration(#[source] BoxDynError),

    /// Error returned from the database.
    #[error("error returned from database: {0}")]
    Database(Box<dyn DatabaseError>),

    /// Unexpected or invalid data encountered while talking to the backend.
    ///
    /// This should indicate there is a programming error in a driver.
    #[error("encountered unexpected or invalid data: {0}")]
    Protocol(String),

    /// The bindings of a statement do not match its placeholders.
    #[error("error binding statement parameters: {0}")]
    Bind(String),

    /// Bulk bindings of a single execution had different lengths.
    #[error("bulk binding size mismatch: expected {expected} rows, got {actual}")]
    BulkSizeMismatch { expected: usize, actual: usize },

    /// No rows returned by a query that expected to return at least one row.
    #[error("no rows returned by a query that expected to return at least one row")]
    RowNotFound,

    /// Column index was out of bounds.
    #[error("column index out of bounds: the len is {len}, but the index is {index}")]
    ColumnIndexOutOfBounds { index: usize, len: usize },

    /// No column or field found for the given name.
    #[error("no column found for name: {0}")]
    ColumnNotFound(String),

    /// A `NULL` was read into a destination that cannot hold it.
    #[error("null value fetched for {0} and no indicator or nullable type was provided")]
    UnexpectedNull(String),

    /// Error occurred while encoding a value.
    #[error("error occurred while encoding a value: {0}")]
    Encode(#[source] BoxDynError),

    /// Error occurred while decoding a value from a specific column.
    #[error("error occurred while decoding column {index}: {source}")]
    ColumnDecode {
        index: String,

        #[source]
        source: BoxDynError,
    },

    /// Error occurred while decoding a value.
    #[error("error occurred while decoding: {0}")]
    Decode(#[source] BoxDynError),
}

impl Error {
    pub fn into_database_error(self) -> Option<Box<dyn DatabaseError + 'static>> {
        match self {
            Error::Database(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_database_error(&self) -> Option<&(dyn DatabaseError + 'static)> {
        match self {
            Error::Database(err) => Some(&**err),
            _ => None,
        }
    }

    #[doc(hidden)]
    #[inline]
    pub fn protocol(err: impl Display) -> Self {
        Error::Protocol(err.to_string())
    }

    #[doc(hidden)]
    #[inline]
    pub fn config(err: impl StdError + Send + Sync + 'static) -> Self {
        Error::Configuration(err.into())
    }

    #[doc(hidden)]
    #[inline]
    pub fn bind(err: impl Display) -> Self {
        Error::Bind(err.to_string())
    }

    /// Rewrites a bare [`UnexpectedNullError`] coming out of a conversion so that it names
    /// the column or field that was being read.
    pub(crate) fn decode_for(index: impl Display, source: BoxDynError) -> Self {
        if source.is::<UnexpectedNullError>() {
            return Error::UnexpectedNull(index.to_string());
        }

        match source.downcast::<Error>() {
            Ok(err) => *err,
            Err(source) => Error::ColumnDecode {
                index: index.to_string(),
                source,
            },
        }
    }
}

pub(crate) fn mismatched_types<T: Type>(actual: DataType) -> BoxDynError {
    format!(
        "mismatched types; Rust type `{}` (as SQL type `{}`) is not compatible with SQL type `{}`",
        type_name::<T>(),
        T::type_info(),
        actual,
    )
    .into()
}

/// The general category of an error returned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Unique/primary key constraint violation.
    UniqueViolation,
    /// Foreign key constraint violation.
    ForeignKeyViolation,
    /// Not-null constraint violation.
    NotNullViolation,
    /// Check constraint violation.
    CheckViolation,
    /// An unmapped error.
    Other,
}

/// An error that was returned from the database.
pub trait DatabaseError: 'static + Send + Sync + StdError {
    /// The primary, human-readable error message.
    fn message(&self) -> &str;

    /// The backend specific code for the error.
    fn code(&self) -> Option<Cow<'_, str>> {
        None
    }

    #[doc(hidden)]
    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static);

    #[doc(hidden)]
    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static);

    #[doc(hidden)]
    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static>;

    /// Returns the kind of the error.
    fn kind(&self) -> ErrorKind;

    /// Returns whether the error kind is a violation of a unique/primary key constraint.
    fn is_unique_violation(&self) -> bool {
        matches!(self.kind(), ErrorKind::UniqueViolation)
    }

    /// Returns whether the error kind is a violation of a not-null constraint.
    fn is_not_null_violation(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotNullViolation)
    }
}

impl dyn DatabaseError {
    /// Downcast a reference to this generic database error to a specific
    /// database error type.
    ///
    /// # Panics
    ///
    /// Panics if the database error type is not `E`. In other cases, use `try_downcast_ref`.
    pub fn downcast_ref<E: DatabaseError>(&self) -> &E {
        self.try_downcast_ref().unwrap_or_else(|| {
            panic!("downcast to wrong DatabaseError type; original error: {self}")
        })
    }

    /// Downcast a reference to this generic database error to a specific
    /// database error type.
    #[inline]
    pub fn try_downcast_ref<E: DatabaseError>(&self) -> Option<&E> {
        self.as_error().downcast_ref()
    }

    /// Downcast this generic database error to a specific database error type.
    pub fn try_downcast<E: DatabaseError>(self: Box<Self>) -> Result<Box<E>, Box<Self>> {
        if self.as_error().is::<E>() {
            self.into_error()
                .downcast()
                .map_err(|_| unreachable!("type was checked with `is`"))
        } else {
            Err(self)
        }
    }
}

impl<E> From<E> for Error
where
    E: DatabaseError,
{
    #[inline]
    fn from(error: E) -> Self {
        Error::Database(Box::new(error))
    }
}

// Format an error message as a `Protocol` error
#[macro_export]
macro_rules! err_protocol {
    ($($fmt_args:tt)*) => {
        $crate::error::Error::Protocol(format!($($fmt_args)*))
    };
}
