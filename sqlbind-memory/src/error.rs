use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

pub(crate) use sqlbind_core::error::*;

/// The kind of failure reported by the in-memory backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryErrorCode {
    NoSuchTable,
    TableExists,
    NoSuchColumn,
    Syntax,
    TypeMismatch,
    NotNull,
    Unique,
    Parameter,
}

impl MemoryErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryErrorCode::NoSuchTable => "no_such_table",
            MemoryErrorCode::TableExists => "table_exists",
            MemoryErrorCode::NoSuchColumn => "no_such_column",
            MemoryErrorCode::Syntax => "syntax",
            MemoryErrorCode::TypeMismatch => "type_mismatch",
            MemoryErrorCode::NotNull => "not_null",
            MemoryErrorCode::Unique => "unique",
            MemoryErrorCode::Parameter => "parameter",
        }
    }
}

/// An error returned from the in-memory backend.
#[derive(Debug)]
pub struct MemoryError {
    code: MemoryErrorCode,
    message: String,
}

impl MemoryError {
    pub(crate) fn new(code: MemoryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> MemoryErrorCode {
        self.code
    }
}

impl Display for MemoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "(code: {}) {}", self.code.as_str(), self.message)
    }
}

impl StdError for MemoryError {}

impl DatabaseError for MemoryError {
    #[inline]
    fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.code.as_str()))
    }

    #[doc(hidden)]
    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    #[doc(hidden)]
    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    #[doc(hidden)]
    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        match self.code {
            MemoryErrorCode::Unique => ErrorKind::UniqueViolation,
            MemoryErrorCode::NotNull => ErrorKind::NotNullViolation,
            _ => ErrorKind::Other,
        }
    }
}

// Build a `MemoryError` wrapped as a `sqlbind_core::Error`
macro_rules! err_memory {
    ($code:ident, $($fmt_args:tt)*) => {
        $crate::error::Error::from($crate::error::MemoryError::new(
            $crate::error::MemoryErrorCode::$code,
            format!($($fmt_args)*),
        ))
    };
}
