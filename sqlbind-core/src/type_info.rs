use std::fmt::{self, Display, Formatter};

/// The backend-neutral SQL type of a parameter, column or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DataType {
    Null,
    Bool,
    Integer,
    BigInt,
    UnsignedBigInt,
    Double,
    Text,
    Blob,
    Date,
    DateTime,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Null => "NULL",
            DataType::Bool => "BOOLEAN",
            DataType::Integer => "INTEGER",
            DataType::BigInt => "BIGINT",
            DataType::UnsignedBigInt => "BIGINT UNSIGNED",
            DataType::Double => "DOUBLE",
            DataType::Text => "TEXT",
            DataType::Blob => "BLOB",
            DataType::Date => "DATE",
            DataType::DateTime => "DATETIME",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Integer | DataType::BigInt | DataType::UnsignedBigInt
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataType::Null)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
