use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{mismatched_types, BoxDynError};
use crate::indicator::Indicator;
use crate::type_info::DataType;
use crate::types::Type;

/// A single backend-neutral value, as it travels between the binding engine and a driver.
///
/// `NULL` is carried in-band and remembers the type it was bound as.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum ValueKind {
    Null(DataType),
    Bool(bool),
    Integer(i32),
    BigInt(i64),
    UnsignedBigInt(u64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ValueKind {
    pub fn data_type(&self) -> DataType {
        match self {
            ValueKind::Null(_) => DataType::Null,
            ValueKind::Bool(_) => DataType::Bool,
            ValueKind::Integer(_) => DataType::Integer,
            ValueKind::BigInt(_) => DataType::BigInt,
            ValueKind::UnsignedBigInt(_) => DataType::UnsignedBigInt,
            ValueKind::Double(_) => DataType::Double,
            ValueKind::Text(_) => DataType::Text,
            ValueKind::Blob(_) => DataType::Blob,
            ValueKind::Date(_) => DataType::Date,
            ValueKind::DateTime(_) => DataType::DateTime,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, ValueKind::Null(_))
    }

    pub(crate) fn unexpected<Expected: Type>(&self) -> Result<Expected, BoxDynError> {
        Err(mismatched_types::<Expected>(self.data_type()))
    }

    pub(crate) fn try_integer<T>(&self) -> Result<T, BoxDynError>
    where
        T: Type + TryFrom<i32> + TryFrom<i64> + TryFrom<u64>,
        BoxDynError: From<<T as TryFrom<i32>>::Error>,
        BoxDynError: From<<T as TryFrom<i64>>::Error>,
        BoxDynError: From<<T as TryFrom<u64>>::Error>,
    {
        Ok(match self {
            ValueKind::Integer(i) => (*i).try_into()?,
            ValueKind::BigInt(i) => (*i).try_into()?,
            ValueKind::UnsignedBigInt(i) => (*i).try_into()?,
            _ => return self.unexpected(),
        })
    }

    /// Total order used when sorting result sets: `NULL` first, then values grouped by kind.
    ///
    /// Numeric kinds compare by value with each other.
    pub fn sort_cmp(&self, other: &ValueKind) -> Ordering {
        use ValueKind::*;

        match (self, other) {
            (Null(_), Null(_)) => Ordering::Equal,
            (Null(_), _) => Ordering::Less,
            (_, Null(_)) => Ordering::Greater,

            (Bool(a), Bool(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Blob(a), Blob(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Date(a), DateTime(b)) => a.and_time(NaiveDateTime::MIN.time()).cmp(b),
            (DateTime(a), Date(b)) => a.cmp(&b.and_time(NaiveDateTime::MIN.time())),

            (a, b) => match (a.as_numeric(), b.as_numeric()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }

    fn as_numeric(&self) -> Option<Numeric> {
        match self {
            ValueKind::Integer(v) => Some(Numeric::Int(i128::from(*v))),
            ValueKind::BigInt(v) => Some(Numeric::Int(i128::from(*v))),
            ValueKind::UnsignedBigInt(v) => Some(Numeric::Int(i128::from(*v))),
            ValueKind::Double(v) => Some(Numeric::Float(*v)),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ValueKind::Null(_) => 0,
            ValueKind::Bool(_) => 1,
            ValueKind::Integer(_)
            | ValueKind::BigInt(_)
            | ValueKind::UnsignedBigInt(_)
            | ValueKind::Double(_) => 2,
            ValueKind::Text(_) => 3,
            ValueKind::Date(_) | ValueKind::DateTime(_) => 4,
            ValueKind::Blob(_) => 5,
        }
    }
}

#[derive(Clone, Copy)]
enum Numeric {
    Int(i128),
    Float(f64),
}

impl Numeric {
    #[allow(clippy::cast_precision_loss)]
    fn cmp(&self, other: &Numeric) -> Ordering {
        match (*self, *other) {
            (Numeric::Int(a), Numeric::Int(b)) => a.cmp(&b),
            (Numeric::Float(a), Numeric::Float(b)) => a.total_cmp(&b),
            (Numeric::Int(a), Numeric::Float(b)) => (a as f64).total_cmp(&b),
            (Numeric::Float(a), Numeric::Int(b)) => a.total_cmp(&(b as f64)),
        }
    }
}

/// A borrowed view of a fetched value and the state the backend reported for it.
#[derive(Clone, Copy, Debug)]
pub struct ValueRef<'r> {
    pub(crate) kind: &'r ValueKind,
    pub(crate) indicator: Indicator,
}

impl<'r> ValueRef<'r> {
    pub fn new(kind: &'r ValueKind, indicator: Indicator) -> Self {
        let indicator = if kind.is_null() {
            Indicator::Null
        } else {
            indicator
        };

        Self { kind, indicator }
    }

    #[inline]
    pub fn kind(&self) -> &'r ValueKind {
        self.kind
    }

    #[inline]
    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.kind.data_type()
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.indicator.is_null()
    }
}
