use chrono::{NaiveDate, NaiveDateTime};

use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::BoxDynError;
use crate::type_info::DataType;
use crate::types::Type;
use crate::value::{ValueKind, ValueRef};

impl Type for NaiveDate {
    fn type_info() -> DataType {
        DataType::Date
    }
}

impl Encode for NaiveDate {
    fn encode(&self) -> Result<ValueKind, BoxDynError> {
        Ok(ValueKind::Date(*self))
    }
}

impl Decode for NaiveDate {
    fn decode(value: ValueRef<'_>) -> Result<Self, BoxDynError> {
        match value.kind() {
            ValueKind::Date(date) => Ok(*date),
            other => other.unexpected(),
        }
    }
}

impl Type for NaiveDateTime {
    fn type_info() -> DataType {
        DataType::DateTime
    }

    fn compatible(ty: &DataType) -> bool {
        matches!(ty, DataType::DateTime | DataType::Date)
    }
}

impl Encode for NaiveDateTime {
    fn encode(&self) -> Result<ValueKind, BoxDynError> {
        Ok(ValueKind::DateTime(*self))
    }
}

impl Decode for NaiveDateTime {
    fn decode(value: ValueRef<'_>) -> Result<Self, BoxDynError> {
        match value.kind() {
            ValueKind::DateTime(datetime) => Ok(*datetime),
            ValueKind::Date(date) => Ok(date.and_time(NaiveDateTime::MIN.time())),
            other => other.unexpected(),
        }
    }
}
