use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::BoxDynError;
use crate::type_info::DataType;
use crate::types::Type;
use crate::value::{ValueKind, ValueRef};

impl Type for f64 {
    fn type_info() -> DataType {
        DataType::Double
    }
}

impl Encode for f64 {
    fn encode(&self) -> Result<ValueKind, BoxDynError> {
        Ok(ValueKind::Double(*self))
    }
}

impl Decode for f64 {
    fn decode(value: ValueRef<'_>) -> Result<Self, BoxDynError> {
        match value.kind() {
            ValueKind::Double(v) => Ok(*v),
            other => other.unexpected(),
        }
    }
}

impl Type for f32 {
    fn type_info() -> DataType {
        DataType::Double
    }
}

impl Encode for f32 {
    fn encode(&self) -> Result<ValueKind, BoxDynError> {
        Ok(ValueKind::Double(f64::from(*self)))
    }
}

impl Decode for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn decode(value: ValueRef<'_>) -> Result<Self, BoxDynError> {
        match value.kind() {
            ValueKind::Double(v) => Ok(*v as f32),
            other => other.unexpected(),
        }
    }
}
