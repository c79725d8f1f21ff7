use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::BoxDynError;
use crate::type_info::DataType;
use crate::types::Type;
use crate::value::{ValueKind, ValueRef};

impl Type for bool {
    fn type_info() -> DataType {
        DataType::Bool
    }

    fn compatible(ty: &DataType) -> bool {
        matches!(ty, DataType::Bool) || ty.is_integer()
    }
}

impl Encode for bool {
    fn encode(&self) -> Result<ValueKind, BoxDynError> {
        Ok(ValueKind::Bool(*self))
    }
}

impl Decode for bool {
    fn decode(value: ValueRef<'_>) -> Result<Self, BoxDynError> {
        match value.kind() {
            ValueKind::Bool(b) => Ok(*b),
            ValueKind::Integer(i) => Ok(*i != 0),
            ValueKind::BigInt(i) => Ok(*i != 0),
            ValueKind::UnsignedBigInt(i) => Ok(*i != 0),
            other => other.unexpected(),
        }
    }
}
