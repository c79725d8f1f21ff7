use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::BoxDynError;
use crate::type_info::DataType;
use crate::types::Type;
use crate::value::{ValueKind, ValueRef};

impl Type for Vec<u8> {
    fn type_info() -> DataType {
        DataType::Blob
    }
}

impl Encode for Vec<u8> {
    fn encode(&self) -> Result<ValueKind, BoxDynError> {
        Ok(ValueKind::Blob(self.clone()))
    }
}

impl Decode for Vec<u8> {
    fn decode(value: ValueRef<'_>) -> Result<Self, BoxDynError> {
        match value.kind() {
            ValueKind::Blob(blob) => Ok(blob.clone()),
            other => other.unexpected(),
        }
    }
}
