use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::BoxDynError;
use crate::type_info::DataType;
use crate::types::Type;
use crate::value::{ValueKind, ValueRef};

impl Type for String {
    fn type_info() -> DataType {
        DataType::Text
    }
}

impl Encode for String {
    fn encode(&self) -> Result<ValueKind, BoxDynError> {
        Ok(ValueKind::Text(self.clone()))
    }
}

impl Decode for String {
    fn decode(value: ValueRef<'_>) -> Result<Self, BoxDynError> {
        match value.kind() {
            ValueKind::Text(text) => Ok(text.clone()),
            other => other.unexpected(),
        }
    }
}
