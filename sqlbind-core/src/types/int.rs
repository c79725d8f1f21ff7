use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::BoxDynError;
use crate::type_info::DataType;
use crate::types::Type;
use crate::value::{ValueKind, ValueRef};

macro_rules! impl_int {
    ($ty:ty, $data_type:ident, |$v:ident| $encode:expr) => {
        impl Type for $ty {
            fn type_info() -> DataType {
                DataType::$data_type
            }

            fn compatible(ty: &DataType) -> bool {
                ty.is_integer()
            }
        }

        impl Encode for $ty {
            fn encode(&self) -> Result<ValueKind, BoxDynError> {
                let $v = *self;
                Ok($encode)
            }
        }

        impl Decode for $ty {
            fn decode(value: ValueRef<'_>) -> Result<Self, BoxDynError> {
                value.kind().try_integer()
            }
        }
    };
}

impl_int!(i16, Integer, |v| ValueKind::Integer(i32::from(v)));
impl_int!(i32, Integer, |v| ValueKind::Integer(v));
impl_int!(i64, BigInt, |v| ValueKind::BigInt(v));
impl_int!(u32, BigInt, |v| ValueKind::BigInt(i64::from(v)));
impl_int!(u64, UnsignedBigInt, |v| ValueKind::UnsignedBigInt(v));
