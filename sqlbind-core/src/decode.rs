//! Provides [`Decode`] for decoding values from the backend.

use crate::error::BoxDynError;
use crate::types::Type;
use crate::value::ValueRef;

/// A type that can be decoded from a fetched value.
///
/// The binding engine checks [`Type::compatible`] and handles `NULL` before calling
/// [`decode`](Decode::decode), so implementations only see non-null values of a
/// compatible type. A truncated value is decoded like any other.
pub trait Decode: Sized + Type {
    fn decode(value: ValueRef<'_>) -> Result<Self, BoxDynError>;
}
