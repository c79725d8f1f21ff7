//! Provides [`Encode`] for encoding values for the backend.

use crate::error::BoxDynError;
use crate::types::Type;
use crate::value::ValueKind;

/// Encode a single value to be sent to the backend.
///
/// `NULL` never reaches an encoder; the binding engine emits
/// [`ValueKind::Null`] with [`Type::type_info`] itself.
pub trait Encode: Type {
    fn encode(&self) -> Result<ValueKind, BoxDynError>;
}
