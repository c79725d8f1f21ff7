//! Conversions between Rust and backend-neutral SQL types.
//!
//! # Types
//!
//! | Rust type                             | SQL type(s)                                          |
//! |---------------------------------------|------------------------------------------------------|
//! | `bool`                                | BOOLEAN                                              |
//! | `i16`, `i32`                          | SMALLINT, INTEGER                                    |
//! | `i64`                                 | BIGINT                                               |
//! | `u32`, `u64`                          | BIGINT, BIGINT UNSIGNED                              |
//! | `f32`, `f64`                          | DOUBLE, NUMERIC                                      |
//! | [`String`]                            | VARCHAR, CHAR, TEXT                                  |
//! | `Vec<u8>`                             | BLOB                                                 |
//! | `chrono::NaiveDate`                   | DATE                                                 |
//! | `chrono::NaiveDateTime`               | DATETIME, TIMESTAMP                                  |
//!
//! # Nullable
//!
//! `NULL` is not a value of any of these types. Bind or fetch through `Option<T>` or
//! [`Indicated<T>`](crate::indicator::Indicated), or pass an explicit
//! [`Indicator`](crate::indicator::Indicator), to work with it.
//!
//! # User types
//!
//! Anything else is mapped onto one of the above, or onto [`Values`](crate::values::Values),
//! by implementing [`TypeConversion`](crate::conversion::TypeConversion).

use crate::type_info::DataType;

mod blob;
mod bool;
mod chrono;
mod float;
mod int;
mod str;

/// Indicates that a SQL type is supported for a backend.
pub trait Type {
    /// Returns the canonical SQL type for this Rust type.
    ///
    /// When binding arguments, this is used to tell the backend what type a `NULL` is.
    fn type_info() -> DataType;

    /// Determines if this Rust type is compatible with the given SQL type.
    ///
    /// When decoding values from a row, this method is checked to determine if we should continue
    /// or raise a runtime type mismatch error.
    fn compatible(ty: &DataType) -> bool {
        *ty == Self::type_info()
    }
}

#[test]
fn test_type_impls() {
    use crate::decode::Decode;
    use crate::encode::Encode;

    fn has_type<T>()
    where
        T: Type + Encode + Decode,
    {
    }

    has_type::<bool>();
    has_type::<i16>();
    has_type::<i32>();
    has_type::<i64>();
    has_type::<u32>();
    has_type::<u64>();
    has_type::<f32>();
    has_type::<f64>();
    has_type::<String>();
    has_type::<Vec<u8>>();
    has_type::<::chrono::NaiveDate>();
    has_type::<::chrono::NaiveDateTime>();
}
