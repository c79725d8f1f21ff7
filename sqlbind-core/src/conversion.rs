//! User-defined type conversions.
//!
//! A [`TypeConversion`] maps a user type onto a *base type*: either one of the native scalar
//! types in [`types`](crate::types), or a [`Values`] record. The binding engine only ever
//! talks to base types, so any `T: TypeConversion` can be bound, fetched, or stored inside a
//! [`Values`] without the engine knowing about `T`.
//!
//! ```rust,ignore
//! struct PhonebookEntry {
//!     name: String,
//!     phone: String,
//! }
//!
//! impl TypeConversion for PhonebookEntry {
//!     type Base = Values;
//!
//!     fn from_base(base: Indicated<Values>) -> Result<Self, BoxDynError> {
//!         let v = base.value().ok_or(UnexpectedNullError)?;
//!
//!         Ok(PhonebookEntry {
//!             name: v.get("NAME")?,
//!             phone: v.get_or("PHONE", String::from("<NULL>"))?,
//!         })
//!     }
//!
//!     fn to_base(&self) -> Result<Indicated<Values>, BoxDynError> {
//!         let mut v = Values::new();
//!         v.set("NAME", &self.name)?;
//!         v.set_with_indicator(
//!             "PHONE",
//!             &self.phone,
//!             if self.phone.is_empty() { Indicator::Null } else { Indicator::Ok },
//!         )?;
//!
//!         Ok(Indicated::Ok(v))
//!     }
//! }
//! ```

use chrono::{NaiveDate, NaiveDateTime};

use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::{mismatched_types, BoxDynError, Error, UnexpectedNullError};
use crate::indicator::Indicated;
use crate::row::Row;
use crate::types::Type;
use crate::value::{ValueKind, ValueRef};
use crate::values::Values;

/// A base type after encoding: one scalar for one placeholder, or named fields for
/// a record that fills placeholders by name.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedBase {
    Scalar(ValueKind),
    Record(Vec<(String, ValueKind)>),
}

/// A type the binding engine can exchange directly with a backend.
///
/// Implemented for every native scalar type and for [`Values`]; there is no need to
/// implement it by hand.
pub trait BaseType: Sized {
    #[doc(hidden)]
    fn encode_base(value: &Indicated<Self>) -> Result<EncodedBase, BoxDynError>;

    /// Reads this type out of `row`, starting at column `*position` and advancing it past
    /// every column consumed.
    #[doc(hidden)]
    fn decode_base(row: &Row, position: &mut usize) -> Result<Indicated<Self>, Error>;
}

impl<T> BaseType for T
where
    T: Type + Encode + Decode,
{
    fn encode_base(value: &Indicated<Self>) -> Result<EncodedBase, BoxDynError> {
        Ok(EncodedBase::Scalar(match value {
            Indicated::Ok(v) | Indicated::Truncated(v) => v.encode()?,
            Indicated::Null => ValueKind::Null(T::type_info()),
        }))
    }

    fn decode_base(row: &Row, position: &mut usize) -> Result<Indicated<Self>, Error> {
        let index = *position;
        let value = row.try_get_raw(index)?;
        *position += 1;

        decode_indicated::<T>(value).map_err(|source| Error::ColumnDecode {
            index: row.column_label(index),
            source,
        })
    }
}

impl BaseType for Values {
    fn encode_base(value: &Indicated<Self>) -> Result<EncodedBase, BoxDynError> {
        match value {
            Indicated::Ok(v) | Indicated::Truncated(v) => Ok(EncodedBase::Record(
                v.iter()
                    .map(|(name, field)| (name.to_owned(), field.value().clone()))
                    .collect(),
            )),
            Indicated::Null => Err("a record cannot be bound as a whole NULL".into()),
        }
    }

    fn decode_base(row: &Row, position: &mut usize) -> Result<Indicated<Self>, Error> {
        let values = Values::from_row_at(row, *position);
        *position = row.len();

        Ok(Indicated::Ok(values))
    }
}

/// Decode a single fetched value, mapping its indicator onto [`Indicated`].
pub fn decode_indicated<T>(value: ValueRef<'_>) -> Result<Indicated<T>, BoxDynError>
where
    T: Decode,
{
    if value.is_null() {
        return Ok(Indicated::Null);
    }

    let ty = value.data_type();
    if !T::compatible(&ty) {
        return Err(mismatched_types::<T>(ty));
    }

    T::decode(value).map(|v| Indicated::new(v, value.indicator()))
}

/// Maps a user type onto a [`BaseType`] and back.
///
/// `from_base` is handed whatever the backend produced, `NULL` included; return
/// [`UnexpectedNullError`] when the type has no sensible null value, and the engine will
/// report it against the column or field that was being read.
pub trait TypeConversion: Sized {
    type Base: BaseType;

    fn from_base(base: Indicated<Self::Base>) -> Result<Self, BoxDynError>;

    fn to_base(&self) -> Result<Indicated<Self::Base>, BoxDynError>;
}

macro_rules! impl_identity_conversion {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TypeConversion for $ty {
                type Base = $ty;

                fn from_base(base: Indicated<Self::Base>) -> Result<Self, BoxDynError> {
                    base.value().ok_or_else(|| UnexpectedNullError.into())
                }

                fn to_base(&self) -> Result<Indicated<Self::Base>, BoxDynError> {
                    Ok(Indicated::Ok(self.clone()))
                }
            }
        )*
    };
}

impl_identity_conversion!(
    bool,
    i16,
    i32,
    i64,
    u32,
    u64,
    f32,
    f64,
    String,
    Vec<u8>,
    NaiveDate,
    NaiveDateTime,
    Values,
);

impl<T> TypeConversion for Option<T>
where
    T: TypeConversion,
{
    type Base = T::Base;

    fn from_base(base: Indicated<Self::Base>) -> Result<Self, BoxDynError> {
        match base {
            Indicated::Null => Ok(None),
            base => T::from_base(base).map(Some),
        }
    }

    fn to_base(&self) -> Result<Indicated<Self::Base>, BoxDynError> {
        match self {
            Some(v) => v.to_base(),
            None => Ok(Indicated::Null),
        }
    }
}

impl<T> TypeConversion for Indicated<T>
where
    T: TypeConversion,
{
    type Base = T::Base;

    fn from_base(base: Indicated<Self::Base>) -> Result<Self, BoxDynError> {
        Ok(match base {
            Indicated::Null => Indicated::Null,
            Indicated::Ok(v) => Indicated::Ok(T::from_base(Indicated::Ok(v))?),
            Indicated::Truncated(v) => Indicated::Truncated(T::from_base(Indicated::Truncated(v))?),
        })
    }

    fn to_base(&self) -> Result<Indicated<Self::Base>, BoxDynError> {
        match self {
            Indicated::Ok(v) | Indicated::Truncated(v) => v.to_base(),
            Indicated::Null => Ok(Indicated::Null),
        }
    }
}
