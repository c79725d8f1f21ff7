use indexmap::IndexMap;

use crate::conversion::{decode_indicated, TypeConversion};
use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::{Error, Result};
use crate::indicator::{Indicated, Indicator};
use crate::row::Row;
use crate::types::Type;
use crate::value::{ValueKind, ValueRef};

/// One named entry of a [`Values`] record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    value: ValueKind,
    indicator: Indicator,
}

impl Field {
    #[inline]
    pub fn value(&self) -> &ValueKind {
        &self.value
    }

    #[inline]
    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    fn as_value_ref(&self) -> ValueRef<'_> {
        ValueRef::new(&self.value, self.indicator)
    }
}

/// An insertion-ordered record of named values, each with its own [`Indicator`].
///
/// This is the base type for conversions of aggregate user types: `to_base` fills a fresh
/// record with [`set`](Values::set), `from_base` reads one back with [`get`](Values::get).
/// Bound as a parameter, its fields fill the statement's placeholders by name.
///
/// Lookups try the exact name first and then fall back to an ASCII case-insensitive match,
/// since backends disagree on the case they report column names in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    fields: IndexMap<String, Field>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from every column of `row`.
    pub fn from_row(row: &Row) -> Self {
        Self::from_row_at(row, 0)
    }

    pub(crate) fn from_row_at(row: &Row, start: usize) -> Self {
        let fields = row
            .columns()
            .iter()
            .enumerate()
            .skip(start)
            .map(|(index, column)| {
                (
                    column.name().to_owned(),
                    Field {
                        value: row.values[index].clone(),
                        indicator: row.indicators[index],
                    },
                )
            })
            .collect();

        Self { fields }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> + '_ {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Stores `value` under `name`, replacing any previous entry whose name matches ignoring
    /// ASCII case.
    pub fn set<T>(&mut self, name: &str, value: &T) -> Result<()>
    where
        T: TypeConversion,
        T::Base: Encode,
    {
        self.set_with_indicator(name, value, Indicator::Ok)
    }

    /// Stores `value` under `name`; an indicator of [`Indicator::Null`] stores SQL `NULL`
    /// whatever `value` holds.
    pub fn set_with_indicator<T>(&mut self, name: &str, value: &T, indicator: Indicator) -> Result<()>
    where
        T: TypeConversion,
        T::Base: Encode,
    {
        let base = if indicator.is_null() {
            Indicated::Null
        } else {
            value.to_base().map_err(Error::Encode)?
        };

        let field = match base {
            Indicated::Null => Field {
                value: ValueKind::Null(T::Base::type_info()),
                indicator: Indicator::Null,
            },
            Indicated::Ok(v) | Indicated::Truncated(v) => Field {
                value: v.encode().map_err(Error::Encode)?,
                indicator,
            },
        };

        match self.position(name) {
            Some(index) => {
                if let Some((_, slot)) = self.fields.get_index_mut(index) {
                    *slot = field;
                }
            }
            None => {
                self.fields.insert(name.to_owned(), field);
            }
        }

        Ok(())
    }

    /// Reads the field `name` through `T`'s conversion.
    ///
    /// Fails with [`Error::ColumnNotFound`] if there is no such field, and with
    /// [`Error::UnexpectedNull`] if it is `NULL` and `T` cannot represent that.
    pub fn get<T>(&self, name: &str) -> Result<T>
    where
        T: TypeConversion,
        T::Base: Decode,
    {
        let field = self
            .field(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_owned()))?;

        decode_indicated::<T::Base>(field.as_value_ref())
            .and_then(T::from_base)
            .map_err(|source| Error::decode_for(name, source))
    }

    /// Like [`get`](Values::get), but yields `default` when the field is missing or `NULL`.
    pub fn get_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: TypeConversion,
        T::Base: Decode,
    {
        match self.field(name) {
            Some(field) if !field.indicator.is_null() => self.get(name),
            _ => Ok(default),
        }
    }

    pub fn get_indicator(&self, name: &str) -> Result<Indicator> {
        self.field(name)
            .map(Field::indicator)
            .ok_or_else(|| Error::ColumnNotFound(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    fn field(&self, name: &str) -> Option<&Field> {
        self.position(name)
            .and_then(|index| self.fields.get_index(index))
            .map(|(_, field)| field)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name).or_else(|| {
            self.fields
                .keys()
                .position(|key| key.eq_ignore_ascii_case(name))
        })
    }
}
