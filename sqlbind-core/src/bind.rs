//! Type-erased use (input) and into (output) bindings held by a
//! [`Statement`](crate::statement::Statement).

use crate::conversion::{BaseType, EncodedBase, TypeConversion};
use crate::error::{Error, Result};
use crate::indicator::{Indicated, Indicator};
use crate::row::Row;

pub(crate) trait UseElement {
    fn name(&self) -> Option<&str>;

    /// Number of rows for a bulk binding, `None` for a scalar one.
    fn rows(&self) -> Option<usize>;

    fn encode(&self, row: usize) -> Result<EncodedBase>;

    /// Validates the binding before any row is encoded.
    fn check(&self) -> Result<()> {
        Ok(())
    }
}

fn encode_one<T>(value: &T, indicator: Option<Indicator>) -> Result<EncodedBase>
where
    T: TypeConversion,
{
    let base = match indicator {
        Some(Indicator::Null) => Indicated::Null,
        _ => value.to_base().map_err(Error::Encode)?,
    };

    T::Base::encode_base(&base).map_err(Error::Encode)
}

pub(crate) struct UseOne<'b, T> {
    pub(crate) value: &'b T,
    pub(crate) indicator: Option<Indicator>,
    pub(crate) name: Option<String>,
}

impl<T> UseElement for UseOne<'_, T>
where
    T: TypeConversion,
{
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn rows(&self) -> Option<usize> {
        None
    }

    fn encode(&self, _row: usize) -> Result<EncodedBase> {
        encode_one(self.value, self.indicator)
    }
}

pub(crate) struct UseBulk<'b, T> {
    pub(crate) values: &'b [T],
    pub(crate) indicators: Option<&'b [Indicator]>,
    pub(crate) name: Option<String>,
}

impl<T> UseElement for UseBulk<'_, T>
where
    T: TypeConversion,
{
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn rows(&self) -> Option<usize> {
        Some(self.values.len())
    }

    fn encode(&self, row: usize) -> Result<EncodedBase> {
        let indicator = self.indicators.map(|indicators| indicators[row]);

        encode_one(&self.values[row], indicator)
    }

    fn check(&self) -> Result<()> {
        match self.indicators {
            Some(indicators) if indicators.len() != self.values.len() => {
                Err(Error::BulkSizeMismatch {
                    expected: self.values.len(),
                    actual: indicators.len(),
                })
            }
            _ => Ok(()),
        }
    }
}

pub(crate) trait IntoElement {
    /// Row limit per fetch for a bulk binding (`0` is unbounded), `None` for a scalar one.
    fn capacity(&self) -> Option<usize>;

    /// Decodes `row` into slot `index`, consuming columns from `*position` onward.
    fn write(&mut self, index: usize, row: &Row, position: &mut usize) -> Result<()>;

    /// Called once a batch is complete with the number of rows written.
    fn finish(&mut self, rows: usize);
}

fn decode_one<T>(row: &Row, position: &mut usize) -> Result<(Indicated<T::Base>, usize)>
where
    T: TypeConversion,
{
    let start = *position;
    let base = T::Base::decode_base(row, position)?;

    Ok((base, start))
}

fn convert<T>(row: &Row, start: usize, base: Indicated<T::Base>) -> Result<T>
where
    T: TypeConversion,
{
    T::from_base(base).map_err(|source| Error::decode_for(row.column_label(start), source))
}

pub(crate) struct IntoOne<'b, T> {
    pub(crate) target: &'b mut T,
    pub(crate) indicator: Option<&'b mut Indicator>,
}

impl<T> IntoElement for IntoOne<'_, T>
where
    T: TypeConversion,
{
    fn capacity(&self) -> Option<usize> {
        None
    }

    fn write(&mut self, _index: usize, row: &Row, position: &mut usize) -> Result<()> {
        let (base, start) = decode_one::<T>(row, position)?;

        if let Some(indicator) = self.indicator.as_deref_mut() {
            *indicator = base.indicator();

            // the caller asked to see nulls through the indicator; leave the target alone
            if base.is_null() {
                return Ok(());
            }
        }

        *self.target = convert(row, start, base)?;

        Ok(())
    }

    fn finish(&mut self, _rows: usize) {}
}

pub(crate) struct IntoBulk<'b, T> {
    pub(crate) target: &'b mut Vec<T>,
    pub(crate) indicators: Option<&'b mut Vec<Indicator>>,
    pub(crate) placeholder: Option<fn() -> T>,
    pub(crate) capacity: usize,
}

impl<'b, T> IntoBulk<'b, T> {
    pub(crate) fn new(target: &'b mut Vec<T>) -> Self {
        let capacity = target.len();

        Self {
            target,
            indicators: None,
            placeholder: None,
            capacity,
        }
    }

    pub(crate) fn with_indicators(target: &'b mut Vec<T>, indicators: &'b mut Vec<Indicator>) -> Self
    where
        T: Default,
    {
        Self {
            indicators: Some(indicators),
            placeholder: Some(T::default),
            ..Self::new(target)
        }
    }

    fn put(&mut self, index: usize, value: T) {
        if index < self.target.len() {
            self.target[index] = value;
        } else {
            self.target.push(value);
        }
    }
}

impl<T> IntoBulk<'_, T>
where
    T: TypeConversion,
{
    fn write_at(&mut self, index: usize, row: &Row, position: &mut usize) -> Result<()> {
        let (base, start) = decode_one::<T>(row, position)?;

        if let Some(indicators) = self.indicators.as_deref_mut() {
            let indicator = base.indicator();

            if index < indicators.len() {
                indicators[index] = indicator;
            } else {
                indicators.push(indicator);
            }

            if let (true, Some(placeholder)) = (base.is_null(), self.placeholder) {
                if index >= self.target.len() {
                    self.target.push(placeholder());
                }

                return Ok(());
            }
        }

        let value = convert(row, start, base)?;
        self.put(index, value);

        Ok(())
    }
}

impl<T> IntoElement for IntoBulk<'_, T>
where
    T: TypeConversion,
{
    fn capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }

    /// On failure the target keeps only the rows of the batch written before `index`.
    fn write(&mut self, index: usize, row: &Row, position: &mut usize) -> Result<()> {
        let written = self.write_at(index, row, position);

        if written.is_err() {
            self.finish(index);
        }

        written
    }

    fn finish(&mut self, rows: usize) {
        self.target.truncate(rows);

        if let Some(indicators) = self.indicators.as_deref_mut() {
            indicators.truncate(rows);
        }
    }
}
