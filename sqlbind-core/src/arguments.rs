//! Types for passing bound parameters to a backend.

use crate::value::ValueKind;

/// The parameters of one execution, laid out as one column of values per placeholder slot.
///
/// Every slot holds exactly [`rows`](Arguments::rows) values. `NULL` travels in-band as
/// [`ValueKind::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    rows: usize,
    slots: Vec<Vec<ValueKind>>,
}

impl Arguments {
    pub fn new(slots: Vec<Vec<ValueKind>>, rows: usize) -> Self {
        debug_assert!(slots.iter().all(|slot| slot.len() == rows));

        Self { rows, slots }
    }

    /// Number of rows to execute the statement for.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of placeholder slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize, row: usize) -> Option<&ValueKind> {
        self.slots.get(slot)?.get(row)
    }

    /// The values of every slot for the given row, in slot order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &ValueKind> + '_ {
        self.slots.iter().filter_map(move |slot| slot.get(row))
    }

    /// A copy of these arguments restricted to a single row.
    pub(crate) fn single_row(&self, row: usize) -> Arguments {
        Arguments {
            rows: 1,
            slots: self
                .slots
                .iter()
                .map(|slot| slot[row..=row].to_vec())
                .collect(),
        }
    }
}
