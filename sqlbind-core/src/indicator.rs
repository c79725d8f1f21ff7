//! Per-value null and truncation state.

/// The state of a single bound or fetched value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// The value is present and complete.
    #[default]
    Ok,

    /// The value is SQL `NULL`; whatever sits in the paired storage is not valid data.
    Null,

    /// The value was cut short to fit the fetch buffer of the backend.
    Truncated,
}

impl Indicator {
    #[inline]
    pub fn is_null(self) -> bool {
        matches!(self, Indicator::Null)
    }

    #[inline]
    pub fn is_truncated(self) -> bool {
        matches!(self, Indicator::Truncated)
    }
}

/// A value paired with its [`Indicator`].
///
/// This is what a conversion receives from, and hands back to, the binding engine. `Null`
/// carries no payload, so code matching on it cannot accidentally read stale data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Indicated<T> {
    Ok(T),
    Null,
    Truncated(T),
}

impl<T> Indicated<T> {
    /// Pair `value` with `indicator`, dropping the value when the indicator is `Null`.
    pub fn new(value: T, indicator: Indicator) -> Self {
        match indicator {
            Indicator::Ok => Indicated::Ok(value),
            Indicator::Null => Indicated::Null,
            Indicator::Truncated => Indicated::Truncated(value),
        }
    }

    pub fn indicator(&self) -> Indicator {
        match self {
            Indicated::Ok(_) => Indicator::Ok,
            Indicated::Null => Indicator::Null,
            Indicated::Truncated(_) => Indicator::Truncated,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Indicated::Null)
    }

    pub fn as_ref(&self) -> Indicated<&T> {
        match self {
            Indicated::Ok(v) => Indicated::Ok(v),
            Indicated::Null => Indicated::Null,
            Indicated::Truncated(v) => Indicated::Truncated(v),
        }
    }

    pub fn map<U, F>(self, f: F) -> Indicated<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Indicated::Ok(v) => Indicated::Ok(f(v)),
            Indicated::Null => Indicated::Null,
            Indicated::Truncated(v) => Indicated::Truncated(f(v)),
        }
    }

    /// Returns the value if there is one, complete or truncated.
    pub fn value(self) -> Option<T> {
        match self {
            Indicated::Ok(v) | Indicated::Truncated(v) => Some(v),
            Indicated::Null => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.value().unwrap_or(default)
    }
}

impl<T> From<Option<T>> for Indicated<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Indicated::Ok(v),
            None => Indicated::Null,
        }
    }
}

impl<T> From<Indicated<T>> for Option<T> {
    fn from(value: Indicated<T>) -> Self {
        value.value()
    }
}
