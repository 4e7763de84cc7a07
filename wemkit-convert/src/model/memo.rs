//! Compute-once value cell

use tracing::warn;

/// A value that is computed at most once and then cached forever.
///
/// A second [`Memo::set`] is ignored (and logged) rather than overwriting
/// the first value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Memo<T> {
    Unset,
    Computed(T),
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Memo::Unset
    }
}

impl<T> Memo<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Memo::Unset => None,
            Memo::Computed(value) => Some(value),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Memo::Computed(_))
    }

    /// Store `value` if nothing is stored yet.
    ///
    /// Returns `false` (and keeps the existing value) when already computed.
    pub fn set(&mut self, value: T) -> bool {
        match self {
            Memo::Unset => {
                *self = Memo::Computed(value);
                true
            }
            Memo::Computed(_) => {
                warn!("Ignoring second assignment to a compute-once field");
                false
            }
        }
    }
}
