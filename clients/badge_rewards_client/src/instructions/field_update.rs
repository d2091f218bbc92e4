//! Three-state optional used by the update builders.
//!
//! `Keep` leaves on-chain state untouched, `Set` overwrites it, `Clear` nulls
//! a nullable field. The program's update arguments are plain `Option<T>`
//! (`None` = keep), so `Clear` has no wire form of its own: a builder either
//! rewrites it into something the program will null, or rejects it.

use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    /// Wire form for a field the program cannot null out: `Keep` is `None`.
    pub fn into_wire(self, field: &'static str) -> Result<Option<T>, BuildError> {
        match self {
            FieldUpdate::Keep => Ok(None),
            FieldUpdate::Set(value) => Ok(Some(value)),
            FieldUpdate::Clear => Err(BuildError::NotClearable { field }),
        }
    }

    /// Resolves the update against the current value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Keep => current,
            FieldUpdate::Set(value) => Some(value),
            FieldUpdate::Clear => None,
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `None` means "leave unchanged", never "clear".
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldUpdate::Keep, FieldUpdate::Set)
    }
}
