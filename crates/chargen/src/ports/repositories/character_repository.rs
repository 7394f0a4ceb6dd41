//! Character Repository Port
//!
//! Abstract interface for persisting the character collection.

use crate::domain::{errors::DomainError, CharacterRecord};

/// Repository interface for the whole character collection
///
/// The collection is always read and written as a unit, in order.
pub trait CharacterRepository {
    /// Load every stored record; an absent store yields an empty list
    fn load(&self) -> Result<Vec<CharacterRecord>, DomainError>;

    /// Replace the stored collection with `records`
    fn save(&self, records: &[CharacterRecord]) -> Result<(), DomainError>;
}
