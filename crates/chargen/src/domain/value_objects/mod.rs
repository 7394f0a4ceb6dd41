//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod gender;
mod generation_strategy;

pub use gender::*;
pub use generation_strategy::*;
