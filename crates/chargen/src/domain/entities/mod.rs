//! Domain Entities
//!
//! - Character: generated role-play profile and its flat field record

mod character;

pub use character::*;
