//! Application Layer
//!
//! Use cases that orchestrate domain logic and ports.

mod character_store;

pub use character_store::*;
