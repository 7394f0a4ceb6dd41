//! Repository Ports

mod character_repository;

pub use character_repository::*;
