//! Domain Services
//!
//! Stateless domain logic that does not belong to a single entity.

mod generator;
pub mod prompt;

pub use generator::*;
pub use prompt::{format_prompt, parse_prompt, PromptUpdate};
