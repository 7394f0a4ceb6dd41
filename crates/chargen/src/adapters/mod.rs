//! Adapters
//!
//! Concrete implementations of the ports.

mod json_file;
mod lm_studio;

pub use json_file::{to_pretty_json, JsonFileRepository};
pub use lm_studio::{
    extract_json_block, parse_completion, GenerationError, LmStudioClient, DEFAULT_BASE_URL,
    DEFAULT_GENERATE_TIMEOUT, DEFAULT_LIST_TIMEOUT, DEFAULT_TEMPERATURE,
};
