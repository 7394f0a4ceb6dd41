//! Character Generator Library
//!
//! Generates fictional character profiles, renders them as role-play
//! prompts, reads edited prompts back, and persists the collection.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure entities and logic
//!   - `entities/`: Character and its flat field record
//!   - `value_objects/`: Gender, GenerationStrategy
//!   - `catalog`: Immutable vocabulary tables
//!   - `services/`: Character generation, prompt formatting and parsing
//!   - `errors`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Collection persistence
//!   - `services/`: Remote character generation
//!
//! - **Adapters** (`adapters/`): JSON file repository, LM Studio client
//!
//! - **Application** (`application/`): CharacterStore use cases
//!
//! # Usage
//!
//! ```rust,ignore
//! use chargen::{CharacterGenerator, CharacterStore, JsonFileRepository};
//!
//! let repo = JsonFileRepository::new("data.json");
//! let mut store = CharacterStore::open(repo, CharacterGenerator::default())?;
//! store.generate(&mut rand::thread_rng())?;
//! println!("{}", store.all_prompts(None));
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use adapters::{GenerationError, JsonFileRepository, LmStudioClient};
pub use application::CharacterStore;
pub use domain::{
    format_prompt, parse_prompt, Catalog, Character, CharacterGenerator, CharacterRecord,
    DomainError, Gender, GenerationStrategy, PromptUpdate, Reasoning,
};
pub use ports::{
    CharacterRepository, ChatMessage, GenerationClient, MessageRole, DEFAULT_SYSTEM_PROMPT,
};
