//! Generation Client Port
//!
//! Abstract interface for remote character generation through a chat
//! completion model. Implementations swallow their own failures: callers
//! only ever see "no models" or "no character".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::CharacterRecord;

/// Instruction sent as the user turn of every generation request
pub const GENERATE_INSTRUCTION: &str = "Generate a complete character.";

/// System prompt used when the caller has none of its own
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You create characters for role-play prompts.
Reply with a single JSON object and nothing else, using exactly these keys:
\"gender\" (\"male\" or \"female\"), \"name\" (string), \"age\" (integer from 18 to 50),
\"traits\" (array of three short personality adjectives), \"backstory\" (short phrase),
\"goals\" (short phrase), \"needs\" (one or two words), \"emotions\" (one or two words),
and \"reasoning\" (object explaining how the backstory shaped the other fields).
Do not end phrases with a period.";

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Remote character generation interface
///
/// # Example
///
/// ```rust,ignore
/// use chargen::ports::GenerationClient;
///
/// struct CannedClient(CharacterRecord);
///
/// #[async_trait]
/// impl GenerationClient for CannedClient {
///     async fn list_models(&self) -> Vec<String> {
///         vec!["canned".into()]
///     }
///     async fn generate_character(&self, _: &str, _: &str) -> Option<CharacterRecord> {
///         Some(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Model ids the service offers; empty on any failure
    async fn list_models(&self) -> Vec<String>;

    /// Ask `model` for a character; `None` on any failure
    async fn generate_character(
        &self,
        model: &str,
        system_prompt: &str,
    ) -> Option<CharacterRecord>;

    /// First offered model, if any
    async fn first_model(&self) -> Option<String> {
        self.list_models().await.into_iter().next()
    }
}
