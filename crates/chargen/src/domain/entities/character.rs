//! Character - Generated role-play profile
//!
//! A `Character` is always complete: every field holds a value. The flat,
//! all-optional [`CharacterRecord`] is what crosses the persistence and
//! remote-generation boundaries; missing record fields are filled by a
//! [`CharacterGenerator`] when the record becomes a `Character`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::services::{prompt, CharacterGenerator, PromptUpdate};
use crate::domain::value_objects::Gender;

/// Free-form rationale supplied by a remote generation source
pub type Reasoning = Map<String, Value>;

/// Character - A generated profile used to seed a role-play prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub(crate) id: String,
    pub gender: Gender,
    pub name: String,
    pub age: u32,
    pub traits: Vec<String>,
    pub backstory: String,
    pub goals: String,
    pub needs: String,
    pub emotions: String,
    pub reasoning: Option<Reasoning>,
}

/// Field record - flat serializable form of a Character
///
/// Every field is optional so the same type can describe a stored
/// character, a partial one, or whatever a remote model returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Reasoning>,
}

impl Character {
    /// Create a fully randomized character with the default generator
    pub fn create_default() -> Self {
        CharacterGenerator::default().generate(&mut rand::thread_rng())
    }

    /// Build a character from a field record, randomizing only missing fields
    pub fn from_record(record: CharacterRecord) -> Self {
        CharacterGenerator::default().complete(record, &mut rand::thread_rng())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// First eight characters of the id, for listings
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    pub fn to_record(&self) -> CharacterRecord {
        CharacterRecord {
            id: Some(self.id.clone()),
            gender: Some(self.gender),
            name: Some(self.name.clone()),
            age: Some(self.age),
            traits: Some(self.traits.clone()),
            backstory: Some(self.backstory.clone()),
            goals: Some(self.goals.clone()),
            needs: Some(self.needs.clone()),
            emotions: Some(self.emotions.clone()),
            reasoning: self.reasoning.clone(),
        }
    }

    /// Render the role-play prompt
    pub fn format_prompt(&self) -> String {
        prompt::format_prompt(self)
    }

    /// Parse edited prompt text and assign every recognized field
    ///
    /// Returns the update that was applied so callers can tell which
    /// fields the text touched.
    pub fn apply_prompt(&mut self, text: &str) -> PromptUpdate {
        let update = prompt::parse_prompt(text);
        update.apply_to(self);
        update
    }
}

impl From<&Character> for CharacterRecord {
    fn from(character: &Character) -> Self {
        character.to_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mara_record() -> CharacterRecord {
        serde_json::from_str(
            r#"{"name":"Mara","age":29,"gender":"female","traits":["brave","curious","cautious"],"backstory":"Raised in a crowded megacity","goals":"seek truth","needs":"freedom","emotions":"hopeful"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_full_record_keeps_every_field() {
        let mut record = mara_record();
        record.id = Some("mara-1".to_string());

        let character = Character::from_record(record.clone());
        assert_eq!(character.id(), "mara-1");
        assert_eq!(character.to_record(), record);
    }

    #[test]
    fn test_from_record_assigns_id_when_missing() {
        let a = Character::from_record(mara_record());
        let b = Character::from_record(mara_record());
        assert!(!a.id().is_empty());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name, "Mara");
    }

    #[test]
    fn test_record_skips_absent_reasoning() {
        let character = Character::from_record(mara_record());
        let json = serde_json::to_value(character.to_record()).unwrap();
        assert!(json.get("reasoning").is_none());
        assert_eq!(json["age"], 29);
        assert_eq!(json["gender"], "female");
    }

    #[test]
    fn test_reasoning_survives_round_trip() {
        let mut record = mara_record();
        let mut reasoning = Reasoning::new();
        reasoning.insert("traits".to_string(), Value::from("fits a city upbringing"));
        record.reasoning = Some(reasoning.clone());

        let character = Character::from_record(record);
        assert_eq!(character.reasoning, Some(reasoning));
        assert!(character.to_record().reasoning.is_some());
    }

    #[test]
    fn test_short_id() {
        let mut record = mara_record();
        record.id = Some("abc".to_string());
        assert_eq!(Character::from_record(record).short_id(), "abc");

        let character = Character::create_default();
        assert_eq!(character.short_id().len(), 8);
    }
}
