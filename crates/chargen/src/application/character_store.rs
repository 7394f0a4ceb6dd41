//! Character Store (Use Cases)
//!
//! Owns the ordered character collection for one process and keeps the
//! repository in step with it: every mutation saves the full collection
//! immediately. If a save fails the in-memory change is rolled back, so
//! memory never runs ahead of disk.

use rand::Rng;

use crate::domain::{
    Character, CharacterGenerator, CharacterRecord, DomainError, PromptUpdate,
};
use crate::ports::{CharacterRepository, GenerationClient};

/// Persistence manager for characters
pub struct CharacterStore<R: CharacterRepository> {
    repo: R,
    generator: CharacterGenerator,
    characters: Vec<Character>,
}

impl<R: CharacterRepository> CharacterStore<R> {
    /// Open the store and load whatever the repository holds
    pub fn open(repo: R, generator: CharacterGenerator) -> Result<Self, DomainError> {
        let mut store = Self {
            repo,
            generator,
            characters: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Replace the in-memory collection with the repository contents
    ///
    /// Records missing fields are completed by the generator. Duplicate ids
    /// are rejected and leave the current collection untouched.
    pub fn load(&mut self) -> Result<&[Character], DomainError> {
        let records = self.repo.load()?;
        let mut rng = rand::thread_rng();
        let mut characters: Vec<Character> = Vec::with_capacity(records.len());

        for record in records {
            let character = self.generator.complete(record, &mut rng);
            if characters.iter().any(|c| c.id() == character.id()) {
                return Err(DomainError::Conflict(format!(
                    "stored data contains id {} more than once",
                    character.id()
                )));
            }
            characters.push(character);
        }

        self.characters = characters;
        Ok(&self.characters)
    }

    /// Write the full collection
    pub fn save(&self) -> Result<(), DomainError> {
        let records: Vec<CharacterRecord> =
            self.characters.iter().map(Character::to_record).collect();
        self.repo.save(&records)
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id() == id)
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve(&self, id_or_prefix: &str) -> Result<&Character, DomainError> {
        if let Some(character) = self.get(id_or_prefix) {
            return Ok(character);
        }
        if id_or_prefix.is_empty() {
            return Err(DomainError::Validation("character id is empty".to_string()));
        }

        let mut matches = self
            .characters
            .iter()
            .filter(|c| c.id().starts_with(id_or_prefix));

        match (matches.next(), matches.next()) {
            (Some(character), None) => Ok(character),
            (Some(_), Some(_)) => Err(DomainError::Validation(format!(
                "id prefix {} matches more than one character",
                id_or_prefix
            ))),
            (None, _) => Err(DomainError::not_found("Character", id_or_prefix)),
        }
    }

    /// Append a character and save
    pub fn add(&mut self, character: Character) -> Result<&Character, DomainError> {
        if self.get(character.id()).is_some() {
            return Err(DomainError::duplicate_id(character.id()));
        }

        self.characters.push(character);
        if let Err(err) = self.save() {
            self.characters.pop();
            return Err(err);
        }

        let added = &self.characters[self.characters.len() - 1];
        tracing::info!("Added character: {} ({})", added.name, added.id());
        Ok(added)
    }

    /// Generate a fully random character, append it and save
    pub fn generate<G: Rng + ?Sized>(&mut self, rng: &mut G) -> Result<&Character, DomainError> {
        let character = self.generator.generate(rng);
        self.add(character)
    }

    /// Ask a remote model for a character, complete it and save
    ///
    /// `Ok(None)` means the client had nothing to offer; the store is then
    /// left exactly as it was. Any id the model invented is replaced.
    pub async fn add_generated<C: GenerationClient + ?Sized>(
        &mut self,
        client: &C,
        model: &str,
        system_prompt: &str,
    ) -> Result<Option<&Character>, DomainError> {
        let Some(mut record) = client.generate_character(model, system_prompt).await else {
            tracing::warn!(model, "No character returned by generation client");
            return Ok(None);
        };

        if let Some(remote_id) = record.id.take() {
            tracing::debug!(remote_id = %remote_id, "Discarding id supplied by the model");
        }

        let character = self.generator.complete(record, &mut rand::thread_rng());
        self.add(character).map(Some)
    }

    /// Remove every character with `id` and save
    ///
    /// Returns how many were removed. An unknown id is a no-op that does
    /// not touch the repository.
    pub fn remove(&mut self, id: &str) -> Result<usize, DomainError> {
        let before = self.characters.len();
        if !self.characters.iter().any(|c| c.id() == id) {
            return Ok(0);
        }

        let snapshot = self.characters.clone();
        self.characters.retain(|c| c.id() != id);
        let removed = before - self.characters.len();

        if let Err(err) = self.save() {
            self.characters = snapshot;
            return Err(err);
        }

        tracing::info!("Removed character: {}", id);
        Ok(removed)
    }

    /// Parse edited prompt text into a character's fields and save
    pub fn apply_prompt_edit(&mut self, id: &str, text: &str) -> Result<PromptUpdate, DomainError> {
        let index = self
            .characters
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| DomainError::not_found("Character", id))?;

        let previous = self.characters[index].clone();
        let update = self.characters[index].apply_prompt(text);
        if update.is_empty() {
            return Ok(update);
        }

        if let Err(err) = self.save() {
            self.characters[index] = previous;
            return Err(err);
        }

        tracing::info!(
            fields = ?update.changed_fields(),
            "Updated character from prompt: {}",
            id
        );
        Ok(update)
    }

    /// Formatted prompts joined by a blank line
    ///
    /// With a non-empty `selected` list only those ids are included, in
    /// collection order.
    pub fn all_prompts(&self, selected: Option<&[String]>) -> String {
        self.characters
            .iter()
            .filter(|c| match selected {
                Some(ids) if !ids.is_empty() => ids.iter().any(|id| id == c.id()),
                _ => true,
            })
            .map(Character::format_prompt)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
