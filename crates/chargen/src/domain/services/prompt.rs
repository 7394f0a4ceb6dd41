//! Prompt rendering and parsing
//!
//! [`format_prompt`] renders a character into its fixed role-play template.
//! [`parse_prompt`] reads (possibly hand-edited) template text back into a
//! [`PromptUpdate`]; for every character the generator can produce, parsing
//! the formatted prompt yields every field unchanged.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::entities::Character;
use crate::domain::value_objects::Gender;

const IDENTITY_PREFIX: &str = "You are";
const TRAITS_PREFIX: &str = "Personality traits:";
const BACKSTORY_PREFIX: &str = "Backstory:";
const GOALS_PREFIX: &str = "Goals:";
const EMOTIONS_PREFIX: &str = "Current feelings:";
const NEEDS_PREFIX: &str = "Needs:";
const CLOSING_LINE: &str = "Always behave as if you are real.";

/// Render a character as a role-play prompt
pub fn format_prompt(character: &Character) -> String {
    [
        format!(
            "{} {}, a {}-year-old {}.",
            IDENTITY_PREFIX, character.name, character.age, character.gender
        ),
        format!("{} {}.", TRAITS_PREFIX, character.traits.join(", ")),
        format!("{} {}.", BACKSTORY_PREFIX, character.backstory),
        format!("{} {}.", GOALS_PREFIX, character.goals),
        format!("{} {}.", EMOTIONS_PREFIX, character.emotions),
        format!("{} {}.", NEEDS_PREFIX, character.needs),
        CLOSING_LINE.to_string(),
    ]
    .join("\n")
}

/// Field-level edit recovered from prompt text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub traits: Option<Vec<String>>,
    pub backstory: Option<String>,
    pub goals: Option<String>,
    pub emotions: Option<String>,
    pub needs: Option<String>,
}

impl PromptUpdate {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Names of the fields this update assigns
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.age.is_some() {
            fields.push("age");
        }
        if self.gender.is_some() {
            fields.push("gender");
        }
        if self.traits.is_some() {
            fields.push("traits");
        }
        if self.backstory.is_some() {
            fields.push("backstory");
        }
        if self.goals.is_some() {
            fields.push("goals");
        }
        if self.emotions.is_some() {
            fields.push("emotions");
        }
        if self.needs.is_some() {
            fields.push("needs");
        }
        fields
    }

    /// Assign every present field; absent ones leave the character untouched
    pub fn apply_to(&self, character: &mut Character) {
        if let Some(name) = &self.name {
            character.name = name.clone();
        }
        if let Some(age) = self.age {
            character.age = age;
        }
        if let Some(gender) = self.gender {
            character.gender = gender;
        }
        if let Some(traits) = &self.traits {
            character.traits = traits.clone();
        }
        if let Some(backstory) = &self.backstory {
            character.backstory = backstory.clone();
        }
        if let Some(goals) = &self.goals {
            character.goals = goals.clone();
        }
        if let Some(emotions) = &self.emotions {
            character.emotions = emotions.clone();
        }
        if let Some(needs) = &self.needs {
            character.needs = needs.clone();
        }
    }
}

/// Parse prompt text line by line
///
/// Blank and unrecognized lines are skipped. An identity line that does not
/// fully match leaves name, age and gender unset. A field line whose value
/// is empty (or an age of 0) counts as malformed and leaves that field
/// unset, since a stored empty value would be re-randomized on load. When a
/// prefix repeats, the last well-formed occurrence wins.
pub fn parse_prompt(text: &str) -> PromptUpdate {
    let mut update = PromptUpdate::default();

    for line in text.lines().map(str::trim) {
        if line.starts_with(IDENTITY_PREFIX) {
            if let Some((name, age, gender)) = parse_identity(line) {
                update.name = Some(name);
                update.age = Some(age);
                update.gender = Some(gender);
            }
        } else if let Some(rest) = line.strip_prefix(TRAITS_PREFIX) {
            let traits: Vec<String> = field_value(rest)
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
            if !traits.is_empty() {
                update.traits = Some(traits);
            }
        } else if let Some(rest) = line.strip_prefix(BACKSTORY_PREFIX) {
            set_field(&mut update.backstory, rest);
        } else if let Some(rest) = line.strip_prefix(GOALS_PREFIX) {
            set_field(&mut update.goals, rest);
        } else if let Some(rest) = line.strip_prefix(EMOTIONS_PREFIX) {
            set_field(&mut update.emotions, rest);
        } else if let Some(rest) = line.strip_prefix(NEEDS_PREFIX) {
            set_field(&mut update.needs, rest);
        }
    }

    update
}

fn set_field(slot: &mut Option<String>, rest: &str) {
    let value = field_value(rest);
    if !value.is_empty() {
        *slot = Some(value);
    }
}

fn identity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^You are (\w+(?: \w+)?), a (\d+)-year-old (\w+)\.")
            .expect("identity pattern is a valid regex")
    })
}

fn parse_identity(line: &str) -> Option<(String, u32, Gender)> {
    let caps = identity_pattern().captures(line)?;
    let name = caps.get(1)?.as_str().to_string();
    let age = caps.get(2)?.as_str().parse::<u32>().ok().filter(|age| *age > 0)?;
    let gender = caps.get(3)?.as_str().parse().ok()?;
    Some((name, age, gender))
}

/// Trim, drop the template's trailing period, trim again
fn field_value(rest: &str) -> String {
    let value = rest.trim();
    value.strip_suffix('.').unwrap_or(value).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CharacterRecord;
    use crate::domain::services::CharacterGenerator;
    use crate::domain::value_objects::GenerationStrategy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mara() -> Character {
        let record: CharacterRecord = serde_json::from_str(
            r#"{"name":"Mara","age":29,"gender":"female","traits":["brave","curious","cautious"],"backstory":"Raised in a crowded megacity","goals":"seek truth","needs":"freedom","emotions":"hopeful"}"#,
        )
        .unwrap();
        Character::from_record(record)
    }

    fn assert_same_fields(a: &Character, b: &Character) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.age, b.age);
        assert_eq!(a.gender, b.gender);
        assert_eq!(a.traits, b.traits);
        assert_eq!(a.backstory, b.backstory);
        assert_eq!(a.goals, b.goals);
        assert_eq!(a.emotions, b.emotions);
        assert_eq!(a.needs, b.needs);
    }

    #[test]
    fn test_format_prompt_exact_text() {
        assert_eq!(
            format_prompt(&mara()),
            "You are Mara, a 29-year-old female.\n\
             Personality traits: brave, curious, cautious.\n\
             Backstory: Raised in a crowded megacity.\n\
             Goals: seek truth.\n\
             Current feelings: hopeful.\n\
             Needs: freedom.\n\
             Always behave as if you are real."
        );
    }

    #[test]
    fn test_round_trip_for_generated_characters() {
        for strategy in [GenerationStrategy::Weighted, GenerationStrategy::Uniform] {
            let generator = CharacterGenerator::new(strategy);
            for seed in 0..200 {
                let mut rng = StdRng::seed_from_u64(seed);
                let original = generator.generate(&mut rng);
                let mut target = generator.generate(&mut rng);

                target.apply_prompt(&original.format_prompt());
                assert_same_fields(&original, &target);
            }
        }
    }

    #[test]
    fn test_round_trip_with_double_newlines() {
        let original = mara();
        let mut target = Character::create_default();
        let spaced = original.format_prompt().replace('\n', "\n\n");

        target.apply_prompt(&spaced);
        assert_same_fields(&original, &target);
    }

    #[test]
    fn test_two_word_name() {
        let update = parse_prompt("You are Mara Vance, a 41-year-old male.");
        assert_eq!(update.name.as_deref(), Some("Mara Vance"));
        assert_eq!(update.age, Some(41));
        assert_eq!(update.gender, Some(Gender::Male));
    }

    #[test]
    fn test_malformed_identity_leaves_fields_unchanged() {
        let mut c = mara();
        let update = c.apply_prompt(
            "You are Mara, a twenty-year-old female.\n\
             You are Mara, a 30-year-old dragon.\n\
             Goals: sail north.",
        );

        assert_eq!(update.changed_fields(), vec!["goals"]);
        assert_eq!(c.name, "Mara");
        assert_eq!(c.age, 29);
        assert_eq!(c.gender, Gender::Female);
        assert_eq!(c.goals, "sail north");
    }

    #[test]
    fn test_unrecognized_lines_are_skipped() {
        let update = parse_prompt("Hello there\n\nMood: grim\nAlways behave as if you are real.");
        assert!(update.is_empty());
    }

    #[test]
    fn test_traits_drop_empty_entries() {
        let update = parse_prompt("  Personality traits: bold, , shy ,,calm.  ");
        assert_eq!(
            update.traits,
            Some(vec!["bold".to_string(), "shy".to_string(), "calm".to_string()])
        );
    }

    #[test]
    fn test_only_one_trailing_period_is_stripped() {
        let mut c = mara();
        c.backstory = "Apprenticed to Dr.".to_string();

        let update = parse_prompt(&format_prompt(&c));
        assert_eq!(update.backstory.as_deref(), Some("Apprenticed to Dr."));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let update = parse_prompt("Needs: rest.\nNeeds: food.");
        assert_eq!(update.needs.as_deref(), Some("food"));
    }

    #[test]
    fn test_empty_values_leave_fields_unchanged() {
        let mut c = mara();
        let update = c.apply_prompt(
            "You are Mara, a 0-year-old female.\n\
             Personality traits: , .\n\
             Goals: .\n\
             Needs:\n\
             Emotions: calm.",
        );

        assert_eq!(update.changed_fields(), vec!["emotions"]);
        assert_eq!(c.age, 29);
        assert_eq!(c.traits, vec!["brave", "curious", "cautious"]);
        assert_eq!(c.goals, "seek truth");
        assert_eq!(c.needs, "freedom");
        assert_eq!(c.emotions, "calm");
    }

    #[test]
    fn test_empty_value_does_not_override_earlier_line() {
        let update = parse_prompt("Goals: sail north.\nGoals: .");
        assert_eq!(update.goals.as_deref(), Some("sail north"));
    }
}
