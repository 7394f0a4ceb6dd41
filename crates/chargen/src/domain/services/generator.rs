//! Character Generator
//!
//! Fills character fields from a [`Catalog`] according to a
//! [`GenerationStrategy`]. Randomness is always passed in, so callers
//! decide between `thread_rng()` and a seeded RNG.

use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::domain::catalog::{Catalog, Facet, NEUTRAL_BACKSTORY_WEIGHT};
use crate::domain::entities::{Character, CharacterRecord};
use crate::domain::value_objects::{Gender, GenerationStrategy};

/// Number of traits a generated character holds
pub const TRAIT_COUNT: usize = 3;

/// Draw budget for weighted trait sampling before falling back
pub const MAX_TRAIT_DRAWS: usize = 1000;

pub const AGE_RANGE: RangeInclusive<u32> = 18..=50;

const MAX_BACKSTORY_WEIGHT: f64 = 5.0;

/// Generates characters and completes partial records
#[derive(Debug, Clone, Copy)]
pub struct CharacterGenerator {
    strategy: GenerationStrategy,
    catalog: &'static Catalog,
}

impl Default for CharacterGenerator {
    fn default() -> Self {
        Self::new(GenerationStrategy::default())
    }
}

impl CharacterGenerator {
    /// Generator using the built-in catalog for `strategy`
    pub fn new(strategy: GenerationStrategy) -> Self {
        Self {
            strategy,
            catalog: Catalog::for_strategy(strategy),
        }
    }

    /// Swap in a different catalog
    pub fn with_catalog(mut self, catalog: &'static Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn strategy(&self) -> GenerationStrategy {
        self.strategy
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    /// Generate a fully randomized character
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Character {
        self.complete(CharacterRecord::default(), rng)
    }

    /// Turn a record into a character, randomizing only the missing fields
    ///
    /// Absent values, empty strings, an empty trait list and age 0 all
    /// count as missing.
    pub fn complete<R: Rng + ?Sized>(&self, record: CharacterRecord, rng: &mut R) -> Character {
        let id = present(record.id).unwrap_or_else(|| Uuid::new_v4().to_string());
        let gender = record
            .gender
            .unwrap_or_else(|| Gender::ALL[rng.gen_range(0..Gender::ALL.len())]);
        let name = present(record.name).unwrap_or_else(|| pick(self.catalog.names_for(gender), rng));
        let age = record
            .age
            .filter(|age| *age > 0)
            .unwrap_or_else(|| rng.gen_range(AGE_RANGE));

        let (backstory, weight) = match present(record.backstory) {
            Some(backstory) => {
                let weight = self
                    .catalog
                    .backstory_weight(&backstory)
                    .unwrap_or(NEUTRAL_BACKSTORY_WEIGHT);
                (backstory, weight)
            }
            None => self.pick_backstory(rng),
        };

        let traits = record
            .traits
            .filter(|traits| !traits.is_empty())
            .unwrap_or_else(|| self.generate_traits(weight, rng));

        let goals = present(record.goals)
            .unwrap_or_else(|| self.derive_field(Facet::Goals, &traits, rng));
        let needs = present(record.needs)
            .unwrap_or_else(|| self.derive_field(Facet::Needs, &traits, rng));
        let emotions = present(record.emotions)
            .unwrap_or_else(|| self.derive_field(Facet::Emotions, &traits, rng));

        Character {
            id,
            gender,
            name,
            age,
            traits,
            backstory,
            goals,
            needs,
            emotions,
            reasoning: record.reasoning,
        }
    }

    fn pick_backstory<R: Rng + ?Sized>(&self, rng: &mut R) -> (String, f64) {
        match self.catalog.backstories.choose(rng) {
            Some(entry) => (entry.text.to_string(), entry.weight),
            None => (String::new(), NEUTRAL_BACKSTORY_WEIGHT),
        }
    }

    /// Draw `TRAIT_COUNT` traits for a backstory of the given weight
    pub fn generate_traits<R: Rng + ?Sized>(&self, weight: f64, rng: &mut R) -> Vec<String> {
        match self.strategy {
            GenerationStrategy::Weighted => self.weighted_traits(weight, rng),
            GenerationStrategy::Uniform => {
                let candidates: Vec<&str> = self.catalog.all_traits().collect();
                candidates
                    .choose_multiple(rng, TRAIT_COUNT)
                    .map(|t| t.to_string())
                    .collect()
            }
        }
    }

    /// Rejection sampling biased by backstory weight
    ///
    /// Accepting a trait evicts any held trait it conflicts with. Sampling
    /// stops after `MAX_TRAIT_DRAWS`; any slots still open are filled from
    /// the shuffled pool of candidates that neither repeat nor conflict
    /// with a held trait.
    fn weighted_traits<R: Rng + ?Sized>(&self, weight: f64, rng: &mut R) -> Vec<String> {
        let pos_chance = (weight / MAX_BACKSTORY_WEIGHT).clamp(0.0, 1.0);
        let neg_chance = 1.0 - pos_chance;
        let candidates: Vec<&'static str> = self.catalog.all_traits().collect();

        let mut traits: Vec<&'static str> = Vec::with_capacity(TRAIT_COUNT);
        let mut draws = 0;

        while traits.len() < TRAIT_COUNT && draws < MAX_TRAIT_DRAWS {
            draws += 1;
            let Some(&candidate) = candidates.choose(rng) else {
                break;
            };
            if traits.contains(&candidate) {
                continue;
            }

            let chance = if self.catalog.is_positive(candidate) {
                pos_chance
            } else {
                neg_chance
            };
            if rng.gen::<f64>() < chance {
                traits.retain(|held| !self.catalog.conflicts(held, candidate));
                traits.push(candidate);
            }
        }

        if traits.len() < TRAIT_COUNT {
            tracing::warn!(
                draws,
                held = traits.len(),
                "Trait sampling hit its draw budget, filling from remaining pool"
            );

            let mut pool: Vec<&'static str> = candidates
                .iter()
                .copied()
                .filter(|candidate| !traits.contains(candidate))
                .collect();
            pool.shuffle(rng);

            for candidate in pool {
                if traits.len() >= TRAIT_COUNT {
                    break;
                }
                if traits.iter().any(|held| self.catalog.conflicts(held, candidate)) {
                    continue;
                }
                traits.push(candidate);
            }
        }

        traits.into_iter().map(String::from).collect()
    }

    /// Pick goals, needs or emotions, steered by traits when the strategy allows
    fn derive_field<R: Rng + ?Sized>(&self, facet: Facet, traits: &[String], rng: &mut R) -> String {
        if self.strategy == GenerationStrategy::Weighted {
            let influenced: Vec<&'static str> = traits
                .iter()
                .filter_map(|t| self.catalog.influence(t))
                .flat_map(|influence| influence.entries(facet).iter().copied())
                .collect();

            if !influenced.is_empty() {
                return pick(&influenced, rng);
            }
        }

        pick(self.catalog.fallback(facet), rng)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn pick<R: Rng + ?Sized>(options: &[&str], rng: &mut R) -> String {
    options
        .choose(rng)
        .map(|s| s.to_string())
        .unwrap_or_default()
}
