//! Catalog - Vocabulary tables for character generation
//!
//! Catalogs are immutable `static` data handed to a
//! [`CharacterGenerator`](crate::domain::services::CharacterGenerator) at
//! construction. Two are built in:
//!
//! - [`Catalog::WEIGHTED`]: weighted backstories, polarized traits with
//!   mutually-exclusive pairs, and a trait influence table
//! - [`Catalog::CLASSIC`]: flat lists with no weighting or coupling

use super::value_objects::{Gender, GenerationStrategy};

/// A backstory together with its polarity weight (2 to 5)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedBackstory {
    pub text: &'static str,
    pub weight: f64,
}

/// Goals, emotions and needs suggested by a single trait
#[derive(Debug, Clone, Copy)]
pub struct TraitInfluence {
    pub trait_name: &'static str,
    pub goals: &'static [&'static str],
    pub emotions: &'static [&'static str],
    pub needs: &'static [&'static str],
}

/// Fields derived from traits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Goals,
    Needs,
    Emotions,
}

impl TraitInfluence {
    pub fn entries(&self, facet: Facet) -> &'static [&'static str] {
        match facet {
            Facet::Goals => self.goals,
            Facet::Needs => self.needs,
            Facet::Emotions => self.emotions,
        }
    }
}

/// Vocabulary a generator draws from
#[derive(Debug)]
pub struct Catalog {
    pub male_names: &'static [&'static str],
    pub female_names: &'static [&'static str],
    pub backstories: &'static [WeightedBackstory],
    pub positive_traits: &'static [&'static str],
    pub negative_traits: &'static [&'static str],
    /// Pairs that never appear together in one character
    pub conflicts: &'static [(&'static str, &'static str)],
    pub influences: &'static [TraitInfluence],
    /// Fallback lists used when no trait influence applies
    pub goals: &'static [&'static str],
    pub needs: &'static [&'static str],
    pub emotions: &'static [&'static str],
}

impl Catalog {
    pub const WEIGHTED: Catalog = Catalog {
        male_names: &[
            "John", "Alex", "Marcus", "Leo", "Ethan", "Liam", "Noah", "Oliver",
        ],
        female_names: &[
            "Sophia", "Luna", "Emma", "Ava", "Isla", "Olivia", "Amelia", "Mia",
        ],
        backstories: &[
            WeightedBackstory {
                text: "grew up in a small village",
                weight: 4.0,
            },
            WeightedBackstory {
                text: "grew up in a bustling city",
                weight: 3.0,
            },
            WeightedBackstory {
                text: "grew up in a medieval kingdom",
                weight: 2.0,
            },
            WeightedBackstory {
                text: "grew up in a futuristic colony",
                weight: 5.0,
            },
        ],
        positive_traits: &[
            // social
            "friendly",
            "charismatic",
            "cooperative",
            // intellectual
            "curious",
            "strategic",
            "innovative",
            // physical
            "brave",
            "adventurous",
            "athletic",
        ],
        negative_traits: &[
            "shy",
            "aggressive",
            "aloof",
            "cunning",
            "forgetful",
            "impatient",
            "lazy",
            "clumsy",
            "timid",
        ],
        conflicts: &[
            ("brave", "shy"),
            ("friendly", "aggressive"),
            ("optimistic", "pessimistic"),
            ("cooperative", "aloof"),
            ("curious", "impatient"),
            ("athletic", "lazy"),
        ],
        influences: &[
            TraitInfluence {
                trait_name: "brave",
                goals: &["explore the world", "master a skill"],
                emotions: &["confident", "excited"],
                needs: &["adventure"],
            },
            TraitInfluence {
                trait_name: "shy",
                goals: &["find companionship"],
                emotions: &["anxious", "lonely"],
                needs: &["companionship"],
            },
            TraitInfluence {
                trait_name: "friendly",
                goals: &["make friends"],
                emotions: &["happy"],
                needs: &["companionship"],
            },
            TraitInfluence {
                trait_name: "aggressive",
                goals: &["gain power"],
                emotions: &["angry"],
                needs: &["challenge"],
            },
            TraitInfluence {
                trait_name: "curious",
                goals: &["learn knowledge"],
                emotions: &["curious"],
                needs: &["knowledge"],
            },
            TraitInfluence {
                trait_name: "lazy",
                goals: &["relax"],
                emotions: &["bored"],
                needs: &["rest"],
            },
        ],
        goals: &[
            "find true love",
            "become wealthy",
            "explore the world",
            "master a skill",
        ],
        needs: &["food", "companionship", "adventure", "knowledge"],
        emotions: &["happy", "anxious", "curious", "lonely", "excited"],
    };

    pub const CLASSIC: Catalog = Catalog {
        male_names: &["John", "Alex", "Marcus", "Leo", "Ethan"],
        female_names: &["Sophia", "Emma", "Luna", "Ava", "Isla"],
        backstories: &[
            WeightedBackstory {
                text: "Grew up in a small rural town",
                weight: NEUTRAL_BACKSTORY_WEIGHT,
            },
            WeightedBackstory {
                text: "Raised in a crowded megacity",
                weight: NEUTRAL_BACKSTORY_WEIGHT,
            },
            WeightedBackstory {
                text: "Survived a harsh frontier upbringing",
                weight: NEUTRAL_BACKSTORY_WEIGHT,
            },
            WeightedBackstory {
                text: "Educated in elite academic institutions",
                weight: NEUTRAL_BACKSTORY_WEIGHT,
            },
        ],
        positive_traits: &[
            "brave",
            "curious",
            "analytical",
            "guarded",
            "empathetic",
            "ambitious",
            "cautious",
        ],
        negative_traits: &[],
        conflicts: &[],
        influences: &[],
        goals: &[
            "seek truth",
            "gain independence",
            "protect others",
            "achieve mastery",
        ],
        needs: &["security", "freedom", "connection", "recognition"],
        emotions: &["focused", "anxious", "hopeful", "conflicted"],
    };

    /// Built-in catalog matching a strategy
    pub fn for_strategy(strategy: GenerationStrategy) -> &'static Catalog {
        match strategy {
            GenerationStrategy::Weighted => &WEIGHTED_CATALOG,
            GenerationStrategy::Uniform => &CLASSIC_CATALOG,
        }
    }

    pub fn names_for(&self, gender: Gender) -> &'static [&'static str] {
        match gender {
            Gender::Male => self.male_names,
            Gender::Female => self.female_names,
        }
    }

    /// Positive traits first, then negative ones
    pub fn all_traits(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.positive_traits
            .iter()
            .chain(self.negative_traits.iter())
            .copied()
    }

    pub fn is_positive(&self, trait_name: &str) -> bool {
        self.positive_traits.iter().any(|&t| t == trait_name)
    }

    pub fn conflicts(&self, a: &str, b: &str) -> bool {
        self.conflicts
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    pub fn backstory_weight(&self, backstory: &str) -> Option<f64> {
        self.backstories
            .iter()
            .find(|entry| entry.text == backstory)
            .map(|entry| entry.weight)
    }

    pub fn influence(&self, trait_name: &str) -> Option<&'static TraitInfluence> {
        self.influences
            .iter()
            .find(|influence| influence.trait_name == trait_name)
    }

    pub fn fallback(&self, facet: Facet) -> &'static [&'static str] {
        match facet {
            Facet::Goals => self.goals,
            Facet::Needs => self.needs,
            Facet::Emotions => self.emotions,
        }
    }
}

/// Weight giving even odds to positive and negative traits
pub const NEUTRAL_BACKSTORY_WEIGHT: f64 = 2.5;

static WEIGHTED_CATALOG: Catalog = Catalog::WEIGHTED;
static CLASSIC_CATALOG: Catalog = Catalog::CLASSIC;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_are_symmetric() {
        let catalog = &Catalog::WEIGHTED;
        assert!(catalog.conflicts("brave", "shy"));
        assert!(catalog.conflicts("shy", "brave"));
        assert!(!catalog.conflicts("brave", "curious"));
    }

    #[test]
    fn test_backstory_weights_in_range() {
        for entry in Catalog::WEIGHTED.backstories {
            assert!((2.0..=5.0).contains(&entry.weight), "{}", entry.text);
        }
        assert_eq!(
            Catalog::WEIGHTED.backstory_weight("grew up in a futuristic colony"),
            Some(5.0)
        );
        assert_eq!(Catalog::WEIGHTED.backstory_weight("unknown"), None);
    }

    #[test]
    fn test_for_strategy() {
        let uniform = Catalog::for_strategy(GenerationStrategy::Uniform);
        assert!(uniform.conflicts.is_empty());
        assert_eq!(uniform.all_traits().count(), 7);

        let weighted = Catalog::for_strategy(GenerationStrategy::Weighted);
        assert_eq!(weighted.all_traits().count(), 18);
        assert!(weighted.influence("lazy").is_some());
    }
}
