//! GenerationStrategy - How default character fields are drawn

use serde::{Deserialize, Serialize};

/// Generation strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStrategy {
    /// Backstory weight tilts trait polarity; traits steer goals, needs and emotions
    #[default]
    Weighted,
    /// Every field drawn independently and uniformly
    Uniform,
}

impl std::fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStrategy::Weighted => write!(f, "weighted"),
            GenerationStrategy::Uniform => write!(f, "uniform"),
        }
    }
}

impl std::str::FromStr for GenerationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weighted" => Ok(GenerationStrategy::Weighted),
            "uniform" => Ok(GenerationStrategy::Uniform),
            _ => Err(format!("Unknown generation strategy: {}", s)),
        }
    }
}
