//! Fusion strategies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How backend outputs are combined into one answer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FusionStrategy {
    /// Call the primary backend only
    Basic,
    /// Call every backend and keep the most confident answer
    Ranked,
    /// Call every backend and blend confidences with the adaptive weights
    Weighted,
    /// Let the adaptive selector pick one backend
    #[default]
    Adaptive,
}

impl FusionStrategy {
    /// All strategies
    pub const ALL: [FusionStrategy; 4] = [
        FusionStrategy::Basic,
        FusionStrategy::Ranked,
        FusionStrategy::Weighted,
        FusionStrategy::Adaptive,
    ];

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Ranked => "ranked",
            Self::Weighted => "weighted",
            Self::Adaptive => "adaptive",
        }
    }

    /// Whether the strategy feeds the selector's performance accounting
    pub fn records_performance(&self) -> bool {
        !matches!(self, Self::Basic)
    }
}

impl fmt::Display for FusionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FusionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "ranked" => Ok(Self::Ranked),
            "weighted" => Ok(Self::Weighted),
            "adaptive" => Ok(Self::Adaptive),
            _ => Err(format!("Invalid fusion strategy: {}", s)),
        }
    }
}
