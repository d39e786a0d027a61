//! Difficulty tiers and confidence labels

use serde::{Deserialize, Serialize};

use crate::impl_domain_label_conversions;

/// Difficulty tier requested from the generator
///
/// Ordered `Easy < Medium < Hard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// One tier harder, saturating at `Hard`
    pub fn escalate(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium | Self::Hard => Self::Hard,
        }
    }

    /// One tier easier, floored at `Easy`
    pub fn downgrade(self) -> Self {
        match self {
            Self::Hard => Self::Medium,
            Self::Medium | Self::Easy => Self::Easy,
        }
    }
}

impl Default for DifficultyTier {
    fn default() -> Self {
        Self::Medium
    }
}

impl_domain_label_conversions!(DifficultyTier {
    Easy => "easy",
    Medium => "medium",
    Hard => "hard",
});

/// How much history backs a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl_domain_label_conversions!(Confidence {
    Low => "low",
    Medium => "medium",
    High => "high",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalate_saturates() {
        assert_eq!(DifficultyTier::Easy.escalate(), DifficultyTier::Medium);
        assert_eq!(DifficultyTier::Medium.escalate(), DifficultyTier::Hard);
        assert_eq!(DifficultyTier::Hard.escalate(), DifficultyTier::Hard);
    }

    #[test]
    fn test_downgrade_floors() {
        assert_eq!(DifficultyTier::Hard.downgrade(), DifficultyTier::Medium);
        assert_eq!(DifficultyTier::Medium.downgrade(), DifficultyTier::Easy);
        assert_eq!(DifficultyTier::Easy.downgrade(), DifficultyTier::Easy);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&DifficultyTier::Hard).expect("serializes");
        assert_eq!(json, "\"hard\"");
        let parsed: Confidence = serde_json::from_str("\"medium\"").expect("deserializes");
        assert_eq!(parsed, Confidence::Medium);
    }

    #[test]
    fn test_ordering() {
        assert!(DifficultyTier::Easy < DifficultyTier::Hard);
        assert_eq!(DifficultyTier::ALL.iter().max(), Some(&DifficultyTier::Hard));
    }
}
