//! Feedback tiers derived from a similarity score

use serde::{Deserialize, Serialize};

/// Lower bounds, checked top-down; anything below the last bound is `Poor`
const THRESHOLDS: [(f64, Tier); 4] = [
    (0.90, Tier::Excellent),
    (0.80, Tier::Great),
    (0.60, Tier::Good),
    (0.30, Tier::Fair),
];

/// Discrete feedback bucket, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Poor,
    Fair,
    Good,
    Great,
    Excellent,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Excellent,
        Tier::Great,
        Tier::Good,
        Tier::Fair,
        Tier::Poor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::Great => "Great",
            Tier::Good => "Good",
            Tier::Fair => "Fair",
            Tier::Poor => "Poor",
        }
    }

    /// Whether the attempt counts as passed
    pub fn is_success(self) -> bool {
        self >= Tier::Good
    }

    /// Presentation ordinal, 0 (Poor) to 4 (Excellent)
    pub fn visual_weight(self) -> u8 {
        self as u8
    }

    /// Presentation colour (hex RGB)
    pub fn color(self) -> &'static str {
        match self {
            Tier::Excellent => "#10B981",
            Tier::Great => "#3B82F6",
            Tier::Good => "#F59E0B",
            Tier::Fair => "#F97316",
            Tier::Poor => "#EF4444",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tier descriptor reported for an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub tier: Tier,
    pub label: &'static str,
    pub is_success: bool,
    pub visual_weight: u8,
    pub color: &'static str,
}

impl From<Tier> for Feedback {
    fn from(tier: Tier) -> Self {
        Self {
            tier,
            label: tier.label(),
            is_success: tier.is_success(),
            visual_weight: tier.visual_weight(),
            color: tier.color(),
        }
    }
}

/// Map a similarity score to its feedback tier. NaN maps to `Poor`.
pub fn classify(score: f64) -> Feedback {
    let tier = THRESHOLDS
        .iter()
        .find(|(bound, _)| score >= *bound)
        .map(|&(_, tier)| tier)
        .unwrap_or(Tier::Poor);
    Feedback::from(tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(classify(1.0).tier, Tier::Excellent);
        assert_eq!(classify(0.90).tier, Tier::Excellent);
        assert_eq!(classify(0.8999).tier, Tier::Great);
        assert_eq!(classify(0.80).tier, Tier::Great);
        assert_eq!(classify(0.7999).tier, Tier::Good);
        assert_eq!(classify(0.60).tier, Tier::Good);
        assert_eq!(classify(0.5999).tier, Tier::Fair);
        assert_eq!(classify(0.30).tier, Tier::Fair);
        assert_eq!(classify(0.2999).tier, Tier::Poor);
        assert_eq!(classify(0.0).tier, Tier::Poor);
        assert_eq!(classify(f64::NAN).tier, Tier::Poor);
    }

    #[test]
    fn test_success_flag() {
        assert!(classify(0.95).is_success);
        assert!(classify(0.85).is_success);
        assert!(classify(0.60).is_success);
        assert!(!classify(0.45).is_success);
        assert!(!classify(0.1).is_success);
    }

    #[test]
    fn test_visual_weight_monotonic() {
        let weights: Vec<u8> = Tier::ALL.iter().map(|t| t.visual_weight()).collect();
        assert_eq!(weights, vec![4, 3, 2, 1, 0]);
        assert_eq!(classify(0.92).label, "Excellent");
        assert_eq!(classify(0.92).color, "#10B981");
    }
}
