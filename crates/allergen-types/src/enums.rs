//! Enumeration types for analysis output.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Risk tiers
// ---------------------------------------------------------------------------

/// Qualitative tier attached to a single-food risk score.
///
/// Serialized in lowercase (`"high"`, `"moderate"`, `"low"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum RiskLevel {
    /// Score below the moderate cut-off.
    Low,
    /// Score at or above the moderate cut-off but below the high cut-off.
    Moderate,
    /// Score at or above the high cut-off.
    High,
}

impl RiskLevel {
    /// Return the lowercase wire name of this tier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl core::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// The rule that produced a [`Recommendation`](crate::structs::Recommendation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RecommendationKind {
    /// One or more foods crossed the high-risk score.
    AllergyWarning,
    /// Recent meals cover too few distinct foods.
    Diversification,
    /// One symptom type keeps recurring.
    SymptomPattern,
}

/// Urgency of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Priority {
    /// Informational advice.
    Medium,
    /// Advice the user should act on promptly.
    High,
}
