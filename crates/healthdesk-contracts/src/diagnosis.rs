//! Disease predictor output.
//!
//! Confidence values are literals attached to each rule, not computed scores.

use serde::{Deserialize, Serialize};

/// Urgency tier attached to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

impl SeverityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        }
    }
}

/// The structured result of a disease prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Display name of the predicted condition.
    pub disease: String,
    /// Confidence percentage, fixed per rule (60–85).
    pub confidence: u8,
    /// One-sentence explanation of why the rule fired.
    pub reasoning: String,
    pub severity: SeverityTier,
    /// Ordered advice. High-severity predictions lead with the emergency instruction.
    pub recommendations: Vec<String>,
}
