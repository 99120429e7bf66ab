//! Treatment guide output.

use serde::{Deserialize, Serialize};

/// First-aid and home-care guidance for one condition category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    /// Category label, e.g. "Respiratory" or "First Aid".
    pub category: String,
    /// Ordered self-care steps.
    pub steps: Vec<String>,
    /// Things to avoid while following the steps.
    pub precautions: Vec<String>,
    /// Warning signs that mean professional care is needed.
    pub when_to_seek_help: Vec<String>,
}
