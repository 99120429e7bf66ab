//! Insurance claim decision types.
//!
//! A `ClaimDecision` is what the claim parser returns for a natural-language
//! query such as "46M, knee surgery, Pune, 3-month policy". Amounts are fixed
//! per decision branch.

use serde::{Deserialize, Serialize};

/// Outcome tier of a claim evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
    Pending,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
            Decision::Pending => "pending",
        }
    }
}

/// How strongly a policy clause bears on the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
}

/// A policy clause cited in support of a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseRef {
    /// Stable clause identifier, e.g. "ORTH-001".
    pub clause_id: String,
    pub text: String,
    pub relevance: Relevance,
}

/// Fields pulled out of the free-text query before the decision runs.
///
/// Missing fields are reported with the display defaults the claim surface
/// has always used ("unspecified", "not specified").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    pub age: Option<u32>,
    pub procedure: String,
    pub location: String,
    pub policy_duration: String,
}

/// The structured decision for one claim query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDecision {
    pub decision: Decision,
    /// Covered amount in rupees, when the branch grants one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    pub justification: String,
    /// Ordered clause references. A location clause, when present, is last.
    pub clauses: Vec<ClauseRef>,
    pub extracted_info: ExtractedInfo,
}
