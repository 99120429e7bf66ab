//! Natural-language insurance claim parser.
//!
//! Pipeline for one query:
//!   1. Extract age, city, procedure and policy duration with regexes.
//!   2. Walk the decision ladder (knee/orthopedic → cardiac → dental →
//!      pending); the first matching branch fixes decision, amount,
//!      justification and clauses.
//!   3. Append the location clause when a city was extracted, whatever the
//!      branch.
//!
//! Amounts are literal per branch. Nothing here consults real policy terms.

use tracing::{debug, warn};

use healthdesk_contracts::{
    claim::{ClaimDecision, ClauseRef, Decision, ExtractedInfo, Relevance},
    error::{HealthdeskError, HealthdeskResult},
};
use healthdesk_rules::{
    render_template, Extractor, Facts, FallbackEntry, Predicate, RandomSource, Render, Reply,
    RuleEntry, RuleTable, TableConfig, Text,
};

const CITIES: [&str; 7] = [
    "pune", "mumbai", "delhi", "bangalore", "chennai", "kolkata", "hyderabad",
];

const PROCEDURES: [&str; 4] = ["surgery", "operation", "procedure", "treatment"];

/// Oldest age eligible for full orthopedic cover.
const MAX_ORTHO_AGE: u32 = 64;

/// One rung of the decision ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimBranch {
    pub decision: Decision,
    pub amount: Option<u64>,
    pub justification: String,
    pub clauses: Vec<ClauseRef>,
}

impl Render for ClaimBranch {
    fn render(&self, facts: &Facts) -> Self {
        Self {
            justification: render_template(&self.justification, facts),
            clauses: self
                .clauses
                .iter()
                .map(|c| ClauseRef {
                    text: render_template(&c.text, facts),
                    ..c.clone()
                })
                .collect(),
            ..self.clone()
        }
    }
}

/// Parses a free-text claim query into a structured decision.
#[derive(Debug, Clone)]
pub struct ClaimParser {
    table: RuleTable<ClaimBranch>,
    extractor: Extractor,
}

impl ClaimParser {
    pub fn new() -> HealthdeskResult<Self> {
        Ok(Self {
            table: decision_table()?,
            extractor: claim_extractor()?,
        })
    }

    /// Pull age, city, procedure and policy duration out of `query`.
    pub fn extract(&self, query: &str) -> Facts {
        self.extractor.extract(query)
    }

    /// Evaluate `query` and return the structured decision.
    ///
    /// Returns `HealthdeskError::EmptyInput` for empty or whitespace-only
    /// queries. Any other text yields a decision.
    pub fn evaluate(
        &self,
        query: &str,
        rng: &mut dyn RandomSource,
    ) -> HealthdeskResult<ClaimDecision> {
        if query.trim().is_empty() {
            warn!("claim query rejected: empty input");
            return Err(HealthdeskError::EmptyInput {
                surface: "claim parser".to_string(),
            });
        }

        let facts = self.extract(query);
        let subject = Text::new(query).with_facts(facts.clone());

        let resolution = self.table.evaluate(&subject, rng);
        let branch = resolution.output;

        let mut clauses = branch.clauses;
        if let Some(city) = facts.get("city") {
            clauses.push(ClauseRef {
                clause_id: "GEO-002".to_string(),
                text: format!(
                    "Procedures performed in Tier-1 cities like {} are eligible for enhanced coverage rates.",
                    city
                ),
                relevance: Relevance::Medium,
            });
        }

        debug!(
            rule_id = %resolution.rule_id,
            decision = branch.decision.as_str(),
            clause_count = clauses.len(),
            "claim evaluated"
        );

        Ok(ClaimDecision {
            decision: branch.decision,
            amount: branch.amount,
            justification: branch.justification,
            clauses,
            extracted_info: extracted_info(&facts),
        })
    }
}

fn extracted_info(facts: &Facts) -> ExtractedInfo {
    ExtractedInfo {
        age: facts.get("age").and_then(|a| a.parse().ok()),
        procedure: facts.get("procedure").unwrap_or("unspecified").to_string(),
        location: facts.get("city").unwrap_or("not specified").to_string(),
        policy_duration: facts.get("duration").unwrap_or("not specified").to_string(),
    }
}

fn claim_extractor() -> HealthdeskResult<Extractor> {
    Extractor::new()
        .pattern("age", r"(\d+)[-\s]*(year|yr|y)", 1)?
        .pattern("age", r"(\d+)m", 1)?
        .terms("city", &CITIES)?
        .terms("procedure", &PROCEDURES)?
        .pattern("duration", r"(\d+)[-\s]*(month|day|year)", 0)
}

// ── Decision ladder ───────────────────────────────────────────────────────────

fn clause(id: &str, text: &str, relevance: Relevance) -> ClauseRef {
    ClauseRef {
        clause_id: id.to_string(),
        text: text.to_string(),
        relevance,
    }
}

fn branch(
    decision: Decision,
    amount: Option<u64>,
    justification: &str,
    clauses: Vec<ClauseRef>,
) -> Reply<ClaimBranch> {
    Reply::Fixed(ClaimBranch {
        decision,
        amount,
        justification: justification.to_string(),
        clauses,
    })
}

fn ortho_clauses() -> Vec<ClauseRef> {
    vec![
        clause(
            "ORTH-001",
            "Orthopedic procedures including knee surgery are covered after a 3-month waiting period, unless deemed emergency.",
            Relevance::High,
        ),
        clause(
            "AGE-002",
            "Patients below 65 years are eligible for full orthopedic coverage with emergency provisions.",
            Relevance::High,
        ),
    ]
}

/// Build the ordered decision ladder. Order is significant: the knee branches
/// precede cardiac, which precedes dental.
pub fn decision_table() -> HealthdeskResult<RuleTable<ClaimBranch>> {
    let orthopedic = Predicate::contains_any(&["knee", "orthopedic"]);
    let emergency = Predicate::contains_any(&["emergency", "urgent"]);
    let waiting_period = Predicate::contains_any(&["3-month", "3 month"]);
    let eligible_age = Predicate::FactRange {
        fact: "age".to_string(),
        min: Some(1),
        max: Some(MAX_ORTHO_AGE),
    };

    let rules = vec![
        RuleEntry::new(
            "ortho-covered",
            Predicate::All(vec![
                orthopedic.clone(),
                eligible_age,
                Predicate::Any(vec![emergency.clone(), waiting_period.clone().negate()]),
            ]),
            branch(
                Decision::Approved,
                Some(45_000),
                "Knee surgery approved for {age}-year-old patient. Coverage includes orthopedic procedures with emergency waiver applied.",
                ortho_clauses(),
            ),
        ),
        RuleEntry::new(
            "ortho-waiting-period",
            Predicate::All(vec![orthopedic.clone(), waiting_period, emergency.negate()]),
            branch(
                Decision::Rejected,
                None,
                "Claim rejected due to 3-month waiting period for non-emergency orthopedic procedures.",
                ortho_clauses(),
            ),
        ),
        RuleEntry::new(
            "ortho-partial",
            orthopedic,
            branch(
                Decision::Approved,
                Some(35_000),
                "Partial coverage approved based on policy terms and patient profile.",
                ortho_clauses(),
            ),
        ),
        RuleEntry::new(
            "cardiac",
            Predicate::contains_any(&["cardiac", "heart"]),
            branch(
                Decision::Approved,
                Some(75_000),
                "Cardiac procedures are covered under critical illness benefits with immediate effect.",
                vec![clause(
                    "CARD-001",
                    "All cardiac procedures are covered immediately upon policy activation with no waiting period.",
                    Relevance::High,
                )],
            ),
        ),
        RuleEntry::new(
            "dental",
            Predicate::contains_any(&["dental", "tooth"]),
            branch(
                Decision::Rejected,
                None,
                "Dental procedures require specific dental coverage add-on not present in current policy.",
                vec![clause(
                    "DENT-001",
                    "Dental procedures are excluded unless specific dental coverage is purchased as add-on.",
                    Relevance::High,
                )],
            ),
        ),
    ];

    let fallback = FallbackEntry {
        id: "insufficient-information".to_string(),
        reply: branch(
            Decision::Pending,
            None,
            "Insufficient information provided. Please specify procedure type, patient age, and medical necessity.",
            vec![clause(
                "GEN-001",
                "All claims require complete medical information for processing and approval.",
                Relevance::Medium,
            )],
        ),
    };

    RuleTable::new("claim", TableConfig { rules, fallback })
}
