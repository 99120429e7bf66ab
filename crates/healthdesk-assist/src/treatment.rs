//! Treatment guide.
//!
//! Two ways in: pick one of the five known conditions by key, or describe the
//! problem in free text and let the treatment rule table pick the plan by
//! keyword. Unrecognized descriptions get the general-care plan.

use serde::Serialize;
use tracing::warn;

use healthdesk_contracts::{
    error::{HealthdeskError, HealthdeskResult},
    treatment::TreatmentPlan,
};
use healthdesk_rules::{RandomSource, Reply, Resolution, RuleTable};

/// Embedded treatment rule table.
pub const TREATMENT_RULES: &str = include_str!("../rules/treatment.toml");

/// A selectable condition in the treatment picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub key: &'static str,
    pub label: &'static str,
}

/// The conditions offered in the picker. Keys match treatment rule ids.
pub const CONDITIONS: [Condition; 5] = [
    Condition { key: "common-cold", label: "Common Cold/Flu" },
    Condition { key: "headache", label: "Headache/Migraine" },
    Condition { key: "fever", label: "Fever" },
    Condition { key: "stomach-upset", label: "Stomach Upset/Nausea" },
    Condition { key: "minor-cuts", label: "Minor Cuts/Wounds" },
];

#[derive(Debug, Clone)]
pub struct TreatmentGuide {
    table: RuleTable<TreatmentPlan>,
}

impl TreatmentGuide {
    pub fn new() -> HealthdeskResult<Self> {
        Ok(Self {
            table: RuleTable::from_toml_str("treatment", TREATMENT_RULES)?,
        })
    }

    pub fn conditions(&self) -> &'static [Condition] {
        &CONDITIONS
    }

    /// Return the plan for a picker key such as `"fever"`.
    pub fn for_condition(&self, key: &str) -> HealthdeskResult<TreatmentPlan> {
        let known = CONDITIONS.iter().any(|c| c.key == key);
        let entry = self
            .table
            .entries()
            .iter()
            .find(|e| known && e.id == key)
            .ok_or_else(|| HealthdeskError::UnknownCondition {
                key: key.to_string(),
            })?;

        match &entry.reply {
            Reply::Fixed(plan) => Ok(plan.clone()),
            Reply::OneOf(plans) => plans.first().cloned().ok_or_else(|| {
                HealthdeskError::UnknownCondition {
                    key: key.to_string(),
                }
            }),
        }
    }

    /// Match a free-text description to a plan.
    pub fn suggest(
        &self,
        description: &str,
        rng: &mut dyn RandomSource,
    ) -> HealthdeskResult<Resolution<TreatmentPlan>> {
        if description.trim().is_empty() {
            warn!("treatment description rejected: empty input");
            return Err(HealthdeskError::EmptyInput {
                surface: "treatment guide".to_string(),
            });
        }
        Ok(self.table.respond(description, rng))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn suggest(text: &str) -> Resolution<TreatmentPlan> {
        TreatmentGuide::new()
            .unwrap()
            .suggest(text, &mut StdRng::seed_from_u64(9))
            .unwrap()
    }

    #[test]
    fn test_headache_precedes_nausea() {
        let resolved = suggest("I have a headache and feel nauseous");
        assert_eq!(resolved.rule_id, "headache");
        assert_eq!(resolved.output.category, "Neurological");
    }

    #[test]
    fn test_keyword_categories() {
        let cases = [
            ("Bad COUGH since Monday", "Respiratory"),
            ("running a fever", "General"),
            ("upset stomach after dinner", "Gastrointestinal"),
            ("a small wound on my hand", "First Aid"),
            ("my knee feels stiff", "General Care"),
        ];
        for (text, category) in cases {
            assert_eq!(suggest(text).output.category, category, "input: {text}");
        }
    }

    #[test]
    fn test_unmatched_description_is_general_care() {
        let resolved = suggest("I feel off today");
        assert!(resolved.fallback);
        assert_eq!(resolved.rule_id, "general-care");
        assert!(!resolved.output.when_to_seek_help.is_empty());
    }

    #[test]
    fn test_every_picker_condition_has_a_plan() {
        let guide = TreatmentGuide::new().unwrap();
        for condition in guide.conditions() {
            let plan = guide.for_condition(condition.key).unwrap();
            assert_eq!(plan.steps.len(), 6, "{}", condition.key);
            assert_eq!(plan.precautions.len(), 4, "{}", condition.key);
            assert_eq!(plan.when_to_seek_help.len(), 5, "{}", condition.key);
        }
        assert_eq!(guide.for_condition("minor-cuts").unwrap().category, "First Aid");
    }

    #[test]
    fn test_unknown_condition_key() {
        let guide = TreatmentGuide::new().unwrap();
        for key in ["sprain", "general-care"] {
            match guide.for_condition(key) {
                Err(HealthdeskError::UnknownCondition { key: got }) => assert_eq!(got, key),
                other => panic!("expected UnknownCondition, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_description_rejected() {
        let guide = TreatmentGuide::new().unwrap();
        assert!(matches!(
            guide.suggest(" ", &mut StdRng::seed_from_u64(9)),
            Err(HealthdeskError::EmptyInput { .. })
        ));
    }
}
