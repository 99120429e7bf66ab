//! Disease predictor.
//!
//! Input is a fixed-field form rather than free text. Rules test set
//! membership over the checked symptoms; there is no weighting across
//! partially matching rules, the first full match wins.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use healthdesk_contracts::{
    diagnosis::Diagnosis,
    error::{HealthdeskError, HealthdeskResult},
};
use healthdesk_rules::{RandomSource, Resolution, RuleTable, Subject};

/// Embedded disease rule table.
pub const DISEASE_RULES: &str = include_str!("../rules/disease.toml");

/// The symptoms offered on the predictor form, in display order.
pub const SYMPTOM_CHECKLIST: [&str; 14] = [
    "Fever",
    "Headache",
    "Cough",
    "Sore throat",
    "Body aches",
    "Nausea",
    "Vomiting",
    "Diarrhea",
    "Fatigue",
    "Dizziness",
    "Shortness of breath",
    "Chest pain",
    "Abdominal pain",
    "Skin rash",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = HealthdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(invalid(format!("unknown gender '{}'", other))),
        }
    }
}

/// How long the symptoms have lasted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymptomDuration {
    #[serde(rename = "1-2 days")]
    OneToTwoDays,
    #[serde(rename = "3-7 days")]
    ThreeToSevenDays,
    #[serde(rename = "1-2 weeks")]
    OneToTwoWeeks,
    #[serde(rename = "more than 2 weeks")]
    MoreThanTwoWeeks,
}

impl SymptomDuration {
    pub const ALL: [SymptomDuration; 4] = [
        SymptomDuration::OneToTwoDays,
        SymptomDuration::ThreeToSevenDays,
        SymptomDuration::OneToTwoWeeks,
        SymptomDuration::MoreThanTwoWeeks,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SymptomDuration::OneToTwoDays => "1-2 days",
            SymptomDuration::ThreeToSevenDays => "3-7 days",
            SymptomDuration::OneToTwoWeeks => "1-2 weeks",
            SymptomDuration::MoreThanTwoWeeks => "more than 2 weeks",
        }
    }
}

impl FromStr for SymptomDuration {
    type Err = HealthdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.label() == wanted)
            .ok_or_else(|| invalid(format!("unknown duration '{}'", s.trim())))
    }
}

/// Self-reported intensity of the symptoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymptomSeverity {
    Mild,
    Moderate,
    Severe,
}

impl FromStr for SymptomSeverity {
    type Err = HealthdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(SymptomSeverity::Mild),
            "moderate" => Ok(SymptomSeverity::Moderate),
            "severe" => Ok(SymptomSeverity::Severe),
            other => Err(invalid(format!("unknown severity '{}'", other))),
        }
    }
}

/// The predictor form as submitted.
///
/// Age, gender and at least one symptom are required; duration and severity
/// are optional and do not influence the prediction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionForm {
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub symptoms: Vec<String>,
    pub duration: Option<SymptomDuration>,
    pub severity: Option<SymptomSeverity>,
}

/// The set of checked symptoms, case-folded.
///
/// As a rule subject, "contains" means set membership, so `"pain"` does not
/// match a checked "Chest pain".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomProfile(BTreeSet<String>);

impl SymptomProfile {
    /// Build a profile, rejecting anything not on [`SYMPTOM_CHECKLIST`].
    pub fn from_checklist<I, S>(symptoms: I) -> HealthdeskResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for symptom in symptoms {
            let folded = symptom.as_ref().trim().to_lowercase();
            if !SYMPTOM_CHECKLIST.iter().any(|s| s.to_lowercase() == folded) {
                return Err(invalid(format!("unknown symptom '{}'", symptom.as_ref().trim())));
            }
            set.insert(folded);
        }
        Ok(Self(set))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Subject for SymptomProfile {
    fn contains(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }
}

impl fmt::Display for SymptomProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(String::as_str).collect();
        write!(f, "{}", joined.join(", "))
    }
}

/// Rule-table-backed disease predictor.
#[derive(Debug, Clone)]
pub struct DiseasePredictor {
    table: RuleTable<Diagnosis>,
}

impl DiseasePredictor {
    pub fn new() -> HealthdeskResult<Self> {
        Ok(Self {
            table: RuleTable::from_toml_str("disease", DISEASE_RULES)?,
        })
    }

    /// Validate `form` and predict from its symptoms.
    pub fn predict(
        &self,
        form: &PredictionForm,
        rng: &mut dyn RandomSource,
    ) -> HealthdeskResult<Diagnosis> {
        let profile = validate(form)?;
        Ok(self.diagnose(&profile, rng).output)
    }

    /// Evaluate an already-validated symptom profile.
    pub fn diagnose(
        &self,
        profile: &SymptomProfile,
        rng: &mut dyn RandomSource,
    ) -> Resolution<Diagnosis> {
        let resolution = self.table.evaluate(profile, rng);
        debug!(
            symptoms = %profile,
            rule_id = %resolution.rule_id,
            confidence = resolution.output.confidence,
            "disease prediction"
        );
        resolution
    }
}

fn validate(form: &PredictionForm) -> HealthdeskResult<SymptomProfile> {
    let result = match (form.age, form.gender) {
        (None | Some(0), _) => Err(invalid("age is required".to_string())),
        (_, None) => Err(invalid("gender is required".to_string())),
        _ if form.symptoms.is_empty() => {
            Err(invalid("select at least one symptom".to_string()))
        }
        _ => SymptomProfile::from_checklist(&form.symptoms),
    };

    if let Err(e) = &result {
        warn!(error = %e, "prediction form rejected");
    }
    result
}

fn invalid(reason: String) -> HealthdeskError {
    HealthdeskError::InvalidForm { reason }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use healthdesk_contracts::diagnosis::SeverityTier;

    use super::*;

    fn form(symptoms: &[&str]) -> PredictionForm {
        PredictionForm {
            age: Some(34),
            gender: Some(Gender::Female),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            duration: Some(SymptomDuration::ThreeToSevenDays),
            severity: Some(SymptomSeverity::Moderate),
        }
    }

    fn predict(symptoms: &[&str]) -> Diagnosis {
        DiseasePredictor::new()
            .unwrap()
            .predict(&form(symptoms), &mut StdRng::seed_from_u64(1))
            .unwrap()
    }

    #[test]
    fn test_cold_flu_triad() {
        let diagnosis = predict(&["Fever", "Cough", "Sore throat"]);
        assert_eq!(diagnosis.disease, "Common Cold/Flu");
        assert_eq!(diagnosis.confidence, 85);
        assert_eq!(diagnosis.severity, SeverityTier::Medium);
    }

    #[test]
    fn test_chest_pain_is_high_severity() {
        let diagnosis = predict(&["Chest pain", "Shortness of breath"]);
        assert_eq!(diagnosis.severity, SeverityTier::High);
        assert_eq!(diagnosis.recommendations[0], "SEEK IMMEDIATE MEDICAL ATTENTION");
    }

    #[test]
    fn test_migraine_and_gastroenteritis() {
        assert_eq!(predict(&["headache", "NAUSEA", "Dizziness"]).disease, "Migraine");
        assert_eq!(
            predict(&["Abdominal pain", "Nausea", "Vomiting", "Fatigue"]).disease,
            "Gastroenteritis"
        );
    }

    /// With every symptom checked, the first rule in table order wins.
    #[test]
    fn test_first_rule_wins_over_later_matches() {
        assert_eq!(predict(&SYMPTOM_CHECKLIST).disease, "Common Cold/Flu");
    }

    #[test]
    fn test_partial_match_falls_back() {
        let diagnosis = predict(&["Fever", "Cough"]);
        assert_eq!(diagnosis.disease, "General Viral Infection");
        assert_eq!(diagnosis.confidence, 60);
        assert_eq!(diagnosis.severity, SeverityTier::Low);
    }

    #[test]
    fn test_profile_uses_membership_not_substring() {
        let profile = SymptomProfile::from_checklist(["Chest pain"]).unwrap();
        assert!(profile.contains("chest pain"));
        assert!(!profile.contains("pain"));
    }

    #[test]
    fn test_form_validation() {
        let predictor = DiseasePredictor::new().unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let mut missing_age = form(&["Fever"]);
        missing_age.age = None;
        let mut missing_gender = form(&["Fever"]);
        missing_gender.gender = None;
        let cases = [
            (missing_age, "age is required"),
            (missing_gender, "gender is required"),
            (form(&[]), "at least one symptom"),
            (form(&["Fever", "Hiccups"]), "unknown symptom 'Hiccups'"),
        ];

        for (form, expected) in cases {
            match predictor.predict(&form, &mut rng) {
                Err(HealthdeskError::InvalidForm { reason }) => {
                    assert!(reason.contains(expected), "got: {reason}")
                }
                other => panic!("expected InvalidForm, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_form_field_parsing() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(
            "More than 2 weeks".parse::<SymptomDuration>().unwrap(),
            SymptomDuration::MoreThanTwoWeeks
        );
        assert_eq!("severe".parse::<SymptomSeverity>().unwrap(), SymptomSeverity::Severe);
        assert!("often".parse::<SymptomDuration>().is_err());
    }
}
