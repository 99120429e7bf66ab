//! Regex extraction of structured fields from free text.
//!
//! An `Extractor` holds, per field, an ordered list of case-insensitive
//! patterns. The first pattern that matches supplies the field's value; later
//! patterns are alternatives, not additional values. Extraction is
//! deterministic: the same text always yields the same facts.

use regex::{Regex, RegexBuilder};

use healthdesk_contracts::error::{HealthdeskError, HealthdeskResult};

use crate::subject::Facts;

#[derive(Debug, Clone)]
struct FieldPattern {
    regex: Regex,
    group: usize,
}

/// Pulls named facts (age, city, procedure, ...) out of raw text.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    fields: Vec<(String, Vec<FieldPattern>)>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `pattern` as the next alternative for `field`, capturing `group`.
    ///
    /// Group 0 is the whole match.
    pub fn pattern(mut self, field: &str, pattern: &str, group: usize) -> HealthdeskResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| HealthdeskError::ConfigError {
                reason: format!("invalid pattern for field '{}': {}", field, e),
            })?;

        if group >= regex.captures_len() {
            return Err(HealthdeskError::ConfigError {
                reason: format!(
                    "pattern for field '{}' has no capture group {}",
                    field, group
                ),
            });
        }

        let pattern = FieldPattern { regex, group };
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, patterns)) => patterns.push(pattern),
            None => self.fields.push((field.to_string(), vec![pattern])),
        }
        Ok(self)
    }

    /// Add a whole-word alternation over a fixed gazetteer of `terms`.
    pub fn gazetteer(self, field: &str, terms: &[&str]) -> HealthdeskResult<Self> {
        let alternation = alternation(field, terms)?;
        self.pattern(field, &format!(r"\b({})\b", alternation), 1)
    }

    /// Like [`gazetteer`](Self::gazetteer), but terms also match inside longer
    /// words: `"procedure"` is found in `"procedures"`, `"delhi"` in
    /// `"NewDelhi"`. The captured value is the term as written in the text.
    pub fn terms(self, field: &str, terms: &[&str]) -> HealthdeskResult<Self> {
        let alternation = alternation(field, terms)?;
        self.pattern(field, &format!("({})", alternation), 1)
    }

    /// Run every field's patterns over `text`.
    ///
    /// Values keep the casing they had in `text`.
    pub fn extract(&self, text: &str) -> Facts {
        let mut facts = Facts::new();
        for (field, patterns) in &self.fields {
            let value = patterns.iter().find_map(|p| {
                p.regex
                    .captures(text)
                    .and_then(|caps| caps.get(p.group))
                    .map(|m| m.as_str().to_string())
            });
            if let Some(value) = value {
                facts.insert(field.clone(), value);
            }
        }
        facts
    }
}

fn alternation(field: &str, terms: &[&str]) -> HealthdeskResult<String> {
    if terms.is_empty() {
        return Err(HealthdeskError::ConfigError {
            reason: format!("gazetteer for field '{}' is empty", field),
        });
    }
    Ok(terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|"))
}
