//! What a rule table evaluates against.
//!
//! A `Subject` answers two questions for predicates: "does the input contain
//! this keyword?" and "was this fact extracted?". Free text answers the first
//! with case-folded substring containment; form-derived subjects such as a
//! chosen symptom set answer it with set membership.

use std::collections::BTreeMap;

use serde::Serialize;

/// Named values pulled out of an input by an [`Extractor`](crate::Extractor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facts(BTreeMap<String, String>);

pub(crate) static NO_FACTS: Facts = Facts(BTreeMap::new());

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Input seen by rule predicates.
pub trait Subject {
    /// Return true if the input contains `keyword`.
    ///
    /// `keyword` is always lowercase; rule tables fold their keywords when
    /// they are built.
    fn contains(&self, keyword: &str) -> bool;

    /// Facts extracted from the input, if any.
    fn facts(&self) -> Option<&Facts> {
        None
    }

    fn fact(&self, name: &str) -> Option<&str> {
        self.facts().and_then(|f| f.get(name))
    }
}

/// Free-text input, normalized by case-folding only.
///
/// No tokenization, stemming, or stopword removal is applied: `"this"`
/// contains `"hi"`.
#[derive(Debug, Clone)]
pub struct Text {
    folded: String,
    facts: Facts,
}

impl Text {
    pub fn new(raw: &str) -> Self {
        Self {
            folded: raw.to_lowercase(),
            facts: Facts::new(),
        }
    }

    /// Attach extracted facts for fact predicates and template rendering.
    pub fn with_facts(mut self, facts: Facts) -> Self {
        self.facts = facts;
        self
    }

    /// The case-folded input.
    pub fn as_str(&self) -> &str {
        &self.folded
    }
}

impl Subject for Text {
    fn contains(&self, keyword: &str) -> bool {
        self.folded.contains(keyword)
    }

    fn facts(&self) -> Option<&Facts> {
        Some(&self.facts)
    }
}
