//! Rule entry types and the predicate language.
//!
//! Rules are usually declared in TOML:
//!
//! ```toml
//! [[rules]]
//! id = "greeting"
//! when = { contains-any = ["hi", "hello", "hey"] }
//! reply = ["Hello!", "Hi there!", "Hey!"]
//!
//! [fallback]
//! reply = "Ask me anything."
//! ```
//!
//! `reply` is either a single value or an array of candidates; one candidate
//! is drawn uniformly at random each time the rule fires.

use serde::{Deserialize, Serialize};

use healthdesk_contracts::{diagnosis::Diagnosis, treatment::TreatmentPlan};

use crate::subject::{Facts, Subject};

/// A test over a [`Subject`].
///
/// Keyword comparisons are case-insensitive: keywords are folded when the
/// owning table is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Predicate {
    /// Always true. Reserved for the fallback entry.
    Always,
    /// True if the subject contains at least one keyword.
    ContainsAny(Vec<String>),
    /// True if the subject contains every keyword.
    ContainsAll(Vec<String>),
    /// True if the named fact was extracted.
    Fact(String),
    /// True if the named fact parses as an integer within `min..=max`.
    FactRange {
        fact: String,
        #[serde(default)]
        min: Option<u32>,
        #[serde(default)]
        max: Option<u32>,
    },
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn contains_any(keywords: &[&str]) -> Self {
        Predicate::ContainsAny(keywords.iter().map(|k| k.to_string()).collect())
    }

    pub fn contains_all(keywords: &[&str]) -> Self {
        Predicate::ContainsAll(keywords.iter().map(|k| k.to_string()).collect())
    }

    pub fn fact(name: &str) -> Self {
        Predicate::Fact(name.to_string())
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Evaluate against `subject`.
    pub fn test<S: Subject + ?Sized>(&self, subject: &S) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::ContainsAny(keywords) => keywords.iter().any(|k| subject.contains(k)),
            Predicate::ContainsAll(keywords) => keywords.iter().all(|k| subject.contains(k)),
            Predicate::Fact(name) => subject.fact(name).is_some(),
            Predicate::FactRange { fact, min, max } => subject
                .fact(fact)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .is_some_and(|n| min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)),
            Predicate::All(preds) => preds.iter().all(|p| p.test(subject)),
            Predicate::Any(preds) => preds.iter().any(|p| p.test(subject)),
            Predicate::Not(pred) => !pred.test(subject),
        }
    }

    /// Return true if this predicate is, or contains, `Always`.
    pub(crate) fn mentions_always(&self) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::All(preds) | Predicate::Any(preds) => {
                preds.iter().any(Predicate::mentions_always)
            }
            Predicate::Not(pred) => pred.mentions_always(),
            _ => false,
        }
    }

    /// Lowercase every keyword so matching is case-insensitive.
    pub(crate) fn fold_keywords(&mut self) {
        match self {
            Predicate::ContainsAny(keywords) | Predicate::ContainsAll(keywords) => {
                for k in keywords.iter_mut() {
                    *k = k.to_lowercase();
                }
            }
            Predicate::All(preds) | Predicate::Any(preds) => {
                preds.iter_mut().for_each(Predicate::fold_keywords)
            }
            Predicate::Not(pred) => pred.fold_keywords(),
            _ => {}
        }
    }
}

/// What a rule produces when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply<O> {
    /// Several candidates; one is drawn uniformly per evaluation.
    OneOf(Vec<O>),
    /// A single fixed output.
    Fixed(O),
}

/// One predicate/output pair within a rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry<O> {
    /// Stable identifier used in logs and in [`Resolution::rule_id`](crate::Resolution).
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub when: Predicate,
    pub reply: Reply<O>,
}

impl<O> RuleEntry<O> {
    pub fn new(id: impl Into<String>, when: Predicate, reply: Reply<O>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            when,
            reply,
        }
    }
}

/// The mandatory default entry of a table. Its predicate is implicitly `Always`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackEntry<O> {
    #[serde(default = "default_fallback_id")]
    pub id: String,
    pub reply: Reply<O>,
}

fn default_fallback_id() -> String {
    "fallback".to_string()
}

impl<O> FallbackEntry<O> {
    pub fn new(reply: Reply<O>) -> Self {
        Self {
            id: default_fallback_id(),
            reply,
        }
    }
}

// ── Templates ─────────────────────────────────────────────────────────────────

/// Outputs that can carry `{fact}` placeholders.
///
/// Rendering happens after a rule fires, using the subject's extracted facts.
pub trait Render {
    fn render(&self, facts: &Facts) -> Self;
}

impl Render for String {
    fn render(&self, facts: &Facts) -> Self {
        render_template(self, facts)
    }
}

/// Substitute `{name}` and `{name|fallback}` placeholders from `facts`.
///
/// A placeholder whose fact is missing and that has no fallback is left as
/// written. Braces that do not enclose a fact name are copied verbatim.
pub fn render_template(template: &str, facts: &Facts) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let inner = &after[..close];
        let (name, fallback) = match inner.split_once('|') {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (inner, None),
        };

        let is_name =
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

        match (is_name, facts.get(name), fallback) {
            (true, Some(value), _) => out.push_str(value),
            (true, None, Some(fallback)) => out.push_str(fallback),
            _ => {
                out.push('{');
                out.push_str(inner);
                out.push('}');
            }
        }

        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn render_all(lines: &[String], facts: &Facts) -> Vec<String> {
    lines.iter().map(|line| render_template(line, facts)).collect()
}

impl Render for Diagnosis {
    fn render(&self, facts: &Facts) -> Self {
        Self {
            disease: render_template(&self.disease, facts),
            reasoning: render_template(&self.reasoning, facts),
            recommendations: render_all(&self.recommendations, facts),
            ..self.clone()
        }
    }
}

impl Render for TreatmentPlan {
    fn render(&self, facts: &Facts) -> Self {
        Self {
            category: render_template(&self.category, facts),
            steps: render_all(&self.steps, facts),
            precautions: render_all(&self.precautions, facts),
            when_to_seek_help: render_all(&self.when_to_seek_help, facts),
        }
    }
}
