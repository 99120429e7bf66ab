//! Rule tables and the first-match-wins responder.
//!
//! Evaluation algorithm:
//!
//! 1. Iterate entries in declaration order.
//! 2. The first entry whose predicate holds for the subject wins.
//! 3. Its reply is resolved: a fixed output is cloned, a candidate set is
//!    sampled once through the caller's [`RandomSource`].
//! 4. The output is rendered against the subject's extracted facts.
//!
//! The final entry is always the fallback, so evaluation never fails.

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use healthdesk_contracts::error::{HealthdeskError, HealthdeskResult};

use crate::rule::{FallbackEntry, Predicate, Render, Reply, RuleEntry};
use crate::subject::{Subject, Text, NO_FACTS};

/// Source of uniform choices for candidate-set replies.
///
/// Any `rand::Rng` qualifies. Production wiring passes `rand::thread_rng()`;
/// tests pass a seeded `StdRng` to make selection reproducible.
pub trait RandomSource {
    /// Return an index in `0..len`. Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: rand::Rng> RandomSource for R {
    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// The top-level structure deserialized from a TOML rule file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig<O> {
    /// Ordered rules. First match wins.
    #[serde(default = "Vec::new")]
    pub rules: Vec<RuleEntry<O>>,
    pub fallback: FallbackEntry<O>,
}

/// The outcome of evaluating a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution<O> {
    /// Id of the entry that produced `output`.
    pub rule_id: String,
    /// True when no ordinary rule matched.
    pub fallback: bool,
    pub output: O,
}

/// An ordered, immutable list of rule entries ending in exactly one fallback.
#[derive(Debug, Clone)]
pub struct RuleTable<O> {
    name: String,
    entries: Vec<RuleEntry<O>>,
}

impl<O> RuleTable<O> {
    /// Build a table from `config`, appending the fallback as the last entry.
    ///
    /// Returns `HealthdeskError::ConfigError` if an ordinary rule uses
    /// `always` (it would shadow everything after it), if two entries share
    /// an id, or if any candidate set is empty.
    pub fn new(name: impl Into<String>, config: TableConfig<O>) -> HealthdeskResult<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(config.rules.len() + 1);

        for mut rule in config.rules {
            if rule.when.mentions_always() {
                return Err(config_error(
                    &name,
                    format!("rule '{}' uses 'always'; only the fallback may", rule.id),
                ));
            }
            check_entry(&name, &rule.id, &rule.reply, &mut seen)?;
            rule.when.fold_keywords();
            entries.push(rule);
        }

        let fallback = config.fallback;
        check_entry(&name, &fallback.id, &fallback.reply, &mut seen)?;
        entries.push(RuleEntry {
            id: fallback.id,
            description: "default when no rule matches".to_string(),
            when: Predicate::Always,
            reply: fallback.reply,
        });

        Ok(Self { name, entries })
    }

    /// Parse `s` as a TOML `TableConfig` and build the table.
    pub fn from_toml_str(name: impl Into<String>, s: &str) -> HealthdeskResult<Self>
    where
        O: DeserializeOwned,
    {
        let name = name.into();
        let config: TableConfig<O> = toml::from_str(s).map_err(|e| HealthdeskError::ConfigError {
            reason: format!("failed to parse rule table '{}': {}", name, e),
        })?;
        Self::new(name, config)
    }

    /// Read the file at `path` and parse it as a TOML rule table.
    pub fn from_file(name: impl Into<String>, path: &Path) -> HealthdeskResult<Self>
    where
        O: DeserializeOwned,
    {
        let contents = std::fs::read_to_string(path).map_err(|e| HealthdeskError::ConfigError {
            reason: format!("failed to read rule file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(name, &contents)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All entries in evaluation order. The last one is the fallback.
    pub fn entries(&self) -> &[RuleEntry<O>] {
        &self.entries
    }

    /// Number of entries, fallback included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a table holds at least its fallback.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the first entry whose predicate holds for `subject`.
    pub fn select<S: Subject + ?Sized>(&self, subject: &S) -> &RuleEntry<O> {
        let last = self.entries.len() - 1;
        self.entries
            .iter()
            .find(|entry| entry.when.test(subject))
            .unwrap_or(&self.entries[last])
    }
}

impl<O: Clone + Render> RuleTable<O> {
    /// Evaluate `subject` and return the winning entry's rendered output.
    pub fn evaluate<S: Subject + ?Sized>(
        &self,
        subject: &S,
        rng: &mut dyn RandomSource,
    ) -> Resolution<O> {
        let entry = self.select(subject);
        let fallback = matches!(entry.when, Predicate::Always);

        if fallback {
            info!(table = %self.name, rule_id = %entry.id, "no rule matched; using fallback");
        } else {
            debug!(table = %self.name, rule_id = %entry.id, "rule matched");
        }

        let chosen = match &entry.reply {
            Reply::Fixed(output) => output,
            Reply::OneOf(candidates) => &candidates[rng.pick(candidates.len())],
        };

        Resolution {
            rule_id: entry.id.clone(),
            fallback,
            output: chosen.render(subject.facts().unwrap_or(&NO_FACTS)),
        }
    }

    /// Case-fold `raw` and evaluate it as free text without extracted facts.
    pub fn respond(&self, raw: &str, rng: &mut dyn RandomSource) -> Resolution<O> {
        self.evaluate(&Text::new(raw), rng)
    }
}

fn check_entry<O>(
    table: &str,
    id: &str,
    reply: &Reply<O>,
    seen: &mut HashSet<String>,
) -> HealthdeskResult<()> {
    if !seen.insert(id.to_string()) {
        return Err(config_error(table, format!("duplicate rule id '{}'", id)));
    }
    if let Reply::OneOf(candidates) = reply {
        if candidates.is_empty() {
            return Err(config_error(table, format!("rule '{}' has an empty candidate set", id)));
        }
    }
    Ok(())
}

fn config_error(table: &str, reason: String) -> HealthdeskError {
    HealthdeskError::ConfigError {
        reason: format!("rule table '{}': {}", table, reason),
    }
}
