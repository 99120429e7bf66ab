//! Chat assistant.
//!
//! The assistant answers free text from the chat rule table. A `ChatSession`
//! wraps it with conversation history: submitting a message records it
//! immediately and returns a `PendingReply`, which the caller delivers after
//! whatever pacing it wants. Each pending reply is independent, so
//! overlapping submissions land in history in delivery order.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use healthdesk_contracts::{
    chat::{ChatMessage, Sender, SessionId},
    error::{HealthdeskError, HealthdeskResult},
};
use healthdesk_rules::{Extractor, RandomSource, Resolution, RuleTable, Text};

use crate::history::History;

/// Embedded chat rule table.
pub const CHAT_RULES: &str = include_str!("../rules/chat.toml");

/// First message of every session.
pub const WELCOME: &str = "Hello! I'm HealthDesk, your health and insurance assistant. \
I can help you process insurance queries, analyze policy documents, and point you to care guidance. \
Try asking about claim scenarios like '46-year-old male, knee surgery in Pune, 3-month policy' \
or upload documents for analysis!";

const CITIES: [&str; 10] = [
    "mumbai", "pune", "delhi", "bangalore", "chennai", "kolkata", "hyderabad", "ahmedabad",
    "jaipur", "lucknow",
];

const PROCEDURES: [&str; 9] = [
    "surgery",
    "operation",
    "treatment",
    "procedure",
    "therapy",
    "consultation",
    "checkup",
    "scan",
    "test",
];

/// Rule-table-backed chat responder.
#[derive(Debug, Clone)]
pub struct ChatAssistant {
    table: RuleTable<String>,
    extractor: Extractor,
}

impl ChatAssistant {
    /// Build the assistant from the embedded rule table.
    pub fn new() -> HealthdeskResult<Self> {
        Self::from_toml_str(CHAT_RULES)
    }

    /// Build the assistant from a custom TOML rule table.
    pub fn from_toml_str(s: &str) -> HealthdeskResult<Self> {
        Ok(Self {
            table: RuleTable::from_toml_str("chat", s)?,
            extractor: chat_extractor()?,
        })
    }

    /// Build the assistant from a TOML rule file on disk.
    pub fn from_file(path: &Path) -> HealthdeskResult<Self> {
        Ok(Self {
            table: RuleTable::from_file("chat", path)?,
            extractor: chat_extractor()?,
        })
    }

    /// Answer `input`.
    ///
    /// Returns `HealthdeskError::EmptyInput` for empty or whitespace-only
    /// text; every other string gets a reply.
    pub fn reply(
        &self,
        input: &str,
        rng: &mut dyn RandomSource,
    ) -> HealthdeskResult<Resolution<String>> {
        if input.trim().is_empty() {
            warn!("chat message rejected: empty input");
            return Err(HealthdeskError::EmptyInput {
                surface: "chat".to_string(),
            });
        }

        let subject = Text::new(input).with_facts(self.extractor.extract(input));
        Ok(self.table.evaluate(&subject, rng))
    }
}

fn chat_extractor() -> HealthdeskResult<Extractor> {
    Extractor::new()
        .pattern("age", r"(\d+)[-\s]?(year|yr|y|m|f|male|female)", 1)?
        .gazetteer("city", &CITIES)?
        .gazetteer("procedure", &PROCEDURES)
}

// ── Sessions ──────────────────────────────────────────────────────────────────

/// One conversation: an assistant plus its append-only history.
pub struct ChatSession {
    id: SessionId,
    assistant: Arc<ChatAssistant>,
    history: History,
}

impl ChatSession {
    /// Start a session whose history opens with the welcome message.
    pub fn start(assistant: Arc<ChatAssistant>) -> HealthdeskResult<Self> {
        let id = SessionId::new();
        let history = History::new(id.clone());
        history.append(Sender::Assistant, WELCOME)?;
        Ok(Self {
            id,
            assistant,
            history,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Record the user's message and compute the reply.
    ///
    /// Empty input is rejected before anything is recorded. The reply is not
    /// part of history until [`PendingReply::deliver`] is called.
    pub fn submit(
        &self,
        text: &str,
        rng: &mut dyn RandomSource,
    ) -> HealthdeskResult<PendingReply> {
        let resolution = self.assistant.reply(text, rng)?;
        self.history.append(Sender::User, text)?;
        Ok(PendingReply {
            history: self.history.clone(),
            rule_id: resolution.rule_id,
            text: resolution.output,
        })
    }

    /// All messages so far, in append order.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.messages()
    }
}

/// A computed reply that has not yet been appended to history.
#[derive(Debug)]
pub struct PendingReply {
    history: History,
    rule_id: String,
    text: String,
}

impl PendingReply {
    /// Id of the chat rule that produced this reply.
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Append the reply to the session history and return the stored message.
    pub fn deliver(self) -> HealthdeskResult<ChatMessage> {
        self.history.append(Sender::Assistant, self.text)
    }
}
