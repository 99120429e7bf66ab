//! # healthdesk-assist
//!
//! The HealthDesk assistant surfaces, each a thin domain layer over
//! `healthdesk-rules`:
//!
//! 1. **Chat**: free-text replies from the chat rule table, with an
//!    append-only session history.
//! 2. **Disease predictor**: a validated symptom form matched against the
//!    disease table by set membership.
//! 3. **Treatment guide**: care plans by condition key or free-text keyword.
//! 4. **Claim parser**: regex extraction plus an ordered decision ladder
//!    producing a structured claim decision.
//! 5. **Document analyzer**: filename-driven canned analysis and a small
//!    upload/processing library.
//! 6. **Insights**: fixed sample datasets for the analytics dashboards.
//!
//! Nothing here is medical or insurance advice. Every answer is a canned
//! template chosen by keyword.

pub mod chat;
pub mod claim;
pub mod disease;
pub mod document;
pub mod history;
pub mod insights;
pub mod treatment;

pub use chat::{ChatAssistant, ChatSession, PendingReply};
pub use claim::ClaimParser;
pub use disease::{DiseasePredictor, PredictionForm, SymptomProfile};
pub use document::{format_file_size, upload_progress, DocumentAnalyzer, DocumentLibrary};
pub use history::History;
pub use insights::{claim_analytics, claim_insights, health_insights};
pub use treatment::TreatmentGuide;
