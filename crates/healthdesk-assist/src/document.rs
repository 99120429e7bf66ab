//! Document analyzer and library.
//!
//! Analysis never reads file contents. The filename alone picks a canned
//! template (lab report, prescription or general), a health-related flag and
//! the range a random clause count is drawn from.
//!
//! The library tracks each document through `Uploading` → `Processing` →
//! `Ready`. Pacing between steps belongs to the caller; `upload_progress`
//! yields the percentages a caller reports while it waits.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use healthdesk_contracts::{
    document::{DocumentAnalysis, DocumentId, DocumentKind, DocumentRecord, DocumentStatus},
    error::{HealthdeskError, HealthdeskResult},
};
use healthdesk_rules::{
    render_template, Facts, FallbackEntry, Predicate, RandomSource, Render, Reply, RuleEntry,
    RuleTable, TableConfig, Text,
};

/// Embedded document template table.
pub const DOCUMENT_RULES: &str = include_str!("../rules/document.toml");

/// Extensions the library accepts, compared case-insensitively.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

/// Filename fragments that mark a document as health-related.
const HEALTH_TERMS: [&str; 17] = [
    "lab", "blood", "test", "prescription", "rx", "medic", "health", "patient", "clinic",
    "hospital", "diagnos", "scan", "x-ray", "xray", "mri", "discharge", "vaccin",
];

/// Progress is reported in steps of this many percent.
pub const PROGRESS_STEP: u8 = 10;

// ── Templates ─────────────────────────────────────────────────────────────────

/// Canned analysis chosen by filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub kind: DocumentKind,
    pub confidence: u8,
    pub summary: String,
    pub findings: Vec<String>,
}

impl Render for DocumentTemplate {
    fn render(&self, facts: &Facts) -> Self {
        Self {
            summary: render_template(&self.summary, facts),
            findings: self
                .findings
                .iter()
                .map(|f| render_template(f, facts))
                .collect(),
            ..self.clone()
        }
    }
}

/// Inclusive bounds for the random clause count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClauseRange {
    pub min: u32,
    pub max: u32,
}

impl ClauseRange {
    fn draw(self, rng: &mut dyn RandomSource) -> u32 {
        let span = (self.max - self.min + 1) as usize;
        self.min + rng.pick(span) as u32
    }
}

impl Render for ClauseRange {
    fn render(&self, _facts: &Facts) -> Self {
        *self
    }
}

fn clause_ranges() -> HealthdeskResult<RuleTable<ClauseRange>> {
    let range = |min, max| Reply::Fixed(ClauseRange { min, max });
    let rules = vec![
        RuleEntry::new(
            "policy",
            Predicate::contains_any(&["policy", "insurance"]),
            range(20, 49),
        ),
        RuleEntry::new("contract", Predicate::contains_any(&["contract"]), range(15, 34)),
        RuleEntry::new("claim", Predicate::contains_any(&["claim"]), range(5, 19)),
    ];
    let fallback = FallbackEntry {
        id: "default".to_string(),
        reply: range(10, 10),
    };
    RuleTable::new("clause-count", TableConfig { rules, fallback })
}

// ── Analyzer ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DocumentAnalyzer {
    templates: RuleTable<DocumentTemplate>,
    clauses: RuleTable<ClauseRange>,
    health: Predicate,
}

impl DocumentAnalyzer {
    pub fn new() -> HealthdeskResult<Self> {
        Ok(Self {
            templates: RuleTable::from_toml_str("document", DOCUMENT_RULES)?,
            clauses: clause_ranges()?,
            health: Predicate::contains_any(&HEALTH_TERMS),
        })
    }

    /// Produce the canned analysis for `filename`.
    pub fn analyze(&self, filename: &str, rng: &mut dyn RandomSource) -> DocumentAnalysis {
        let mut facts = Facts::new();
        facts.insert("name", filename);
        let subject = Text::new(filename).with_facts(facts);

        let template = self.templates.evaluate(&subject, rng).output;
        let range = self.clauses.evaluate(&subject, rng).output;
        let extracted_clauses = range.draw(rng);
        let health_related = self.health.test(&subject);

        debug!(
            filename,
            kind = ?template.kind,
            health_related,
            extracted_clauses,
            "document analyzed"
        );

        DocumentAnalysis {
            kind: template.kind,
            health_related,
            confidence: template.confidence,
            summary: template.summary,
            findings: template.findings,
            extracted_clauses,
        }
    }
}

// ── Library ───────────────────────────────────────────────────────────────────

/// Uploaded documents in upload order.
#[derive(Debug, Clone)]
pub struct DocumentLibrary {
    analyzer: DocumentAnalyzer,
    documents: Vec<DocumentRecord>,
}

impl DocumentLibrary {
    pub fn new() -> HealthdeskResult<Self> {
        Ok(Self {
            analyzer: DocumentAnalyzer::new()?,
            documents: Vec::new(),
        })
    }

    /// Register a new upload in the `Uploading` state.
    ///
    /// Returns `HealthdeskError::UnsupportedDocument` unless the extension is
    /// one of [`ACCEPTED_EXTENSIONS`].
    pub fn add(&mut self, name: &str, size_bytes: u64) -> HealthdeskResult<DocumentId> {
        if !is_accepted(name) {
            warn!(name, "document rejected: unsupported extension");
            return Err(HealthdeskError::UnsupportedDocument {
                name: name.to_string(),
                accepted: ACCEPTED_EXTENSIONS
                    .iter()
                    .map(|e| format!(".{}", e))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let record = DocumentRecord {
            id: DocumentId::new(),
            name: name.to_string(),
            size_bytes,
            status: DocumentStatus::Uploading,
            uploaded_at: Utc::now(),
            analysis: None,
        };
        let id = record.id.clone();
        debug!(document_id = %id, name, size_bytes, "document added");
        self.documents.push(record);
        Ok(id)
    }

    /// Move an uploaded document to `Processing`.
    pub fn begin_processing(&mut self, id: &DocumentId) -> HealthdeskResult<()> {
        let record = self.find_mut(id)?;
        expect_status(record, DocumentStatus::Uploading)?;
        record.status = DocumentStatus::Processing;
        Ok(())
    }

    /// Attach the analysis and mark the document `Ready`.
    pub fn complete(
        &mut self,
        id: &DocumentId,
        rng: &mut dyn RandomSource,
    ) -> HealthdeskResult<&DocumentRecord> {
        let analyzer = &self.analyzer;
        let record = self
            .documents
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| HealthdeskError::DocumentNotFound { id: id.to_string() })?;
        expect_status(record, DocumentStatus::Processing)?;

        let analysis = analyzer.analyze(&record.name, rng);
        info!(
            document_id = %id,
            clauses = analysis.extracted_clauses,
            "document analyzed successfully"
        );
        record.analysis = Some(analysis);
        record.status = DocumentStatus::Ready;
        Ok(record)
    }

    /// Remove a document in any state and return it.
    pub fn remove(&mut self, id: &DocumentId) -> HealthdeskResult<DocumentRecord> {
        let idx = self
            .documents
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| HealthdeskError::DocumentNotFound { id: id.to_string() })?;
        Ok(self.documents.remove(idx))
    }

    pub fn get(&self, id: &DocumentId) -> Option<&DocumentRecord> {
        self.documents.iter().find(|d| &d.id == id)
    }

    pub fn list(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn analyzer(&self) -> &DocumentAnalyzer {
        &self.analyzer
    }

    fn find_mut(&mut self, id: &DocumentId) -> HealthdeskResult<&mut DocumentRecord> {
        self.documents
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| HealthdeskError::DocumentNotFound { id: id.to_string() })
    }
}

fn expect_status(record: &DocumentRecord, expected: DocumentStatus) -> HealthdeskResult<()> {
    if record.status == expected {
        return Ok(());
    }
    Err(HealthdeskError::InvalidDocumentState {
        id: record.id.to_string(),
        reason: format!("expected status {:?}, found {:?}", expected, record.status),
    })
}

fn is_accepted(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// Percentages reported while a file uploads: 10, 20, ..., 100.
pub fn upload_progress() -> impl Iterator<Item = u8> {
    (1..=100 / PROGRESS_STEP).map(|step| step * PROGRESS_STEP)
}

/// Human-readable size such as `"1.5 KB"` or `"0 Bytes"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    // ── 1. Analysis ───────────────────────────────────────────────────────────

    #[test]
    fn test_lab_report_template() {
        let analyzer = DocumentAnalyzer::new().unwrap();
        let analysis = analyzer.analyze("Blood_Test_March.pdf", &mut rng());
        assert_eq!(analysis.kind, DocumentKind::LabReport);
        assert_eq!(analysis.confidence, 92);
        assert!(analysis.health_related);
        assert!(analysis.summary.contains("Blood_Test_March.pdf"));
        assert_eq!(analysis.extracted_clauses, 10);
    }

    #[test]
    fn test_prescription_template() {
        let analyzer = DocumentAnalyzer::new().unwrap();
        let analysis = analyzer.analyze("rx-amoxicillin.txt", &mut rng());
        assert_eq!(analysis.kind, DocumentKind::Prescription);
        assert_eq!(analysis.confidence, 88);
    }

    #[test]
    fn test_unmatched_name_gets_general_template() {
        let analyzer = DocumentAnalyzer::new().unwrap();
        let analysis = analyzer.analyze("notes.docx", &mut rng());
        assert_eq!(analysis.kind, DocumentKind::General);
        assert_eq!(analysis.confidence, 75);
        assert!(!analysis.health_related);
    }

    #[test]
    fn test_clause_counts_follow_filename() {
        let analyzer = DocumentAnalyzer::new().unwrap();
        let mut rng = rng();
        for _ in 0..50 {
            let policy = analyzer.analyze("Insurance_Policy.pdf", &mut rng).extracted_clauses;
            assert!((20..=49).contains(&policy));
            let contract = analyzer.analyze("contract.doc", &mut rng).extracted_clauses;
            assert!((15..=34).contains(&contract));
            let claim = analyzer.analyze("claim_form.pdf", &mut rng).extracted_clauses;
            assert!((5..=19).contains(&claim));
        }
    }

    // ── 2. Library lifecycle ──────────────────────────────────────────────────

    #[test]
    fn test_lifecycle_reaches_ready() {
        let mut library = DocumentLibrary::new().unwrap();
        let id = library.add("lab_results.pdf", 2048).unwrap();
        assert_eq!(library.get(&id).unwrap().status, DocumentStatus::Uploading);

        library.begin_processing(&id).unwrap();
        assert_eq!(library.get(&id).unwrap().status, DocumentStatus::Processing);

        let record = library.complete(&id, &mut rng()).unwrap();
        assert_eq!(record.status, DocumentStatus::Ready);
        assert!(record.analysis.is_some());
    }

    #[test]
    fn test_complete_before_processing_fails() {
        let mut library = DocumentLibrary::new().unwrap();
        let id = library.add("report.pdf", 10).unwrap();
        let err = library.complete(&id, &mut rng()).unwrap_err();
        assert!(matches!(err, HealthdeskError::InvalidDocumentState { .. }));
    }

    #[test]
    fn test_processing_twice_fails() {
        let mut library = DocumentLibrary::new().unwrap();
        let id = library.add("report.pdf", 10).unwrap();
        library.begin_processing(&id).unwrap();
        assert!(library.begin_processing(&id).is_err());
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let mut library = DocumentLibrary::new().unwrap();
        let err = library.add("scan.png", 10).unwrap_err();
        match err {
            HealthdeskError::UnsupportedDocument { accepted, .. } => {
                assert_eq!(accepted, ".pdf, .doc, .docx, .txt");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(library.add("no_extension", 10).is_err());
        assert!(library.add("UPPER.PDF", 10).is_ok());
        assert_eq!(library.list().len(), 1);
    }

    #[test]
    fn test_remove_and_unknown_id() {
        let mut library = DocumentLibrary::new().unwrap();
        let keep = library.add("a.txt", 1).unwrap();
        let drop = library.add("b.txt", 1).unwrap();

        let removed = library.remove(&drop).unwrap();
        assert_eq!(removed.name, "b.txt");
        assert_eq!(library.list().len(), 1);
        assert_eq!(library.list()[0].id, keep);

        assert!(matches!(
            library.remove(&drop),
            Err(HealthdeskError::DocumentNotFound { .. })
        ));
    }

    // ── 3. Helpers ────────────────────────────────────────────────────────────

    #[test]
    fn test_upload_progress_steps() {
        let steps: Vec<u8> = upload_progress().collect();
        assert_eq!(steps, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }
}
