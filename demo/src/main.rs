//! HealthDesk demo CLI
//!
//! Drives every assistant surface from the command line. Replies are paced
//! the way an interactive front end would pace them; pass `--instant` to skip
//! the delays and `--seed` to make candidate selection reproducible.
//!
//! Usage:
//!   cargo run -p demo -- run-all --instant
//!   cargo run -p demo -- chat "hello" "46M, knee surgery, Pune"
//!   cargo run -p demo -- predict --age 34 --gender f --symptom Fever --symptom Cough
//!   cargo run -p demo -- treat "I have a headache and feel nauseous"
//!   cargo run -p demo -- claim "46M, knee surgery, Pune, 3-month policy" --json
//!   cargo run -p demo -- document lab_results.pdf:245760 policy.docx:1048576
//!   cargo run -p demo -- insights --query "knee surgery in Pune"

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use healthdesk_assist::{
    claim_analytics, claim_insights, disease::{Gender, SymptomDuration, SymptomSeverity},
    format_file_size, health_insights, upload_progress, ChatAssistant, ChatSession, ClaimParser,
    DiseasePredictor, DocumentLibrary, PredictionForm, TreatmentGuide,
};
use healthdesk_contracts::error::{HealthdeskError, HealthdeskResult};

// ── CLI definition ────────────────────────────────────────────────────────────

/// HealthDesk: keyword-driven health and insurance assistant demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "HealthDesk assistant demo",
    long_about = "Runs the HealthDesk assistant surfaces: chat, disease predictor,\n\
                  treatment guide, claim parser, document analyzer and insights."
)]
struct Cli {
    /// Skip the simulated response delays.
    #[arg(long, global = true)]
    instant: bool,

    /// Print structured results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Seed for reply selection and clause counts.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Load the chat rule table from this TOML file.
    #[arg(long, global = true, value_name = "PATH")]
    chat_rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every surface with sample inputs.
    RunAll,
    /// Chat with the assistant. Each argument is one message.
    Chat { messages: Vec<String> },
    /// Predict a likely condition from a symptom form.
    Predict {
        #[arg(long)]
        age: Option<u32>,
        /// male, female or other.
        #[arg(long)]
        gender: Option<Gender>,
        /// A checklist symptom; repeat for several.
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
        /// "1-2 days", "3-7 days", "1-2 weeks" or "more than 2 weeks".
        #[arg(long)]
        duration: Option<SymptomDuration>,
        /// mild, moderate or severe.
        #[arg(long)]
        severity: Option<SymptomSeverity>,
    },
    /// Show a treatment plan by condition key or free-text description.
    Treat {
        description: Option<String>,
        #[arg(long)]
        condition: Option<String>,
    },
    /// Parse an insurance claim query into a decision.
    Claim { query: String },
    /// Upload and analyze documents given as NAME:SIZE_BYTES.
    Document {
        #[arg(value_parser = parse_upload, required = true)]
        files: Vec<(String, u64)>,
    },
    /// Show the analytics datasets.
    Insights {
        /// Also generate insight text for this claim query.
        #[arg(long)]
        query: Option<String>,
    },
}

fn parse_upload(s: &str) -> Result<(String, u64), String> {
    match s.rsplit_once(':') {
        Some((name, size)) => size
            .parse()
            .map(|size| (name.to_string(), size))
            .map_err(|_| format!("invalid size in '{}'", s)),
        None => Ok((s.to_string(), 0)),
    }
}

// ── Pacing ────────────────────────────────────────────────────────────────────

/// Simulated response latency: `base_ms` plus up to `jitter_ms` of uniform
/// jitter.
#[derive(Debug, Clone, Copy)]
struct Pacing {
    base_ms: u64,
    jitter_ms: u64,
}

impl Pacing {
    const CHAT: Pacing = Pacing { base_ms: 1000, jitter_ms: 2000 };
    const PREDICT: Pacing = Pacing { base_ms: 1500, jitter_ms: 0 };
    const CLAIM: Pacing = Pacing { base_ms: 2000, jitter_ms: 0 };
    const UPLOAD_STEP: Pacing = Pacing { base_ms: 200, jitter_ms: 0 };
    const PROCESSING: Pacing = Pacing { base_ms: 2500, jitter_ms: 0 };
}

/// Shared state for one CLI invocation.
struct Ctx {
    instant: bool,
    json: bool,
    rng: StdRng,
}

impl Ctx {
    fn wait(&mut self, pacing: Pacing) {
        if self.instant {
            return;
        }
        let jitter = if pacing.jitter_ms > 0 {
            self.rng.gen_range(0..pacing.jitter_ms)
        } else {
            0
        };
        thread::sleep(Duration::from_millis(pacing.base_ms + jitter));
    }

    /// Print `value` as JSON when `--json` is set, otherwise run `human`.
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce()) {
        if self.json {
            match serde_json::to_string_pretty(value) {
                Ok(s) => println!("{}", s),
                Err(e) => eprintln!("  could not encode result: {}", e),
            }
        } else {
            human();
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging. Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut ctx = Ctx {
        instant: cli.instant,
        json: cli.json,
        rng,
    };

    if !ctx.json {
        print_banner();
    }

    let result = match cli.command {
        Command::RunAll => run_all(&mut ctx, cli.chat_rules.as_ref()),
        Command::Chat { messages } => run_chat(&mut ctx, cli.chat_rules.as_ref(), &messages),
        Command::Predict {
            age,
            gender,
            symptoms,
            duration,
            severity,
        } => run_predict(
            &mut ctx,
            &PredictionForm {
                age,
                gender,
                symptoms,
                duration,
                severity,
            },
        ),
        Command::Treat {
            description,
            condition,
        } => run_treat(&mut ctx, description.as_deref(), condition.as_deref()),
        Command::Claim { query } => run_claim(&mut ctx, &query),
        Command::Document { files } => run_documents(&mut ctx, &files),
        Command::Insights { query } => run_insights(&mut ctx, query.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Surfaces ──────────────────────────────────────────────────────────────────

fn run_all(ctx: &mut Ctx, chat_rules: Option<&PathBuf>) -> HealthdeskResult<()> {
    run_chat(
        ctx,
        chat_rules,
        &[
            "hello".to_string(),
            "46-year-old male, knee surgery in Pune".to_string(),
            "how do I upload a policy document?".to_string(),
        ],
    )?;
    run_predict(
        ctx,
        &PredictionForm {
            age: Some(34),
            gender: Some(Gender::Female),
            symptoms: vec!["Fever".into(), "Cough".into(), "Sore throat".into()],
            duration: Some(SymptomDuration::ThreeToSevenDays),
            severity: Some(SymptomSeverity::Moderate),
        },
    )?;
    run_treat(ctx, Some("I have a headache and feel nauseous"), None)?;
    run_claim(ctx, "46M, knee surgery, Pune, 3-month policy")?;
    run_claim(ctx, "cardiac surgery needed")?;
    run_documents(
        ctx,
        &[
            ("blood_test_results.pdf".to_string(), 245_760),
            ("health_insurance_policy.docx".to_string(), 1_048_576),
            ("xray.png".to_string(), 512_000),
        ],
    )?;
    run_insights(ctx, Some("knee surgery in Pune"))
}

fn run_chat(
    ctx: &mut Ctx,
    chat_rules: Option<&PathBuf>,
    messages: &[String],
) -> HealthdeskResult<()> {
    let assistant = match chat_rules {
        Some(path) => ChatAssistant::from_file(path)?,
        None => ChatAssistant::new()?,
    };
    let session = ChatSession::start(Arc::new(assistant))?;
    debug!(session_id = %session.id(), "chat session started");

    if !ctx.json {
        println!("=== Chat Assistant ===");
        println!();
        for message in session.history() {
            println!("  [{}] {}", message.sender, message.text);
        }
    }

    for text in messages {
        let pending = match session.submit(text, &mut ctx.rng) {
            Ok(pending) => pending,
            Err(e @ HealthdeskError::EmptyInput { .. }) => {
                if !ctx.json {
                    println!("  (skipped: {})", e);
                }
                continue;
            }
            Err(e) => return Err(e),
        };
        if !ctx.json {
            println!("  [user] {}", text);
        }
        ctx.wait(Pacing::CHAT);
        let rule_id = pending.rule_id().to_string();
        let reply = pending.deliver()?;
        if !ctx.json {
            println!("  [assistant <{}>] {}", rule_id, reply.text);
        }
    }

    let history = session.history();
    info!(session_id = %session.id(), message_count = history.len(), "chat session closed");

    ctx.emit(&history, || {
        println!();
        println!("  {} message(s) in history", history.len());
        println!();
    });
    Ok(())
}

fn run_predict(ctx: &mut Ctx, form: &PredictionForm) -> HealthdeskResult<()> {
    let predictor = DiseasePredictor::new()?;
    let diagnosis = predictor.predict(form, &mut ctx.rng)?;
    ctx.wait(Pacing::PREDICT);

    ctx.emit(&diagnosis, || {
        println!("=== Disease Predictor ===");
        println!();
        println!("  Symptoms:    {}", form.symptoms.join(", "));
        println!("  Prediction:  {}", diagnosis.disease);
        println!("  Confidence:  {}%", diagnosis.confidence);
        println!("  Severity:    {}", diagnosis.severity.as_str());
        println!("  Reasoning:   {}", diagnosis.reasoning);
        println!("  Recommendations:");
        for rec in &diagnosis.recommendations {
            println!("    - {}", rec);
        }
        println!();
        println!("  This is not a medical diagnosis. Consult a healthcare professional.");
        println!();
    });
    Ok(())
}

fn run_treat(
    ctx: &mut Ctx,
    description: Option<&str>,
    condition: Option<&str>,
) -> HealthdeskResult<()> {
    let guide = TreatmentGuide::new()?;

    let plan = match (condition, description) {
        (Some(key), _) => guide.for_condition(key)?,
        (None, Some(text)) => guide.suggest(text, &mut ctx.rng)?.output,
        (None, None) => {
            ctx.emit(&guide.conditions(), || {
                println!("=== Treatment Guide ===");
                println!();
                for condition in guide.conditions() {
                    println!("  {:<15} {}", condition.key, condition.label);
                }
                println!();
            });
            return Ok(());
        }
    };

    ctx.emit(&plan, || {
        println!("=== Treatment Guide ===");
        println!();
        println!("  Category: {}", plan.category);
        print_list("Treatment steps", &plan.steps);
        print_list("Precautions", &plan.precautions);
        print_list("When to seek help", &plan.when_to_seek_help);
        println!();
    });
    Ok(())
}

fn run_claim(ctx: &mut Ctx, query: &str) -> HealthdeskResult<()> {
    let parser = ClaimParser::new()?;
    let decision = parser.evaluate(query, &mut ctx.rng)?;
    ctx.wait(Pacing::CLAIM);

    ctx.emit(&decision, || {
        println!("=== Claim Parser ===");
        println!();
        println!("  Query:          {}", query);
        println!("  Decision:       {}", decision.decision.as_str().to_uppercase());
        if let Some(amount) = decision.amount {
            println!("  Amount:         ₹{}", amount);
        }
        println!("  Justification:  {}", decision.justification);
        println!("  Extracted:");
        let info = &decision.extracted_info;
        match info.age {
            Some(age) => println!("    age:       {}", age),
            None => println!("    age:       not specified"),
        }
        println!("    procedure: {}", info.procedure);
        println!("    location:  {}", info.location);
        println!("    duration:  {}", info.policy_duration);
        println!("  Clauses:");
        for clause in &decision.clauses {
            println!("    [{}] {}", clause.clause_id, clause.text);
        }
        println!();
    });
    Ok(())
}

fn run_documents(ctx: &mut Ctx, files: &[(String, u64)]) -> HealthdeskResult<()> {
    let mut library = DocumentLibrary::new()?;

    if !ctx.json {
        println!("=== Document Analyzer ===");
        println!();
    }

    for (name, size) in files {
        let id = match library.add(name, *size) {
            Ok(id) => id,
            Err(e @ HealthdeskError::UnsupportedDocument { .. }) => {
                if !ctx.json {
                    println!("  Skipped: {}", e);
                }
                continue;
            }
            Err(e) => return Err(e),
        };

        if !ctx.json {
            println!("  {} ({})", name, format_file_size(*size));
        }
        for percent in upload_progress() {
            ctx.wait(Pacing::UPLOAD_STEP);
            debug!(document_id = %id, percent, "upload progress");
        }
        library.begin_processing(&id)?;
        ctx.wait(Pacing::PROCESSING);
        library.complete(&id, &mut ctx.rng)?;
    }

    ctx.emit(&library.list(), || {
        for record in library.list() {
            let Some(analysis) = &record.analysis else {
                continue;
            };
            println!();
            println!("  {} [{:?}]", record.name, record.status);
            println!("    {}", analysis.summary);
            println!(
                "    confidence {}%, health-related: {}, {} clauses extracted",
                analysis.confidence,
                if analysis.health_related { "yes" } else { "no" },
                analysis.extracted_clauses
            );
            for finding in &analysis.findings {
                println!("    - {}", finding);
            }
        }
        println!();
    });
    Ok(())
}

fn run_insights(ctx: &mut Ctx, query: Option<&str>) -> HealthdeskResult<()> {
    let health = health_insights();
    let claims = claim_analytics();
    let insight = query.map(claim_insights).transpose()?;

    let report = serde_json::json!({
        "health": health,
        "claims": claims,
        "insight": insight,
    });

    ctx.emit(&report, || {
        println!("=== Health Insights ===");
        println!();
        for metric in &health.metrics {
            println!("  {:<20} {:>8}  {}", metric.title, metric.value, metric.change);
        }
        println!("  Common conditions:");
        for c in &health.common_conditions {
            println!("    {:<15} {}", c.name, c.cases);
        }
        println!();
        println!("=== Claim Analytics ===");
        println!();
        for card in &claims.summary {
            println!("  {:<16} {}", card.title, card.value);
        }
        println!("  Approval by category:");
        for rate in &claims.approval_by_category {
            println!("    {:<12} {}% approved / {}% rejected", rate.category, rate.approved, rate.rejected);
        }
        if let Some(text) = &insight {
            println!();
            for line in text.lines() {
                println!("  {}", line);
            }
        }
        println!();
    });
    Ok(())
}

fn print_list(title: &str, items: &[String]) {
    println!("  {}:", title);
    for item in items {
        println!("    - {}", item);
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("HealthDesk - Health & Insurance Assistant");
    println!("=========================================");
    println!();
    println!("Every answer is a canned template chosen by keyword:");
    println!("  [1] Input is case-folded; regex facts (age, city, procedure) are extracted");
    println!("  [2] Rule table is walked in order; the first matching rule wins");
    println!("  [3] Unmatched input falls through to the table's default reply");
    println!();
    println!("Not medical or insurance advice.");
    println!();
}
