//! # healthdesk-rules
//!
//! First-match-wins rule tables for keyword classification and templated
//! responses.
//!
//! ## Overview
//!
//! A [`RuleTable`] is an ordered list of (predicate, reply) entries ending in
//! exactly one fallback. [`RuleTable::evaluate`] walks the entries in order and
//! returns the first matching entry's output, so every input resolves to
//! something. Candidate-set replies draw from a caller-supplied
//! [`RandomSource`]; an [`Extractor`] pulls regex facts out of free text for
//! fact predicates and `{placeholder}` rendering.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use healthdesk_rules::RuleTable;
//!
//! let table: RuleTable<String> = RuleTable::from_toml_str("chat", CHAT_RULES)?;
//! let reply = table.respond("hello", &mut rand::thread_rng());
//! println!("{}", reply.output);
//! ```

pub mod extract;
pub mod rule;
pub mod subject;
pub mod table;

pub use extract::Extractor;
pub use rule::{render_template, FallbackEntry, Predicate, Render, Reply, RuleEntry};
pub use subject::{Facts, Subject, Text};
pub use table::{RandomSource, Resolution, RuleTable, TableConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use healthdesk_contracts::error::HealthdeskError;

    use crate::{Extractor, Facts, Predicate, Reply, RuleTable, Text};

    // ── Helpers ───────────────────────────────────────────────────────────────

    const GREETING_TABLE: &str = r#"
        [[rules]]
        id = "greeting"
        when = { contains-any = ["Hello", "hey"] }
        reply = ["g1", "g2", "g3"]

        [[rules]]
        id = "thanks"
        when = { contains-any = ["thank"] }
        reply = "you're welcome"

        [fallback]
        reply = "ask me anything"
    "#;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn table() -> RuleTable<String> {
        RuleTable::from_toml_str("test", GREETING_TABLE).unwrap()
    }

    // ── 1. fallback is always last ────────────────────────────────────────────

    #[test]
    fn test_fallback_is_last_entry() {
        let table = table();
        assert_eq!(table.len(), 3);
        let last = table.entries().last().unwrap();
        assert_eq!(last.id, "fallback");
        assert_eq!(last.when, Predicate::Always);
    }

    // ── 2. unmatched input falls back ─────────────────────────────────────────

    #[test]
    fn test_unmatched_input_uses_fallback() {
        let resolved = table().respond("what is the weather", &mut rng());
        assert!(resolved.fallback);
        assert_eq!(resolved.rule_id, "fallback");
        assert_eq!(resolved.output, "ask me anything");
    }

    // ── 3. candidate sets ─────────────────────────────────────────────────────

    /// A matching candidate-set rule returns one of its candidates, and
    /// keywords written in mixed case still match.
    #[test]
    fn test_candidate_set_member_returned() {
        let table = table();
        let mut rng = rng();
        for _ in 0..20 {
            let resolved = table.respond("HELLO there", &mut rng);
            assert!(!resolved.fallback);
            assert!(["g1", "g2", "g3"].contains(&resolved.output.as_str()));
        }
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let table = table();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let first: Vec<String> = (0..10).map(|_| table.respond("hey", &mut a).output).collect();
        let second: Vec<String> = (0..10).map(|_| table.respond("hey", &mut b).output).collect();
        assert_eq!(first, second);
    }

    // ── 4. first match wins ───────────────────────────────────────────────────

    #[test]
    fn test_first_match_wins() {
        let resolved = table().respond("hey, thank you", &mut rng());
        assert_eq!(resolved.rule_id, "greeting");
    }

    // ── 5. invariant enforcement ──────────────────────────────────────────────

    #[test]
    fn test_always_rejected_outside_fallback() {
        let toml = r#"
            [[rules]]
            id = "catch-all"
            when = "always"
            reply = "x"

            [fallback]
            reply = "y"
        "#;

        match RuleTable::<String>::from_toml_str("bad", toml) {
            Err(HealthdeskError::ConfigError { reason }) => {
                assert!(reason.contains("only the fallback"), "unexpected reason: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn test_missing_fallback_is_parse_error() {
        let toml = r#"
            [[rules]]
            id = "a"
            when = { contains-any = ["a"] }
            reply = "a"
        "#;

        match RuleTable::<String>::from_toml_str("bad", toml) {
            Err(HealthdeskError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse rule table"));
            }
            other => panic!("expected ConfigError, got {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn test_duplicate_ids_and_empty_candidates_rejected() {
        let duplicate = r#"
            [[rules]]
            id = "a"
            when = { contains-any = ["a"] }
            reply = "a"

            [[rules]]
            id = "a"
            when = { contains-any = ["b"] }
            reply = "b"

            [fallback]
            reply = "c"
        "#;
        assert!(RuleTable::<String>::from_toml_str("dup", duplicate).is_err());

        let empty = r#"
            [[rules]]
            id = "a"
            when = { contains-any = ["a"] }
            reply = []

            [fallback]
            reply = "c"
        "#;
        assert!(RuleTable::<String>::from_toml_str("empty", empty).is_err());
    }

    // ── 6. predicates ─────────────────────────────────────────────────────────

    #[test]
    fn test_compound_predicates() {
        let facts = {
            let mut f = Facts::new();
            f.insert("age", "46");
            f
        };
        let subject = Text::new("Knee surgery, 3-month policy").with_facts(facts);

        let under_65 = Predicate::FactRange {
            fact: "age".to_string(),
            min: Some(1),
            max: Some(64),
        };
        let emergency = Predicate::contains_any(&["emergency", "urgent"]);
        let waiting = Predicate::contains_any(&["3-month", "3 month"]);

        assert!(under_65.test(&subject));
        assert!(Predicate::contains_all(&["knee", "surgery"]).test(&subject));
        assert!(!Predicate::Any(vec![emergency, waiting.clone().negate()]).test(&subject));
        assert!(Predicate::All(vec![waiting, Predicate::fact("age")]).test(&subject));
        assert!(!Predicate::fact("city").test(&subject));
    }

    // ── 7. templates ──────────────────────────────────────────────────────────

    #[test]
    fn test_template_rendering() {
        let mut facts = Facts::new();
        facts.insert("age", "30");
        let rendered = crate::render_template(
            "{age}-year-old needing {procedure|medical procedure} {not a name}",
            &facts,
        );
        assert_eq!(rendered, "30-year-old needing medical procedure {not a name}");
        assert_eq!(crate::render_template("unclosed {age", &facts), "unclosed {age");
    }

    #[test]
    fn test_code_built_table_renders_facts() {
        let table = RuleTable::new(
            "ages",
            crate::TableConfig {
                rules: vec![crate::RuleEntry::new(
                    "has-age",
                    Predicate::fact("age"),
                    Reply::Fixed("age {age}".to_string()),
                )],
                fallback: crate::FallbackEntry::new(Reply::Fixed("no age".to_string())),
            },
        )
        .unwrap();

        let extractor = Extractor::new().pattern("age", r"(\d+)\s*years?", 1).unwrap();
        let text = "patient is 52 years old";
        let subject = Text::new(text).with_facts(extractor.extract(text));

        assert_eq!(table.evaluate(&subject, &mut rng()).output, "age 52");
        assert_eq!(table.respond(text, &mut rng()).output, "no age");
    }

    // ── 8. extraction ─────────────────────────────────────────────────────────

    #[test]
    fn test_extractor_alternatives_and_gazetteer() {
        let extractor = Extractor::new()
            .pattern("age", r"(\d+)[-\s]*(year|yr|y)", 1)
            .unwrap()
            .pattern("age", r"(\d+)m", 1)
            .unwrap()
            .gazetteer("city", &["pune", "mumbai"])
            .unwrap();

        let facts = extractor.extract("46M, knee surgery, Pune, 3-month policy");
        assert_eq!(facts.get("age"), Some("46"));
        assert_eq!(facts.get("city"), Some("Pune"));

        let facts = extractor.extract("a 30 yr old in Mumbaikar street");
        assert_eq!(facts.get("age"), Some("30"));
        assert_eq!(facts.get("city"), None, "gazetteer matches whole words only");
    }

    #[test]
    fn test_terms_match_inside_words() {
        let extractor = Extractor::new()
            .terms("city", &["pune", "delhi"])
            .unwrap()
            .terms("procedure", &["surgery", "procedure"])
            .unwrap();

        let facts = extractor.extract("two procedures at a NewDelhi clinic");
        assert_eq!(facts.get("city"), Some("Delhi"));
        assert_eq!(facts.get("procedure"), Some("procedure"));
        assert!(Extractor::new().terms("x", &[]).is_err());
    }

    #[test]
    fn test_extractor_rejects_bad_patterns() {
        assert!(Extractor::new().pattern("x", r"(unclosed", 1).is_err());
        assert!(Extractor::new().pattern("x", r"no groups", 1).is_err());
        assert!(Extractor::new().gazetteer("x", &[]).is_err());
    }

    // ── 9. properties ─────────────────────────────────────────────────────────

    proptest! {
        /// Every string resolves to some entry of the table.
        #[test]
        fn prop_respond_is_total(input in ".*") {
            let table = table();
            let resolved = table.respond(&input, &mut rng());
            prop_assert!(table.entries().iter().any(|e| e.id == resolved.rule_id));
        }

        /// Strings without any configured keyword always fall back.
        #[test]
        fn prop_keywordless_input_falls_back(input in "[0-9 ,.!?]*") {
            let resolved = table().respond(&input, &mut rng());
            prop_assert!(resolved.fallback);
        }

        /// Extraction is a pure function of its input.
        #[test]
        fn prop_extraction_is_deterministic(input in ".{0,64}") {
            let extractor = Extractor::new()
                .pattern("n", r"(\d+)", 1)
                .unwrap()
                .gazetteer("city", &["pune", "delhi"])
                .unwrap();
            prop_assert_eq!(extractor.extract(&input), extractor.extract(&input));
        }
    }
}
