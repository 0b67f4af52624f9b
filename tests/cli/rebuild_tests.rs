//! Tests for the `rebuild` CLI command
//!
//! Exit codes:
//! - 0 committed, dry run, or cancelled
//! - 1 database not found / token store missing
//! - 2 aborted on signature drift
//! - 5 lexicon or configuration failure

use crate::common::{stderr, stdout, TestCorpus};

fn greek_corpus() -> TestCorpus {
    TestCorpus::with_tokens(&[
        (1, "Λόγος"),
        (2, "λογοσ"),
        (3, ""),
        (4, "λόγου"),
        (5, "ἀρετῆς"),
    ])
}

// ============================================================================
// INPUT ERRORS
// ============================================================================

#[test]
fn test_rebuild_missing_database() {
    let corpus = TestCorpus::new();
    let missing = corpus.path().join("absent.db");
    let missing_str = missing.to_string_lossy().to_string();

    let output = corpus.run_cli(&["rebuild", "--db", &missing_str, "--force"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Database not found"), "{}", stderr(&output));
    assert!(!missing.exists(), "rebuild must not create the database");
}

#[test]
fn test_rebuild_missing_token_store() {
    let corpus = TestCorpus::new();
    corpus
        .connect()
        .execute_batch("DROP TABLE Token;")
        .expect("drop failed");

    let output = corpus.run_rebuild(&["--force"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Token"), "{}", stderr(&output));
}

#[test]
fn test_rebuild_malformed_lexicon() {
    let corpus = greek_corpus();
    let lexicon = corpus.path().join("broken.tsv");
    std::fs::write(&lexicon, "no tab here\n").expect("write failed");
    let lexicon_str = lexicon.to_string_lossy().to_string();

    let output = corpus.run_rebuild(&["--force", "--lexicon", &lexicon_str]);
    assert_eq!(output.status.code(), Some(5));
    assert!(!corpus.has_table("Lemma"));
}

// ============================================================================
// COMMIT
// ============================================================================

#[test]
fn test_forced_rebuild_commits() {
    let corpus = greek_corpus();
    let output = corpus.run_rebuild(&["--force"]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Rebuild committed."), "{}", text);
    assert!(text.contains("final_lemma_count: 3"), "{}", text);

    assert_eq!(corpus.lemma_texts(), vec!["αρετησ", "λογοσ", "λογου"]);
    let mapped: Vec<i64> = corpus.token_lemmas().iter().map(|(id, _)| *id).collect();
    assert_eq!(mapped, vec![1, 2, 4, 5]);
    assert_eq!(corpus.metadata_count(), 1);
}

#[test]
fn test_lexicon_rebuild_worked_example() {
    let corpus = TestCorpus::with_tokens(&[(1, "Λόγος"), (2, "λογοσ"), (3, "")]);
    let lexicon = corpus.write_lexicon("greek.tsv", &[("λογοσ", "λόγος")]);
    let lexicon_str = lexicon.to_string_lossy().to_string();

    let output = corpus.run_rebuild(&["--force", "--lexicon", &lexicon_str]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(corpus.lemma_texts(), vec!["λογοσ"]);
    assert_eq!(
        corpus.token_lemmas(),
        vec![(1, "λογοσ".to_string()), (2, "λογοσ".to_string())]
    );
}

#[test]
fn test_repeat_rebuild_is_byte_identical() {
    let corpus = greek_corpus();
    assert_eq!(corpus.run_rebuild(&["--force"]).status.code(), Some(0));
    let first_sig = corpus.latest_signature();
    let first_lemmas = corpus.lemma_texts();
    let first_pairs = corpus.token_lemmas();

    assert_eq!(corpus.run_rebuild(&["--force"]).status.code(), Some(0));

    assert_eq!(corpus.latest_signature(), first_sig);
    assert_eq!(corpus.lemma_texts(), first_lemmas);
    assert_eq!(corpus.token_lemmas(), first_pairs);
    assert_eq!(corpus.metadata_count(), 2);
}

#[test]
fn test_rebuild_json_output() {
    let corpus = greek_corpus();
    let output = corpus.run_rebuild(&["--force", "-f", "json"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let json: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("rebuild json should parse");
    assert_eq!(json["_type"], "rebuild");
    assert_eq!(json["lemma_version"], "identity");
    assert_eq!(json["report"]["outcome"], "committed");
    assert_eq!(json["report"]["drift"]["status"], "no_history");
    assert_eq!(json["report"]["diff"]["added"], 3);
    assert_eq!(json["report"]["mapped_tokens"], 4);
    assert_eq!(
        json["report"]["committed"]["signature"],
        json["report"]["signature"]
    );
}

// ============================================================================
// DRY RUN AND CONFIRMATION
// ============================================================================

#[test]
fn test_dry_run_leaves_database_untouched() {
    let corpus = greek_corpus();
    let before = std::fs::read(corpus.db_path()).expect("read failed");

    let output = corpus.run_rebuild(&["--dry-run"]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Dry-run complete"));
    assert!(stdout(&output).contains("added: 3"));
    assert_eq!(std::fs::read(corpus.db_path()).expect("read failed"), before);
}

#[test]
fn test_unconfirmed_rebuild_is_cancelled_without_terminal() {
    let corpus = greek_corpus();
    let output = corpus.run_rebuild(&[]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Cancelled"));
    assert!(!corpus.has_table("Lemma"));
    assert_eq!(corpus.metadata_count(), 0);
}

// ============================================================================
// DRIFT GATE
// ============================================================================

#[test]
fn test_drift_aborts_then_force_proceeds() {
    let corpus = greek_corpus();
    assert_eq!(corpus.run_rebuild(&["--force"]).status.code(), Some(0));
    let s1 = corpus.latest_signature().expect("signature recorded");
    let lemmas_before = corpus.lemma_texts();

    let lexicon = corpus.write_lexicon("greek.tsv", &[("λόγου", "λόγος")]);
    let lexicon_str = lexicon.to_string_lossy().to_string();

    let aborted = corpus.run_rebuild(&["--lexicon", &lexicon_str]);
    assert_eq!(aborted.status.code(), Some(2), "{}", stderr(&aborted));
    let text = stdout(&aborted);
    assert!(text.contains(&format!("recorded: {}", s1)), "{}", text);
    assert!(text.contains("--force"), "{}", text);
    assert_eq!(corpus.lemma_texts(), lemmas_before);
    assert_eq!(corpus.metadata_count(), 1);

    let forced = corpus.run_rebuild(&["--lexicon", &lexicon_str, "--force"]);
    assert_eq!(forced.status.code(), Some(0), "{}", stderr(&forced));
    let s2 = corpus.latest_signature().expect("signature recorded");
    assert_ne!(s1, s2);
    assert_eq!(corpus.lemma_texts(), vec!["αρετησ", "λογοσ"]);
    assert_eq!(corpus.metadata_count(), 2);
}

#[test]
fn test_normalization_profile_change_is_drift() {
    let corpus = greek_corpus();
    assert_eq!(corpus.run_rebuild(&["--force"]).status.code(), Some(0));

    let output = corpus.run_rebuild(&["--dry-run", "--no-fold-diacritics"]);
    assert_eq!(output.status.code(), Some(2), "{}", stderr(&output));
}
