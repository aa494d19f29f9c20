//! Commands driven end to end against an in-memory tracker.

mod common;

use common::{CannedGenerator, FakeTracker, context, json};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use triage_cli::commands::{
    AnalyzeOptions, BatchOptions, DepsOptions, DoctorOptions, DuplicatesOptions, SimilarOptions,
    run_analyze, run_batch, run_deps, run_doctor, run_duplicates, run_similar,
};
use triage_cli::{CliError, OutputFormat, output};
use triage_survey::ErrorKind;

fn analyze(number: u64, format: OutputFormat) -> AnalyzeOptions {
    AnalyzeOptions {
        repo: "acme/widgets".to_string(),
        number,
        refresh: false,
        format,
    }
}

#[tokio::test]
async fn test_analyze_json_then_cached() {
    let generator = Arc::new(CannedGenerator::default());
    let ctx = context(
        FakeTracker::default().with(42, "Crash on save", "Saving an untitled document crashes."),
        Arc::clone(&generator),
    );

    let first = json(&run_analyze(&ctx, analyze(42, OutputFormat::Json)).await.unwrap());
    assert_eq!(first["success"], true);
    assert_eq!(first["repo"], "acme/widgets");
    assert_eq!(first["issue"]["number"], 42);
    assert_eq!(first["analysis"]["type"], "bug");
    assert_eq!(first["analysis"]["priority_score"], 4);
    assert_eq!(first["cached"], false);

    let second = json(&run_analyze(&ctx, analyze(42, OutputFormat::Json)).await.unwrap());
    assert_eq!(second["cached"], true);
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn test_analyze_markdown() {
    let ctx = context(
        FakeTracker::default().with(7, "Crash on save", "Saving crashes."),
        Arc::new(CannedGenerator::default()),
    );

    let document = run_analyze(&ctx, analyze(7, OutputFormat::Markdown)).await.unwrap();
    assert!(document.starts_with("# Issue #7: Crash on save"));
    assert!(document.contains("| Priority | 4/5 |"));
}

#[tokio::test]
async fn test_analyze_rejects_mermaid_without_calling_generator() {
    let generator = Arc::new(CannedGenerator::default());
    let ctx = context(
        FakeTracker::default().with(7, "Crash on save", ""),
        Arc::clone(&generator),
    );

    let err = run_analyze(&ctx, analyze(7, OutputFormat::Mermaid)).await.unwrap_err();
    assert!(matches!(err, CliError::UnsupportedFormat { .. }));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_missing_issue_reports_not_found() {
    let ctx = context(FakeTracker::default(), Arc::new(CannedGenerator::default()));

    let err = run_analyze(&ctx, analyze(404, OutputFormat::Json)).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    assert_eq!(err.report().title, "Issue or repository not found");
}

#[tokio::test]
async fn test_invalid_repo() {
    let ctx = context(FakeTracker::default(), Arc::new(CannedGenerator::default()));
    let options = AnalyzeOptions {
        repo: "widgets".to_string(),
        ..analyze(1, OutputFormat::Json)
    };

    let err = run_analyze(&ctx, options).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));
}

#[tokio::test]
async fn test_deps_formats() {
    let tracker = || {
        FakeTracker::default()
            .with(1, "Release 2.0", "Blocked by #2. Also see #3.")
            .with(2, "Migrate settings", "")
    };
    let options = |format| DepsOptions {
        repo: "acme/widgets".to_string(),
        number: 1,
        depth: None,
        format,
    };

    let ctx = context(tracker(), Arc::new(CannedGenerator::default()));
    let mermaid = run_deps(&ctx, options(OutputFormat::Mermaid)).await.unwrap();
    assert!(mermaid.starts_with("flowchart LR"));
    assert!(mermaid.contains("i1 -->|blocked by| i2"));
    assert!(!mermaid.contains("i3"));

    let value = json(&run_deps(&ctx, options(OutputFormat::Json)).await.unwrap());
    assert_eq!(value["success"], true);
    assert_eq!(value["depth"], 1);
    assert_eq!(value["graph"]["root_issue"], 1);
    assert_eq!(value["graph"]["total_nodes"], 2);
    assert_eq!(value["depths"]["2"], 1);
    assert_eq!(value["blocked_by"], serde_json::json!([2]));
    assert_eq!(value["closed_by"], serde_json::json!([]));
    assert_eq!(value["dropped"][0]["number"], 3);
    assert_eq!(value["dropped"][0]["kind"], "not_found");
}

#[tokio::test]
async fn test_duplicates_uses_config_threshold() {
    let body = "The editor crashes when saving a document without a title.";
    let ctx = context(
        FakeTracker::default()
            .with(1, "Editor crashes on save", body)
            .with(2, "Editor crashes on save", body)
            .with(3, "Add dark mode", "Please support a dark color scheme."),
        Arc::new(CannedGenerator::default()),
    );

    let options = DuplicatesOptions {
        repo: "acme/widgets".to_string(),
        number: 1,
        threshold: None,
        format: OutputFormat::Json,
    };
    let value = json(&run_duplicates(&ctx, options).await.unwrap());

    assert_eq!(value["scorer"], "lexical");
    assert_eq!(value["threshold"], 0.7);
    let numbers: Vec<u64> = value["duplicates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, vec![2]);
    assert_eq!(value["duplicates"][0]["band"], "very_likely_duplicate");
}

#[tokio::test]
async fn test_duplicates_rejects_bad_threshold() {
    let ctx = context(
        FakeTracker::default().with(1, "Crash", ""),
        Arc::new(CannedGenerator::default()),
    );
    let options = DuplicatesOptions {
        repo: "acme/widgets".to_string(),
        number: 1,
        threshold: Some(1.5),
        format: OutputFormat::Markdown,
    };

    let err = run_duplicates(&ctx, options).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInput));
}

#[tokio::test]
async fn test_similar_without_results() {
    let ctx = context(
        FakeTracker::default().with(5, "Tokenizer panics on emoji input", ""),
        Arc::new(CannedGenerator::default()),
    );
    let options = SimilarOptions {
        repo: "acme/widgets".to_string(),
        number: 5,
        exclude_repo: true,
        format: OutputFormat::Markdown,
    };

    let document = run_similar(&ctx, options).await.unwrap();
    assert!(document.contains("**Searched**: other repositories"));
    assert!(document.contains("No similar issues found."));
}

#[tokio::test]
async fn test_batch_partial_failure() {
    output::set_quiet(true);
    let generator = Arc::new(CannedGenerator::default());
    let ctx = context(
        FakeTracker::default()
            .with(1, "Crash on save", "")
            .with(2, "Slow startup", "")
            .with(3, "Typo in README", ""),
        Arc::clone(&generator),
    );

    let options = BatchOptions {
        repo: "acme/widgets".to_string(),
        numbers: "1-3,9,2".to_string(),
        format: OutputFormat::Json,
    };
    let value = json(&run_batch(&ctx, options).await.unwrap());

    assert_eq!(value["success"], true);
    let statuses: Vec<&str> = value["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["success", "success", "success", "failed"]);
    assert_eq!(value["entries"][3]["error_kind"], "not_found");
    assert_eq!(value["statistics"]["requested"], 5);
    assert_eq!(value["statistics"]["successful"], 3);
    assert_eq!(value["statistics"]["average_priority"], 4.0);
    assert_eq!(generator.call_count(), 3);
}

#[tokio::test]
async fn test_doctor_all_healthy() {
    output::set_quiet(true);
    let ctx = context(
        FakeTracker::default().with_quota(4990, 5000),
        Arc::new(CannedGenerator::default()),
    );

    let options = DoctorOptions {
        format: OutputFormat::Json,
    };
    let value = json(&run_doctor(&ctx, options).await.unwrap());

    assert_eq!(value["status"], "healthy");
    let checks = value["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0]["component"], "github");
    assert_eq!(checks[0]["healthy"], true);
    assert!(checks[0]["detail"].as_str().unwrap().ends_with("4990/5000 requests left"));
    assert_eq!(checks[1]["component"], "llm");
    assert_eq!(checks[1]["detail"], "`canned` CLI found");
}

#[tokio::test]
async fn test_doctor_reports_each_failure() {
    output::set_quiet(true);
    let generator = Arc::new(CannedGenerator::missing());
    let ctx = context(FakeTracker::default().offline(), Arc::clone(&generator));

    let options = DoctorOptions {
        format: OutputFormat::Markdown,
    };
    let document = run_doctor(&ctx, options).await.unwrap();

    assert!(document.starts_with("# Triage Health: degraded"));
    assert!(document.contains("| github | unavailable | Network error: connection refused (network) |"));
    assert!(document.contains("| llm | unavailable | `canned` CLI not found in PATH"));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_doctor_exhausted_quota_is_degraded() {
    output::set_quiet(true);
    let ctx = context(
        FakeTracker::default().with_quota(0, 60),
        Arc::new(CannedGenerator::default()),
    );

    let options = DoctorOptions {
        format: OutputFormat::Json,
    };
    let value = json(&run_doctor(&ctx, options).await.unwrap());

    assert_eq!(value["status"], "degraded");
    assert_eq!(value["checks"][0]["healthy"], false);
    assert_eq!(value["checks"][1]["healthy"], true);
}

#[tokio::test]
async fn test_doctor_rejects_mermaid() {
    let ctx = context(FakeTracker::default(), Arc::new(CannedGenerator::default()));
    let options = DoctorOptions {
        format: OutputFormat::Mermaid,
    };
    assert!(matches!(
        run_doctor(&ctx, options).await,
        Err(CliError::UnsupportedFormat { command: "doctor", .. })
    ));
}
