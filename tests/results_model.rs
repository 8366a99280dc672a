// tests/results_model.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;

use serde_json::json;

use remotest::errors::IngestError;
use remotest::model::{TestIdentifier, TestStatus, parse_test_list};
use remotest::results::ResultAggregator;
use remotest_test_utils::runner_client::{result_message, result_message_with};

type TestResult = Result<(), Box<dyn Error>>;

fn message(suite: &str, timestamp: f64, details: serde_json::Value) -> String {
    json!({"details": details, "suite": suite, "timestamp": timestamp}).to_string()
}

#[test]
fn framework_and_suites_are_created_lazily_in_first_seen_order() -> TestResult {
    init_tracing();
    let mut agg = ResultAggregator::new("xUnit");
    assert!(agg.framework().is_none());
    assert_eq!(agg.test_count(), 0);

    agg.ingest(&message("B", 10.0, json!({"name": "b1", "result": "passed"})))?;
    agg.ingest(&message("A", 20.0, json!({"name": "a1", "result": "failed"})))?;
    agg.ingest(&message("B", 30.0, json!({"name": "b2", "result": "passed"})))?;

    let fw = agg.framework().ok_or("framework missing")?;
    assert_eq!(fw.name(), "xUnit");
    assert_eq!(fw.timestamp(), 10.0);
    assert_eq!(fw.suite_count(), 2);
    assert_eq!(fw.test_count(), 3);

    let names: Vec<&str> = fw.suites().map(|s| s.name()).collect();
    assert_eq!(names, vec!["B", "A"]);

    let b = fw.suite("B").ok_or("suite B missing")?;
    assert_eq!(b.timestamp(), 10.0, "suite keeps its first timestamp");
    let tests: Vec<&str> = b.tests().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tests, vec!["b1", "b2"]);
    Ok(())
}

#[test]
fn malformed_messages_leave_the_tree_untouched() -> TestResult {
    init_tracing();
    let mut agg = ResultAggregator::new("xUnit");

    assert!(matches!(agg.ingest("{oops"), Err(IngestError::InvalidJson(_))));
    assert!(matches!(
        agg.ingest(&json!({"details": {}, "timestamp": 1}).to_string()),
        Err(IngestError::MissingField("suite"))
    ));
    assert!(matches!(
        agg.ingest(&json!({"details": null, "suite": "A", "timestamp": 1}).to_string()),
        Err(IngestError::MissingField("details"))
    ));
    assert!(matches!(
        agg.ingest(&json!({"details": {}, "suite": "A"}).to_string()),
        Err(IngestError::MissingField("timestamp"))
    ));
    assert!(matches!(
        agg.ingest(&message("A", 1.0, json!({"name": 5}))),
        Err(IngestError::InvalidDetails(_))
    ));

    assert!(agg.framework().is_none());
    Ok(())
}

#[test]
fn missing_and_null_fields_take_defaults() -> TestResult {
    let mut agg = ResultAggregator::new("xUnit");
    let recorded = agg.ingest(&message(
        "A",
        1.0,
        json!({"name": "t", "result": "passed", "exceptions": null, "errors": null}),
    ))?;

    assert_eq!(recorded.duration, 0.0);
    assert_eq!(recorded.assertions, 0);
    assert!(recorded.exceptions.is_empty());
    assert!(recorded.errors.is_empty());
    Ok(())
}

#[test]
fn status_labels_are_normalised() {
    assert_eq!(TestStatus::from_label("PASSED"), TestStatus::Passed);
    assert_eq!(TestStatus::from_label(" failed "), TestStatus::Failed);
    assert_eq!(TestStatus::from_label("Expired"), TestStatus::Expired);
    assert_eq!(TestStatus::from_label("skipped"), TestStatus::Skipped);
    assert_eq!(TestStatus::from_label("errored"), TestStatus::Errored);
    assert_eq!(TestStatus::from_label("flaky"), TestStatus::Unknown);
}

#[test]
fn counts_follow_status_and_exceptions() -> TestResult {
    let mut agg = ResultAggregator::new("xUnit");
    agg.ingest(&result_message("S", "ok", "passed", 250_000))?;
    agg.ingest(&result_message("S", "bad", "failed", 250_000))?;
    agg.ingest(&result_message("S", "late", "expired", 500_000))?;
    agg.ingest(&result_message("S", "later", "skipped", 0))?;
    agg.ingest(&result_message_with(
        "T",
        json!({"name": "boom", "result": "passed", "exceptions": [{"type": "NullRef"}]}),
    ))?;

    let fw = agg.framework().ok_or("framework missing")?;
    let counts = fw.counts();
    assert_eq!(counts.tests, 5);
    assert_eq!(counts.passed, 2);
    assert_eq!(counts.failures, 2, "expired counts as a failure");
    assert_eq!(counts.errors, 1);
    assert_eq!(counts.skipped, 1);
    assert!((counts.time - 1.0).abs() < 1e-9);

    let s = fw.suite("S").ok_or("suite S missing")?;
    assert_eq!(s.counts().tests, 4);
    Ok(())
}

#[test]
fn summary_lists_only_tests_that_did_not_pass_cleanly() -> TestResult {
    let mut agg = ResultAggregator::new("xUnit");
    agg.ingest(&result_message("S", "ok", "passed", 10))?;
    agg.ingest(&result_message_with(
        "S",
        json!({
            "name": "bad",
            "result": "failed",
            "errors": [{"expected": 1, "actual": 2, "description": "x == 1", "line": 7}],
            "exceptions": [{"m": "first"}, {"m": "second"}],
        }),
    ))?;

    let summary = agg.framework().ok_or("framework missing")?.summary();
    let value = serde_json::to_value(&summary)?;

    assert_eq!(value["name"], "xUnit");
    assert_eq!(value["tests"], 2);
    let not_passed = &value["suites"][0]["not_passed"];
    assert_eq!(not_passed.as_array().map(Vec::len), Some(1));
    assert_eq!(not_passed[0]["name"], "bad");
    assert_eq!(
        not_passed[0]["errors"][0],
        json!({"expected": 1, "actual": 2, "description": "x == 1"})
    );
    assert_eq!(not_passed[0]["exceptions"]["count"], 2);
    assert_eq!(not_passed[0]["exceptions"]["first"], json!({"m": "first"}));
    Ok(())
}

#[test]
fn extra_assertion_keys_are_preserved() -> TestResult {
    let mut agg = ResultAggregator::new("xUnit");
    let recorded = agg.ingest(&result_message_with(
        "S",
        json!({"name": "t", "result": "failed", "errors": [{"description": "d", "file": "a.cpp"}]}),
    ))?;
    assert_eq!(recorded.errors[0].extra["file"], json!("a.cpp"));

    let record = serde_json::to_value(recorded.to_record())?;
    assert_eq!(record["errors"][0]["file"], "a.cpp");
    Ok(())
}

#[test]
fn testcase_xml_children() -> TestResult {
    let mut agg = ResultAggregator::new("xUnit");

    let passed = agg.ingest(&result_message("S", "ok", "passed", 1_500_000))?.to_xml()?;
    assert_eq!(passed, r#"<testcase name="ok" assertions="1" time="1.5"/>"#);

    let whole = agg.ingest(&result_message("S", "whole", "passed", 2_000_000))?.to_xml()?;
    assert_eq!(whole, r#"<testcase name="whole" assertions="1" time="2.0"/>"#);

    let expired = agg.ingest(&result_message("S", "slow", "expired", 0))?.to_xml()?;
    assert!(expired.contains(r#"<failure type="ExpiredError"/>"#), "{expired}");

    let failed = agg
        .ingest(&result_message_with(
            "S",
            json!({
                "name": "bad",
                "result": "failed",
                "errors": [{"description": "a < b"}],
                "exceptions": ["oops"],
            }),
        ))?
        .to_xml()?;
    let error_at = failed.find(r#"<error type="ExceptionThrownError">"#).ok_or("no error")?;
    let failure_at = failed.find(r#"<failure type="AssertionError">"#).ok_or("no failure")?;
    assert!(error_at < failure_at, "exceptions come first: {failed}");
    assert!(failed.contains("&lt;"), "text is escaped: {failed}");

    let unknown = agg.ingest(&result_message("S", "odd", "flaky", 0))?.to_xml()?;
    assert_eq!(unknown, r#"<testcase name="odd" assertions="1" time="0.0"/>"#);
    Ok(())
}

#[test]
fn identifiers_split_at_first_at_sign() {
    let id = TestIdentifier::from("Suite@case@variant");
    assert_eq!(id.suite(), "Suite");
    assert_eq!(id.test_name(), "case@variant");

    let bare = TestIdentifier::from("bare");
    assert_eq!(bare.suite(), "");
    assert_eq!(bare.test_name(), "bare");

    let list = parse_test_list("A@t1\r\n\n  B@t2  \n\n");
    let raw: Vec<&str> = list.iter().map(TestIdentifier::as_str).collect();
    assert_eq!(raw, vec!["A@t1", "B@t2"]);
}
