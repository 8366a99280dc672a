// src/report/xml.rs

//! Serialize the result tree as JUnit-style XML.

use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::errors::ReportError;
use crate::model::{ResultCounts, TestFrameworkResult, TestResult, TestSuiteResult};

static TESTSUITES_TAG: &str = "testsuites";
static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
static FAILURE_TAG: &str = "failure";
static ERROR_TAG: &str = "error";
static SKIPPED_TAG: &str = "skipped";

static EXCEPTION_TYPE: &str = "ExceptionThrownError";
static ASSERTION_TYPE: &str = "AssertionError";
static EXPIRED_TYPE: &str = "ExpiredError";

/// Render the complete report, including the XML declaration.
pub fn render_report(framework: &TestFrameworkResult) -> Result<Vec<u8>, ReportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_framework(framework, &mut writer)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Render a single `testcase` element without declaration.
pub fn render_testcase(result: &TestResult) -> Result<String, ReportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    serialize_testcase(result, &mut writer)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn serialize_framework(
    framework: &TestFrameworkResult,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), ReportError> {
    let mut tag = BytesStart::new(TESTSUITES_TAG);
    tag.push_attribute(("name", framework.name()));
    tag.push_attribute(("timestamp", framework.timestamp().to_string().as_str()));
    push_counts(&mut tag, &framework.counts());
    writer.write_event(Event::Start(tag))?;

    for suite in framework.suites() {
        serialize_suite(suite, writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new(TESTSUITES_TAG)))?;
    Ok(())
}

fn serialize_suite(
    suite: &TestSuiteResult,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), ReportError> {
    let mut tag = BytesStart::new(TESTSUITE_TAG);
    tag.push_attribute(("name", suite.name()));
    tag.push_attribute(("timestamp", suite.timestamp().to_string().as_str()));
    push_counts(&mut tag, &suite.counts());

    if suite.tests().is_empty() {
        writer.write_event(Event::Empty(tag))?;
        return Ok(());
    }

    writer.write_event(Event::Start(tag))?;
    for test in suite.tests() {
        serialize_testcase(test, writer)?;
    }
    writer.write_event(Event::End(BytesEnd::new(TESTSUITE_TAG)))?;
    Ok(())
}

fn push_counts(tag: &mut BytesStart<'_>, counts: &ResultCounts) {
    tag.push_attribute(("tests", counts.tests.to_string().as_str()));
    tag.push_attribute(("failures", counts.failures.to_string().as_str()));
    tag.push_attribute(("errors", counts.errors.to_string().as_str()));
    tag.push_attribute(("skipped", counts.skipped.to_string().as_str()));
    tag.push_attribute(("time", format_seconds(counts.time).as_str()));
}

/// Seconds as a decimal; whole values keep a trailing `.0`.
fn format_seconds(secs: f64) -> String {
    if secs.is_finite() && secs.fract() == 0.0 {
        format!("{secs:.1}")
    } else {
        secs.to_string()
    }
}

/// One `testcase` element.
///
/// Children, in order: one `error` per exception, one `failure` per
/// assertion error, an empty `ExpiredError` failure for expired tests and an
/// empty `skipped` for skipped ones.
fn serialize_testcase(
    result: &TestResult,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), ReportError> {
    let mut tag = BytesStart::new(TESTCASE_TAG);
    tag.push_attribute(("name", result.name.as_str()));
    tag.push_attribute(("assertions", result.assertions.to_string().as_str()));
    tag.push_attribute(("time", format_seconds(result.duration_secs()).as_str()));

    let has_children = result.did_error()
        || !result.errors.is_empty()
        || result.did_expire()
        || result.was_skipped();
    if !has_children {
        writer.write_event(Event::Empty(tag))?;
        return Ok(());
    }

    writer.write_event(Event::Start(tag))?;

    for exception in &result.exceptions {
        let text = serde_json::to_string(exception)?;
        serialize_typed(ERROR_TAG, EXCEPTION_TYPE, Some(&text), writer)?;
    }

    for error in &result.errors {
        let text = serde_json::to_string(error)?;
        serialize_typed(FAILURE_TAG, ASSERTION_TYPE, Some(&text), writer)?;
    }

    if result.did_expire() {
        serialize_typed(FAILURE_TAG, EXPIRED_TYPE, None, writer)?;
    }

    if result.was_skipped() {
        writer.write_event(Event::Empty(BytesStart::new(SKIPPED_TAG)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(TESTCASE_TAG)))?;
    Ok(())
}

fn serialize_typed(
    tag_name: &str,
    ty: &str,
    text: Option<&str>,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), ReportError> {
    let mut tag = BytesStart::new(tag_name);
    tag.push_attribute(("type", ty));

    match text {
        Some(text) => {
            writer.write_event(Event::Start(tag))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
            writer.write_event(Event::End(BytesEnd::new(tag_name)))?;
        }
        None => writer.write_event(Event::Empty(tag))?,
    }
    Ok(())
}
