// src/report/json.rs

use crate::errors::ReportError;
use crate::model::TestFrameworkResult;

/// Render the structured report: the full tree with durations in seconds.
pub fn render_report(framework: &TestFrameworkResult) -> Result<Vec<u8>, ReportError> {
    let mut bytes = serde_json::to_vec_pretty(&framework.to_report())?;
    bytes.push(b'\n');
    Ok(bytes)
}
