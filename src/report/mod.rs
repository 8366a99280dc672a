// src/report/mod.rs

//! Report export: an XML report in the JUnit layout and a JSON report
//! mirroring the result tree.
//!
//! File names are derived from the run name with `:` replaced by `_`.

pub mod json;
pub mod xml;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use crate::errors::ReportError;
use crate::fs::FileSystem;
use crate::model::TestFrameworkResult;

/// Paths of the reports written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReports {
    pub xml: PathBuf,
    pub json: PathBuf,
}

/// Writes the XML and JSON reports into one output directory.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    fs: Arc<dyn FileSystem>,
    output_dir: PathBuf,
}

impl ReportExporter {
    pub fn new(fs: Arc<dyn FileSystem>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the reports for `run_name` will be written.
    pub fn paths_for(&self, run_name: &str) -> ExportedReports {
        let base = report_basename(run_name);
        ExportedReports {
            xml: self.output_dir.join(format!("{base}.xml")),
            json: self.output_dir.join(format!("{base}.json")),
        }
    }

    /// Write both reports.
    ///
    /// Each report is attempted even if the other fails; the first failure
    /// is returned.
    pub fn export(&self, framework: &TestFrameworkResult) -> Result<ExportedReports, ReportError> {
        let paths = self.paths_for(framework.name());

        let xml = self.write_report(&paths.xml, "XML", || xml::render_report(framework));
        let json = self.write_report(&paths.json, "JSON", || json::render_report(framework));

        xml.and(json).map(|()| paths)
    }

    fn write_report(
        &self,
        path: &Path,
        kind: &str,
        render: impl FnOnce() -> Result<Vec<u8>, ReportError>,
    ) -> Result<(), ReportError> {
        info!(path = %path.display(), "writing {kind} result");
        let result = render().and_then(|bytes| {
            self.fs
                .write(path, &bytes)
                .map_err(ReportError::Write)
        });
        match &result {
            Ok(()) => info!(path = %path.display(), "{kind} result successfully written"),
            Err(e) => error!(path = %path.display(), error = %e, "failed to produce {kind} result"),
        }
        result
    }
}

/// Base file name for a run's reports.
pub fn report_basename(run_name: &str) -> String {
    run_name.replace(':', "_")
}
