use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use remotest::fs::FileSystem;
use remotest::fs::mock::MockFileSystem;
use remotest::model::FrameworkReport;
use remotest::report::ReportExporter;
use remotest::results::ResultAggregator;
use remotest_test_utils::runner_client::result_message_with;

fn finite_duration() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |d| d.is_finite())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn json_report_time_is_duration_in_seconds(duration in finite_duration()) {
        let mut agg = ResultAggregator::new("prop");
        let recorded = agg.ingest(&result_message_with(
            "S",
            json!({"name": "t", "result": "passed", "duration": duration}),
        ))?;
        prop_assert_eq!(recorded.duration, duration);

        let fs = Arc::new(MockFileSystem::new());
        let exporter = ReportExporter::new(Arc::clone(&fs) as Arc<dyn FileSystem>, "out");
        let framework = agg.framework().ok_or_else(|| TestCaseError::fail("no framework"))?;
        let paths = exporter.export(framework)?;

        let text = fs
            .read_to_string(&paths.json)
            .map_err(|e| TestCaseError::fail(format!("{e:#}")))?;
        let report: FrameworkReport = serde_json::from_str(&text)?;
        prop_assert_eq!(report.testsuites[0].tests[0].time, duration / 1_000_000.0);
    }
}
