use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use remotest::engine::{ExecutionStateMachine, ModeHandler, RunPhase, RunSettings, RunSignals, RunState};
use remotest::fs::FileSystem;
use remotest::fs::mock::MockFileSystem;
use remotest::model::TestIdentifier;
use remotest::protocol::Connection;
use remotest::report::ReportExporter;
use remotest::types::ExecutionMode;
use remotest_test_utils::runner_client::{ScriptedRunner, result_message};

fn machine() -> (ExecutionStateMachine, RunSignals) {
    let signals = RunSignals::new();
    let fs: Arc<dyn FileSystem> = Arc::new(MockFileSystem::new());
    let machine = ExecutionStateMachine::new(
        ModeHandler::automatic(),
        RunSettings::new("prop"),
        signals.clone(),
        ReportExporter::new(fs, "results"),
    );
    (machine, signals)
}

/// Run `passing` tests, then let test `passing` hang, in a list of `total`.
fn hang_after(passing: usize, total: usize) -> (ExecutionStateMachine, RunSignals) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    rt.block_on(async move {
        let (mut machine, signals) = machine();
        let (server, client) = tokio::io::duplex(64 * 1024);
        let mut conn = Connection::new(server, "prop", Duration::from_millis(30));
        let mut runner = ScriptedRunner::new(client);

        let list: Vec<String> = (0..total).map(|i| format!("P@t{i}")).collect();
        let script = async move {
            runner.expect_command("TESTS").await?;
            runner.reply(&list.join("\n")).await?;
            for name in list.iter().take(passing) {
                runner.expect_command(&format!("RUN {name}")).await?;
                let test = name.trim_start_matches("P@");
                runner.reply(&result_message("P", test, "passed", 1)).await?;
            }
            runner.expect_command(&format!("RUN {}", list[passing])).await?;
            anyhow::Ok(runner)
        };

        let ((), runner) = tokio::join!(machine.handle_session(&mut conn), script);
        runner.expect("runner script");
        (machine, signals)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn timeout_advances_exactly_past_the_hung_test(passing in 0usize..6, extra in 0usize..3) {
        let total = passing + 1 + extra;
        let (machine, signals) = hang_after(passing, total);

        prop_assert_eq!(machine.state().progress_index(), passing + 1);
        prop_assert_eq!(machine.results().test_count(), passing + 1);
        prop_assert!(signals.reboot.is_requested());

        let finished = machine.state().phase() == RunPhase::Finished;
        prop_assert_eq!(finished, extra == 0);
        prop_assert_eq!(signals.is_stopped(), extra == 0);

        // Every attempted test appears once, whether real or synthetic.
        let fw = machine.results().framework().expect("framework");
        let names: Vec<&str> = fw
            .suite("P")
            .expect("suite P")
            .tests()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        prop_assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn progress_index_is_bounded(total in 0usize..20, advances in 0usize..40) {
        let mut state = RunState::new(ExecutionMode::Automatic);
        state.assign_tests((0..total).map(|i| TestIdentifier::from(format!("S@{i}"))).collect());

        for _ in 0..advances {
            let before = state.progress_index();
            let after = state.advance();
            prop_assert!(after <= total);
            prop_assert!(after == before || after == before + 1);
        }

        prop_assert_eq!(state.progress_index(), advances.min(total));
        prop_assert_eq!(state.is_complete(), advances >= total);
        prop_assert_eq!(state.current_test().is_none(), state.is_complete());
    }

    #[test]
    fn test_list_is_assigned_once(first in 1usize..5, second in 1usize..5) {
        let mut state = RunState::new(ExecutionMode::Automatic);
        let list = |n: usize, tag: &str| -> Vec<TestIdentifier> {
            (0..n).map(|i| TestIdentifier::from(format!("{tag}@{i}"))).collect()
        };

        prop_assert!(state.assign_tests(list(first, "a")));
        prop_assert!(!state.assign_tests(list(second, "b")));
        prop_assert_eq!(state.total(), first);
        prop_assert_eq!(state.tests()[0].suite(), "a");
    }
}
