// tests/end_to_end.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use remotest::config::ConfigFile;
use remotest::engine::RunPhase;
use remotest::errors::RemotestError;
use remotest::fs::FileSystem;
use remotest::fs::mock::MockFileSystem;
use remotest::orchestrator::Orchestrator;
use remotest::server::ConnectionListener;
use remotest_test_utils::builders::ConfigFileBuilder;
use remotest_test_utils::fake_launcher::FakeLauncher;
use remotest_test_utils::fake_operator::{ManualCancelSource, ScriptedConsole};
use remotest_test_utils::runner_client::{ScriptedRunner, result_message};
use remotest_test_utils::with_timeout;

type TestResult = Result<(), Box<dyn Error>>;

async fn bind(cfg: &ConfigFile) -> Result<(ConnectionListener, SocketAddr), Box<dyn Error>> {
    let tcp = TcpListener::bind("127.0.0.1:0").await?;
    let addr = tcp.local_addr()?;
    Ok((ConnectionListener::from_listener(tcp, cfg.server.timeout), addr))
}

/// Spawn a runner client for launch `n`; a failing script panics the task,
/// which the test then notices as a timeout.
fn spawn_client<F, Fut>(addr: SocketAddr, script: F)
where
    F: FnOnce(ScriptedRunner<tokio::net::TcpStream>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let runner = ScriptedRunner::connect(addr).await.expect("connect to server");
        if let Err(e) = script(runner).await {
            panic!("runner script failed: {e:#}");
        }
    });
}

#[tokio::test]
async fn automatic_run_over_tcp() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new().timeout("2s").build();
    let (listener, addr) = bind(&cfg).await?;
    let fs = Arc::new(MockFileSystem::new());

    let base = FakeLauncher::new();
    let handle = base.clone();
    let launcher = base.on_launch(move |_n| {
        let handle = handle.clone();
        spawn_client(addr, move |mut runner| async move {
            runner.expect_command("TESTS").await?;
            runner.reply("A@t1\nA@t2\n").await?;
            runner.expect_command("RUN A@t1").await?;
            runner.reply(&result_message("A", "t1", "passed", 500_000)).await?;
            runner.expect_command("RUN A@t2").await?;
            runner.reply(&result_message("A", "t2", "failed", 500_000)).await?;
            runner.expect_command("EXIT").await?;
            handle.exit_current();
            Ok(())
        });
    });

    let orchestrator = Orchestrator::from_config(cfg)
        .with_launcher(launcher.clone())
        .with_file_system(Arc::clone(&fs) as Arc<dyn FileSystem>);
    let outcome = with_timeout(orchestrator.run_with_listener(listener)).await?;

    assert_eq!(outcome.phase, RunPhase::Finished);
    assert_eq!(outcome.progress_index, 2);
    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.tests_recorded, 2);
    assert!(!outcome.operator_cancelled);
    assert!(outcome.export_error.is_none());
    assert_eq!(outcome.runner.launches, 1);
    assert_eq!(launcher.kills(), 0);

    let counts = outcome.counts.ok_or("no counts")?;
    assert_eq!(counts.passed, 1);
    assert_eq!(counts.failures, 1);
    assert_eq!(fs.paths().len(), 2);
    Ok(())
}

#[tokio::test]
async fn hung_runner_is_rebooted_and_run_resumes() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new().timeout("200ms").build();
    let (listener, addr) = bind(&cfg).await?;

    let base = FakeLauncher::new();
    let handle = base.clone();
    let launcher = base.on_launch(move |n| {
        let handle = handle.clone();
        if n == 1 {
            spawn_client(addr, move |mut runner| async move {
                runner.expect_command("TESTS").await?;
                runner.reply("A@t1\nA@t2").await?;
                runner.expect_command("RUN A@t1").await?;
                // Hang until the server gives up on us.
                let next = runner.next_command().await?;
                anyhow::ensure!(next.is_none(), "unexpected command {next:?}");
                Ok(())
            });
        } else {
            spawn_client(addr, move |mut runner| async move {
                runner.expect_command("RUN A@t2").await?;
                runner.reply(&result_message("A", "t2", "passed", 10)).await?;
                runner.expect_command("EXIT").await?;
                handle.exit_current();
                Ok(())
            });
        }
    });

    let orchestrator = Orchestrator::from_config(cfg)
        .with_launcher(launcher.clone())
        .with_file_system(Arc::new(MockFileSystem::new()));
    let outcome = with_timeout(orchestrator.run_with_listener(listener)).await?;

    assert_eq!(outcome.phase, RunPhase::Finished);
    assert_eq!(outcome.tests_recorded, 2);
    assert_eq!(outcome.runner.launches, 2);
    assert_eq!(outcome.runner.reboots, 1);
    assert_eq!(launcher.kills(), 1);
    let counts = outcome.counts.ok_or("no counts")?;
    assert_eq!(counts.failures, 1, "the hung test is recorded as failed");
    Ok(())
}

#[tokio::test]
async fn operator_cancel_stops_the_run_without_reports() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new().timeout("5s").build();
    let (listener, addr) = bind(&cfg).await?;
    let fs = Arc::new(MockFileSystem::new());
    let (cancel, trigger) = ManualCancelSource::new();
    let started = Arc::new(Notify::new());

    let base = FakeLauncher::new();
    let ready = Arc::clone(&started);
    let launcher = base.on_launch(move |_n| {
        let ready = Arc::clone(&ready);
        spawn_client(addr, move |mut runner| async move {
            runner.expect_command("TESTS").await?;
            runner.reply("A@t1\nA@t2").await?;
            runner.expect_command("RUN A@t1").await?;
            ready.notify_one();
            // Never answer; wait for the server to drop us.
            let _ = runner.next_command().await?;
            Ok(())
        });
    });

    let orchestrator = Orchestrator::from_config(cfg)
        .with_launcher(launcher.clone())
        .with_cancel_source(Box::new(cancel))
        .with_file_system(Arc::clone(&fs) as Arc<dyn FileSystem>);

    let (outcome, ()) = with_timeout(async {
        tokio::join!(orchestrator.run_with_listener(listener), async {
            started.notified().await;
            trigger.fire();
        })
    })
    .await;
    let outcome = outcome?;

    assert!(outcome.operator_cancelled);
    assert_eq!(outcome.phase, RunPhase::Running);
    assert_eq!(outcome.progress_index, 0);
    assert_eq!(outcome.tests_recorded, 0);
    assert!(fs.paths().is_empty());
    // The fake runner ignores the grace period and gets killed.
    assert_eq!(launcher.kills(), 1);
    Ok(())
}

#[tokio::test]
async fn manual_run_over_tcp() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new().mode("manual").timeout("2s").build();
    let (listener, addr) = bind(&cfg).await?;
    let console = ScriptedConsole::new(["HELLO", "exit"]);
    let shown = console.shown();

    let base = FakeLauncher::new();
    let handle = base.clone();
    let launcher = base.on_launch(move |_n| {
        let handle = handle.clone();
        spawn_client(addr, move |mut runner| async move {
            runner.expect_command("HELLO").await?;
            runner.reply("hi there").await?;
            runner.expect_command("exit").await?;
            handle.exit_current();
            Ok(())
        });
    });

    let orchestrator = Orchestrator::from_config(cfg)
        .with_launcher(launcher.clone())
        .with_console(Box::new(console))
        .with_file_system(Arc::new(MockFileSystem::new()));
    let outcome = with_timeout(orchestrator.run_with_listener(listener)).await?;

    assert_eq!(outcome.phase, RunPhase::Finished);
    assert_eq!(outcome.tests_recorded, 0);
    assert_eq!(outcome.runner.launches, 1);
    assert_eq!(launcher.kills(), 0, "manual mode waits for the runner to exit");
    assert_eq!(*shown.lock().unwrap(), vec!["hi there".to_string()]);
    Ok(())
}

#[tokio::test]
async fn manual_run_can_be_cancelled_before_the_runner_connects() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new().mode("manual").timeout("2s").build();
    let (listener, _addr) = bind(&cfg).await?;
    let (cancel, trigger) = ManualCancelSource::new();
    let launcher = FakeLauncher::new();
    let watcher = launcher.clone();

    let orchestrator = Orchestrator::from_config(cfg)
        .with_launcher(launcher.clone())
        .with_cancel_source(Box::new(cancel))
        .with_console(Box::new(ScriptedConsole::new(Vec::<String>::new())))
        .with_file_system(Arc::new(MockFileSystem::new()));

    let (outcome, ()) = with_timeout(async {
        tokio::join!(orchestrator.run_with_listener(listener), async {
            while watcher.launches() == 0 {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
            trigger.fire();
        })
    })
    .await;
    let outcome = outcome?;

    assert!(outcome.operator_cancelled);
    assert_eq!(outcome.phase, RunPhase::Waiting);
    assert_eq!(outcome.runner.launches, 1);
    assert_eq!(launcher.kills(), 1, "an idle runner is killed on cancel");
    Ok(())
}

#[tokio::test]
async fn runner_that_cannot_launch_fails_the_run() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new().build();
    let (listener, _addr) = bind(&cfg).await?;
    let launcher = FakeLauncher::new();
    launcher.fail_launches(true);

    let orchestrator = Orchestrator::from_config(cfg)
        .with_launcher(launcher)
        .with_file_system(Arc::new(MockFileSystem::new()));
    let result = with_timeout(orchestrator.run_with_listener(listener)).await;

    assert!(matches!(result, Err(RemotestError::LaunchError(_))));
    Ok(())
}

#[tokio::test]
async fn export_failure_is_reported_in_the_outcome() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new().timeout("2s").build();
    let (listener, addr) = bind(&cfg).await?;
    let fs = Arc::new(MockFileSystem::new());
    fs.fail_writes(true);

    let base = FakeLauncher::new();
    let handle = base.clone();
    let launcher = base.on_launch(move |_n| {
        let handle = handle.clone();
        spawn_client(addr, move |mut runner| async move {
            runner.expect_command("TESTS").await?;
            runner.reply("A@t1").await?;
            runner.expect_command("RUN A@t1").await?;
            runner.reply(&result_message("A", "t1", "passed", 10)).await?;
            // EXIT and stop still follow a failed export.
            runner.expect_command("EXIT").await?;
            handle.exit_current();
            Ok(())
        });
    });

    let orchestrator = Orchestrator::from_config(cfg)
        .with_launcher(launcher)
        .with_file_system(Arc::clone(&fs) as Arc<dyn FileSystem>);
    let outcome = with_timeout(orchestrator.run_with_listener(listener)).await?;

    assert_eq!(outcome.phase, RunPhase::Finished);
    assert!(outcome.export_error.is_some());
    Ok(())
}
