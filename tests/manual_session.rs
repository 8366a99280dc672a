// tests/manual_session.rs

mod common;
use crate::common::{Harness, init_tracing, session};

use std::error::Error;

use remotest::engine::{ModeHandler, RunPhase};
use remotest::types::ExecutionMode;
use remotest_test_utils::fake_operator::ScriptedConsole;
use remotest_test_utils::with_timeout;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn commands_are_forwarded_and_responses_shown() -> TestResult {
    init_tracing();
    let console = ScriptedConsole::new(["STATUS", "RUN Suite@case", "exit"]);
    let shown = console.shown();
    let mut h = Harness::with_handler(ModeHandler::manual(Box::new(console)), false);
    assert_eq!(h.machine.state().mode(), ExecutionMode::Manual);

    let (mut conn, mut runner) = session();
    let script = async move {
        runner.expect_command("STATUS").await?;
        runner.reply("idle\n").await?;
        runner.expect_command("RUN Suite@case").await?;
        runner.reply("{\"anything\": true}").await?;
        runner.expect_command("exit").await?;
        anyhow::Ok(runner)
    };

    let ((), runner) =
        with_timeout(async { tokio::join!(h.machine.handle_session(&mut conn), script) }).await;
    runner?;

    assert_eq!(
        *shown.lock().unwrap(),
        vec!["idle".to_string(), "{\"anything\": true}".to_string()]
    );
    assert_eq!(h.machine.state().phase(), RunPhase::Finished);
    assert!(h.signals.is_stopped());
    // Manual responses are never treated as results.
    assert_eq!(h.machine.results().test_count(), 0);
    assert!(h.fs.paths().is_empty());
    Ok(())
}

#[tokio::test]
async fn exit_command_ends_session_without_waiting_for_a_reply() -> TestResult {
    init_tracing();
    let console = ScriptedConsole::new(["  Exit "]);
    let shown = console.shown();
    let mut h = Harness::with_handler(ModeHandler::manual(Box::new(console)), false);

    let (mut conn, mut runner) = session();
    let script = async move {
        runner.expect_command("  Exit ").await?;
        anyhow::Ok(runner)
    };

    // The runner never answers; the session must still end well within
    // the read timeout.
    let ((), runner) =
        with_timeout(async { tokio::join!(h.machine.handle_session(&mut conn), script) }).await;
    runner?;

    assert_eq!(h.machine.state().phase(), RunPhase::Finished);
    assert!(shown.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn quit_is_an_exit_command_too() -> TestResult {
    init_tracing();
    let console = ScriptedConsole::new(["QUIT"]);
    let mut h = Harness::with_handler(ModeHandler::manual(Box::new(console)), false);

    let (mut conn, mut runner) = session();
    let script = async move {
        runner.expect_command("QUIT").await?;
        anyhow::Ok(runner)
    };
    let ((), runner) =
        with_timeout(async { tokio::join!(h.machine.handle_session(&mut conn), script) }).await;
    runner?;

    assert_eq!(h.machine.state().phase(), RunPhase::Finished);
    Ok(())
}

#[tokio::test]
async fn closed_operator_input_sends_exit() -> TestResult {
    init_tracing();
    let console = ScriptedConsole::new(Vec::<String>::new());
    let mut h = Harness::with_handler(ModeHandler::manual(Box::new(console)), false);

    let (mut conn, mut runner) = session();
    let script = async move {
        runner.expect_command("EXIT").await?;
        anyhow::Ok(runner)
    };
    let ((), runner) =
        with_timeout(async { tokio::join!(h.machine.handle_session(&mut conn), script) }).await;
    runner?;

    assert_eq!(h.machine.state().phase(), RunPhase::Finished);
    Ok(())
}

#[tokio::test]
async fn silent_runner_ends_the_manual_session() -> TestResult {
    init_tracing();
    let console = ScriptedConsole::new(["PING", "exit"]);
    let mut h = Harness::with_handler(ModeHandler::manual(Box::new(console)), false);

    let (mut conn, mut runner) = session();
    let script = async move {
        runner.expect_command("PING").await?;
        anyhow::Ok(runner)
    };
    let ((), runner) =
        with_timeout(async { tokio::join!(h.machine.handle_session(&mut conn), script) }).await;
    drop(runner?);

    // Stop was raised at session start; the phase only moves on a clean exit.
    assert_eq!(h.machine.state().phase(), RunPhase::Running);
    assert!(h.signals.is_stopped());
    Ok(())
}
