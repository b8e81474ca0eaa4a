use super::*;
use std::path::PathBuf;

fn python() -> Option<PathBuf> {
    let path = PathBuf::from("python3");
    if interpreter_available(&path) {
        Some(path)
    } else {
        eprintln!("python3 not available, skipping session test");
        None
    }
}

#[tokio::test]
async fn test_namespace_is_shared_across_blocks() {
    let Some(python) = python() else { return };
    let dir = tempfile::tempdir().unwrap();
    let mut session = KernelSession::start(&python, dir.path()).await.unwrap();

    let first = session.execute("x = 40").await.unwrap();
    assert!(first.ok);
    assert!(first.result.is_none());

    let second = session.execute("x + 2").await.unwrap();
    assert!(second.ok);
    assert_eq!(second.result.as_deref(), Some("42"));

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stdout_is_captured() {
    let Some(python) = python() else { return };
    let dir = tempfile::tempdir().unwrap();
    let mut session = KernelSession::start(&python, dir.path()).await.unwrap();

    let outcome = session.execute("print('hello')").await.unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.stdout, "hello\n");

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failure_reports_traceback_and_session_survives() {
    let Some(python) = python() else { return };
    let dir = tempfile::tempdir().unwrap();
    let mut session = KernelSession::start(&python, dir.path()).await.unwrap();

    let failed = session.execute("1 / 0").await.unwrap();
    assert!(!failed.ok);
    assert!(failed.error.as_deref().unwrap().contains("ZeroDivisionError"));

    // The session keeps serving requests after a block failure
    let after = session.execute("2 + 2").await.unwrap();
    assert!(after.ok);
    assert_eq!(after.result.as_deref(), Some("4"));

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_missing_interpreter_is_process_failure() {
    let result = KernelSession::start(
        std::path::Path::new("/nonexistent/interpreter"),
        std::path::Path::new("."),
    )
    .await;
    assert!(matches!(
        result.unwrap_err(),
        ExecError::ProcessFailure { .. }
    ));
}
