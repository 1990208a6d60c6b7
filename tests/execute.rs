#![cfg(unix)]

use std::io;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use shellout::CaptureBuffer;
use shellout::CommandConfig;
use shellout::ExecutionContext;
use shellout::ExitCodeUnavailable;
use shellout::FileCommandLogger;
use shellout::InputStream;
use shellout::LocalCommand;
use shellout::OutputStream;
use shellout::ShellCommand;
use shellout::Signal;
use tokio::io::AsyncReadExt;
use tracing_test::traced_test;

fn sh(script: &str) -> LocalCommand {
    ["sh", "-c", script].into_iter().collect()
}

/// A context whose visible streams are in-memory buffers, returned alongside it.
fn context() -> (ExecutionContext, CaptureBuffer, CaptureBuffer) {
    let shown_stdout = CaptureBuffer::new();
    let shown_stderr = CaptureBuffer::new();
    let mut context = ExecutionContext::new().unwrap();
    context
        .set_stdin(InputStream::Null)
        .set_stdout(OutputStream::buffer(shown_stdout.clone()))
        .set_stderr(OutputStream::buffer(shown_stderr.clone()));
    (context, shown_stdout, shown_stderr)
}

#[tokio::test]
async fn test_fully_silent() {
    let (context, shown_stdout, shown_stderr) = context();
    let result = context
        .execute_fully_silent(&sh("echo hello"))
        .await
        .unwrap();

    assert_eq!(result.output(), "hello\n");
    assert_eq!(result.error(), "");
    assert!(result.successful());
    assert_eq!(result.exit_code(), Ok(0));
    assert!(result.completion_error().is_none());
    assert!(shown_stdout.is_empty());
    assert!(shown_stderr.is_empty());
}

#[tokio::test]
async fn test_exit_code() {
    let (context, _, _) = context();
    let result = context
        .execute_fully_silent(&sh("echo failing >&2; exit 28"))
        .await
        .unwrap();

    assert_eq!(result.exit_code(), Ok(28));
    assert!(!result.successful());
    assert_eq!(result.trimmed_error(), "failing");

    let state = result.state().unwrap();
    assert!(state.exited());
    assert!(!state.signaled());
    assert_eq!(state.pid(), result.pid());
    assert!(result
        .state_string()
        .contains("Exited: true, Exit Code: 28, Success: false"));
}

#[tokio::test]
async fn test_detached() {
    let (context, _, _) = context();
    let mut result = context
        .execute_fully_silent_detached(&sh("sleep 0.2; echo done; exit 3"))
        .await
        .unwrap();

    assert!(result.pid().is_some());
    assert_eq!(
        result.exit_code(),
        Err(ExitCodeUnavailable { pid: result.pid() })
    );
    assert!(!result.successful());
    assert!(!result.is_complete());

    result.wait().await.unwrap();
    assert_eq!(result.exit_code(), Ok(3));
    assert_eq!(result.output(), "done\n");

    // Waiting again returns immediately.
    result.wait().await.unwrap();
    assert_eq!(result.exit_code(), Ok(3));
}

#[tokio::test]
async fn test_stdin() {
    let (mut context, _, _) = context();
    context.set_stdin(InputStream::bytes("my input"));
    let result = context
        .execute(
            CommandConfig::fully_silent().with_stdin(),
            &sh(r#"input=$(cat); echo "$input"; echo "$input" >&2"#),
        )
        .await
        .unwrap();

    assert_eq!(result.output(), "my input\n");
    assert_eq!(result.error(), "my input\n");
}

#[tokio::test]
async fn test_stdin_not_connected() {
    let (mut context, _, _) = context();
    context.set_stdin(InputStream::bytes("ignored\n"));
    let result = context.execute_fully_silent(&sh("cat")).await.unwrap();

    assert_eq!(result.output(), "");
    assert!(result.successful());
}

#[tokio::test]
async fn test_debug_shows_output() {
    let (context, shown_stdout, shown_stderr) = context();
    let result = context
        .execute_debug(&sh("echo out; echo err >&2"))
        .await
        .unwrap();

    assert_eq!(result.output(), "out\n");
    assert_eq!(result.error(), "err\n");
    assert_eq!(shown_stdout.contents(), "out\n");
    assert_eq!(shown_stderr.contents(), "err\n");
}

#[tokio::test]
async fn test_silent_shows_stderr() {
    let (context, shown_stdout, shown_stderr) = context();
    let result = context
        .execute_silent(&sh("echo out; echo err >&2"))
        .await
        .unwrap();

    assert_eq!(result.output(), "out\n");
    assert!(shown_stdout.is_empty());
    assert_eq!(shown_stderr.contents(), "err\n");
}

#[tokio::test]
async fn test_raw_captures_nothing() {
    let (context, shown_stdout, _) = context();
    let result = context
        .execute(
            CommandConfig {
                raw_stdout: true,
                ..CommandConfig::debug()
            },
            &sh("true"),
        )
        .await
        .unwrap();

    assert!(result.successful());
    assert_eq!(result.output(), "");
    assert!(shown_stdout.is_empty());
}

#[tokio::test]
async fn test_spawn_error() {
    let (context, _, _) = context();
    let err = context
        .execute_debug(&LocalCommand::from_string("shellout-missing-binary --flag"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::NotFound);
    assert_eq!(err.command, "shellout-missing-binary --flag");
    assert_eq!(err.working_dir.as_path(), context.working_dir());
}

#[tokio::test]
async fn test_empty_command() {
    let (context, _, _) = context();
    let err = context
        .execute_debug(&LocalCommand::from_string("   "))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_invalid_working_dir() {
    let (mut context, _, _) = context();
    context.set_working_dir("/shellout/does/not/exist");
    let err = context.execute_debug(&sh("true")).await.unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::NotFound);
    assert!(err.to_string().contains("/shellout/does/not/exist"));
}

#[tokio::test]
async fn test_env_overrides() {
    let (mut context, _, _) = context();
    context
        .set_env("SHELLOUT_GREETING", "hi there")
        .set_env("HOME", "/shellout-home");
    let result = context
        .execute_fully_silent(&sh(r#"echo "$SHELLOUT_GREETING"; echo "$HOME""#))
        .await
        .unwrap();

    assert_eq!(result.output(), "hi there\n/shellout-home\n");
}

#[tokio::test]
async fn test_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (mut context, _, _) = context();
    context.set_working_dir(dir.path().to_str().unwrap());
    let result = context.execute_fully_silent(&sh("pwd -P")).await.unwrap();

    assert_eq!(
        std::fs::canonicalize(result.trimmed_output()).unwrap(),
        std::fs::canonicalize(dir.path()).unwrap()
    );
}

#[tokio::test]
async fn test_large_output_on_both_streams() {
    // Much more than a pipe buffer on each stream, interleaved.
    let (context, _, _) = context();
    let result = context
        .execute_fully_silent(&sh(
            r#"i=0
            while [ "$i" -lt 5000 ]; do
                echo "stdout line $i with some padding to fill the pipe quickly"
                echo "stderr line $i with some padding to fill the pipe quickly" >&2
                i=$((i + 1))
            done"#,
        ))
        .await
        .unwrap();

    assert!(result.successful());
    assert_eq!(result.output().lines().count(), 5000);
    assert_eq!(result.error().lines().count(), 5000);
    assert_eq!(
        result.output().lines().last(),
        Some("stdout line 4999 with some padding to fill the pipe quickly")
    );
}

#[tokio::test]
async fn test_duplex_stream() {
    let (write, mut read) = tokio::io::duplex(1024);
    let reader = tokio::spawn(async move {
        let mut contents = String::new();
        read.read_to_string(&mut contents).await.unwrap();
        contents
    });

    let (mut context, _, _) = context();
    context.set_stdout(OutputStream::duplex_stream(write));
    let result = context.execute_debug(&sh("echo piped")).await.unwrap();
    assert_eq!(result.output(), "piped\n");

    drop(context);
    assert_eq!(reader.await.unwrap(), "piped\n");
}

#[tokio::test]
async fn test_concurrent_launches() {
    let (context, _, _) = context();
    let first = sh("echo first");
    let second = sh("echo second >&2");
    let (first, second) = tokio::join!(
        context.execute_fully_silent(&first),
        context.execute_fully_silent(&second),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.output(), "first\n");
    assert_eq!(first.error(), "");
    assert_eq!(second.output(), "");
    assert_eq!(second.error(), "second\n");
}

#[tokio::test]
async fn test_signal_detached() {
    let (context, _, _) = context();
    let mut result = context
        .execute_fully_silent_detached(&sh("sleep 30"))
        .await
        .unwrap();

    result.signal(Signal::SIGTERM).unwrap();
    result.wait().await.unwrap();

    let state = result.state().unwrap();
    assert!(state.signaled());
    assert_eq!(result.exit_code(), Ok(143));

    // The process has been reaped, so its pid may be reused.
    assert!(result.signal(Signal::SIGTERM).is_err());
}

#[tokio::test]
async fn test_kill_detached() {
    let (context, _, _) = context();
    let mut result = context
        .execute_fully_silent_detached(&sh("sleep 30"))
        .await
        .unwrap();

    result.kill().unwrap();
    result.wait().await.unwrap();
    assert_eq!(result.exit_code(), Ok(137));
    assert!(!result.successful());
}

#[tokio::test]
async fn test_kill_detached_group() {
    let (context, _, _) = context();
    // The background `sleep` holds the output pipes open until it's killed too.
    let mut result = context
        .execute_fully_silent_detached(&sh("sleep 30 & wait"))
        .await
        .unwrap();

    result.kill().unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(10), result.wait())
        .await
        .expect("killing the group closes its pipes")
        .unwrap();
    assert_eq!(result.exit_code(), Ok(137));
}

#[tokio::test]
async fn test_wait_with_deadline() {
    let (context, _, _) = context();
    let mut result = context
        .execute_fully_silent_detached(&sh("sleep 30"))
        .await
        .unwrap();

    let waited =
        tokio::time::timeout(std::time::Duration::from_millis(100), result.wait()).await;
    assert!(waited.is_err());
    assert!(!result.is_complete());

    result.kill().unwrap();
    result.wait().await.unwrap();
    assert!(result.state().unwrap().signaled());
}

#[tokio::test]
async fn test_command_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("commands.log");

    let (mut context, _, _) = context();
    context
        .set_working_dir(dir.path().to_str().unwrap())
        .set_command_logger(Arc::new(FileCommandLogger::new(log.to_str().unwrap())));
    let command = sh("echo logged");
    context.execute_fully_silent(&command).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&log).unwrap(),
        format!("{}: {}\n", dir.path().display(), command.serialize())
    );
}

#[tokio::test]
#[traced_test]
async fn test_command_log_failure_is_not_fatal() {
    let (mut context, _, _) = context();
    context.set_command_logger(Arc::new(FileCommandLogger::new(
        "/shellout/does/not/exist/commands.log",
    )));
    let result = context.execute_fully_silent(&sh("echo still runs")).await.unwrap();

    assert_eq!(result.output(), "still runs\n");
    assert!(logs_contain("Failed to log command"));
}

/// Records which thread it was called on.
#[derive(Debug, Default)]
struct ThreadRecordingLogger {
    threads: std::sync::Mutex<Vec<std::thread::ThreadId>>,
}

impl shellout::CommandLogger for ThreadRecordingLogger {
    fn log(&self, _context: &ExecutionContext, command: &dyn ShellCommand) -> miette::Result<()> {
        assert_eq!(command.serialize(), "sh -c \"echo logged\"");
        self.threads
            .lock()
            .unwrap()
            .push(std::thread::current().id());
        Ok(())
    }
}

#[tokio::test]
async fn test_command_log_runs_off_the_runtime_thread() {
    let logger = Arc::new(ThreadRecordingLogger::default());
    let (mut context, _, _) = context();
    context.set_command_logger(logger.clone());
    context.execute_fully_silent(&sh("echo logged")).await.unwrap();

    let threads = logger.threads.lock().unwrap();
    assert_eq!(threads.len(), 1);
    assert_ne!(threads[0], std::thread::current().id());
}

#[tokio::test]
#[traced_test]
async fn test_spawn_is_logged() {
    let (context, _, _) = context();
    context.execute_fully_silent(&sh("true")).await.unwrap();

    assert!(logs_contain("Spawned process"));
}
