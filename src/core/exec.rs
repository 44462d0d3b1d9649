//! Local process execution with concurrent output capture and timeout enforcement.
//!
//! `execute` always returns an `ExecutionResult` - launch failures, non-zero
//! exits, and timeouts are all reported in the result rather than propagated,
//! so callers get a uniform record for every attempt.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Poll interval while waiting for a child to exit.
const WAIT_POLL: Duration = Duration::from_millis(25);

/// One command invocation: program, arguments, working directory, deadline.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Outcome of one command invocation.
///
/// Exactly one of three classes applies: clean exit (`exit_code == Some(0)`),
/// failed exit (`exit_code == Some(n)`, n != 0), or timeout (`timed_out` set
/// and `exit_code` absent). A command that could not even be launched is
/// reported as a failed exit with code -1 and the launch error in stderr.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionResult {
    fn launch_failure(message: String, started_at: DateTime<Utc>) -> Self {
        Self {
            succeeded: false,
            exit_code: Some(-1),
            timed_out: false,
            stdout: String::new(),
            stderr: message,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Error text for reporting: stderr, falling back to stdout.
    pub fn error_text(&self) -> String {
        if !self.stderr.trim().is_empty() {
            self.stderr.trim().to_string()
        } else {
            self.stdout.trim().to_string()
        }
    }
}

/// Run a command to completion, enforcing its timeout.
///
/// Both output pipes are drained on dedicated threads while the process runs,
/// so a command producing more output than the pipe buffer holds cannot
/// deadlock against the wait loop. On timeout the child is killed and reaped
/// before returning; no process is left behind.
pub fn execute(spec: &CommandSpec) -> ExecutionResult {
    let started_at = Utc::now();

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &spec.working_dir {
        cmd.current_dir(dir);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ExecutionResult::launch_failure(
                format!("Failed to start '{}': {}", spec.program, e),
                started_at,
            )
        }
    };

    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let deadline = Instant::now() + spec.timeout;
    let mut timed_out = false;
    let mut wait_error: Option<String> = None;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    timed_out = true;
                    // Kill and reap; this also closes the child's pipe ends
                    // so the reader threads finish.
                    let _ = child.kill();
                    let _ = child.wait();
                    break None;
                }
                thread::sleep(WAIT_POLL);
            }
            Err(e) => {
                wait_error = Some(format!("Failed to wait for '{}': {}", spec.program, e));
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let mut stderr = stderr_reader.join().unwrap_or_default();
    let finished_at = Utc::now();

    match status {
        Some(status) => ExecutionResult {
            succeeded: status.success(),
            // A signal-terminated child has no exit code; report -1 like a
            // launch failure so the code is always present outside timeouts.
            exit_code: Some(status.code().unwrap_or(-1)),
            timed_out: false,
            stdout,
            stderr,
            started_at,
            finished_at,
        },
        None if timed_out => ExecutionResult {
            succeeded: false,
            exit_code: None,
            timed_out: true,
            stdout,
            stderr,
            started_at,
            finished_at,
        },
        None => {
            if let Some(message) = wait_error {
                if !stderr.is_empty() {
                    stderr.push('\n');
                }
                stderr.push_str(&message);
            }
            ExecutionResult {
                succeeded: false,
                exit_code: Some(-1),
                timed_out: false,
                stdout,
                stderr,
                started_at,
                finished_at,
            }
        }
    }
}

/// Convenience wrapper for CLI-style invocations.
pub fn run_local(
    program: &str,
    args: &[String],
    working_dir: Option<&str>,
    timeout_secs: u64,
) -> ExecutionResult {
    let mut spec = CommandSpec::new(program)
        .args(args.iter().cloned())
        .timeout(Duration::from_secs(timeout_secs));
    if let Some(dir) = working_dir {
        spec = spec.working_dir(dir);
    }
    execute(&spec)
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exit_maps_to_succeeded() {
        let result = execute(&CommandSpec::new("echo").arg("hello"));
        assert!(result.succeeded);
        assert_eq!(result.exit_code, Some(0));
        assert!(!result.timed_out);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn nonzero_exit_maps_to_failed() {
        let result = execute(&CommandSpec::new("sh").args(["-c", "exit 3"]));
        assert!(!result.succeeded);
        assert_eq!(result.exit_code, Some(3));
        assert!(!result.timed_out);
    }

    #[test]
    fn launch_failure_is_reported_not_propagated() {
        let result = execute(&CommandSpec::new("deckhand-test-no-such-program"));
        assert!(!result.succeeded);
        assert_eq!(result.exit_code, Some(-1));
        assert!(!result.timed_out);
        assert!(result.stderr.contains("Failed to start"));
    }

    #[test]
    fn timeout_kills_the_process_and_omits_exit_code() {
        let started = Instant::now();
        let result = execute(
            &CommandSpec::new("sh")
                .args(["-c", "sleep 10"])
                .timeout(Duration::from_millis(300)),
        );
        assert!(!result.succeeded);
        assert!(result.timed_out);
        assert_eq!(result.exit_code, None);
        // Returned well before the command would have finished on its own.
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn large_output_does_not_deadlock() {
        // Well past the default pipe buffer size on Linux (64 KiB).
        let result = execute(
            &CommandSpec::new("sh")
                .args(["-c", "head -c 1048576 /dev/zero | tr '\\0' 'a'"])
                .timeout(Duration::from_secs(30)),
        );
        assert!(result.succeeded);
        assert_eq!(result.stdout.len(), 1_048_576);
    }

    #[test]
    fn working_directory_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(&CommandSpec::new("pwd").working_dir(dir.path()));
        assert!(result.succeeded);
        assert!(result.stdout.trim().ends_with(
            dir.path()
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
        ));
    }

    #[test]
    fn stderr_is_captured_separately() {
        let result = execute(&CommandSpec::new("sh").args(["-c", "echo out; echo err >&2"]));
        assert!(result.succeeded);
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
    }
}
