//! Authenticated remote sessions over the system OpenSSH client.
//!
//! A session holds one control-master connection; every command and transfer
//! multiplexes over its socket, so authentication happens once at connect
//! time and teardown is a single control-socket exit. Password authentication
//! is delegated to `sshpass`; key authentication passes the identity file
//! directly.

use crate::error::{Error, Result, SshTargetDetails, TransferFailedDetails};
use crate::exec::{execute, CommandSpec, ExecutionResult};
use crate::log_status;
use crate::utils::shell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(600);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// How a session authenticates. Exactly one variant applies per target.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    Password(String),
    KeyFile(PathBuf),
}

impl AuthMethod {
    /// Resolve the auth method from optional inputs.
    ///
    /// A private key wins when its file exists; a password is the fallback.
    /// Neither being usable is a configuration error raised here, before any
    /// network attempt.
    pub fn resolve(password: Option<&str>, key_path: Option<&str>) -> Result<Self> {
        let key_path = key_path.filter(|p| !p.is_empty());
        let password = password.filter(|p| !p.is_empty());

        if let Some(path) = key_path {
            let expanded = shellexpand::tilde(path).to_string();
            if Path::new(&expanded).exists() {
                return Ok(AuthMethod::KeyFile(PathBuf::from(expanded)));
            }
            if password.is_none() {
                return Err(Error::ssh_identity_file_not_found(expanded));
            }
        }

        match password {
            Some(pw) => Ok(AuthMethod::Password(pw.to_string())),
            None => Err(Error::ssh_auth_not_configured()),
        }
    }
}

/// A remote host plus credentials - a caller-owned value object.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub auth: AuthMethod,
}

impl RemoteTarget {
    pub fn new(host: impl Into<String>, user: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            auth,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    fn details(&self) -> SshTargetDetails {
        SshTargetDetails {
            host: self.host.clone(),
            port: Some(self.port),
            user: Some(self.user.clone()),
        }
    }
}

/// Result of one file or directory transfer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub local_path: String,
    pub remote_path: String,
    pub recursive: bool,
    pub duration_ms: i64,
}

/// The seam between recipes and the transport, so step sequences are
/// testable against a scripted stand-in with no network at all.
pub trait RemoteRunner {
    fn run(&mut self, command: &str, timeout: Duration) -> Result<ExecutionResult>;
    fn transfer(&mut self, local: &Path, remote: &str, recursive: bool) -> Result<TransferResult>;
}

#[derive(Debug, PartialEq, Eq)]
enum SessionState {
    Connected,
    Closed,
}

/// A live authenticated connection, exclusively owned by the invocation that
/// opened it. `close` is explicit; `Drop` is the backstop so no exit path -
/// normal, error, or timeout - leaks the master connection.
pub struct RemoteSession {
    target: RemoteTarget,
    control_path: PathBuf,
    state: SessionState,
}

impl RemoteSession {
    /// Open a control-master connection to the target.
    ///
    /// Authentication and reachability problems surface here, classified as
    /// `ssh.auth_failed` or `ssh.connect_failed`; nothing later in a recipe
    /// has to re-authenticate.
    pub fn connect(target: RemoteTarget) -> Result<Self> {
        let control_path =
            std::env::temp_dir().join(format!("deckhand-{}.sock", Uuid::new_v4().simple()));

        let mut spec = match &target.auth {
            AuthMethod::KeyFile(key) => CommandSpec::new("ssh")
                .arg("-i")
                .arg(key.to_string_lossy().to_string())
                .arg("-o")
                .arg("BatchMode=yes"),
            AuthMethod::Password(password) => CommandSpec::new("sshpass")
                .arg("-p")
                .arg(password.clone())
                .arg("ssh")
                .arg("-o")
                .arg("NumberOfPasswordPrompts=1"),
        };

        spec = spec
            .args(["-o", "StrictHostKeyChecking=no", "-o", "ConnectTimeout=10"])
            .arg("-S")
            .arg(control_path.to_string_lossy().to_string())
            .args(["-M", "-N", "-f"])
            .arg("-p")
            .arg(target.port.to_string())
            .arg(target.destination())
            .timeout(CONNECT_TIMEOUT);

        let result = execute(&spec);
        if result.succeeded {
            log_status!("ssh", "Connected to {}", target.destination());
            return Ok(Self {
                target,
                control_path,
                state: SessionState::Connected,
            });
        }

        // A failed master never creates the socket, but clean up anyway.
        let _ = std::fs::remove_file(&control_path);
        Err(classify_connect_failure(&target, &result))
    }

    pub fn host(&self) -> &str {
        &self.target.host
    }

    pub fn user(&self) -> &str {
        &self.target.user
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.state == SessionState::Connected {
            Ok(())
        } else {
            Err(Error::ssh_not_connected(self.target.host.clone()))
        }
    }

    /// Run one command on the remote host, blocking until it completes or
    /// the timeout elapses. Mirrors local execution semantics: the outcome
    /// is always a result record, with timeouts distinguishable from
    /// failed exits.
    pub fn run_command(&self, command: &str, timeout: Duration) -> Result<ExecutionResult> {
        self.ensure_connected()?;

        let spec = CommandSpec::new("ssh")
            .arg("-S")
            .arg(self.control_path.to_string_lossy().to_string())
            .args(["-o", "BatchMode=yes"])
            .arg("-p")
            .arg(self.target.port.to_string())
            .arg(self.target.destination())
            .arg(command)
            .timeout(timeout);

        Ok(execute(&spec))
    }

    /// Copy a local file or directory to the remote host via scp.
    ///
    /// Dispatches on the local path: directories upload recursively, files
    /// singly; a path that exists as neither is rejected before any network
    /// operation.
    pub fn transfer_path(
        &self,
        local: &Path,
        remote: &str,
        recursive: bool,
    ) -> Result<TransferResult> {
        self.ensure_connected()?;

        if !local.exists() {
            return Err(Error::transfer_local_path_missing(
                local.display().to_string(),
            ));
        }
        let recursive = recursive || local.is_dir();

        let mut spec = CommandSpec::new("scp").arg("-o").arg(format!(
            "ControlPath={}",
            self.control_path.to_string_lossy()
        ));
        if recursive {
            spec = spec.arg("-r");
        }
        if self.target.port != 22 {
            spec = spec.arg("-P").arg(self.target.port.to_string());
        }
        spec = spec
            .arg(local.to_string_lossy().to_string())
            .arg(format!(
                "{}:{}",
                self.target.destination(),
                shell::quote_path(remote)
            ))
            .timeout(TRANSFER_TIMEOUT);

        log_status!(
            "ssh",
            "Uploading {} -> {}:{}",
            local.display(),
            self.target.destination(),
            remote
        );

        let result = execute(&spec);
        if !result.succeeded {
            return Err(Error::transfer_failed(TransferFailedDetails {
                local_path: local.display().to_string(),
                remote_path: remote.to_string(),
                error: result.error_text(),
            }));
        }

        Ok(TransferResult {
            local_path: local.display().to_string(),
            remote_path: remote.to_string(),
            recursive,
            duration_ms: (result.finished_at - result.started_at).num_milliseconds(),
        })
    }

    /// Tear down the master connection. Safe to call at any point, including
    /// after a partially failed connect; repeated calls are no-ops.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;

        let spec = CommandSpec::new("ssh")
            .arg("-S")
            .arg(self.control_path.to_string_lossy().to_string())
            .args(["-O", "exit"])
            .arg("-p")
            .arg(self.target.port.to_string())
            .arg(self.target.destination())
            .timeout(CLOSE_TIMEOUT);

        // Best effort: a dead master just means there is nothing to exit.
        let _ = execute(&spec);
        let _ = std::fs::remove_file(&self.control_path);
        log_status!("ssh", "Disconnected from {}", self.target.destination());
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl RemoteRunner for RemoteSession {
    fn run(&mut self, command: &str, timeout: Duration) -> Result<ExecutionResult> {
        self.run_command(command, timeout)
    }

    fn transfer(&mut self, local: &Path, remote: &str, recursive: bool) -> Result<TransferResult> {
        self.transfer_path(local, remote, recursive)
    }
}

fn classify_connect_failure(target: &RemoteTarget, result: &ExecutionResult) -> Error {
    let detail = result.error_text();
    let lowered = detail.to_lowercase();

    if lowered.contains("permission denied") || lowered.contains("authentication") {
        Error::ssh_auth_failed(target.details(), detail)
    } else if result.timed_out {
        Error::ssh_connect_failed(target.details(), "connection attempt timed out")
    } else {
        Error::ssh_connect_failed(target.details(), detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Write;

    #[test]
    fn resolve_prefers_existing_key_over_password() {
        let mut key = tempfile::NamedTempFile::new().unwrap();
        writeln!(key, "not a real key").unwrap();

        let auth = AuthMethod::resolve(Some("secret"), key.path().to_str()).unwrap();
        assert!(matches!(auth, AuthMethod::KeyFile(_)));
    }

    #[test]
    fn resolve_falls_back_to_password_when_key_missing() {
        let auth = AuthMethod::resolve(Some("secret"), Some("/nonexistent/id_ed25519")).unwrap();
        assert!(matches!(auth, AuthMethod::Password(ref p) if p == "secret"));
    }

    #[test]
    fn resolve_missing_key_without_password_is_an_identity_error() {
        let err = AuthMethod::resolve(None, Some("/nonexistent/id_ed25519")).unwrap_err();
        assert_eq!(err.code, ErrorCode::SshIdentityFileNotFound);
    }

    #[test]
    fn resolve_with_neither_credential_is_a_configuration_error() {
        let err = AuthMethod::resolve(None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::SshAuthNotConfigured);
    }

    #[test]
    fn resolve_treats_empty_strings_as_absent() {
        let err = AuthMethod::resolve(Some(""), Some("")).unwrap_err();
        assert_eq!(err.code, ErrorCode::SshAuthNotConfigured);
    }

    #[test]
    fn operations_fail_fast_once_closed() {
        let mut session = RemoteSession {
            target: RemoteTarget::new(
                "example.com",
                "deploy",
                AuthMethod::Password("pw".to_string()),
            ),
            control_path: std::env::temp_dir().join("deckhand-test-closed.sock"),
            state: SessionState::Closed,
        };

        let err = session
            .run_command("true", Duration::from_secs(1))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SshNotConnected);

        let err = session
            .transfer_path(Path::new("/tmp"), "/tmp/x", false)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SshNotConnected);
    }
}
