use clap::Args;
use deckhand::exec::ExecutionResult;
use deckhand::ssh::{AuthMethod, RemoteTarget};

pub mod config;
pub mod deploy;
pub mod docker;
pub mod git;
pub mod health;
pub mod run;
pub mod ssh;
pub mod system;
pub mod transfer;

pub type CmdResult<T> = deckhand::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

/// Shared SSH connection arguments, flattened into every remote command.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Remote host name or address
    #[arg(long)]
    pub host: String,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    pub port: u16,

    /// Remote user name
    #[arg(long)]
    pub user: String,

    /// Password for password-based authentication
    #[arg(long)]
    pub password: Option<String>,

    /// Private key path for key-based authentication
    #[arg(long, value_name = "PATH")]
    pub key: Option<String>,
}

impl ConnectionArgs {
    /// Resolve the flags into a target. Auth problems surface here, before
    /// any connection attempt.
    pub fn to_target(&self) -> deckhand::Result<RemoteTarget> {
        let auth = AuthMethod::resolve(self.password.as_deref(), self.key.as_deref())?;
        Ok(RemoteTarget::new(self.host.clone(), self.user.clone(), auth).with_port(self.port))
    }
}

/// Exit code for commands that pass through an execution result: the child's
/// own exit code where it has one, 20 for timeouts.
pub(crate) fn execution_exit_code(result: &ExecutionResult) -> i32 {
    if result.timed_out {
        return 20;
    }
    match result.exit_code {
        Some(0) => 0,
        Some(code) if code > 0 => code,
        _ => 1,
    }
}
