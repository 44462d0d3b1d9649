use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use deckhand::error::{Error, RemoteCommandFailedDetails, SshTargetDetails};
use deckhand::exec::ExecutionResult;
use deckhand::ssh::RemoteSession;
use serde::Serialize;
use std::time::Duration;

use super::{CmdResult, ConnectionArgs};

const TEST_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Args)]
pub struct SshArgs {
    #[command(subcommand)]
    pub subcommand: SshSubcommand,
}

#[derive(Subcommand)]
pub enum SshSubcommand {
    /// Test connectivity and report the remote system string
    Test(TestArgs),
    /// Execute a command on the remote host
    Exec(ExecArgs),
}

#[derive(Args)]
pub struct TestArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,
}

#[derive(Args)]
pub struct ExecArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Timeout in seconds for the remote command
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Command to execute.
    ///
    /// If you need shell operators (&&, |, redirects), pass a single quoted
    /// string: deckhand ssh exec --host h --user u -- "cd /var/www && ls"
    #[arg(num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SshOutput {
    Test(TestOutput),
    Exec(ExecOutput),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutput {
    pub host: String,
    pub user: String,
    pub port: u16,
    pub connected: bool,
    pub system_info: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecOutput {
    pub host: String,
    pub command: String,
    #[serde(flatten)]
    pub result: ExecutionResult,
}

pub fn run(args: SshArgs, _global: &super::GlobalArgs) -> CmdResult<SshOutput> {
    match args.subcommand {
        SshSubcommand::Test(args) => run_test(args),
        SshSubcommand::Exec(args) => run_exec(args),
    }
}

fn run_test(args: TestArgs) -> CmdResult<SshOutput> {
    let target = args.conn.to_target()?;
    let mut session = RemoteSession::connect(target)?;
    let probe = session.run_command("uname -a", TEST_PROBE_TIMEOUT);
    session.close();
    let probe = probe?;

    if !probe.succeeded {
        return Err(Error::remote_command_failed(RemoteCommandFailedDetails {
            command: "uname -a".to_string(),
            exit_code: probe.exit_code.unwrap_or(-1),
            stdout: probe.stdout,
            stderr: probe.stderr,
            target: SshTargetDetails {
                host: args.conn.host.clone(),
                port: Some(args.conn.port),
                user: Some(args.conn.user.clone()),
            },
        }));
    }

    Ok((
        SshOutput::Test(TestOutput {
            host: args.conn.host,
            user: args.conn.user,
            port: args.conn.port,
            connected: true,
            system_info: probe.stdout.trim().to_string(),
            timestamp: Utc::now(),
        }),
        0,
    ))
}

fn run_exec(args: ExecArgs) -> CmdResult<SshOutput> {
    let target = args.conn.to_target()?;
    let command = args.command.join(" ");

    let mut session = RemoteSession::connect(target)?;
    let result = session.run_command(&command, Duration::from_secs(args.timeout));
    session.close();
    let result = result?;

    let exit_code = super::execution_exit_code(&result);
    Ok((
        SshOutput::Exec(ExecOutput {
            host: args.conn.host,
            command,
            result,
        }),
        exit_code,
    ))
}
