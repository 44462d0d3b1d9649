use clap::{Args, Subcommand};
use deckhand::exec::ExecutionResult;
use deckhand::git::{self, RepoInfo};
use serde::Serialize;

use super::CmdResult;

#[derive(Args)]
pub struct GitArgs {
    #[command(subcommand)]
    pub subcommand: GitSubcommand,
}

#[derive(Subcommand)]
pub enum GitSubcommand {
    /// Clone a repository
    Clone(CloneArgs),
    /// Show working tree status
    Status(StatusArgs),
    /// Show branch, commit, and origin information
    Info(InfoArgs),
}

#[derive(Args)]
pub struct CloneArgs {
    /// Repository URL
    pub url: String,

    /// Target directory
    pub directory: Option<String>,

    /// Branch to check out
    #[arg(short, long)]
    pub branch: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Repository path
    #[arg(default_value = ".")]
    pub path: String,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Repository path
    #[arg(default_value = ".")]
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum GitOutput {
    Clone(ExecOutput),
    Status(ExecOutput),
    Info(RepoInfo),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecOutput {
    #[serde(flatten)]
    pub result: ExecutionResult,
}

pub fn run(args: GitArgs, _global: &super::GlobalArgs) -> CmdResult<GitOutput> {
    match args.subcommand {
        GitSubcommand::Clone(args) => {
            let result = git::clone(&args.url, args.directory.as_deref(), args.branch.as_deref());
            let exit_code = super::execution_exit_code(&result);
            Ok((GitOutput::Clone(ExecOutput { result }), exit_code))
        }
        GitSubcommand::Status(args) => {
            let result = git::status(&args.path);
            let exit_code = super::execution_exit_code(&result);
            Ok((GitOutput::Status(ExecOutput { result }), exit_code))
        }
        GitSubcommand::Info(args) => Ok((GitOutput::Info(git::info(&args.path)), 0)),
    }
}
