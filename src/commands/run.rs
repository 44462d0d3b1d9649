use clap::Args;
use deckhand::exec::{self, ExecutionResult, DEFAULT_TIMEOUT_SECS};
use serde::Serialize;

use super::CmdResult;

#[derive(Args)]
pub struct RunArgs {
    /// Program to execute
    pub program: String,

    /// Arguments passed through to the program
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Working directory for the command
    #[arg(long)]
    pub cwd: Option<String>,

    /// Timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(flatten)]
    pub result: ExecutionResult,
}

pub fn run(args: RunArgs, _global: &super::GlobalArgs) -> CmdResult<RunOutput> {
    let result = exec::run_local(&args.program, &args.args, args.cwd.as_deref(), args.timeout);
    let exit_code = super::execution_exit_code(&result);

    Ok((
        RunOutput {
            program: args.program,
            args: args.args,
            working_directory: args.cwd,
            result,
        },
        exit_code,
    ))
}
