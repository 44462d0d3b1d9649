use clap::Args;
use deckhand::health::{self, HealthReport};
use std::time::Duration;

use super::CmdResult;

#[derive(Args)]
pub struct HealthArgs {
    /// Endpoint URL to check
    pub url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

pub fn run(args: HealthArgs, _global: &super::GlobalArgs) -> CmdResult<HealthReport> {
    let report = health::check(&args.url, Duration::from_secs(args.timeout))?;
    let exit_code = if report.healthy { 0 } else { 20 };
    Ok((report, exit_code))
}
