use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use deckhand::diagnostics::{self, ServiceQuery};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{CmdResult, ConnectionArgs};

#[derive(Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub subcommand: SystemSubcommand,
}

#[derive(Subcommand)]
pub enum SystemSubcommand {
    /// Collect OS, kernel, memory, disk, CPU, and load information
    Info(InfoArgs),
    /// List running services, or query one service's status
    Services(ServicesArgs),
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,
}

#[derive(Args)]
pub struct ServicesArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Query a single named service instead of listing all
    #[arg(long)]
    pub service: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SystemOutput {
    Info(InfoOutput),
    Services(ServicesOutput),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoOutput {
    pub host: String,
    pub system_info: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesOutput {
    pub host: String,
    #[serde(flatten)]
    pub query: ServiceQuery,
}

pub fn run(args: SystemArgs, _global: &super::GlobalArgs) -> CmdResult<SystemOutput> {
    match args.subcommand {
        SystemSubcommand::Info(args) => {
            let target = args.conn.to_target()?;
            let info = diagnostics::system_info(target)?;
            Ok((
                SystemOutput::Info(InfoOutput {
                    host: args.conn.host,
                    system_info: info,
                    timestamp: Utc::now(),
                }),
                0,
            ))
        }
        SystemSubcommand::Services(args) => {
            let target = args.conn.to_target()?;
            let query = diagnostics::monitor_services(target, args.service.as_deref())?;
            let exit_code = super::execution_exit_code(&query.result);
            Ok((
                SystemOutput::Services(ServicesOutput {
                    host: args.conn.host,
                    query,
                }),
                exit_code,
            ))
        }
    }
}
