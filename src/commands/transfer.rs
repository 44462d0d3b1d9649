use clap::Args;
use deckhand::ssh::{RemoteSession, TransferResult};
use serde::Serialize;
use std::path::Path;

use super::{CmdResult, ConnectionArgs};

#[derive(Args)]
pub struct TransferArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Local file or directory to upload
    pub local: String,

    /// Remote destination path
    pub remote: String,

    /// Transfer directories recursively
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutput {
    pub host: String,
    #[serde(flatten)]
    pub result: TransferResult,
}

pub fn run(args: TransferArgs, _global: &super::GlobalArgs) -> CmdResult<TransferOutput> {
    let target = args.conn.to_target()?;

    let mut session = RemoteSession::connect(target)?;
    let outcome = session.transfer_path(Path::new(&args.local), &args.remote, args.recursive);
    session.close();
    let result = outcome?;

    Ok((
        TransferOutput {
            host: args.conn.host,
            result,
        },
        0,
    ))
}
