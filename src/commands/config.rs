use clap::{Args, Subcommand};
use deckhand::config::{self, DeploymentConfig};
use serde::Serialize;
use std::path::PathBuf;

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub subcommand: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Create a deployment configuration document
    Create(CreateArgs),
    /// Read and validate a deployment configuration document
    Read(ReadArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// File to write
    pub file: PathBuf,

    /// Application name
    #[arg(long)]
    pub app_name: String,

    /// Deployment environment (e.g. staging, production)
    #[arg(long)]
    pub environment: String,

    /// Target platform (e.g. linux, container)
    #[arg(long)]
    pub platform: String,

    /// Additional settings as a JSON object
    #[arg(long, value_name = "JSON")]
    pub settings: Option<String>,
}

#[derive(Args)]
pub struct ReadArgs {
    /// File to read
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ConfigOutput {
    Create(ConfigFileOutput),
    Read(ConfigFileOutput),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileOutput {
    pub file: String,
    pub config: DeploymentConfig,
}

pub fn run(args: ConfigArgs, _global: &super::GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.subcommand {
        ConfigSubcommand::Create(args) => {
            let config = config::create(
                &args.file,
                &args.app_name,
                &args.environment,
                &args.platform,
                args.settings.as_deref(),
            )?;
            Ok((
                ConfigOutput::Create(ConfigFileOutput {
                    file: args.file.display().to_string(),
                    config,
                }),
                0,
            ))
        }
        ConfigSubcommand::Read(args) => {
            let config = config::read(&args.file)?;
            Ok((
                ConfigOutput::Read(ConfigFileOutput {
                    file: args.file.display().to_string(),
                    config,
                }),
                0,
            ))
        }
    }
}
