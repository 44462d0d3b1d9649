use clap::{Args, Subcommand};
use deckhand::docker::{self, RunOptions};
use deckhand::exec::ExecutionResult;
use serde::Serialize;
use std::path::PathBuf;

use super::CmdResult;

#[derive(Args)]
pub struct DockerArgs {
    #[command(subcommand)]
    pub subcommand: DockerSubcommand,
}

#[derive(Subcommand)]
pub enum DockerSubcommand {
    /// Build an image from a Dockerfile
    Build(BuildArgs),
    /// Push an image to a registry
    Push(PushArgs),
    /// Run a container from an image
    Run(RunArgs),
    /// List local images
    Images,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to the Dockerfile
    pub dockerfile: PathBuf,

    /// Image name
    #[arg(long)]
    pub image: String,

    /// Image tag
    #[arg(long, default_value = "latest")]
    pub tag: String,

    /// Build context directory
    #[arg(long, default_value = ".")]
    pub context: String,
}

#[derive(Args)]
pub struct PushArgs {
    /// Image name
    pub image: String,

    /// Image tag
    #[arg(long, default_value = "latest")]
    pub tag: String,

    /// Registry prefix (defaults to the configured registry)
    #[arg(long)]
    pub registry: Option<String>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Image name
    pub image: String,

    /// Image tag
    #[arg(long, default_value = "latest")]
    pub tag: String,

    /// Container name
    #[arg(long)]
    pub name: Option<String>,

    /// Port mapping (host:container)
    #[arg(long)]
    pub ports: Option<String>,

    /// Environment mapping (KEY=value)
    #[arg(long)]
    pub env: Option<String>,

    /// Volume mapping (host:container)
    #[arg(long)]
    pub volumes: Option<String>,

    /// Run in the foreground instead of detached
    #[arg(long)]
    pub foreground: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerOutput {
    pub operation: String,
    #[serde(flatten)]
    pub result: ExecutionResult,
}

pub fn run(args: DockerArgs, _global: &super::GlobalArgs) -> CmdResult<DockerOutput> {
    let (operation, result) = match args.subcommand {
        DockerSubcommand::Build(args) => (
            "build",
            docker::build(&args.dockerfile, &args.image, &args.tag, &args.context),
        ),
        DockerSubcommand::Push(args) => (
            "push",
            docker::push(&args.image, &args.tag, args.registry.as_deref()),
        ),
        DockerSubcommand::Run(args) => (
            "run",
            docker::run(
                &args.image,
                &args.tag,
                &RunOptions {
                    container_name: args.name,
                    ports: args.ports,
                    env: args.env,
                    volumes: args.volumes,
                    detached: !args.foreground,
                },
            ),
        ),
        DockerSubcommand::Images => ("images", docker::images()),
    };

    let exit_code = super::execution_exit_code(&result);
    Ok((
        DockerOutput {
            operation: operation.to_string(),
            result,
        },
        exit_code,
    ))
}
