use clap::{Parser, Subcommand};

mod commands;

use commands::{config, deploy, docker, git, health, run, ssh, system, transfer, GlobalArgs};
use deckhand::output;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(version = VERSION)]
#[command(about = "CLI for remote deployment and infrastructure automation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a local command with captured output and a timeout
    Run(run::RunArgs),
    /// Test connectivity or execute commands over SSH
    Ssh(ssh::SshArgs),
    /// Copy a file or directory to a remote host
    Transfer(transfer::TransferArgs),
    /// Deployment recipes (service, container, webapp)
    Deploy(deploy::DeployArgs),
    /// Remote diagnostics (system info, service status)
    System(system::SystemArgs),
    /// Local container-image operations
    Docker(docker::DockerArgs),
    /// Local git operations
    Git(git::GitArgs),
    /// Check a web endpoint's health
    Health(health::HealthArgs),
    /// Manage deployment configuration documents
    Config(config::ConfigArgs),
}

fn run_json(command: Commands, global: &GlobalArgs) -> (deckhand::Result<serde_json::Value>, i32) {
    match command {
        Commands::Run(args) => output::map_cmd_result_to_json(run::run(args, global)),
        Commands::Ssh(args) => output::map_cmd_result_to_json(ssh::run(args, global)),
        Commands::Transfer(args) => output::map_cmd_result_to_json(transfer::run(args, global)),
        Commands::Deploy(args) => output::map_cmd_result_to_json(deploy::run(args, global)),
        Commands::System(args) => output::map_cmd_result_to_json(system::run(args, global)),
        Commands::Docker(args) => output::map_cmd_result_to_json(docker::run(args, global)),
        Commands::Git(args) => output::map_cmd_result_to_json(git::run(args, global)),
        Commands::Health(args) => output::map_cmd_result_to_json(health::run(args, global)),
        Commands::Config(args) => output::map_cmd_result_to_json(config::run(args, global)),
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = run_json(cli.command, &global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
