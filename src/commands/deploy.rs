use clap::{Args, Subcommand};
use deckhand::deploy::{
    self, ContainerDeployParams, ServiceDeployParams, WebAppDeployParams,
};
use deckhand::report::DeploymentReport;
use serde::Serialize;
use std::path::PathBuf;

use super::{CmdResult, ConnectionArgs};

#[derive(Args)]
pub struct DeployArgs {
    #[command(subcommand)]
    pub subcommand: DeploySubcommand,
}

#[derive(Subcommand)]
pub enum DeploySubcommand {
    /// Ship an application directory and run it as a supervised service
    Service(ServiceArgs),
    /// Pull and run a container image, replacing any same-named container
    Container(ContainerArgs),
    /// Deploy a service behind a reverse proxy
    Webapp(WebappArgs),
}

#[derive(Args)]
pub struct ServiceArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Local application directory to upload
    #[arg(long, value_name = "DIR")]
    pub local_path: PathBuf,

    /// Remote directory to install into
    #[arg(long, value_name = "DIR")]
    pub remote_path: String,

    /// Service name (also the default entry point binary)
    #[arg(long)]
    pub service_name: String,

    /// Entry point binary inside the app directory
    #[arg(long)]
    pub entry_point: Option<String>,

    /// Install the language runtime before deploying (best effort)
    #[arg(long)]
    pub install_runtime: bool,
}

#[derive(Args)]
pub struct ContainerArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Image to deploy (e.g. nginx:latest)
    #[arg(long)]
    pub image: String,

    /// Container name
    #[arg(long)]
    pub name: String,

    /// Port mapping (host:container)
    #[arg(long)]
    pub ports: Option<String>,

    /// Environment mapping (KEY=value)
    #[arg(long)]
    pub env: Option<String>,

    /// Volume mapping (host:container)
    #[arg(long)]
    pub volumes: Option<String>,
}

#[derive(Args)]
pub struct WebappArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Local application directory to upload
    #[arg(long, value_name = "DIR")]
    pub local_path: PathBuf,

    /// Remote directory to install into
    #[arg(long, value_name = "DIR")]
    pub remote_path: String,

    /// Service name (also the default entry point binary)
    #[arg(long)]
    pub service_name: String,

    /// Public domain served by the proxy
    #[arg(long)]
    pub domain: String,

    /// Local port the application listens on
    #[arg(long)]
    pub app_port: u16,

    /// Install the language runtime before deploying (best effort)
    #[arg(long)]
    pub install_runtime: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutput {
    pub host: String,
    #[serde(flatten)]
    pub report: DeploymentReport,
}

pub fn run(args: DeployArgs, _global: &super::GlobalArgs) -> CmdResult<DeployOutput> {
    match args.subcommand {
        DeploySubcommand::Service(args) => {
            let target = args.conn.to_target()?;
            let params = ServiceDeployParams {
                local_app_path: args.local_path,
                remote_app_path: args.remote_path,
                service_name: args.service_name,
                entry_point: args.entry_point,
                install_runtime: args.install_runtime,
            };
            let report = deploy::deploy_managed_service(target, &params)?;
            finish(args.conn.host, report)
        }
        DeploySubcommand::Container(args) => {
            let target = args.conn.to_target()?;
            let params = ContainerDeployParams {
                image: args.image,
                container_name: args.name,
                ports: args.ports,
                env: args.env,
                volumes: args.volumes,
            };
            let report = deploy::deploy_container(target, &params)?;
            finish(args.conn.host, report)
        }
        DeploySubcommand::Webapp(args) => {
            let target = args.conn.to_target()?;
            let params = WebAppDeployParams {
                service: ServiceDeployParams {
                    local_app_path: args.local_path,
                    remote_app_path: args.remote_path,
                    service_name: args.service_name,
                    entry_point: None,
                    install_runtime: args.install_runtime,
                },
                domain: args.domain,
                upstream_port: args.app_port,
            };
            let report = deploy::deploy_web_app(target, &params)?;
            finish(args.conn.host, report)
        }
    }
}

fn finish(host: String, report: DeploymentReport) -> CmdResult<DeployOutput> {
    let exit_code = report.exit_code();
    Ok((DeployOutput { host, report }, exit_code))
}
