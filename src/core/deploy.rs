//! Deployment recipes: fixed step sequences executed against one session.
//!
//! Each public entry point opens one session, runs its step list, closes the
//! session on every path, and returns a report. The `run_*` functions hold
//! the step logic against the `RemoteRunner` seam; the wrappers own the
//! session lifecycle (Init -> Connected -> Steps -> Disconnected -> Reported).

use crate::error::Result;
use crate::recipe::{Step, StepRunner};
use crate::report::DeploymentReport;
use crate::ssh::{RemoteRunner, RemoteSession, RemoteTarget};
use crate::utils::shell::{quote_arg, quote_path};
use crate::utils::template::{render, TemplateVars};
use std::path::PathBuf;

pub const RECIPE_MANAGED_SERVICE: &str = "managed_service";
pub const RECIPE_CONTAINER: &str = "container";
pub const RECIPE_WEB_APP: &str = "web_app_proxy";

/// Best-effort runtime bootstrap. The runtime is often already present, so
/// each command is logged as a warning on failure rather than aborting.
const RUNTIME_INSTALL_COMMANDS: &[&str] = &[
    "curl -sSL https://dot.net/v1/dotnet-install.sh | bash /dev/stdin --channel 8.0",
    "echo 'export DOTNET_ROOT=$HOME/.dotnet' >> ~/.bashrc",
    "echo 'export PATH=$PATH:$HOME/.dotnet:$HOME/.dotnet/tools' >> ~/.bashrc",
];

const CONTAINER_RUNTIME_INSTALL_COMMANDS: &[&str] = &[
    "sudo apt-get update",
    "sudo apt-get install -y docker.io",
    "sudo systemctl start docker",
    "sudo systemctl enable docker",
    "sudo usermod -aG docker {{user}}",
];

const SERVICE_UNIT_TEMPLATE: &str = "\
[Unit]
Description={{serviceName}}
After=network.target

[Service]
Type=simple
User={{user}}
WorkingDirectory={{workingDir}}
ExecStart={{execStart}}
Restart=always
RestartSec=10

[Install]
WantedBy=multi-user.target
";

const PROXY_SITE_TEMPLATE: &str = "\
server {
    listen 80;
    server_name {{domain}};

    location / {
        proxy_pass http://localhost:{{upstreamPort}};
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }
}
";

#[derive(Debug, Clone)]
pub struct ServiceDeployParams {
    pub local_app_path: PathBuf,
    pub remote_app_path: String,
    pub service_name: String,
    /// Entry point binary inside the app directory; defaults to the
    /// service name.
    pub entry_point: Option<String>,
    pub install_runtime: bool,
}

impl ServiceDeployParams {
    fn exec_start(&self) -> String {
        format!(
            "{}/{}",
            self.remote_app_path,
            self.entry_point.as_deref().unwrap_or(&self.service_name)
        )
    }
}

#[derive(Debug, Clone)]
pub struct ContainerDeployParams {
    pub image: String,
    pub container_name: String,
    pub ports: Option<String>,
    pub env: Option<String>,
    pub volumes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WebAppDeployParams {
    pub service: ServiceDeployParams,
    pub domain: String,
    pub upstream_port: u16,
}

/// Ship a runtime artifact directory and run it as a supervised service.
pub fn deploy_managed_service(
    target: RemoteTarget,
    params: &ServiceDeployParams,
) -> Result<DeploymentReport> {
    let user = target.user.clone();
    let mut session = RemoteSession::connect(target)?;
    let report = run_managed_service(&mut session, &user, params);
    session.close();
    Ok(report)
}

/// Pull and run a container image, replacing any same-named container.
pub fn deploy_container(
    target: RemoteTarget,
    params: &ContainerDeployParams,
) -> Result<DeploymentReport> {
    let user = target.user.clone();
    let mut session = RemoteSession::connect(target)?;
    let report = run_container(&mut session, &user, params);
    session.close();
    Ok(report)
}

/// Deploy a managed service and put a reverse proxy in front of it.
pub fn deploy_web_app(target: RemoteTarget, params: &WebAppDeployParams) -> Result<DeploymentReport> {
    let user = target.user.clone();
    let mut session = RemoteSession::connect(target)?;
    let report = run_web_app(&mut session, &user, params);
    session.close();
    Ok(report)
}

pub fn run_managed_service(
    remote: &mut dyn RemoteRunner,
    user: &str,
    params: &ServiceDeployParams,
) -> DeploymentReport {
    let mut runner = StepRunner::new(remote);
    push_managed_service_steps(&mut runner, user, params);
    DeploymentReport::from_steps(RECIPE_MANAGED_SERVICE, runner.into_steps())
}

fn push_managed_service_steps(
    runner: &mut StepRunner<'_>,
    user: &str,
    params: &ServiceDeployParams,
) {
    if params.install_runtime {
        let total = RUNTIME_INSTALL_COMMANDS.len();
        for (i, command) in RUNTIME_INSTALL_COMMANDS.iter().enumerate() {
            runner.run(Step::best_effort(
                format!("Install runtime ({}/{})", i + 1, total),
                *command,
            ));
        }
    }

    runner.run(Step::remote(
        "Create application directory",
        format!("mkdir -p {}", quote_path(&params.remote_app_path)),
    ));

    runner.run(Step::upload(
        "Transfer application files",
        params.local_app_path.clone(),
        params.remote_app_path.clone(),
    ));

    let exec_start = params.exec_start();
    runner.run(Step::remote(
        "Set executable permission on entry point",
        format!("chmod +x {}", quote_path(&exec_start)),
    ));

    // Absence of a service manager is tolerated: the artifact is deployed
    // either way, so the unit install and everything after it is best effort.
    let unit = render(
        SERVICE_UNIT_TEMPLATE,
        &[
            (TemplateVars::SERVICE_NAME, params.service_name.as_str()),
            (TemplateVars::USER, user),
            (TemplateVars::WORKING_DIR, params.remote_app_path.as_str()),
            (TemplateVars::EXEC_START, exec_start.as_str()),
        ],
    );
    let unit_installed = runner.run(Step::best_effort(
        "Install service unit",
        format!(
            "echo {} | sudo tee /etc/systemd/system/{}.service",
            quote_arg(&unit),
            params.service_name
        ),
    ));

    if unit_installed {
        runner.run(Step::best_effort(
            "Reload service manager",
            "sudo systemctl daemon-reload",
        ));
        runner.run(Step::best_effort(
            "Enable service",
            format!("sudo systemctl enable {}", quote_arg(&params.service_name)),
        ));
    }
}

pub fn run_container(
    remote: &mut dyn RemoteRunner,
    user: &str,
    params: &ContainerDeployParams,
) -> DeploymentReport {
    let mut runner = StepRunner::new(remote);

    let runtime_present = runner.run(Step::best_effort(
        "Check container runtime",
        "command -v docker",
    ));
    if !runtime_present && !runner.aborted() {
        let total = CONTAINER_RUNTIME_INSTALL_COMMANDS.len();
        for (i, command) in CONTAINER_RUNTIME_INSTALL_COMMANDS.iter().enumerate() {
            runner.run(Step::best_effort(
                format!("Install container runtime ({}/{})", i + 1, total),
                render(command, &[(TemplateVars::USER, user)]),
            ));
        }
    }

    // Stopping/removing a container that does not exist is the expected
    // fresh-host case, so both are folded into one idempotent no-op step.
    let name = quote_arg(&params.container_name);
    runner.run(Step::best_effort(
        "Remove existing container",
        format!(
            "docker stop {name} >/dev/null 2>&1 || true; docker rm {name} >/dev/null 2>&1 || true"
        ),
    ));

    // A locally cached image may satisfy the run even when the pull fails.
    runner.run(Step::best_effort(
        "Pull image",
        format!("docker pull {}", quote_arg(&params.image)),
    ));

    let mut run_command = format!("docker run -d --name {name}");
    if let Some(ports) = params.ports.as_deref().filter(|v| !v.is_empty()) {
        run_command.push_str(&format!(" -p {}", quote_arg(ports)));
    }
    if let Some(env) = params.env.as_deref().filter(|v| !v.is_empty()) {
        run_command.push_str(&format!(" -e {}", quote_arg(env)));
    }
    if let Some(volumes) = params.volumes.as_deref().filter(|v| !v.is_empty()) {
        run_command.push_str(&format!(" -v {}", quote_arg(volumes)));
    }
    run_command.push_str(&format!(" {}", quote_arg(&params.image)));

    runner.run(Step::remote("Run container", run_command));

    DeploymentReport::from_steps(RECIPE_CONTAINER, runner.into_steps())
}

pub fn run_web_app(
    remote: &mut dyn RemoteRunner,
    user: &str,
    params: &WebAppDeployParams,
) -> DeploymentReport {
    let nested = run_managed_service(remote, user, &params.service);
    let nested_success = nested.overall_success;

    let mut runner = StepRunner::new(remote);
    runner.absorb(nested.steps, nested_success);

    runner.run(Step::best_effort(
        "Install reverse proxy",
        "sudo apt-get update && sudo apt-get install -y nginx",
    ));

    let upstream_port = params.upstream_port.to_string();
    let site = render(
        PROXY_SITE_TEMPLATE,
        &[
            (TemplateVars::DOMAIN, params.domain.as_str()),
            (TemplateVars::UPSTREAM_PORT, upstream_port.as_str()),
        ],
    );
    let site_name = &params.service.service_name;
    runner.run(Step::remote(
        "Install proxy site configuration",
        format!(
            "echo {} | sudo tee /etc/nginx/sites-available/{}",
            quote_arg(&site),
            site_name
        ),
    ));
    runner.run(Step::remote(
        "Enable proxy site",
        format!("sudo ln -sf /etc/nginx/sites-available/{0} /etc/nginx/sites-enabled/{0}", site_name),
    ));

    // Reload only behind a successful validation so a broken rendering
    // never takes the proxy down.
    let validated = runner.run(Step::best_effort(
        "Validate proxy configuration",
        "sudo nginx -t",
    ));
    if validated {
        runner.run(Step::best_effort(
            "Reload reverse proxy",
            "sudo systemctl reload nginx",
        ));
    }

    runner.run(Step::remote(
        "Start service",
        format!("sudo systemctl start {}", quote_arg(site_name)),
    ));

    DeploymentReport::from_steps(RECIPE_WEB_APP, runner.into_steps())
}
