use chrono::Utc;
use deckhand::deploy::{
    run_container, run_managed_service, run_web_app, ContainerDeployParams, ServiceDeployParams,
    WebAppDeployParams,
};
use deckhand::diagnostics::{run_monitor_services, run_system_info, SYSTEM_PROBES};
use deckhand::error::{Error, Result};
use deckhand::exec::ExecutionResult;
use deckhand::report::ReportStatus;
use deckhand::ssh::{RemoteRunner, TransferResult};
use std::path::Path;
use std::time::Duration;

/// Scripted stand-in for a remote session. Commands matching a rule pattern
/// exit with the scripted code; everything else succeeds with "ok" on stdout.
/// Transfers enforce the same local-path precondition as the real session.
struct ScriptedRemote {
    rules: Vec<(&'static str, i32)>,
    commands: Vec<String>,
    transfers: Vec<(String, String)>,
}

impl ScriptedRemote {
    fn new() -> Self {
        Self {
            rules: Vec::new(),
            commands: Vec::new(),
            transfers: Vec::new(),
        }
    }

    fn failing_on(mut self, pattern: &'static str, exit_code: i32) -> Self {
        self.rules.push((pattern, exit_code));
        self
    }

    fn result(exit_code: i32) -> ExecutionResult {
        let now = Utc::now();
        ExecutionResult {
            succeeded: exit_code == 0,
            exit_code: Some(exit_code),
            timed_out: false,
            stdout: if exit_code == 0 { "ok".to_string() } else { String::new() },
            stderr: if exit_code == 0 { String::new() } else { "scripted failure".to_string() },
            started_at: now,
            finished_at: now,
        }
    }
}

impl RemoteRunner for ScriptedRemote {
    fn run(&mut self, command: &str, _timeout: Duration) -> Result<ExecutionResult> {
        self.commands.push(command.to_string());
        let exit_code = self
            .rules
            .iter()
            .find(|(pattern, _)| command.contains(pattern))
            .map(|(_, code)| *code)
            .unwrap_or(0);
        Ok(Self::result(exit_code))
    }

    fn transfer(&mut self, local: &Path, remote: &str, recursive: bool) -> Result<TransferResult> {
        if !local.exists() {
            return Err(Error::transfer_local_path_missing(
                local.display().to_string(),
            ));
        }
        self.transfers
            .push((local.display().to_string(), remote.to_string()));
        Ok(TransferResult {
            local_path: local.display().to_string(),
            remote_path: remote.to_string(),
            recursive,
            duration_ms: 0,
        })
    }
}

fn service_params(local: &Path, install_runtime: bool) -> ServiceDeployParams {
    ServiceDeployParams {
        local_app_path: local.to_path_buf(),
        remote_app_path: "/opt/apps/web1".to_string(),
        service_name: "web1".to_string(),
        entry_point: None,
        install_runtime,
    }
}

fn app_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("web1"), b"#!/bin/sh\n").unwrap();
    dir
}

#[test]
fn container_deploy_with_runtime_present_logs_four_steps() {
    let mut remote = ScriptedRemote::new();
    let report = run_container(
        &mut remote,
        "deploy",
        &ContainerDeployParams {
            image: "nginx:latest".to_string(),
            container_name: "web1".to_string(),
            ports: Some("80:8080".to_string()),
            env: None,
            volumes: None,
        },
    );

    assert!(report.overall_success);
    assert_eq!(report.status, ReportStatus::Success);
    assert_eq!(report.steps.len(), 4);
    let descriptions: Vec<&str> = report.steps.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(
        descriptions,
        vec![
            "Check container runtime",
            "Remove existing container",
            "Pull image",
            "Run container"
        ]
    );

    // Stop/remove of an absent container is an idempotent no-op.
    assert!(remote
        .commands
        .iter()
        .any(|c| c.contains("docker stop") && c.contains("|| true")));
    // The run step carries the requested port mapping.
    assert!(remote
        .commands
        .iter()
        .any(|c| c.contains("docker run -d --name web1") && c.contains("-p 80:8080")));
}

#[test]
fn container_deploy_installs_runtime_when_absent() {
    let mut remote = ScriptedRemote::new().failing_on("command -v docker", 1);
    let report = run_container(
        &mut remote,
        "deploy",
        &ContainerDeployParams {
            image: "nginx:latest".to_string(),
            container_name: "web1".to_string(),
            ports: None,
            env: None,
            volumes: None,
        },
    );

    // Probe failure triggers the install commands but never aborts.
    assert!(report.overall_success);
    assert_eq!(report.status, ReportStatus::SuccessWithWarnings);
    assert!(remote.commands.iter().any(|c| c.contains("apt-get install -y docker.io")));
    assert!(remote.commands.iter().any(|c| c.contains("usermod -aG docker deploy")));
    assert!(report.steps.iter().any(|s| s.description == "Run container" && s.succeeded));
}

#[test]
fn managed_service_missing_artifact_stops_at_the_transfer_step() {
    let mut remote = ScriptedRemote::new().failing_on("dotnet-install", 1);
    let report = run_managed_service(
        &mut remote,
        "deploy",
        &service_params(Path::new("/nonexistent/app"), true),
    );

    assert!(!report.overall_success);
    assert_eq!(report.status, ReportStatus::Failed);

    // The transfer is the last recorded step: nothing after it executed.
    let last = report.steps.last().unwrap();
    assert_eq!(last.description, "Transfer application files");
    assert!(last.fatal);
    assert!(!last.succeeded);
    assert!(!report.steps.iter().any(|s| s.description.contains("executable permission")));

    // The failed runtime install ran first, marked non-fatal.
    let runtime_step = report
        .steps
        .iter()
        .find(|s| s.description.starts_with("Install runtime"))
        .unwrap();
    assert!(!runtime_step.fatal);
    assert!(!runtime_step.succeeded);
}

#[test]
fn runtime_install_failure_alone_degrades_to_warnings() {
    let dir = app_dir();
    let mut remote = ScriptedRemote::new().failing_on("dotnet-install", 1);
    let report = run_managed_service(&mut remote, "deploy", &service_params(dir.path(), true));

    assert!(report.overall_success);
    assert_eq!(report.status, ReportStatus::SuccessWithWarnings);
    assert!(report.warnings.iter().any(|w| w.starts_with("Install runtime")));
    assert_eq!(remote.transfers.len(), 1);
}

#[test]
fn managed_service_renders_and_enables_the_unit() {
    let dir = app_dir();
    let mut remote = ScriptedRemote::new();
    let report = run_managed_service(&mut remote, "deploy", &service_params(dir.path(), false));

    assert!(report.overall_success);
    assert_eq!(report.status, ReportStatus::Success);

    let unit_command = remote
        .commands
        .iter()
        .find(|c| c.contains("/etc/systemd/system/web1.service"))
        .unwrap();
    assert!(unit_command.contains("ExecStart=/opt/apps/web1/web1"));
    assert!(unit_command.contains("User=deploy"));
    assert!(unit_command.contains("Restart=always"));

    assert!(remote.commands.iter().any(|c| c.contains("daemon-reload")));
    assert!(remote.commands.iter().any(|c| c.contains("systemctl enable web1")));
}

#[test]
fn unit_install_failure_skips_enable_but_not_success() {
    let dir = app_dir();
    let mut remote = ScriptedRemote::new().failing_on("tee /etc/systemd/system", 1);
    let report = run_managed_service(&mut remote, "deploy", &service_params(dir.path(), false));

    // Absence of service-manager support is tolerated.
    assert!(report.overall_success);
    assert_eq!(report.status, ReportStatus::SuccessWithWarnings);
    assert!(!remote.commands.iter().any(|c| c.contains("daemon-reload")));
    assert!(!remote.commands.iter().any(|c| c.contains("systemctl enable")));
}

#[test]
fn web_app_validation_failure_skips_the_reload() {
    let dir = app_dir();
    let mut remote = ScriptedRemote::new().failing_on("nginx -t", 1);
    let report = run_web_app(
        &mut remote,
        "deploy",
        &WebAppDeployParams {
            service: service_params(dir.path(), false),
            domain: "app.example.com".to_string(),
            upstream_port: 5000,
        },
    );

    assert!(report.overall_success);
    assert_eq!(report.status, ReportStatus::SuccessWithWarnings);
    assert!(!report.steps.iter().any(|s| s.description == "Reload reverse proxy"));
    assert!(report.steps.iter().any(|s| s.description == "Start service" && s.succeeded));

    let site_command = remote
        .commands
        .iter()
        .find(|c| c.contains("/etc/nginx/sites-available/web1"))
        .unwrap();
    assert!(site_command.contains("server_name app.example.com;"));
    assert!(site_command.contains("proxy_pass http://localhost:5000;"));
}

#[test]
fn web_app_aborts_proxy_steps_when_the_nested_deploy_fails() {
    let dir = app_dir();
    let mut remote = ScriptedRemote::new().failing_on("mkdir -p", 1);
    let report = run_web_app(
        &mut remote,
        "deploy",
        &WebAppDeployParams {
            service: service_params(dir.path(), false),
            domain: "app.example.com".to_string(),
            upstream_port: 5000,
        },
    );

    assert!(!report.overall_success);
    assert_eq!(report.status, ReportStatus::Failed);
    assert!(!report.steps.iter().any(|s| s.description.contains("proxy")));
    assert!(!remote.commands.iter().any(|c| c.contains("nginx")));
}

#[test]
fn system_info_returns_every_probe_key_with_failures_empty() {
    let mut remote = ScriptedRemote::new().failing_on("uname -r", 1);
    let info = run_system_info(&mut remote);

    assert_eq!(info.len(), SYSTEM_PROBES.len());
    for (key, _) in SYSTEM_PROBES {
        assert!(info.contains_key(*key), "missing probe key {}", key);
    }
    assert_eq!(info["kernel"], "");
    assert_eq!(info["os"], "ok");
}

#[test]
fn monitor_services_lists_or_queries_one_service() {
    let mut remote = ScriptedRemote::new();

    let listing = run_monitor_services(&mut remote, None).unwrap();
    assert!(listing.command.contains("list-units"));
    assert!(listing.service.is_none());
    assert!(listing.result.succeeded);

    let status = run_monitor_services(&mut remote, Some("nginx")).unwrap();
    assert!(status.command.contains("systemctl status nginx"));
    assert_eq!(status.service.as_deref(), Some("nginx"));
}
