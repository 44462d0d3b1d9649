//! Local container-image operations: argv glue over the process executor.

use crate::exec::{execute, CommandSpec, ExecutionResult};
use std::path::Path;
use std::time::Duration;

const BUILD_TIMEOUT: Duration = Duration::from_secs(300);
const PUSH_TIMEOUT: Duration = Duration::from_secs(300);
const RUN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub container_name: Option<String>,
    pub ports: Option<String>,
    pub env: Option<String>,
    pub volumes: Option<String>,
    pub detached: bool,
}

pub fn build(dockerfile: &Path, image: &str, tag: &str, build_context: &str) -> ExecutionResult {
    let mut spec = CommandSpec::new("docker")
        .args(["build", "-t"])
        .arg(format!("{}:{}", image, tag))
        .arg("-f")
        .arg(dockerfile.to_string_lossy().to_string())
        .arg(build_context)
        .timeout(BUILD_TIMEOUT);

    if let Some(dir) = dockerfile.parent().filter(|p| !p.as_os_str().is_empty()) {
        spec = spec.working_dir(dir);
    }

    execute(&spec)
}

pub fn push(image: &str, tag: &str, registry: Option<&str>) -> ExecutionResult {
    let full_image = match registry.filter(|r| !r.is_empty()) {
        Some(registry) => format!("{}/{}:{}", registry, image, tag),
        None => format!("{}:{}", image, tag),
    };

    execute(
        &CommandSpec::new("docker")
            .arg("push")
            .arg(full_image)
            .timeout(PUSH_TIMEOUT),
    )
}

pub fn run(image: &str, tag: &str, options: &RunOptions) -> ExecutionResult {
    let mut spec = CommandSpec::new("docker").arg("run");

    if options.detached {
        spec = spec.arg("-d");
    }
    if let Some(name) = options.container_name.as_deref().filter(|v| !v.is_empty()) {
        spec = spec.arg("--name").arg(name);
    }
    if let Some(ports) = options.ports.as_deref().filter(|v| !v.is_empty()) {
        spec = spec.arg("-p").arg(ports);
    }
    if let Some(env) = options.env.as_deref().filter(|v| !v.is_empty()) {
        spec = spec.arg("-e").arg(env);
    }
    if let Some(volumes) = options.volumes.as_deref().filter(|v| !v.is_empty()) {
        spec = spec.arg("-v").arg(volumes);
    }

    execute(
        &spec
            .arg(format!("{}:{}", image, tag))
            .timeout(RUN_TIMEOUT),
    )
}

pub fn images() -> ExecutionResult {
    execute(&CommandSpec::new("docker").args(["images", "--format", "json"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_options_default_is_foreground_and_unnamed() {
        let options = RunOptions::default();
        assert!(!options.detached);
        assert!(options.container_name.is_none());
    }
}
