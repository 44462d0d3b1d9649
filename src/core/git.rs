//! Local git operations: argv glue over the process executor.

use crate::exec::{execute, CommandSpec, ExecutionResult};
use serde::Serialize;
use std::time::Duration;

const CLONE_TIMEOUT: Duration = Duration::from_secs(120);

pub fn clone(url: &str, target_dir: Option<&str>, branch: Option<&str>) -> ExecutionResult {
    let mut spec = CommandSpec::new("git").arg("clone").arg(url);
    if let Some(branch) = branch.filter(|b| !b.is_empty()) {
        spec = spec.arg("-b").arg(branch);
    }
    if let Some(dir) = target_dir.filter(|d| !d.is_empty()) {
        spec = spec.arg(dir);
    }
    execute(&spec.timeout(CLONE_TIMEOUT))
}

pub fn status(repo_path: &str) -> ExecutionResult {
    execute(
        &CommandSpec::new("git")
            .args(["status", "--porcelain"])
            .working_dir(repo_path),
    )
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoInfo {
    pub repository_path: String,
    pub branch: String,
    pub commit: String,
    pub remote: String,
}

/// Branch, HEAD commit, and origin URL for a local repository. Individual
/// lookups that fail (detached HEAD, no origin) come back empty.
pub fn info(repo_path: &str) -> RepoInfo {
    RepoInfo {
        repository_path: repo_path.to_string(),
        branch: capture(repo_path, &["branch", "--show-current"]),
        commit: capture(repo_path, &["rev-parse", "HEAD"]),
        remote: capture(repo_path, &["remote", "get-url", "origin"]),
    }
}

fn capture(repo_path: &str, args: &[&str]) -> String {
    let result = execute(
        &CommandSpec::new("git")
            .args(args.iter().copied())
            .working_dir(repo_path),
    );
    if result.succeeded {
        result.stdout.trim().to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_outside_a_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = status(dir.path().to_str().unwrap());
        assert!(!result.succeeded);
    }

    #[test]
    fn info_outside_a_repository_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let info = info(dir.path().to_str().unwrap());
        assert!(info.branch.is_empty());
        assert!(info.commit.is_empty());
        assert!(info.remote.is_empty());
    }
}
