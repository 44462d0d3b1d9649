//! Read-only remote diagnostics: system probes and service monitoring.

use crate::error::{Error, Result};
use crate::exec::ExecutionResult;
use crate::ssh::{RemoteRunner, RemoteSession, RemoteTarget};
use crate::utils::shell::quote_arg;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// The fixed probe battery. Keys are stable so callers can rely on every
/// one being present in the result, populated or not.
pub const SYSTEM_PROBES: &[(&str, &str)] = &[
    (
        "os",
        r#"cat /etc/os-release | grep PRETTY_NAME | cut -d'"' -f2"#,
    ),
    ("kernel", "uname -r"),
    ("uptime", "uptime -p"),
    (
        "memory",
        r#"free -h | grep Mem | awk '{print $2" total, "$3" used, "$7" available"}'"#,
    ),
    (
        "disk",
        r#"df -h / | tail -1 | awk '{print $2" total, "$3" used, "$4" available, "$5" used%"}'"#,
    ),
    ("cpu", "lscpu | grep 'Model name' | cut -d':' -f2 | xargs"),
    (
        "load",
        r#"cat /proc/loadavg | awk '{print $1" (1min) "$2" (5min) "$3" (15min)"}'"#,
    ),
];

/// Run the probe battery. Every probe key appears in the result; a failed
/// probe degrades to an empty value instead of aborting the batch.
pub fn run_system_info(remote: &mut dyn RemoteRunner) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    for (key, command) in SYSTEM_PROBES {
        let value = match remote.run(command, PROBE_TIMEOUT) {
            Ok(result) if result.succeeded => result.stdout.trim().to_string(),
            _ => String::new(),
        };
        info.insert((*key).to_string(), value);
    }
    info
}

/// Connect, probe, disconnect.
pub fn system_info(target: RemoteTarget) -> Result<BTreeMap<String, String>> {
    let mut session = RemoteSession::connect(target)?;
    let info = run_system_info(&mut session);
    session.close();
    Ok(info)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub command: String,
    #[serde(flatten)]
    pub result: ExecutionResult,
}

/// Non-destructive service monitoring: a full running-service listing, or a
/// status query for one named service.
pub fn run_monitor_services(
    remote: &mut dyn RemoteRunner,
    service: Option<&str>,
) -> Result<ServiceQuery> {
    let command = match service {
        Some(name) => format!("systemctl status {} --no-pager", quote_arg(name)),
        None => "systemctl list-units --type=service --state=running --no-pager".to_string(),
    };

    let result = remote.run(&command, PROBE_TIMEOUT)?;
    if result.timed_out {
        return Err(Error::remote_command_timeout(
            command,
            PROBE_TIMEOUT.as_secs(),
        ));
    }
    Ok(ServiceQuery {
        service: service.map(str::to_string),
        command,
        result,
    })
}

/// Connect, query, disconnect.
pub fn monitor_services(target: RemoteTarget, service: Option<&str>) -> Result<ServiceQuery> {
    let mut session = RemoteSession::connect(target)?;
    let query = run_monitor_services(&mut session, service);
    session.close();
    query
}
