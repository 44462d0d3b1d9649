//! Versioned deployment-configuration documents.
//!
//! A small JSON document describing one app deployment, written next to the
//! project and read back by later invocations. Not consulted by the recipes
//! themselves; this is caller-facing bookkeeping.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub app_name: String,
    pub environment: String,
    pub platform: String,
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub version: String,
}

/// Create and persist a deployment configuration document.
pub fn create(
    path: &Path,
    app_name: &str,
    environment: &str,
    platform: &str,
    settings_json: Option<&str>,
) -> Result<DeploymentConfig> {
    let settings = match settings_json.filter(|s| !s.is_empty()) {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| Error::validation_invalid_json(e, Some("settings".to_string())))?,
        None => serde_json::Value::Object(serde_json::Map::new()),
    };

    let config = DeploymentConfig {
        app_name: app_name.to_string(),
        environment: environment.to_string(),
        platform: platform.to_string(),
        settings,
        created_at: Utc::now(),
        version: CONFIG_VERSION.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    let payload = serde_json::to_string_pretty(&config)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize config".to_string())))?;
    std::fs::write(path, payload).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("write {}", path.display())))
    })?;

    Ok(config)
}

/// Read and validate a deployment configuration document.
pub fn read(path: &Path) -> Result<DeploymentConfig> {
    if !path.exists() {
        return Err(Error::config_file_not_found(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn create_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.json");

        let created = create(
            &path,
            "web1",
            "production",
            "linux",
            Some(r#"{"port": 8080}"#),
        )
        .unwrap();
        assert_eq!(created.version, CONFIG_VERSION);

        let read_back = read(&path).unwrap();
        assert_eq!(read_back.app_name, "web1");
        assert_eq!(read_back.settings["port"], 8080);
    }

    #[test]
    fn create_rejects_malformed_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.json");

        let err = create(&path, "web1", "production", "linux", Some("{not json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidJson);
        assert!(!path.exists());
    }

    #[test]
    fn read_missing_file_is_a_config_error() {
        let err = read(Path::new("/nonexistent/deploy.json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigFileNotFound);
    }

    #[test]
    fn read_rejects_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.json");
        std::fs::write(&path, "{broken").unwrap();

        let err = read(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidJson);
    }
}
