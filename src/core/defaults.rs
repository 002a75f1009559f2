use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure for the optional `--config` JSON file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeployConfigFile {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default = "default_fly_binary_path")]
    pub fly_binary_path: String,

    /// Local fly target name every invocation is bound to with `-t`.
    #[serde(default = "default_target_alias")]
    pub target_alias: String,

    /// Team used when the request source does not name one.
    #[serde(default = "default_team")]
    pub team: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            fly_binary_path: default_fly_binary_path(),
            target_alias: default_target_alias(),
            team: default_team(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_fly_binary_path() -> String {
    "fly".to_string()
}

fn default_target_alias() -> String {
    "pipeline-deploy-target".to_string()
}

pub(crate) fn default_team() -> String {
    "main".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults from a config file, or built-ins when no path is given.
///
/// Unlike a missing optional file, an explicitly named file that cannot be
/// read or parsed is an error.
pub fn load_defaults(path: Option<&str>) -> crate::Result<Defaults> {
    let defaults = match path {
        Some(path) => load_config_from_file(path)?.defaults,
        None => Defaults::default(),
    };

    validate(&defaults)?;
    Ok(defaults)
}

fn validate(defaults: &Defaults) -> crate::Result<()> {
    let required = [
        ("flyBinaryPath", &defaults.fly_binary_path),
        ("targetAlias", &defaults.target_alias),
        ("team", &defaults.team),
    ];

    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(crate::Error::config_invalid_value(
                key,
                Some(value.clone()),
                "must not be empty",
            ));
        }
    }

    Ok(())
}

fn load_config_from_file(path: &str) -> crate::Result<DeployConfigFile> {
    let expanded = shellexpand::tilde(path).to_string();
    let path = Path::new(&expanded);

    let content = fs::read_to_string(path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        crate::Error::validation_invalid_json(e, Some(format!("parse {}", path.display())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_returns_builtins() {
        let defaults = load_defaults(None).unwrap();
        assert_eq!(defaults, Defaults::default());
        assert_eq!(defaults.fly_binary_path, "fly");
        assert_eq!(defaults.team, "main");
    }

    #[test]
    fn partial_file_merges_with_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.json");
        fs::write(&path, r#"{"defaults": {"flyBinaryPath": "/opt/resource/fly"}}"#).unwrap();

        let defaults = load_defaults(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(defaults.fly_binary_path, "/opt/resource/fly");
        assert_eq!(defaults.target_alias, "pipeline-deploy-target");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_defaults(Some(path.to_str().unwrap())).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationInvalidJson);
    }

    #[test]
    fn blank_target_alias_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.json");
        fs::write(&path, r#"{"defaults": {"targetAlias": ""}}"#).unwrap();

        let err = load_defaults(Some(path.to_str().unwrap())).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ConfigInvalidValue);
        assert!(err.message.contains("targetAlias"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_defaults(Some("/nonexistent/pipeline-deploy.json")).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InternalIoError);
    }
}
