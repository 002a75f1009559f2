//! Resource-protocol request and response shapes.
//!
//! Requests arrive as JSON (`source` + `params`) and responses leave as JSON
//! (`version` + `metadata`). Field names are snake_case to match what CI
//! servers send and expect.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::defaults::default_team;
use crate::error::{Error, Result};

/// Connection info for the pipeline-execution server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Skip TLS certificate verification for fly and the HTTP lister.
    #[serde(default)]
    pub insecure: bool,
}

impl Source {
    /// The named team, or `main` when absent or blank.
    pub fn team_name(&self) -> String {
        match self.team.as_deref() {
            Some(team) if !team.is_empty() => team.to_string(),
            _ => default_team(),
        }
    }

    /// Fill in the team when the request leaves it out.
    pub fn with_default_team(mut self, team: &str) -> Self {
        if self.team.as_deref().is_none_or(str::is_empty) {
            self.team = Some(team.to_string());
        }
        self
    }

    /// Target, username and password are all required.
    pub fn validate(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(Error::validation_missing_argument("target"));
        }
        if self.username.is_empty() {
            return Err(Error::validation_missing_argument("username"));
        }
        if self.password.is_empty() {
            return Err(Error::validation_missing_argument("password"));
        }
        Ok(())
    }
}

/// One pipeline to apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub name: String,
    /// Relative to the sources directory.
    pub config_file: String,
    /// Passed to fly in this order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vars_files: Vec<String>,
    /// Overrides `params.unpause` for this pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpause: Option<bool>,
}

impl PipelineSpec {
    pub fn new(name: impl Into<String>, config_file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_file: config_file.into(),
            ..Self::default()
        }
    }

    pub fn should_unpause(&self, deployment_default: bool) -> bool {
        self.unpause.unwrap_or(deployment_default)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutParams {
    /// `None` and an empty list are both rejected.
    #[serde(default)]
    pub pipelines: Option<Vec<PipelineSpec>>,
    #[serde(default)]
    pub unpause: bool,
}

/// A deployment request: where to apply, and what.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutRequest {
    pub source: Source,
    #[serde(default)]
    pub params: OutParams,
}

impl OutRequest {
    /// Check every required field before anything touches fly or the server.
    ///
    /// Returns the pipeline list on success so callers never see an empty one.
    pub fn validate(&self) -> Result<&[PipelineSpec]> {
        self.source.validate()?;

        let pipelines = match self.params.pipelines.as_deref() {
            Some(pipelines) if !pipelines.is_empty() => pipelines,
            _ => return Err(Error::validation_missing_argument("pipelines")),
        };

        let mut seen = HashSet::new();
        for (index, pipeline) in pipelines.iter().enumerate() {
            if pipeline.name.is_empty() {
                return Err(Error::validation_invalid_argument(
                    format!("pipelines[{}].name", index),
                    "must not be empty",
                    None,
                ));
            }
            if pipeline.config_file.is_empty() {
                return Err(Error::validation_invalid_argument(
                    format!("pipelines[{}].config_file", index),
                    "must not be empty",
                    Some(pipeline.name.clone()),
                ));
            }
            if !seen.insert(pipeline.name.as_str()) {
                return Err(Error::validation_invalid_argument(
                    format!("pipelines[{}].name", index),
                    "duplicate pipeline name",
                    Some(pipeline.name.clone()),
                ));
            }
        }

        Ok(pipelines)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    pub source: Source,
    #[serde(default)]
    pub version: Option<Version>,
}

/// Deterministic fingerprint of the applied pipeline configs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub pipelines_checksum: String,
}

/// Informational name/value pair. Never used for version equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

impl MetadataField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutResponse {
    pub version: Version,
    pub metadata: Vec<MetadataField>,
}
